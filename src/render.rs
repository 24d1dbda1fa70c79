pub mod canvas;
pub mod composite;
pub mod cpu;

#[cfg(test)]
#[path = "../tests/unit/render/recording.rs"]
pub(crate) mod recording;
