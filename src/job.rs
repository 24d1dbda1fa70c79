pub mod client;
pub mod machine;
pub mod wire;
