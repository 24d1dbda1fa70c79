pub mod compositor;
pub mod video;
