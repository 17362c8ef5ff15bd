pub mod bounds;
pub mod types;

pub use bounds::Bounds;
pub use types::*;
