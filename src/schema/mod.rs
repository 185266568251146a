pub mod cache;
pub mod definition;

pub use cache::*;
pub use definition::*;
