pub mod canonical;
pub mod node;
pub mod workflow;

pub use node::*;
pub use workflow::*;
