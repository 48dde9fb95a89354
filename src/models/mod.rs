pub mod common;
pub mod generation;
pub mod prediction;

pub use common::*;
pub use generation::*;
pub use prediction::*;
