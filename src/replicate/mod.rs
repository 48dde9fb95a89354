pub mod client;
pub mod traits;

pub use client::{ModelRef, ReplicateClient};
pub use traits::MediaGenerator;
