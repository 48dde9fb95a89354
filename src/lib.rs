pub mod adapter;
pub mod client;
pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod replicate;
#[cfg(feature = "server")]
pub mod server;

#[cfg(test)]
pub(crate) mod test_support;

pub use adapter::{GenerationAdapter, ModeProfile, MODE_PROFILES};
pub use client::{FormController, FormState, HttpGenerateClient};
pub use config::{Config, ReplicateConfig};
pub use error::{GenerationError, Result};
pub use models::*;
pub use replicate::{MediaGenerator, ReplicateClient};
