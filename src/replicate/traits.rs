use crate::{error::Result, models::PredictionOutput};
use async_trait::async_trait;
use serde_json::Value;

/// Upstream media generation: a model reference and an input object in, output out.
#[async_trait]
pub trait MediaGenerator: Send + Sync {
    async fn run(&self, model: &str, input: Value) -> Result<PredictionOutput>;
}
