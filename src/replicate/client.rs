use crate::{
    config::ReplicateConfig,
    error::{GenerationError, Result},
    logger,
    models::{Prediction, PredictionOutput, PredictionStatus},
    replicate::traits::MediaGenerator,
};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::{json, Value};
use std::time::Duration;

/// `owner/name` or `owner/name:version`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRef<'a> {
    pub owner: &'a str,
    pub name: &'a str,
    pub version: Option<&'a str>,
}

impl<'a> ModelRef<'a> {
    pub fn parse(reference: &'a str) -> Result<Self> {
        let (path, version) = match reference.split_once(':') {
            Some((path, version)) if !version.is_empty() => (path, Some(version)),
            Some(_) => {
                return Err(GenerationError::Request(format!(
                    "Invalid model reference: {}",
                    reference
                )))
            }
            None => (reference, None),
        };
        match path.split_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
                Ok(Self {
                    owner,
                    name,
                    version,
                })
            }
            _ => Err(GenerationError::Request(format!(
                "Invalid model reference: {}",
                reference
            ))),
        }
    }
}

#[derive(Clone)]
pub struct ReplicateClient {
    client: Client,
    api_token: String,
    api_base: String,
    poll_interval: Duration,
}

impl ReplicateClient {
    pub fn new(config: &ReplicateConfig) -> Result<Self> {
        let api_token = config
            .api_token
            .clone()
            .ok_or_else(|| GenerationError::Config("REPLICATE_API_TOKEN not configured".into()))?;

        Ok(Self {
            client: Client::new(),
            api_token,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            poll_interval: Duration::from_millis(config.poll_interval_ms),
        })
    }

    pub async fn create_prediction(&self, model: &str, input: Value) -> Result<Prediction> {
        let model_ref = ModelRef::parse(model)?;
        let (url, payload) = match model_ref.version {
            Some(version) => (
                format!("{}/predictions", self.api_base),
                json!({ "version": version, "input": input }),
            ),
            None => (
                format!(
                    "{}/models/{}/{}/predictions",
                    self.api_base, model_ref.owner, model_ref.name
                ),
                json!({ "input": input }),
            ),
        };

        log::debug!("Creating prediction for {} at {}", model, url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_token)
            .header("Prefer", "wait")
            .json(&payload)
            .send()
            .await?;

        Self::decode(&url, response).await
    }

    pub async fn get_prediction(&self, url: &str) -> Result<Prediction> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.api_token)
            .send()
            .await?;

        Self::decode(url, response).await
    }

    /// Polls until the prediction reaches a terminal status. There is no deadline.
    pub async fn wait(&self, mut prediction: Prediction) -> Result<Prediction> {
        while !prediction.status.is_terminal() {
            tokio::time::sleep(self.poll_interval).await;
            let poll_url = prediction
                .urls
                .as_ref()
                .and_then(|urls| urls.get.clone())
                .unwrap_or_else(|| format!("{}/predictions/{}", self.api_base, prediction.id));
            log::trace!("Polling prediction {} ({:?})", prediction.id, prediction.status);
            prediction = self.get_prediction(&poll_url).await?;
        }
        Ok(prediction)
    }

    async fn decode(url: &str, response: Response) -> Result<Prediction> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(GenerationError::Upstream(format!(
                "Request to {} failed with status {}: {}",
                url, status, body
            )));
        }
        serde_json::from_str(&body)
            .map_err(|e| GenerationError::Response(format!("Invalid prediction response: {}", e)))
    }
}

#[async_trait]
impl MediaGenerator for ReplicateClient {
    async fn run(&self, model: &str, input: Value) -> Result<PredictionOutput> {
        let _timer = logger::timer(&format!("replicate run {}", model));

        let prediction = self.create_prediction(model, input).await?;
        let prediction = self.wait(prediction).await?;

        match prediction.status {
            PredictionStatus::Succeeded => {
                let output = prediction.output.ok_or_else(|| {
                    GenerationError::Upstream("Prediction returned no output".into())
                })?;
                PredictionOutput::from_value(output)
            }
            _ => Err(GenerationError::Upstream(format!(
                "Prediction failed: {}",
                prediction.error_message()
            ))),
        }
    }
}
