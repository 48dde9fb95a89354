use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;

use crate::{
    client::form::Submission,
    error::{ErrorBody, GenerationError, Result, GENERIC_FAILURE},
    models::{GenerateResponse, GenerationResult},
};

#[async_trait]
pub trait GenerateTransport: Send + Sync {
    async fn generate(&self, submission: Submission) -> Result<GenerationResult>;
}

/// Posts form submissions to a running `/api/generate` endpoint.
#[derive(Clone)]
pub struct HttpGenerateClient {
    client: Client,
    endpoint: String,
}

impl HttpGenerateClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            client: Client::new(),
            endpoint: format!("{}/api/generate", base_url.trim_end_matches('/')),
        }
    }

    fn build_form(submission: Submission) -> Result<Form> {
        let mut form = Form::new();
        for (name, value) in submission.fields {
            form = form.text(name, value);
        }
        if let Some(image) = submission.image {
            let file_name = image.file_name.unwrap_or_else(|| "image".to_string());
            let part = Part::bytes(image.bytes)
                .file_name(file_name)
                .mime_str(&image.mime_type)?;
            form = form.part("image", part);
        }
        Ok(form)
    }
}

#[async_trait]
impl GenerateTransport for HttpGenerateClient {
    async fn generate(&self, submission: Submission) -> Result<GenerationResult> {
        let form = Self::build_form(submission)?;
        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .map(|body| body.error)
                .filter(|error| !error.trim().is_empty())
                .unwrap_or_else(|| GENERIC_FAILURE.to_string());
            return Err(if status.is_client_error() {
                GenerationError::Validation(message)
            } else {
                GenerationError::Upstream(message)
            });
        }

        let parsed: GenerateResponse = serde_json::from_str(&body)
            .map_err(|e| GenerationError::Response(format!("Invalid response: {}", e)))?;
        Ok(GenerationResult {
            media_url: parsed.output,
        })
    }
}
