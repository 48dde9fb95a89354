use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{GenerationError, Result};

/// Replicate prediction as returned by create and get calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    pub id: String,
    pub status: PredictionStatus,
    #[serde(default)]
    pub output: Option<Value>,
    #[serde(default)]
    pub error: Option<Value>,
    #[serde(default)]
    pub urls: Option<PredictionUrls>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionUrls {
    pub get: Option<String>,
    pub cancel: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PredictionStatus {
    Starting,
    Processing,
    Succeeded,
    Failed,
    Canceled,
}

impl PredictionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PredictionStatus::Succeeded | PredictionStatus::Failed | PredictionStatus::Canceled
        )
    }
}

impl Prediction {
    pub fn error_message(&self) -> String {
        match &self.error {
            Some(Value::String(message)) => message.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        }
    }
}

/// Output of a finished prediction: one media reference or an ordered list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum PredictionOutput {
    Single(String),
    Many(Vec<String>),
}

impl PredictionOutput {
    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| {
            GenerationError::Response(format!("Unexpected prediction output: {}", e))
        })
    }

    pub fn first_url(self) -> Result<String> {
        match self {
            PredictionOutput::Single(url) => Ok(url),
            PredictionOutput::Many(urls) => urls
                .into_iter()
                .next()
                .ok_or_else(|| GenerationError::Upstream("Prediction returned no output".into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_output_shapes() {
        let single = PredictionOutput::from_value(json!("https://x/a.png")).unwrap();
        assert_eq!(single.first_url().unwrap(), "https://x/a.png");

        let many = PredictionOutput::from_value(json!(["https://x/1.mp4", "https://x/2.mp4"]))
            .unwrap();
        assert_eq!(many.first_url().unwrap(), "https://x/1.mp4");

        let empty = PredictionOutput::Many(vec![]);
        assert!(matches!(empty.first_url(), Err(GenerationError::Upstream(_))));

        assert!(PredictionOutput::from_value(json!({"url": 1})).is_err());
    }

    #[test]
    fn test_prediction_decode() {
        let prediction: Prediction = serde_json::from_value(json!({
            "id": "p1",
            "status": "failed",
            "error": "NSFW content detected",
            "urls": {"get": "https://api/p1", "cancel": "https://api/p1/cancel"}
        }))
        .unwrap();
        assert!(prediction.status.is_terminal());
        assert_eq!(prediction.error_message(), "NSFW content detected");
    }
}
