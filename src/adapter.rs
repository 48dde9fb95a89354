//! Maps a mode-tagged generation request onto an upstream model call.

use serde_json::{Map, Value};
use std::sync::Arc;

use crate::{
    config::ReplicateConfig,
    error::{GenerationError, Result},
    models::{GenerationMode, GenerationRequest, GenerationResult},
    replicate::{MediaGenerator, ReplicateClient},
};

pub const FRAMES_PER_SECOND: u32 = 8;
pub const DEFAULT_DURATION_SECONDS: u32 = 30;
pub const NEGATIVE_PROMPT: &str = "worst quality, low quality, blurry, distorted, artifacts";

const FLUX_PRO: &str = "black-forest-labs/flux-1.1-pro";
const LTX_VIDEO: &str =
    "lightricks/ltx-video:03b88e6afdce86d3d93fb9826a9c33b891d81b7a0fc95dd3e5ae5d9aef22b82b";

/// Inputs filled from the request rather than from the fixed template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSlot {
    Prompt,
    NumFrames,
    ReferenceImage,
}

impl InputSlot {
    pub fn key(&self) -> &'static str {
        match self {
            InputSlot::Prompt => "prompt",
            InputSlot::NumFrames => "num_frames",
            InputSlot::ReferenceImage => "image",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Param {
    Str(&'static str),
    Int(i64),
    Float(f64),
}

impl Param {
    fn to_value(self) -> Value {
        match self {
            Param::Str(s) => Value::from(s),
            Param::Int(i) => Value::from(i),
            Param::Float(f) => Value::from(f),
        }
    }
}

#[derive(Debug)]
pub struct ModeProfile {
    pub mode: GenerationMode,
    pub model: &'static str,
    pub slots: &'static [InputSlot],
    pub fixed: &'static [(&'static str, Param)],
}

pub static MODE_PROFILES: [ModeProfile; 3] = [
    ModeProfile {
        mode: GenerationMode::TextToImage,
        model: FLUX_PRO,
        slots: &[InputSlot::Prompt],
        fixed: &[
            ("aspect_ratio", Param::Str("16:9")),
            ("output_format", Param::Str("png")),
            ("output_quality", Param::Int(100)),
        ],
    },
    ModeProfile {
        mode: GenerationMode::TextToVideo,
        model: LTX_VIDEO,
        slots: &[InputSlot::Prompt, InputSlot::NumFrames],
        fixed: &[
            ("aspect_ratio", Param::Str("16:9")),
            ("negative_prompt", Param::Str(NEGATIVE_PROMPT)),
        ],
    },
    ModeProfile {
        mode: GenerationMode::ImageToImage,
        model: FLUX_PRO,
        slots: &[InputSlot::Prompt, InputSlot::ReferenceImage],
        fixed: &[
            ("prompt_strength", Param::Float(0.8)),
            ("aspect_ratio", Param::Str("16:9")),
            ("output_format", Param::Str("png")),
            ("output_quality", Param::Int(100)),
        ],
    },
];

pub fn profile_for(mode: GenerationMode) -> &'static ModeProfile {
    match mode {
        GenerationMode::TextToImage => &MODE_PROFILES[0],
        GenerationMode::TextToVideo => &MODE_PROFILES[1],
        GenerationMode::ImageToImage => &MODE_PROFILES[2],
    }
}

impl ModeProfile {
    pub fn build_input(&self, request: &GenerationRequest) -> Result<Value> {
        let mut input = Map::new();
        for slot in self.slots {
            let value = match slot {
                InputSlot::Prompt => Value::from(request.prompt.as_str()),
                InputSlot::NumFrames => Value::from(frames_for(request.duration.as_deref())),
                InputSlot::ReferenceImage => {
                    let image = request.image.as_ref().ok_or_else(|| {
                        GenerationError::Validation(
                            "Image file is required for image-to-image generation".into(),
                        )
                    })?;
                    Value::from(image.to_data_url())
                }
            };
            input.insert(slot.key().to_string(), value);
        }
        for (key, param) in self.fixed {
            input.insert((*key).to_string(), param.to_value());
        }
        Ok(Value::Object(input))
    }
}

/// Leading signed integer of the raw duration; missing, invalid or non-positive falls back to 30s.
pub fn duration_seconds(raw: Option<&str>) -> u32 {
    let trimmed = raw.unwrap_or_default().trim();
    let (negative, rest) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    match digits.parse::<u32>() {
        Ok(seconds) if seconds > 0 && !negative => seconds,
        _ => DEFAULT_DURATION_SECONDS,
    }
}

pub fn frames_for(raw: Option<&str>) -> u32 {
    duration_seconds(raw).saturating_mul(FRAMES_PER_SECOND)
}

#[derive(Clone)]
pub struct GenerationAdapter {
    generator: Option<Arc<dyn MediaGenerator>>,
}

impl GenerationAdapter {
    pub fn new(generator: Arc<dyn MediaGenerator>) -> Self {
        Self {
            generator: Some(generator),
        }
    }

    /// An adapter without credentials; every request fails with a configuration error.
    pub fn unconfigured() -> Self {
        Self { generator: None }
    }

    pub fn from_config(config: &ReplicateConfig) -> Self {
        match ReplicateClient::new(config) {
            Ok(client) => Self::new(Arc::new(client)),
            Err(e) => {
                log::warn!("Generation disabled: {}", e);
                Self::unconfigured()
            }
        }
    }

    pub fn is_configured(&self) -> bool {
        self.generator.is_some()
    }

    pub async fn handle(&self, request: GenerationRequest) -> Result<GenerationResult> {
        let generator = self
            .generator
            .as_ref()
            .ok_or_else(|| GenerationError::Config("REPLICATE_API_TOKEN not configured".into()))?;

        let mode: GenerationMode = request.mode.parse()?;
        let profile = profile_for(mode);
        let input = profile.build_input(&request)?;

        log::info!("Dispatching {} to {}", mode, profile.model);

        let output = generator.run(profile.model, input).await?;
        let media_url = output.first_url()?;

        Ok(GenerationResult { media_url })
    }
}
