//! Form state for the generation page.
//!
//! The whole form is one value. Every change goes through [`update`], which
//! returns the next state plus at most one side effect for the controller to
//! run. Effects never touch the state directly; they come back as actions.

use crate::{
    error::GenerationError,
    models::{GenerationMode, GenerationResult, ReferenceImage, VideoDuration},
};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Loading,
    Succeeded(GenerationResult),
    Failed(String),
}

#[derive(Debug, Clone, Default)]
pub struct FormState {
    pub mode: GenerationMode,
    pub prompt: String,
    pub duration: VideoDuration,
    pub image: Option<ReferenceImage>,
    pub preview: Option<String>,
    /// Bumped on every attach so late previews of replaced files are dropped.
    pub preview_seq: u64,
    /// Set on attach, cleared once the preview for the current file is ready or has failed.
    pub awaiting_preview: bool,
    pub phase: Phase,
    /// Client-side rejection of the last submit. Shown in place of the phase error.
    pub validation_error: Option<String>,
}

impl FormState {
    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Loading
    }

    pub fn preview_pending(&self) -> bool {
        self.awaiting_preview
    }

    pub fn result(&self) -> Option<&GenerationResult> {
        match &self.phase {
            Phase::Succeeded(result) => Some(result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        if let Some(message) = &self.validation_error {
            return Some(message);
        }
        match &self.phase {
            Phase::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn validate(&self) -> Result<(), GenerationError> {
        if self.mode.requires_prompt() && self.prompt.trim().is_empty() {
            return Err(GenerationError::Validation("prompt required".into()));
        }
        if self.mode.requires_image() && self.image.is_none() {
            return Err(GenerationError::Validation("image required".into()));
        }
        Ok(())
    }

    /// Multipart fields for the current form, as `(name, value)` text parts plus the image.
    pub fn submission(&self) -> Submission {
        let mut fields = vec![
            ("type", self.mode.as_str().to_string()),
            ("prompt", self.prompt.clone()),
        ];
        if self.mode == GenerationMode::TextToVideo {
            fields.push(("duration", self.duration.seconds().to_string()));
        }
        let image = if self.mode == GenerationMode::ImageToImage {
            self.image.clone()
        } else {
            None
        };
        Submission { fields, image }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub fields: Vec<(&'static str, String)>,
    pub image: Option<ReferenceImage>,
}

#[derive(Debug, Clone)]
pub enum FormAction {
    SelectMode(GenerationMode),
    SetPrompt(String),
    SetDuration(VideoDuration),
    AttachImage(ReferenceImage),
    PreviewReady { seq: u64, data_url: String },
    PreviewFailed { seq: u64 },
    Submit,
    Completed(Result<GenerationResult, String>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    ReadPreview { seq: u64, image: ReferenceImage },
    Send(Submission),
}

#[derive(Debug)]
pub struct Transition {
    pub state: FormState,
    pub effect: Option<Effect>,
}

impl Transition {
    fn pure(state: FormState) -> Self {
        Self {
            state,
            effect: None,
        }
    }
}

pub fn update(mut state: FormState, action: FormAction) -> Transition {
    match action {
        FormAction::SelectMode(mode) => {
            state.mode = mode;
            Transition::pure(state)
        }
        FormAction::SetPrompt(prompt) => {
            state.prompt = prompt;
            Transition::pure(state)
        }
        FormAction::SetDuration(duration) => {
            state.duration = duration;
            Transition::pure(state)
        }
        FormAction::AttachImage(image) => {
            state.preview_seq += 1;
            state.preview = None;
            state.awaiting_preview = true;
            state.image = Some(image.clone());
            let seq = state.preview_seq;
            Transition {
                state,
                effect: Some(Effect::ReadPreview { seq, image }),
            }
        }
        FormAction::PreviewReady { seq, data_url } => {
            if seq == state.preview_seq {
                state.preview = Some(data_url);
                state.awaiting_preview = false;
            }
            Transition::pure(state)
        }
        FormAction::PreviewFailed { seq } => {
            if seq == state.preview_seq {
                state.awaiting_preview = false;
            }
            Transition::pure(state)
        }
        FormAction::Submit => {
            if state.is_loading() {
                return Transition::pure(state);
            }
            // A rejected submit leaves the previous result or error in place.
            if let Err(e) = state.validate() {
                state.validation_error = Some(e.to_string());
                return Transition::pure(state);
            }
            let submission = state.submission();
            state.validation_error = None;
            state.phase = Phase::Loading;
            Transition {
                state,
                effect: Some(Effect::Send(submission)),
            }
        }
        FormAction::Completed(outcome) => {
            if !state.is_loading() {
                return Transition::pure(state);
            }
            state.phase = match outcome {
                Ok(result) => Phase::Succeeded(result),
                Err(message) => Phase::Failed(message),
            };
            Transition::pure(state)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(state: FormState, action: FormAction) -> (FormState, Option<Effect>) {
        let t = update(state, action);
        (t.state, t.effect)
    }

    fn png() -> ReferenceImage {
        ReferenceImage::new(vec![1, 2, 3], "image/png")
    }

    #[test]
    fn test_empty_prompt_is_rejected_without_effect() {
        for mode in [GenerationMode::TextToImage, GenerationMode::TextToVideo] {
            let state = FormState {
                mode,
                prompt: "   ".into(),
                ..Default::default()
            };
            let (state, effect) = step(state, FormAction::Submit);
            assert!(effect.is_none());
            assert_eq!(state.error(), Some("prompt required"));
        }
    }

    #[test]
    fn test_image_to_image_requires_image_not_prompt() {
        let state = FormState {
            mode: GenerationMode::ImageToImage,
            ..Default::default()
        };
        let (state, effect) = step(state, FormAction::Submit);
        assert!(effect.is_none());
        assert_eq!(state.error(), Some("image required"));

        let (state, _) = step(state, FormAction::AttachImage(png()));
        let (state, effect) = step(state, FormAction::Submit);
        assert!(matches!(effect, Some(Effect::Send(_))));
        assert!(state.is_loading());
    }

    #[test]
    fn test_select_mode_keeps_inputs() {
        let (state, _) = step(FormState::default(), FormAction::SetPrompt("cats".into()));
        let (state, _) = step(state, FormAction::AttachImage(png()));
        let (state, _) = step(state, FormAction::SelectMode(GenerationMode::TextToVideo));
        assert_eq!(state.prompt, "cats");
        assert!(state.image.is_some());
    }

    #[test]
    fn test_submission_fields_per_mode() {
        let state = FormState {
            mode: GenerationMode::TextToVideo,
            prompt: "ocean waves".into(),
            duration: VideoDuration::Twenty,
            image: Some(png()),
            ..Default::default()
        };
        let submission = state.submission();
        assert_eq!(
            submission.fields,
            vec![
                ("type", "text-to-video".to_string()),
                ("prompt", "ocean waves".to_string()),
                ("duration", "20".to_string()),
            ]
        );
        assert!(submission.image.is_none());

        let state = FormState {
            mode: GenerationMode::ImageToImage,
            ..state
        };
        let submission = state.submission();
        assert_eq!(submission.fields.len(), 2);
        assert_eq!(submission.image, Some(png()));
    }

    #[test]
    fn test_second_submit_while_loading_is_ignored() {
        let state = FormState {
            prompt: "a red bicycle".into(),
            ..Default::default()
        };
        let (state, first) = step(state, FormAction::Submit);
        assert!(first.is_some());
        let (state, second) = step(state, FormAction::Submit);
        assert!(second.is_none());
        assert!(state.is_loading());
    }

    #[test]
    fn test_completion_clears_prior_error() {
        let (state, _) = step(FormState::default(), FormAction::Submit);
        assert!(state.error().is_some());

        let (state, _) = step(state, FormAction::SetPrompt("x".into()));
        let (state, _) = step(state, FormAction::Submit);
        assert!(state.error().is_none());

        let result = GenerationResult {
            media_url: "https://x/out.png".into(),
        };
        let (state, _) = step(state, FormAction::Completed(Ok(result.clone())));
        assert_eq!(state.result(), Some(&result));
        assert!(state.error().is_none());
    }

    #[test]
    fn test_rejected_submit_keeps_previous_result() {
        let state = FormState {
            prompt: "a red bicycle".into(),
            ..Default::default()
        };
        let (state, _) = step(state, FormAction::Submit);
        let result = GenerationResult {
            media_url: "https://x/bike.png".into(),
        };
        let (state, _) = step(state, FormAction::Completed(Ok(result.clone())));

        let (state, _) = step(state, FormAction::SetPrompt(String::new()));
        let (state, effect) = step(state, FormAction::Submit);
        assert!(effect.is_none());
        assert_eq!(state.result(), Some(&result));
        assert_eq!(state.error(), Some("prompt required"));

        let (state, _) = step(state, FormAction::SetPrompt("a blue bicycle".into()));
        let (state, effect) = step(state, FormAction::Submit);
        assert!(matches!(effect, Some(Effect::Send(_))));
        assert!(state.error().is_none());
        assert!(state.result().is_none());
    }

    #[test]
    fn test_failed_preview_stops_waiting() {
        let (state, _) = step(FormState::default(), FormAction::AttachImage(png()));
        assert!(state.preview_pending());
        let first_seq = state.preview_seq;

        let (state, _) = step(state, FormAction::AttachImage(png()));
        let (state, _) = step(state, FormAction::PreviewFailed { seq: first_seq });
        assert!(state.preview_pending());

        let seq = state.preview_seq;
        let (state, _) = step(state, FormAction::PreviewFailed { seq });
        assert!(!state.preview_pending());
        assert!(state.preview.is_none());
        assert!(state.image.is_some());
    }

    #[test]
    fn test_stale_preview_is_dropped() {
        let (state, first) = step(FormState::default(), FormAction::AttachImage(png()));
        let first_seq = match first {
            Some(Effect::ReadPreview { seq, .. }) => seq,
            other => panic!("unexpected effect {:?}", other),
        };
        let (state, _) = step(state, FormAction::AttachImage(png()));
        let (state, _) = step(
            state,
            FormAction::PreviewReady {
                seq: first_seq,
                data_url: "data:old".into(),
            },
        );
        assert!(state.preview.is_none());
        assert!(state.preview_pending());

        let seq = state.preview_seq;
        let (state, _) = step(
            state,
            FormAction::PreviewReady {
                seq,
                data_url: "data:new".into(),
            },
        );
        assert_eq!(state.preview.as_deref(), Some("data:new"));
    }
}
