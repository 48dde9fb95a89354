use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::{
    client::{
        form::{update, Effect, FormAction, FormState},
        http::GenerateTransport,
        preview,
    },
    error::Result,
    models::{GenerationMode, ReferenceImage, VideoDuration},
};

/// Drives a [`FormState`] and runs its effects as background tasks.
///
/// Effects report back through an action channel, so a slow preview never
/// holds up a submission and vice versa. Must be used inside a tokio runtime.
pub struct FormController {
    state: FormState,
    transport: Arc<dyn GenerateTransport>,
    tx: mpsc::UnboundedSender<FormAction>,
    rx: mpsc::UnboundedReceiver<FormAction>,
}

impl FormController {
    pub fn new(transport: Arc<dyn GenerateTransport>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            state: FormState::default(),
            transport,
            tx,
            rx,
        }
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn select_mode(&mut self, mode: GenerationMode) {
        self.apply(FormAction::SelectMode(mode));
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.apply(FormAction::SetPrompt(prompt.into()));
    }

    pub fn set_duration(&mut self, duration: VideoDuration) {
        self.apply(FormAction::SetDuration(duration));
    }

    pub fn attach_image(&mut self, image: ReferenceImage) {
        self.apply(FormAction::AttachImage(image));
    }

    /// Reads a file from disk and attaches it. Unreadable files leave the form untouched.
    pub async fn attach_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let image = ReferenceImage::from_path(path).await?;
        self.attach_image(image);
        Ok(())
    }

    /// Returns false when the submission was rejected or a request is already in flight.
    pub fn submit(&mut self) -> bool {
        let was_loading = self.state.is_loading();
        self.apply(FormAction::Submit);
        !was_loading && self.state.is_loading()
    }

    pub fn apply(&mut self, action: FormAction) {
        let transition = update(std::mem::take(&mut self.state), action);
        self.state = transition.state;
        if let Some(effect) = transition.effect {
            self.spawn(effect);
        }
    }

    fn spawn(&self, effect: Effect) {
        let tx = self.tx.clone();
        match effect {
            Effect::ReadPreview { seq, image } => {
                tokio::spawn(async move {
                    let action = match preview::data_url(image).await {
                        Some(data_url) => FormAction::PreviewReady { seq, data_url },
                        None => FormAction::PreviewFailed { seq },
                    };
                    let _ = tx.send(action);
                });
            }
            Effect::Send(submission) => {
                let transport = self.transport.clone();
                tokio::spawn(async move {
                    let outcome = transport
                        .generate(submission)
                        .await
                        .map_err(|e| e.public_message());
                    if let Err(message) = &outcome {
                        log::warn!("Generation request failed: {}", message);
                    }
                    let _ = tx.send(FormAction::Completed(outcome));
                });
            }
        }
    }

    /// Waits until no request or preview is outstanding.
    pub async fn settle(&mut self) -> &FormState {
        while self.state.is_loading() || self.state.preview_pending() {
            match self.rx.recv().await {
                Some(action) => self.apply(action),
                None => break,
            }
        }
        &self.state
    }
}
