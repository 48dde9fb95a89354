pub mod controller;
pub mod form;
pub mod http;
pub mod preview;

pub use controller::FormController;
pub use form::{update, Effect, FormAction, FormState, Phase, Submission, Transition};
pub use http::{GenerateTransport, HttpGenerateClient};
