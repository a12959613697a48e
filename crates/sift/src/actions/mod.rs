//! Email actions module
//!
//! - `MailService`: the mutation capability rules act through
//! - `dispatch`: runs a matched rule's actions in order
//! - `ActionHandler`: Gmail-backed `MailService` over a `LabelModifier`
//! - `RecordingMailService`: records calls instead of sending them

mod dispatcher;
mod handler;
mod recording;
mod service;

pub use dispatcher::{DispatchReport, FailurePolicy, dispatch};
pub use handler::{ActionHandler, LabelModifier};
pub use recording::{MailCall, RecordingMailService};
pub use service::{MailService, labels};
