//! Domain models for mail entities

mod email;

pub use email::{Email, EmailBuilder, EmailId};
