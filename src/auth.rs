//! Credential models and secret resolution.

pub mod provider;
pub mod secret;

pub use provider::*;
pub use secret::*;
