//! Core types for faultline
//!
//! Status classification, the [`HttpError`] seam for domain errors, and
//! synthesis of protocol headers carried by error responses.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod error;
pub mod headers;
mod status;

pub use error::HttpError;
pub use headers::{AuthChallenge, Challenge, ChallengeParams, HeaderError};
pub use status::{ErrorStatus, InvalidStatus, StatusClass};
