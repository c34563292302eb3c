//! HTTP-aware error decoration
//!
//! A [`Fault`] wraps an arbitrary error, or stands on its own, and describes
//! the HTTP response a serving layer should send for it: status, reason
//! phrase, JSON payload, and headers. Server error messages stay out of the
//! payload unless rendering in debug mode.
//!
//! ```
//! use faultline_fault::{ErrorStatus, Fault, WrapOptions};
//!
//! let err = std::io::Error::other("connection reset");
//! let fault = Fault::wrap(err, WrapOptions::new().status(ErrorStatus::BAD_GATEWAY));
//!
//! assert_eq!(fault.message(), "connection reset");
//! assert_eq!(
//!     fault.output().payload.message.as_deref(),
//!     Some("An internal server error occurred")
//! );
//! ```

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod constructors;
mod error;
mod fault;
mod output;
mod render;
mod wrap;

pub use error::BuildError;
pub use fault::{Fault, FaultBuilder};
pub use output::{Output, Payload, PayloadAttributes};
pub use wrap::{ResultExt, WrapOptions};

pub use faultline_config::RenderConfig;
pub use faultline_core::{AuthChallenge, Challenge, ChallengeParams, ErrorStatus, HeaderError, HttpError, StatusClass};

/// Boxed error accepted by [`Fault::wrap`]
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;
