use faultline_core::{HeaderError, InvalidStatus};

/// Errors raised while constructing a fault
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// Status code outside the error range
    #[error(transparent)]
    Status(#[from] InvalidStatus),

    /// A protocol header could not be synthesized
    #[error(transparent)]
    Header(#[from] HeaderError),
}
