// funnelwatch-core/src/error.rs

use crate::domain::error::DomainError;
use crate::infrastructure::error::InfrastructureError;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum FunnelError {
    // --- DOMAIN ERRORS (vocabulary, missing snapshots, source failures) ---
    #[error(transparent)]
    #[diagnostic(transparent)]
    Domain(#[from] DomainError),

    // --- INFRASTRUCTURE ERRORS (IO, Parsing, Templates) ---
    #[error(transparent)]
    #[diagnostic(transparent)]
    Infrastructure(#[from] InfrastructureError),
}

impl FunnelError {
    /// True when the error means "this (date, category) was never collected".
    pub fn is_not_found(&self) -> bool {
        matches!(self, FunnelError::Domain(DomainError::NotFound { .. }))
    }
}

// Manual implementations so `?` works on raw IO / JSON calls
impl From<std::io::Error> for FunnelError {
    fn from(err: std::io::Error) -> Self {
        FunnelError::Infrastructure(InfrastructureError::Io(err))
    }
}

impl From<serde_json::Error> for FunnelError {
    fn from(err: serde_json::Error) -> Self {
        FunnelError::Infrastructure(InfrastructureError::Json(err))
    }
}
