pub mod error;
pub mod funnel;
pub mod project;

// Re-exports to simplify imports elsewhere
pub use error::DomainError;
