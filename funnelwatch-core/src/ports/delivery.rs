// funnelwatch-core/src/ports/delivery.rs

use chrono::NaiveDate;
use std::path::PathBuf;

use crate::error::FunnelError;

/// Ships a finished report. Mail transport lives behind this trait.
pub trait Delivery: Send + Sync {
    /// Returns where the report was handed off.
    fn deliver(&self, window_end: NaiveDate, subject: &str, body: &str)
    -> Result<PathBuf, FunnelError>;
}
