// funnelwatch-core/src/domain/error.rs

use chrono::NaiveDate;
use miette::Diagnostic;
use thiserror::Error;

use crate::domain::funnel::snapshot::MetricCategory;

#[derive(Error, Debug, Diagnostic)]
pub enum DomainError {
    #[error("Configuration Error: {0}")]
    #[diagnostic(
        code(funnelwatch::domain::configuration),
        help("Check the `funnel` section of funnelwatch.yaml: stage and goal names must be declared once.")
    )]
    Configuration(String),

    #[error("No '{category}' snapshot stored for {date}")]
    #[diagnostic(
        code(funnelwatch::domain::not_found),
        help("Run `funnelwatch collect --date {date}` to collect that day.")
    )]
    NotFound {
        date: NaiveDate,
        category: MetricCategory,
    },

    #[error("Metric source unavailable for {date}: {reason}")]
    #[diagnostic(
        code(funnelwatch::domain::source_unavailable),
        help("Nothing was written for this day. Re-run the collection once the source is back.")
    )]
    SourceUnavailable { date: NaiveDate, reason: String },

    #[error("Insufficient data: no snapshot collected between {window_start} and {window_end}")]
    #[diagnostic(code(funnelwatch::domain::insufficient_data))]
    InsufficientData {
        window_start: NaiveDate,
        window_end: NaiveDate,
    },
}
