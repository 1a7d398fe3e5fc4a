// funnelwatch-core/src/domain/funnel/anomaly.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::model::DropOff;

pub const INSTRUMENTATION_MISMATCH: &str = "instrumentation/order mismatch";

/// Sessions above which a window without any conversion is suspicious.
pub const MISSING_CONVERSIONS_MIN_SESSIONS: u64 = 10;

/// Data-quality finding attached to an aggregated funnel. Never an error:
/// the numbers are delivered unchanged, the warning travels with them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FunnelWarning {
    /// A stage counted more events than its predecessor.
    NegativeDropOff {
        stage_pair: (String, String),
        observed_counts: (u64, u64),
        likely_cause: String,
    },
    /// Conversions were recorded in a window without a single session.
    ConversionsWithoutSessions {
        session_stage: String,
        total_conversions: u64,
    },
    /// Steady traffic but not a single conversion: goal tracking is likely broken.
    MissingConversions {
        session_stage: String,
        total_sessions: u64,
    },
    /// Some days of the window were never collected.
    PartialCoverage {
        window_days: u32,
        days_covered: u32,
        missing_dates: Vec<NaiveDate>,
    },
}

impl fmt::Display for FunnelWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NegativeDropOff {
                stage_pair: (from, to),
                observed_counts: (from_count, to_count),
                likely_cause,
            } => write!(
                f,
                "Negative drop-off {} -> {} ({} -> {}): likely {}",
                from, to, from_count, to_count, likely_cause
            ),
            Self::ConversionsWithoutSessions {
                session_stage,
                total_conversions,
            } => write!(
                f,
                "{} conversion(s) recorded with zero '{}' sessions: likely a tracking defect",
                total_conversions, session_stage
            ),
            Self::MissingConversions {
                session_stage,
                total_sessions,
            } => write!(
                f,
                "No conversion recorded across {} '{}' sessions: verify goal tracking",
                total_sessions, session_stage
            ),
            Self::PartialCoverage {
                window_days,
                days_covered,
                missing_dates,
            } => {
                let missing: Vec<String> = missing_dates.iter().map(|d| d.to_string()).collect();
                write!(
                    f,
                    "Partial coverage: {}/{} days collected, missing {}",
                    days_covered,
                    window_days,
                    missing.join(", ")
                )
            }
        }
    }
}

pub struct AnomalyChecks;

impl AnomalyChecks {
    /// One warning per adjacent pair where the later stage exceeds the earlier one.
    pub fn check_monotonicity(drop_offs: &[DropOff]) -> Vec<FunnelWarning> {
        drop_offs
            .iter()
            .filter(|d| d.is_negative())
            .map(|d| FunnelWarning::NegativeDropOff {
                stage_pair: (d.from_stage.clone(), d.to_stage.clone()),
                observed_counts: (d.from_count, d.to_count),
                likely_cause: INSTRUMENTATION_MISMATCH.to_string(),
            })
            .collect()
    }

    pub fn check_zero_denominator(
        session_stage: &str,
        total_sessions: u64,
        total_conversions: u64,
    ) -> Option<FunnelWarning> {
        (total_sessions == 0 && total_conversions > 0).then(|| {
            FunnelWarning::ConversionsWithoutSessions {
                session_stage: session_stage.to_string(),
                total_conversions,
            }
        })
    }

    /// Only meaningful when the funnel declares goals at all.
    pub fn check_missing_conversions(
        session_stage: &str,
        goals_tracked: bool,
        total_sessions: u64,
        total_conversions: u64,
    ) -> Option<FunnelWarning> {
        (goals_tracked
            && total_sessions > MISSING_CONVERSIONS_MIN_SESSIONS
            && total_conversions == 0)
            .then(|| FunnelWarning::MissingConversions {
                session_stage: session_stage.to_string(),
                total_sessions,
            })
    }

    pub fn check_coverage(
        window_days: u32,
        days_covered: u32,
        missing_dates: &[NaiveDate],
    ) -> Option<FunnelWarning> {
        (days_covered < window_days).then(|| FunnelWarning::PartialCoverage {
            window_days,
            days_covered,
            missing_dates: missing_dates.to_vec(),
        })
    }

    /// Runs every check, in a fixed order: coverage, monotonicity, zero-denominator,
    /// missing conversions.
    pub fn validate(
        drop_offs: &[DropOff],
        session_stage: &str,
        goals_tracked: bool,
        total_sessions: u64,
        total_conversions: u64,
        window_days: u32,
        missing_dates: &[NaiveDate],
    ) -> Vec<FunnelWarning> {
        let days_covered = window_days.saturating_sub(missing_dates.len() as u32);
        let mut warnings = Vec::new();
        warnings.extend(Self::check_coverage(window_days, days_covered, missing_dates));
        warnings.extend(Self::check_monotonicity(drop_offs));
        warnings.extend(Self::check_zero_denominator(
            session_stage,
            total_sessions,
            total_conversions,
        ));
        warnings.extend(Self::check_missing_conversions(
            session_stage,
            goals_tracked,
            total_sessions,
            total_conversions,
        ));
        warnings
    }
}
