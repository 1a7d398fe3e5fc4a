// funnelwatch-core/src/domain/funnel/benchmark.rs

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::model::DropOff;

/// Thresholds the aggregated funnel is compared against.
/// Defaults follow the usual B2B lead-gen band (2-5% conversion rate).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_band"))]
pub struct BenchmarkConfig {
    #[serde(rename = "conversion-rate-min", default = "default_rate_min")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub conversion_rate_min: f64,

    #[serde(rename = "conversion-rate-max", default = "default_rate_max")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub conversion_rate_max: f64,

    #[serde(rename = "max-drop-off", default = "default_max_drop_off")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub max_drop_off: f64,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            conversion_rate_min: default_rate_min(),
            conversion_rate_max: default_rate_max(),
            max_drop_off: default_max_drop_off(),
        }
    }
}

fn default_rate_min() -> f64 {
    0.02
}
fn default_rate_max() -> f64 {
    0.05
}
fn default_max_drop_off() -> f64 {
    0.8
}

fn validate_band(cfg: &BenchmarkConfig) -> Result<(), ValidationError> {
    if cfg.conversion_rate_min > cfg.conversion_rate_max {
        return Err(ValidationError::new("conversion_rate_band_inverted"));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateStanding {
    Below,
    Within,
    Above,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighDropOff {
    pub from_stage: String,
    pub to_stage: String,
    pub drop_off_rate: f64,
    pub threshold: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub conversion_rate_band: (f64, f64),
    /// `None` when no session was recorded: there is no rate to compare.
    pub conversion_rate_standing: Option<RateStanding>,
    pub high_drop_offs: Vec<HighDropOff>,
}

impl BenchmarkConfig {
    pub fn assess(
        &self,
        conversion_rate: f64,
        total_sessions: u64,
        drop_offs: &[DropOff],
    ) -> BenchmarkReport {
        let standing = (total_sessions > 0).then(|| {
            if conversion_rate < self.conversion_rate_min {
                RateStanding::Below
            } else if conversion_rate > self.conversion_rate_max {
                RateStanding::Above
            } else {
                RateStanding::Within
            }
        });

        let high_drop_offs = drop_offs
            .iter()
            .filter_map(|d| {
                let rate = d.drop_off_rate?;
                (rate > self.max_drop_off).then(|| HighDropOff {
                    from_stage: d.from_stage.clone(),
                    to_stage: d.to_stage.clone(),
                    drop_off_rate: rate,
                    threshold: self.max_drop_off,
                })
            })
            .collect();

        BenchmarkReport {
            conversion_rate_band: (self.conversion_rate_min, self.conversion_rate_max),
            conversion_rate_standing: standing,
            high_drop_offs,
        }
    }
}

/// Transition losing the largest share of its predecessor. Null rates are ignored.
pub fn biggest_drop_off(drop_offs: &[DropOff]) -> Option<DropOff> {
    drop_offs
        .iter()
        .filter(|d| d.drop_off_rate.is_some())
        .fold(None::<&DropOff>, |best, d| match best {
            Some(b) if b.drop_off_rate >= d.drop_off_rate => Some(b),
            _ => Some(d),
        })
        .cloned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::funnel::model::{Stage, drop_offs_between};

    fn drops() -> Vec<DropOff> {
        drop_offs_between(&[
            Stage::new("Visit", 316),
            Stage::new("ContentView", 250),
            Stage::new("Engaged", 40),
            Stage::new("Interaction", 0),
            Stage::new("Return", 0),
        ])
    }

    #[test]
    fn test_rate_standing() {
        let cfg = BenchmarkConfig::default();
        assert_eq!(
            cfg.assess(0.0222, 316, &[]).conversion_rate_standing,
            Some(RateStanding::Within)
        );
        assert_eq!(
            cfg.assess(0.01, 316, &[]).conversion_rate_standing,
            Some(RateStanding::Below)
        );
        assert_eq!(
            cfg.assess(0.2, 316, &[]).conversion_rate_standing,
            Some(RateStanding::Above)
        );
        assert_eq!(cfg.assess(0.0, 0, &[]).conversion_rate_standing, None);
    }

    #[test]
    fn test_high_drop_offs_ignore_null_rates() {
        let report = BenchmarkConfig::default().assess(0.03, 316, &drops());
        // Engaged -> Interaction loses 100%; Interaction -> Return has no rate.
        assert_eq!(report.high_drop_offs.len(), 2);
        assert_eq!(report.high_drop_offs[0].from_stage, "ContentView");
        assert_eq!(report.high_drop_offs[1].from_stage, "Engaged");
    }

    #[test]
    fn test_biggest_drop_off_picks_first_maximum() {
        let biggest = biggest_drop_off(&drops()).unwrap();
        assert_eq!(biggest.from_stage, "Engaged");
        assert_eq!(biggest.to_stage, "Interaction");
        assert!(biggest_drop_off(&[]).is_none());
    }

    #[test]
    fn test_inverted_band_fails_validation() {
        let cfg = BenchmarkConfig {
            conversion_rate_min: 0.1,
            conversion_rate_max: 0.05,
            max_drop_off: 0.5,
        };
        assert!(cfg.validate().is_err());
        assert!(BenchmarkConfig::default().validate().is_ok());
    }
}
