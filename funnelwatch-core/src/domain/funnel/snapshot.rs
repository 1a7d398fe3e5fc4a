// funnelwatch-core/src/domain/funnel/snapshot.rs

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::model::{ConversionGoal, Stage};

/// Metric name -> count. Ordered so that every serialization is stable.
pub type Counters = BTreeMap<String, u64>;

/// The four payloads stored per day. Each one is an independent record in the
/// date partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricCategory {
    Stages,
    Goals,
    TrafficSources,
    Pages,
}

impl MetricCategory {
    pub const ALL: [MetricCategory; 4] = [
        MetricCategory::Stages,
        MetricCategory::Goals,
        MetricCategory::TrafficSources,
        MetricCategory::Pages,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stages => "stages",
            Self::Goals => "goals",
            Self::TrafficSources => "traffic_sources",
            Self::Pages => "pages",
        }
    }
}

impl fmt::Display for MetricCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for MetricCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "stages" => Ok(Self::Stages),
            "goals" => Ok(Self::Goals),
            "traffic_sources" => Ok(Self::TrafficSources),
            "pages" => Ok(Self::Pages),
            _ => Err(format!("Unknown metric category: {}", s)),
        }
    }
}

/// One persisted artifact: a single category of a single day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRecord {
    pub date: NaiveDate,
    pub category: MetricCategory,
    pub metrics: Counters,
}

/// Daily state of the funnel, as produced by one collection run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunnelSnapshot {
    pub date: NaiveDate,
    pub stages: Vec<Stage>,
    pub goals: Vec<ConversionGoal>,
    pub traffic_sources: Counters,
    pub pages: Counters,
}

impl FunnelSnapshot {
    /// Flattens one category into the map that gets persisted.
    pub fn payload(&self, category: MetricCategory) -> Counters {
        match category {
            MetricCategory::Stages => self
                .stages
                .iter()
                .map(|s| (s.name.clone(), s.count))
                .collect(),
            MetricCategory::Goals => self
                .goals
                .iter()
                .map(|g| (g.name.clone(), g.count))
                .collect(),
            MetricCategory::TrafficSources => self.traffic_sources.clone(),
            MetricCategory::Pages => self.pages.clone(),
        }
    }

    pub fn record(&self, category: MetricCategory) -> CategoryRecord {
        CategoryRecord {
            date: self.date,
            category,
            metrics: self.payload(category),
        }
    }
}

/// Calendar days of a trailing window ending on `end_date` (inclusive), oldest first.
pub fn trailing_window(end_date: NaiveDate, window_days: u32) -> Vec<NaiveDate> {
    let mut dates: Vec<NaiveDate> = (0..u64::from(window_days))
        .filter_map(|offset| end_date.checked_sub_days(Days::new(offset)))
        .collect();
    dates.reverse();
    dates
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_category_display_and_parsing() {
        for category in MetricCategory::ALL {
            assert_eq!(
                MetricCategory::from_str(category.as_str()).unwrap(),
                category
            );
        }
        assert_eq!(
            MetricCategory::from_str("Traffic-Sources").unwrap(),
            MetricCategory::TrafficSources
        );
        assert!(MetricCategory::from_str("devices").is_err());
    }

    #[test]
    fn test_trailing_window_is_inclusive_and_chronological() {
        let window = trailing_window(date("2025-11-11"), 7);
        assert_eq!(window.len(), 7);
        assert_eq!(window.first(), Some(&date("2025-11-05")));
        assert_eq!(window.last(), Some(&date("2025-11-11")));
    }

    #[test]
    fn test_trailing_window_crosses_month_boundary() {
        let window = trailing_window(date("2025-12-02"), 3);
        assert_eq!(
            window,
            vec![date("2025-11-30"), date("2025-12-01"), date("2025-12-02")]
        );
    }

    #[test]
    fn test_payload_flattens_ordered_stages() {
        let snapshot = FunnelSnapshot {
            date: date("2025-11-10"),
            stages: vec![Stage::new("Visit", 10), Stage::new("Engaged", 4)],
            goals: vec![ConversionGoal::new("Purchase", 1)],
            traffic_sources: Counters::new(),
            pages: Counters::new(),
        };

        let stages = snapshot.payload(MetricCategory::Stages);
        assert_eq!(stages.get("Visit"), Some(&10));
        assert_eq!(stages.get("Engaged"), Some(&4));

        let record = snapshot.record(MetricCategory::Goals);
        assert_eq!(record.category, MetricCategory::Goals);
        assert_eq!(record.metrics.get("Purchase"), Some(&1));
    }
}
