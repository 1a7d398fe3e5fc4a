// funnelwatch-core/src/domain/funnel/model.rs
//
// Funnel vocabulary (ordered stages, conversion goals) and the pure math on top of it.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::snapshot::Counters;
use crate::domain::error::DomainError;

/// An ordered journey milestone (Visit, Content View, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    pub name: String,
    pub count: u64,
}

impl Stage {
    pub fn new(name: impl Into<String>, count: u64) -> Self {
        Self {
            name: name.into(),
            count,
        }
    }
}

/// A terminal business event (Form Submission, Purchase, ...). Never part of the stage order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionGoal {
    pub name: String,
    pub count: u64,
}

impl ConversionGoal {
    pub fn new(name: impl Into<String>, count: u64) -> Self {
        Self {
            name: name.into(),
            count,
        }
    }
}

/// Transition between two adjacent stages.
///
/// `drop_off_rate` is `1 - to/from`. It is `None` when `from_count == 0` and may be
/// negative when the later stage saw more events than the earlier one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropOff {
    pub from_stage: String,
    pub to_stage: String,
    pub from_count: u64,
    pub to_count: u64,
    pub drop_off_rate: Option<f64>,
}

impl DropOff {
    /// Later stage counted more than its predecessor.
    pub fn is_negative(&self) -> bool {
        self.to_count > self.from_count
    }
}

/// Immutable funnel vocabulary. Built once from configuration and passed explicitly,
/// so several funnels can coexist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunnelDefinition {
    stages: Vec<String>,
    goals: Vec<String>,
    session_stage: usize,
}

impl FunnelDefinition {
    /// Fixes the canonical stage order and the goal vocabulary.
    pub fn new<S, G>(stages: S, goals: G) -> Result<Self, DomainError>
    where
        S: IntoIterator,
        S::Item: Into<String>,
        G: IntoIterator,
        G::Item: Into<String>,
    {
        let stages: Vec<String> = stages.into_iter().map(Into::into).collect();
        let goals: Vec<String> = goals.into_iter().map(Into::into).collect();

        if stages.is_empty() {
            return Err(DomainError::Configuration(
                "a funnel needs at least one stage".to_string(),
            ));
        }
        ensure_unique("stage", &stages)?;
        ensure_unique("goal", &goals)?;

        if let Some(clash) = goals.iter().find(|g| stages.contains(g)) {
            return Err(DomainError::Configuration(format!(
                "'{}' is declared both as a stage and as a conversion goal",
                clash
            )));
        }

        Ok(Self {
            stages,
            goals,
            session_stage: 0,
        })
    }

    /// Selects the stage whose count stands for "sessions". Defaults to the first stage.
    pub fn with_session_stage(mut self, name: &str) -> Result<Self, DomainError> {
        self.session_stage = self.stage_index(name).ok_or_else(|| {
            DomainError::Configuration(format!(
                "session stage '{}' is not one of the funnel stages {:?}",
                name, self.stages
            ))
        })?;
        Ok(self)
    }

    pub fn stages(&self) -> &[String] {
        &self.stages
    }

    pub fn goals(&self) -> &[String] {
        &self.goals
    }

    pub fn session_stage(&self) -> &str {
        // session_stage is always a valid index (checked on construction)
        self.stages
            .get(self.session_stage)
            .map(String::as_str)
            .unwrap_or_default()
    }

    pub fn stage_index(&self, name: &str) -> Option<usize> {
        self.stages.iter().position(|s| s == name)
    }

    pub fn check_stage_names<'a, I>(&self, names: I) -> Result<(), DomainError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        check_known("stage", &self.stages, names)
    }

    pub fn check_goal_names<'a, I>(&self, names: I) -> Result<(), DomainError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        check_known("conversion goal", &self.goals, names)
    }

    /// Lays counters out in the canonical stage order. Declared stages absent from
    /// `counts` had no events and count as zero.
    pub fn order_stages(&self, counts: &Counters) -> Result<Vec<Stage>, DomainError> {
        self.check_stage_names(counts.keys().map(String::as_str))?;
        Ok(self
            .stages
            .iter()
            .map(|name| Stage::new(name.clone(), counts.get(name).copied().unwrap_or(0)))
            .collect())
    }

    /// Same as `order_stages`, for the goal vocabulary.
    pub fn order_goals(&self, counts: &Counters) -> Result<Vec<ConversionGoal>, DomainError> {
        self.check_goal_names(counts.keys().map(String::as_str))?;
        Ok(self
            .goals
            .iter()
            .map(|name| ConversionGoal::new(name.clone(), counts.get(name).copied().unwrap_or(0)))
            .collect())
    }

    /// Drop-off for each adjacent pair of the fixed order: exactly `stages - 1` entries.
    pub fn compute_drop_offs(&self, counts: &Counters) -> Result<Vec<DropOff>, DomainError> {
        let ordered = self.order_stages(counts)?;
        Ok(drop_offs_between(&ordered))
    }
}

/// Drop-offs over an already ordered stage list.
pub fn drop_offs_between(stages: &[Stage]) -> Vec<DropOff> {
    stages
        .windows(2)
        .map(|pair| {
            let (from, to) = (&pair[0], &pair[1]);
            DropOff {
                from_stage: from.name.clone(),
                to_stage: to.name.clone(),
                from_count: from.count,
                to_count: to.count,
                drop_off_rate: drop_off_rate(from.count, to.count),
            }
        })
        .collect()
}

/// `1 - to/from`, not clamped. `None` when there is nothing to drop from.
pub fn drop_off_rate(from_count: u64, to_count: u64) -> Option<f64> {
    if from_count == 0 {
        return None;
    }
    Some(1.0 - to_count as f64 / from_count as f64)
}

/// Conversions per session. 0.0 when no session was recorded (never inf or NaN).
pub fn compute_conversion_rate(total_conversions: u64, total_sessions: u64) -> f64 {
    if total_sessions == 0 {
        return 0.0;
    }
    total_conversions as f64 / total_sessions as f64
}

fn ensure_unique(kind: &str, names: &[String]) -> Result<(), DomainError> {
    let mut seen = HashSet::new();
    for name in names {
        if name.trim().is_empty() {
            return Err(DomainError::Configuration(format!(
                "empty {} name in funnel definition",
                kind
            )));
        }
        if !seen.insert(name.as_str()) {
            return Err(DomainError::Configuration(format!(
                "duplicate {} name '{}'",
                kind, name
            )));
        }
    }
    Ok(())
}

fn check_known<'a, I>(kind: &str, declared: &[String], names: I) -> Result<(), DomainError>
where
    I: IntoIterator<Item = &'a str>,
{
    let unknown: Vec<&str> = names
        .into_iter()
        .filter(|n| !declared.iter().any(|d| d == n))
        .collect();
    if unknown.is_empty() {
        return Ok(());
    }
    Err(DomainError::Configuration(format!(
        "unknown {} name(s) {:?}; declared: {:?}",
        kind, unknown, declared
    )))
}
