// funnelwatch/src/commands/mod.rs

pub mod analyze;
pub mod collect;
pub mod show;
pub mod status;

use chrono::{Local, NaiveDate};

/// Default collection day: yesterday in local time (today is still accumulating).
pub fn yesterday() -> NaiveDate {
    let today = Local::now().date_naive();
    today.pred_opt().unwrap_or(today)
}
