//! Time Together
//!
//! The counter on the celebration screen: how long since the day it all
//! started, in whole months, days, hours and minutes. Each field is a total,
//! not a remainder, so "3 months, 95 days" is expected.

use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Average month length used for the month count
const DAYS_PER_MONTH: f64 = 30.44;

/// Totals since the anniversary, each rounded down
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeTogether {
    /// Whole months (days / 30.44)
    pub months: u64,
    /// Whole days
    pub days: u64,
    /// Whole hours
    pub hours: u64,
    /// Whole minutes
    pub minutes: u64,
}

impl TimeTogether {
    /// Time from midnight of `since` until `now`
    ///
    /// A start date in the future counts as zero.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn between(since: NaiveDate, now: NaiveDateTime) -> Self {
        let start = since.and_time(chrono::NaiveTime::MIN);
        let elapsed = now.signed_duration_since(start);
        let minutes = elapsed.num_minutes().max(0) as u64;
        let hours = elapsed.num_hours().max(0) as u64;
        let days = elapsed.num_days().max(0) as u64;
        let months = (days as f64 / DAYS_PER_MONTH).floor() as u64;

        Self {
            months,
            days,
            hours,
            minutes,
        }
    }

    /// Time from `since` until now, on the local clock
    #[must_use]
    pub fn since(since: NaiveDate) -> Self {
        Self::between(since, Local::now().naive_local())
    }
}
