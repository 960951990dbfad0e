//! Month-over-month spending summary.
//!
//! Compares the current month (first day through today) against the whole
//! previous month: number of transactions and total amount spent.

use chrono::{Datelike, Months, NaiveDate};
use tracing::warn;

use crate::api::ApiClient;
use crate::models::{Transaction, DEFAULT_CURRENCY};

/// Inclusive date range sent to `/transaction/date-range`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthRanges {
    pub current: DateRange,
    pub previous: DateRange,
}

/// Ranges for the month containing `today` (up to today) and the month before
pub fn month_ranges(today: NaiveDate) -> MonthRanges {
    let first_of_month = today.with_day(1).unwrap_or(today);
    let previous_start = first_of_month
        .checked_sub_months(Months::new(1))
        .unwrap_or(first_of_month);
    let previous_end = first_of_month.pred_opt().unwrap_or(first_of_month);

    MonthRanges {
        current: DateRange {
            start: first_of_month,
            end: today,
        },
        previous: DateRange {
            start: previous_start,
            end: previous_end,
        },
    }
}

/// Signed whole-number percentage from `previous` to `current`.
/// With nothing to compare against the change reads `"+100%"`.
pub fn percent_change(current: f64, previous: f64) -> String {
    if previous == 0.0 {
        return "+100%".to_string();
    }
    let change = (current - previous) / previous * 100.0;
    let sign = if change >= 0.0 { "+" } else { "" };
    format!("{}{:.0}%", sign, change.round())
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PeriodTotals {
    pub count: usize,
    pub spent: f64,
}

impl PeriodTotals {
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        Self {
            count: transactions.len(),
            spent: transactions.iter().map(|t| t.amount).sum(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlySummary {
    pub current: PeriodTotals,
    pub previous: PeriodTotals,
    pub currency: String,
}

impl MonthlySummary {
    pub fn transactions_change(&self) -> String {
        percent_change(self.current.count as f64, self.previous.count as f64)
    }

    pub fn spending_change(&self) -> String {
        percent_change(self.current.spent, self.previous.spent)
    }
}

/// Fetch both months and the user's currency concurrently. A failed request
/// only blanks its own part of the summary.
pub async fn fetch_monthly_summary(api: &ApiClient, today: NaiveDate) -> MonthlySummary {
    let ranges = month_ranges(today);

    let (current, previous, settings) = futures::join!(
        api.fetch_transactions(ranges.current.start, ranges.current.end),
        api.fetch_transactions(ranges.previous.start, ranges.previous.end),
        api.fetch_settings(),
    );

    let current = match current {
        Ok(list) => PeriodTotals::from_transactions(&list),
        Err(e) => {
            warn!(error = %e, "Failed to fetch current month transactions");
            PeriodTotals::default()
        }
    };
    let previous = match previous {
        Ok(list) => PeriodTotals::from_transactions(&list),
        Err(e) => {
            warn!(error = %e, "Failed to fetch previous month transactions");
            PeriodTotals::default()
        }
    };
    let currency = match settings {
        Ok(s) => s.currency().to_string(),
        Err(e) => {
            warn!(error = %e, "Failed to fetch user settings");
            DEFAULT_CURRENCY.to_string()
        }
    };

    MonthlySummary {
        current,
        previous,
        currency,
    }
}
