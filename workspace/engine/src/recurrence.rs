use chrono::{Duration, Months, NaiveDate};
use model::entities::recurring_transaction_template::Frequency;

/// Computes the next occurrence date after `current` for the given
/// frequency.
///
/// Month-based frequencies follow calendar-month arithmetic with
/// end-of-month clamping: Jan 31 + one month is Feb 28 (or Feb 29 in a
/// leap year), never a rollover into March. `Custom` advances by
/// `custom_interval_days`, falling back to one day when the interval is
/// absent or non-positive so the schedule always moves forward.
///
/// Pure and total: never fails for any input date.
pub fn next_occurrence(
    current: NaiveDate,
    frequency: Frequency,
    custom_interval_days: Option<i32>,
) -> NaiveDate {
    match frequency {
        Frequency::Daily => add_days(current, 1),
        Frequency::Weekly => add_days(current, 7),
        Frequency::Biweekly => add_days(current, 14),
        Frequency::Monthly => add_months(current, 1),
        Frequency::Quarterly => add_months(current, 3),
        Frequency::SemiAnnually => add_months(current, 6),
        Frequency::Annually => add_months(current, 12),
        Frequency::Custom => {
            let days = custom_interval_days.filter(|d| *d > 0).unwrap_or(1);
            add_days(current, i64::from(days))
        }
    }
}

// Saturates at the edge of the representable calendar range.
fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    date.checked_add_signed(Duration::days(days)).unwrap_or(date)
}

fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_add_months(Months::new(months)).unwrap_or(date)
}
