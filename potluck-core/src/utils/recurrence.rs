//! Date arithmetic for recurring events.

use time::{Date, Duration, Month, OffsetDateTime};

/// Calendar offset between two occurrences of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Offset {
    pub months: i32,
    pub days: i64,
}

impl Offset {
    pub const ZERO: Offset = Offset { months: 0, days: 0 };

    const fn days(days: i64) -> Self {
        Offset { months: 0, days }
    }

    const fn months(months: i32) -> Self {
        Offset { months, days: 0 }
    }

    /// Offset used when a series advances to its next occurrence.
    ///
    /// Labels outside `Daily`, `Weekly`, `Bi-Weekly` and `Monthly` yield
    /// [`Offset::ZERO`].
    pub fn finish(label: &str) -> Self {
        match label {
            "Daily" => Offset::days(1),
            "Weekly" => Offset::days(7),
            "Bi-Weekly" => Offset::days(14),
            "Monthly" => Offset::months(1),
            other => {
                tracing::warn!(recurrence = %other, "Unrecognized recurrence label, date not advanced");
                Offset::ZERO
            }
        }
    }

    /// Offset used when a single occurrence is pushed back. Only weekly
    /// cadences can be skipped.
    pub fn skip(label: &str) -> Self {
        match label {
            "Weekly" => Offset::days(7),
            "Bi-Weekly" => Offset::days(14),
            other => {
                tracing::debug!(recurrence = %other, "Recurrence label cannot be skipped");
                Offset::ZERO
            }
        }
    }

    pub fn is_zero(&self) -> bool {
        self.months == 0 && self.days == 0
    }

    /// Shift `date` by this offset, keeping time of day and UTC offset.
    ///
    /// Month arithmetic normalizes overflowing days into the following
    /// month, so Jan 31 plus one month lands on Mar 3 (or Mar 2 in a leap
    /// year). Returns `None` when the result leaves the supported range.
    pub fn apply(&self, date: OffsetDateTime) -> Option<OffsetDateTime> {
        let shifted = if self.months == 0 {
            date
        } else {
            let index = date.year() * 12 + (date.month() as i32 - 1) + self.months;
            let month = Month::try_from((index.rem_euclid(12) + 1) as u8).ok()?;
            let first = Date::from_calendar_date(index.div_euclid(12), month, 1).ok()?;
            let day = first.checked_add(Duration::days(i64::from(date.day()) - 1))?;
            date.replace_date(day)
        };
        shifted.checked_add(Duration::days(self.days))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_finish_offsets() {
        let d = datetime!(2025-03-02 18:00 UTC);
        let advance = |label: &str| Offset::finish(label).apply(d).unwrap();

        assert_eq!(advance("Daily"), datetime!(2025-03-03 18:00 UTC));
        assert_eq!(advance("Weekly"), datetime!(2025-03-09 18:00 UTC));
        assert_eq!(advance("Bi-Weekly"), datetime!(2025-03-16 18:00 UTC));
        assert_eq!(advance("Monthly"), datetime!(2025-04-02 18:00 UTC));
        assert_eq!(advance("Fortnightly"), d);
        assert_eq!(advance(""), d);
    }

    #[test]
    fn test_skip_only_knows_weekly_cadences() {
        assert_eq!(Offset::skip("Weekly"), Offset::finish("Weekly"));
        assert_eq!(Offset::skip("Bi-Weekly"), Offset::finish("Bi-Weekly"));
        assert!(Offset::skip("Daily").is_zero());
        assert!(Offset::skip("Monthly").is_zero());
    }

    #[test]
    fn test_month_overflow_normalizes() {
        let monthly = Offset::finish("Monthly");
        assert_eq!(
            monthly.apply(datetime!(2025-01-31 12:00 UTC)).unwrap(),
            datetime!(2025-03-03 12:00 UTC)
        );
        assert_eq!(
            monthly.apply(datetime!(2024-01-31 12:00 UTC)).unwrap(),
            datetime!(2024-03-02 12:00 UTC)
        );
        assert_eq!(
            monthly.apply(datetime!(2024-12-15 09:30 +2)).unwrap(),
            datetime!(2025-01-15 09:30 +2)
        );
    }
}
