//! Protocol visit-window arithmetic.

use chrono::{Duration, NaiveDate};

use crate::models::VisitType;

/// The allowed scheduling window for a protocol visit, inclusive on both
/// ends: `[baseline + offset - minus, baseline + offset + plus]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisitWindow {
    /// First allowed visit date
    pub earliest: NaiveDate,
    /// Last allowed visit date
    pub latest: NaiveDate,
}

impl VisitWindow {
    /// Compute the window for a visit type anchored at a baseline date.
    pub fn for_visit(baseline: NaiveDate, visit_type: &VisitType) -> Self {
        let target = baseline + Duration::days(visit_type.offset_days);
        Self {
            earliest: target - Duration::days(visit_type.window_minus_days),
            latest: target + Duration::days(visit_type.window_plus_days),
        }
    }

    /// Whether a date falls inside the window.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.earliest <= date && date <= self.latest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn week4() -> VisitType {
        let mut vt = VisitType::new("Week 4".into());
        vt.offset_days = 28;
        vt.window_minus_days = 3;
        vt.window_plus_days = 3;
        vt
    }

    #[test]
    fn test_window_bounds() {
        let window = VisitWindow::for_visit(date(2026, 2, 1), &week4());
        assert_eq!(window.earliest, date(2026, 2, 26));
        assert_eq!(window.latest, date(2026, 3, 4));
    }

    #[test]
    fn test_contains_inclusive() {
        let window = VisitWindow::for_visit(date(2026, 2, 1), &week4());

        assert!(window.contains(date(2026, 2, 26)));
        assert!(window.contains(date(2026, 3, 1)));
        assert!(window.contains(date(2026, 3, 4)));
        assert!(!window.contains(date(2026, 2, 25)));
        assert!(!window.contains(date(2026, 3, 5)));
    }

    #[test]
    fn test_zero_window_is_single_day() {
        let mut vt = VisitType::new("Baseline".into());
        vt.offset_days = 0;

        let window = VisitWindow::for_visit(date(2026, 2, 1), &vt);
        assert!(window.contains(date(2026, 2, 1)));
        assert!(!window.contains(date(2026, 2, 2)));
    }
}
