//! Dekad resolution properties: exact known resolutions plus full-month
//! coverage for representative month lengths.

use chrono::{Datelike, Duration, NaiveDate, Timelike};
use eo_common::dekad::{Dekad, DekadLabel};

fn resolve(year: i32, month: u32, label: DekadLabel) -> eo_common::DekadResolution {
    Dekad::new(year, month, label).unwrap().resolve()
}

// ============================================================================
// Exact resolutions
// ============================================================================

#[test]
fn test_resolve_january_d1() {
    let r = resolve(2023, 1, DekadLabel::D1);
    let expected_end = NaiveDate::from_ymd_opt(2023, 1, 10)
        .unwrap()
        .and_hms_opt(23, 59, 59)
        .unwrap();
    assert_eq!(r.datetime, expected_end);
    assert_eq!(
        r.start,
        NaiveDate::from_ymd_opt(2023, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    );
    assert_eq!(r.end, expected_end);
}

#[test]
fn test_resolve_february_d3_non_leap() {
    let r = resolve(2023, 2, DekadLabel::D3);
    let expected_end = NaiveDate::from_ymd_opt(2023, 2, 28)
        .unwrap()
        .and_hms_opt(23, 59, 59)
        .unwrap();
    assert_eq!(r.datetime, expected_end);
    assert_eq!(
        r.start,
        NaiveDate::from_ymd_opt(2023, 2, 21)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    );
    assert_eq!(r.end, expected_end);
}

#[test]
fn test_d3_end_tracks_true_month_length() {
    assert_eq!(resolve(2021, 2, DekadLabel::D3).end.date().day(), 28);
    assert_eq!(resolve(2024, 2, DekadLabel::D3).end.date().day(), 29);
    assert_eq!(resolve(2023, 4, DekadLabel::D3).end.date().day(), 30);
    assert_eq!(resolve(2023, 1, DekadLabel::D3).end.date().day(), 31);
}

// ============================================================================
// Coverage: the three dekads tile the month with no gap or overlap
// ============================================================================

#[test]
fn test_month_coverage() {
    for (year, month) in [(2021, 2), (2024, 2), (2023, 4), (2023, 1), (2023, 12)] {
        let d1 = resolve(year, month, DekadLabel::D1);
        let d2 = resolve(year, month, DekadLabel::D2);
        let d3 = resolve(year, month, DekadLabel::D3);

        // D1 starts on the first of the month at midnight.
        assert_eq!(d1.start.date().day(), 1);
        assert_eq!(d1.start.time().num_seconds_from_midnight(), 0);

        // Each dekad starts one second after the previous one ends.
        assert_eq!(d2.start, d1.end + Duration::seconds(1));
        assert_eq!(d3.start, d2.end + Duration::seconds(1));

        // D3 ends at 23:59:59 on the true last day; the next second is
        // the first of the following month.
        let after = d3.end + Duration::seconds(1);
        assert_eq!(after.date().day(), 1);
        assert_ne!(after.date().month(), month);
    }
}

#[test]
fn test_fixed_boundaries() {
    for (year, month) in [(2021, 2), (2023, 1)] {
        assert_eq!(resolve(year, month, DekadLabel::D1).end.date().day(), 10);
        assert_eq!(resolve(year, month, DekadLabel::D2).start.date().day(), 11);
        assert_eq!(resolve(year, month, DekadLabel::D2).end.date().day(), 20);
        assert_eq!(resolve(year, month, DekadLabel::D3).start.date().day(), 21);
    }
}
