use super::*;
use chrono::TimeZone;
use proptest::prelude::*;

fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
}

#[test]
fn parses_every_minute() {
    let expr = CronExpr::parse("* * * * *").unwrap();
    let next = expr.next_after(utc(2024, 1, 1, 10, 0)).unwrap();
    assert_eq!(next, utc(2024, 1, 1, 10, 1));
}

#[test]
fn daily_at_two_am() {
    let expr = CronExpr::parse("0 2 * * *").unwrap();
    let next = expr.next_after(utc(2024, 1, 1, 10, 0)).unwrap();
    assert_eq!(next, utc(2024, 1, 2, 2, 0));
}

#[test]
fn fires_later_same_day_when_still_ahead() {
    let expr = CronExpr::parse("0 2 * * *").unwrap();
    let next = expr.next_after(utc(2024, 1, 1, 1, 30)).unwrap();
    assert_eq!(next, utc(2024, 1, 1, 2, 0));
}

#[test]
fn exact_match_time_is_excluded() {
    // "strictly after": asking at the fire time yields the next occurrence
    let expr = CronExpr::parse("0 2 * * *").unwrap();
    let next = expr.next_after(utc(2024, 1, 1, 2, 0)).unwrap();
    assert_eq!(next, utc(2024, 1, 2, 2, 0));
}

#[test]
fn step_expression() {
    let expr = CronExpr::parse("*/15 * * * *").unwrap();
    assert_eq!(expr.next_after(utc(2024, 3, 1, 9, 0)).unwrap(), utc(2024, 3, 1, 9, 15));
    assert_eq!(expr.next_after(utc(2024, 3, 1, 9, 50)).unwrap(), utc(2024, 3, 1, 10, 0));
}

#[test]
fn range_with_step() {
    let expr = CronExpr::parse("0 9-17/4 * * *").unwrap();
    // admits hours 9, 13, 17
    assert_eq!(expr.next_after(utc(2024, 5, 6, 10, 0)).unwrap(), utc(2024, 5, 6, 13, 0));
    assert_eq!(expr.next_after(utc(2024, 5, 6, 17, 0)).unwrap(), utc(2024, 5, 7, 9, 0));
}

#[test]
fn value_with_step_runs_to_field_max() {
    // "5/15" is shorthand for "5-59/15": minutes 5, 20, 35, 50
    let expr = CronExpr::parse("5/15 * * * *").unwrap();
    assert_eq!(expr.next_after(utc(2024, 3, 1, 9, 5)).unwrap(), utc(2024, 3, 1, 9, 20));
    assert_eq!(expr.next_after(utc(2024, 3, 1, 9, 50)).unwrap(), utc(2024, 3, 1, 10, 5));
}

#[test]
fn comma_list() {
    let expr = CronExpr::parse("0,30 8 * * *").unwrap();
    assert_eq!(expr.next_after(utc(2024, 2, 1, 8, 0)).unwrap(), utc(2024, 2, 1, 8, 30));
    assert_eq!(expr.next_after(utc(2024, 2, 1, 8, 30)).unwrap(), utc(2024, 2, 2, 8, 0));
}

#[test]
fn weekday_only() {
    // 2024-01-01 is a Monday; next Sunday is 2024-01-07
    let expr = CronExpr::parse("0 6 * * 0").unwrap();
    assert_eq!(expr.next_after(utc(2024, 1, 1, 0, 0)).unwrap(), utc(2024, 1, 7, 6, 0));
}

#[test]
fn dom_and_dow_are_ored_when_both_restricted() {
    // Day 15 or any Monday. From Jan 1 (Mon) at noon, the next Monday is
    // Jan 8, which beats the 15th.
    let expr = CronExpr::parse("0 0 15 * 1").unwrap();
    assert_eq!(expr.next_after(utc(2024, 1, 1, 12, 0)).unwrap(), utc(2024, 1, 8, 0, 0));
    // From Jan 13 (Sat), the 15th beats the next Monday only if earlier;
    // Jan 15 is itself a Monday, both rules agree.
    assert_eq!(expr.next_after(utc(2024, 1, 13, 0, 0)).unwrap(), utc(2024, 1, 15, 0, 0));
}

#[test]
fn month_boundary_rollover() {
    let expr = CronExpr::parse("30 23 31 * *").unwrap();
    // April has 30 days; the next 31st after April 1 is May 31
    assert_eq!(
        expr.next_after(utc(2024, 4, 1, 0, 0)).unwrap(),
        utc(2024, 5, 31, 23, 30)
    );
}

#[test]
fn leap_day() {
    let expr = CronExpr::parse("0 0 29 2 *").unwrap();
    assert_eq!(
        expr.next_after(utc(2023, 3, 1, 0, 0)).unwrap(),
        utc(2024, 2, 29, 0, 0)
    );
}

#[test]
fn impossible_date_yields_none() {
    let expr = CronExpr::parse("0 0 30 2 *").unwrap();
    assert_eq!(expr.next_after(utc(2024, 1, 1, 0, 0)), None);
}

#[test]
fn year_rollover() {
    let expr = CronExpr::parse("0 0 1 1 *").unwrap();
    assert_eq!(
        expr.next_after(utc(2024, 6, 15, 12, 0)).unwrap(),
        utc(2025, 1, 1, 0, 0)
    );
}

#[test]
fn offset_evaluation_shifts_wall_clock() {
    // 02:00 local at UTC+2 is 00:00 UTC
    let expr = CronExpr::parse("0 2 * * *").unwrap();
    let next = expr.next_after_in_offset(utc(2024, 1, 1, 10, 0), 120).unwrap();
    assert_eq!(next, utc(2024, 1, 2, 0, 0));
}

#[test]
fn negative_offset() {
    // 02:00 local at UTC-5 is 07:00 UTC
    let expr = CronExpr::parse("0 2 * * *").unwrap();
    let next = expr.next_after_in_offset(utc(2024, 1, 1, 10, 0), -300).unwrap();
    assert_eq!(next, utc(2024, 1, 2, 7, 0));
}

#[test]
fn rejects_wrong_field_count() {
    assert_eq!(CronExpr::parse("0 2 * *"), Err(CronParseError::FieldCount(4)));
    assert_eq!(
        CronExpr::parse("0 2 * * * *"),
        Err(CronParseError::FieldCount(6))
    );
    assert_eq!(CronExpr::parse(""), Err(CronParseError::FieldCount(0)));
}

#[test]
fn rejects_out_of_range_values() {
    assert!(matches!(
        CronExpr::parse("60 * * * *"),
        Err(CronParseError::OutOfRange { field: "minute", value: 60, .. })
    ));
    assert!(matches!(
        CronExpr::parse("0 24 * * *"),
        Err(CronParseError::OutOfRange { field: "hour", .. })
    ));
    assert!(matches!(
        CronExpr::parse("0 0 0 * *"),
        Err(CronParseError::OutOfRange { field: "day-of-month", .. })
    ));
    assert!(matches!(
        CronExpr::parse("0 0 * 13 *"),
        Err(CronParseError::OutOfRange { field: "month", .. })
    ));
    assert!(matches!(
        CronExpr::parse("0 0 * * 7"),
        Err(CronParseError::OutOfRange { field: "day-of-week", .. })
    ));
}

#[test]
fn rejects_garbage_and_bad_steps() {
    assert!(matches!(
        CronExpr::parse("x * * * *"),
        Err(CronParseError::InvalidValue { field: "minute", .. })
    ));
    assert_eq!(
        CronExpr::parse("*/0 * * * *"),
        Err(CronParseError::ZeroStep { field: "minute" })
    );
    assert_eq!(
        CronExpr::parse("0 10-2 * * *"),
        Err(CronParseError::InvertedRange { field: "hour", start: 10, end: 2 })
    );
}

#[test]
fn display_round_trips_source() {
    let expr = CronExpr::parse("*/5 2,14 1-7 * *").unwrap();
    assert_eq!(expr.to_string(), "*/5 2,14 1-7 * *");
    assert_eq!(expr.source(), "*/5 2,14 1-7 * *");
}

#[test]
fn from_str_parses() {
    let expr: CronExpr = "0 2 * * *".parse().unwrap();
    assert!(expr.matches(utc(2024, 1, 1, 2, 0)));
    assert!(!expr.matches(utc(2024, 1, 1, 3, 0)));
}

proptest! {
    #[test]
    fn next_is_strictly_after_and_matches(
        minute in 0u32..60,
        hour in 0u32..24,
        day_offset in 0i64..400,
        start_minute in 0u32..60,
    ) {
        let expr = CronExpr::parse(&format!("{minute} {hour} * * *")).unwrap();
        let after = utc(2024, 1, 1, 0, start_minute) + Duration::days(day_offset);
        let next = expr.next_after(after).unwrap();
        prop_assert!(next > after);
        prop_assert!(expr.matches(next));
        prop_assert_eq!(next.minute(), minute);
        prop_assert_eq!(next.hour(), hour);
    }

    #[test]
    fn successive_fires_are_increasing(step in 1u32..30, hops in 1usize..6) {
        let expr = CronExpr::parse(&format!("*/{step} * * * *")).unwrap();
        let mut at = utc(2024, 3, 10, 11, 7);
        for _ in 0..hops {
            let next = expr.next_after(at).unwrap();
            prop_assert!(next > at);
            at = next;
        }
    }
}
