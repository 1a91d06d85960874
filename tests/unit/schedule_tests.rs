use chrono::{NaiveDate, Weekday};
use habit_tracker::*;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_parse_accepts_any_case_and_orders_days() {
    let schedule = Schedule::parse(&["friday", "MONDAY", "Wednesday"]).unwrap();
    assert_eq!(schedule.days(), &[Weekday::Mon, Weekday::Wed, Weekday::Fri]);
    assert_eq!(schedule.names(), vec!["Monday", "Wednesday", "Friday"]);
}

#[test]
fn test_parse_rejects_unknown_day() {
    let result = Schedule::parse(&["Monday", "Funday"]);
    assert!(matches!(result, Err(DomainError::InvalidWeekday(_))));
}

#[test]
fn test_next_and_previous_occurrence() {
    let mwf = Schedule::new([Weekday::Mon, Weekday::Wed, Weekday::Fri]);

    // 2024-01-05 is a Friday
    assert_eq!(mwf.next_after(date(2024, 1, 5)), Some(date(2024, 1, 8)));
    assert_eq!(mwf.previous_before(date(2024, 1, 8)), Some(date(2024, 1, 5)));
    assert_eq!(mwf.latest_on_or_before(date(2024, 1, 7)), Some(date(2024, 1, 5)));
    assert!(Schedule::default().next_after(date(2024, 1, 5)).is_none());
}

#[test]
fn test_occurrences_between_counts_inclusive_range() {
    let mwf = Schedule::new([Weekday::Mon, Weekday::Wed, Weekday::Fri]);
    assert_eq!(mwf.occurrences_between(date(2024, 1, 1), date(2024, 1, 7)), 3);
    assert_eq!(Schedule::daily().occurrences_between(date(2024, 1, 1), date(2024, 1, 7)), 7);
    assert_eq!(mwf.occurrences_between(date(2024, 1, 7), date(2024, 1, 1)), 0);
}

#[test]
fn test_new_habit_trims_and_validates_name() {
    let habit = NewHabit::new("  Read  ", None, None, Schedule::daily()).unwrap();
    assert_eq!(habit.name, "Read");

    assert!(NewHabit::new("   ", None, None, Schedule::daily()).is_err());
}
