use chrono::{Duration, NaiveDate, Weekday};
use habit_tracker::*;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_three_consecutive_days_ending_today() {
    let today = date(2024, 3, 10);
    let dates = vec![today, today - Duration::days(1), today - Duration::days(2)];
    assert_eq!(current_streak(&dates, today), 3);
}

#[test]
fn test_streak_is_broken_by_a_missed_yesterday() {
    let today = date(2024, 3, 10);
    let dates = vec![today - Duration::days(2), today - Duration::days(3)];
    assert_eq!(current_streak(&dates, today), 0);
    assert_eq!(longest_streak(&dates), 2);
}

#[test]
fn test_streak_counts_from_yesterday_when_today_is_open() {
    let today = date(2024, 3, 10);
    let dates = vec![today - Duration::days(1), today - Duration::days(2)];
    assert_eq!(current_streak(&dates, today), 2);
}

#[test]
fn test_scheduled_streak_skips_unscheduled_days() {
    let mwf = Schedule::new([Weekday::Mon, Weekday::Wed, Weekday::Fri]);
    // Mon, Wed, Fri of the same week
    let dates = vec![date(2024, 1, 1), date(2024, 1, 3), date(2024, 1, 5)];

    assert_eq!(longest_scheduled_streak(&dates, &mwf), 3);
    // Saturday: Friday was the last scheduled day
    assert_eq!(current_scheduled_streak(&dates, &mwf, date(2024, 1, 6)), 3);
    // Following Wednesday: Monday was missed
    assert_eq!(current_scheduled_streak(&dates, &mwf, date(2024, 1, 10)), 0);
}

#[test]
fn test_longest_streak_never_decreases_when_days_are_added() {
    let mut dates = vec![date(2024, 1, 1), date(2024, 1, 2), date(2024, 1, 5)];
    let before = longest_streak(&dates);

    dates.push(date(2024, 1, 9));
    assert!(longest_streak(&dates) >= before);

    dates.push(date(2024, 1, 3));
    assert_eq!(longest_streak(&dates), 3);
}

#[test]
fn test_streak_summary_for_a_habit() {
    let today = date(2024, 1, 7);
    let created = date(2024, 1, 1);
    let dates = vec![date(2024, 1, 5), date(2024, 1, 6), date(2024, 1, 7)];

    let streak = Streak::calculate(HabitId(1), &dates, &Schedule::daily(), created, today);

    assert_eq!(streak.current_streak, 3);
    assert_eq!(streak.longest_streak, 3);
    assert_eq!(streak.total_completions, 3);
    assert_eq!(streak.last_completed, Some(today));
    assert!((streak.completion_rate - 3.0 / 7.0).abs() < 1e-9);
    assert!(streak.is_on_track(&Schedule::daily(), today));
}
