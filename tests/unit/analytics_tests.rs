use chrono::{NaiveDate, Weekday};
use habit_tracker::*;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn records() -> Vec<CompletionRecord> {
    vec![
        CompletionRecord::new(HabitId(1), "A", Some("Health"), date(2024, 1, 1)),
        CompletionRecord::new(HabitId(1), "A", Some("Health"), date(2024, 1, 2)),
        CompletionRecord::new(HabitId(2), "B", None, date(2024, 1, 1)),
    ]
}

#[test]
fn test_most_done_ranks_by_count() {
    let engine = AnalyticsEngine::new();
    let ranking = engine.most_done(&records(), None);
    assert_eq!(ranking, vec![Tally::new("A".to_string(), 2), Tally::new("B".to_string(), 1)]);

    let recent = engine.most_done(&records(), Some(date(2024, 1, 2)));
    assert_eq!(recent, vec![Tally::new("A".to_string(), 1)]);
}

#[test]
fn test_productive_days() {
    let engine = AnalyticsEngine::new();
    assert_eq!(engine.most_productive_days(&records())[0], Tally::new(date(2024, 1, 1), 2));
    assert_eq!(engine.least_productive_days(&records())[0], Tally::new(date(2024, 1, 2), 1));
}

#[test]
fn test_completions_by_weekday_in_calendar_order() {
    let engine = AnalyticsEngine::new();
    let by_day = engine.completions_by_weekday(&records());
    // 2024-01-01 is a Monday
    assert_eq!(by_day, vec![Tally::new("Monday", 2), Tally::new("Tuesday", 1)]);
}

#[test]
fn test_rewards_unlock_at_milestones() {
    let engine = AnalyticsEngine::new();
    let rewards = engine.rewards(15);
    assert_eq!(rewards.len(), REWARD_MILESTONES.len());
    assert!(rewards.iter().filter(|r| r.unlocked).all(|r| r.days <= 15));
    assert_eq!(rewards.iter().filter(|r| r.unlocked).count(), 2);
}

#[test]
fn test_agenda_lists_habits_for_weekday() {
    let engine = AnalyticsEngine::new();
    let habits = vec![
        ScheduledHabit {
            habit_id: HabitId(1),
            name: "Swim".to_string(),
            category: None,
            schedule: Schedule::new([Weekday::Mon]),
            created_on: date(2024, 1, 1),
        },
        ScheduledHabit {
            habit_id: HabitId(2),
            name: "Read".to_string(),
            category: None,
            schedule: Schedule::daily(),
            created_on: date(2024, 1, 1),
        },
    ];

    let monday: Vec<_> = engine.agenda_for(&habits, Weekday::Mon).iter().map(|h| h.name.clone()).collect();
    assert_eq!(monday, vec!["Read", "Swim"]);
    assert_eq!(engine.agenda_for(&habits, Weekday::Tue).len(), 1);
}
