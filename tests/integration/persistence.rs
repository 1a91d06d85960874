use chrono::{NaiveDate, Weekday};
use habit_tracker::*;
use tempfile::tempdir;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_data_survives_reopening_the_database() {
    let temp_dir = tempdir().unwrap();
    let db_path = temp_dir.path().join("habits.db");

    let habit_id = {
        let storage = SqliteStorage::new(&db_path).expect("Failed to create storage");
        let health = storage.add_category(&CategoryDraft::new("Health", None).unwrap()).unwrap();
        let run = storage
            .add_habit(&NewHabit::new("Run", None, Some(health.id), Schedule::new([Weekday::Mon])).unwrap())
            .unwrap();
        storage.mark_done(run.id, date(2024, 1, 1)).unwrap();
        run.id
    };

    let storage = SqliteStorage::new(&db_path).expect("Failed to reopen storage");

    let habit = storage.get_habit(habit_id).unwrap();
    assert_eq!(habit.name, "Run");
    assert_eq!(storage.get_schedule(habit_id).unwrap().days(), &[Weekday::Mon]);
    assert_eq!(storage.completion_dates().unwrap(), vec![date(2024, 1, 1)]);
    assert_eq!(storage.list_categories().unwrap()[0].name, "Health");
}

#[tokio::test]
async fn test_daily_reset_runs_once_per_day_across_restarts() {
    let temp_dir = tempdir().unwrap();
    let db_path = temp_dir.path().join("habits.db");
    let monday = date(2024, 1, 1);
    let tuesday = date(2024, 1, 2);

    let habit_id = {
        let server = HabitTrackerServer::new(db_path.clone()).await.unwrap().with_fixed_date(monday);
        server.start_interaction().unwrap();
        let run = server
            .storage()
            .add_habit(&NewHabit::new("Run", None, None, Schedule::daily()).unwrap())
            .unwrap();
        server.storage().mark_done(run.id, monday).unwrap();
        run.id
    };

    // Same day: the done flag is kept
    let server = HabitTrackerServer::new(db_path.clone()).await.unwrap().with_fixed_date(monday);
    server.start_interaction().unwrap();
    assert_eq!(server.storage().count_done_today().unwrap(), 1);
    drop(server);

    // Next day: cleared once, history untouched
    let server = HabitTrackerServer::new(db_path).await.unwrap().with_fixed_date(tuesday);
    assert_eq!(server.start_interaction().unwrap(), tuesday);
    assert_eq!(server.storage().count_done_today().unwrap(), 0);
    assert_eq!(server.storage().last_reset().unwrap(), Some(tuesday));

    server.storage().mark_done(habit_id, tuesday).unwrap();
    assert!(!server.storage().reset_daily_flags(tuesday).unwrap());
    assert_eq!(server.storage().count_done_today().unwrap(), 1);
    assert_eq!(server.storage().completion_dates().unwrap(), vec![tuesday, monday]);
}
