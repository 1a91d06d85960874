use chrono::NaiveDate;
use habit_tracker::protocol::error_codes;
use habit_tracker::*;
use serde_json::{json, Value};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Feed one batch of requests through the line-delimited transport and
/// collect the responses
async fn exchange(server: &mut McpServer, requests: &[Value]) -> Vec<Value> {
    let input: String = requests.iter().map(|r| format!("{}\n", r)).collect();
    let mut output = Vec::new();

    server.serve(input.as_bytes(), &mut output).await.unwrap();

    String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

fn tool_call(id: u64, name: &str, arguments: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "tools/call",
        "params": {"name": name, "arguments": arguments}
    })
}

fn message(response: &Value) -> &str {
    response["result"]["content"][0]["text"].as_str().unwrap()
}

fn data(response: &Value) -> Value {
    serde_json::from_str(response["result"]["content"][1]["text"].as_str().unwrap()).unwrap()
}

#[tokio::test]
async fn test_full_session_over_stdio() {
    // 2024-01-01 is a Monday
    let tracker = HabitTrackerServer::in_memory().unwrap().with_fixed_date(date(2024, 1, 1));
    let mut server = McpServer::new(tracker);

    let responses = exchange(
        &mut server,
        &[
            json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {
                "protocolVersion": "2024-11-05",
                "capabilities": {},
                "clientInfo": {"name": "integration", "version": "0.1"}
            }}),
            json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
            tool_call(2, "category_create", json!({"name": "Health"})),
            tool_call(3, "habit_create", json!({
                "name": "Run",
                "category_id": 1,
                "days": ["Monday", "Wednesday", "Friday"]
            })),
            tool_call(4, "habit_create", json!({"name": "Read", "days": ["Tuesday"]})),
            tool_call(5, "habit_today", json!({})),
            tool_call(6, "habit_mark_done", json!({"habit_id": 1})),
            tool_call(7, "habit_today", json!({})),
            tool_call(8, "habit_stats", json!({})),
        ],
    )
    .await;

    // The notification gets no reply
    assert_eq!(responses.len(), 8);
    assert!(server.is_initialized());
    assert_eq!(responses[0]["result"]["serverInfo"]["name"], json!("Habit Tracker"));

    let run = data(&responses[2]);
    assert_eq!(run["habit_id"], json!(1));

    let before = data(&responses[4]);
    let habits = before["habits"].as_array().unwrap();
    assert_eq!(habits.len(), 1, "only Run is scheduled on Monday");
    assert_eq!(habits[0]["done"], json!(false));

    assert_eq!(responses[5]["result"]["isError"], json!(false));
    assert!(message(&responses[6]).contains("1 / 1 done"));

    let stats = data(&responses[7]);
    assert_eq!(stats["most_done"][0]["key"], json!("Run"));
    assert_eq!(stats["day_streak"], json!(1));
}

#[tokio::test]
async fn test_errors_are_reported_per_request() {
    let tracker = HabitTrackerServer::in_memory().unwrap().with_fixed_date(date(2024, 1, 1));
    let mut server = McpServer::new(tracker);

    let responses = exchange(
        &mut server,
        &[
            tool_call(1, "habit_create", json!({"name": "Run", "days": ["Someday"]})),
            tool_call(2, "habit_create", json!({"name": "Run", "days": ["Monday"]})),
            tool_call(3, "habit_create", json!({"name": "Run", "days": ["Friday"]})),
            tool_call(4, "habit_update", json!({"habit_id": 99, "name": "Walk"})),
            json!({"jsonrpc": "1.0", "id": 5, "method": "ping"}),
        ],
    )
    .await;

    assert_eq!(responses[0]["result"]["errorCode"], json!(error_codes::VALIDATION_ERROR));
    assert_eq!(responses[1]["result"]["isError"], json!(false));
    assert_eq!(responses[2]["result"]["errorCode"], json!(error_codes::DUPLICATE_NAME));
    assert_eq!(responses[3]["result"]["errorCode"], json!(error_codes::HABIT_NOT_FOUND));
    assert_eq!(responses[4]["error"]["code"], json!(error_codes::INVALID_REQUEST));
}

#[tokio::test]
async fn test_category_delete_is_refused_while_in_use() {
    let tracker = HabitTrackerServer::in_memory().unwrap().with_fixed_date(date(2024, 1, 1));
    let mut server = McpServer::new(tracker);

    let responses = exchange(
        &mut server,
        &[
            tool_call(1, "category_create", json!({"name": "Health"})),
            tool_call(2, "habit_create", json!({"name": "Run", "category_id": 1, "days": ["Monday"]})),
            tool_call(3, "category_delete", json!({"category_id": 1})),
            tool_call(4, "habit_delete", json!({"habit_id": 1})),
            tool_call(5, "category_delete", json!({"category_id": 1})),
            tool_call(6, "habit_history", json!({})),
        ],
    )
    .await;

    let refused = data(&responses[2]);
    assert_eq!(refused["success"], json!(false));
    assert_eq!(refused["linked_habits"], json!(1));
    assert!(message(&responses[2]).contains("still have 1 habit(s)"));

    assert_eq!(data(&responses[4])["success"], json!(true));

    let history = data(&responses[5]);
    assert_eq!(history["deleted"][0]["name"], json!("Run"));
}
