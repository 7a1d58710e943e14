use redcore::{commands::CommandError, resp::RespValue, types::stream::StreamError};

use crate::test_utils::{TestEnv, TestUtils};

#[tokio::test]
async fn test_handle_xadd_command() {
    let env = TestEnv::new_master_server();
    let mut client = env.client().await;

    let test_cases = vec![
        (vec!["XADD", "weather", "1-1", "temperature", "25"], "1-1"),
        (vec!["XADD", "weather", "1-*", "temperature", "26"], "1-2"),
        (vec!["XADD", "weather", "5-*", "humidity", "40"], "5-0"),
        (vec!["XADD", "weather", "7", "humidity", "41"], "7-0"),
        (vec!["XADD", "sensors", "0-*", "state", "on"], "0-1"),
    ];

    for (command, expected) in test_cases {
        client
            .exec_command_immediate_success_response(
                TestUtils::command(&command),
                &TestUtils::expected_bulk_string(expected),
            )
            .await;
    }
}

#[tokio::test]
async fn test_handle_xadd_command_auto_generated_id() {
    let env = TestEnv::new_master_server();
    let mut client = env.client().await;

    let first = client
        .exec(TestUtils::command(&["XADD", "events", "*", "kind", "click"]))
        .await;
    let second = client
        .exec(TestUtils::command(&["XADD", "events", "*", "kind", "scroll"]))
        .await;

    let parse = |reply: Option<RespValue>| -> (u64, u64) {
        let Some(RespValue::BulkString(id)) = reply else {
            panic!("expected an ID, got {:?}", reply);
        };
        let (ms, seq) = id.split_once('-').unwrap();
        (ms.parse().unwrap(), seq.parse().unwrap())
    };

    let first = parse(first);
    let second = parse(second);

    assert!(first.0 > 0);
    assert!(second > first);
}

#[tokio::test]
async fn test_handle_xadd_command_rejected_ids() {
    let env = TestEnv::new_master_server();
    let mut client = env.client().await;

    client
        .exec_command_immediate_error_response(
            TestUtils::command(&["XADD", "weather", "0-0", "temperature", "25"]),
            CommandError::Stream(StreamError::ZeroId),
        )
        .await;

    // The failed XADD did not create the stream.
    client
        .exec_command_immediate_success_response(
            TestUtils::command(&["TYPE", "weather"]),
            &TestUtils::expected_simple_string("none"),
        )
        .await;

    client
        .exec_command_immediate_success_response(
            TestUtils::command(&["XADD", "weather", "5-1", "temperature", "25"]),
            &TestUtils::expected_bulk_string("5-1"),
        )
        .await;

    let test_cases = vec![
        (
            TestUtils::command(&["XADD", "weather", "5-1", "temperature", "26"]),
            CommandError::Stream(StreamError::NotGreaterThanTop),
        ),
        (
            TestUtils::command(&["XADD", "weather", "4-9", "temperature", "26"]),
            CommandError::Stream(StreamError::NotGreaterThanTop),
        ),
        (
            TestUtils::command(&["XADD", "weather", "4-*", "temperature", "26"]),
            CommandError::Stream(StreamError::NotGreaterThanTop),
        ),
        (
            TestUtils::command(&["XADD", "weather", "five", "temperature", "26"]),
            CommandError::Stream(StreamError::InvalidId),
        ),
        (
            TestUtils::command(&["XADD", "weather", "6-1", "temperature"]),
            CommandError::WrongNumberOfArguments("xadd".into()),
        ),
    ];

    for (command, expected) in test_cases {
        client
            .exec_command_immediate_error_response(command, expected)
            .await;
    }

    client
        .exec_command_immediate_success_response(
            TestUtils::command(&["XRANGE", "weather", "-", "+"]),
            &RespValue::Array(vec![RespValue::Array(vec![
                TestUtils::expected_bulk_string("5-1"),
                TestUtils::expected_bulk_string_array(&["temperature", "25"]),
            ])]),
        )
        .await;
}
