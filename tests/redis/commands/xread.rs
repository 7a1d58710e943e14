use std::time::Duration;

use redcore::{commands::CommandError, resp::RespValue};

use crate::test_utils::{TestEnv, TestUtils};

fn entry(id: &str, fields: &[&str]) -> RespValue {
    RespValue::Array(vec![
        TestUtils::expected_bulk_string(id),
        TestUtils::expected_bulk_string_array(fields),
    ])
}

fn stream_reply(key: &str, entries: Vec<RespValue>) -> RespValue {
    RespValue::Array(vec![
        TestUtils::expected_bulk_string(key),
        RespValue::Array(entries),
    ])
}

#[tokio::test]
async fn test_handle_xread_command() {
    let env = TestEnv::new_master_server();
    let mut client = env.client().await;

    for command in [
        ["XADD", "weather", "1-0", "temperature", "20"],
        ["XADD", "weather", "2-0", "temperature", "21"],
        ["XADD", "pressure", "1-0", "hpa", "1013"],
    ] {
        client.exec(TestUtils::command(&command)).await;
    }

    client
        .exec_command_immediate_success_response(
            TestUtils::command(&["XREAD", "STREAMS", "weather", "1-0"]),
            &RespValue::Array(vec![stream_reply(
                "weather",
                vec![entry("2-0", &["temperature", "21"])],
            )]),
        )
        .await;

    client
        .exec_command_immediate_success_response(
            TestUtils::command(&["XREAD", "streams", "weather", "pressure", "0-0", "0-0"]),
            &RespValue::Array(vec![
                stream_reply(
                    "weather",
                    vec![entry("1-0", &["temperature", "20"]), entry("2-0", &["temperature", "21"])],
                ),
                stream_reply("pressure", vec![entry("1-0", &["hpa", "1013"])]),
            ]),
        )
        .await;

    // Streams with nothing new are left out.
    client
        .exec_command_immediate_success_response(
            TestUtils::command(&["XREAD", "STREAMS", "weather", "pressure", "0-0", "1-0"]),
            &RespValue::Array(vec![stream_reply(
                "weather",
                vec![entry("1-0", &["temperature", "20"]), entry("2-0", &["temperature", "21"])],
            )]),
        )
        .await;

    client
        .exec_command_immediate_success_response(
            TestUtils::command(&["XREAD", "STREAMS", "weather", "2-0"]),
            &RespValue::NullArray,
        )
        .await;

    client
        .exec_command_immediate_error_response(
            TestUtils::command(&["XREAD", "STREAMS", "weather", "pressure", "0-0"]),
            CommandError::UnbalancedXread,
        )
        .await;
}

#[tokio::test]
async fn test_xread_block_wakes_on_append() {
    let env = TestEnv::new_master_server();
    let mut writer = env.client().await;

    writer
        .exec_command_immediate_success_response(
            TestUtils::command(&["XADD", "weather", "1-0", "temperature", "20"]),
            &TestUtils::expected_bulk_string("1-0"),
        )
        .await;

    let first = TestUtils::spawn_command(
        env.client().await,
        TestUtils::command(&["XREAD", "BLOCK", "0", "STREAMS", "weather", "$"]),
    );
    let second = TestUtils::spawn_command(
        env.client().await,
        TestUtils::command(&["XREAD", "BLOCK", "2000", "STREAMS", "weather", "1-0"]),
    );

    TestUtils::sleep_ms(100).await;
    assert!(!first.is_finished());
    assert!(!second.is_finished());

    writer
        .exec_command_immediate_success_response(
            TestUtils::command(&["XADD", "weather", "2-0", "temperature", "21"]),
            &TestUtils::expected_bulk_string("2-0"),
        )
        .await;

    let expected = Some(RespValue::Array(vec![stream_reply(
        "weather",
        vec![entry("2-0", &["temperature", "21"])],
    )]));

    // Every blocked reader sees the append.
    let (_, reply) = TestUtils::wait_for_completion(first, Duration::from_secs(3)).await;
    assert_eq!(reply, expected);

    let (_, reply) = TestUtils::wait_for_completion(second, Duration::from_secs(3)).await;
    assert_eq!(reply, expected);
}

#[tokio::test]
async fn test_xread_block_on_missing_stream() {
    let env = TestEnv::new_master_server();
    let mut writer = env.client().await;

    let reader = TestUtils::spawn_command(
        env.client().await,
        TestUtils::command(&["XREAD", "BLOCK", "0", "STREAMS", "weather", "$"]),
    );

    TestUtils::sleep_ms(100).await;

    writer
        .exec_command_immediate_success_response(
            TestUtils::command(&["XADD", "weather", "0-1", "temperature", "20"]),
            &TestUtils::expected_bulk_string("0-1"),
        )
        .await;

    let (_, reply) = TestUtils::wait_for_completion(reader, Duration::from_secs(3)).await;
    assert_eq!(
        reply,
        Some(RespValue::Array(vec![stream_reply(
            "weather",
            vec![entry("0-1", &["temperature", "20"])],
        )]))
    );
}

#[tokio::test]
async fn test_xread_block_timeout_returns_null_array() {
    let env = TestEnv::new_master_server();
    let mut client = env.client().await;

    client
        .exec_command_immediate_success_response(
            TestUtils::command(&["XREAD", "BLOCK", "100", "STREAMS", "weather", "$"]),
            &RespValue::NullArray,
        )
        .await;
}
