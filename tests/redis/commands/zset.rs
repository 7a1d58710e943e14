use redcore::commands::CommandError;

use crate::test_utils::{TestEnv, TestUtils};

#[tokio::test]
async fn test_handle_zadd_and_zrank_commands() {
    let env = TestEnv::new_master_server();
    let mut client = env.client().await;

    client
        .exec_command_immediate_success_response(
            TestUtils::command(&["ZADD", "racers", "100.5", "alice", "80", "bob", "80", "carol"]),
            &TestUtils::expected_integer(3),
        )
        .await;

    // Re-adding only rescores.
    client
        .exec_command_immediate_success_response(
            TestUtils::command(&["ZADD", "racers", "70", "alice"]),
            &TestUtils::expected_integer(0),
        )
        .await;

    let test_cases = vec![
        ("alice", TestUtils::expected_integer(0)),
        ("bob", TestUtils::expected_integer(1)),
        ("carol", TestUtils::expected_integer(2)),
        ("dave", TestUtils::expected_null()),
    ];

    for (member, expected) in test_cases {
        client
            .exec_command_immediate_success_response(
                TestUtils::command(&["ZRANK", "racers", member]),
                &expected,
            )
            .await;
    }

    client
        .exec_command_immediate_success_response(
            TestUtils::command(&["ZCARD", "racers"]),
            &TestUtils::expected_integer(3),
        )
        .await;

    client
        .exec_command_immediate_success_response(
            TestUtils::command(&["ZSCORE", "racers", "alice"]),
            &TestUtils::expected_bulk_string("70"),
        )
        .await;

    client
        .exec_command_immediate_success_response(
            TestUtils::command(&["ZRANK", "missing", "alice"]),
            &TestUtils::expected_null(),
        )
        .await;
}

#[tokio::test]
async fn test_handle_zrange_command() {
    let env = TestEnv::new_master_server();
    let mut client = env.client().await;

    client
        .exec_command_immediate_success_response(
            TestUtils::command(&["ZADD", "racers", "1", "a", "2.5", "b", "3", "c", "4", "d"]),
            &TestUtils::expected_integer(4),
        )
        .await;

    client
        .exec_command_immediate_success_response(
            TestUtils::command(&["ZRANGE", "racers", "0", "-1"]),
            &TestUtils::expected_bulk_string_array(&["a", "b", "c", "d"]),
        )
        .await;

    client
        .exec_command_immediate_success_response(
            TestUtils::command(&["ZRANGE", "racers", "-2", "-1"]),
            &TestUtils::expected_bulk_string_array(&["c", "d"]),
        )
        .await;

    client
        .exec_command_immediate_success_response(
            TestUtils::command(&["ZRANGE", "racers", "0", "1", "WITHSCORES"]),
            &TestUtils::expected_bulk_string_array(&["a", "1", "b", "2.5"]),
        )
        .await;

    client
        .exec_command_immediate_success_response(
            TestUtils::command(&["ZRANGE", "racers", "3", "1"]),
            &TestUtils::expected_bulk_string_array(&[]),
        )
        .await;
}

#[tokio::test]
async fn test_handle_zrem_command() {
    let env = TestEnv::new_master_server();
    let mut client = env.client().await;

    client
        .exec_command_immediate_success_response(
            TestUtils::command(&["ZADD", "racers", "1", "a", "2", "b"]),
            &TestUtils::expected_integer(2),
        )
        .await;

    client
        .exec_command_immediate_success_response(
            TestUtils::command(&["ZREM", "racers", "a", "z"]),
            &TestUtils::expected_integer(1),
        )
        .await;

    client
        .exec_command_immediate_success_response(
            TestUtils::command(&["ZREM", "racers", "b"]),
            &TestUtils::expected_integer(1),
        )
        .await;

    client
        .exec_command_immediate_success_response(
            TestUtils::command(&["TYPE", "racers"]),
            &TestUtils::expected_simple_string("none"),
        )
        .await;

    client
        .exec_command_immediate_success_response(
            TestUtils::command(&["ZCARD", "racers"]),
            &TestUtils::expected_integer(0),
        )
        .await;
}

#[tokio::test]
async fn test_handle_zadd_command_invalid() {
    let env = TestEnv::new_master_server();
    let mut client = env.client().await;

    client
        .exec_command_immediate_success_response(
            TestUtils::command(&["SET", "fruit", "mango"]),
            &TestUtils::expected_ok(),
        )
        .await;

    let test_cases = vec![
        (
            TestUtils::command(&["ZADD", "racers", "fast", "alice"]),
            CommandError::NotAFloat,
        ),
        (
            TestUtils::command(&["ZADD", "racers", "1", "alice", "2"]),
            CommandError::Syntax,
        ),
        (
            TestUtils::command(&["ZADD", "fruit", "1", "alice"]),
            CommandError::WrongType,
        ),
        (
            TestUtils::command(&["ZRANK", "fruit", "alice"]),
            CommandError::WrongType,
        ),
    ];

    for (command, expected) in test_cases {
        client
            .exec_command_immediate_error_response(command, expected)
            .await;
    }

    // A rejected ZADD creates nothing.
    client
        .exec_command_immediate_success_response(
            TestUtils::command(&["TYPE", "racers"]),
            &TestUtils::expected_simple_string("none"),
        )
        .await;
}
