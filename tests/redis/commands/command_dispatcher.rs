use redcore::{commands::CommandError, resp::RespValue};

use crate::test_utils::{TestEnv, TestUtils};

#[tokio::test]
async fn test_handle_ping_and_echo_commands() {
    let env = TestEnv::new_master_server();
    let mut client = env.client().await;

    client
        .exec_command_immediate_success_response(
            TestUtils::command(&["PING"]),
            &TestUtils::expected_simple_string("PONG"),
        )
        .await;

    client
        .exec_command_immediate_success_response(
            TestUtils::command(&["ping", "hello"]),
            &TestUtils::expected_bulk_string("hello"),
        )
        .await;

    client
        .exec_command_immediate_success_response(
            TestUtils::command(&["ECHO", "mango"]),
            &TestUtils::expected_bulk_string("mango"),
        )
        .await;
}

#[tokio::test]
async fn test_handle_unknown_and_malformed_commands() {
    let env = TestEnv::new_master_server();
    let mut client = env.client().await;

    client
        .exec_command_immediate_error_response(
            TestUtils::command(&["FLY", "away"]),
            CommandError::UnknownCommand("fly".into()),
        )
        .await;

    client
        .exec_command_immediate_error_response(
            RespValue::Array(vec![RespValue::Integer(1)]),
            CommandError::InvalidCommand,
        )
        .await;

    client
        .exec_command_immediate_error_response(
            TestUtils::command(&["ECHO"]),
            CommandError::WrongNumberOfArguments("echo".into()),
        )
        .await;

    // The connection stays usable after errors.
    client
        .exec_command_immediate_success_response(
            TestUtils::command(&["PING"]),
            &TestUtils::expected_simple_string("PONG"),
        )
        .await;
}
