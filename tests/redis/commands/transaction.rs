use redcore::{commands::CommandError, resp::RespValue};

use crate::test_utils::{TestEnv, TestUtils};

#[tokio::test]
async fn test_handle_multi_exec_commands() {
    let env = TestEnv::new_master_server();
    let mut client = env.client().await;
    let mut other = env.client().await;

    client
        .exec_command_immediate_success_response(
            TestUtils::command(&["MULTI"]),
            &TestUtils::expected_ok(),
        )
        .await;

    for command in [
        TestUtils::command(&["SET", "counter", "41"]),
        TestUtils::command(&["INCR", "counter"]),
        TestUtils::command(&["RPUSH", "fruits", "mango"]),
    ] {
        client
            .exec_command_immediate_success_response(
                command,
                &TestUtils::expected_simple_string("QUEUED"),
            )
            .await;
    }

    // Nothing runs before EXEC.
    other
        .exec_command_immediate_success_response(
            TestUtils::command(&["GET", "counter"]),
            &TestUtils::expected_null(),
        )
        .await;

    client
        .exec_command_immediate_success_response(
            TestUtils::command(&["EXEC"]),
            &RespValue::Array(vec![
                TestUtils::expected_ok(),
                TestUtils::expected_integer(42),
                TestUtils::expected_integer(1),
            ]),
        )
        .await;

    other
        .exec_command_immediate_success_response(
            TestUtils::command(&["GET", "counter"]),
            &TestUtils::expected_bulk_string("42"),
        )
        .await;
}

#[tokio::test]
async fn test_exec_embeds_runtime_errors() {
    let env = TestEnv::new_master_server();
    let mut client = env.client().await;

    client
        .exec_command_immediate_success_response(
            TestUtils::command(&["SET", "fruit", "mango"]),
            &TestUtils::expected_ok(),
        )
        .await;

    client.exec(TestUtils::command(&["MULTI"])).await;
    client.exec(TestUtils::command(&["INCR", "fruit"])).await;
    client.exec(TestUtils::command(&["SET", "veggie", "kale"])).await;

    client
        .exec_command_immediate_success_response(
            TestUtils::command(&["EXEC"]),
            &RespValue::Array(vec![
                CommandError::NotAnInteger.to_resp(),
                TestUtils::expected_ok(),
            ]),
        )
        .await;

    client
        .exec_command_immediate_success_response(
            TestUtils::command(&["GET", "veggie"]),
            &TestUtils::expected_bulk_string("kale"),
        )
        .await;
}

#[tokio::test]
async fn test_queueing_rejects_malformed_commands() {
    let env = TestEnv::new_master_server();
    let mut client = env.client().await;

    client.exec(TestUtils::command(&["MULTI"])).await;

    client
        .exec_command_immediate_error_response(
            TestUtils::command(&["GET"]),
            CommandError::WrongNumberOfArguments("get".into()),
        )
        .await;

    client
        .exec_command_immediate_error_response(
            TestUtils::command(&["FLY"]),
            CommandError::UnknownCommand("fly".into()),
        )
        .await;

    client
        .exec_command_immediate_success_response(
            TestUtils::command(&["ECHO", "still queued"]),
            &TestUtils::expected_simple_string("QUEUED"),
        )
        .await;

    client
        .exec_command_immediate_success_response(
            TestUtils::command(&["EXEC"]),
            &TestUtils::expected_bulk_string_array(&["still queued"]),
        )
        .await;
}

#[tokio::test]
async fn test_handle_discard_command() {
    let env = TestEnv::new_master_server();
    let mut client = env.client().await;

    client.exec(TestUtils::command(&["MULTI"])).await;
    client.exec(TestUtils::command(&["SET", "fruit", "mango"])).await;

    client
        .exec_command_immediate_success_response(
            TestUtils::command(&["DISCARD"]),
            &TestUtils::expected_ok(),
        )
        .await;

    client
        .exec_command_immediate_success_response(
            TestUtils::command(&["GET", "fruit"]),
            &TestUtils::expected_null(),
        )
        .await;
}

#[tokio::test]
async fn test_transaction_control_errors() {
    let env = TestEnv::new_master_server();
    let mut client = env.client().await;

    client
        .exec_command_immediate_error_response(
            TestUtils::command(&["EXEC"]),
            CommandError::ExecWithoutMulti,
        )
        .await;

    client
        .exec_command_immediate_error_response(
            TestUtils::command(&["DISCARD"]),
            CommandError::DiscardWithoutMulti,
        )
        .await;

    client.exec(TestUtils::command(&["MULTI"])).await;

    client
        .exec_command_immediate_error_response(
            TestUtils::command(&["MULTI"]),
            CommandError::NestedMulti,
        )
        .await;

    // The transaction is still open after the nested MULTI.
    client
        .exec_command_immediate_success_response(
            TestUtils::command(&["EXEC"]),
            &RespValue::Array(vec![]),
        )
        .await;
}

#[tokio::test]
async fn test_blocking_commands_inside_exec_do_not_wait() {
    let env = TestEnv::new_master_server();
    let mut client = env.client().await;

    client.exec(TestUtils::command(&["MULTI"])).await;
    client.exec(TestUtils::command(&["BLPOP", "queue", "0"])).await;
    client
        .exec(TestUtils::command(&["XREAD", "BLOCK", "0", "STREAMS", "weather", "$"]))
        .await;

    client
        .exec_command_immediate_success_response(
            TestUtils::command(&["EXEC"]),
            &RespValue::Array(vec![RespValue::NullArray, RespValue::NullArray]),
        )
        .await;
}
