use redcore::{auth::hash_password, commands::CommandError, resp::RespValue};

use crate::test_utils::{TestEnv, TestUtils};

#[tokio::test]
async fn test_default_user_without_password() {
    let env = TestEnv::new_master_server();
    let mut client = env.client().await;

    client
        .exec_command_immediate_success_response(
            TestUtils::command(&["ACL", "WHOAMI"]),
            &TestUtils::expected_bulk_string("default"),
        )
        .await;

    client
        .exec_command_immediate_success_response(
            TestUtils::command(&["ACL", "GETUSER", "default"]),
            &RespValue::Array(vec![
                TestUtils::expected_bulk_string("flags"),
                TestUtils::expected_bulk_string_array(&["nopass"]),
                TestUtils::expected_bulk_string("passwords"),
                TestUtils::expected_bulk_string_array(&[]),
            ]),
        )
        .await;

    // Any password is accepted while the default user has none.
    client
        .exec_command_immediate_success_response(
            TestUtils::command(&["AUTH", "anything"]),
            &TestUtils::expected_ok(),
        )
        .await;
}

#[tokio::test]
async fn test_setting_a_password_requires_auth_on_new_connections() {
    let env = TestEnv::new_master_server();
    let mut admin = env.client().await;

    admin
        .exec_command_immediate_success_response(
            TestUtils::command(&["ACL", "SETUSER", "default", ">mypassword"]),
            &TestUtils::expected_ok(),
        )
        .await;

    // Connections that were already open stay authenticated.
    admin
        .exec_command_immediate_success_response(
            TestUtils::command(&["PING"]),
            &TestUtils::expected_simple_string("PONG"),
        )
        .await;

    let digest = hash_password("mypassword");
    admin
        .exec_command_immediate_success_response(
            TestUtils::command(&["ACL", "GETUSER", "default"]),
            &RespValue::Array(vec![
                TestUtils::expected_bulk_string("flags"),
                TestUtils::expected_bulk_string_array(&[]),
                TestUtils::expected_bulk_string("passwords"),
                TestUtils::expected_bulk_string_array(&[digest.as_str()]),
            ]),
        )
        .await;

    let mut client = env.client().await;

    client
        .exec_command_immediate_error_response(
            TestUtils::command(&["GET", "fruit"]),
            CommandError::NoAuth,
        )
        .await;

    client
        .exec_command_immediate_error_response(
            TestUtils::command(&["AUTH", "wrong"]),
            CommandError::WrongPass,
        )
        .await;

    client
        .exec_command_immediate_success_response(
            TestUtils::command(&["AUTH", "default", "mypassword"]),
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
async fn test_auth_as_another_user() {
    let env = TestEnv::new_master_server();
    let mut client = env.client().await;

    client
        .exec_command_immediate_success_response(
            TestUtils::command(&["ACL", "SETUSER", "alice", ">secret", ">backup"]),
            &TestUtils::expected_ok(),
        )
        .await;

    client
        .exec_command_immediate_error_response(
            TestUtils::command(&["AUTH", "bob", "secret"]),
            CommandError::WrongPass,
        )
        .await;

    client
        .exec_command_immediate_success_response(
            TestUtils::command(&["AUTH", "alice", "backup"]),
            &TestUtils::expected_ok(),
        )
        .await;

    client
        .exec_command_immediate_success_response(
            TestUtils::command(&["ACL", "WHOAMI"]),
            &TestUtils::expected_bulk_string("alice"),
        )
        .await;

    client
        .exec_command_immediate_success_response(
            TestUtils::command(&["ACL", "GETUSER", "bob"]),
            &TestUtils::expected_null(),
        )
        .await;
}

#[tokio::test]
async fn test_handle_acl_command_invalid() {
    let env = TestEnv::new_master_server();
    let mut client = env.client().await;

    let test_cases = vec![
        (
            TestUtils::command(&["ACL", "LIST"]),
            CommandError::UnknownAclSubcommand("LIST".into()),
        ),
        (
            TestUtils::command(&["ACL", "SETUSER", "alice", "+@all"]),
            CommandError::InvalidAclRule("+@all".into()),
        ),
        (
            TestUtils::command(&["ACL", "WHOAMI", "extra"]),
            CommandError::WrongNumberOfArguments("acl|whoami".into()),
        ),
        (
            TestUtils::command(&["AUTH"]),
            CommandError::WrongNumberOfArguments("auth".into()),
        ),
    ];

    for (command, expected) in test_cases {
        client
            .exec_command_immediate_error_response(command, expected)
            .await;
    }
}
