use crate::test_utils::{TestEnv, TestUtils};

#[tokio::test]
async fn test_handle_keys_command() {
    let env = TestEnv::new_master_server();
    let mut client = env.client().await;

    for key in ["fruit:mango", "fruit:apple", "vegetable:kale"] {
        client
            .exec_command_immediate_success_response(
                TestUtils::command(&["SET", key, "1"]),
                &TestUtils::expected_ok(),
            )
            .await;
    }

    client
        .exec_command_immediate_success_response(
            TestUtils::command(&["KEYS", "*"]),
            &TestUtils::expected_bulk_string_array(&["fruit:apple", "fruit:mango", "vegetable:kale"]),
        )
        .await;

    client
        .exec_command_immediate_success_response(
            TestUtils::command(&["KEYS", "fruit:*"]),
            &TestUtils::expected_bulk_string_array(&["fruit:apple", "fruit:mango"]),
        )
        .await;

    client
        .exec_command_immediate_success_response(
            TestUtils::command(&["KEYS", "fruit:?pple"]),
            &TestUtils::expected_bulk_string_array(&["fruit:apple"]),
        )
        .await;

    client
        .exec_command_immediate_success_response(
            TestUtils::command(&["KEYS", "meat:*"]),
            &TestUtils::expected_bulk_string_array(&[]),
        )
        .await;
}

#[tokio::test]
async fn test_keys_matches_keys_with_newlines() {
    let env = TestEnv::new_master_server();
    let mut client = env.client().await;

    client
        .exec_command_immediate_success_response(
            TestUtils::command(&["SET", "multi\nline", "1"]),
            &TestUtils::expected_ok(),
        )
        .await;

    client
        .exec_command_immediate_success_response(
            TestUtils::command(&["KEYS", "*"]),
            &TestUtils::expected_bulk_string_array(&["multi\nline"]),
        )
        .await;

    client
        .exec_command_immediate_success_response(
            TestUtils::command(&["KEYS", "multi?line"]),
            &TestUtils::expected_bulk_string_array(&["multi\nline"]),
        )
        .await;
}
