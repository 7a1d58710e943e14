use crate::test_utils::{TestEnv, TestUtils};

#[tokio::test]
async fn test_handle_lrange_command() {
    let env = TestEnv::new_master_server();
    let mut client = env.client().await;

    client
        .exec_command_immediate_success_response(
            TestUtils::command(&["RPUSH", "letters", "a", "b", "c", "d", "e"]),
            &TestUtils::expected_integer(5),
        )
        .await;

    let test_cases = vec![
        (("0", "1"), vec!["a", "b"]),
        (("2", "4"), vec!["c", "d", "e"]),
        (("0", "-1"), vec!["a", "b", "c", "d", "e"]),
        (("-2", "-1"), vec!["d", "e"]),
        (("-100", "1"), vec!["a", "b"]),
        (("1", "100"), vec!["b", "c", "d", "e"]),
        (("3", "1"), vec![]),
        (("10", "20"), vec![]),
    ];

    for ((start, stop), expected) in test_cases {
        client
            .exec_command_immediate_success_response(
                TestUtils::command(&["LRANGE", "letters", start, stop]),
                &TestUtils::expected_bulk_string_array(&expected),
            )
            .await;
    }

    client
        .exec_command_immediate_success_response(
            TestUtils::command(&["LRANGE", "missing", "0", "-1"]),
            &TestUtils::expected_bulk_string_array(&[]),
        )
        .await;
}
