use redcore::resp::RespValue;

use crate::test_utils::{TestEnv, TestUtils};

fn entry(id: &str, fields: &[&str]) -> RespValue {
    RespValue::Array(vec![
        TestUtils::expected_bulk_string(id),
        TestUtils::expected_bulk_string_array(fields),
    ])
}

#[tokio::test]
async fn test_handle_xrange_command() {
    let env = TestEnv::new_master_server();
    let mut client = env.client().await;

    for (id, temperature) in [("1-0", "20"), ("1-1", "21"), ("2-0", "22"), ("3-5", "23")] {
        client
            .exec_command_immediate_success_response(
                TestUtils::command(&["XADD", "weather", id, "temperature", temperature]),
                &TestUtils::expected_bulk_string(id),
            )
            .await;
    }

    let test_cases = vec![
        (
            ("-", "+"),
            vec![
                entry("1-0", &["temperature", "20"]),
                entry("1-1", &["temperature", "21"]),
                entry("2-0", &["temperature", "22"]),
                entry("3-5", &["temperature", "23"]),
            ],
        ),
        (
            ("1", "1"),
            vec![
                entry("1-0", &["temperature", "20"]),
                entry("1-1", &["temperature", "21"]),
            ],
        ),
        (
            ("1-1", "2-0"),
            vec![
                entry("1-1", &["temperature", "21"]),
                entry("2-0", &["temperature", "22"]),
            ],
        ),
        (("3-6", "+"), vec![]),
        (("3", "1"), vec![]),
    ];

    for ((start, end), expected) in test_cases {
        client
            .exec_command_immediate_success_response(
                TestUtils::command(&["XRANGE", "weather", start, end]),
                &RespValue::Array(expected),
            )
            .await;
    }

    client
        .exec_command_immediate_success_response(
            TestUtils::command(&["XRANGE", "weather", "-", "+", "COUNT", "1"]),
            &RespValue::Array(vec![entry("1-0", &["temperature", "20"])]),
        )
        .await;

    client
        .exec_command_immediate_success_response(
            TestUtils::command(&["XRANGE", "missing", "-", "+"]),
            &RespValue::Array(vec![]),
        )
        .await;
}
