use std::time::Duration;

use redcore::{
    client::ClientKind, commands::CommandError, resp::RespValue, types::stream::StreamError,
};

use crate::test_utils::{TestClient, TestEnv, TestUtils};

/// Runs the replica side of the handshake on `client` and returns the snapshot bytes.
async fn attach_replica(env: &TestEnv, client: &mut TestClient) -> Vec<u8> {
    client
        .exec_command_immediate_success_response(
            TestUtils::command(&["REPLCONF", "listening-port", "6380"]),
            &TestUtils::expected_ok(),
        )
        .await;

    client
        .exec_command_immediate_success_response(
            TestUtils::command(&["REPLCONF", "capa", "psync2"]),
            &TestUtils::expected_ok(),
        )
        .await;

    client
        .exec_command_no_response(TestUtils::command(&["PSYNC", "?", "-1"]))
        .await;

    let chunks = client.drain_outbound();
    assert_eq!(chunks.len(), 2);

    let (replication_id, offset) = {
        let replication = env.state.replication.lock().await;
        (replication.replication_id().to_string(), replication.offset())
    };
    assert_eq!(
        chunks[0].as_ref(),
        format!("+FULLRESYNC {} {}\r\n", replication_id, offset).as_bytes()
    );

    let payload = chunks[1].to_vec();
    let header_end = payload.windows(2).position(|w| w == b"\r\n").unwrap();
    let length: usize = std::str::from_utf8(&payload[1..header_end])
        .unwrap()
        .parse()
        .unwrap();

    assert_eq!(payload[0], b'$');
    let snapshot = payload[header_end + 2..].to_vec();
    assert_eq!(snapshot.len(), length);
    assert!(snapshot.starts_with(b"REDIS"));

    snapshot
}

#[tokio::test]
async fn test_psync_registers_replica_and_streams_writes() {
    let env = TestEnv::new_master_server();
    let mut client = env.client().await;
    let mut replica = env.client().await;

    client
        .exec_command_immediate_success_response(
            TestUtils::command(&["SET", "fruit", "mango"]),
            &TestUtils::expected_ok(),
        )
        .await;

    let snapshot = attach_replica(&env, &mut replica).await;
    assert!(snapshot.windows(5).any(|w| w == b"mango"));

    client
        .exec_command_immediate_success_response(
            TestUtils::command(&["SET", "veggie", "kale"]),
            &TestUtils::expected_ok(),
        )
        .await;
    client
        .exec_command_immediate_success_response(
            TestUtils::command(&["RPUSH", "fruits", "apple"]),
            &TestUtils::expected_integer(1),
        )
        .await;
    client
        .exec_command_immediate_success_response(
            TestUtils::command(&["GET", "veggie"]),
            &TestUtils::expected_bulk_string("kale"),
        )
        .await;

    // Reads are not forwarded.
    assert_eq!(
        replica.pushed_values(),
        vec![
            TestUtils::command(&["SET", "veggie", "kale"]),
            TestUtils::command(&["RPUSH", "fruits", "apple"]),
        ]
    );

    let Some(RespValue::BulkString(info)) =
        client.exec(TestUtils::command(&["INFO", "replication"])).await
    else {
        panic!("INFO should reply with a bulk string");
    };
    assert!(info.contains("connected_slaves:1"));
}

#[tokio::test]
async fn test_forwarded_writes_are_deterministic() {
    let env = TestEnv::new_master_server();
    let mut client = env.client().await;
    let mut replica = env.client().await;

    attach_replica(&env, &mut replica).await;

    client
        .exec_command_immediate_error_response(
            TestUtils::command(&["XADD", "weather", "0-0", "temperature", "20"]),
            CommandError::Stream(StreamError::ZeroId),
        )
        .await;
    assert!(replica.pushed_values().is_empty());

    let Some(RespValue::BulkString(id)) = client
        .exec(TestUtils::command(&["XADD", "weather", "*", "temperature", "20"]))
        .await
    else {
        panic!("XADD should reply with the new ID");
    };

    // The replica gets the ID the primary picked, not `*`.
    assert_eq!(
        replica.pushed_values(),
        vec![TestUtils::command(&["XADD", "weather", &id, "temperature", "20"])]
    );

    client
        .exec_command_immediate_success_response(
            TestUtils::command(&["RPUSH", "queue", "a"]),
            &TestUtils::expected_integer(1),
        )
        .await;
    client
        .exec_command_immediate_success_response(
            TestUtils::command(&["BLPOP", "queue", "0"]),
            &TestUtils::expected_bulk_string_array(&["queue", "a"]),
        )
        .await;

    // A pop done by BLPOP reaches replicas as a plain LPOP.
    assert_eq!(
        replica.pushed_values(),
        vec![
            TestUtils::command(&["RPUSH", "queue", "a"]),
            TestUtils::command(&["LPOP", "queue"]),
        ]
    );
}

#[tokio::test]
async fn test_wait_without_replicas() {
    let env = TestEnv::new_master_server();
    let mut client = env.client().await;

    client
        .exec_command_immediate_success_response(
            TestUtils::command(&["WAIT", "0", "100"]),
            &TestUtils::expected_integer(0),
        )
        .await;

    client
        .exec_command_immediate_success_response(
            TestUtils::command(&["SET", "fruit", "mango"]),
            &TestUtils::expected_ok(),
        )
        .await;

    client
        .exec_command_immediate_success_response(
            TestUtils::command(&["WAIT", "1", "100"]),
            &TestUtils::expected_integer(0),
        )
        .await;
}

#[tokio::test]
async fn test_wait_before_any_write_counts_connected_replicas() {
    let env = TestEnv::new_master_server();
    let mut client = env.client().await;
    let mut first = env.client().await;
    let mut second = env.client().await;

    attach_replica(&env, &mut first).await;
    attach_replica(&env, &mut second).await;

    client
        .exec_command_immediate_success_response(
            TestUtils::command(&["WAIT", "5", "0"]),
            &TestUtils::expected_integer(2),
        )
        .await;
}

#[tokio::test]
async fn test_wait_returns_once_replicas_acknowledge() {
    let env = TestEnv::new_master_server();
    let mut client = env.client().await;
    let mut replica = env.client().await;
    let mut lagging = env.client().await;

    attach_replica(&env, &mut replica).await;
    attach_replica(&env, &mut lagging).await;

    client
        .exec_command_immediate_success_response(
            TestUtils::command(&["SET", "fruit", "mango"]),
            &TestUtils::expected_ok(),
        )
        .await;

    let target = env.state.replication.lock().await.offset();

    let waiting = TestUtils::spawn_command(client, TestUtils::command(&["WAIT", "1", "0"]));
    TestUtils::sleep_ms(50).await;
    assert!(!waiting.is_finished());

    // WAIT asks every replica for a fresh acknowledgement.
    assert_eq!(
        replica.pushed_values(),
        vec![
            TestUtils::command(&["SET", "fruit", "mango"]),
            TestUtils::command(&["REPLCONF", "GETACK", "*"]),
        ]
    );

    replica
        .exec_command_no_response(TestUtils::command(&[
            "REPLCONF",
            "ACK",
            &target.to_string(),
        ]))
        .await;

    let (_, reply) = TestUtils::wait_for_completion(waiting, Duration::from_secs(3)).await;
    assert_eq!(reply, Some(TestUtils::expected_integer(1)));
}

#[tokio::test]
async fn test_wait_times_out_with_acknowledged_count() {
    let env = TestEnv::new_master_server();
    let mut client = env.client().await;
    let mut replica = env.client().await;
    let mut lagging = env.client().await;

    attach_replica(&env, &mut replica).await;
    attach_replica(&env, &mut lagging).await;

    client
        .exec_command_immediate_success_response(
            TestUtils::command(&["SET", "fruit", "mango"]),
            &TestUtils::expected_ok(),
        )
        .await;

    let target = env.state.replication.lock().await.offset();
    replica
        .exec_command_no_response(TestUtils::command(&[
            "REPLCONF",
            "ACK",
            &target.to_string(),
        ]))
        .await;

    client
        .exec_command_immediate_success_response(
            TestUtils::command(&["WAIT", "2", "200"]),
            &TestUtils::expected_integer(1),
        )
        .await;
}

#[tokio::test]
async fn test_disconnected_replica_is_forgotten() {
    let env = TestEnv::new_master_server();
    let mut client = env.client().await;
    let mut replica = env.client().await;

    attach_replica(&env, &mut replica).await;
    drop(replica);

    let Some(RespValue::BulkString(info)) =
        client.exec(TestUtils::command(&["INFO", "replication"])).await
    else {
        panic!("INFO should reply with a bulk string");
    };
    assert!(info.contains("connected_slaves:0"));
}

#[tokio::test]
async fn test_replica_rejects_client_writes() {
    let env = TestEnv::new_replica_server();
    let mut client = env.client().await;

    for command in [
        TestUtils::command(&["SET", "fruit", "mango"]),
        TestUtils::command(&["RPUSH", "fruits", "mango"]),
        TestUtils::command(&["XADD", "weather", "*", "temperature", "20"]),
    ] {
        client
            .exec_command_immediate_error_response(command, CommandError::ReadOnlyReplica)
            .await;
    }

    client
        .exec_command_immediate_error_response(
            TestUtils::command(&["WAIT", "1", "0"]),
            CommandError::WaitOnReplica,
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
async fn test_master_link_applies_writes_on_replica() {
    let env = TestEnv::new_replica_server();
    let mut master_link = env.client_of_kind(ClientKind::MasterLink, true);
    let mut client = env.client().await;

    master_link
        .exec(TestUtils::command(&["SET", "fruit", "mango"]))
        .await;

    client
        .exec_command_immediate_success_response(
            TestUtils::command(&["GET", "fruit"]),
            &TestUtils::expected_bulk_string("mango"),
        )
        .await;

    master_link.session.replication_offset = 31;
    master_link
        .exec_command_immediate_success_response(
            TestUtils::command(&["REPLCONF", "GETACK", "*"]),
            &TestUtils::expected_bulk_string_array(&["REPLCONF", "ACK", "31"]),
        )
        .await;
}
