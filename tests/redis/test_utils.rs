use std::{sync::Arc, time::Duration};

use bytes::Bytes;
use redcore::{
    client::{ClientKind, ClientSession},
    commands::{CommandError, CommandHandler, dispatch},
    resp::RespValue,
    server::{Config, ReplicaOf},
    state::ServerState,
};
use tokio::{sync::mpsc, task::JoinHandle, time::timeout};

/// Test utilities for simplifying Redis command tests
pub struct TestUtils;

/// Test environment holding the shared server state
#[derive(Clone)]
pub struct TestEnv {
    pub state: Arc<ServerState>,
}

/// One simulated connection: its session plus whatever the server queued for it
pub struct TestClient {
    pub session: ClientSession,
    pub outbound: mpsc::UnboundedReceiver<Bytes>,
    state: Arc<ServerState>,
}

impl TestEnv {
    /// Create a new test environment with a master server
    pub fn new_master_server() -> Self {
        Self {
            state: Arc::new(ServerState::new(Config::default())),
        }
    }

    /// Create a new test environment with a replica server
    pub fn new_replica_server() -> Self {
        let config = Config {
            port: 6380,
            replicaof: Some(ReplicaOf {
                host: "127.0.0.1".to_string(),
                port: 6379,
            }),
            ..Config::default()
        };

        Self {
            state: Arc::new(ServerState::new(config)),
        }
    }

    /// Open a client connection the way the accept loop does
    pub async fn client(&self) -> TestClient {
        let authenticated = self.state.users.lock().await.default_user_nopass();
        self.client_of_kind(ClientKind::Normal, authenticated)
    }

    pub fn client_of_kind(&self, kind: ClientKind, authenticated: bool) -> TestClient {
        let (sender, receiver) = mpsc::unbounded_channel();

        TestClient {
            session: ClientSession::new(kind, authenticated, sender),
            outbound: receiver,
            state: Arc::clone(&self.state),
        }
    }
}

impl TestClient {
    pub async fn exec(&mut self, command: RespValue) -> Option<RespValue> {
        let handler = match CommandHandler::new(command) {
            Ok(handler) => handler,
            Err(e) => return Some(e.to_resp()),
        };

        dispatch(&self.state, &mut self.session, handler).await
    }

    /// Execute a command and assert on its reply
    pub async fn exec_command_immediate_success_response(
        &mut self,
        command: RespValue,
        expected: &RespValue,
    ) {
        let reply = self.exec(command.clone()).await;
        assert_eq!(reply.as_ref(), Some(expected), "running {:?}", command);
    }

    /// Execute a command and assert it fails with the given error
    pub async fn exec_command_immediate_error_response(
        &mut self,
        command: RespValue,
        expected: CommandError,
    ) {
        let reply = self.exec(command.clone()).await;
        assert_eq!(reply, Some(expected.to_resp()), "running {:?}", command);
    }

    /// Execute a command that writes nothing back
    pub async fn exec_command_no_response(&mut self, command: RespValue) {
        let reply = self.exec(command.clone()).await;
        assert_eq!(reply, None, "running {:?}", command);
    }

    /// Raw chunks queued on the connection, one per send
    pub fn drain_outbound(&mut self) -> Vec<Bytes> {
        let mut chunks = Vec::new();
        while let Ok(chunk) = self.outbound.try_recv() {
            chunks.push(chunk);
        }
        chunks
    }

    /// Every frame queued on the connection, decoded
    pub fn pushed_values(&mut self) -> Vec<RespValue> {
        let buffer = self.drain_outbound().concat();
        let mut values = Vec::new();
        let mut cursor = 0;

        while let Some((value, consumed)) = RespValue::decode(&buffer[cursor..]).unwrap() {
            values.push(value);
            cursor += consumed;
        }

        assert_eq!(cursor, buffer.len(), "trailing bytes in outbound queue");
        values
    }
}

impl TestUtils {
    pub fn command(parts: &[&str]) -> RespValue {
        RespValue::command(parts)
    }

    pub fn expected_ok() -> RespValue {
        RespValue::ok()
    }

    pub fn expected_simple_string(s: &str) -> RespValue {
        RespValue::SimpleString(s.to_string())
    }

    pub fn expected_integer(n: i64) -> RespValue {
        RespValue::Integer(n)
    }

    pub fn expected_bulk_string(s: &str) -> RespValue {
        RespValue::BulkString(s.to_string())
    }

    pub fn expected_bulk_string_array(items: &[&str]) -> RespValue {
        RespValue::array_of_bulk_strings(items.iter().copied())
    }

    pub fn expected_null() -> RespValue {
        RespValue::Null
    }

    pub fn expected_null_array() -> RespValue {
        RespValue::NullArray
    }

    /// Run a command on its own task, handing the client back with the reply
    pub fn spawn_command(
        mut client: TestClient,
        command: RespValue,
    ) -> JoinHandle<(TestClient, Option<RespValue>)> {
        tokio::spawn(async move {
            let reply = client.exec(command).await;
            (client, reply)
        })
    }

    pub async fn wait_for_completion(
        task: JoinHandle<(TestClient, Option<RespValue>)>,
        limit: Duration,
    ) -> (TestClient, Option<RespValue>) {
        timeout(limit, task)
            .await
            .expect("command did not finish in time")
            .expect("command task panicked")
    }

    pub async fn sleep_ms(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}
