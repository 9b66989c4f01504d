use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::time::{sleep, Duration};

use rustkv::server;

async fn start_server(port: u16) {
    tokio::spawn(async move { server::run(&format!("127.0.0.1:{port}")).await });
    // Give the listener a moment to bind before clients connect.
    for _ in 0..50 {
        if TcpStream::connect(("127.0.0.1", port)).await.is_ok() {
            return;
        }
        sleep(Duration::from_millis(20)).await;
    }
    panic!("server did not start on port {port}");
}

struct Client {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl Client {
    async fn connect(port: u16) -> Client {
        let stream = TcpStream::connect(("127.0.0.1", port)).await.unwrap();
        let (read_half, write_half) = stream.into_split();
        Client {
            reader: BufReader::new(read_half),
            writer: write_half,
        }
    }

    /// Sends one request line and reads the single reply line.
    async fn send(&mut self, line: &str) -> String {
        self.writer
            .write_all(format!("{line}\n").as_bytes())
            .await
            .unwrap();
        self.read_line().await
    }

    async fn read_line(&mut self) -> String {
        let mut line = String::new();
        let read = self.reader.read_line(&mut line).await.unwrap();
        assert!(read > 0, "server closed the connection");
        line.trim_end_matches('\n').to_string()
    }
}

#[tokio::test]
async fn set_and_get() {
    start_server(7400).await;
    let mut client = Client::connect(7400).await;

    assert_eq!(client.send("SET name gandalf").await, "OK");
    assert_eq!(client.send("GET name").await, "gandalf");
    assert_eq!(client.send("GET missing").await, "<nil>");
}

#[tokio::test]
async fn set_quoted_value_with_spaces() {
    start_server(7401).await;
    let mut client = Client::connect(7401).await;

    assert_eq!(client.send(r#"SET wizard "gandalf the grey""#).await, "OK");
    assert_eq!(client.send("GET wizard").await, "gandalf the grey");
}

#[tokio::test]
async fn increments() {
    start_server(7402).await;
    let mut client = Client::connect(7402).await;

    assert_eq!(client.send("SET counter 5").await, "OK");
    assert_eq!(client.send("INCR counter").await, "6");
    assert_eq!(client.send("INCR counter").await, "7");
    assert_eq!(client.send("INCRBY counter -10").await, "-3");
}

#[tokio::test]
async fn transaction_applies_on_exec() {
    start_server(7403).await;
    let mut client = Client::connect(7403).await;

    assert_eq!(client.send("MULTI").await, "OK");
    assert_eq!(client.send("SET a 1").await, "QUEUED");
    assert_eq!(client.send("INCR a").await, "QUEUED");
    assert_eq!(client.send("EXEC").await, "1) OK");
    assert_eq!(client.read_line().await, "2) 2");
    assert_eq!(client.send("GET a").await, "2");
}

#[tokio::test]
async fn transaction_rolls_back_on_runtime_error() {
    start_server(7404).await;
    let mut client = Client::connect(7404).await;

    assert_eq!(client.send("SET a 1").await, "OK");
    assert_eq!(client.send("MULTI").await, "OK");
    assert_eq!(client.send("INCR a").await, "QUEUED");
    assert_eq!(client.send("SET b b").await, "QUEUED");
    assert_eq!(client.send("INCR b").await, "QUEUED");
    assert_eq!(
        client.send("EXEC").await,
        "err value is not an integer or out of range"
    );
    assert_eq!(client.send("GET a").await, "1");
    assert_eq!(client.send("GET b").await, "<nil>");
}

#[tokio::test]
async fn select_switches_databases() {
    start_server(7405).await;
    let mut client = Client::connect(7405).await;

    assert_eq!(client.send("SELECT 1").await, "OK");
    assert_eq!(client.send("SET k v").await, "OK");
    assert_eq!(client.send("SELECT 2").await, "OK");
    assert_eq!(client.send("GET k").await, "<nil>");
    assert_eq!(client.send("SELECT 1").await, "OK");
    assert_eq!(client.send("GET k").await, "v");
    assert_eq!(client.send("SELECT 16").await, "err DB index is out of range");
}

#[tokio::test]
async fn sessions_share_databases_but_not_selection() {
    start_server(7406).await;
    let mut first = Client::connect(7406).await;
    let mut second = Client::connect(7406).await;

    assert_eq!(first.send("SET shared everyone").await, "OK");
    assert_eq!(second.send("GET shared").await, "everyone");

    // Selection is per session: the second client stays on database 0.
    assert_eq!(first.send("SELECT 1").await, "OK");
    assert_eq!(first.send("SET private me").await, "OK");
    assert_eq!(second.send("GET private").await, "<nil>");
}

#[tokio::test]
async fn queue_time_validation_poisons_the_transaction() {
    start_server(7407).await;
    let mut client = Client::connect(7407).await;

    assert_eq!(client.send("MULTI").await, "OK");
    assert_eq!(
        client.send("SET one").await,
        "wrong number of arguments for SET command"
    );
    assert_eq!(client.send("SET b 2").await, "QUEUED");
    assert_eq!(
        client.send("EXEC").await,
        "discarding transaction due to above errors"
    );
    assert_eq!(client.send("GET b").await, "<nil>");
    // The poisoned transaction is gone; a fresh MULTI works.
    assert_eq!(client.send("MULTI").await, "OK");
    assert_eq!(client.send("DISCARD").await, "OK");
}

#[tokio::test]
async fn discard_abandons_the_batch() {
    start_server(7408).await;
    let mut client = Client::connect(7408).await;

    assert_eq!(client.send("MULTI").await, "OK");
    assert_eq!(client.send("SET counter 10").await, "QUEUED");
    assert_eq!(client.send("INCR counter").await, "QUEUED");
    assert_eq!(client.send("DISCARD").await, "OK");
    assert_eq!(client.send("GET counter").await, "<nil>");
}

#[tokio::test]
async fn transaction_control_requires_a_transaction() {
    start_server(7409).await;
    let mut client = Client::connect(7409).await;

    assert_eq!(
        client.send("EXEC").await,
        "err no transaction in progress"
    );
    assert_eq!(
        client.send("DISCARD").await,
        "err no transaction in progress"
    );
    assert_eq!(client.send("MULTI").await, "OK");
    assert_eq!(
        client.send("MULTI").await,
        "err transaction already in progress"
    );
}

#[tokio::test]
async fn parse_and_dispatch_errors_keep_the_session_alive() {
    start_server(7410).await;
    let mut client = Client::connect(7410).await;

    assert_eq!(client.send("").await, "ERR empty command");
    assert_eq!(
        client.send(r#"SET key "unterminated"#).await,
        "ERR syntax, mismatched quotes"
    );
    assert_eq!(
        client.send("FOOBAR arg1 arg2").await,
        "err unknown command: FOOBAR"
    );
    assert_eq!(
        client.send("SELECT hi").await,
        "err value is not an integer or out of range"
    );
    // The connection survived all of the above.
    assert_eq!(client.send("SET name gandalf").await, "OK");
    assert_eq!(client.send("GET name").await, "gandalf");
}

#[tokio::test]
async fn compact_dumps_the_current_database() {
    start_server(7411).await;
    let mut client = Client::connect(7411).await;

    // Empty database: a single empty line.
    assert_eq!(client.send("COMPACT").await, "");

    assert_eq!(client.send("SET a 1").await, "OK");
    assert_eq!(client.send("COMPACT").await, "SET a 1");
}

#[tokio::test]
async fn select_is_rejected_inside_a_transaction() {
    start_server(7412).await;
    let mut client = Client::connect(7412).await;

    assert_eq!(client.send("SET a 1").await, "OK");
    assert_eq!(client.send("MULTI").await, "OK");
    assert_eq!(client.send("SET a 2").await, "QUEUED");
    assert_eq!(client.send("SELECT 1").await, "QUEUED");
    assert_eq!(
        client.send("EXEC").await,
        "err SELECT is not allowed in transactions"
    );
    // The batch rolled back.
    assert_eq!(client.send("GET a").await, "1");
}

#[tokio::test]
async fn concurrent_increments_lose_no_updates() {
    start_server(7413).await;
    let tasks = 8;
    let increments_per_task = 50;

    let handles: Vec<_> = (0..tasks)
        .map(|_| {
            tokio::spawn(async move {
                let mut client = Client::connect(7413).await;
                for _ in 0..increments_per_task {
                    let reply = client.send("INCR counter").await;
                    reply.parse::<i64>().expect("INCR reply is an integer");
                }
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap();
    }

    let mut client = Client::connect(7413).await;
    let expected = (tasks * increments_per_task).to_string();
    assert_eq!(client.send("GET counter").await, expected);
}
