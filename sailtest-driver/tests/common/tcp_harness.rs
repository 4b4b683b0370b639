//! TCP-level stand-in for the server under test.
//!
//! `ScriptedServer` binds to port 0, greets every connection and answers
//! each received line from a fixed script.

use sailtest_core::ServerAddress;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;

pub const UNKNOWN_COMMAND: &str = "500 unrecognized command";

type Script = Arc<HashMap<String, Vec<String>>>;

/// A line server bound to a random OS-assigned port.
pub struct ScriptedServer {
    address: ServerAddress,
    connections: Arc<AtomicUsize>,
    shutdown_tx: broadcast::Sender<()>,
}

impl ScriptedServer {
    /// Start a server that sends `greeting` on connect and replies to each
    /// command listed in `script`. An empty reply means stay silent;
    /// unlisted commands get [`UNKNOWN_COMMAND`].
    pub async fn start(greeting: &str, script: &[(&str, &[&str])]) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let script: Script = Arc::new(
            script
                .iter()
                .map(|(command, reply)| {
                    (
                        command.to_string(),
                        reply.iter().map(|line| line.to_string()).collect(),
                    )
                })
                .collect(),
        );
        let greeting = greeting.to_owned();
        let connections = Arc::new(AtomicUsize::new(0));
        let (shutdown_tx, mut shutdown_rx) = broadcast::channel::<()>(1);

        let accepted = connections.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => break,
                    incoming = listener.accept() => {
                        let Ok((stream, _)) = incoming else { break };
                        accepted.fetch_add(1, Ordering::SeqCst);
                        tokio::spawn(serve(stream, greeting.clone(), script.clone()));
                    }
                }
            }
        });

        Self {
            address: ServerAddress::new("127.0.0.1", port),
            connections,
            shutdown_tx,
        }
    }

    /// Server speaking the greet/HELLO/QUIT conversation of `hello_conversation`.
    pub async fn hello(hello_reply: &str) -> Self {
        Self::start(
            "220 ready",
            &[("HELLO", &[hello_reply]), ("QUIT", &["221 bye"])],
        )
        .await
    }

    pub fn address(&self) -> ServerAddress {
        self.address.clone()
    }

    pub fn port(&self) -> u16 {
        self.address.port
    }

    /// Number of connections accepted so far.
    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }
}

impl Drop for ScriptedServer {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(());
    }
}

async fn serve(stream: TcpStream, greeting: String, script: Script) {
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);

    if write_half
        .write_all(format!("{greeting}\r\n").as_bytes())
        .await
        .is_err()
    {
        return;
    }

    let mut line = String::new();
    loop {
        line.clear();
        match reader.read_line(&mut line).await {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }

        let command = line.trim_end_matches(['\r', '\n']);
        let reply = match script.get(command) {
            Some(lines) => lines.clone(),
            None => vec![UNKNOWN_COMMAND.to_owned()],
        };

        let mut payload = String::new();
        for reply_line in reply {
            payload.push_str(&reply_line);
            payload.push_str("\r\n");
        }
        if write_half.write_all(payload.as_bytes()).await.is_err() {
            break;
        }
    }
}
