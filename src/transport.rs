// Transport layer: the agent core only needs decoded messages and a way
// to emit one key per tick. The wire format is JSON lines over TCP; a
// scripted in-memory transport backs the integration tests.

use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;

use crate::errors::AgentError;
use crate::types::{MapInfo, Observation};

/// Decoded server message
#[derive(Debug, Clone)]
pub enum ServerMessage {
    MapInfo(MapInfo),
    Observation(Observation),
    /// A state without a body: the episode is over
    GameOver,
    /// Clean close; stops the loop without error
    Closed,
}

/// What the session loop needs from a connection
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn send_join(&mut self, name: &str) -> Result<(), AgentError>;
    async fn send_key(&mut self, key: &str) -> Result<(), AgentError>;
    async fn recv(&mut self) -> Result<ServerMessage, AgentError>;
}

/// Classifies one raw JSON message from the server
pub fn decode_server_message(raw: &str) -> Result<ServerMessage, AgentError> {
    let value: Value = serde_json::from_str(raw)?;

    if value.get("map").is_some() {
        let info: MapInfo = serde_json::from_value(value)?;
        return Ok(ServerMessage::MapInfo(info));
    }

    let has_body = value
        .get("body")
        .and_then(Value::as_array)
        .is_some_and(|body| !body.is_empty());
    if !has_body {
        return Ok(ServerMessage::GameOver);
    }

    let obs: Observation = serde_json::from_value(value)?;
    Ok(ServerMessage::Observation(obs))
}

/// JSON-lines-over-TCP transport used by the real client
pub struct TcpTransport {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl TcpTransport {
    pub async fn connect(addr: &str) -> Result<Self, AgentError> {
        let stream = TcpStream::connect(addr).await?;
        let (read_half, write_half) = stream.into_split();
        Ok(TcpTransport {
            reader: BufReader::new(read_half),
            writer: write_half,
        })
    }

    async fn send_value(&mut self, value: Value) -> Result<(), AgentError> {
        let mut line = serde_json::to_string(&value)?;
        line.push('\n');
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.flush().await?;
        Ok(())
    }
}

impl Transport for TcpTransport {
    async fn send_join(&mut self, name: &str) -> Result<(), AgentError> {
        self.send_value(json!({ "cmd": "join", "name": name })).await
    }

    async fn send_key(&mut self, key: &str) -> Result<(), AgentError> {
        self.send_value(json!({ "cmd": "key", "key": key })).await
    }

    async fn recv(&mut self) -> Result<ServerMessage, AgentError> {
        let mut line = String::new();
        let read = self.reader.read_line(&mut line).await?;
        if read == 0 {
            return Ok(ServerMessage::Closed);
        }
        decode_server_message(line.trim_end())
    }
}

/// In-memory transport fed from a fixed message script. Emitted keys are
/// collected behind a shared handle so tests can inspect them after the
/// session loop finishes.
pub struct ScriptedTransport {
    incoming: VecDeque<ServerMessage>,
    sent: Arc<Mutex<Vec<String>>>,
}

impl ScriptedTransport {
    pub fn new(messages: Vec<ServerMessage>) -> Self {
        ScriptedTransport {
            incoming: messages.into(),
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Handle onto every line this transport has sent
    pub fn sent(&self) -> Arc<Mutex<Vec<String>>> {
        self.sent.clone()
    }
}

impl Transport for ScriptedTransport {
    async fn send_join(&mut self, name: &str) -> Result<(), AgentError> {
        self.sent
            .lock()
            .expect("sent lock poisoned")
            .push(format!("join:{}", name));
        Ok(())
    }

    async fn send_key(&mut self, key: &str) -> Result<(), AgentError> {
        self.sent
            .lock()
            .expect("sent lock poisoned")
            .push(key.to_string());
        Ok(())
    }

    async fn recv(&mut self) -> Result<ServerMessage, AgentError> {
        Ok(self.incoming.pop_front().unwrap_or(ServerMessage::Closed))
    }
}
