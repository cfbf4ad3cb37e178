//! mpv-backed playback clock.
//!
//! Talks to a spawned mpv process over its JSON IPC socket. Requests carry
//! a `request_id` for response matching; asynchronous events received while
//! waiting (notably `pause` property changes) are folded into pending state
//! instead of being dropped. All socket I/O runs under a short timeout so a
//! stalled player degrades to skipped ticks rather than blocking the loop.

use super::PlayerClock;
use crate::error::{Result, TerpError};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::path::Path;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::UnixStream;
use tracing::debug;

const RESPONSE_TIMEOUT: Duration = Duration::from_millis(250);

/// Playback clock over mpv's JSON IPC.
pub struct MpvClock {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
    next_request_id: u64,
    pending_play_state: Option<bool>,
}

impl MpvClock {
    /// Connect to a running mpv instance and subscribe to pause changes.
    pub async fn connect(socket: &Path) -> Result<Self> {
        let stream = UnixStream::connect(socket)
            .await
            .map_err(|e| TerpError::Player(format!("mpv IPC connect failed: {}", e)))?;

        let mut clock = Self::from_stream(stream);
        clock.request(json!(["observe_property", 1, "pause"])).await;
        Ok(clock)
    }

    /// Connect, retrying while mpv is still creating its socket.
    pub async fn connect_with_retries(
        socket: &Path,
        attempts: u32,
        delay: Duration,
    ) -> Result<Self> {
        let mut last_error = TerpError::Player("mpv IPC connect failed".to_string());

        for _ in 0..attempts.max(1) {
            match Self::connect(socket).await {
                Ok(clock) => return Ok(clock),
                Err(e) => {
                    last_error = e;
                    tokio::time::sleep(delay).await;
                }
            }
        }

        Err(last_error)
    }

    fn from_stream(stream: UnixStream) -> Self {
        let (read_half, write_half) = stream.into_split();
        Self {
            reader: BufReader::new(read_half),
            writer: write_half,
            next_request_id: 1,
            pending_play_state: None,
        }
    }

    /// Send one command and wait for its matching response.
    ///
    /// Returns `None` on any failure (write error, timeout, closed socket,
    /// mpv error status) — the adapter contract treats these as "no update".
    async fn request(&mut self, command: Value) -> Option<Value> {
        let request_id = self.next_request_id;
        self.next_request_id += 1;

        let mut line = serde_json::to_string(&json!({
            "command": command,
            "request_id": request_id,
        }))
        .ok()?;
        line.push('\n');

        self.writer.write_all(line.as_bytes()).await.ok()?;

        loop {
            let mut buf = String::new();
            let read = tokio::time::timeout(RESPONSE_TIMEOUT, self.reader.read_line(&mut buf))
                .await
                .ok()?
                .ok()?;
            if read == 0 {
                debug!("mpv IPC socket closed");
                return None;
            }

            let value: Value = match serde_json::from_str(buf.trim()) {
                Ok(value) => value,
                Err(_) => continue,
            };

            if value.get("event").is_some() {
                self.handle_event(&value);
                continue;
            }

            if value.get("request_id").and_then(Value::as_u64) == Some(request_id) {
                if value.get("error").and_then(Value::as_str) == Some("success") {
                    return Some(value.get("data").cloned().unwrap_or(Value::Null));
                }
                return None;
            }
            // Response to an earlier, timed-out request; skip it.
        }
    }

    fn handle_event(&mut self, payload: &Value) {
        let is_pause_change = payload.get("event").and_then(Value::as_str)
            == Some("property-change")
            && payload.get("name").and_then(Value::as_str) == Some("pause");

        if is_pause_change {
            if let Some(paused) = payload.get("data").and_then(Value::as_bool) {
                self.pending_play_state = Some(!paused);
            }
        }
    }
}

#[async_trait]
impl PlayerClock for MpvClock {
    async fn poll(&mut self) -> Option<f64> {
        self.request(json!(["get_property", "playback-time"]))
            .await?
            .as_f64()
    }

    async fn seek_to(&mut self, seconds: f64) {
        self.request(json!(["set_property", "playback-time", seconds]))
            .await;
    }

    async fn set_paused(&mut self, paused: bool) {
        self.request(json!(["set_property", "pause", paused])).await;
    }

    async fn take_play_state(&mut self) -> Option<bool> {
        self.pending_play_state.take()
    }
}

/// Launch mpv playing the given URL, with its IPC server on `socket`.
pub async fn launch(binary: &str, url: &str, socket: &Path) -> Result<tokio::process::Child> {
    tokio::process::Command::new(binary)
        .arg(format!("--input-ipc-server={}", socket.display()))
        .arg("--really-quiet")
        .arg("--keep-open=yes")
        .arg(url)
        .spawn()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                TerpError::ToolNotFound(binary.to_string())
            } else {
                TerpError::Player(format!("Failed to launch {}: {}", binary, e))
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;

    /// Fake mpv endpoint: answers every request with the given data value,
    /// emitting a pause property-change event before each response.
    async fn run_fake_mpv(server: UnixStream, data: Value, emit_pause: Option<bool>) {
        let (read_half, mut write_half) = server.into_split();
        let mut lines = BufReader::new(read_half).lines();

        while let Ok(Some(line)) = lines.next_line().await {
            let request: Value = serde_json::from_str(&line).unwrap();
            let request_id = request["request_id"].as_u64().unwrap();

            if let Some(paused) = emit_pause {
                let event = json!({
                    "event": "property-change",
                    "id": 1,
                    "name": "pause",
                    "data": paused,
                });
                let _ = write_half
                    .write_all(format!("{}\n", event).as_bytes())
                    .await;
            }

            let response = json!({
                "error": "success",
                "data": data,
                "request_id": request_id,
            });
            let _ = write_half
                .write_all(format!("{}\n", response).as_bytes())
                .await;
        }
    }

    #[tokio::test]
    async fn test_poll_returns_position() {
        let (client, server) = UnixStream::pair().unwrap();
        tokio::spawn(run_fake_mpv(server, json!(12.5), None));

        let mut clock = MpvClock::from_stream(client);
        assert_eq!(clock.poll().await, Some(12.5));
    }

    #[tokio::test]
    async fn test_events_captured_while_waiting() {
        let (client, server) = UnixStream::pair().unwrap();
        tokio::spawn(run_fake_mpv(server, json!(3.0), Some(false)));

        let mut clock = MpvClock::from_stream(client);
        assert_eq!(clock.poll().await, Some(3.0));
        // pause=false means the player is playing.
        assert_eq!(clock.take_play_state().await, Some(true));
        // The notification is drained on read.
        assert_eq!(clock.take_play_state().await, None);
    }

    #[tokio::test]
    async fn test_silent_player_times_out_to_none() {
        let (client, _server) = UnixStream::pair().unwrap();

        let mut clock = MpvClock::from_stream(client);
        assert_eq!(clock.poll().await, None);
    }

    #[tokio::test]
    async fn test_closed_socket_is_not_fatal() {
        let (client, server) = UnixStream::pair().unwrap();
        drop(server);

        let mut clock = MpvClock::from_stream(client);
        assert_eq!(clock.poll().await, None);
        clock.seek_to(5.0).await;
    }
}
