//! Session Handler
//!
//! Owns one client connection for its whole lifetime: reads request frames,
//! applies them to the store and writes back exactly one response each.

use std::io::{self, BufReader};
use std::net::{Shutdown, TcpStream};
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::error::{DecodeError, KeyrackError, Result};
use crate::protocol::{decode_request, read_frame, write_response, Request, Response};
use crate::store::Store;

/// Connection state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Open,
    Closed,
}

/// Handles a single client connection
pub struct Session {
    /// Identifier assigned by the listener
    id: u64,

    /// The connection, buffered for reads
    ///
    /// Responses go out through `get_ref()` as single framed writes, so the
    /// session holds one descriptor.
    reader: BufReader<TcpStream>,

    /// Shared store
    store: Arc<Store>,

    /// Peer address for logging
    peer_addr: String,

    /// Largest frame accepted from this peer
    max_frame_size: usize,

    state: SessionState,
}

impl Session {
    /// Create a new session for an accepted connection
    ///
    /// Sets up buffered I/O and applies the configured timeouts
    pub fn new(id: u64, stream: TcpStream, store: Arc<Store>, config: &Config) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true)?;

        let mut session = Self {
            id,
            reader: BufReader::new(stream),
            store,
            peer_addr,
            max_frame_size: config.max_frame_size,
            state: SessionState::Open,
        };
        session.set_timeouts(config.idle_timeout_ms, config.write_timeout_ms)?;
        Ok(session)
    }

    /// Configure connection timeouts
    pub fn set_timeouts(&mut self, idle_ms: u64, write_ms: u64) -> Result<()> {
        let stream = self.reader.get_ref();

        stream.set_read_timeout((idle_ms > 0).then(|| Duration::from_millis(idle_ms)))?;
        stream.set_write_timeout((write_ms > 0).then(|| Duration::from_millis(write_ms)))?;

        Ok(())
    }

    /// Run the receive loop until the connection closes
    ///
    /// A clean disconnect returns `Ok(())`. Errors are connection-level
    /// failures; bad packets never end the session.
    pub fn run(&mut self) -> Result<()> {
        let span = tracing::info_span!("session", session_id = self.id, peer = %self.peer_addr);
        let _enter = span.enter();

        tracing::info!("Session {} started", self.id);
        let result = self.serve();
        self.close();
        tracing::info!("Session {} ended", self.id);

        result
    }

    fn serve(&mut self) -> Result<()> {
        loop {
            // Awaiting packet
            let packet = match read_frame(&mut self.reader, self.max_frame_size) {
                Ok(Some(packet)) => packet,
                Ok(None) => {
                    tracing::debug!("Client {} disconnected", self.peer_addr);
                    return Ok(());
                }
                Err(KeyrackError::Io(ref e)) if is_disconnect(e.kind()) => {
                    tracing::debug!("Connection to {} dropped: {}", self.peer_addr, e);
                    return Ok(());
                }
                Err(KeyrackError::Io(ref e))
                    if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) =>
                {
                    tracing::debug!("Idle timeout for client {}", self.peer_addr);
                    return Ok(());
                }
                Err(e @ KeyrackError::FrameTooLarge { .. }) => {
                    // The rest of the stream can no longer be framed
                    tracing::warn!("Rejecting frame from {}: {}", self.peer_addr, e);
                    let _ = self.send_response(&Response::error());
                    return Err(e);
                }
                Err(e) => {
                    tracing::warn!("Error reading from {}: {}", self.peer_addr, e);
                    return Err(e);
                }
            };

            let response = respond(&self.store, &packet);

            if let Err(e) = self.send_response(&response) {
                if let KeyrackError::Io(ref io_err) = e {
                    if is_disconnect(io_err.kind()) {
                        tracing::debug!(
                            "Client {} disconnected before response could be sent: {}",
                            self.peer_addr,
                            e
                        );
                        return Ok(());
                    }
                }
                tracing::warn!("Error writing to {}: {}", self.peer_addr, e);
                return Err(e);
            }
        }
    }

    /// Send a response to the client
    fn send_response(&mut self, response: &Response) -> Result<()> {
        tracing::debug!("> {:?}", response);
        let mut stream = self.reader.get_ref();
        write_response(&mut stream, response)
    }

    fn close(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }
        self.state = SessionState::Closed;
        let _ = self.reader.get_ref().shutdown(Shutdown::Both);
    }

    /// Get the session identifier
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}

fn is_disconnect(kind: io::ErrorKind) -> bool {
    matches!(
        kind,
        io::ErrorKind::UnexpectedEof
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::BrokenPipe
    )
}

/// Turn one inbound packet into the response owed for it
///
/// Packets that fail to decode are answered with an error response.
pub fn respond(store: &Store, packet: &[u8]) -> Response {
    match decode_request(packet) {
        Ok(request) => {
            tracing::debug!("< {:?}", request);
            dispatch(store, request)
        }
        Err(DecodeError::UnknownAction(action)) => {
            tracing::warn!("Unrecognized action {:?}", action);
            Response::error()
        }
        Err(e) => {
            tracing::warn!("Malformed packet ({} bytes): {}", packet.len(), e);
            Response::error()
        }
    }
}

/// Apply a validated request to the store
pub fn dispatch(store: &Store, request: Request) -> Response {
    match request {
        Request::Get { key } => match store.get(&key) {
            Some(value) => Response::ok(Some(value)),
            None => Response::not_found(),
        },
        Request::Set { key, value } => {
            store.set(key, value);
            Response::ok(None)
        }
        Request::Delete { key } => {
            if store.delete(&key) {
                Response::ok(None)
            } else {
                Response::not_found()
            }
        }
    }
}
