//! TCP Server
//!
//! Accepts connections and hands each one to its own session thread.

use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::config::Config;
use crate::error::{KeyrackError, Result};
use crate::store::Store;

use super::Session;

/// TCP listener for Keyrack
///
/// ## Concurrency:
/// - One OS thread per session, all sharing `store`
/// - `next_session_id`: atomic counter, starts at 0, never reused
/// - `active_sessions`: live sessions, capped by `Config::max_sessions`
pub struct Server {
    config: Arc<Config>,
    store: Arc<Store>,
    listener: TcpListener,
    local_addr: SocketAddr,
    next_session_id: AtomicU64,
    active_sessions: Arc<AtomicUsize>,
    shutdown: Arc<AtomicBool>,
}

impl Server {
    /// Bind the listening socket
    ///
    /// Failing to bind is fatal: nothing can be served without it.
    pub fn bind(config: Config, store: Arc<Store>) -> Result<Self> {
        config.validate()?;

        let listener = TcpListener::bind(&config.listen_addr).map_err(|e| {
            KeyrackError::Network(format!("failed to bind {}: {}", config.listen_addr, e))
        })?;
        let local_addr = listener.local_addr()?;

        Ok(Self {
            config: Arc::new(config),
            store,
            listener,
            local_addr,
            next_session_id: AtomicU64::new(0),
            active_sessions: Arc::new(AtomicUsize::new(0)),
            shutdown: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Start accepting connections (blocking)
    ///
    /// Returns only after `ShutdownHandle::shutdown` has been called.
    pub fn run(&self) -> Result<()> {
        tracing::info!("Keyrack listening on {}", self.local_addr);
        self.accept_loop(self.listener.incoming());
        tracing::info!("Listener on {} stopped", self.local_addr);
        Ok(())
    }

    /// Admit connections until shutdown or until `incoming` runs dry
    ///
    /// Accept failures back off before retrying. A connection the process
    /// cannot take (out of descriptors) stays queued, so retrying at once
    /// would only fail again.
    fn accept_loop<I>(&self, incoming: I)
    where
        I: IntoIterator<Item = io::Result<TcpStream>>,
    {
        let mut backoff = AcceptBackoff::default();

        for stream in incoming {
            if self.shutdown.load(Ordering::SeqCst) {
                break;
            }
            match stream {
                Ok(stream) => {
                    backoff.reset();
                    self.admit(stream);
                }
                Err(e) => thread::sleep(backoff.on_error(&e)),
            }
        }
    }

    fn admit(&self, stream: TcpStream) {
        let peer = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        let Some(slot) = SessionSlot::acquire(&self.active_sessions, self.config.max_sessions)
        else {
            tracing::warn!(
                "Session limit ({}) reached, closing connection from {}",
                self.config.max_sessions,
                peer
            );
            return;
        };

        let id = self.next_session_id.fetch_add(1, Ordering::SeqCst);
        let store = Arc::clone(&self.store);
        let config = Arc::clone(&self.config);

        tracing::debug!("Accepted {} as session {}", peer, id);

        let spawned = thread::Builder::new()
            .name(format!("session-{}", id))
            .spawn(move || {
                let _slot = slot;
                let mut session = match Session::new(id, stream, store, &config) {
                    Ok(session) => session,
                    Err(e) => {
                        tracing::warn!("Failed to set up session {}: {}", id, e);
                        return;
                    }
                };
                if let Err(e) = session.run() {
                    tracing::warn!("Session {} terminated: {}", id, e);
                }
            });

        if let Err(e) = spawned {
            tracing::error!("Failed to spawn thread for session {}: {}", id, e);
        }
    }

    /// Address the listener is actually bound to
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Shared store served by this listener
    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    /// Number of sessions currently running
    pub fn active_sessions(&self) -> usize {
        self.active_sessions.load(Ordering::SeqCst)
    }

    /// Number of identifiers handed out so far
    pub fn sessions_started(&self) -> u64 {
        self.next_session_id.load(Ordering::SeqCst)
    }

    /// Get a handle that can stop `run` from another thread
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            flag: Arc::clone(&self.shutdown),
            wake_addr: wake_addr(self.local_addr),
        }
    }
}

/// Stops a running listener
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    flag: Arc<AtomicBool>,
    wake_addr: SocketAddr,
}

impl ShutdownHandle {
    /// Signal the listener to stop accepting
    ///
    /// Sessions already running are left to finish on their own.
    pub fn shutdown(&self) {
        if self.flag.swap(true, Ordering::SeqCst) {
            return;
        }
        // Unblock the pending accept
        if let Err(e) = TcpStream::connect(self.wake_addr) {
            tracing::debug!("Wake-up connection to {} failed: {}", self.wake_addr, e);
        }
    }

    pub fn is_shutdown(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

fn wake_addr(addr: SocketAddr) -> SocketAddr {
    match addr {
        SocketAddr::V4(v4) if v4.ip().is_unspecified() => {
            SocketAddr::from((Ipv4Addr::LOCALHOST, v4.port()))
        }
        SocketAddr::V6(v6) if v6.ip().is_unspecified() => {
            SocketAddr::from((Ipv6Addr::LOCALHOST, v6.port()))
        }
        other => other,
    }
}

/// Retry pacing for a run of failed accepts
///
/// Only the first failure of a run is logged at warn; the run's length is
/// reported once accepting works again.
#[derive(Debug, Default)]
struct AcceptBackoff {
    failures: u32,
}

impl AcceptBackoff {
    const BASE_DELAY: Duration = Duration::from_millis(10);
    const EXHAUSTED_DELAY: Duration = Duration::from_millis(100);
    const MAX_DELAY: Duration = Duration::from_secs(1);

    /// Record a failure and return how long to wait before the next accept
    fn on_error(&mut self, err: &io::Error) -> Duration {
        self.failures = self.failures.saturating_add(1);

        if self.failures == 1 {
            tracing::warn!("Failed to accept connection: {}", err);
        } else {
            tracing::trace!("Accept failed again ({} in a row): {}", self.failures, err);
        }

        self.delay(err)
    }

    fn delay(&self, err: &io::Error) -> Duration {
        let base = if is_resource_exhaustion(err) {
            Self::EXHAUSTED_DELAY
        } else {
            Self::BASE_DELAY
        };
        let doublings = self.failures.saturating_sub(1).min(10);
        base.saturating_mul(1u32 << doublings).min(Self::MAX_DELAY)
    }

    fn reset(&mut self) {
        if self.failures > 1 {
            tracing::info!("Accepting again after {} failed attempts", self.failures);
        }
        self.failures = 0;
    }

    #[cfg(test)]
    fn failures(&self) -> u32 {
        self.failures
    }
}

/// Out of file descriptors (EMFILE / ENFILE), process- or system-wide
fn is_resource_exhaustion(err: &io::Error) -> bool {
    matches!(err.raw_os_error(), Some(23) | Some(24))
}

/// Reservation of one session slot, released on drop
struct SessionSlot {
    active: Arc<AtomicUsize>,
}

impl SessionSlot {
    fn acquire(active: &Arc<AtomicUsize>, max: usize) -> Option<Self> {
        let mut current = active.load(Ordering::SeqCst);
        loop {
            if current >= max {
                return None;
            }
            match active.compare_exchange(current, current + 1, Ordering::SeqCst, Ordering::SeqCst)
            {
                Ok(_) => {
                    return Some(Self {
                        active: Arc::clone(active),
                    })
                }
                Err(actual) => current = actual,
            }
        }
    }
}

impl Drop for SessionSlot {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
    }
}
