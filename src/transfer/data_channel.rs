//! Module `data_channel`
//!
//! The server side of one passive-mode data connection, negotiated for
//! exactly one transfer command. The passive listener signals readiness
//! (or listen failure) from its own thread exactly once; the command
//! handler blocks on that signal with a bounded wait and closes the
//! channel when the command completes, on every exit path.

use log::{debug, warn};
use std::net::{Shutdown, TcpStream};
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

/// One negotiated passive listener/connection pair.
///
/// Readiness fires at most once; the listen-failure marker is sticky; the
/// established connection is present only when readiness fired without a
/// failure.
pub struct DataChannel {
    state: Mutex<ChannelState>,
    readiness: Condvar,
}

#[derive(Default)]
struct ChannelState {
    fired: bool,
    listen_failed: bool,
    closed: bool,
    connection: Option<TcpStream>,
}

impl Default for DataChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl DataChannel {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ChannelState::default()),
            readiness: Condvar::new(),
        }
    }

    /// Called by the passive listener when it accepts the client's data
    /// connection. Only the first readiness event takes effect; a
    /// connection arriving after the channel is spent is shut down.
    pub fn mark_ready(&self, stream: TcpStream) {
        let mut state = self.state.lock().unwrap();
        if state.fired || state.closed {
            warn!("Data connection arrived on a spent channel; dropping it");
            let _ = stream.shutdown(Shutdown::Both);
            return;
        }
        state.connection = Some(stream);
        state.fired = true;
        self.readiness.notify_all();
    }

    /// Called by the passive listener when listening or accepting failed.
    /// Sets the sticky failure marker and fires readiness if it has not
    /// fired yet.
    pub fn mark_listen_failed(&self) {
        let mut state = self.state.lock().unwrap();
        state.listen_failed = true;
        if !state.fired {
            state.fired = true;
            self.readiness.notify_all();
        }
    }

    /// Blocks until readiness has fired or `timeout` elapses. Returns
    /// whether readiness fired in time.
    pub fn wait_ready(&self, timeout: Duration) -> bool {
        let state = self.state.lock().unwrap();
        let (state, _) = self
            .readiness
            .wait_timeout_while(state, timeout, |s| !s.fired)
            .unwrap();
        state.fired
    }

    /// Whether the listen-failure marker is set.
    pub fn listen_failed(&self) -> bool {
        self.state.lock().unwrap().listen_failed
    }

    /// Takes the established connection. Returns `None` if readiness has
    /// not fired, the listen failed, or the channel was already closed.
    pub fn take_connection(&self) -> Option<TcpStream> {
        let mut state = self.state.lock().unwrap();
        if state.listen_failed {
            return None;
        }
        state.connection.take()
    }

    /// Closes the channel: any unclaimed connection is shut down, and a
    /// connection arriving later is dropped on arrival. Idempotent.
    pub fn close(&self) {
        let mut state = self.state.lock().unwrap();
        state.closed = true;
        if let Some(stream) = state.connection.take() {
            let _ = stream.shutdown(Shutdown::Both);
        }
        debug!("Data channel closed");
    }
}

/// Closes the wrapped channel when dropped, so a handler's early returns
/// and error paths all release the channel exactly once.
pub struct ChannelGuard {
    channel: Arc<DataChannel>,
}

impl ChannelGuard {
    pub fn new(channel: Arc<DataChannel>) -> Self {
        Self { channel }
    }

    pub fn channel(&self) -> &DataChannel {
        &self.channel
    }
}

impl Drop for ChannelGuard {
    fn drop(&mut self) {
        self.channel.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use std::thread;

    fn stream_pair() -> (TcpStream, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let client = TcpStream::connect(listener.local_addr().unwrap()).unwrap();
        let (server, _) = listener.accept().unwrap();
        (client, server)
    }

    #[test]
    fn test_wait_ready_wakes_on_mark_ready() {
        let channel = Arc::new(DataChannel::new());
        let signaller = Arc::clone(&channel);
        let handle = thread::spawn(move || {
            let (_client, server) = stream_pair();
            thread::sleep(Duration::from_millis(50));
            signaller.mark_ready(server);
        });

        assert!(channel.wait_ready(Duration::from_secs(5)));
        assert!(!channel.listen_failed());
        assert!(channel.take_connection().is_some());
        handle.join().unwrap();
    }

    #[test]
    fn test_wait_ready_times_out() {
        let channel = DataChannel::new();
        assert!(!channel.wait_ready(Duration::from_millis(50)));
        assert!(channel.take_connection().is_none());
    }

    #[test]
    fn test_listen_failure_wakes_waiter() {
        let channel = Arc::new(DataChannel::new());
        let signaller = Arc::clone(&channel);
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            signaller.mark_listen_failed();
        });

        assert!(channel.wait_ready(Duration::from_secs(5)));
        assert!(channel.listen_failed());
        assert!(channel.take_connection().is_none());
        handle.join().unwrap();
    }

    #[test]
    fn test_failure_marker_is_sticky() {
        let channel = DataChannel::new();
        channel.mark_listen_failed();
        let (_client, server) = stream_pair();
        channel.mark_ready(server);
        assert!(channel.listen_failed());
        assert!(channel.take_connection().is_none());
    }

    #[test]
    fn test_readiness_fires_once() {
        let channel = DataChannel::new();
        let (_c1, s1) = stream_pair();
        let (_c2, s2) = stream_pair();
        channel.mark_ready(s1);
        channel.mark_ready(s2);
        assert!(channel.take_connection().is_some());
        assert!(channel.take_connection().is_none());
    }

    #[test]
    fn test_close_drops_unclaimed_connection() {
        let channel = DataChannel::new();
        let (_client, server) = stream_pair();
        channel.mark_ready(server);
        channel.close();
        assert!(channel.take_connection().is_none());
    }

    #[test]
    fn test_connection_after_close_is_dropped() {
        let channel = DataChannel::new();
        channel.close();
        let (_client, server) = stream_pair();
        channel.mark_ready(server);
        assert!(channel.take_connection().is_none());
    }

    #[test]
    fn test_guard_closes_on_drop() {
        let channel = Arc::new(DataChannel::new());
        drop(ChannelGuard::new(Arc::clone(&channel)));
        let (_client, server) = stream_pair();
        channel.mark_ready(server);
        assert!(channel.take_connection().is_none());
    }
}
