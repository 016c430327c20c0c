//! Module `session`
//!
//! Defines the `Session` struct holding per-client FTP state relevant to
//! file transfers: the peer address, the current virtual directory, the
//! most recently negotiated passive data channel, and a string-keyed
//! scratch map that carries the rename source between RNFR and RNTO.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::transfer::DataChannel;

/// Represents the state of a connected FTP client.
///
/// Each session owns its own independent instance; commands for one
/// session are processed one at a time, so no locking is needed here.
pub struct Session {
    client_addr: Option<SocketAddr>,
    current_virtual_path: String,
    data_channel: Option<Arc<DataChannel>>,
    user_info: HashMap<String, String>,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            client_addr: None,
            current_virtual_path: "/".to_string(),
            data_channel: None,
            user_info: HashMap::new(),
        }
    }
}

impl Session {
    /// Returns the client's socket address if known.
    pub fn client_addr(&self) -> Option<&SocketAddr> {
        self.client_addr.as_ref()
    }

    /// Sets the client's socket address.
    pub fn set_client_addr(&mut self, addr: Option<SocketAddr>) {
        self.client_addr = addr;
    }

    /// Returns the current virtual path of the client.
    pub fn current_virtual_path(&self) -> &str {
        &self.current_virtual_path
    }

    /// Sets the current virtual path of the client.
    pub fn set_current_virtual_path(&mut self, path: String) {
        self.current_virtual_path = path;
    }

    /// Installs the most recently negotiated passive data channel.
    ///
    /// A channel that was negotiated earlier but never consumed is closed
    /// when it is replaced.
    pub fn set_data_channel(&mut self, channel: Arc<DataChannel>) {
        if let Some(previous) = self.data_channel.replace(channel) {
            previous.close();
        }
    }

    /// Takes the negotiated passive data channel, leaving none behind.
    /// Each channel is consumed by at most one transfer command.
    pub fn take_data_channel(&mut self) -> Option<Arc<DataChannel>> {
        self.data_channel.take()
    }

    /// Returns the session's scratch map.
    pub fn user_info(&self) -> &HashMap<String, String> {
        &self.user_info
    }

    /// Returns the session's scratch map for modification.
    pub fn user_info_mut(&mut self) -> &mut HashMap<String, String> {
        &mut self.user_info
    }

    /// Resolves a command parameter to an absolute virtual path.
    ///
    /// Absolute parameters pass through unchanged; relative ones are
    /// joined onto the current virtual directory.
    pub fn resolve_path(&self, param: &str) -> String {
        if param.starts_with('/') {
            param.to_string()
        } else if self.current_virtual_path == "/" {
            format!("/{}", param)
        } else {
            format!("{}/{}", self.current_virtual_path, param)
        }
    }
}
