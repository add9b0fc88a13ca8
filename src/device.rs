//! Device session - selection of the single MIDI output the panel drives
//!
//! Enumeration and byte delivery live behind [`OutputBackend`] and
//! [`OutputConnection`]; the session only tracks which port is selected and
//! forwards messages to it. Sends are fire-and-forget: with no device selected
//! they are silently dropped, and delivery failures are logged, never retried.

pub mod midir_backend;
#[cfg(test)]
pub(crate) mod mock;

pub use midir_backend::MidirBackend;

use crate::midi::{format_hex, MidiMessage};
use tracing::{debug, info, trace, warn};

/// Product identifier preferred when auto-selecting an output
pub const DEFAULT_PRODUCT_MATCH: &str = "FLOW 8";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeviceError {
    #[error("Failed to initialize MIDI output: {0}")]
    Init(String),

    #[error("No MIDI output port found matching: {0}")]
    PortNotFound(String),

    #[error("Failed to connect to MIDI port: {0}")]
    Connect(String),

    #[error("Failed to send MIDI message: {0}")]
    Send(String),
}

/// An open output port
pub trait OutputConnection: Send {
    fn send(&mut self, bytes: &[u8]) -> Result<(), DeviceError>;
}

/// Enumerates and opens output ports
pub trait OutputBackend: Send {
    fn port_names(&self) -> Result<Vec<String>, DeviceError>;

    /// Open the first port whose name contains `pattern` (case-insensitive).
    /// Returns the connection and the full port name.
    fn connect(&self, pattern: &str) -> Result<(Box<dyn OutputConnection>, String), DeviceError>;
}

/// Case-insensitive substring match, shared by the backends
pub fn find_port<'a>(ports: &'a [String], pattern: &str) -> Option<&'a String> {
    let pattern = pattern.to_lowercase();
    ports
        .iter()
        .find(|name| name.to_lowercase() == pattern)
        .or_else(|| ports.iter().find(|name| name.to_lowercase().contains(&pattern)))
}

struct ActiveOutput {
    name: String,
    conn: Box<dyn OutputConnection>,
}

pub struct DeviceSession {
    backend: Box<dyn OutputBackend>,
    product_match: String,
    ports: Vec<String>,
    active: Option<ActiveOutput>,
    sent_count: u64,
}

impl DeviceSession {
    pub fn new(backend: Box<dyn OutputBackend>, product_match: impl Into<String>) -> Self {
        Self {
            backend,
            product_match: product_match.into(),
            ports: Vec::new(),
            active: None,
            sent_count: 0,
        }
    }

    /// Port names seen by the last [`refresh`](Self::refresh)
    pub fn ports(&self) -> &[String] {
        &self.ports
    }

    pub fn is_connected(&self) -> bool {
        self.active.is_some()
    }

    pub fn current_name(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.name.as_str())
    }

    /// Messages handed to an output since the session was created
    pub fn sent_count(&self) -> u64 {
        self.sent_count
    }

    /// Pick the port to use when none was chosen explicitly: the first one
    /// naming the product, else the first one.
    pub fn auto_choice<'a>(ports: &'a [String], product_match: &str) -> Option<&'a String> {
        let needle = product_match.to_lowercase();
        ports
            .iter()
            .find(|name| name.to_lowercase().contains(&needle))
            .or_else(|| ports.first())
    }

    /// Re-enumerate outputs. When nothing is selected yet, auto-selects one.
    pub fn refresh(&mut self) -> Result<&[String], DeviceError> {
        self.ports = self.backend.port_names()?;
        debug!("Found {} MIDI output ports", self.ports.len());

        if self.active.is_none() {
            if let Some(choice) = Self::auto_choice(&self.ports, &self.product_match).cloned() {
                info!("Auto-selecting MIDI output: {}", choice);
                if let Err(e) = self.select(&choice) {
                    warn!("Auto-selection failed: {}", e);
                }
            }
        }
        Ok(&self.ports)
    }

    /// Swap the target output. On failure the session ends up with no output.
    pub fn select(&mut self, pattern: &str) -> Result<&str, DeviceError> {
        self.active = None;
        let (conn, name) = self.backend.connect(pattern)?;
        info!("Connected to output port: {}", name);
        Ok(&self.active.insert(ActiveOutput { name, conn }).name)
    }

    /// Deliver a message to the current output, if any. Returns whether the
    /// message was handed to an output.
    pub fn send(&mut self, message: &MidiMessage) -> bool {
        let Some(active) = self.active.as_mut() else {
            trace!("No output selected, dropping {}", message);
            return false;
        };
        let data = message.encode();
        if let Err(e) = active.conn.send(&data) {
            warn!("{} ({})", e, active.name);
            return false;
        }
        self.sent_count += 1;
        debug!("Sent: {} | {}", format_hex(&data), message);
        true
    }
}
