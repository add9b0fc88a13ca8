//! Recording backend for tests

use super::{find_port, DeviceError, OutputBackend, OutputConnection};
use parking_lot::Mutex;
use std::sync::Arc;

type SentLog = Arc<Mutex<Vec<(String, Vec<u8>)>>>;

/// Fake output ports. Clones share the port list and the send log.
#[derive(Clone, Default)]
pub struct MockBackend {
    ports: Arc<Mutex<Vec<String>>>,
    sent: SentLog,
    fail_enumeration: Arc<Mutex<bool>>,
}

impl MockBackend {
    pub fn with_ports(names: &[&str]) -> Self {
        let backend = Self::default();
        backend.set_ports(names);
        backend
    }

    pub fn set_ports(&self, names: &[&str]) {
        *self.ports.lock() = names.iter().map(|s| s.to_string()).collect();
    }

    pub fn fail_enumeration(&self, fail: bool) {
        *self.fail_enumeration.lock() = fail;
    }

    /// Every message sent so far, in order, regardless of port
    pub fn sent(&self) -> Vec<Vec<u8>> {
        self.sent.lock().iter().map(|(_, b)| b.clone()).collect()
    }

    pub fn sent_to(&self, port: &str) -> Vec<Vec<u8>> {
        self.sent
            .lock()
            .iter()
            .filter(|(p, _)| p == port)
            .map(|(_, b)| b.clone())
            .collect()
    }

    /// Drain the log
    pub fn take_sent(&self) -> Vec<Vec<u8>> {
        self.sent.lock().drain(..).map(|(_, b)| b).collect()
    }
}

impl OutputBackend for MockBackend {
    fn port_names(&self) -> Result<Vec<String>, DeviceError> {
        if *self.fail_enumeration.lock() {
            return Err(DeviceError::Init("enumeration disabled".to_string()));
        }
        Ok(self.ports.lock().clone())
    }

    fn connect(&self, pattern: &str) -> Result<(Box<dyn OutputConnection>, String), DeviceError> {
        let ports = self.ports.lock();
        let name = find_port(&ports, pattern)
            .cloned()
            .ok_or_else(|| DeviceError::PortNotFound(pattern.to_string()))?;
        let conn = MockConnection {
            port: name.clone(),
            sent: Arc::clone(&self.sent),
        };
        Ok((Box::new(conn), name))
    }
}

struct MockConnection {
    port: String,
    sent: SentLog,
}

impl OutputConnection for MockConnection {
    fn send(&mut self, bytes: &[u8]) -> Result<(), DeviceError> {
        self.sent.lock().push((self.port.clone(), bytes.to_vec()));
        Ok(())
    }
}
