//! midir-backed output ports

use super::{find_port, DeviceError, OutputBackend, OutputConnection};
use midir::{MidiOutput, MidiOutputConnection};
use tracing::debug;

pub struct MidirBackend {
    client_name: String,
}

impl MidirBackend {
    pub fn new(client_name: impl Into<String>) -> Self {
        Self {
            client_name: client_name.into(),
        }
    }

    fn output(&self) -> Result<MidiOutput, DeviceError> {
        MidiOutput::new(&self.client_name).map_err(|e| DeviceError::Init(e.to_string()))
    }
}

impl OutputBackend for MidirBackend {
    fn port_names(&self) -> Result<Vec<String>, DeviceError> {
        let midi_out = self.output()?;
        let mut names = Vec::new();
        for port in midi_out.ports() {
            if let Ok(name) = midi_out.port_name(&port) {
                names.push(name);
            }
        }
        Ok(names)
    }

    fn connect(&self, pattern: &str) -> Result<(Box<dyn OutputConnection>, String), DeviceError> {
        let midi_out = self.output()?;
        let ports = midi_out.ports();
        let names: Vec<String> = ports
            .iter()
            .map(|p| midi_out.port_name(p).unwrap_or_default())
            .collect();

        let name = find_port(&names, pattern)
            .cloned()
            .ok_or_else(|| DeviceError::PortNotFound(pattern.to_string()))?;
        let index = names
            .iter()
            .position(|n| *n == name)
            .ok_or_else(|| DeviceError::PortNotFound(pattern.to_string()))?;
        debug!("Found port '{}' matching pattern '{}'", name, pattern);

        let conn = midi_out
            .connect(&ports[index], &self.client_name)
            .map_err(|e| DeviceError::Connect(e.to_string()))?;
        Ok((Box::new(MidirConnection { conn }), name))
    }
}

struct MidirConnection {
    conn: MidiOutputConnection,
}

impl OutputConnection for MidirConnection {
    fn send(&mut self, bytes: &[u8]) -> Result<(), DeviceError> {
        self.conn
            .send(bytes)
            .map_err(|e| DeviceError::Send(e.to_string()))
    }
}

impl Drop for MidirConnection {
    fn drop(&mut self) {
        debug!("Closing MIDI output connection");
    }
}
