// SessionGate - client-side authentication gate
//
// The device is the real authority on permitted operations; this gate only
// spares the operator a guaranteed-to-fail call. Transient and process-local,
// never persisted.

use crate::client::DeviceClient;
use crate::error::Result;

#[derive(Debug, Default)]
pub struct SessionGate {
    authenticated: bool,
}

impl SessionGate {
    pub fn new() -> Self {
        SessionGate {
            authenticated: false,
        }
    }

    /// Delegate to the device login. The gate opens only on success; any
    /// failure leaves it closed and comes back as a value, never a panic.
    pub fn login(&mut self, client: &DeviceClient, username: &str, password: &str) -> Result<()> {
        match client.login(username, password) {
            Ok(()) => {
                self.authenticated = true;
                Ok(())
            }
            Err(err) => {
                self.authenticated = false;
                Err(err)
            }
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }
}
