use log::{info, warn};

use crate::error::{ConnectError, DisconnectError};
use crate::explorer::path::RemotePath;
use crate::explorer::sequencer::{RequestSequencer, RequestToken};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// Owner of the session flag.
///
/// Connect attempts are sequenced so that a reply to an attempt abandoned by
/// a disconnect cannot bring the session back.
#[derive(Debug)]
pub struct ConnectionManager {
    state: ConnectionState,
    attempts: RequestSequencer,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self {
            state: ConnectionState::Disconnected,
            attempts: RequestSequencer::new("connect"),
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    pub fn is_connecting(&self) -> bool {
        self.state == ConnectionState::Connecting
    }

    pub fn begin_connect(&mut self) -> Result<RequestToken, ConnectError> {
        match self.state {
            ConnectionState::Connecting => Err(ConnectError::AlreadyPending),
            ConnectionState::Connected => Err(ConnectError::AlreadyConnected),
            ConnectionState::Disconnected => {
                self.state = ConnectionState::Connecting;
                Ok(self.attempts.issue())
            }
        }
    }

    /// Applies the reply to a connect attempt. `None` means the attempt was
    /// superseded and the reply was dropped.
    pub fn complete_connect(
        &mut self,
        sequence_id: u64,
        result: Result<RemotePath, ConnectError>,
    ) -> Option<Result<RemotePath, ConnectError>> {
        if self.state != ConnectionState::Connecting || !self.attempts.accept(sequence_id) {
            return None;
        }
        self.state = match &result {
            Ok(path) => {
                info!("session open at {}", path);
                ConnectionState::Connected
            }
            Err(e) => {
                warn!("connect failed: {}", e);
                ConnectionState::Disconnected
            }
        };
        Some(result)
    }

    /// Adopts a session the service reports as already open.
    pub fn restore(&mut self, path: &RemotePath) -> bool {
        if self.state != ConnectionState::Disconnected {
            return false;
        }
        info!("restored existing session at {}", path);
        self.state = ConnectionState::Connected;
        true
    }

    /// Drops to disconnected immediately; the remote call that follows is
    /// best-effort. Returns whether there was anything to drop.
    pub fn begin_disconnect(&mut self) -> bool {
        let was_active = self.state != ConnectionState::Disconnected;
        self.attempts.invalidate();
        self.state = ConnectionState::Disconnected;
        was_active
    }

    pub fn complete_disconnect(&self, result: &Result<(), DisconnectError>) {
        if let Err(e) = result {
            warn!("remote disconnect failed, local session already closed: {}", e);
        }
    }

    /// The server no longer recognises the session.
    pub fn expire(&mut self) {
        if self.state != ConnectionState::Disconnected {
            warn!("remote session expired");
        }
        self.attempts.invalidate();
        self.state = ConnectionState::Disconnected;
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_connect_while_pending_is_refused() {
        let mut conn = ConnectionManager::new();
        conn.begin_connect().unwrap();
        assert_eq!(conn.begin_connect().unwrap_err(), ConnectError::AlreadyPending);
    }

    #[test]
    fn successful_connect_sets_connected() {
        let mut conn = ConnectionManager::new();
        let token = conn.begin_connect().unwrap();
        let applied = conn.complete_connect(token.sequence_id(), Ok(RemotePath::from("/home")));
        assert_eq!(applied, Some(Ok(RemotePath::from("/home"))));
        assert!(conn.is_connected());
    }

    #[test]
    fn failed_connect_stays_disconnected_with_message() {
        let mut conn = ConnectionManager::new();
        let token = conn.begin_connect().unwrap();
        let err = ConnectError::Remote("Error de autenticación".into());
        let applied = conn.complete_connect(token.sequence_id(), Err(err.clone()));
        assert_eq!(applied, Some(Err(err)));
        assert_eq!(conn.state(), ConnectionState::Disconnected);
    }

    #[test]
    fn disconnect_during_connect_discards_late_reply() {
        let mut conn = ConnectionManager::new();
        let token = conn.begin_connect().unwrap();
        assert!(conn.begin_disconnect());
        assert!(conn.complete_connect(token.sequence_id(), Ok(RemotePath::root())).is_none());
        assert!(!conn.is_connected());
    }

    #[test]
    fn disconnect_failure_still_leaves_local_state_closed() {
        let mut conn = ConnectionManager::new();
        let token = conn.begin_connect().unwrap();
        conn.complete_connect(token.sequence_id(), Ok(RemotePath::root()));
        conn.begin_disconnect();
        conn.complete_disconnect(&Err(DisconnectError("timeout".into())));
        assert!(!conn.is_connected());
    }
}
