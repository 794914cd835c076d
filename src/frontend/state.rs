//! Shared state types for the frontend
//!
//! Panels borrow [`UiState`] and return [`AppAction`]s instead of talking to
//! the backend directly. Backend messages are folded into the state by
//! [`UiState::apply_message`], which keeps the UI logic testable without a
//! window.

use crate::backend::BackendMessage;
use crate::config::AppConfig;
use crate::types::{ConnectionStatus, DeviceDescriptor, SessionConfig};

/// Actions that any panel can emit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    /// Re-enumerate devices
    RefreshDevices,
    /// Open the selected device
    Open,
    /// Close the open device
    Close,
    /// Decode the pending input and send it
    Send,
    /// Empty the response log
    ClearLog,
}

/// Everything the panels render from
#[derive(Debug, Clone, Default)]
pub struct UiState {
    /// Latest device list
    pub devices: Vec<DeviceDescriptor>,
    /// Path of the device picked in the combo box
    pub selected_device: Option<String>,
    pub status: ConnectionStatus,
    /// A scan was requested and its answer has not arrived
    pub scan_in_flight: bool,
    /// Frame size for the next open
    pub frame_size: usize,
    /// Hex text being typed
    pub pending_input: String,
    /// Inline error under the send area
    pub send_error: Option<String>,
    /// Open/close failure shown in a window
    pub error_window: Option<String>,
    /// Last status bar message
    pub last_error: Option<String>,
    pub show_timestamp: bool,
    /// Frames written this session
    pub frames_sent: usize,
}

impl UiState {
    /// Initial state from the persisted config
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            selected_device: config.session.last_device_path.clone(),
            frame_size: config.session.frame_size,
            show_timestamp: config.log.show_timestamp,
            ..Self::default()
        }
    }

    pub fn is_connected(&self) -> bool {
        self.status == ConnectionStatus::Connected
    }

    /// Send is only offered while a session is open
    pub fn can_send(&self) -> bool {
        self.is_connected()
    }

    /// Whether a new scan may be requested (single-flight, never while open)
    pub fn can_scan(&self) -> bool {
        !self.scan_in_flight
            && matches!(
                self.status,
                ConnectionStatus::Disconnected | ConnectionStatus::Error
            )
    }

    /// Mark a scan as requested. Returns `false` if one is already running.
    pub fn begin_scan(&mut self) -> bool {
        if !self.can_scan() {
            return false;
        }
        self.scan_in_flight = true;
        true
    }

    /// Session config for the current selection
    pub fn session_config(&self) -> Option<SessionConfig> {
        self.selected_device
            .as_ref()
            .map(|path| SessionConfig::new(path.clone(), self.frame_size))
    }

    /// Fold one backend message into the state.
    ///
    /// Returns `true` if anything visible changed.
    pub fn apply_message(&mut self, msg: BackendMessage) -> bool {
        match msg {
            BackendMessage::DeviceList(devices) => {
                self.scan_in_flight = false;
                self.devices = devices;
                let still_listed = self
                    .selected_device
                    .as_ref()
                    .is_some_and(|path| self.devices.iter().any(|d| &d.path == path));
                if !still_listed {
                    self.selected_device = self.devices.first().map(|d| d.path.clone());
                }
            }
            BackendMessage::ScanError(error) => {
                self.scan_in_flight = false;
                self.devices.clear();
                self.selected_device = None;
                self.last_error = Some(error);
            }
            BackendMessage::SessionStatus(status) => {
                if status == ConnectionStatus::Connected && !self.is_connected() {
                    self.frames_sent = 0;
                }
                self.status = status;
                if status == ConnectionStatus::Connected {
                    self.error_window = None;
                    self.last_error = None;
                }
            }
            BackendMessage::ConnectError(error) | BackendMessage::DisconnectError(error) => {
                self.last_error = Some(error.clone());
                self.error_window = Some(error);
            }
            BackendMessage::WriteComplete { .. } => {
                self.frames_sent += 1;
                self.send_error = None;
                self.pending_input.clear();
            }
            // Input is kept so the user can retry
            BackendMessage::WriteError(error) => {
                self.send_error = Some(error);
            }
            BackendMessage::Shutdown => {
                self.status = ConnectionStatus::Disconnected;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(path: &str) -> DeviceDescriptor {
        DeviceDescriptor::new(0x1234, 0x5678, path)
    }

    #[test]
    fn test_scan_is_single_flight() {
        let mut state = UiState::default();
        assert!(state.begin_scan());
        assert!(!state.begin_scan());

        state.apply_message(BackendMessage::DeviceList(vec![device("a")]));
        assert!(state.begin_scan());
    }

    #[test]
    fn test_no_scan_while_connected() {
        let mut state = UiState::default();
        state.apply_message(BackendMessage::SessionStatus(ConnectionStatus::Connected));
        assert!(!state.can_scan());
        assert!(!state.begin_scan());
    }

    #[test]
    fn test_device_list_keeps_valid_selection() {
        let mut state = UiState {
            selected_device: Some("b".into()),
            ..UiState::default()
        };
        state.apply_message(BackendMessage::DeviceList(vec![device("a"), device("b")]));
        assert_eq!(state.selected_device.as_deref(), Some("b"));

        state.apply_message(BackendMessage::DeviceList(vec![device("c")]));
        assert_eq!(state.selected_device.as_deref(), Some("c"));
    }

    #[test]
    fn test_scan_error_empties_list() {
        let mut state = UiState::default();
        state.apply_message(BackendMessage::DeviceList(vec![device("a")]));
        state.begin_scan();
        state.apply_message(BackendMessage::ScanError("HID error: boom".into()));

        assert!(state.devices.is_empty());
        assert!(state.selected_device.is_none());
        assert!(!state.scan_in_flight);
    }

    #[test]
    fn test_connect_error_opens_window() {
        let mut state = UiState::default();
        state.apply_message(BackendMessage::ConnectError(
            "Failed to open device: busy".into(),
        ));
        assert_eq!(
            state.error_window.as_deref(),
            Some("Failed to open device: busy")
        );

        state.apply_message(BackendMessage::SessionStatus(ConnectionStatus::Connected));
        assert!(state.error_window.is_none());
    }

    #[test]
    fn test_write_results() {
        let mut state = UiState::default();
        state.apply_message(BackendMessage::WriteError("Please connect device first".into()));
        assert!(state.send_error.is_some());

        state.apply_message(BackendMessage::WriteComplete { bytes: 2 });
        assert!(state.send_error.is_none());
        assert_eq!(state.frames_sent, 1);
    }

    #[test]
    fn test_successful_send_clears_input() {
        let mut state = UiState {
            pending_input: "0102".into(),
            ..UiState::default()
        };

        state.apply_message(BackendMessage::WriteError("Failed to send data".into()));
        assert_eq!(state.pending_input, "0102");
        assert_eq!(state.frames_sent, 0);

        state.apply_message(BackendMessage::WriteComplete { bytes: 2 });
        assert!(state.pending_input.is_empty());
        assert!(state.send_error.is_none());
    }

    #[test]
    fn test_send_only_while_connected() {
        let mut state = UiState::default();
        assert!(!state.can_send());

        state.status = ConnectionStatus::Connecting;
        assert!(!state.can_send());

        state.apply_message(BackendMessage::SessionStatus(ConnectionStatus::Connected));
        assert!(state.can_send());

        state.apply_message(BackendMessage::SessionStatus(ConnectionStatus::Disconnected));
        assert!(!state.can_send());
    }

    #[test]
    fn test_session_config_from_selection() {
        let mut config = AppConfig::default();
        config.session.last_device_path = Some("/dev/hidraw1".into());
        config.session.frame_size = 32;

        let state = UiState::from_config(&config);
        assert_eq!(
            state.session_config(),
            Some(SessionConfig::new("/dev/hidraw1", 32))
        );
        assert_eq!(UiState::default().session_config(), None);
    }
}
