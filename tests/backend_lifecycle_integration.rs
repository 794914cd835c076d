//! Integration tests for backend lifecycle
//!
//! These tests drive the backend thread over the simulated device:
//! - Device scans and filtering
//! - Open, write, receive, close
//! - Error reporting and shutdown

mod common;

use common::builders::{keyboard, placeholder_device, simulated_session, vendor_device};
use common::RunningBackend;
use hid_console::backend::{BackendMessage, DeviceFilter, SimulatedTransport};
use hid_console::codec;
use hid_console::config::AppConfig;
use hid_console::types::{ConnectionStatus, SessionConfig};

fn is_status(status: ConnectionStatus) -> impl Fn(&BackendMessage) -> bool {
    move |msg| *msg == BackendMessage::SessionStatus(status)
}

fn is_device_list(msg: &BackendMessage) -> bool {
    matches!(msg, BackendMessage::DeviceList(_))
}

/// Scan, then open the default simulated device
fn open_default(backend: &RunningBackend, frame_size: usize) {
    backend.frontend.refresh_devices();
    backend.wait_for(is_device_list);
    backend.frontend.open(simulated_session(frame_size));
    backend.wait_for(is_status(ConnectionStatus::Connected));
}

#[test]
fn test_backend_creation_and_shutdown() {
    let backend = RunningBackend::spawn(SimulatedTransport::new());
    let messages = backend.shutdown();
    assert_eq!(messages.last(), Some(&BackendMessage::Shutdown));
}

#[test]
fn test_scan_filters_devices() {
    let backend = RunningBackend::spawn(SimulatedTransport::new());
    backend.device.set_devices(vec![
        placeholder_device("zero"),
        vendor_device("vendor"),
        keyboard("kbd"),
    ]);

    backend.frontend.refresh_devices();
    let messages = backend.wait_for(is_device_list);
    match messages.last() {
        Some(BackendMessage::DeviceList(devices)) => {
            let paths: Vec<_> = devices.iter().map(|d| d.path.as_str()).collect();
            assert_eq!(paths, vec!["vendor"]);
        }
        other => panic!("unexpected {:?}", other),
    }

    backend.frontend.set_device_filter(DeviceFilter {
        filter_zero_ids: false,
        hide_system_input: false,
    });
    backend.frontend.refresh_devices();
    let messages = backend.wait_for(is_device_list);
    assert!(matches!(messages.last(), Some(BackendMessage::DeviceList(d)) if d.len() == 3));
}

#[test]
fn test_filter_from_config() {
    let mut config = AppConfig::default();
    config.devices.filter_zero_ids = false;
    let backend = RunningBackend::spawn_with_config(SimulatedTransport::new(), &config);
    backend
        .device
        .set_devices(vec![placeholder_device("zero"), vendor_device("vendor")]);

    backend.frontend.refresh_devices();
    let messages = backend.wait_for(is_device_list);
    assert!(matches!(messages.last(), Some(BackendMessage::DeviceList(d)) if d.len() == 2));
}

#[test]
fn test_scan_failure_reported() {
    let backend = RunningBackend::spawn(SimulatedTransport::new());
    backend.device.fail_enumeration(Some("hid_init failed"));

    backend.frontend.refresh_devices();
    let messages = backend.wait_for(|m| matches!(m, BackendMessage::ScanError(_)));
    assert!(!messages.iter().any(is_device_list));
}

#[test]
fn test_open_receive_and_close() {
    let backend = RunningBackend::spawn(SimulatedTransport::new());
    open_default(&backend, 65);
    assert_eq!(backend.device.frame_size(), Some(65));

    assert!(backend.device.push_frame(vec![0x01, 0x02]));
    backend.wait_for_log_len(1);
    {
        let log = backend.frontend.log.read();
        assert_eq!(log.get(0).map(|e| e.format(false)), Some("01 02".to_string()));
    }

    backend.frontend.close();
    backend.wait_for(is_status(ConnectionStatus::Disconnected));
    assert!(!backend.device.is_open());
    assert!(!backend.device.push_frame(vec![0x03]));
}

#[test]
fn test_frames_logged_in_order() {
    let backend = RunningBackend::spawn(SimulatedTransport::new());
    open_default(&backend, 8);

    for byte in 0..50u8 {
        assert!(backend.device.push_frame(vec![byte]));
    }
    backend.wait_for_log_len(50);

    let log = backend.frontend.log.read();
    assert!(log.entries().enumerate().all(|(i, e)| e.payload == vec![i as u8]));
    let stamps: Vec<_> = log.entries().map(|e| e.received_at).collect();
    assert!(stamps.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn test_echo_round_trip() {
    let backend = RunningBackend::spawn(SimulatedTransport::echoing());
    open_default(&backend, 4);

    let payload = codec::decode("0xAB CD").unwrap();
    backend.frontend.write(payload);
    backend.wait_for(|m| *m == BackendMessage::WriteComplete { bytes: 2 });
    backend.wait_for_log_len(1);

    let log = backend.frontend.log.read();
    assert_eq!(log.get(0).map(|e| e.format(false)), Some("AB CD 00 00".to_string()));
    assert_eq!(backend.device.written(), vec![vec![0xAB, 0xCD]]);
}

#[test]
fn test_reopen_clears_log() {
    let backend = RunningBackend::spawn(SimulatedTransport::new());
    open_default(&backend, 65);
    backend.device.push_frame(vec![0xAA]);
    backend.wait_for_log_len(1);

    backend.frontend.close();
    backend.wait_for(is_status(ConnectionStatus::Disconnected));
    assert_eq!(backend.frontend.log.read().len(), 1);

    backend.frontend.open(simulated_session(65));
    backend.wait_for(is_status(ConnectionStatus::Connected));
    assert!(backend.frontend.log.read().is_empty());
}

#[test]
fn test_write_while_closed_rejected() {
    let backend = RunningBackend::spawn(SimulatedTransport::new());
    backend.frontend.write(vec![0x01]);

    let messages = backend.wait_for(|m| matches!(m, BackendMessage::WriteError(_)));
    assert_eq!(
        messages.last(),
        Some(&BackendMessage::WriteError("Please connect device first".to_string()))
    );
    assert_eq!(backend.device.calls().write, 0);
}

#[test]
fn test_invalid_open_never_reaches_device() {
    let backend = RunningBackend::spawn(SimulatedTransport::new());
    backend.frontend.refresh_devices();
    backend.wait_for(is_device_list);

    backend.frontend.open(simulated_session(0));
    backend.wait_for(|m| matches!(m, BackendMessage::ConnectError(_)));
    backend.frontend.open(simulated_session(1025));
    backend.wait_for(|m| matches!(m, BackendMessage::ConnectError(_)));
    backend.frontend.open(SessionConfig::new("/dev/not-scanned", 65));
    backend.wait_for(|m| matches!(m, BackendMessage::ConnectError(_)));

    assert_eq!(backend.device.calls().open, 0);
}

#[test]
fn test_connect_failure_reported() {
    let backend = RunningBackend::spawn(SimulatedTransport::new());
    backend.device.fail_open(Some("Permission denied"));
    backend.frontend.refresh_devices();
    backend.wait_for(is_device_list);

    backend.frontend.open(simulated_session(65));
    let messages = backend.wait_for(|m| matches!(m, BackendMessage::ConnectError(_)));
    assert!(messages.contains(&BackendMessage::SessionStatus(ConnectionStatus::Error)));
    assert!(!backend.device.is_open());
}

#[test]
fn test_send_failure_keeps_session() {
    let backend = RunningBackend::spawn(SimulatedTransport::new());
    open_default(&backend, 65);
    backend.device.fail_write(Some("broken pipe"));

    backend.frontend.write(vec![0x01]);
    backend.wait_for(|m| matches!(m, BackendMessage::WriteError(e) if e.contains("broken pipe")));
    assert!(backend.device.is_open());

    backend.device.fail_write(None);
    backend.frontend.write(vec![0x02]);
    backend.wait_for(|m| matches!(m, BackendMessage::WriteComplete { .. }));
}

#[test]
fn test_clear_log() {
    let backend = RunningBackend::spawn(SimulatedTransport::new());
    open_default(&backend, 65);
    backend.device.push_frame(vec![1]);
    backend.device.push_frame(vec![2]);
    backend.wait_for_log_len(2);

    backend.frontend.clear_log();
    backend.frontend.write(vec![0]);
    backend.wait_for(|m| matches!(m, BackendMessage::WriteComplete { .. }));
    assert!(backend.frontend.log.read().is_empty());
}

#[test]
fn test_log_cap_evicts_oldest() {
    let mut config = AppConfig::default();
    config.log.max_entries = Some(3);
    let backend = RunningBackend::spawn_with_config(SimulatedTransport::new(), &config);
    open_default(&backend, 8);

    for byte in 0..5u8 {
        backend.device.push_frame(vec![byte]);
    }
    backend.wait_for_log(|log| log.last().is_some_and(|e| e.payload == vec![4]));

    let log = backend.frontend.log.read();
    let payloads: Vec<_> = log.entries().map(|e| e.payload[0]).collect();
    assert_eq!(payloads, vec![2, 3, 4]);
}

#[test]
fn test_shutdown_closes_open_session() {
    let backend = RunningBackend::spawn(SimulatedTransport::new());
    open_default(&backend, 65);
    let device = backend.device.clone();

    let messages = backend.shutdown();
    assert_eq!(messages.last(), Some(&BackendMessage::Shutdown));
    assert!(!device.is_open());
    assert_eq!(device.calls().close, 1);
}
