//! E2E tests for gateway startup and shutdown:
//! mapping files → lifecycle → initial status requests → stop.

use std::sync::Arc;

use cbm_canbus::{BusTransport, MockTransport};
use cbm_gateway::config::{GatewayConfig, Timing};
use cbm_gateway::{Gateway, GatewayError, MapDirection};
use cbm_protocol::{EventFrame, Opcode};

fn fast_timing() -> Timing {
    Timing {
        refresh_timeout_ticks: 10,
        stagger_ticks: 1,
        startup_pacing_ms: 0,
        tick_interval_ms: 1,
    }
}

fn config_in(dir: &std::path::Path) -> GatewayConfig {
    GatewayConfig {
        can_interface: "vcan0".to_string(),
        input_map: dir.join("inputs.dat").to_string_lossy().into_owned(),
        output_map: dir.join("outputs.dat").to_string_lossy().into_owned(),
        input_count: 8,
        output_count: 8,
        modbus_bind: "127.0.0.1:1502".to_string(),
        can_base_id: 0x2FF,
        major_priority: 0,
        minor_priority: 0,
        timing: fast_timing(),
    }
}

fn temp_dir(tag: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("cbm-e2e-{tag}-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// Mapping files on disk → loaded tables → Ready → events flow.
#[tokio::test]
async fn startup_from_files_to_first_event() {
    let dir = temp_dir("lifecycle");
    std::fs::write(dir.join("inputs.dat"), "# inputs\n3 100 200\n").unwrap();
    std::fs::write(dir.join("outputs.dat"), "5 300 400\n").unwrap();

    let gateway = Gateway::from_config(&config_in(&dir)).unwrap();
    assert!(!gateway.is_ready());

    let mock = Arc::new(MockTransport::new());
    gateway.start(Arc::clone(&mock) as Arc<dyn BusTransport>).await;
    assert!(gateway.is_ready());

    // Exactly one AREQ for the bound input, no output announcements
    let startup = mock.take_sent();
    assert_eq!(startup.len(), 1);
    assert_eq!(
        EventFrame::decode(&startup[0].data).unwrap(),
        EventFrame::status_request(100, 200)
    );

    // Concrete scenario: ACON(100, 200) lands in acquire() index 3
    mock.queue_inbound(cbm_canbus::RawFrame::new(
        0x2FF,
        EventFrame::new(Opcode::AccessoryOn, 100, 200).encode().to_vec(),
    ));
    gateway.tick().await;
    let inputs = gateway.acquire();
    assert!(inputs[3]);
    assert_eq!(inputs.iter().filter(|v| **v).count(), 1);
}

/// A missing input mapping aborts construction with the input-specific
/// error; no transport has been opened at that point by design.
#[tokio::test]
async fn missing_input_mapping_is_fatal() {
    let dir = temp_dir("missing-input");
    std::fs::write(dir.join("outputs.dat"), "0 1 1\n").unwrap();

    let err = Gateway::from_config(&config_in(&dir)).unwrap_err();
    assert!(matches!(
        err,
        GatewayError::MappingFileMissing {
            direction: MapDirection::Input,
            ..
        }
    ));
}

#[tokio::test]
async fn missing_output_mapping_is_fatal() {
    let dir = temp_dir("missing-output");
    std::fs::write(dir.join("inputs.dat"), "0 1 1\n").unwrap();

    let err = Gateway::from_config(&config_in(&dir)).unwrap_err();
    assert!(matches!(
        err,
        GatewayError::MappingFileMissing {
            direction: MapDirection::Output,
            ..
        }
    ));
}

/// Stop closes the transport and turns ticks into no-ops; a later start
/// reuses the retained slot tables.
#[tokio::test]
async fn stop_then_restart_retains_bindings() {
    let dir = temp_dir("restart");
    std::fs::write(dir.join("inputs.dat"), "1 50 60\n").unwrap();
    std::fs::write(dir.join("outputs.dat"), "").unwrap();

    let gateway = Gateway::from_config(&config_in(&dir)).unwrap();

    let first = Arc::new(MockTransport::new());
    gateway.start(Arc::clone(&first) as Arc<dyn BusTransport>).await;
    gateway.stop();
    assert!(first.is_closed());
    assert!(!gateway.is_ready());

    // Restart on a fresh transport: the binding still produces an AREQ
    let second = Arc::new(MockTransport::new());
    gateway.start(Arc::clone(&second) as Arc<dyn BusTransport>).await;
    let startup = second.take_sent();
    assert_eq!(startup.len(), 1);
    assert_eq!(
        EventFrame::decode(&startup[0].data).unwrap(),
        EventFrame::status_request(50, 60)
    );
}
