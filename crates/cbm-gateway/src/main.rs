//! cbm-gateway — CBUS accessory events to Modbus/TCP gateway.
//!
//! Wires the mapping loader, CAN transport, translation engine, and the
//! Modbus/TCP responder into a single binary.

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use cbm_canbus::BusTransport;
use cbm_gateway::config::GatewayConfig;
use cbm_gateway::engine::Gateway;
use cbm_gateway::image::IoImage;
use cbm_gateway::{driver, modbus};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "cbm-gateway starting"
    );

    // ── Load config ─────────────────────────────────────────────
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "/etc/cbus2modbus/gateway.toml".to_string());

    let config = GatewayConfig::from_file(&config_path)?;
    tracing::info!(
        can_interface = %config.can_interface,
        modbus_bind = %config.modbus_bind,
        "config loaded"
    );

    // ── Mappings first: a missing file must abort before any socket ──
    let gateway = Gateway::from_config(&config)?;

    // ── CAN transport ───────────────────────────────────────────
    let transport = open_transport(&config.can_interface)?;
    gateway.start(transport).await;

    // ── Boundary image shared with the Modbus responder ─────────
    let image = Arc::new(IoImage::new(config.input_count, config.output_count));
    let tick_interval = Duration::from_millis(config.timing.tick_interval_ms);

    tokio::select! {
        // Poll the translation engine and exchange the I/O image
        () = driver::run(&gateway, &image, tick_interval) => {
            tracing::error!("driver loop exited unexpectedly");
        }
        // Serve coils and discrete inputs over Modbus/TCP
        res = modbus::serve(Arc::clone(&image), &config.modbus_bind) => {
            if let Err(e) = res {
                tracing::error!(error = %e, "modbus server exited");
            }
        }
        // Graceful shutdown on SIGINT/SIGTERM
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutdown signal received");
        }
    }

    gateway.stop();
    tracing::info!("cbm-gateway stopped");
    Ok(())
}

#[cfg(target_os = "linux")]
fn open_transport(interface: &str) -> anyhow::Result<Arc<dyn BusTransport>> {
    let transport = cbm_canbus::SocketCanTransport::open(interface)?;
    Ok(Arc::new(transport))
}

#[cfg(not(target_os = "linux"))]
fn open_transport(_interface: &str) -> anyhow::Result<Arc<dyn BusTransport>> {
    anyhow::bail!("the SocketCAN transport is only available on Linux")
}
