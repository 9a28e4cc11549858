//! The `BusTransport` trait and the SocketCAN implementation.
//!
//! The gateway's driver loop polls at millisecond granularity and must
//! never block: `try_recv` returns immediately when the socket is empty
//! and `send_frame` drops the frame for this cycle when the transmit
//! buffer is full. The level-triggered change/timeout scans in the engine
//! re-emit dropped announcements on a later tick.

use async_trait::async_trait;

use crate::error::BusResult;

/// A raw CAN frame: 11-bit identifier plus up to 8 data bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    pub id: u16,
    pub data: Vec<u8>,
}

impl RawFrame {
    pub fn new(id: u16, data: Vec<u8>) -> Self {
        Self { id, data }
    }
}

/// Trait for CAN transport implementations.
#[async_trait]
pub trait BusTransport: Send + Sync {
    /// Send a frame, fire-and-forget. A full transmit buffer is not an
    /// error: the frame is dropped for this cycle.
    async fn send_frame(&self, frame: &RawFrame) -> BusResult<()>;

    /// Fetch the next pending frame, or `None` when the socket is empty.
    /// Never blocks.
    async fn try_recv(&self) -> BusResult<Option<RawFrame>>;

    /// Close the underlying socket. Subsequent sends/receives fail with
    /// `BusError::Closed`.
    fn close(&self);
}

// ── SocketCAN (Linux-only) ──────────────────────────────────────

#[cfg(target_os = "linux")]
pub use linux::SocketCanTransport;

#[cfg(target_os = "linux")]
mod linux {
    use std::io;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use socketcan::{CanFrame, CanSocket, EmbeddedFrame, Frame, Socket, StandardId};

    use crate::error::{BusError, BusResult};

    use super::{BusTransport, RawFrame};

    /// SocketCAN transport over a non-blocking raw CAN socket.
    pub struct SocketCanTransport {
        socket: Mutex<Option<CanSocket>>,
        interface: String,
    }

    impl SocketCanTransport {
        /// Open and bind a non-blocking socket on `interface` (e.g. "can0").
        pub fn open(interface: &str) -> BusResult<Self> {
            let socket = CanSocket::open(interface).map_err(|source| BusError::Open {
                interface: interface.to_string(),
                source,
            })?;
            socket
                .set_nonblocking(true)
                .map_err(|source| BusError::Bind {
                    interface: interface.to_string(),
                    source,
                })?;
            tracing::info!(interface, "CAN socket opened");
            Ok(Self {
                socket: Mutex::new(Some(socket)),
                interface: interface.to_string(),
            })
        }

        pub fn interface(&self) -> &str {
            &self.interface
        }
    }

    #[async_trait]
    impl BusTransport for SocketCanTransport {
        async fn send_frame(&self, frame: &RawFrame) -> BusResult<()> {
            let id = StandardId::new(frame.id)
                .ok_or_else(|| BusError::Frame(format!("id 0x{:04X} exceeds 11 bits", frame.id)))?;
            let can_frame = CanFrame::new(id, &frame.data)
                .ok_or_else(|| BusError::Frame(format!("payload of {} bytes", frame.data.len())))?;

            let guard = self.socket.lock().unwrap();
            let socket = guard.as_ref().ok_or(BusError::Closed)?;
            match socket.write_frame(&can_frame) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    // Transmit buffer full: drop for this cycle, the engine
                    // re-evaluates on the next tick.
                    tracing::debug!(id = frame.id, "CAN tx buffer full, frame dropped");
                    Ok(())
                }
                Err(e) => Err(BusError::Send(e)),
            }
        }

        async fn try_recv(&self) -> BusResult<Option<RawFrame>> {
            let guard = self.socket.lock().unwrap();
            let socket = guard.as_ref().ok_or(BusError::Closed)?;
            match socket.read_frame() {
                Ok(frame) => Ok(Some(RawFrame::new(
                    (frame.raw_id() & 0x7FF) as u16,
                    frame.data().to_vec(),
                ))),
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(None),
                Err(e) => Err(BusError::Recv(e)),
            }
        }

        fn close(&self) {
            if self.socket.lock().unwrap().take().is_some() {
                tracing::info!(interface = %self.interface, "CAN socket closed");
            }
        }
    }
}
