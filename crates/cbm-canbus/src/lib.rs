//! CAN transport abstraction for the gateway.
//!
//! `BusTransport` trait with non-blocking `try_recv`/`send_frame`. Two impls:
//! - `SocketCanTransport` — Linux-only, wraps a non-blocking `socketcan::CanSocket`
//! - `MockTransport` — all platforms, scripted inbound frames (in `mock.rs`)

pub mod error;
pub mod mock;
pub mod transport;

pub use error::{BusError, BusResult};
pub use mock::MockTransport;
pub use transport::{BusTransport, RawFrame};

#[cfg(target_os = "linux")]
pub use transport::SocketCanTransport;
