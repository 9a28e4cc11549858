//! CBUS ↔ Modbus I/O gateway core.
//!
//! Bridges accessory events on an event-driven CAN bus to the flat boolean
//! I/O image a polled Modbus/TCP client sees. The translation engine in
//! [`engine`] owns the slot tables; the Modbus side only ever touches the
//! [`image::IoImage`] boundary buffers.

pub mod config;
pub mod driver;
pub mod engine;
pub mod error;
pub mod image;
pub mod modbus;
pub mod slots;

pub use config::GatewayConfig;
pub use engine::Gateway;
pub use error::{GatewayError, GatewayResult, MapDirection};
pub use image::IoImage;
