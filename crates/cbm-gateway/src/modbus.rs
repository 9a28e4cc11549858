//! Modbus/TCP responder over the boundary I/O image.
//!
//! Framing, connection handling and session threading are tokio-modbus's
//! concern; this service only maps coil/discrete-input requests onto the
//! [`IoImage`]. Register function codes are rejected: the gateway image
//! is purely boolean.

use std::future;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio_modbus::prelude::*;
use tokio_modbus::server::tcp::{Server, accept_tcp_connection};

use crate::image::IoImage;

/// Serves the I/O image to one or more Modbus/TCP clients.
#[derive(Clone)]
pub struct ImageService {
    image: Arc<IoImage>,
}

impl ImageService {
    pub fn new(image: Arc<IoImage>) -> Self {
        Self { image }
    }
}

impl tokio_modbus::server::Service for ImageService {
    type Request = Request<'static>;
    type Response = Response;
    type Exception = ExceptionCode;
    type Future = future::Ready<Result<Self::Response, Self::Exception>>;

    fn call(&self, req: Self::Request) -> Self::Future {
        let res = match req {
            Request::ReadDiscreteInputs(addr, cnt) => self
                .image
                .read_discrete_inputs(addr, cnt)
                .map(Response::ReadDiscreteInputs)
                .ok_or(ExceptionCode::IllegalDataAddress),
            Request::ReadCoils(addr, cnt) => self
                .image
                .read_coils(addr, cnt)
                .map(Response::ReadCoils)
                .ok_or(ExceptionCode::IllegalDataAddress),
            Request::WriteSingleCoil(addr, value) => {
                if self.image.write_coil(addr, value) {
                    Ok(Response::WriteSingleCoil(addr, value))
                } else {
                    Err(ExceptionCode::IllegalDataAddress)
                }
            }
            Request::WriteMultipleCoils(addr, values) => {
                if self.image.write_coils(addr, &values[..]) {
                    Ok(Response::WriteMultipleCoils(addr, values.len() as u16))
                } else {
                    Err(ExceptionCode::IllegalDataAddress)
                }
            }
            _ => Err(ExceptionCode::IllegalFunction),
        };
        future::ready(res)
    }
}

/// Run the Modbus/TCP server until the task is cancelled.
pub async fn serve(image: Arc<IoImage>, bind: &str) -> anyhow::Result<()> {
    let socket_addr: SocketAddr = bind.parse()?;
    let listener = TcpListener::bind(socket_addr).await?;
    tracing::info!(%socket_addr, "modbus/tcp server listening");

    let server = Server::new(listener);
    let on_connected = |stream, peer: SocketAddr| {
        let image = Arc::clone(&image);
        async move {
            tracing::debug!(%peer, "modbus client connected");
            accept_tcp_connection(stream, peer, move |_peer| {
                Ok(Some(ImageService::new(Arc::clone(&image))))
            })
        }
    };
    let on_process_error = |err| {
        tracing::warn!(error = %err, "modbus session error");
    };
    server.serve(&on_connected, on_process_error).await?;
    Ok(())
}
