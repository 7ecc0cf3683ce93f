//! HTTP server task
//!
//! Serves one request per connection while the access point is up. Reading
//! and decoding live in `deflect_protocol`, dispatch in the core router;
//! this task only moves bytes between the socket and those layers.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_net::tcp::TcpSocket;
use embassy_net::Stack;
use embassy_time::{with_timeout, Duration};
use embedded_io_async::Write;

use deflect_core::config::NetworkConfig;
use deflect_core::service::Router;
use deflect_core::state::{ServerAction, SharedTelemetryState};
use deflect_protocol::{Inbound, ReadError, RecvError, RequestReader, Response, Transport};

use crate::channels::SERVER_ACTION;

/// Socket buffer sizes
const RX_BUFFER_SIZE: usize = 1024;
const TX_BUFFER_SIZE: usize = 1024;

/// Encoded response: head plus a full telemetry body
const RESPONSE_BUFFER_SIZE: usize = 768;

/// One accepted connection with a bounded wait per receive
struct Connection<'s, 'b> {
    socket: &'s mut TcpSocket<'b>,
    timeout: Duration,
}

impl Transport for Connection<'_, '_> {
    async fn recv(&mut self, buf: &mut [u8]) -> Result<usize, RecvError> {
        match with_timeout(self.timeout, self.socket.read(buf)).await {
            Ok(Ok(n)) => Ok(n),
            Ok(Err(_)) => Err(RecvError::Closed),
            Err(_) => Err(RecvError::Timeout),
        }
    }
}

/// HTTP server task
///
/// Idles until the access point reports [`ServerAction::Start`]; a
/// [`ServerAction::Stop`] while waiting for a client puts it back to idle.
#[embassy_executor::task]
pub async fn http_server_task(
    stack: Stack<'static>,
    network: NetworkConfig,
    state: &'static SharedTelemetryState,
) {
    info!("HTTP server task started");

    let router = match Router::new(state) {
        Ok(router) => router,
        Err(e) => {
            error!("HTTP server cannot claim telemetry writers: {:?}", e);
            return;
        }
    };
    let reader = RequestReader::new(network.recv_max_retries);
    let timeout = Duration::from_millis(network.recv_timeout_ms as u64);

    let mut rx_buffer = [0u8; RX_BUFFER_SIZE];
    let mut tx_buffer = [0u8; TX_BUFFER_SIZE];
    let mut running = false;

    loop {
        if !running {
            running = SERVER_ACTION.wait().await == ServerAction::Start;
            if running {
                info!("HTTP server listening on port {}", network.port);
            }
            continue;
        }

        let mut socket = TcpSocket::new(stack, &mut rx_buffer, &mut tx_buffer);

        match select(socket.accept(network.port), SERVER_ACTION.wait()).await {
            Either::First(Ok(())) => {}
            Either::First(Err(e)) => {
                warn!("Accept failed: {:?}", e);
                continue;
            }
            Either::Second(action) => {
                running = action == ServerAction::Start;
                if !running {
                    info!("HTTP server stopped");
                }
                continue;
            }
        }

        serve_connection(&mut socket, &reader, &router, timeout).await;
    }
}

/// Read one request, answer it and close the connection
async fn serve_connection(
    socket: &mut TcpSocket<'_>,
    reader: &RequestReader,
    router: &Router<'_>,
    timeout: Duration,
) {
    let read = {
        let mut connection = Connection {
            socket: &mut *socket,
            timeout,
        };
        reader.read(&mut connection).await
    };

    match &read {
        Ok(inbound) => log_request(inbound),
        Err(ReadError::Closed) => {}
        Err(e) => warn!("Unreadable request: {}", e),
    }

    let Some(response) = router.respond(read) else {
        debug!("Client closed the connection before a full request");
        socket.abort();
        return;
    };

    log_response(&response);

    let mut out = [0u8; RESPONSE_BUFFER_SIZE];
    match response.encode(&mut out) {
        Ok(len) => {
            if let Err(e) = socket.write_all(&out[..len]).await {
                warn!("Response write failed: {:?}", e);
            }
        }
        Err(e) => error!("Response encoding overflow: {:?}", e),
    }

    socket.close();
    if let Err(e) = socket.flush().await {
        debug!("Flush after close failed: {:?}", e);
    }
}

fn log_request(inbound: &Inbound) {
    let head = &inbound.head;
    info!(
        "{} {} (host '{}', {} body bytes)",
        head.method,
        head.path.as_str(),
        head.host.as_str(),
        head.content_length
    );
    match &inbound.request {
        Ok(request) => debug!("Request: {}", request),
        Err(e) => warn!("Rejected {}: {}", head.path.as_str(), e),
    }
}

fn log_response(response: &Response) {
    info!("-> {} {}", response.status.code(), response.status.reason());
    debug!("Body: {}", response.body.as_str());
}
