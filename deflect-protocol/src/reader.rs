//! Request reading over a timeout-prone transport
//!
//! A request may arrive in fragments. Each receive is bounded by the
//! transport's own timeout; a timed-out receive is retried, but only
//! until the reader's retry budget is spent, so a stalled client cannot
//! hold the connection forever.

use heapless::Vec;

use crate::http::{HeadError, HeadParser, RequestHead};
use crate::messages::{Request, RequestError, Route, MAX_BODY_SIZE};

/// Size of a single receive while reading the head
pub const RECV_CHUNK_SIZE: usize = 128;

/// Default number of timed-out receives tolerated per request
pub const DEFAULT_MAX_TIMEOUTS: u8 = 5;

/// Errors reported by a single receive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RecvError {
    /// Nothing arrived within the receive timeout
    Timeout,
    /// Connection reset or closed
    Closed,
}

/// Byte source for one connection
#[allow(async_fn_in_trait)]
pub trait Transport {
    /// Receive up to `buf.len()` bytes
    ///
    /// `Ok(0)` means the peer closed the connection.
    async fn recv(&mut self, buf: &mut [u8]) -> Result<usize, RecvError>;
}

/// Errors that end a connection before a request could be decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReadError {
    /// Malformed or oversized request head
    Head(HeadError),
    /// Retry budget exhausted mid-request
    Stalled,
    /// Peer went away; nobody to answer
    Closed,
}

/// A request head together with its decoded (or rejected) request
#[derive(Debug, Clone, PartialEq)]
pub struct Inbound {
    pub head: RequestHead,
    pub request: Result<Request, RequestError>,
}

/// Reads one request per connection
#[derive(Debug, Clone, Copy)]
pub struct RequestReader {
    max_timeouts: u8,
}

impl Default for RequestReader {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_TIMEOUTS)
    }
}

impl RequestReader {
    /// Create a reader that tolerates `max_timeouts` timed-out receives per request
    pub fn new(max_timeouts: u8) -> Self {
        Self { max_timeouts }
    }

    /// Read the head, resolve the route, then read and decode the body
    ///
    /// Routing and size rejections are returned inside [`Inbound`] without
    /// reading the body.
    pub async fn read<T: Transport>(&self, transport: &mut T) -> Result<Inbound, ReadError> {
        let mut timeouts = 0u8;
        let mut parser = HeadParser::new();
        let mut chunk = [0u8; RECV_CHUNK_SIZE];
        let mut leftover: Vec<u8, RECV_CHUNK_SIZE> = Vec::new();

        let head = loop {
            let n = self.recv(transport, &mut chunk, &mut timeouts).await?;
            if let Some((head, consumed)) = parser.feed(&chunk[..n]).map_err(ReadError::Head)? {
                // consumed <= n <= RECV_CHUNK_SIZE
                let _ = leftover.extend_from_slice(&chunk[consumed..n]);
                break head;
            }
        };

        let route = match Route::resolve(head.method, &head.path) {
            Ok(route) => route,
            Err(error) => {
                return Ok(Inbound {
                    head,
                    request: Err(error),
                })
            }
        };

        let limit = route.max_body_len();
        if limit > 0 && head.content_length > limit {
            return Ok(Inbound {
                head,
                request: Err(RequestError::PayloadTooLarge),
            });
        }

        let wanted = if limit == 0 { 0 } else { head.content_length };
        let mut body = [0u8; MAX_BODY_SIZE];
        let mut filled = leftover.len().min(wanted);
        body[..filled].copy_from_slice(&leftover[..filled]);

        while filled < wanted {
            filled += self
                .recv(transport, &mut body[filled..wanted], &mut timeouts)
                .await?;
        }

        Ok(Inbound {
            request: Request::decode(route, &body[..wanted]),
            head,
        })
    }

    async fn recv<T: Transport>(
        &self,
        transport: &mut T,
        buf: &mut [u8],
        timeouts: &mut u8,
    ) -> Result<usize, ReadError> {
        loop {
            match transport.recv(buf).await {
                Ok(0) | Err(RecvError::Closed) => return Err(ReadError::Closed),
                Ok(n) => return Ok(n),
                Err(RecvError::Timeout) => {
                    *timeouts = timeouts.saturating_add(1);
                    if *timeouts > self.max_timeouts {
                        return Err(ReadError::Stalled);
                    }
                }
            }
        }
    }
}
