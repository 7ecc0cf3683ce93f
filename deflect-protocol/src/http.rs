//! Minimal HTTP/1.1 request-head parsing and response encoding.
//!
//! Request head format:
//! - Request line: `METHOD SP PATH SP HTTP/1.x CRLF`
//! - Header lines: `Name: value CRLF`
//! - Terminator: empty line (`CRLF`)
//!
//! Only the fields the telemetry endpoints need are retained: method,
//! path (query string stripped), `Content-Length` and `Host`.

use core::fmt::Write;

use heapless::{String, Vec};

/// Maximum accepted size of a request head, terminator included
pub const MAX_HEAD_SIZE: usize = 512;

/// Maximum stored path length
pub const MAX_PATH_LEN: usize = 32;

/// Maximum stored Host header length
pub const MAX_HOST_LEN: usize = 64;

const HEAD_TERMINATOR: &[u8] = b"\r\n\r\n";

/// Errors that can occur while parsing a request head
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HeadError {
    /// Head exceeds [`MAX_HEAD_SIZE`]
    TooLarge,
    /// Request line is not `METHOD PATH HTTP/1.x`
    InvalidRequestLine,
    /// Path exceeds [`MAX_PATH_LEN`]
    UriTooLong,
    /// Header line without a colon, or not UTF-8
    InvalidHeader,
    /// `Content-Length` is not a decimal number
    InvalidContentLength,
}

/// Request method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Method {
    Get,
    Post,
    /// Any other method (HEAD, PUT, ...)
    Other,
}

impl Method {
    fn parse(token: &str) -> Self {
        match token {
            "GET" => Method::Get,
            "POST" => Method::Post,
            _ => Method::Other,
        }
    }
}

/// Parsed request head
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestHead {
    pub method: Method,
    /// Path without query string
    pub path: String<MAX_PATH_LEN>,
    /// Declared body length (0 when absent)
    pub content_length: usize,
    /// Host header, empty when absent or too long to keep
    pub host: String<MAX_HOST_LEN>,
}

impl RequestHead {
    /// Parse a complete head (terminator included)
    pub fn parse(raw: &[u8]) -> Result<Self, HeadError> {
        let text = core::str::from_utf8(raw).map_err(|_| HeadError::InvalidHeader)?;
        let mut lines = text.split("\r\n");

        let request_line = lines.next().ok_or(HeadError::InvalidRequestLine)?;
        let mut parts = request_line.split(' ');
        let method = parts.next().ok_or(HeadError::InvalidRequestLine)?;
        let target = parts.next().ok_or(HeadError::InvalidRequestLine)?;
        let version = parts.next().ok_or(HeadError::InvalidRequestLine)?;
        if method.is_empty() || !target.starts_with('/') || !version.starts_with("HTTP/1.") {
            return Err(HeadError::InvalidRequestLine);
        }
        if parts.next().is_some() {
            return Err(HeadError::InvalidRequestLine);
        }

        let path = match target.split_once('?') {
            Some((path, _query)) => path,
            None => target,
        };
        let path = String::try_from(path).map_err(|_| HeadError::UriTooLong)?;

        let mut head = RequestHead {
            method: Method::parse(method),
            path,
            content_length: 0,
            host: String::new(),
        };

        for line in lines {
            if line.is_empty() {
                continue;
            }
            let (name, value) = line.split_once(':').ok_or(HeadError::InvalidHeader)?;
            let value = value.trim();

            if name.trim().eq_ignore_ascii_case("content-length") {
                head.content_length = value
                    .parse()
                    .map_err(|_| HeadError::InvalidContentLength)?;
            } else if name.trim().eq_ignore_ascii_case("host") {
                // Informational only; an oversized host is dropped
                head.host = String::try_from(value).unwrap_or_default();
            }
        }

        Ok(head)
    }
}

/// Incremental parser for request heads
///
/// Bytes are fed as they arrive from the socket; the parser reports the
/// head once the blank-line terminator has been seen, together with the
/// number of bytes of the current slice it consumed. Remaining bytes of
/// that slice belong to the body.
#[derive(Debug, Clone, Default)]
pub struct HeadParser {
    buffer: Vec<u8, MAX_HEAD_SIZE>,
}

impl HeadParser {
    /// Create a new head parser
    pub fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// Reset the parser state
    pub fn reset(&mut self) {
        self.buffer.clear();
    }

    /// Number of head bytes buffered so far
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Feed received bytes to the parser
    ///
    /// Returns `Ok(Some((head, consumed)))` once the head is complete,
    /// `Ok(None)` when more bytes are needed, or `Err` on a malformed head.
    pub fn feed(&mut self, bytes: &[u8]) -> Result<Option<(RequestHead, usize)>, HeadError> {
        for (i, &byte) in bytes.iter().enumerate() {
            if self.buffer.push(byte).is_err() {
                self.reset();
                return Err(HeadError::TooLarge);
            }

            if self.buffer.ends_with(HEAD_TERMINATOR) {
                let head = RequestHead::parse(&self.buffer);
                self.reset();
                return head.map(|head| Some((head, i + 1)));
            }
        }
        Ok(None)
    }
}

/// Response status codes used by the endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Status {
    Ok,
    BadRequest,
    NotFound,
    MethodNotAllowed,
    RequestTimeout,
    InternalServerError,
}

impl Status {
    pub fn code(self) -> u16 {
        match self {
            Status::Ok => 200,
            Status::BadRequest => 400,
            Status::NotFound => 404,
            Status::MethodNotAllowed => 405,
            Status::RequestTimeout => 408,
            Status::InternalServerError => 500,
        }
    }

    pub fn reason(self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::BadRequest => "Bad Request",
            Status::NotFound => "Not Found",
            Status::MethodNotAllowed => "Method Not Allowed",
            Status::RequestTimeout => "Request Timeout",
            Status::InternalServerError => "Internal Server Error",
        }
    }
}

/// Response body media type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ContentType {
    Json,
    Text,
}

impl ContentType {
    pub fn as_str(self) -> &'static str {
        match self {
            ContentType::Json => "application/json",
            ContentType::Text => "text/plain",
        }
    }
}

/// Errors that can occur while encoding a response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EncodeError {
    /// Output does not fit the fixed-size buffer
    Overflow,
}

/// `fmt::Write` adapter over a byte slice that refuses to truncate
struct SliceWriter<'a> {
    buf: &'a mut [u8],
    len: usize,
}

impl Write for SliceWriter<'_> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        let end = self.len + s.len();
        if end > self.buf.len() {
            return Err(core::fmt::Error);
        }
        self.buf[self.len..end].copy_from_slice(s.as_bytes());
        self.len = end;
        Ok(())
    }
}

/// Encode a complete response (status line, headers, body)
///
/// Returns the number of bytes written. Every response closes the
/// connection; `no_store` adds `Cache-Control: no-store`.
pub fn encode_response(
    status: Status,
    content_type: ContentType,
    no_store: bool,
    body: &[u8],
    out: &mut [u8],
) -> Result<usize, EncodeError> {
    let mut writer = SliceWriter { buf: out, len: 0 };

    write!(
        writer,
        "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\n",
        status.code(),
        status.reason(),
        content_type.as_str(),
        body.len()
    )
    .map_err(|_| EncodeError::Overflow)?;
    if no_store {
        writer
            .write_str("Cache-Control: no-store\r\n")
            .map_err(|_| EncodeError::Overflow)?;
    }
    writer
        .write_str("Connection: close\r\n\r\n")
        .map_err(|_| EncodeError::Overflow)?;

    let head_len = writer.len;
    let end = head_len + body.len();
    if end > out.len() {
        return Err(EncodeError::Overflow);
    }
    out[head_len..end].copy_from_slice(body);
    Ok(end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_get_without_body() {
        let mut parser = HeadParser::new();
        let raw = b"GET /sensors HTTP/1.1\r\nHost: 192.168.4.1\r\n\r\n";
        let (head, consumed) = parser.feed(raw).unwrap().unwrap();

        assert_eq!(consumed, raw.len());
        assert_eq!(head.method, Method::Get);
        assert_eq!(head.path.as_str(), "/sensors");
        assert_eq!(head.content_length, 0);
        assert_eq!(head.host.as_str(), "192.168.4.1");
    }

    #[test]
    fn test_parse_post_reports_body_offset() {
        let mut parser = HeadParser::new();
        let raw = b"POST /target_angle HTTP/1.1\r\ncontent-length: 18\r\n\r\n{\"targetAngle\":15}";
        let (head, consumed) = parser.feed(raw).unwrap().unwrap();

        assert_eq!(head.method, Method::Post);
        assert_eq!(head.content_length, 18);
        assert_eq!(&raw[consumed..], b"{\"targetAngle\":15}");
    }

    #[test]
    fn test_parse_head_split_across_reads() {
        let mut parser = HeadParser::new();
        assert_eq!(parser.feed(b"POST /reset HT").unwrap(), None);
        assert_eq!(parser.feed(b"TP/1.1\r\nContent-Le").unwrap(), None);
        assert_eq!(parser.feed(b"ngth: 0\r\n\r").unwrap(), None);
        let (head, consumed) = parser.feed(b"\n").unwrap().unwrap();

        assert_eq!(consumed, 1);
        assert_eq!(head.path.as_str(), "/reset");
        assert_eq!(parser.buffered(), 0);
    }

    #[test]
    fn test_query_string_is_stripped() {
        let head = RequestHead::parse(b"GET /sensors?t=123 HTTP/1.1\r\n\r\n").unwrap();
        assert_eq!(head.path.as_str(), "/sensors");
    }

    #[test]
    fn test_invalid_request_line() {
        assert_eq!(
            RequestHead::parse(b"GARBAGE\r\n\r\n"),
            Err(HeadError::InvalidRequestLine)
        );
        assert_eq!(
            RequestHead::parse(b"GET sensors HTTP/1.1\r\n\r\n"),
            Err(HeadError::InvalidRequestLine)
        );
    }

    #[test]
    fn test_invalid_content_length() {
        assert_eq!(
            RequestHead::parse(b"POST /chord HTTP/1.1\r\nContent-Length: ten\r\n\r\n"),
            Err(HeadError::InvalidContentLength)
        );
    }

    #[test]
    fn test_head_too_large() {
        let mut parser = HeadParser::new();
        let filler = [b'a'; MAX_HEAD_SIZE + 1];
        assert_eq!(parser.feed(&filler), Err(HeadError::TooLarge));
        // Parser is usable again after the error
        assert_eq!(parser.buffered(), 0);
    }

    #[test]
    fn test_encode_json_response_no_store() {
        let mut out = [0u8; 256];
        let len = encode_response(
            Status::Ok,
            ContentType::Json,
            true,
            b"{\"status\":\"ok\"}",
            &mut out,
        )
        .unwrap();
        let text = core::str::from_utf8(&out[..len]).unwrap();

        assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(text.contains("Content-Type: application/json\r\n"));
        assert!(text.contains("Content-Length: 15\r\n"));
        assert!(text.contains("Cache-Control: no-store\r\n"));
        assert!(text.ends_with("\r\n\r\n{\"status\":\"ok\"}"));
    }

    #[test]
    fn test_encode_response_overflow() {
        let mut out = [0u8; 40];
        let result = encode_response(Status::BadRequest, ContentType::Text, false, b"x", &mut out);
        assert_eq!(result, Err(EncodeError::Overflow));
    }

    proptest::proptest! {
        #[test]
        fn test_split_point_does_not_change_head(split in 0usize..64) {
            let raw = b"POST /sensor2 HTTP/1.1\r\nContent-Length: 29\r\n\r\n";
            let split = split.min(raw.len());
            let mut parser = HeadParser::new();

            let first = parser.feed(&raw[..split]).unwrap();
            let (head, _) = match first {
                Some(done) => done,
                None => parser.feed(&raw[split..]).unwrap().unwrap(),
            };
            proptest::prop_assert_eq!(head.path.as_str(), "/sensor2");
            proptest::prop_assert_eq!(head.content_length, 29);
        }
    }
}
