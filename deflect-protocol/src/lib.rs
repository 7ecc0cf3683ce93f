//! Deflection Monitor HTTP Protocol
//!
//! This crate defines the HTTP/JSON protocol spoken between the deflection
//! monitor (access point, server) and its clients: the operator's browser
//! and the remote sensor node clipped onto the second control surface.
//!
//! # Protocol Overview
//!
//! Every connection carries exactly one request and one response:
//! ```text
//! ┌──────────────┬─────────────────────┬───────────┐
//! │ REQUEST LINE │ HEADERS             │ BODY      │
//! │ ≤ 512B (head, incl. headers)       │ 0–63B     │
//! └──────────────┴─────────────────────┴───────────┘
//! ```
//!
//! Bodies are small JSON objects (or a `chordValue=<mm>` form for the chord
//! endpoint). Responses always carry `Content-Length` and
//! `Connection: close`.

#![no_std]
#![deny(unsafe_code)]

extern crate alloc;

pub mod http;
pub mod messages;
pub mod reader;

pub use http::{ContentType, EncodeError, HeadError, HeadParser, Method, RequestHead, Status};
pub use messages::{
    ChordUpdate, Request, RequestError, Response, Route, SecondaryReading, TargetAck,
    TargetRequest, TelemetryReport,
};
pub use reader::{Inbound, ReadError, RecvError, RequestReader, Transport};
