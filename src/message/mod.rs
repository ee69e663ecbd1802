//! Protocol request and response messages.
//!
//! # Messaging overview
//!
//! Every protocol message is a single top-level PackStream structure whose
//! signature byte identifies its kind, carried over the channel as one or
//! more chunks terminated by an end-of-message marker:
//!
//! ```text
//! | struct header | signature | field 0 | field 1 | ..
//! |---------------|-----------|---------|---------|---
//! |      B2       |    10     | "RETURN 1" |  {}  |
//!
//! field count -> message kind -> fields
//! ```
//!
//! The client pipelines requests: several messages may be queued and flushed
//! in one send, but the server answers strictly in request order, so the
//! caller drains one response per queued request.
//!
//! A request that produces a result stream is answered by a SUCCESS header
//! (summary metadata such as the column `fields` list), zero or more RECORD
//! messages each carrying one row as its single list field, and a SUCCESS
//! footer. A request skipped because an earlier one failed is answered with
//! IGNORED; a failed request with FAILURE and error metadata.

pub mod request;

mod signature;

pub use request::{Init, PullAll, Request, Run};
pub use signature::Signature;
