//! # xping-types
//!
//! Wire types for the xping structured feed. Every publish of the feed is one
//! self-delimited [`FeedRecord`]; a frontend that consumes the feed over a
//! subprocess boundary only needs this crate, not the probing engine.
//!
//! ## Features
//!
//! - `std` (default): Standard library support (wall-clock timestamps)
//! - `serde`: JSON serialization via serde
//!
//! ## Example
//!
//! ```rust
//! use xping_types::{FeedRecord, SnapshotRecord};
//!
//! let record = SnapshotRecord::builder()
//!     .timestamp_ms(1_760_000_000_000)
//!     .host("1.1.1.1", |h| {
//!         h.rtt(12).jitter(2).loss_pct(0).avg(13).history([Some(14), Some(12)])
//!     })
//!     .host("unreachable.example", |h| h.loss_pct(100).history([None, None]))
//!     .build();
//!
//! let record = FeedRecord::Snapshot(record);
//! assert_eq!(record.hosts().len(), 2);
//! ```
//!
//! ## Wire format
//!
//! With the `serde` feature a record serializes as
//!
//! ```text
//! {"type":"snapshot","timestamp_ms":1760000000000,"hosts":[
//!   {"name":"1.1.1.1","rtt":12,"jitter":2,"loss_pct":0,"avg":13,"history":[14,12]}
//! ]}
//! ```
//!
//! `rtt`, `avg` and history entries are `null` when no reply is available.
//! History is ordered oldest to newest.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod host;
mod record;

pub use host::*;
pub use record::*;
