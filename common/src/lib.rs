//! # Sweepr Common
//!
//! Shared models and contracts for tracking remote discovery jobs.
//!
//! * **[`network`]**: IPv4 ranges, their size and the range parser.
//! * **[`discovery`]**: requests, raw status payloads, snapshots and summaries.
//! * **[`rpc`]**: the outbound contract to a remote scanning agent.
//! * **[`config`]** / **[`retry`]**: runtime tunables.
//! * **[`error`]**: the error taxonomy.

pub mod config;
pub mod discovery;
pub mod error;
pub mod log;
pub mod network;
pub mod retry;
pub mod rpc;

#[doc(hidden)]
pub use tracing as __tracing;
