//! Ordered resolution strategies, one list per snapshot field.
//!
//! Each list is tried front to back and the first strategy returning a value
//! wins. Every list ends in a strategy that always applies, so resolution
//! never comes up empty for a well-formed input.

use std::net::Ipv4Addr;

use serde_json::Value;
use sweepr_common::discovery::count::{self, coerce_count, strict_count};
use sweepr_common::discovery::payload::{ReportedStatus, StatusPayload};
use sweepr_common::discovery::snapshot::{ProgressSnapshot, SnapshotStatus};

use super::ReconcileContext;

/// Percent added per tick while the agent only says `started`.
pub const STARTING_STEP: u8 = 10;
/// Ceiling for the `started` heartbeat; only real progress may go beyond.
pub const STARTING_CAP: u8 = 90;

/// A named way of resolving one field.
pub struct Strategy<T> {
    pub name: &'static str,
    pub apply: fn(&FieldInput<'_>) -> Option<T>,
}

/// The value a list resolved to, and which strategy produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution<T> {
    pub value: T,
    pub source: &'static str,
}

pub fn first_match<T>(strategies: &[Strategy<T>], input: &FieldInput<'_>) -> Option<Resolution<T>> {
    strategies.iter().find_map(|strategy| {
        (strategy.apply)(input).map(|value| Resolution {
            value,
            source: strategy.name,
        })
    })
}

/// What every strategy gets to look at.
pub struct FieldInput<'a> {
    pub prev: &'a ProgressSnapshot,
    pub payload: &'a StatusPayload,
    pub status: ReportedStatus,
    pub ctx: &'a ReconcileContext,
    /// Counts settled by earlier lists. Zero until they have run.
    pub resolved: Resolved,
}

/// Fields resolved before percent and current target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Resolved {
    pub processed: u64,
    /// Whether the payload carried a processed count of its own.
    pub processed_reported: bool,
    pub total: u64,
}

fn field(value: &Option<Value>) -> Option<&Value> {
    value.as_ref()
}

// ---- processed count ----

pub const PROCESSED: &[Strategy<u64>] = &[
    Strategy {
        name: "processed_ips",
        apply: |i| field(&i.payload.processed_ips).and_then(strict_count),
    },
    Strategy {
        name: "scanned_ips",
        apply: |i| field(&i.payload.scanned_ips).and_then(strict_count),
    },
    Strategy {
        name: "previous",
        apply: |i| Some(i.prev.processed_count),
    },
];

// ---- total count ----

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TotalCount {
    pub value: u64,
    /// Whether the value came from the agent, which locks it.
    pub reported: bool,
}

pub const TOTAL: &[Strategy<TotalCount>] = &[
    Strategy {
        name: "locked",
        apply: |i| {
            (i.prev.total_reported && i.prev.total_count > 0).then_some(TotalCount {
                value: i.prev.total_count,
                reported: true,
            })
        },
    },
    Strategy {
        name: "total_ips",
        apply: |i| {
            field(&i.payload.total_ips)
                .and_then(strict_count)
                .filter(|total| *total > 0)
                .map(|value| TotalCount {
                    value,
                    reported: true,
                })
        },
    },
    Strategy {
        name: "previous",
        apply: |i| {
            (i.prev.total_count > 0).then_some(TotalCount {
                value: i.prev.total_count,
                reported: false,
            })
        },
    },
    Strategy {
        name: "original",
        apply: |i| {
            (i.ctx.original_total > 0).then_some(TotalCount {
                value: i.ctx.original_total,
                reported: false,
            })
        },
    },
    Strategy {
        name: "minimum",
        apply: |_| {
            Some(TotalCount {
                value: 1,
                reported: false,
            })
        },
    },
];

// ---- percent ----

pub const PERCENT: &[Strategy<u8>] = &[
    Strategy {
        name: "completed",
        apply: |i| (i.status == ReportedStatus::Completed).then_some(100),
    },
    Strategy {
        name: "counts",
        apply: |i| {
            let resolved = i.resolved;
            resolved
                .processed_reported
                .then(|| percent_of(resolved.processed, resolved.total))
        },
    },
    Strategy {
        name: "progress",
        apply: |i| {
            field(&i.payload.progress)
                .and_then(count::number)
                .map(clamp_percent)
        },
    },
    Strategy {
        name: "starting_heartbeat",
        apply: |i| {
            let starting = i.prev.status == SnapshotStatus::Starting;
            (starting && i.status == ReportedStatus::Started).then(|| {
                i.prev.percent.saturating_add(STARTING_STEP).min(STARTING_CAP)
            })
        },
    },
    Strategy {
        name: "previous",
        apply: |i| Some(i.prev.percent),
    },
];

/// `processed / total` as a rounded percentage.
///
/// A total of one (or less) has no meaningful ratio: any processed address
/// means done.
pub fn percent_of(processed: u64, total: u64) -> u8 {
    if total <= 1 {
        return if processed > 0 { 100 } else { 0 };
    }
    clamp_percent(processed as f64 / total as f64 * 100.0)
}

fn clamp_percent(value: f64) -> u8 {
    value.round().clamp(0.0, 100.0) as u8
}

// ---- discovered / failed ----

pub const DISCOVERED: &[Strategy<u64>] = &[
    Strategy {
        name: "discovered_devices",
        apply: |i| field(&i.payload.discovered_devices).and_then(coerce_count),
    },
    Strategy {
        name: "devices_found",
        apply: |i| field(&i.payload.devices_found).and_then(coerce_count),
    },
    Strategy {
        name: "previous",
        apply: |i| Some(i.prev.discovered_count),
    },
];

pub const FAILED: &[Strategy<u64>] = &[
    Strategy {
        name: "failed",
        apply: |i| field(&i.payload.failed).and_then(coerce_count),
    },
    Strategy {
        name: "failed_devices",
        apply: |i| field(&i.payload.failed_devices).and_then(coerce_count),
    },
    Strategy {
        name: "previous",
        apply: |i| Some(i.prev.failed_count),
    },
];

// ---- current target ----

pub const CURRENT_TARGET: &[Strategy<Ipv4Addr>] = &[
    Strategy {
        name: "current_ip",
        apply: |i| field(&i.payload.current_ip).and_then(address),
    },
    Strategy {
        name: "current_ip_address",
        apply: |i| field(&i.payload.current_ip_address).and_then(address),
    },
    Strategy {
        name: "scanning_ip",
        apply: |i| field(&i.payload.scanning_ip).and_then(address),
    },
    Strategy {
        name: "derived",
        apply: |i| {
            let processed = i.resolved.processed;
            let advanced = processed > i.prev.processed_count;
            match i.ctx.range {
                Some(range) if advanced => Some(range.addr_at(processed - 1)),
                _ => None,
            }
        },
    },
    Strategy {
        name: "previous",
        apply: |i| i.prev.current_target,
    },
];

fn address(value: &Value) -> Option<Ipv4Addr> {
    value.as_str().and_then(|s| s.trim().parse().ok())
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
