//! Concrete [`DiscoveryRpc`](sweepr_common::rpc::DiscoveryRpc) implementations.
//!
//! * [`http`]: talks to a scanning agent's REST API.
//! * [`scripted`]: replays a fixed sequence of status payloads.

pub mod http;
pub mod scripted;
