pub mod agent;
pub mod discovery;
pub mod poller;
pub mod reconcile;
pub mod submit;
pub mod summary;

pub use discovery::{DiscoveryHandle, DiscoveryService};
