pub mod count;
pub mod job;
pub mod payload;
pub mod request;
pub mod snapshot;
