//! Logging macros used across the workspace.
//!
//! They forward to [`tracing`] under the `sweepr` target so the CLI formatter
//! can pick a symbol per event kind. `success!` is an info-level event under
//! `sweepr::success`.

pub const TARGET: &str = "sweepr";
pub const SUCCESS_TARGET: &str = "sweepr::success";

#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {
        $crate::__tracing::debug!(target: $crate::log::TARGET, $($arg)*)
    };
}

#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::__tracing::info!(target: $crate::log::TARGET, $($arg)*)
    };
}

#[macro_export]
macro_rules! success {
    ($($arg:tt)*) => {
        $crate::__tracing::info!(target: $crate::log::SUCCESS_TARGET, $($arg)*)
    };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::__tracing::warn!(target: $crate::log::TARGET, $($arg)*)
    };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::__tracing::error!(target: $crate::log::TARGET, $($arg)*)
    };
}
