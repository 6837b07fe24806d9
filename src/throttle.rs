//! Local request budgeting and remote rate-limit telemetry.
//!
//! [`RequestThrottle`] caps outbound volume with a process-wide sliding window regardless of
//! what the remote service reports, while [`ThrottleTelemetry`] mirrors the remote service's
//! own rate-limit headers for observers.

pub mod telemetry;
pub mod window;

pub use telemetry::*;
pub use window::*;
