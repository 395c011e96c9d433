// Interface adapters: HTTP transport, wire DTOs and ambient port implementations.

pub mod clock;
pub mod http;
pub mod protocol;
pub mod status_log;

pub use clock::SystemClock;
pub use http::{Endpoints, HttpBackend};
pub use status_log::StatusLogger;
