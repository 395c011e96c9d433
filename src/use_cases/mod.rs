// Use cases: token lifecycle, order submission and report retrieval.

pub mod auth;
pub mod orders;
pub mod reports;
#[cfg(test)]
pub(crate) mod test_support;

pub use auth::{AuthClient, DEFAULT_TOKEN_TTL};
pub use orders::OrderClient;
pub use reports::ReportClient;
