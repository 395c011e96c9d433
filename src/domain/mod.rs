mod entities;
mod errors;
mod ports;
mod token;

// Re-export the domain boundary types and ports.
pub use entities::{
    Credential, Order, OrderItem, OrderType, PaymentType, PersistedOrder, ReportPeriod,
    ReportQuery, ReportRecord, ReportResult, ReportSummary, SalesReport, TabularReport,
};
pub use errors::{ClientError, Failure, TransportError};
pub use ports::{BackendReply, Clock, PosBackend, StatusSink};
pub use token::{AccessToken, TokenState};
