pub mod domain;
pub mod frameworks;
pub mod interface_adapters;
pub mod use_cases;

pub use domain::{
    AccessToken, ClientError, Credential, Failure, Order, OrderItem, OrderType, PaymentType,
    PersistedOrder, ReportPeriod, ReportQuery, ReportResult,
};
pub use frameworks::client::PosClient;
pub use frameworks::config::{ClientConfig, ConfigError};
pub use use_cases::{AuthClient, OrderClient, ReportClient};
