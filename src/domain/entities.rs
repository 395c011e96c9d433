use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// The serialization within this layer mirrors the backend schema directly.

/// Login credential. Only used for the token exchange and never logged.
#[derive(Clone)]
pub struct Credential {
    pub username: String,
    pub password: String,
}

impl Credential {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
    Cash,
    Card,
    Qr,
    EWallet,
    GiftCard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    DineIn,
    Takeaway,
    Delivery,
}

/// A single line on an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub name: String,
    pub price: Decimal,
    pub category: String,
    #[serde(default)]
    pub modifiers: BTreeSet<String>,
}

impl OrderItem {
    pub fn new(name: impl Into<String>, price: Decimal, category: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            price,
            category: category.into(),
            modifiers: BTreeSet::new(),
        }
    }

    pub fn with_modifier(mut self, modifier: impl Into<String>) -> Self {
        self.modifiers.insert(modifier.into());
        self
    }
}

/// Client-built order payload for the order-creation endpoint.
///
/// `total` is sent as given; the backend is authoritative for pricing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    #[serde(rename = "order")]
    pub items: Vec<OrderItem>,
    pub total: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_phone: Option<String>,
    pub payment_type: PaymentType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_type: Option<OrderType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_requests: Option<String>,
}

impl Order {
    /// Start an order whose total is the sum of the item prices.
    pub fn new(items: Vec<OrderItem>, payment_type: PaymentType) -> Self {
        let total = items.iter().map(|item| item.price).sum();
        Self {
            items,
            total,
            customer_name: None,
            customer_phone: None,
            payment_type,
            order_type: None,
            table_number: None,
            special_requests: None,
        }
    }

    pub fn with_customer(mut self, name: impl Into<String>, phone: impl Into<String>) -> Self {
        self.customer_name = Some(name.into());
        self.customer_phone = Some(phone.into());
        self
    }

    pub fn with_order_type(mut self, order_type: OrderType) -> Self {
        self.order_type = Some(order_type);
        self
    }

    pub fn items_total(&self) -> Decimal {
        self.items.iter().map(|item| item.price).sum()
    }
}

/// Order record as persisted by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedOrder {
    pub id: i64,
    pub total: Decimal,
    pub status: String,
    // Any further fields the backend returned, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportPeriod {
    Daily,
    Weekly,
    Monthly,
}

impl ReportPeriod {
    pub fn as_str(self) -> &'static str {
        match self {
            ReportPeriod::Daily => "daily",
            ReportPeriod::Weekly => "weekly",
            ReportPeriod::Monthly => "monthly",
        }
    }
}

impl fmt::Display for ReportPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(ReportPeriod::Daily),
            "weekly" => Ok(ReportPeriod::Weekly),
            "monthly" => Ok(ReportPeriod::Monthly),
            other => Err(format!("unknown report period: {other}")),
        }
    }
}

/// Which aggregate report to fetch and over which dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportQuery {
    pub period: ReportPeriod,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl ReportQuery {
    pub fn new(period: ReportPeriod) -> Self {
        Self {
            period,
            start_date: None,
            end_date: None,
        }
    }

    pub fn between(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }

    pub fn starting(mut self, start: NaiveDate) -> Self {
        self.start_date = Some(start);
        self
    }

    pub fn ending(mut self, end: NaiveDate) -> Self {
        self.end_date = Some(end);
        self
    }

    /// Query parameters in wire order; absent bounds are omitted.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(2);
        if let Some(start) = self.start_date {
            pairs.push(("start_date", start.format("%Y-%m-%d").to_string()));
        }
        if let Some(end) = self.end_date {
            pairs.push(("end_date", end.format("%Y-%m-%d").to_string()));
        }
        pairs
    }
}

/// One row of a report; the backend decides the columns.
pub type ReportRecord = Map<String, Value>;

/// Aggregate report with a data point per day, week or month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesReport {
    pub period: String,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    pub total_sales: Decimal,
    pub total_orders: u64,
    #[serde(rename = "sales_data")]
    pub data_points: Vec<ReportRecord>,
    // Period-specific summaries such as `average_daily_sales`.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total_orders: u64,
    pub total_revenue: Decimal,
    pub total_discounts: Decimal,
    pub total_taxes: Decimal,
    pub net_revenue: Decimal,
}

/// Row-oriented report with a revenue summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabularReport {
    pub report: Vec<ReportRecord>,
    pub summary: ReportSummary,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The two report shapes the analytics endpoints return.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ReportResult {
    Sales(SalesReport),
    Tabular(TabularReport),
}

impl ReportResult {
    /// Classify a decoded body; `None` when it matches neither shape.
    pub fn from_json(value: Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        if let Ok(sales) = serde_json::from_value::<SalesReport>(value.clone()) {
            return Some(ReportResult::Sales(sales));
        }
        serde_json::from_value::<TabularReport>(value)
            .ok()
            .map(ReportResult::Tabular)
    }

    pub fn total_orders(&self) -> u64 {
        match self {
            ReportResult::Sales(report) => report.total_orders,
            ReportResult::Tabular(report) => report.summary.total_orders,
        }
    }
}
