use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::database::Record;

string_enum! {
    pub enum OrderStatus {
        Pending => "pending",
        Processing => "processing",
        Shipped => "shipped",
        Delivered => "delivered",
        Cancelled => "cancelled",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: u64,
    pub user_id: u64,
    pub order_number: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub items: Vec<String>,
    pub order_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivered_date: Option<DateTime<Utc>>,
}

impl Order {
    /// `ORD-007` style number derived from the numeric id
    pub fn number_for(id: u64) -> String {
        format!("ORD-{:03}", id)
    }

    /// Apply a status change, stamping `deliveredDate` on delivery
    pub fn set_status(&mut self, status: OrderStatus, now: DateTime<Utc>) {
        if status == OrderStatus::Delivered {
            self.delivered_date = Some(now);
        }
        self.status = status;
    }
}

impl Record for Order {
    const RESOURCE: &'static str = "orders";

    fn key(&self) -> String {
        self.id.to_string()
    }
}
