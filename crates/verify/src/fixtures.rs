//! Mock records for the application's REST resources
//!
//! Shapes mirror the rows the application reads from `rest/v1/<resource>`.
//! They only need to satisfy the UI's fetch calls; nothing here is validated.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::VerifyResult;
use crate::route::RouteStub;

pub const BILLS: &str = "bills";
pub const BILL_CUSTOMERS: &str = "bill_customers";
pub const BILL_SETTINGS: &str = "bill_settings";
pub const TRANSACTIONS: &str = "transactions";
pub const SHOPKEEPERS: &str = "shopkeepers";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bill {
    pub id: i64,
    pub bill_number: i64,
    pub customer_id: i64,
    pub customer_name: String,
    pub total_amount: f64,
    pub paid_amount: f64,
    pub date: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillCustomer {
    pub id: i64,
    pub name: String,
    pub mobile_number: String,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillSettings {
    pub id: i64,
    pub payment_methods: Vec<String>,
    pub footer_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub shopkeeper_id: String,
    pub date: String,
    pub goods_given: f64,
    pub money_received: f64,
    #[serde(rename = "created_at")]
    pub created_at: String,
    #[serde(rename = "deleted_at")]
    pub deleted_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shopkeeper {
    pub id: String,
    pub name: String,
    pub mobile_number: Option<String>,
    pub address: Option<String>,
    #[serde(rename = "created_at")]
    pub created_at: String,
    #[serde(rename = "deleted_at")]
    pub deleted_at: Option<String>,
}

/// The data set the home page and bill book render against
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixtureSet {
    pub bills: Vec<Bill>,
    pub customers: Vec<BillCustomer>,
    pub settings: Vec<BillSettings>,
    pub transactions: Vec<Transaction>,
    pub shopkeepers: Vec<Shopkeeper>,
}

impl FixtureSet {
    /// One bill for "Test Customer" dated `today`, one customer, default
    /// settings, and no ledger activity
    pub fn standard(today: NaiveDate) -> Self {
        let stamp = format!("{}T10:00:00", today.format("%Y-%m-%d"));
        Self {
            bills: vec![Bill {
                id: 123,
                bill_number: 1001,
                customer_id: 1,
                customer_name: "Test Customer".to_string(),
                total_amount: 500.0,
                paid_amount: 200.0,
                date: stamp.clone(),
                created_at: stamp.clone(),
                updated_at: stamp,
            }],
            customers: vec![BillCustomer {
                id: 1,
                name: "Test Customer".to_string(),
                mobile_number: "1234567890".to_string(),
                address: "Test Address".to_string(),
            }],
            settings: vec![BillSettings {
                id: 1,
                payment_methods: vec!["Cash".to_string()],
                footer_message: "Thank you".to_string(),
            }],
            transactions: Vec::new(),
            shopkeepers: Vec::new(),
        }
    }

    /// Standard set dated with the local calendar day
    pub fn today() -> Self {
        Self::standard(chrono::Local::now().date_naive())
    }

    /// One stub per resource, in the order the application fetches them
    pub fn stubs(&self) -> VerifyResult<Vec<RouteStub>> {
        Ok(vec![
            RouteStub::rest_resource(BILLS, &self.bills)?,
            RouteStub::rest_resource(BILL_CUSTOMERS, &self.customers)?,
            RouteStub::rest_resource(BILL_SETTINGS, &self.settings)?,
            RouteStub::rest_resource(TRANSACTIONS, &self.transactions)?,
            RouteStub::rest_resource(SHOPKEEPERS, &self.shopkeepers)?,
        ])
    }
}
