//! Typed rows and inputs for the classicmodels tables.
//!
//! Row structs decode positionally, in the column order of the `SELECT`
//! that produces them (see [`crate::dal`]). Decoding never panics: a column
//! that is missing or of the wrong type turns the whole row into a
//! [`FromRowError`].

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

pub use bigdecimal::BigDecimal;
pub use chrono::NaiveDate;
use mysql::prelude::{FromRow, FromValue};
use mysql::{FromRowError, Row, Value};
use serde::Serialize;

use crate::Error;

/// Status values allowed by the `orders.status` column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum OrderStatus {
    Shipped,
    Resolved,
    Cancelled,
    #[serde(rename = "On Hold")]
    OnHold,
    Disputed,
    #[default]
    #[serde(rename = "In Process")]
    InProcess,
}

impl OrderStatus {
    pub const ALL: [Self; 6] = [
        Self::Shipped,
        Self::Resolved,
        Self::Cancelled,
        Self::OnHold,
        Self::Disputed,
        Self::InProcess,
    ];

    /// The exact string stored in the schema.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Shipped => "Shipped",
            Self::Resolved => "Resolved",
            Self::Cancelled => "Cancelled",
            Self::OnHold => "On Hold",
            Self::Disputed => "Disputed",
            Self::InProcess => "In Process",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not one of the six order statuses.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown order status: {0:?}")]
pub struct ParseStatusError(String);

impl FromStr for OrderStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseStatusError(s.to_string()))
    }
}

impl From<OrderStatus> for Value {
    fn from(status: OrderStatus) -> Self {
        Self::from(status.as_str())
    }
}

/// Row of `get_all_customers`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerSummary {
    pub customer_number: i32,
    pub customer_name: String,
    pub contact_last_name: String,
    pub contact_first_name: String,
    pub phone: String,
    pub address_line1: String,
    pub city: String,
    pub country: String,
    pub sales_rep_employee_number: Option<i32>,
    pub credit_limit: Option<BigDecimal>,
}

/// Full customer record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Customer {
    pub customer_number: i32,
    pub customer_name: String,
    pub contact_last_name: String,
    pub contact_first_name: String,
    pub phone: String,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub city: String,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: String,
    pub sales_rep_employee_number: Option<i32>,
    pub credit_limit: Option<BigDecimal>,
}

/// Row of `get_customers_by_country`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerContact {
    pub customer_number: i32,
    pub customer_name: String,
    pub contact_last_name: String,
    pub contact_first_name: String,
    pub phone: String,
    pub city: String,
    pub country: String,
}

/// Row of `get_customers_by_sales_rep`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepCustomer {
    pub customer_number: i32,
    pub customer_name: String,
    pub contact_last_name: String,
    pub contact_first_name: String,
    pub phone: String,
    pub city: String,
    pub country: String,
    pub credit_limit: Option<BigDecimal>,
}

/// Row of `get_all_orders` and `get_orders_by_status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderSummary {
    pub order_number: i32,
    pub order_date: NaiveDate,
    pub required_date: NaiveDate,
    pub shipped_date: Option<NaiveDate>,
    pub status: OrderStatus,
    pub customer_number: i32,
}

/// Full order record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    pub order_number: i32,
    pub order_date: NaiveDate,
    pub required_date: NaiveDate,
    pub shipped_date: Option<NaiveDate>,
    pub status: OrderStatus,
    pub comments: Option<String>,
    pub customer_number: i32,
}

/// Row of `get_orders_by_customer`; the customer is implied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerOrder {
    pub order_number: i32,
    pub order_date: NaiveDate,
    pub required_date: NaiveDate,
    pub shipped_date: Option<NaiveDate>,
    pub status: OrderStatus,
}

/// One line item joined with its product name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderLine {
    pub order_number: i32,
    pub product_code: String,
    pub product_name: String,
    pub quantity_ordered: i32,
    pub price_each: BigDecimal,
    pub order_line_number: i16,
}

/// Input of `insert_customer`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCustomer {
    pub customer_number: i32,
    pub customer_name: String,
    pub contact_last_name: String,
    pub contact_first_name: String,
    pub phone: String,
    pub address_line1: String,
    pub city: String,
    pub country: String,
    pub sales_rep_employee_number: Option<i32>,
    pub credit_limit: Option<BigDecimal>,
}

/// Input of `insert_order`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub order_number: i32,
    pub order_date: NaiveDate,
    pub required_date: NaiveDate,
    pub customer_number: i32,
    pub status: OrderStatus,
}

impl NewOrder {
    /// New order in the `In Process` state.
    #[must_use]
    pub fn new(
        order_number: i32,
        order_date: NaiveDate,
        required_date: NaiveDate,
        customer_number: i32,
    ) -> Self {
        Self {
            order_number,
            order_date,
            required_date,
            customer_number,
            status: OrderStatus::default(),
        }
    }

    #[must_use]
    pub const fn with_status(mut self, status: OrderStatus) -> Self {
        self.status = status;
        self
    }
}

/// Customer columns that `update_customer` may touch.
///
/// `customerNumber` is the key and is not listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CustomerField {
    CustomerName,
    ContactLastName,
    ContactFirstName,
    Phone,
    AddressLine1,
    AddressLine2,
    City,
    State,
    PostalCode,
    Country,
    SalesRepEmployeeNumber,
    CreditLimit,
}

impl CustomerField {
    pub const ALL: [Self; 12] = [
        Self::CustomerName,
        Self::ContactLastName,
        Self::ContactFirstName,
        Self::Phone,
        Self::AddressLine1,
        Self::AddressLine2,
        Self::City,
        Self::State,
        Self::PostalCode,
        Self::Country,
        Self::SalesRepEmployeeNumber,
        Self::CreditLimit,
    ];

    /// Column name in the `customers` table.
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::CustomerName => "customerName",
            Self::ContactLastName => "contactLastName",
            Self::ContactFirstName => "contactFirstName",
            Self::Phone => "phone",
            Self::AddressLine1 => "addressLine1",
            Self::AddressLine2 => "addressLine2",
            Self::City => "city",
            Self::State => "state",
            Self::PostalCode => "postalCode",
            Self::Country => "country",
            Self::SalesRepEmployeeNumber => "salesRepEmployeeNumber",
            Self::CreditLimit => "creditLimit",
        }
    }

    fn snake_case(self) -> String {
        let mut out = String::new();
        for ch in self.column().chars() {
            if ch.is_ascii_uppercase() {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
        }
        out
    }
}

impl fmt::Display for CustomerField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for CustomerField {
    type Err = Error;

    /// Accepts `creditLimit` as well as `credit_limit`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.column() == s || field.snake_case() == s)
            .ok_or_else(|| Error::UnknownField(s.to_string()))
    }
}

/// Partial update of one customer.
///
/// Columns come from the [`CustomerField`] allow-list, so the statement
/// built from an update never contains caller-supplied identifiers.
///
/// # Example
///
/// ```rust
/// use classicmodels_dal::models::{CustomerField, CustomerUpdate};
///
/// let update = CustomerUpdate::new()
///     .set(CustomerField::Phone, "+1 555 0100")
///     .set(CustomerField::City, "Boston");
/// assert_eq!(update.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomerUpdate {
    fields: BTreeMap<CustomerField, Value>,
}

impl CustomerUpdate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `field` to `value`, replacing any earlier value for it.
    #[must_use]
    pub fn set(mut self, field: CustomerField, value: impl Into<Value>) -> Self {
        self.fields.insert(field, value.into());
        self
    }

    /// Set `field` to SQL `NULL`.
    #[must_use]
    pub fn set_null(self, field: CustomerField) -> Self {
        self.set(field, Value::NULL)
    }

    /// Set `creditLimit`, or clear it with `None`.
    #[must_use]
    pub fn credit_limit(self, limit: Option<&BigDecimal>) -> Self {
        self.set(CustomerField::CreditLimit, decimal_to_value(limit))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Fields in a stable order.
    pub fn iter(&self) -> impl Iterator<Item = (CustomerField, &Value)> {
        self.fields.iter().map(|(field, value)| (*field, value))
    }
}

/// Bind a decimal as its exact text; MySQL converts it server-side.
pub(crate) fn decimal_to_value(decimal: Option<&BigDecimal>) -> Value {
    decimal.map_or(Value::NULL, |d| Value::from(d.to_string()))
}

pub(crate) fn date_to_value(date: NaiveDate) -> Value {
    Value::from(date.format("%Y-%m-%d").to_string())
}

/// Sequential reader over one row's values.
pub(crate) struct Columns(std::vec::IntoIter<Value>);

impl Columns {
    fn new(values: Vec<Value>) -> Self {
        Self(values.into_iter())
    }

    fn take<T: FromValue>(&mut self) -> Option<T> {
        T::from_value_opt(self.0.next()?).ok()
    }

    fn opt_date(&mut self) -> Option<Option<NaiveDate>> {
        match self.0.next()? {
            Value::NULL => Some(None),
            Value::Date(year, month, day, ..) => {
                NaiveDate::from_ymd_opt(year.into(), month.into(), day.into()).map(Some)
            }
            Value::Bytes(bytes) => {
                let text = std::str::from_utf8(&bytes).ok()?;
                let date = text.get(..10).unwrap_or(text);
                NaiveDate::parse_from_str(date, "%Y-%m-%d").ok().map(Some)
            }
            _ => None,
        }
    }

    fn date(&mut self) -> Option<NaiveDate> {
        self.opt_date().flatten()
    }

    fn opt_decimal(&mut self) -> Option<Option<BigDecimal>> {
        match self.0.next()? {
            Value::NULL => Some(None),
            Value::Bytes(bytes) => std::str::from_utf8(&bytes)
                .ok()
                .and_then(|text| BigDecimal::from_str(text.trim()).ok())
                .map(Some),
            Value::Int(n) => Some(Some(BigDecimal::from(n))),
            Value::UInt(n) => Some(Some(BigDecimal::from(n))),
            Value::Double(n) => BigDecimal::from_str(&n.to_string()).ok().map(Some),
            Value::Float(n) => BigDecimal::from_str(&n.to_string()).ok().map(Some),
            _ => None,
        }
    }

    fn decimal(&mut self) -> Option<BigDecimal> {
        self.opt_decimal().flatten()
    }

    fn status(&mut self) -> Option<OrderStatus> {
        self.take::<String>()?.parse().ok()
    }
}

/// Positional decoding shared by every row struct.
pub(crate) trait Decode: Sized {
    fn decode(columns: &mut Columns) -> Option<Self>;
}

/// Decode a row given as raw values, in `SELECT` order.
pub(crate) fn from_values<T: Decode>(values: Vec<Value>) -> Option<T> {
    T::decode(&mut Columns::new(values))
}

macro_rules! impl_from_row {
    ($($model:ty),+ $(,)?) => {
        $(
            impl FromRow for $model {
                fn from_row_opt(row: Row) -> Result<Self, FromRowError> {
                    from_values(row.clone().unwrap()).ok_or(FromRowError(row))
                }
            }
        )+
    };
}

impl_from_row!(
    CustomerSummary,
    Customer,
    CustomerContact,
    RepCustomer,
    OrderSummary,
    Order,
    CustomerOrder,
    OrderLine,
);

impl Decode for CustomerSummary {
    fn decode(c: &mut Columns) -> Option<Self> {
        Some(Self {
            customer_number: c.take()?,
            customer_name: c.take()?,
            contact_last_name: c.take()?,
            contact_first_name: c.take()?,
            phone: c.take()?,
            address_line1: c.take()?,
            city: c.take()?,
            country: c.take()?,
            sales_rep_employee_number: c.take()?,
            credit_limit: c.opt_decimal()?,
        })
    }
}

impl Decode for Customer {
    fn decode(c: &mut Columns) -> Option<Self> {
        Some(Self {
            customer_number: c.take()?,
            customer_name: c.take()?,
            contact_last_name: c.take()?,
            contact_first_name: c.take()?,
            phone: c.take()?,
            address_line1: c.take()?,
            address_line2: c.take()?,
            city: c.take()?,
            state: c.take()?,
            postal_code: c.take()?,
            country: c.take()?,
            sales_rep_employee_number: c.take()?,
            credit_limit: c.opt_decimal()?,
        })
    }
}

impl Decode for CustomerContact {
    fn decode(c: &mut Columns) -> Option<Self> {
        Some(Self {
            customer_number: c.take()?,
            customer_name: c.take()?,
            contact_last_name: c.take()?,
            contact_first_name: c.take()?,
            phone: c.take()?,
            city: c.take()?,
            country: c.take()?,
        })
    }
}

impl Decode for RepCustomer {
    fn decode(c: &mut Columns) -> Option<Self> {
        Some(Self {
            customer_number: c.take()?,
            customer_name: c.take()?,
            contact_last_name: c.take()?,
            contact_first_name: c.take()?,
            phone: c.take()?,
            city: c.take()?,
            country: c.take()?,
            credit_limit: c.opt_decimal()?,
        })
    }
}

impl Decode for OrderSummary {
    fn decode(c: &mut Columns) -> Option<Self> {
        Some(Self {
            order_number: c.take()?,
            order_date: c.date()?,
            required_date: c.date()?,
            shipped_date: c.opt_date()?,
            status: c.status()?,
            customer_number: c.take()?,
        })
    }
}

impl Decode for Order {
    fn decode(c: &mut Columns) -> Option<Self> {
        Some(Self {
            order_number: c.take()?,
            order_date: c.date()?,
            required_date: c.date()?,
            shipped_date: c.opt_date()?,
            status: c.status()?,
            comments: c.take()?,
            customer_number: c.take()?,
        })
    }
}

impl Decode for CustomerOrder {
    fn decode(c: &mut Columns) -> Option<Self> {
        Some(Self {
            order_number: c.take()?,
            order_date: c.date()?,
            required_date: c.date()?,
            shipped_date: c.opt_date()?,
            status: c.status()?,
        })
    }
}

impl Decode for OrderLine {
    fn decode(c: &mut Columns) -> Option<Self> {
        Some(Self {
            order_number: c.take()?,
            product_code: c.take()?,
            product_name: c.take()?,
            quantity_ordered: c.take()?,
            price_each: c.decimal()?,
            order_line_number: c.take()?,
        })
    }
}
