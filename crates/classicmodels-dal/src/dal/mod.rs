//! Query functions for the classicmodels tables.
//!
//! Every function borrows an open [`Session`] for one statement and never
//! closes it. Values are always bound as parameters. Failures are logged and
//! folded into the return value:
//!
//! | Kind      | On error | Not found |
//! |-----------|----------|-----------|
//! | list read | `vec![]` | `vec![]`  |
//! | key read  | `None`   | `None`    |
//! | mutation  | `false`  | `false`   |

mod customer;
mod order;

pub use customer::{
    delete_customer, get_all_customers, get_customer_by_number, get_customers_by_country,
    get_customers_by_sales_rep, insert_customer, update_customer,
};
pub use order::{
    get_all_orders, get_order_by_number, get_order_details, get_orders_by_customer,
    get_orders_by_status, insert_order, update_order_status,
};

use mysql::prelude::FromRow;
use mysql::{Params, Row};

use crate::client::Session;
use crate::{Error, Result};

/// Row limit used by the list-everything reads when the caller has no
/// preference.
pub const DEFAULT_LIMIT: u32 = 100;

fn decode_rows<T: FromRow>(rows: Vec<Row>) -> Result<Vec<T>> {
    rows.into_iter()
        .map(|row| T::from_row_opt(row).map_err(|err| Error::query(err.to_string())))
        .collect()
}

/// Run a read and decode every row; any failure yields an empty list.
fn fetch_all<T, S>(session: &mut S, operation: &'static str, sql: &str, params: Params) -> Vec<T>
where
    T: FromRow,
    S: Session + ?Sized,
{
    match session.fetch_all(sql, params).and_then(decode_rows) {
        Ok(rows) => {
            tracing::debug!(operation, rows = rows.len(), "Query returned rows");
            rows
        }
        Err(err) => {
            tracing::error!(operation, error = %err, "Query failed");
            Vec::new()
        }
    }
}

/// Run a keyed read; any failure yields `None`.
fn fetch_one<T, S>(session: &mut S, operation: &'static str, sql: &str, params: Params) -> Option<T>
where
    T: FromRow,
    S: Session + ?Sized,
{
    let decoded = session.fetch_one(sql, params).and_then(|row| {
        row.map(|row| T::from_row_opt(row).map_err(|err| Error::query(err.to_string())))
            .transpose()
    });

    match decoded {
        Ok(found) => {
            tracing::debug!(operation, found = found.is_some(), "Lookup finished");
            found
        }
        Err(err) => {
            tracing::error!(operation, error = %err, "Query failed");
            None
        }
    }
}

/// Run a mutation in its own transaction; `None` means it was rolled back.
fn execute<S>(session: &mut S, operation: &'static str, sql: &str, params: Params) -> Option<u64>
where
    S: Session + ?Sized,
{
    match session.execute(sql, params) {
        Ok(affected) => Some(affected),
        Err(err) => {
            tracing::error!(operation, error = %err, "Statement failed, rolled back");
            None
        }
    }
}

/// Outcome of an update or delete keyed on one row.
fn touched_one(operation: &'static str, affected: Option<u64>) -> bool {
    match affected {
        Some(0) => {
            tracing::warn!(operation, affected_rows = 0, "No matching row");
            false
        }
        Some(affected_rows) => {
            tracing::info!(operation, affected_rows, "Statement committed");
            true
        }
        None => false,
    }
}
