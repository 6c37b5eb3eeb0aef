//! Operations on `orders` and `orderdetails`.

use chrono::NaiveDate;
use mysql::Params;

use super::{execute, fetch_all, fetch_one, touched_one};
use crate::client::Session;
use crate::models::{
    CustomerOrder, NewOrder, Order, OrderLine, OrderStatus, OrderSummary, date_to_value,
};

const SELECT_ALL: &str = "SELECT orderNumber, orderDate, requiredDate, shippedDate, \
     status, customerNumber \
     FROM orders ORDER BY orderDate DESC LIMIT ?";

const SELECT_BY_NUMBER: &str = "SELECT orderNumber, orderDate, requiredDate, shippedDate, \
     status, comments, customerNumber \
     FROM orders WHERE orderNumber = ?";

const SELECT_BY_CUSTOMER: &str = "SELECT orderNumber, orderDate, requiredDate, shippedDate, \
     status \
     FROM orders WHERE customerNumber = ? ORDER BY orderDate DESC";

const SELECT_BY_STATUS: &str = "SELECT orderNumber, orderDate, requiredDate, shippedDate, \
     status, customerNumber \
     FROM orders WHERE status = ? ORDER BY orderDate DESC";

const INSERT: &str = "INSERT INTO orders \
     (orderNumber, orderDate, requiredDate, customerNumber, status) \
     VALUES (?, ?, ?, ?, ?)";

const UPDATE_STATUS: &str = "UPDATE orders SET status = ? WHERE orderNumber = ?";

const UPDATE_STATUS_SHIPPED: &str =
    "UPDATE orders SET status = ?, shippedDate = ? WHERE orderNumber = ?";

const SELECT_LINES: &str = "SELECT od.orderNumber, od.productCode, p.productName, \
     od.quantityOrdered, od.priceEach, od.orderLineNumber \
     FROM orderdetails od \
     JOIN products p ON od.productCode = p.productCode \
     WHERE od.orderNumber = ? \
     ORDER BY od.orderLineNumber";

/// Most recent orders first, at most `limit` of them.
#[tracing::instrument(level = "debug", skip(session))]
pub fn get_all_orders<S: Session + ?Sized>(session: &mut S, limit: u32) -> Vec<OrderSummary> {
    fetch_all(
        session,
        "get_all_orders",
        SELECT_ALL,
        Params::Positional(vec![limit.into()]),
    )
}

#[tracing::instrument(level = "debug", skip(session))]
pub fn get_order_by_number<S: Session + ?Sized>(session: &mut S, order_number: i32) -> Option<Order> {
    fetch_one(
        session,
        "get_order_by_number",
        SELECT_BY_NUMBER,
        Params::Positional(vec![order_number.into()]),
    )
}

#[tracing::instrument(level = "debug", skip(session))]
pub fn get_orders_by_customer<S: Session + ?Sized>(
    session: &mut S,
    customer_number: i32,
) -> Vec<CustomerOrder> {
    fetch_all(
        session,
        "get_orders_by_customer",
        SELECT_BY_CUSTOMER,
        Params::Positional(vec![customer_number.into()]),
    )
}

#[tracing::instrument(level = "debug", skip(session))]
pub fn get_orders_by_status<S: Session + ?Sized>(
    session: &mut S,
    status: OrderStatus,
) -> Vec<OrderSummary> {
    fetch_all(
        session,
        "get_orders_by_status",
        SELECT_BY_STATUS,
        Params::Positional(vec![status.into()]),
    )
}

#[tracing::instrument(level = "debug", skip_all, fields(order_number = order.order_number))]
pub fn insert_order<S: Session + ?Sized>(session: &mut S, order: &NewOrder) -> bool {
    let params = Params::Positional(vec![
        order.order_number.into(),
        date_to_value(order.order_date),
        date_to_value(order.required_date),
        order.customer_number.into(),
        order.status.into(),
    ]);

    let inserted = execute(session, "insert_order", INSERT, params).is_some();
    if inserted {
        tracing::info!(order_number = order.order_number, status = %order.status, "Order inserted");
    }
    inserted
}

/// Set the status, and the shipped date when one is given.
///
/// Without `shipped_date` the stored shipped date is left untouched.
#[tracing::instrument(level = "debug", skip(session))]
pub fn update_order_status<S: Session + ?Sized>(
    session: &mut S,
    order_number: i32,
    status: OrderStatus,
    shipped_date: Option<NaiveDate>,
) -> bool {
    let (sql, params) = match shipped_date {
        Some(date) => (
            UPDATE_STATUS_SHIPPED,
            vec![status.into(), date_to_value(date), order_number.into()],
        ),
        None => (UPDATE_STATUS, vec![status.into(), order_number.into()]),
    };

    touched_one(
        "update_order_status",
        execute(
            session,
            "update_order_status",
            sql,
            Params::Positional(params),
        ),
    )
}

/// Line items of one order, by line number.
#[tracing::instrument(level = "debug", skip(session))]
pub fn get_order_details<S: Session + ?Sized>(session: &mut S, order_number: i32) -> Vec<OrderLine> {
    fetch_all(
        session,
        "get_order_details",
        SELECT_LINES,
        Params::Positional(vec![order_number.into()]),
    )
}
