//! Operations on the `customers` table.

use mysql::{Params, Value};

use super::{execute, fetch_all, fetch_one, touched_one};
use crate::client::Session;
use crate::models::{
    Customer, CustomerContact, CustomerSummary, CustomerUpdate, NewCustomer, RepCustomer,
    decimal_to_value,
};

const SELECT_ALL: &str = "SELECT customerNumber, customerName, contactLastName, contactFirstName, \
     phone, addressLine1, city, country, salesRepEmployeeNumber, creditLimit \
     FROM customers ORDER BY customerName LIMIT ?";

const SELECT_BY_NUMBER: &str = "SELECT customerNumber, customerName, contactLastName, \
     contactFirstName, phone, addressLine1, addressLine2, city, state, postalCode, \
     country, salesRepEmployeeNumber, creditLimit \
     FROM customers WHERE customerNumber = ?";

const SELECT_BY_COUNTRY: &str = "SELECT customerNumber, customerName, contactLastName, \
     contactFirstName, phone, city, country \
     FROM customers WHERE country = ? ORDER BY customerName";

const SELECT_BY_SALES_REP: &str = "SELECT customerNumber, customerName, contactLastName, \
     contactFirstName, phone, city, country, creditLimit \
     FROM customers WHERE salesRepEmployeeNumber = ? ORDER BY customerName";

const INSERT: &str = "INSERT INTO customers \
     (customerNumber, customerName, contactLastName, contactFirstName, \
     phone, addressLine1, city, country, salesRepEmployeeNumber, creditLimit) \
     VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)";

const DELETE: &str = "DELETE FROM customers WHERE customerNumber = ?";

/// Customers ordered by name, at most `limit` of them.
#[tracing::instrument(level = "debug", skip(session))]
pub fn get_all_customers<S: Session + ?Sized>(session: &mut S, limit: u32) -> Vec<CustomerSummary> {
    fetch_all(
        session,
        "get_all_customers",
        SELECT_ALL,
        Params::Positional(vec![limit.into()]),
    )
}

#[tracing::instrument(level = "debug", skip(session))]
pub fn get_customer_by_number<S: Session + ?Sized>(
    session: &mut S,
    customer_number: i32,
) -> Option<Customer> {
    fetch_one(
        session,
        "get_customer_by_number",
        SELECT_BY_NUMBER,
        Params::Positional(vec![customer_number.into()]),
    )
}

#[tracing::instrument(level = "debug", skip(session))]
pub fn get_customers_by_country<S: Session + ?Sized>(
    session: &mut S,
    country: &str,
) -> Vec<CustomerContact> {
    fetch_all(
        session,
        "get_customers_by_country",
        SELECT_BY_COUNTRY,
        Params::Positional(vec![country.into()]),
    )
}

/// Customers assigned to the sales representative `employee_number`.
#[tracing::instrument(level = "debug", skip(session))]
pub fn get_customers_by_sales_rep<S: Session + ?Sized>(
    session: &mut S,
    employee_number: i32,
) -> Vec<RepCustomer> {
    fetch_all(
        session,
        "get_customers_by_sales_rep",
        SELECT_BY_SALES_REP,
        Params::Positional(vec![employee_number.into()]),
    )
}

#[tracing::instrument(level = "debug", skip_all, fields(customer_number = customer.customer_number))]
pub fn insert_customer<S: Session + ?Sized>(session: &mut S, customer: &NewCustomer) -> bool {
    let params = Params::Positional(vec![
        customer.customer_number.into(),
        customer.customer_name.as_str().into(),
        customer.contact_last_name.as_str().into(),
        customer.contact_first_name.as_str().into(),
        customer.phone.as_str().into(),
        customer.address_line1.as_str().into(),
        customer.city.as_str().into(),
        customer.country.as_str().into(),
        customer.sales_rep_employee_number.into(),
        decimal_to_value(customer.credit_limit.as_ref()),
    ]);

    let inserted = execute(session, "insert_customer", INSERT, params).is_some();
    if inserted {
        tracing::info!(customer_number = customer.customer_number, "Customer inserted");
    }
    inserted
}

/// Apply a partial update.
///
/// Returns `false` without touching the database when `update` is empty,
/// and `false` when no customer has this number.
#[tracing::instrument(level = "debug", skip(session, update), fields(field_count = update.len()))]
pub fn update_customer<S: Session + ?Sized>(
    session: &mut S,
    customer_number: i32,
    update: &CustomerUpdate,
) -> bool {
    if update.is_empty() {
        tracing::warn!(customer_number, "No fields to update");
        return false;
    }

    let (columns, mut values): (Vec<String>, Vec<Value>) = update
        .iter()
        .map(|(field, value)| (format!("{} = ?", field.column()), value.clone()))
        .unzip();
    values.push(customer_number.into());

    let sql = format!(
        "UPDATE customers SET {} WHERE customerNumber = ?",
        columns.join(", ")
    );
    touched_one(
        "update_customer",
        execute(session, "update_customer", &sql, Params::Positional(values)),
    )
}

#[tracing::instrument(level = "debug", skip(session))]
pub fn delete_customer<S: Session + ?Sized>(session: &mut S, customer_number: i32) -> bool {
    touched_one(
        "delete_customer",
        execute(
            session,
            "delete_customer",
            DELETE,
            Params::Positional(vec![customer_number.into()]),
        ),
    )
}
