//! Subcommand implementations
//!
//! Each command runs its queries against a borrowed session and renders the
//! result to `out`, either as the human-readable listing or as JSON.

use std::io::Write;

use anyhow::Result;
use classicmodels_dal::dal;
use classicmodels_dal::{
    Customer, CustomerContact, CustomerOrder, Order, OrderLine, OrderSummary, Session,
};
use clap::ValueEnum;
use serde_json::json;

/// Rows shown by `customers`.
pub const CUSTOMERS_SHOWN: usize = 5;

/// Orders shown under `customer`.
pub const CUSTOMER_ORDERS_SHOWN: usize = 3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Format {
    #[default]
    Text,
    Json,
}

fn write_json(out: &mut impl Write, value: &serde_json::Value) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

pub fn customers<S: Session + ?Sized>(
    session: &mut S,
    country: &str,
    format: Format,
    out: &mut impl Write,
) -> Result<()> {
    let rows = dal::get_customers_by_country(session, country);
    render_customers(country, &rows, format, out)
}

pub fn render_customers(
    country: &str,
    rows: &[CustomerContact],
    format: Format,
    out: &mut impl Write,
) -> Result<()> {
    let shown = &rows[..rows.len().min(CUSTOMERS_SHOWN)];

    match format {
        Format::Json => write_json(
            out,
            &json!({ "country": country, "total": rows.len(), "customers": shown }),
        ),
        Format::Text => {
            writeln!(out, "Customers in {country}: {} found", rows.len())?;
            for customer in shown {
                writeln!(
                    out,
                    "Customer: {}, City: {}, Phone: {}",
                    customer.customer_name, customer.city, customer.phone
                )?;
            }
            Ok(())
        }
    }
}

pub fn customer<S: Session + ?Sized>(
    session: &mut S,
    customer_number: i32,
    format: Format,
    out: &mut impl Write,
) -> Result<()> {
    let found = dal::get_customer_by_number(session, customer_number);
    let orders = if found.is_some() {
        dal::get_orders_by_customer(session, customer_number)
    } else {
        Vec::new()
    };
    render_customer(customer_number, found.as_ref(), &orders, format, out)
}

pub fn render_customer(
    customer_number: i32,
    customer: Option<&Customer>,
    orders: &[CustomerOrder],
    format: Format,
    out: &mut impl Write,
) -> Result<()> {
    let shown = &orders[..orders.len().min(CUSTOMER_ORDERS_SHOWN)];

    match (format, customer) {
        (Format::Json, _) => write_json(
            out,
            &json!({ "customer": customer, "order_count": orders.len(), "orders": shown }),
        ),
        (Format::Text, None) => {
            writeln!(out, "No customer found with number {customer_number}")?;
            Ok(())
        }
        (Format::Text, Some(customer)) => {
            writeln!(out, "Customer: {}", customer.customer_name)?;
            writeln!(
                out,
                "Contact: {} {}",
                customer.contact_first_name.trim(),
                customer.contact_last_name
            )?;
            writeln!(out, "Location: {}, {}", customer.city, customer.country)?;
            writeln!(out)?;
            writeln!(out, "Orders: {} total", orders.len())?;
            for order in shown {
                writeln!(
                    out,
                    "  - Order #{}, Date: {}, Status: {}",
                    order.order_number, order.order_date, order.status
                )?;
            }
            Ok(())
        }
    }
}

pub fn orders<S: Session + ?Sized>(
    session: &mut S,
    limit: u32,
    format: Format,
    out: &mut impl Write,
) -> Result<()> {
    let rows = dal::get_all_orders(session, limit);
    render_orders(&rows, format, out)
}

pub fn render_orders(rows: &[OrderSummary], format: Format, out: &mut impl Write) -> Result<()> {
    match format {
        Format::Json => write_json(out, &json!({ "orders": rows })),
        Format::Text => {
            for order in rows {
                writeln!(
                    out,
                    "Order #{}, Date: {}, Customer: {}, Status: {}",
                    order.order_number, order.order_date, order.customer_number, order.status
                )?;
            }
            Ok(())
        }
    }
}

pub fn order<S: Session + ?Sized>(
    session: &mut S,
    order_number: i32,
    format: Format,
    out: &mut impl Write,
) -> Result<()> {
    let found = dal::get_order_by_number(session, order_number);
    let lines = if found.is_some() {
        dal::get_order_details(session, order_number)
    } else {
        Vec::new()
    };
    render_order(order_number, found.as_ref(), &lines, format, out)
}

pub fn render_order(
    order_number: i32,
    order: Option<&Order>,
    lines: &[OrderLine],
    format: Format,
    out: &mut impl Write,
) -> Result<()> {
    match (format, order) {
        (Format::Json, _) => write_json(out, &json!({ "order": order, "lines": lines })),
        (Format::Text, None) => {
            writeln!(out, "No order found with number {order_number}")?;
            Ok(())
        }
        (Format::Text, Some(order)) => {
            writeln!(
                out,
                "Order #{}, Date: {}, Status: {}",
                order.order_number, order.order_date, order.status
            )?;
            writeln!(out, "Line Items: {}", lines.len())?;
            for line in lines {
                writeln!(
                    out,
                    "  - {} (Qty: {}, Price: ${})",
                    line.product_name, line.quantity_ordered, line.price_each
                )?;
            }
            Ok(())
        }
    }
}
