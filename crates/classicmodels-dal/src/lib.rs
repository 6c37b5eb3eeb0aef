//! Data-access layer for the MySQL `classicmodels` sample schema

pub mod client;
pub mod config;
pub mod dal;
mod error;
pub mod models;

#[cfg(test)]
mod testing;

pub use client::{
    ConnectionManager, ConnectionState, Connector, MySqlConnector, RetryPolicy,
    ScopedConnection, Session,
};
pub use config::{ConfigBuilder, DbConfig};
pub use error::{ConnectError, Error, Result};
pub use models::{
    Customer, CustomerContact, CustomerField, CustomerOrder, CustomerSummary, CustomerUpdate,
    NewCustomer, NewOrder, Order, OrderLine, OrderStatus, OrderSummary, RepCustomer,
};
