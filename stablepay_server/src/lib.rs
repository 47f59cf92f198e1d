//! # StablePay server
//! The HTTP front end of the StablePay gateway. It is responsible for:
//! * The authenticated merchant API (`/v1/orders`) for creating and querying orders.
//! * The public checkout endpoints (`/api/...`) used by the hosted payment pages to start link checkouts and to
//!   confirm on-chain payments against an order's memo.
//! * The background worker that expires overdue orders.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.

pub mod auth;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod expiry_worker;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
