//! # sheetbridge-warehouse
//!
//! BigQuery access for tables: drop-and-recreate loads and query results
//! materialized as a [`Sheet`](sheetbridge_sheet::Sheet).
//!
//! Loads and queries wait for their jobs to finish. There is no timeout.

mod client;
mod schema;

pub use client::{LoadJob, WarehouseClient};
pub use schema::{infer_schema, FieldSchema, FieldType};
