//! The scan pipeline of a business unit: config ingestion, unit building,
//! concurrent dispatch to the engine and aggregation of the results.

pub mod aggregate;
pub mod business_unit;
pub mod dispatch;
pub mod engine;
pub mod ingest;
pub mod nmap_xml;
pub mod paths;
pub mod report;
pub mod unit;
