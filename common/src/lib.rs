//! Shared building blocks for portwatch: the domain models describing a
//! business unit's scan, target parsing, typed errors and runtime settings.

pub mod audit;
pub mod config;
pub mod error;
pub mod models;
pub mod network;
