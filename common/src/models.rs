pub mod contacts;
pub mod ports;
pub mod report;
pub mod state;
pub mod unit;
