//! Glance: a rapid serial visual presentation reader for the terminal.

pub mod app;
pub mod engine;
pub mod input;
pub mod reading;
pub mod speech;
pub mod storage;
pub mod ui;
