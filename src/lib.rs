pub mod base;
pub mod cache;
pub mod command;
pub mod error;
pub mod sim;
pub mod ui;
pub mod util;

#[cfg(test)]
mod unit_tests;
