//! cir-cli
//!
//! Command-line front end for the validation engine. Reads documents,
//! answers and catalogs from disk and prints JSON to stdout; logs go to
//! stderr.

pub mod args;
pub mod commands;
pub mod config;
