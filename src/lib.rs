//! Quotebook - categorised quotes reconciled with a remote source
//!
//! This crate provides the core functionality for the `qb` CLI tool.
//!
//! # Architecture
//!
//! - [`model`] - The `Quote` record, validation and the seed set
//! - [`index`] - Category index and filter selection
//! - [`sync`] - Merge engine, sync orchestrator, import/export
//! - [`storage`] - `QuoteStore` trait, SQLite and in-memory stores, session cache
//! - [`remote`] - `RemoteSource` trait and the HTTP implementation
//! - [`config`] - Configuration management
//! - [`cli`] - Command-line interface using clap
//! - [`error`] - Error types and handling

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod error;
pub mod index;
pub mod model;
pub mod remote;
pub mod storage;
pub mod sync;

pub use error::{Error, Result};
