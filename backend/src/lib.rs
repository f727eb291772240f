//! # Venue Finder Backend
//!
//! Search backend for Taipei sports venues.
//!
//! This crate loads a semi-structured venue spreadsheet, normalizes its
//! heterogeneous column names and values, and answers free-text search,
//! multi-criterion filtering and nearest-venue queries. It also resolves
//! district weather snapshots from a stored forecast payload and keeps an
//! in-memory booking ledger and favorites list. A JSON API is exposed via Axum.
//!
//! ## Architecture
//!
//! - [`catalog`]: source loading, schema normalization, the immutable venue store
//! - [`services`]: query engine, geo resolver, weather resolver, booking ledger, favorites
//! - [`models`]: venue, booking and weather records
//! - [`config`]: TOML configuration with environment overrides
//! - [`error`]: data-loading error type
//! - [`api`]: re-exports for library callers
//! - `http`: Axum-based HTTP server and request handlers (feature `http-server`)
//!
//! Data-absence never surfaces as an error from the query, geo or weather
//! services: a missing dataset is an empty catalog, an unknown district is the
//! city default, and missing forecast elements fall back to fixed defaults.

pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
