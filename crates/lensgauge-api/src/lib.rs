//! # lensgauge-api
//!
//! HTTP front end for Lensgauge.
//!
//! ```text
//! GET  /                          upload form
//! POST /                          multipart field `file` → result page
//! GET  /uploads/<id>/result.jpg   annotated result
//! GET  /health                    JSON status
//! ```
//!
//! Each upload is processed in its own slot (see
//! [`lensgauge_core::storage`]), so concurrent requests never share files.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod error;
pub mod pages;
pub mod routes;
pub mod server;

pub use error::{ApiError, Result};
pub use server::{AppState, Server, router};
