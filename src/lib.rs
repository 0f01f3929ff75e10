//! Implements a client for the pixela graph API
//!
//! To change the default request timeout set the PIXELA_TIMEOUT_MS
//! environment variable to the desired timeout value.
//!
//! Pixela answers failures with a JSON body, which is handed back to the
//! caller instead of being turned into an error. Check `is_success` on
//! `PixelaResponse`, or match on `Reply`.
//!
//! Reference: https://docs.pixe.la
mod client;
mod http;

pub mod models;
pub use crate::client::Client;
