//! Internal modules for the research desk client.
//!
//! This library provides command parsing, the auth API client, session
//! persistence and the research data service used by the rd_client binary.

pub mod api_client;
pub mod commands;
pub mod data_service;
pub mod error;
pub mod session;

pub use error::{ClientError, ClientResult};
