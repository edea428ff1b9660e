//! Ruby Chat — lead-generation chat widget backend.

pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod flow;
pub mod intent;
pub mod notify;
pub mod reply;
pub mod server;
pub mod session;
pub mod store;
