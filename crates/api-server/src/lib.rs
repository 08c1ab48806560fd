#![warn(clippy::unwrap_used)]

pub mod rest;
pub mod server;

pub use server::ApiServer;
