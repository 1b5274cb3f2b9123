pub mod auth;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod gate;
pub mod middleware;
pub mod server;
pub mod session;
