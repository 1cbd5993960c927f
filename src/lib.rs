pub mod auth;
pub mod catalog;
pub mod cli;
pub mod client;
pub mod config;
pub mod observability;
pub mod orchestrator;
pub mod state;
pub mod storage;
pub mod transport;
