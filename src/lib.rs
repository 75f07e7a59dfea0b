pub mod affordance;
pub mod api_client;
pub mod booking;
pub mod configuration;
pub mod configuration_handler;
pub mod dashboard;
pub mod directory;
pub mod error;
pub mod http;
pub mod notification;
pub mod seed;
pub mod session;
pub mod stats;
pub mod store;
#[cfg(test)]
mod testutils;
pub mod transitions;
pub mod types;
