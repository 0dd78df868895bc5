pub mod api;
pub mod config;
pub mod http_client;
pub mod layout;
pub mod panels;
pub mod provider;
pub mod pulsate;
pub mod radar;
pub mod report;
pub mod search;
pub mod state;
pub mod tooltip;
pub mod ui;
