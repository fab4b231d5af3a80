pub mod config;
pub mod html_fields;
pub mod http_client;
pub mod league_fetch;
pub mod leagues;
pub mod player_fetch;
pub mod queries;
pub mod records;
pub mod refresh;
pub mod refresh_gate;
pub mod resource;
pub mod server;
pub mod service;
pub mod store;
pub mod team_fetch;
