pub mod api;
pub mod bootstrap;
pub mod cli;
pub mod conversation;
pub mod server;
pub mod state;
pub mod telemetry;
