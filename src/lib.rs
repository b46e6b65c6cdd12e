pub mod api;
pub mod cli;
pub mod client;
pub mod color;
pub mod model;
pub mod store;
pub mod tui;
