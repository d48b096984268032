pub mod app;
pub mod client;
mod components;
pub mod config;
pub mod error;
pub mod model;
mod system;
pub mod utils;
mod view;

#[cfg(test)]
mod testing;
