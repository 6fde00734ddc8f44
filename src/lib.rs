pub mod app;
pub mod cli;
pub mod components;
pub mod config;
pub mod error;
pub mod output;
pub mod render;
pub mod startup;
pub mod utils;
