pub mod api;
pub mod components;
pub mod config;
pub mod db;
pub mod error;
pub mod forms;
pub mod models;
pub mod session;
pub mod state;
