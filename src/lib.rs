pub mod admin;
pub mod api;
pub mod auth;
pub mod config;
pub mod errors;
pub mod form;
pub mod lifecycle;
pub mod messaging;
pub mod models;
pub mod names;
pub mod notifications;
pub mod poll;
pub mod session;
pub mod timefmt;
pub mod ui;
pub mod views;
