//! Command handlers

pub mod config;
pub mod listing;
pub mod status;
