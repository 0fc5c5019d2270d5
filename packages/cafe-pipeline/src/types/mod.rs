//! Data model for places, menus, beans and run logs.

pub mod bean;
pub mod category;
pub mod config;
pub mod place;
pub mod run_log;
pub mod state;
