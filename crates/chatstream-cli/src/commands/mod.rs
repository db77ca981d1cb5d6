//! CLI commands

pub mod chat;
pub mod config;
pub mod end;
pub mod show;
