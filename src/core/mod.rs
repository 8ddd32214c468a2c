//! Core domain logic for tenant-scoped authentication

pub mod auth;
pub mod config;
pub mod db;
pub mod validation;
