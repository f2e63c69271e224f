//! Library crate for credits-connect-back, exposing modules for binaries and integration tests.

pub mod config;
pub mod dao;
mod dto;
pub mod entitlement;
mod error;
pub mod metadata;
pub mod routes;
pub mod services;
pub mod state;
