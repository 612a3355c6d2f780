//! registry-auth - Authentication and authorization decisions for a container registry
//!
//! This crate provides the auth-check plugin a registry front-end calls on
//! every image pull and push: one endpoint validates username/token pairs,
//! the other decides whether a principal may perform the requested scope
//! actions against a bounded MySQL-backed permission store.

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod server;
pub mod store;
