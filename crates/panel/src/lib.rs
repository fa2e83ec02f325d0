//! Kubernetes panel server: HTTP routes and configuration

pub mod api;
pub mod config;
