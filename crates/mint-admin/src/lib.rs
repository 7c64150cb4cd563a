// mint-admin/src/lib.rs

//! Deployment tooling for a minting collection

pub mod config;

pub use config::DeploymentConfig;
