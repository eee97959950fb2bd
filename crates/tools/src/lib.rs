//! Timekeeping Tools Library
//!
//! Provides configuration management and deployment utilities for the
//! timekeeping smart contracts.

pub mod artifact;
pub mod config;
pub mod deploy;

pub use artifact::{Artifact, ArtifactError};
pub use config::{Config, ConfigError, Network};
pub use deploy::{DeployError, Deployer};
