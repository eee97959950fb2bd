//! Compiled-contract artifact loading
//!
//! A deployment starts from a compiled artifact: the JSON file the Solidity
//! toolchain writes per contract, carrying the ABI and creation bytecode.
//! Artifacts are looked up by contract name under an artifacts directory,
//! `<dir>/<ContractName>.json`.

use ethers::abi::Abi;
use ethers::types::Bytes;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Artifact error types
#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Contract artifact not found: {name} (looked for {path})")]
    NotFound { name: String, path: String },

    #[error("Contract {0} has no deployable bytecode")]
    EmptyBytecode(String),
}

/// A compiled contract, ready to hand to the deployment factory.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    pub contract_name: String,
    pub abi: Abi,
    pub bytecode: Bytes,
}

impl Artifact {
    /// Load the artifact for `name` from `dir`.
    ///
    /// # Errors
    ///
    /// Returns `ArtifactError::NotFound` when no `<name>.json` exists in
    /// `dir`, and `ArtifactError::EmptyBytecode` when the artifact holds an
    /// interface or abstract contract that cannot be deployed.
    pub fn load(dir: &Path, name: &str) -> Result<Self, ArtifactError> {
        let path = dir.join(format!("{}.json", name));

        if !path.exists() {
            return Err(ArtifactError::NotFound {
                name: name.to_string(),
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(&path)?;
        let artifact: Artifact = serde_json::from_str(&content)?;

        if artifact.bytecode.is_empty() {
            return Err(ArtifactError::EmptyBytecode(name.to_string()));
        }

        Ok(artifact)
    }
}
