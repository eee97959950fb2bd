//! Contract deployment against the configured network
//!
//! Deployment is a single linear sequence: assemble a signing client from
//! the resolved configuration, hand the compiled artifact to a contract
//! factory, send the deployment transaction, and wait for the deployed
//! address. Failures from the chain client are forwarded as-is; there are
//! no retries.

use std::sync::Arc;

use ethers::contract::ContractFactory;
use ethers::middleware::SignerMiddleware;
use ethers::providers::{Http, Provider};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::Address;
use thiserror::Error;

use crate::artifact::Artifact;
use crate::config::{Config, Network};

/// Deployment error types
#[derive(Error, Debug)]
pub enum DeployError {
    #[error("No RPC URL configured for network {network} (set {env_var})")]
    MissingRpcUrl {
        network: String,
        env_var: &'static str,
    },

    #[error("No signing account configured (set PRIVATE_KEY)")]
    NoAccounts,

    #[error("Invalid private key: {0}")]
    InvalidKey(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Deployment failed: {0}")]
    Contract(String),
}

/// HTTP provider with a local signing key attached.
pub type DeployClient = SignerMiddleware<Provider<Http>, LocalWallet>;

/// Signing client bound to one network, able to deploy compiled artifacts.
pub struct Deployer {
    client: Arc<DeployClient>,
    network: Network,
}

impl Deployer {
    /// Assemble a deployer from resolved configuration.
    ///
    /// # Errors
    ///
    /// Returns `DeployError` if the configuration has no RPC URL for the
    /// active network, no signing account, or a key that does not parse.
    pub fn from_config(config: &Config) -> Result<Self, DeployError> {
        if config.rpc_url.is_empty() {
            return Err(DeployError::MissingRpcUrl {
                network: config.network.to_string(),
                env_var: config.network.url_env_var(),
            });
        }

        let key = config.accounts.first().ok_or(DeployError::NoAccounts)?;

        let provider = Provider::<Http>::try_from(config.rpc_url.as_str())
            .map_err(|e| DeployError::Provider(e.to_string()))?;

        let wallet: LocalWallet = key
            .parse()
            .map_err(|e: ethers::signers::WalletError| DeployError::InvalidKey(e.to_string()))?;
        let wallet = wallet.with_chain_id(config.chain_id);

        let client = Arc::new(SignerMiddleware::new(provider, wallet));

        Ok(Self {
            client,
            network: config.network,
        })
    }

    /// Address of the signing account.
    pub fn address(&self) -> Address {
        self.client.signer().address()
    }

    /// Deploy a compiled artifact and return the deployed address.
    ///
    /// Sends the creation transaction with no constructor arguments and
    /// waits for it to be mined.
    pub async fn deploy(&self, artifact: &Artifact) -> Result<Address, DeployError> {
        tracing::info!(
            contract = %artifact.contract_name,
            network = %self.network,
            "submitting deployment transaction"
        );

        let factory = ContractFactory::new(
            artifact.abi.clone(),
            artifact.bytecode.clone(),
            self.client.clone(),
        );

        let contract = factory
            .deploy(())
            .map_err(|e| DeployError::Contract(e.to_string()))?
            .send()
            .await
            .map_err(|e| DeployError::Contract(e.to_string()))?;

        let address = contract.address();

        tracing::info!(
            contract = %artifact.contract_name,
            address = ?address,
            "deployment confirmed"
        );

        Ok(address)
    }
}
