//! Ledger connection.
//!
//! Typed wrappers over the handful of JSON-RPC reads the market client
//! needs. Account data is always requested `base64`-encoded.

use std::str::FromStr;
use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use solana_sdk::pubkey::Pubkey;
use tracing::debug;

use super::config::{Commitment, RpcConfig};
use super::error::ClientError;
use super::http::{into_result, HttpSender, RpcSender};

/// Account data encoding requested from the node.
const ACCOUNT_ENCODING: &str = "base64";

/// Server-side filter for `getProgramAccounts`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RpcFilter {
    /// Match `bytes` at `offset`.
    Memcmp(Memcmp),
    /// Match accounts of exactly this many bytes.
    DataSize(u64),
}

impl RpcFilter {
    /// Memcmp filter comparing `bytes` at `offset`.
    #[must_use]
    pub fn memcmp(offset: usize, bytes: &[u8]) -> Self {
        Self::Memcmp(Memcmp {
            offset,
            bytes: bs58::encode(bytes).into_string(),
        })
    }
}

/// Memcmp filter body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Memcmp {
    /// Byte offset into the account data.
    pub offset: usize,
    /// Base58-encoded bytes to compare.
    pub bytes: String,
}

/// An account as returned by the node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountInfo {
    /// Raw account data.
    pub data: Vec<u8>,
    /// Whether the account holds a program.
    pub executable: bool,
    /// Owning program.
    pub owner: Pubkey,
    /// Balance in lamports.
    pub lamports: u64,
}

/// An account together with its address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyedAccount {
    /// Account address.
    pub pubkey: Pubkey,
    /// Account contents.
    pub account: AccountInfo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UiAccount {
    data: (String, String),
    executable: bool,
    owner: String,
    lamports: u64,
}

#[derive(Debug, Deserialize)]
struct UiKeyedAccount {
    pubkey: String,
    account: UiAccount,
}

#[derive(Debug, Deserialize)]
struct WithContext<T> {
    value: T,
}

fn parse_pubkey(s: &str) -> Result<Pubkey, ClientError> {
    Pubkey::from_str(s)
        .map_err(|e| ClientError::Deserialization(format!("invalid pubkey {}: {}", s, e)))
}

impl TryFrom<UiAccount> for AccountInfo {
    type Error = ClientError;

    fn try_from(ui: UiAccount) -> Result<Self, Self::Error> {
        let (encoded, encoding) = ui.data;
        if encoding != ACCOUNT_ENCODING {
            return Err(ClientError::Deserialization(format!(
                "unexpected account encoding: {}",
                encoding
            )));
        }
        let data = STANDARD
            .decode(encoded)
            .map_err(|e| ClientError::Deserialization(e.to_string()))?;

        Ok(Self {
            data,
            executable: ui.executable,
            owner: parse_pubkey(&ui.owner)?,
            lamports: ui.lamports,
        })
    }
}

impl TryFrom<UiKeyedAccount> for KeyedAccount {
    type Error = ClientError;

    fn try_from(ui: UiKeyedAccount) -> Result<Self, Self::Error> {
        Ok(Self {
            pubkey: parse_pubkey(&ui.pubkey)?,
            account: ui.account.try_into()?,
        })
    }
}

/// Connection to a Solana-compatible JSON-RPC node.
#[derive(Clone)]
pub struct Connection {
    sender: Arc<dyn RpcSender>,
    commitment: Commitment,
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("url", &self.sender.url())
            .field("commitment", &self.commitment)
            .finish()
    }
}

impl Connection {
    /// Creates an HTTP connection with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be created.
    pub fn new(config: RpcConfig) -> Result<Self, ClientError> {
        let sender = HttpSender::new(&config)?;
        Ok(Self::with_sender(Arc::new(sender), config.commitment))
    }

    /// Creates an HTTP connection to `url` with default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn with_url(url: impl Into<String>) -> Result<Self, ClientError> {
        Self::new(RpcConfig::new(url))
    }

    /// Creates a connection over a custom transport.
    #[must_use]
    pub fn with_sender(sender: Arc<dyn RpcSender>, commitment: Commitment) -> Self {
        Self { sender, commitment }
    }

    /// Commitment attached to reads.
    #[must_use]
    pub fn commitment(&self) -> Commitment {
        self.commitment
    }

    /// Endpoint URL.
    #[must_use]
    pub fn url(&self) -> &str {
        self.sender.url()
    }

    async fn request<T: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<T, ClientError> {
        debug!(method, url = self.sender.url(), "rpc request");
        let envelope = self.sender.send(method, params).await?;
        let result = into_result(envelope)?;
        Ok(serde_json::from_value(result)?)
    }

    fn account_config(&self) -> Value {
        json!({
            "encoding": ACCOUNT_ENCODING,
            "commitment": self.commitment.as_str(),
        })
    }

    /// Fetches one account. `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is malformed.
    pub async fn get_account_info(
        &self,
        address: &Pubkey,
    ) -> Result<Option<AccountInfo>, ClientError> {
        let response: WithContext<Option<UiAccount>> = self
            .request(
                "getAccountInfo",
                json!([address.to_string(), self.account_config()]),
            )
            .await?;
        response.value.map(AccountInfo::try_from).transpose()
    }

    /// Fetches several accounts in one request, in input order.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is malformed.
    pub async fn get_multiple_accounts(
        &self,
        addresses: &[Pubkey],
    ) -> Result<Vec<Option<AccountInfo>>, ClientError> {
        let keys: Vec<String> = addresses.iter().map(Pubkey::to_string).collect();
        let response: WithContext<Vec<Option<UiAccount>>> = self
            .request("getMultipleAccounts", json!([keys, self.account_config()]))
            .await?;
        if response.value.len() != addresses.len() {
            return Err(ClientError::Deserialization(format!(
                "expected {} accounts, got {}",
                addresses.len(),
                response.value.len()
            )));
        }
        response
            .value
            .into_iter()
            .map(|account| account.map(AccountInfo::try_from).transpose())
            .collect()
    }

    /// Lists the accounts owned by `program_id` that match every filter.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Rpc`] with the node's message if the node
    /// rejects the query.
    pub async fn get_program_accounts(
        &self,
        program_id: &Pubkey,
        filters: &[RpcFilter],
    ) -> Result<Vec<KeyedAccount>, ClientError> {
        let config = json!({
            "encoding": ACCOUNT_ENCODING,
            "commitment": self.commitment.as_str(),
            "filters": filters,
        });
        let accounts: Vec<UiKeyedAccount> = self
            .request("getProgramAccounts", json!([program_id.to_string(), config]))
            .await?;
        debug!(program = %program_id, count = accounts.len(), "program accounts");
        accounts.into_iter().map(KeyedAccount::try_from).collect()
    }

    /// Minimum balance for an account of `data_len` bytes to be rent exempt.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn get_minimum_balance_for_rent_exemption(
        &self,
        data_len: usize,
    ) -> Result<u64, ClientError> {
        self.request(
            "getMinimumBalanceForRentExemption",
            json!([data_len, { "commitment": self.commitment.as_str() }]),
        )
        .await
    }
}
