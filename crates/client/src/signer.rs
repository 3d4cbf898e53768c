// Copyright 2025 RISC Zero, Inc.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The external-signer seam.
//!
//! Signatures come from whatever controls the Ethereum key: a wallet behind
//! a JSON-RPC endpoint or a raw development key. Implementations apply the
//! signed-message envelope themselves and return the 65-byte hex signature
//! with the canonical `v` of 27 or 28.

use std::time::Duration;

use alloy::rpc::client::RpcClient;
use alloy::transports::http::{Client, Http};
use alloy::transports::layers::{RetryBackoffLayer, RetryBackoffService};
use alloy_primitives::{hex, Address};
use anyhow::{anyhow, bail, Context};
use async_trait::async_trait;
use crossig_core::{
    canonical_recovery_id, derive_ethereum_address, hash_personal_message, RecoverableSignature,
    UncompressedPublicKey,
};
use k256::ecdsa::SigningKey;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::PublicKey as K256PublicKey;
use log::debug;
use thiserror::Error as ThisError;

/// Error code wallets answer with when the user declines to sign.
const USER_REJECTED_CODE: i64 = 4001;

/// Failures of a signature request.
#[derive(Debug, ThisError)]
pub enum SignerError {
    /// The user declined the request.
    #[error("signature request rejected by the signer")]
    Rejected,
    /// No answer within the configured deadline.
    #[error("signature request timed out")]
    Timeout,
    /// Transport or signer-side failure.
    #[error("signer rpc: {0}")]
    Rpc(String),
}

/// A capability that signs personal messages for an Ethereum account it
/// controls.
#[async_trait]
pub trait ExternalSigner: Send + Sync {
    /// The account this signer controls, when it knows one up front.
    fn account(&self) -> Option<Address> {
        None
    }

    /// Signs `message` for `account` and returns the 65-byte hex signature.
    async fn sign(&self, account: Address, message: &[u8]) -> Result<String, SignerError>;
}

/// Signs locally with a raw secp256k1 key. Intended for development and
/// tests; production deployments should keep keys behind [`RpcSigner`].
pub struct KeySigner {
    key: SigningKey,
    address: Address,
}

impl KeySigner {
    /// Parses a hex-encoded 32-byte signing key.
    pub fn new(key_hex: &str) -> anyhow::Result<Self> {
        let bytes = hex::decode(key_hex).context("signing key hex")?;
        let key = SigningKey::from_slice(&bytes)
            .map_err(|_| anyhow!("signing key must be a 32-byte secp256k1 scalar"))?;
        let point = K256PublicKey::from(key.verifying_key()).to_encoded_point(false);
        let uncompressed = UncompressedPublicKey::from_slice(point.as_bytes());
        let address = derive_ethereum_address(&uncompressed).context("signer address")?;
        Ok(KeySigner { key, address })
    }

    /// The Ethereum address of the held key.
    pub fn address(&self) -> Address {
        self.address
    }
}

#[async_trait]
impl ExternalSigner for KeySigner {
    fn account(&self) -> Option<Address> {
        Some(self.address)
    }

    async fn sign(&self, account: Address, message: &[u8]) -> Result<String, SignerError> {
        if account != self.address {
            return Err(SignerError::Rpc(format!(
                "account {account} is not controlled by this key"
            )));
        }
        let hash = hash_personal_message(message);
        let (signature, recovery_id) = self
            .key
            .sign_prehash_recoverable(hash.as_slice())
            .map_err(|err| SignerError::Rpc(err.to_string()))?;

        let mut wire = [0u8; 65];
        wire[..64].copy_from_slice(signature.to_bytes().as_slice());
        wire[64] = canonical_recovery_id(recovery_id.to_byte());
        Ok(RecoverableSignature::from_bytes(&wire).to_hex())
    }
}

/// Delegates signing to `personal_sign` on an Ethereum JSON-RPC endpoint,
/// typically a wallet the user approves requests on.
pub struct RpcSigner {
    client: RpcClient<RetryBackoffService<Http<Client>>>,
    timeout: Duration,
}

impl RpcSigner {
    pub fn new(rpc_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let retry_layer = RetryBackoffLayer::new(10, 100, 330);
        let client = RpcClient::builder()
            .layer(retry_layer)
            .http(rpc_url.parse().context("signer rpc url")?);
        Ok(RpcSigner { client, timeout })
    }
}

#[async_trait]
impl ExternalSigner for RpcSigner {
    async fn sign(&self, account: Address, message: &[u8]) -> Result<String, SignerError> {
        debug!("Requesting personal_sign from {account}");
        let params = (hex::encode_prefixed(message), account);
        let request = self.client.request("personal_sign", params);
        match tokio::time::timeout(self.timeout, request).await {
            Err(_) => Err(SignerError::Timeout),
            Ok(Ok(signature)) => Ok(signature),
            Ok(Err(err)) => match err.as_error_resp() {
                Some(payload) if payload.code == USER_REJECTED_CODE => {
                    Err(SignerError::Rejected)
                }
                Some(payload) => Err(SignerError::Rpc(payload.to_string())),
                None => Err(SignerError::Rpc(err.to_string())),
            },
        }
    }
}

/// Selects the signer implementation from the configuration: exactly one of
/// `signing_key` and `signer_rpc` must be given.
pub fn new_signer(
    signing_key: Option<String>,
    signer_rpc: Option<String>,
    timeout: Duration,
) -> anyhow::Result<Box<dyn ExternalSigner>> {
    match (signing_key, signer_rpc) {
        (Some(key), None) => Ok(Box::new(KeySigner::new(&key)?)),
        (None, Some(url)) => Ok(Box::new(RpcSigner::new(&url, timeout)?)),
        (Some(_), Some(_)) => bail!("both a signing key and a signer rpc url were given"),
        (None, None) => bail!("no signer configured; give a signing key or a signer rpc url"),
    }
}
