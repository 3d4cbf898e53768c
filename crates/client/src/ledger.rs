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

//! The ledger seam: submission of authorized calls to a chain node.

use alloy::rpc::client::RpcClient;
use alloy::transports::http::{Client, Http};
use alloy::transports::layers::{RetryBackoffLayer, RetryBackoffService};
use alloy_primitives::{hex, B256};
use anyhow::Context;
use async_trait::async_trait;
use crossig_core::{decode_ss58, RecoverableSignature};
use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

use crate::encode::{compact_encode, CallPayload, UNSIGNED_EXTRINSIC_V4};

/// Failures surfaced by a ledger client.
#[derive(Debug, ThisError)]
pub enum LedgerError {
    /// The node reached a verdict and rejected the call. The text is the
    /// node's own, unmodified.
    #[error("{0}")]
    Rejected(String),
    /// Malformed input prevented building the submission.
    #[error(transparent)]
    Invalid(#[from] crossig_core::Error),
    /// Transport failure before any node-level verdict.
    #[error("ledger rpc: {0}")]
    Rpc(String),
}

/// Proof of acceptance returned by the node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitReceipt {
    /// Hash under which the node queued the transaction.
    pub extrinsic_hash: B256,
}

/// A chain node that accepts externally-authorized calls.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Submits `call` on behalf of `sender`, authorized by `signature`.
    async fn submit(
        &self,
        call: &CallPayload,
        sender: &str,
        signature: &RecoverableSignature,
    ) -> Result<SubmitReceipt, LedgerError>;

    /// The SS58 prefix the chain reports for itself, when it reports one.
    async fn ss58_prefix(&self) -> Result<Option<u16>, LedgerError>;
}

/// Subset of `system_properties` this client reads.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SystemProperties {
    ss58_format: Option<u16>,
}

/// JSON-RPC ledger client for a Substrate-style node.
///
/// Authorized calls are framed as unsigned v4 extrinsics of the bridge
/// pallet, which re-runs the recovery check on-chain before dispatching the
/// inner call.
pub struct RpcLedger {
    client: RpcClient<RetryBackoffService<Http<Client>>>,
    pallet_index: u8,
    call_index: u8,
}

impl RpcLedger {
    /// Connects to `node_url`, targeting the bridge entry point at
    /// `(pallet_index, call_index)`.
    pub fn new(node_url: &str, pallet_index: u8, call_index: u8) -> anyhow::Result<Self> {
        let retry_layer = RetryBackoffLayer::new(10, 100, 330);
        let client = RpcClient::builder()
            .layer(retry_layer)
            .http(node_url.parse().context("node url")?);
        Ok(RpcLedger { client, pallet_index, call_index })
    }
}

#[async_trait]
impl LedgerClient for RpcLedger {
    async fn submit(
        &self,
        call: &CallPayload,
        sender: &str,
        signature: &RecoverableSignature,
    ) -> Result<SubmitReceipt, LedgerError> {
        let (_, account) = decode_ss58(sender)?;
        let framed =
            frame_extrinsic(self.pallet_index, self.call_index, call, &account, signature);
        let extrinsic = hex::encode_prefixed(framed);

        debug!("Submitting extrinsic: {extrinsic}");
        match self.client.request("author_submitExtrinsic", (extrinsic,)).await {
            Ok(extrinsic_hash) => Ok(SubmitReceipt { extrinsic_hash }),
            Err(err) => match err.as_error_resp() {
                Some(payload) => Err(LedgerError::Rejected(payload.message.to_string())),
                None => Err(LedgerError::Rpc(err.to_string())),
            },
        }
    }

    async fn ss58_prefix(&self) -> Result<Option<u16>, LedgerError> {
        debug!("Querying system_properties");
        let properties: SystemProperties = self
            .client
            .request("system_properties", serde_json::json!([]))
            .await
            .map_err(|err| LedgerError::Rpc(err.to_string()))?;
        Ok(properties.ss58_format)
    }
}

/// Frames the unsigned v4 extrinsic carrying an authorized call:
/// `compact(len) ‖ 0x04 ‖ pallet ‖ call ‖ body ‖ account ‖ signature`.
fn frame_extrinsic(
    pallet_index: u8,
    call_index: u8,
    call: &CallPayload,
    account: &[u8; 32],
    signature: &RecoverableSignature,
) -> Vec<u8> {
    let mut inner = vec![UNSIGNED_EXTRINSIC_V4, pallet_index, call_index];
    inner.extend_from_slice(call.body());
    inner.extend_from_slice(account);
    inner.extend_from_slice(&signature.to_bytes());

    let mut framed = compact_encode(inner.len() as u64);
    framed.extend_from_slice(&inner);
    framed
}

#[cfg(test)]
mod tests {
    use alloy_primitives::B256;

    use super::*;

    #[test]
    fn extrinsic_framing_layout() {
        let call = CallPayload::from_call(&[0x06, 0x00]).unwrap();
        let account = [0xaa; 32];
        let signature = RecoverableSignature {
            r: B256::repeat_byte(0x11),
            s: B256::repeat_byte(0x22),
            v: 27,
        };

        let framed = frame_extrinsic(11, 0, &call, &account, &signature);

        let mut expected = vec![0x04, 11, 0, 0x06, 0x00];
        expected.extend_from_slice(&account);
        expected.extend_from_slice(&signature.to_bytes());
        let mut with_length = compact_encode(expected.len() as u64);
        with_length.extend_from_slice(&expected);

        assert_eq!(framed, with_length);
        // 102 inner bytes take the two-byte compact form
        assert_eq!(framed[..2], [0x99, 0x01]);
    }

    #[tokio::test]
    async fn submission_validates_the_sender_address() {
        let ledger = RpcLedger::new("http://127.0.0.1:9933", 11, 0).unwrap();
        let call = CallPayload::from_call(&[0x06, 0x00]).unwrap();
        let signature = RecoverableSignature {
            r: B256::repeat_byte(0x11),
            s: B256::repeat_byte(0x22),
            v: 27,
        };

        let result = ledger.submit(&call, "not an address", &signature).await;
        assert!(matches!(result, Err(LedgerError::Invalid(_))));
    }

    #[tokio::test]
    #[ignore = "Requires a running chain node"]
    async fn live_node_reports_its_prefix() {
        let url = std::env::var("NODE_RPC_URL").unwrap();
        let ledger = RpcLedger::new(&url, 11, 0).unwrap();
        let prefix = ledger.ss58_prefix().await.unwrap();
        assert!(prefix.is_some());
    }
}
