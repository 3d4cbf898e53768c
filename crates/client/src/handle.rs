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

use anyhow::Context;
use log::{debug, info};

use crate::ledger::{LedgerClient, RpcLedger};

/// SS58 prefix assumed when neither the configuration nor the chain supplies
/// one.
pub const DEFAULT_SS58_PREFIX: u16 = 42;

/// Connection settings for [`ChainHandle::open`].
#[derive(Debug, Clone)]
pub struct ChainConfig {
    /// JSON-RPC endpoint of the chain node.
    pub node_url: String,
    /// Fixed SS58 prefix. When unset the chain-reported value is used,
    /// falling back to [`DEFAULT_SS58_PREFIX`].
    pub ss58_prefix: Option<u16>,
    /// Bridge pallet index on the target runtime.
    pub pallet_index: u8,
    /// Call index of the bridge entry point within its pallet.
    pub call_index: u8,
}

/// An open connection to the target chain.
///
/// The handle owns the ledger client and the network prefix resolved at open
/// time; both stay fixed for its lifetime. It is passed explicitly through
/// the call path rather than cached in any global.
pub struct ChainHandle {
    ledger: Box<dyn LedgerClient>,
    ss58_prefix: u16,
}

impl ChainHandle {
    /// Connects to the configured node and resolves the session prefix once:
    /// the configured value, else the chain-reported one, else the default.
    pub async fn open(config: &ChainConfig) -> anyhow::Result<Self> {
        let ledger = RpcLedger::new(&config.node_url, config.pallet_index, config.call_index)
            .context("ledger client")?;
        Self::with_ledger(Box::new(ledger), config.ss58_prefix).await
    }

    /// Like [`open`](Self::open), over an already-built ledger client.
    pub async fn with_ledger(
        ledger: Box<dyn LedgerClient>,
        configured_prefix: Option<u16>,
    ) -> anyhow::Result<Self> {
        let ss58_prefix = match configured_prefix {
            Some(prefix) => prefix,
            None => match ledger.ss58_prefix().await? {
                Some(prefix) => {
                    debug!("Chain reports ss58 prefix {prefix}");
                    prefix
                }
                None => DEFAULT_SS58_PREFIX,
            },
        };
        info!("Session ss58 prefix: {ss58_prefix}");
        Ok(ChainHandle { ledger, ss58_prefix })
    }

    /// The prefix fixed for this session.
    pub fn ss58_prefix(&self) -> u16 {
        self.ss58_prefix
    }

    /// The ledger client bound to this handle.
    pub fn ledger(&self) -> &dyn LedgerClient {
        self.ledger.as_ref()
    }

    /// Releases the connection.
    pub async fn close(self) {
        debug!("Closing chain handle");
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use crossig_core::RecoverableSignature;

    use super::*;
    use crate::encode::CallPayload;
    use crate::ledger::{LedgerError, SubmitReceipt};

    struct FixedPrefix(Option<u16>);

    #[async_trait]
    impl LedgerClient for FixedPrefix {
        async fn submit(
            &self,
            _call: &CallPayload,
            _sender: &str,
            _signature: &RecoverableSignature,
        ) -> Result<SubmitReceipt, LedgerError> {
            unimplemented!("prefix tests never submit")
        }

        async fn ss58_prefix(&self) -> Result<Option<u16>, LedgerError> {
            Ok(self.0)
        }
    }

    #[tokio::test]
    async fn configured_prefix_wins() {
        let handle = ChainHandle::with_ledger(Box::new(FixedPrefix(Some(5))), Some(2))
            .await
            .unwrap();
        assert_eq!(handle.ss58_prefix(), 2);
    }

    #[tokio::test]
    async fn chain_reported_prefix_is_used_when_unconfigured() {
        let handle = ChainHandle::with_ledger(Box::new(FixedPrefix(Some(5))), None)
            .await
            .unwrap();
        assert_eq!(handle.ss58_prefix(), 5);
    }

    #[tokio::test]
    async fn silent_chains_fall_back_to_the_default() {
        let handle = ChainHandle::with_ledger(Box::new(FixedPrefix(None)), None)
            .await
            .unwrap();
        assert_eq!(handle.ss58_prefix(), DEFAULT_SS58_PREFIX);
    }
}
