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

use alloy_primitives::{hex, B256};

use crate::keccak::keccak;

/// Prefix of the Ethereum signed-message envelope. It domain-separates
/// personal messages from transaction payloads.
const MESSAGE_PREFIX: &[u8] = b"\x19Ethereum Signed Message:\n";

/// How a call payload is rendered before entering the signed-message hash.
///
/// The raw bytes and their hex rendering hash differently and therefore
/// authenticate different signers. Which form a deployment signs is fixed by
/// configuration; it is never inferred from the payload content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PayloadEncoding {
    /// Sign the payload bytes as they are.
    #[default]
    Raw,
    /// Sign the UTF-8 bytes of the `0x`-prefixed lowercase hex rendering.
    HexText,
}

impl PayloadEncoding {
    /// Materializes the exact byte string presented to the signer.
    pub fn preimage(&self, payload: &[u8]) -> Vec<u8> {
        match self {
            PayloadEncoding::Raw => payload.to_vec(),
            PayloadEncoding::HexText => hex::encode_prefixed(payload).into_bytes(),
        }
    }
}

/// Computes `keccak256(prefix ‖ len ‖ message)` with the payload length
/// rendered as a decimal string, matching `personal_sign` on Ethereum nodes.
pub fn hash_personal_message(message: &[u8]) -> B256 {
    let mut preimage =
        Vec::with_capacity(MESSAGE_PREFIX.len() + 20 + message.len());
    preimage.extend_from_slice(MESSAGE_PREFIX);
    preimage.extend_from_slice(message.len().to_string().as_bytes());
    preimage.extend_from_slice(message);
    keccak(preimage).into()
}

/// Hashes a call payload under the configured rendering.
pub fn hash_call_payload(payload: &[u8], encoding: PayloadEncoding) -> B256 {
    hash_personal_message(&encoding.preimage(payload))
}
