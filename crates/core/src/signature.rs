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

use core::fmt;

use alloy_primitives::{hex, B256};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Offset of the legacy Electrum-style recovery id convention.
const RECOVERY_ID_OFFSET: u8 = 27;

/// A recoverable secp256k1 signature in the 65-byte `r ‖ s ‖ v` wire layout.
///
/// `v` is stored exactly as it appeared on the wire, so parsing followed by
/// serialization reproduces any well-formed input byte for byte. Consumers
/// interpret `v` through [`normalize_recovery_id`] at the point of use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoverableSignature {
    /// ECDSA scalar `r`.
    pub r: B256,
    /// ECDSA scalar `s`.
    pub s: B256,
    /// Recovery indicator, verbatim.
    pub v: u8,
}

impl RecoverableSignature {
    /// Parses the hex rendering of the 65-byte wire layout.
    ///
    /// A `0x` prefix is optional and hex case is ignored. Anything that does
    /// not decode to exactly 65 bytes fails with [`Error::InvalidFormat`].
    pub fn parse(signature: &str) -> Result<Self, Error> {
        let decoded = hex::decode(signature)
            .map_err(|err| Error::InvalidFormat(format!("signature hex: {err}")))?;
        let bytes: [u8; 65] = decoded.try_into().map_err(|decoded: Vec<u8>| {
            Error::InvalidFormat(format!(
                "signature must be 65 bytes, got {}",
                decoded.len()
            ))
        })?;
        Ok(Self::from_bytes(&bytes))
    }

    /// Splits a 65-byte `r ‖ s ‖ v` buffer into its components.
    pub fn from_bytes(bytes: &[u8; 65]) -> Self {
        RecoverableSignature {
            r: B256::from_slice(&bytes[..32]),
            s: B256::from_slice(&bytes[32..64]),
            v: bytes[64],
        }
    }

    /// Reassembles the 65-byte wire layout.
    pub fn to_bytes(&self) -> [u8; 65] {
        let mut out = [0u8; 65];
        out[..32].copy_from_slice(self.r.as_slice());
        out[32..64].copy_from_slice(self.s.as_slice());
        out[64] = self.v;
        out
    }

    /// Renders the `0x`-prefixed lowercase hex form, the exact inverse of
    /// [`parse`](Self::parse) for such input.
    pub fn to_hex(&self) -> String {
        hex::encode_prefixed(self.to_bytes())
    }

    /// The recovery id of this signature under the `{0, 1}` convention.
    pub fn recovery_flag(&self) -> Result<u8, Error> {
        normalize_recovery_id(self.v)
    }
}

impl fmt::Display for RecoverableSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Maps a wire recovery indicator onto the `{0, 1}` convention.
///
/// Both the modern `{0, 1}` and the legacy `{27, 28}` conventions appear on
/// the wire. A convention mismatch does not fail recovery, it recovers a
/// different valid-looking key, so this mapping and its inverse
/// [`canonical_recovery_id`] are the only places the two conventions meet.
pub fn normalize_recovery_id(v: u8) -> Result<u8, Error> {
    match v {
        0 | 1 => Ok(v),
        27 | 28 => Ok(v - RECOVERY_ID_OFFSET),
        other => Err(Error::InvalidSignature(format!(
            "recovery id {other} is not one of 0, 1, 27, 28"
        ))),
    }
}

/// Maps a `{0, 1}` recovery flag onto the canonical `{27, 28}` wire form
/// emitted by Ethereum signers.
pub fn canonical_recovery_id(flag: u8) -> u8 {
    debug_assert!(flag <= 1);
    flag + RECOVERY_ID_OFFSET
}
