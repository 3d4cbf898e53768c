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

//! Canonical call-payload encoding.
//!
//! The bytes presented for signing are the SCALE compact length of the bare
//! call body followed by the body itself. Submission-time wrapper metadata
//! never enters the signed bytes.

use crossig_core::Error;
use serde::{Deserialize, Serialize};

/// Version byte of an unsigned v4 transaction wrapper.
pub(crate) const UNSIGNED_EXTRINSIC_V4: u8 = 0x04;

/// Version byte of a signed v4 transaction wrapper.
const SIGNED_EXTRINSIC_V4: u8 = 0x84;

/// One chain call, held as its bare body: pallet index, call index and the
/// SCALE-encoded arguments.
///
/// The canonical bytes of [`to_bytes`](Self::to_bytes) carry no nonce, era or
/// any other per-submission field, so a signature over them stays valid for
/// resubmission. Replay protection, where required, belongs to the ledger
/// layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallPayload {
    body: Vec<u8>,
}

impl CallPayload {
    /// Wraps a bare call body.
    pub fn from_call(body: &[u8]) -> Result<Self, Error> {
        if body.is_empty() {
            return Err(Error::InvalidFormat("empty call body".to_string()));
        }
        Ok(CallPayload { body: body.to_vec() })
    }

    /// Extracts the call body from an unsigned v4 transaction wrapper,
    /// `compact(len) ‖ 0x04 ‖ body`, dropping the wrapper version byte.
    pub fn from_extrinsic(bytes: &[u8]) -> Result<Self, Error> {
        let inner = strip_length_prefix(bytes)?;
        match inner.split_first() {
            Some((&UNSIGNED_EXTRINSIC_V4, body)) => Self::from_call(body),
            Some((&SIGNED_EXTRINSIC_V4, _)) => Err(Error::InvalidFormat(
                "signed transaction wrapper, expected the unsigned form".to_string(),
            )),
            Some((version, _)) => Err(Error::InvalidFormat(format!(
                "unknown transaction wrapper version {version:#04x}"
            ))),
            None => Err(Error::InvalidFormat(
                "empty transaction wrapper".to_string(),
            )),
        }
    }

    /// Parses bytes already in the canonical `compact(len) ‖ body` form.
    ///
    /// Feeding [`to_bytes`](Self::to_bytes) output back through here yields
    /// the same payload, which keeps re-encoding idempotent.
    pub fn from_encoded(bytes: &[u8]) -> Result<Self, Error> {
        Self::from_call(strip_length_prefix(bytes)?)
    }

    /// The bare call body.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// The canonical signable bytes: `compact(len(body)) ‖ body`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = compact_encode(self.body.len() as u64);
        out.extend_from_slice(&self.body);
        out
    }
}

/// Builds the body of a plain balance transfer:
/// `pallet ‖ call ‖ dest ‖ compact(amount)`.
pub fn transfer_call(
    pallet_index: u8,
    call_index: u8,
    dest: &[u8; 32],
    amount: u128,
) -> CallPayload {
    let mut body = vec![pallet_index, call_index];
    body.extend_from_slice(dest);
    body.extend_from_slice(&compact_encode_wide(amount));
    CallPayload { body }
}

/// Validates and removes a compact length prefix, which must cover the
/// remaining bytes exactly.
fn strip_length_prefix(bytes: &[u8]) -> Result<&[u8], Error> {
    let (length, consumed) = compact_decode(bytes)?;
    let rest = &bytes[consumed..];
    if length != rest.len() as u64 {
        return Err(Error::InvalidFormat(format!(
            "length prefix {length} over {} remaining bytes",
            rest.len()
        )));
    }
    Ok(rest)
}

/// SCALE compact encoding of an unsigned integer.
pub fn compact_encode(value: u64) -> Vec<u8> {
    compact_encode_wide(value as u128)
}

fn compact_encode_wide(value: u128) -> Vec<u8> {
    match value {
        0..=0x3f => vec![(value as u8) << 2],
        0x40..=0x3fff => (((value as u16) << 2) | 0b01).to_le_bytes().to_vec(),
        0x4000..=0x3fff_ffff => (((value as u32) << 2) | 0b10).to_le_bytes().to_vec(),
        _ => {
            let bytes = value.to_le_bytes();
            let len = 16 - value.leading_zeros() as usize / 8;
            let mut out = Vec::with_capacity(1 + len);
            out.push(0b11 | ((len as u8 - 4) << 2));
            out.extend_from_slice(&bytes[..len]);
            out
        }
    }
}

/// Decodes a SCALE compact integer, returning the value and the number of
/// bytes consumed. Big-integer mode is supported up to the eight bytes a
/// `u64` can hold.
pub fn compact_decode(bytes: &[u8]) -> Result<(u64, usize), Error> {
    let first = *bytes
        .first()
        .ok_or_else(|| Error::InvalidFormat("empty compact integer".to_string()))?;
    match first & 0b11 {
        0b00 => Ok(((first >> 2) as u64, 1)),
        0b01 => Ok(((u16::from_le_bytes(take::<2>(bytes)?) >> 2) as u64, 2)),
        0b10 => Ok(((u32::from_le_bytes(take::<4>(bytes)?) >> 2) as u64, 4)),
        _ => {
            let len = (first >> 2) as usize + 4;
            if len > 8 {
                return Err(Error::InvalidFormat(format!(
                    "compact integer of {len} bytes overflows u64"
                )));
            }
            let raw = bytes.get(1..1 + len).ok_or_else(|| {
                Error::InvalidFormat("truncated compact integer".to_string())
            })?;
            let mut padded = [0u8; 8];
            padded[..len].copy_from_slice(raw);
            Ok((u64::from_le_bytes(padded), 1 + len))
        }
    }
}

fn take<const N: usize>(bytes: &[u8]) -> Result<[u8; N], Error> {
    bytes
        .get(..N)
        .and_then(|raw| raw.try_into().ok())
        .ok_or_else(|| Error::InvalidFormat("truncated compact integer".to_string()))
}
