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

//! Pure cryptographic primitives for authorizing chain calls with
//! Ethereum-style ECDSA keys: signed-message hashing, recoverable-signature
//! parsing, public-key recovery and address derivation on both sides of the
//! bridge.
//!
//! Everything in this crate is synchronous and deterministic. Network access
//! and signing devices live in `crossig-client`.

pub mod address;
pub mod error;
pub mod keccak;
pub mod message;
pub mod recover;
pub mod signature;
pub mod verify;

pub use address::{decode_ss58, derive_chain_address, derive_ethereum_address, encode_ss58};
pub use error::Error;
pub use message::{hash_call_payload, hash_personal_message, PayloadEncoding};
pub use recover::{
    compress_public_key, decompress_public_key, is_valid_public_key, recover_public_key,
    CompressedPublicKey, UncompressedPublicKey,
};
pub use signature::{canonical_recovery_id, normalize_recovery_id, RecoverableSignature};
pub use verify::{verify_personal_signature, Verification};
