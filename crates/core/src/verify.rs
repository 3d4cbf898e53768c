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

use core::str::FromStr;

use alloy_primitives::Address;
use serde::Serialize;

use crate::address::derive_ethereum_address;
use crate::error::Error;
use crate::message::hash_personal_message;
use crate::recover::{recover_public_key, UncompressedPublicKey};
use crate::signature::RecoverableSignature;

/// Outcome of checking a signature against a claimed address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verification {
    /// Whether the recovered signer is the claimed address.
    pub is_valid: bool,
    /// Address derived from the recovered key.
    pub recovered_address: Address,
    /// The recovered key itself, uncompressed.
    pub recovered_key: UncompressedPublicKey,
}

/// Checks that `signature_hex` over `message` was produced by the key behind
/// `claimed_address`.
///
/// Addresses are compared in their parsed 20-byte form, so hex casing on
/// either side never affects the outcome. A signature from the wrong key, or
/// over different bytes, reports `is_valid == false`; `Err` is reserved for
/// input that does not parse or recover at all.
pub fn verify_personal_signature(
    claimed_address: &str,
    message: &[u8],
    signature_hex: &str,
) -> Result<Verification, Error> {
    let claimed = Address::from_str(claimed_address)
        .map_err(|err| Error::InvalidFormat(format!("claimed address: {err}")))?;
    let signature = RecoverableSignature::parse(signature_hex)?;

    let hash = hash_personal_message(message);
    let recovered_key = recover_public_key(&hash, &signature)?;
    let recovered_address = derive_ethereum_address(&recovered_key)?;

    Ok(Verification {
        is_valid: recovered_address == claimed,
        recovered_address,
        recovered_key,
    })
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;
    use k256::ecdsa::SigningKey;

    use super::*;
    use crate::signature::canonical_recovery_id;

    const SIGNING_KEY: [u8; 32] =
        hex!("7e9c7ad85df5cdc88659f53e06fb2eb9bab3ebc59083a3190eaf2c730332529c");
    const MESSAGE: &[u8] = b"authorize transfer 42";

    fn signed_message() -> (Address, String) {
        let key = SigningKey::from_slice(&SIGNING_KEY).unwrap();
        let hash = hash_personal_message(MESSAGE);
        let (signature, recovery_id) = key.sign_prehash_recoverable(hash.as_slice()).unwrap();

        let mut wire = [0u8; 65];
        wire[..64].copy_from_slice(signature.to_bytes().as_slice());
        wire[64] = canonical_recovery_id(recovery_id.to_byte());
        let signature = RecoverableSignature::from_bytes(&wire);

        let point = key.verifying_key().to_encoded_point(false);
        let key = UncompressedPublicKey::from_slice(point.as_bytes());
        (derive_ethereum_address(&key).unwrap(), signature.to_hex())
    }

    #[test]
    fn accepts_the_real_signer() {
        let (address, signature) = signed_message();
        let report =
            verify_personal_signature(&address.to_string(), MESSAGE, &signature).unwrap();
        assert!(report.is_valid);
        assert_eq!(report.recovered_address, address);
    }

    #[test]
    fn address_comparison_ignores_hex_case() {
        let (address, signature) = signed_message();
        for claimed in [
            format!("{address}").to_lowercase(),
            format!("{address}").to_uppercase().replace("0X", "0x"),
        ] {
            let report =
                verify_personal_signature(&claimed, MESSAGE, &signature).unwrap();
            assert!(report.is_valid);
        }
    }

    #[test]
    fn mismatches_report_false_instead_of_failing() {
        let (address, signature) = signed_message();

        let stranger = "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf";
        let report = verify_personal_signature(stranger, MESSAGE, &signature).unwrap();
        assert!(!report.is_valid);
        assert_eq!(report.recovered_address, address);

        let report =
            verify_personal_signature(&address.to_string(), b"tampered", &signature)
                .unwrap();
        assert!(!report.is_valid);
        assert_ne!(report.recovered_address, address);
    }

    #[test]
    fn malformed_input_is_an_error() {
        let (address, signature) = signed_message();
        assert!(matches!(
            verify_personal_signature("not an address", MESSAGE, &signature),
            Err(Error::InvalidFormat(_))
        ));
        assert!(matches!(
            verify_personal_signature(&address.to_string(), MESSAGE, "0xbeef"),
            Err(Error::InvalidFormat(_))
        ));
    }
}
