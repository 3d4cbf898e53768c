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

use alloy_primitives::{FixedBytes, B256};
use k256::ecdsa::{RecoveryId, Signature as K256Signature, VerifyingKey as K256VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::PublicKey as K256PublicKey;

use crate::error::Error;
use crate::signature::RecoverableSignature;

/// SEC1 uncompressed public key: `0x04 ‖ x ‖ y`.
pub type UncompressedPublicKey = FixedBytes<65>;

/// SEC1 compressed public key: parity tag `0x02`/`0x03` followed by `x`.
pub type CompressedPublicKey = FixedBytes<33>;

/// Recovers the public key that produced `signature` over the 32-byte
/// `hash`, in uncompressed form.
///
/// Fails with [`Error::InvalidSignature`] when `r` or `s` is zero or not
/// below the curve order, when the recovery id is not one of the four wire
/// values, or when no curve point matches. A key is only ever returned after
/// the curve arithmetic has validated it.
pub fn recover_public_key(
    hash: &B256,
    signature: &RecoverableSignature,
) -> Result<UncompressedPublicKey, Error> {
    let parsed = K256Signature::from_scalars(signature.r.0, signature.s.0)
        .map_err(|_| Error::InvalidSignature("r or s out of range".to_string()))?;
    let recovery_id = RecoveryId::from_byte(signature.recovery_flag()?)
        .ok_or_else(|| Error::InvalidSignature("invalid recovery id".to_string()))?;
    let verifying_key =
        K256VerifyingKey::recover_from_prehash(hash.as_slice(), &parsed, recovery_id)
            .map_err(|_| {
                Error::InvalidSignature("no curve point matches this signature".to_string())
            })?;

    let point = K256PublicKey::from(&verifying_key).to_encoded_point(false);
    Ok(UncompressedPublicKey::from_slice(point.as_bytes()))
}

/// Compresses an uncompressed key to the 33-byte form: tag `0x02` for even
/// `y`, `0x03` for odd, followed by `x`.
pub fn compress_public_key(
    key: &UncompressedPublicKey,
) -> Result<CompressedPublicKey, Error> {
    let point = parse_point(key.as_slice())?.to_encoded_point(true);
    Ok(CompressedPublicKey::from_slice(point.as_bytes()))
}

/// Expands a compressed key back to the `0x04 ‖ x ‖ y` form.
pub fn decompress_public_key(
    key: &CompressedPublicKey,
) -> Result<UncompressedPublicKey, Error> {
    let point = parse_point(key.as_slice())?.to_encoded_point(false);
    Ok(UncompressedPublicKey::from_slice(point.as_bytes()))
}

/// Whether `bytes` is a valid SEC1 encoding of a secp256k1 point, compressed
/// or uncompressed.
pub fn is_valid_public_key(bytes: &[u8]) -> bool {
    parse_point(bytes).is_ok()
}

fn parse_point(bytes: &[u8]) -> Result<K256PublicKey, Error> {
    K256PublicKey::from_sec1_bytes(bytes)
        .map_err(|_| Error::InvalidFormat("not a secp256k1 point".to_string()))
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;
    use k256::ecdsa::SigningKey;

    use super::*;
    use crate::message::hash_personal_message;
    use crate::signature::canonical_recovery_id;

    const SIGNING_KEY: [u8; 32] =
        hex!("7e9c7ad85df5cdc88659f53e06fb2eb9bab3ebc59083a3190eaf2c730332529c");
    const COMPRESSED: [u8; 33] =
        hex!("023adb1c91e005bf6142615bab5b5541c7ef29fdc7467196af5678e4a6cc8642ea");

    /// Generator point of secp256k1, uncompressed.
    const GENERATOR: [u8; 65] = hex!(
        "0479be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798"
        "483ada7726a3c4655da4fbfc0e1108a8fd17b448a68554199c47d08ffb10d4b8"
    );

    fn signing_key() -> SigningKey {
        SigningKey::from_slice(&SIGNING_KEY).unwrap()
    }

    fn sign_personal(key: &SigningKey, message: &[u8]) -> RecoverableSignature {
        let hash = hash_personal_message(message);
        let (signature, recovery_id) = key.sign_prehash_recoverable(hash.as_slice()).unwrap();
        let mut wire = [0u8; 65];
        wire[..64].copy_from_slice(signature.to_bytes().as_slice());
        wire[64] = canonical_recovery_id(recovery_id.to_byte());
        RecoverableSignature::from_bytes(&wire)
    }

    #[test]
    fn recovers_the_signing_key() {
        let key = signing_key();
        let message = b"authorize transfer 42";
        let signature = sign_personal(&key, message);

        let recovered =
            recover_public_key(&hash_personal_message(message), &signature).unwrap();
        let expected = K256PublicKey::from(key.verifying_key()).to_encoded_point(false);
        assert_eq!(recovered.as_slice(), expected.as_bytes());
        assert_eq!(recovered[0], 0x04);
        assert_eq!(compress_public_key(&recovered).unwrap(), COMPRESSED);
    }

    #[test]
    fn wrong_message_recovers_a_different_key() {
        let key = signing_key();
        let signature = sign_personal(&key, b"authorize transfer 42");

        let recovered =
            recover_public_key(&hash_personal_message(b"authorize transfer 43"), &signature)
                .unwrap();
        assert_ne!(compress_public_key(&recovered).unwrap(), COMPRESSED);
    }

    #[test]
    fn rejects_out_of_range_scalars() {
        let signature = sign_personal(&signing_key(), b"authorize transfer 42");
        let hash = hash_personal_message(b"authorize transfer 42");

        let zero_r = RecoverableSignature { r: B256::ZERO, ..signature.clone() };
        assert!(matches!(
            recover_public_key(&hash, &zero_r),
            Err(Error::InvalidSignature(_))
        ));

        let oversized_s = RecoverableSignature {
            s: B256::repeat_byte(0xff),
            ..signature.clone()
        };
        assert!(matches!(
            recover_public_key(&hash, &oversized_s),
            Err(Error::InvalidSignature(_))
        ));

        let bad_v = RecoverableSignature { v: 29, ..signature };
        assert!(matches!(
            recover_public_key(&hash, &bad_v),
            Err(Error::InvalidSignature(_))
        ));
    }

    #[test]
    fn point_form_conversions_roundtrip() {
        let uncompressed = UncompressedPublicKey::from(GENERATOR);
        let compressed = compress_public_key(&uncompressed).unwrap();
        // the generator's y is even
        assert_eq!(compressed[0], 0x02);
        assert_eq!(decompress_public_key(&compressed).unwrap(), uncompressed);
    }

    #[test]
    fn validates_sec1_encodings() {
        assert!(is_valid_public_key(&GENERATOR));
        assert!(is_valid_public_key(&COMPRESSED));

        // wrong tag
        let mut bad_tag = GENERATOR;
        bad_tag[0] = 0x05;
        assert!(!is_valid_public_key(&bad_tag));

        // y tampered off the curve
        let mut off_curve = GENERATOR;
        off_curve[64] ^= 0x01;
        assert!(!is_valid_public_key(&off_curve));

        // x above the field modulus
        let mut bad_x = [0xffu8; 33];
        bad_x[0] = 0x02;
        assert!(!is_valid_public_key(&bad_x));

        assert!(!is_valid_public_key(&[]));
        assert!(!is_valid_public_key(&GENERATOR[..64]));
    }
}
