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

use alloy_primitives::Address;
use blake2::digest::consts::U32;
use blake2::{Blake2b, Blake2b512, Digest};

use crate::error::Error;
use crate::keccak::keccak;
use crate::recover::{is_valid_public_key, CompressedPublicKey, UncompressedPublicKey};

type Blake2b256 = Blake2b<U32>;

/// Domain tag hashed into every SS58 checksum.
const CHECKSUM_TAG: &[u8] = b"SS58PRE";

/// Largest network prefix the two-byte SS58 form can carry.
const MAX_NETWORK_PREFIX: u16 = 0x3fff;

/// Derives the Ethereum address of an uncompressed key: the last 20 bytes of
/// `keccak256(key)` with the SEC1 tag stripped.
pub fn derive_ethereum_address(key: &UncompressedPublicKey) -> Result<Address, Error> {
    if !is_valid_public_key(key.as_slice()) {
        return Err(Error::InvalidFormat(
            "not an uncompressed secp256k1 key".to_string(),
        ));
    }
    let hash = keccak(&key[1..]);
    Ok(Address::from_slice(&hash[12..]))
}

/// Derives the chain-native address of an ECDSA account: the SS58 encoding
/// of `blake2b_256(compressed key)` under `prefix`.
pub fn derive_chain_address(
    key: &CompressedPublicKey,
    prefix: u16,
) -> Result<String, Error> {
    if !is_valid_public_key(key.as_slice()) {
        return Err(Error::InvalidFormat(
            "not a compressed secp256k1 key".to_string(),
        ));
    }
    let account: [u8; 32] = Blake2b256::digest(key).into();
    encode_ss58(&account, prefix)
}

/// SS58-encodes a 32-byte account id:
/// `base58(prefix bytes ‖ account ‖ blake2b_512("SS58PRE" ‖ payload)[..2])`.
///
/// Prefixes `0..=63` take the one-byte form and `64..=16383` the two-byte
/// form; anything larger fails with [`Error::UnsupportedPrefix`].
pub fn encode_ss58(account: &[u8; 32], prefix: u16) -> Result<String, Error> {
    let mut payload = prefix_bytes(prefix)?;
    payload.extend_from_slice(account);
    let checksum = checksum(&payload);
    payload.extend_from_slice(&checksum);
    Ok(bs58::encode(payload).into_string())
}

/// Decodes an SS58 address back into its network prefix and account id,
/// validating the base58 alphabet, payload length, prefix form and checksum.
pub fn decode_ss58(address: &str) -> Result<(u16, [u8; 32]), Error> {
    let data = bs58::decode(address)
        .into_vec()
        .map_err(|err| Error::InvalidFormat(format!("ss58 base58: {err}")))?;

    let (prefix, prefix_len) = match data.first() {
        Some(&simple @ 0..=63) => (simple as u16, 1),
        Some(&first @ 64..=127) => {
            let second = *data.get(1).ok_or_else(|| {
                Error::InvalidFormat("truncated ss58 prefix".to_string())
            })?;
            let lower = (first << 2) | (second >> 6);
            let upper = second & 0b0011_1111;
            ((lower as u16) | ((upper as u16) << 8), 2)
        }
        _ => {
            return Err(Error::InvalidFormat(
                "ss58 prefix byte out of range".to_string(),
            ))
        }
    };

    if data.len() != prefix_len + 32 + 2 {
        return Err(Error::InvalidFormat(format!(
            "ss58 payload of {} bytes",
            data.len()
        )));
    }
    let (payload, expected) = data.split_at(data.len() - 2);
    if checksum(payload) != expected[..2] {
        return Err(Error::InvalidFormat("ss58 checksum mismatch".to_string()));
    }

    let mut account = [0u8; 32];
    account.copy_from_slice(&payload[prefix_len..]);
    Ok((prefix, account))
}

fn prefix_bytes(prefix: u16) -> Result<Vec<u8>, Error> {
    match prefix {
        0..=63 => Ok(vec![prefix as u8]),
        64..=MAX_NETWORK_PREFIX => {
            // weird bit arrangement fixed by the registry format
            let first = (((prefix & 0b1111_1100) >> 2) as u8) | 0b0100_0000;
            let second = ((prefix >> 8) as u8) | (((prefix & 0b11) as u8) << 6);
            Ok(vec![first, second])
        }
        _ => Err(Error::UnsupportedPrefix(prefix)),
    }
}

fn checksum(payload: &[u8]) -> [u8; 2] {
    let mut hasher = Blake2b512::new();
    hasher.update(CHECKSUM_TAG);
    hasher.update(payload);
    let digest = hasher.finalize();
    [digest[0], digest[1]]
}

#[cfg(test)]
mod tests {
    use alloy_primitives::address;
    use hex_literal::hex;

    use super::*;

    /// Account id of a well-known development key.
    const DEV_ACCOUNT: [u8; 32] =
        hex!("d43593c715fdd31c61141abd04a99fd6822c8558854ccde39a5684e7a56da27d");
    const DEV_ADDRESS: &str = "5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY";

    const GENERATOR: [u8; 65] = hex!(
        "0479be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798"
        "483ada7726a3c4655da4fbfc0e1108a8fd17b448a68554199c47d08ffb10d4b8"
    );
    const COMPRESSED: [u8; 33] =
        hex!("023adb1c91e005bf6142615bab5b5541c7ef29fdc7467196af5678e4a6cc8642ea");

    #[test]
    fn ethereum_address_of_known_key() {
        // the generator is the public key of the scalar 1
        let address = derive_ethereum_address(&GENERATOR.into()).unwrap();
        assert_eq!(address, address!("7E5F4552091A69125d5DfCb7b8C2659029395Bdf"));
    }

    #[test]
    fn ethereum_address_rejects_invalid_keys() {
        let mut bad_tag = GENERATOR;
        bad_tag[0] = 0x02;
        assert!(matches!(
            derive_ethereum_address(&bad_tag.into()),
            Err(Error::InvalidFormat(_))
        ));
    }

    #[test]
    fn encodes_known_account() {
        assert_eq!(encode_ss58(&DEV_ACCOUNT, 42).unwrap(), DEV_ADDRESS);
    }

    #[test]
    fn decode_inverts_encode() {
        assert_eq!(decode_ss58(DEV_ADDRESS).unwrap(), (42, DEV_ACCOUNT));

        for prefix in [0u16, 5, 63, 64, 69, 255, 4242, MAX_NETWORK_PREFIX] {
            let encoded = encode_ss58(&DEV_ACCOUNT, prefix).unwrap();
            assert_eq!(decode_ss58(&encoded).unwrap(), (prefix, DEV_ACCOUNT));
        }
    }

    #[test]
    fn rejects_prefixes_above_the_two_byte_range() {
        assert_eq!(
            encode_ss58(&DEV_ACCOUNT, MAX_NETWORK_PREFIX + 1),
            Err(Error::UnsupportedPrefix(MAX_NETWORK_PREFIX + 1))
        );
    }

    #[test]
    fn decode_rejects_corruption() {
        // flip one character inside the account portion
        let mut corrupted: Vec<char> = DEV_ADDRESS.chars().collect();
        corrupted[20] = if corrupted[20] == '9' { '8' } else { '9' };
        let corrupted: String = corrupted.into_iter().collect();
        assert!(matches!(
            decode_ss58(&corrupted),
            Err(Error::InvalidFormat(_))
        ));

        // non-base58 characters and truncated payloads
        assert!(matches!(decode_ss58("l0O"), Err(Error::InvalidFormat(_))));
        assert!(matches!(decode_ss58("5Grwva"), Err(Error::InvalidFormat(_))));
        assert!(matches!(decode_ss58(""), Err(Error::InvalidFormat(_))));
    }

    #[test]
    fn chain_address_tracks_the_key_and_prefix() {
        let compressed = CompressedPublicKey::from(COMPRESSED);
        let default_net = derive_chain_address(&compressed, 42).unwrap();
        assert_eq!(derive_chain_address(&compressed, 42).unwrap(), default_net);
        assert_ne!(derive_chain_address(&compressed, 5).unwrap(), default_net);

        let generator = CompressedPublicKey::from(hex!(
            "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798"
        ));
        assert_ne!(derive_chain_address(&generator, 42).unwrap(), default_net);

        let account: [u8; 32] = Blake2b256::digest(compressed).into();
        assert_eq!(decode_ss58(&default_net).unwrap(), (42, account));
    }
}
