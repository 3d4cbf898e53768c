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
use crossig_core::{
    compress_public_key, derive_chain_address, derive_ethereum_address, hash_personal_message,
    recover_public_key, CompressedPublicKey, RecoverableSignature,
};
use log::debug;
use serde::Serialize;

use crate::signer::ExternalSigner;
use crate::submit::SubmitError;

/// The identities behind one controlled Ethereum key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountIdentity {
    /// Compressed public key recovered from the login signature.
    pub public_key: CompressedPublicKey,
    /// Ethereum address of that key.
    pub ethereum_address: Address,
    /// Chain-native address of that key under the session prefix.
    pub chain_address: String,
    /// The login signature that proved control, 65-byte hex.
    pub signature: String,
}

/// Obtains a signature over `login_message` and reports the identities of
/// the key behind `account`.
///
/// There is no way to read a public key out of a wallet, so control is
/// established the same way calls are authorized: sign, recover, compare.
/// A signature recovering to a key that does not own `account` fails with
/// [`SubmitError::SignerMismatch`].
pub async fn identify_account(
    signer: &dyn ExternalSigner,
    account: Address,
    login_message: &[u8],
    ss58_prefix: u16,
) -> Result<AccountIdentity, SubmitError> {
    let signature_hex = signer.sign(account, login_message).await?;
    let signature = RecoverableSignature::parse(&signature_hex)?;

    let hash = hash_personal_message(login_message);
    let recovered = recover_public_key(&hash, &signature)?;
    let ethereum_address = derive_ethereum_address(&recovered)?;
    if ethereum_address != account {
        return Err(SubmitError::SignerMismatch {
            expected: account.to_string(),
            recovered: ethereum_address.to_string(),
        });
    }

    let public_key = compress_public_key(&recovered)?;
    let chain_address = derive_chain_address(&public_key, ss58_prefix)?;
    debug!("Account {account} maps to {chain_address}");

    Ok(AccountIdentity {
        public_key,
        ethereum_address,
        chain_address,
        signature: signature.to_hex(),
    })
}

#[cfg(test)]
mod tests {
    use alloy_primitives::hex;

    use super::*;
    use crate::signer::KeySigner;

    const KEY_HEX: &str = "7e9c7ad85df5cdc88659f53e06fb2eb9bab3ebc59083a3190eaf2c730332529c";
    const COMPRESSED_HEX: &str =
        "0x023adb1c91e005bf6142615bab5b5541c7ef29fdc7467196af5678e4a6cc8642ea";

    #[tokio::test]
    async fn reports_all_identities_of_the_key() {
        let signer = KeySigner::new(KEY_HEX).unwrap();
        let identity = identify_account(&signer, signer.address(), b"sign in", 42)
            .await
            .unwrap();

        assert_eq!(hex::encode_prefixed(identity.public_key), COMPRESSED_HEX);
        assert_eq!(identity.ethereum_address, signer.address());
        assert_eq!(
            identity.chain_address,
            derive_chain_address(&identity.public_key, 42).unwrap()
        );
        assert!(identity.chain_address.starts_with('5'));

        // the reported signature is the one that proved control
        let report = crossig_core::verify_personal_signature(
            &signer.address().to_string(),
            b"sign in",
            &identity.signature,
        )
        .unwrap();
        assert!(report.is_valid);
    }

    #[tokio::test]
    async fn prefix_changes_only_the_chain_address() {
        let signer = KeySigner::new(KEY_HEX).unwrap();
        let testnet = identify_account(&signer, signer.address(), b"sign in", 42)
            .await
            .unwrap();
        let mainnet = identify_account(&signer, signer.address(), b"sign in", 5)
            .await
            .unwrap();

        assert_eq!(testnet.public_key, mainnet.public_key);
        assert_eq!(testnet.ethereum_address, mainnet.ethereum_address);
        assert_ne!(testnet.chain_address, mainnet.chain_address);
    }
}
