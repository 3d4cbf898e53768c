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

//! The signed-call pipeline: request a signature, verify it locally, submit.

use alloy_primitives::Address;
use crossig_core::{
    compress_public_key, decode_ss58, derive_chain_address, hash_personal_message,
    recover_public_key, Error as CryptoError, PayloadEncoding, RecoverableSignature,
};
use log::{debug, info, warn};
use thiserror::Error as ThisError;

use crate::encode::CallPayload;
use crate::handle::ChainHandle;
use crate::ledger::{LedgerError, SubmitReceipt};
use crate::signer::{ExternalSigner, SignerError};

/// Failures of the signing and submission pipeline.
#[derive(Debug, ThisError)]
pub enum SubmitError {
    /// Malformed or cryptographically invalid input.
    #[error(transparent)]
    Crypto(#[from] CryptoError),
    /// The signature came from a key other than the one behind the sender
    /// address. Nothing was submitted.
    #[error("signer mismatch: expected {expected}, signature resolves to {recovered}")]
    SignerMismatch { expected: String, recovered: String },
    /// The user declined the signature request.
    #[error("signature request rejected by user")]
    UserRejected,
    /// The signer gave no answer within its deadline.
    #[error("timed out waiting for the signature")]
    Timeout,
    /// The node rejected the call; the text is the node's, verbatim.
    #[error("submission rejected: {0}")]
    SubmissionRejected(String),
    /// Transport failure talking to a collaborator.
    #[error("rpc failure: {0}")]
    Rpc(String),
}

impl From<SignerError> for SubmitError {
    fn from(err: SignerError) -> Self {
        match err {
            SignerError::Rejected => SubmitError::UserRejected,
            SignerError::Timeout => SubmitError::Timeout,
            SignerError::Rpc(message) => SubmitError::Rpc(message),
        }
    }
}

impl From<LedgerError> for SubmitError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Rejected(text) => SubmitError::SubmissionRejected(text),
            LedgerError::Invalid(err) => SubmitError::Crypto(err),
            LedgerError::Rpc(message) => SubmitError::Rpc(message),
        }
    }
}

/// Requests a signature over the canonical call bytes, verifies locally that
/// it resolves to `sender_chain_address`, and only then submits the call.
///
/// `signer_account` is the Ethereum account asked to sign. The local check
/// recovers the signing key, derives its chain address under the session
/// prefix and compares it with the claimed sender; on a mismatch the call
/// fails with [`SubmitError::SignerMismatch`] and the ledger is never
/// reached. A verification failure here is final, there is nothing to retry.
pub async fn submit_signed_call(
    handle: &ChainHandle,
    signer: &dyn ExternalSigner,
    signer_account: Address,
    sender_chain_address: &str,
    call: &CallPayload,
    encoding: PayloadEncoding,
) -> Result<SubmitReceipt, SubmitError> {
    // reject malformed sender identities before involving the signer
    decode_ss58(sender_chain_address)?;

    let encoded = call.to_bytes();
    let preimage = encoding.preimage(&encoded);

    info!(
        "Requesting signature over {} bytes from {signer_account}",
        preimage.len()
    );
    let signature_hex = signer.sign(signer_account, &preimage).await?;
    let signature = RecoverableSignature::parse(&signature_hex)?;

    let hash = hash_personal_message(&preimage);
    let recovered = recover_public_key(&hash, &signature)?;
    let compressed = compress_public_key(&recovered)?;
    let recovered_chain_address = derive_chain_address(&compressed, handle.ss58_prefix())?;
    if recovered_chain_address != sender_chain_address {
        warn!("Refusing to submit: signature resolves to {recovered_chain_address}");
        return Err(SubmitError::SignerMismatch {
            expected: sender_chain_address.to_string(),
            recovered: recovered_chain_address,
        });
    }
    debug!("Signature verified for {sender_chain_address}");

    let receipt = handle
        .ledger()
        .submit(call, sender_chain_address, &signature)
        .await?;
    info!("Submitted as {}", receipt.extrinsic_hash);
    Ok(receipt)
}
