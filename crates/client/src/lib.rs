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

//! Client-side orchestration: call encoding, the external-signer and ledger
//! seams, and the submitter that gates every submission on a local
//! verification of the returned signature.

pub mod account;
pub mod encode;
pub mod handle;
pub mod ledger;
pub mod signer;
pub mod submit;

pub use account::{identify_account, AccountIdentity};
pub use encode::{compact_decode, compact_encode, transfer_call, CallPayload};
pub use handle::{ChainConfig, ChainHandle, DEFAULT_SS58_PREFIX};
pub use ledger::{LedgerClient, LedgerError, RpcLedger, SubmitReceipt};
pub use signer::{new_signer, ExternalSigner, KeySigner, RpcSigner, SignerError};
pub use submit::{submit_signed_call, SubmitError};
