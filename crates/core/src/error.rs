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

use thiserror::Error as ThisError;

/// Errors raised by the signature and address primitives.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum Error {
    /// Input that does not parse as the expected shape: bad hex, wrong
    /// length, failed checksum.
    #[error("invalid format: {0}")]
    InvalidFormat(String),
    /// Signature data that parses but fails cryptographic validation.
    #[error("invalid signature: {0}")]
    InvalidSignature(String),
    /// SS58 network prefix outside the two-byte encodable range.
    #[error("unsupported network prefix: {0}")]
    UnsupportedPrefix(u16),
}
