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

use std::fmt::{Display, Formatter};

use clap::ValueEnum;
use crossig_client::DEFAULT_SS58_PREFIX;

#[derive(clap::Parser, Debug, Clone)]
#[command(name = "crossig")]
#[command(bin_name = "crossig")]
#[command(author, version, about, long_about = None)]
pub enum Cli {
    /// Derive the Ethereum and chain addresses of a public key
    Derive(DeriveArgs),
    /// Check a signature against a claimed Ethereum address
    Verify(VerifyArgs),
    /// Sign a login message and report the signer's identities
    Sign(SignArgs),
    /// Sign an encoded call and submit it to a chain node
    Submit(SubmitArgs),
}

#[derive(clap::Args, Debug, Clone)]
pub struct NetworkArgs {
    #[clap(short = 'n', long, require_equals = true, value_enum)]
    /// Which network's address prefix to use.
    pub network: Option<Network>,

    #[clap(long, require_equals = true)]
    /// Explicit SS58 prefix, overriding --network
    pub ss58_prefix: Option<u16>,
}

impl NetworkArgs {
    /// The prefix fixed by the command line, if any.
    pub fn configured_prefix(&self) -> Option<u16> {
        self.ss58_prefix
            .or_else(|| self.network.map(|network| network.ss58_prefix()))
    }

    /// The prefix for offline commands, which cannot ask the chain.
    pub fn offline_prefix(&self) -> u16 {
        self.configured_prefix().unwrap_or(DEFAULT_SS58_PREFIX)
    }
}

#[derive(Debug, Clone, Copy, clap::ValueEnum, Hash, Ord, PartialOrd, Eq, PartialEq)]
pub enum Network {
    /// Generic Substrate chain
    Substrate,
    /// Polkadot
    Polkadot,
    /// Kusama
    Kusama,
    /// Astar
    Astar,
}

impl Network {
    pub fn ss58_prefix(&self) -> u16 {
        match self {
            Network::Substrate => 42,
            Network::Polkadot => 0,
            Network::Kusama => 2,
            Network::Astar => 5,
        }
    }
}

impl Display for Network {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // use the name of the clap::ValueEnum
        let val = self.to_possible_value().unwrap();
        write!(f, "{}", val.get_name())
    }
}

#[derive(clap::Args, Debug, Clone)]
pub struct SignerArgs {
    #[clap(short = 'k', long, require_equals = true, env = "CROSSIG_SIGNING_KEY", hide_env_values = true)]
    /// Hex-encoded secp256k1 signing key (development signer)
    pub signing_key: Option<String>,

    #[clap(short = 's', long, require_equals = true)]
    /// Ethereum JSON-RPC endpoint exposing personal_sign
    pub signer_rpc: Option<String>,

    #[clap(long, require_equals = true, default_value_t = 60)]
    /// Deadline in seconds for interactive signature requests
    pub sign_timeout: u64,

    #[clap(short = 'a', long, require_equals = true)]
    /// Ethereum account asked to sign; defaults to the signing key's address
    pub account: Option<String>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct DeriveArgs {
    #[clap(short = 'p', long, require_equals = true)]
    /// Public key hex, compressed (33 bytes) or uncompressed (65 bytes)
    pub public_key: String,

    #[clap(flatten)]
    pub network: NetworkArgs,
}

#[derive(clap::Args, Debug, Clone)]
pub struct VerifyArgs {
    #[clap(long, require_equals = true)]
    /// Claimed Ethereum address
    pub address: String,

    #[clap(short = 'm', long, require_equals = true)]
    /// Message text that was signed
    pub message: Option<String>,

    #[clap(long, require_equals = true)]
    /// Message as hex bytes, alternative to --message
    pub message_hex: Option<String>,

    #[clap(short = 'g', long, require_equals = true)]
    /// The 65-byte hex signature
    pub signature: String,
}

#[derive(clap::Args, Debug, Clone)]
pub struct SignArgs {
    #[clap(flatten)]
    pub signer: SignerArgs,

    #[clap(flatten)]
    pub network: NetworkArgs,

    #[clap(short = 'm', long, require_equals = true, default_value = "Sign in")]
    /// Login message to sign
    pub message: String,
}

#[derive(clap::Args, Debug, Clone)]
pub struct SubmitArgs {
    #[clap(flatten)]
    pub signer: SignerArgs,

    #[clap(flatten)]
    pub network: NetworkArgs,

    #[clap(short = 'u', long, require_equals = true, default_value = "http://127.0.0.1:9933")]
    /// JSON-RPC endpoint of the chain node
    pub node_url: String,

    #[clap(long, require_equals = true)]
    /// Sender's chain address (SS58)
    pub sender: String,

    #[clap(short = 'c', long, require_equals = true)]
    /// Bare call body, hex
    pub call: Option<String>,

    #[clap(short = 'x', long, require_equals = true)]
    /// Unsigned transaction wrapper hex, alternative to --call
    pub extrinsic: Option<String>,

    #[clap(long, require_equals = true)]
    /// Bridge pallet index on the target runtime
    pub pallet_index: u8,

    #[clap(long, require_equals = true)]
    /// Bridge call index within the pallet
    pub call_index: u8,

    #[clap(long, default_value_t = false)]
    /// Sign the hex text of the encoded call instead of its raw bytes
    pub hex_message: bool,
}
