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

use std::str::FromStr;
use std::time::Duration;

use alloy_primitives::{hex, Address};
use anyhow::{bail, Context};
use clap::Parser;
use crossig_client::{
    identify_account, new_signer, submit_signed_call, CallPayload, ChainConfig, ChainHandle,
    ExternalSigner,
};
use crossig_core::{
    compress_public_key, decompress_public_key, derive_chain_address, derive_ethereum_address,
    verify_personal_signature, CompressedPublicKey, PayloadEncoding, UncompressedPublicKey,
};
use log::info;

use crate::cli::{Cli, DeriveArgs, SignArgs, SignerArgs, SubmitArgs, VerifyArgs};

mod cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    use env_logger::Env;

    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli {
        Cli::Derive(args) => derive(args),
        Cli::Verify(args) => verify(args),
        Cli::Sign(args) => sign(args).await,
        Cli::Submit(args) => submit(args).await,
    }
}

fn derive(args: DeriveArgs) -> anyhow::Result<()> {
    let bytes = hex::decode(&args.public_key).context("public key hex")?;
    let (compressed, uncompressed) = match bytes.len() {
        33 => {
            let compressed = CompressedPublicKey::from_slice(&bytes);
            (compressed, decompress_public_key(&compressed)?)
        }
        65 => {
            let uncompressed = UncompressedPublicKey::from_slice(&bytes);
            (compress_public_key(&uncompressed)?, uncompressed)
        }
        n => bail!("public key must be 33 or 65 bytes, got {n}"),
    };

    println!("public key:       {compressed}");
    println!("ethereum address: {}", derive_ethereum_address(&uncompressed)?);
    println!(
        "chain address:    {}",
        derive_chain_address(&compressed, args.network.offline_prefix())?
    );
    Ok(())
}

fn verify(args: VerifyArgs) -> anyhow::Result<()> {
    let message = message_bytes(args.message.as_deref(), args.message_hex.as_deref())?;
    let report = verify_personal_signature(&args.address, &message, &args.signature)?;

    println!("valid:             {}", report.is_valid);
    println!("recovered address: {}", report.recovered_address);
    println!("recovered key:     {}", report.recovered_key);
    Ok(())
}

async fn sign(args: SignArgs) -> anyhow::Result<()> {
    let (signer, account) = configured_signer(&args.signer)?;
    let identity = identify_account(
        signer.as_ref(),
        account,
        args.message.as_bytes(),
        args.network.offline_prefix(),
    )
    .await?;

    println!("public key:       {}", identity.public_key);
    println!("ethereum address: {}", identity.ethereum_address);
    println!("chain address:    {}", identity.chain_address);
    println!("signature:        {}", identity.signature);
    Ok(())
}

async fn submit(args: SubmitArgs) -> anyhow::Result<()> {
    let call = match (&args.call, &args.extrinsic) {
        (Some(body), None) => CallPayload::from_call(&hex::decode(body).context("call hex")?)?,
        (None, Some(wrapped)) => {
            CallPayload::from_extrinsic(&hex::decode(wrapped).context("extrinsic hex")?)?
        }
        _ => bail!("provide exactly one of --call or --extrinsic"),
    };
    let (signer, account) = configured_signer(&args.signer)?;
    let encoding = if args.hex_message {
        PayloadEncoding::HexText
    } else {
        PayloadEncoding::Raw
    };

    let config = ChainConfig {
        node_url: args.node_url.clone(),
        ss58_prefix: args.network.configured_prefix(),
        pallet_index: args.pallet_index,
        call_index: args.call_index,
    };
    let handle = ChainHandle::open(&config).await?;
    let result = submit_signed_call(
        &handle,
        signer.as_ref(),
        account,
        &args.sender,
        &call,
        encoding,
    )
    .await;
    handle.close().await;

    let receipt = result?;
    info!("Call accepted by the node");
    println!("extrinsic hash: {}", receipt.extrinsic_hash);
    Ok(())
}

/// Builds the configured signer and resolves the account it should sign for.
fn configured_signer(args: &SignerArgs) -> anyhow::Result<(Box<dyn ExternalSigner>, Address)> {
    let signer = new_signer(
        args.signing_key.clone(),
        args.signer_rpc.clone(),
        Duration::from_secs(args.sign_timeout),
    )?;
    let account = match (&args.account, signer.account()) {
        (Some(address), _) => Address::from_str(address).context("account address")?,
        (None, Some(address)) => address,
        (None, None) => bail!("--account is required with --signer-rpc"),
    };
    Ok((signer, account))
}

fn message_bytes(text: Option<&str>, hex_text: Option<&str>) -> anyhow::Result<Vec<u8>> {
    match (text, hex_text) {
        (Some(text), None) => Ok(text.as_bytes().to_vec()),
        (None, Some(hex_text)) => hex::decode(hex_text).context("message hex"),
        _ => bail!("provide exactly one of --message or --message-hex"),
    }
}
