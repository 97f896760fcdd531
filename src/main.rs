// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tpnet and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Tpnet CLI entrypoint.
//!
//! Offline tooling for teleport network saves: inspect a blob in any supported schema, or
//! migrate it to the current schema.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tpnet::config::TpnetConfig;
use tpnet::model::{ClientData, PlayerUid};
use tpnet::registry::PointRegistry;
use tpnet::store::{decode_save, encode_points, write_file, PointRecord, SaveFolder};

#[derive(Debug, Parser)]
#[command(name = "tpnet", version, about = "Inspect and migrate teleport network saves")]
struct Cli {
    /// TOML configuration file; defaults apply when it does not exist.
    #[arg(long, default_value = "tpnet.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Decode a save blob and print its schema and points as JSON.
    Inspect {
        blob: PathBuf,
        /// Also resolve each point's overlay as seen by this player.
        #[arg(long)]
        viewer: Option<PlayerUid>,
    },
    /// Decode a save blob in any supported schema and rewrite it in the current one.
    Migrate {
        input: PathBuf,
        /// Output file; defaults to the configured world blob.
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Serialize)]
struct InspectReport {
    schema: String,
    count: usize,
    points: Vec<InspectedPoint>,
}

#[derive(Debug, Serialize)]
struct InspectedPoint {
    #[serde(flatten)]
    record: PointRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    overlay: Option<ClientData>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "tpnet=info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = TpnetConfig::load_or_default(&cli.config)?;

    match cli.command {
        Command::Inspect { blob, viewer } => inspect(&config, &blob, viewer.as_ref()),
        Command::Migrate { input, output } => migrate(&config, &input, output),
    }
}

fn read_blob(path: &Path) -> anyhow::Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("cannot read save blob {}", path.display()))
}

fn inspect(config: &TpnetConfig, blob: &Path, viewer: Option<&PlayerUid>) -> anyhow::Result<()> {
    let decoded = decode_save(&read_blob(blob)?)?;
    let overlay = config.overlay.defaults();

    let points = decoded
        .points
        .iter()
        .map(|point| InspectedPoint {
            record: PointRecord::from(point),
            overlay: viewer.map(|viewer| point.overlay_for(Some(viewer), &overlay)),
        })
        .collect::<Vec<_>>();
    let report = InspectReport {
        schema: decoded.schema.to_string(),
        count: points.len(),
        points,
    };

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn migrate(config: &TpnetConfig, input: &Path, output: Option<PathBuf>) -> anyhow::Result<()> {
    let decoded = decode_save(&read_blob(input)?)?;
    let schema = decoded.schema;

    let mut registry = PointRegistry::new();
    let duplicates = registry.replace_all(decoded.points);
    let repair = registry.repair_links();
    let bytes = encode_points(&registry.all())?;

    let output = match output {
        Some(path) => path,
        None => SaveFolder::new(&config.save.dir).blob_path(&config.save.blob_name)?,
    };
    write_file(&output, &bytes, config.save.durability())?;

    info!(
        %schema,
        count = registry.len(),
        duplicates,
        dropped_links = repair.dropped.len(),
        completed_links = repair.completed.len(),
        output = %output.display(),
        "migrated teleport save"
    );
    Ok(())
}
