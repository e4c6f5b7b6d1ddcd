// Copyright (c) 2026 Scoutline Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Settings file commands
//!
//! Commands: show, validate, generate

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::{Path, PathBuf};

use scoutline_core::domain::settings::Settings;

const SAMPLE_SETTINGS: &str = include_str!("../../templates/scoutline-config.yaml");

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current settings
    Show {
        /// Show settings file paths checked
        #[arg(long)]
        paths: bool,
    },

    /// Validate settings file
    Validate {
        /// Path to settings file (default: discover)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Generate sample settings
    Generate {
        /// Output path (default: ./scoutline.yaml)
        #[arg(short, long, default_value = "./scoutline.yaml")]
        output: PathBuf,

        /// Write bare defaults without comments or provider endpoints
        #[arg(long)]
        minimal: bool,
    },
}

pub async fn handle_command(command: ConfigCommand, config_override: Option<PathBuf>) -> Result<()> {
    match command {
        ConfigCommand::Show { paths } => show(config_override, paths).await,
        ConfigCommand::Validate { file } => validate(file.or(config_override)).await,
        ConfigCommand::Generate { output, minimal } => generate(&output, minimal).await,
    }
}

async fn show(config_override: Option<PathBuf>, show_paths: bool) -> Result<()> {
    let settings =
        Settings::load_or_default(config_override.clone()).context("Failed to load settings")?;

    if show_paths {
        println!("{}", "Settings discovery paths:".bold());
        if let Some(path) = &config_override {
            println!("  1. --config flag: {}", path.display());
        } else {
            println!("  1. --config flag: {}", "(not set)".dimmed());
        }
        println!(
            "  2. SCOUTLINE_CONFIG_PATH: {}",
            std::env::var("SCOUTLINE_CONFIG_PATH")
                .unwrap_or_else(|_| "(not set)".to_string())
                .dimmed()
        );
        println!("  3. ./scoutline.yaml");
        println!("  4. ~/.scoutline/config.yaml");
        println!("  5. /etc/scoutline/config.yaml");
        println!();
    }

    println!("{}", "Current settings:".bold());
    println!();

    println!("{}", "Documents:".bold());
    println!("  Root: {}", settings.root_path.display());
    println!("  Coordinator: {}", settings.coordinator_config_path().display());
    println!("  Agent: {}", settings.agent_config_path().display());
    println!("  Resources: {}", settings.resource_root().display());
    println!();

    println!("{}", "Credential probes:".bold());
    println!("  Concurrency: {}", settings.probe.concurrency);
    println!("  Probe timeout: {:?}", settings.probe.probe_timeout);
    match settings.probe.deadline {
        Some(deadline) => println!("  Run deadline: {:?}", deadline),
        None => println!("  Run deadline: {}", "(none)".dimmed()),
    }
    if settings.probe.endpoints.is_empty() {
        println!("  Endpoints: {}", "(none configured)".dimmed());
    }
    for (provider, endpoint) in &settings.probe.endpoints {
        println!("  {} → {}", provider.to_string().bold(), endpoint.url);
    }
    println!();

    Ok(())
}

async fn validate(config_path: Option<PathBuf>) -> Result<()> {
    println!("Validating settings...");

    let settings = Settings::load_or_default(config_path).context("Failed to load settings")?;

    settings.validate().context("Settings validation failed")?;

    println!("{}", "✓ Settings are valid".green());

    Ok(())
}

async fn generate(output: &Path, minimal: bool) -> Result<()> {
    let sample = if minimal {
        serde_yaml::to_string(&Settings::default()).context("Failed to serialize default settings")?
    } else {
        SAMPLE_SETTINGS.to_string()
    };

    std::fs::write(output, sample)
        .with_context(|| format!("Failed to write settings to {:?}", output))?;

    println!(
        "{}",
        format!("✓ Settings generated: {}", output.display()).green()
    );

    Ok(())
}
