// Copyright (c) 2026 Scoutline Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Credential probe command

use anyhow::{bail, Result};
use colored::Colorize;
use std::path::PathBuf;

use scoutline_core::domain::access::Role;
use scoutline_core::domain::probe::ProbeReport;

use super::load_service;

pub async fn run(config_override: Option<PathBuf>, role: Role) -> Result<()> {
    let service = load_service(config_override).await?;
    println!("Checking API credentials...");

    let report = service.test_api_keys(role).await?;
    print_report(&report);

    if !report.success() {
        bail!("No API credential is working");
    }
    Ok(())
}

fn print_report(report: &ProbeReport) {
    for result in &report.results {
        if result.success {
            println!("  {}", result.message.green());
        } else {
            println!("  {}", result.message.red());
        }
    }
    if report.partial {
        println!(
            "{}",
            "Probe deadline expired before every provider answered".yellow()
        );
    }
}
