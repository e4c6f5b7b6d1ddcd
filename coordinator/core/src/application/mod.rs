// Copyright (c) 2026 Scoutline Contributors
// SPDX-License-Identifier: AGPL-3.0

pub mod config_service;
pub mod probe_engine;

// Re-export use cases for convenience
pub use config_service::{ApiTokenUpdate, ConfigService, PortscanUpdate};
pub use probe_engine::ProbeEngine;
