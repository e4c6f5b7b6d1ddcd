// Copyright (c) 2026 Scoutline Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Infrastructure
//!
//! Storage, event fan-out and network adapters behind the domain traits.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure Layer
//! - **Purpose:** Implements domain interfaces against real I/O

pub mod config_store;
pub mod event_bus;
pub mod file_store;
pub mod http_probe;
pub mod resource_registry;
