// Copyright (c) 2026 Scoutline Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Domain
//!
//! Configuration documents, roles, named resources and probe contracts.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Types and rules with no I/O

pub mod access;
pub mod agent_config;
pub mod chat;
pub mod coordinator_config;
pub mod document;
pub mod error;
pub mod events;
pub mod named_resource;
pub mod notifier;
pub mod probe;
pub mod settings;
pub mod view;

pub use access::{AccessGate, Role, ADMIN_ROLES};
pub use document::{ConfigDocument, ConfigDomain};
pub use error::ConfigError;
