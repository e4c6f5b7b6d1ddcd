// Copyright (c) 2026 Scoutline Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Scoutline Coordinator Core
//!
//! Runtime configuration management for the coordinator: the coordinator and
//! agent documents, role-gated edits, named resource files and credential
//! probes.
//!
//! # Architecture
//!
//! - **Layer:** Core System
//! - **Purpose:** Owns configuration state shared by the console, the task
//!   dispatcher and the agents

pub mod domain;
pub mod application;
pub mod infrastructure;

pub use domain::*;
