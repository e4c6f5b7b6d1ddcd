// Copyright (c) 2026 Scoutline Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Scoutline CLI library - exposes testable components
//!
//! # Architecture
//!
//! - **Layer:** Interface / Presentation Layer
//! - **Purpose:** Command handlers over the coordinator configuration service

pub mod commands;
