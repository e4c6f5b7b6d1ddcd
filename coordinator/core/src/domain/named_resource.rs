// Copyright (c) 2026 Scoutline Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Named Resources
//!
//! Flat files that operators edit through the console (block lists, IP
//! location overrides, honeypot signatures, xray configs). Callers refer to
//! them by a symbolic token; only tokens in [`NamedResource::ALL`] map to a
//! path, and every path is relative to the `thirdparty` directory under the
//! installation root.

use std::fmt;
use std::path::{Component, Path};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedResource {
    HoneyPot,
    IpLocation,
    IpLocationB,
    IpLocationC,
    Service,
    Xray,
    XrayConfig,
    XrayModule,
    XrayPlugin,
    BlackDomain,
    BlackIp,
    TaskWorkspace,
    FofaFilterKeyword,
    FofaFilterKeywordLocal,
}

impl NamedResource {
    pub const ALL: [NamedResource; 14] = [
        NamedResource::HoneyPot,
        NamedResource::IpLocation,
        NamedResource::IpLocationB,
        NamedResource::IpLocationC,
        NamedResource::Service,
        NamedResource::Xray,
        NamedResource::XrayConfig,
        NamedResource::XrayModule,
        NamedResource::XrayPlugin,
        NamedResource::BlackDomain,
        NamedResource::BlackIp,
        NamedResource::TaskWorkspace,
        NamedResource::FofaFilterKeyword,
        NamedResource::FofaFilterKeywordLocal,
    ];

    /// Look up a token. Matching is exact; anything else is `None`.
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|r| r.token() == token)
    }

    pub fn token(&self) -> &'static str {
        match self {
            NamedResource::HoneyPot => "honeypot",
            NamedResource::IpLocation => "iplocation",
            NamedResource::IpLocationB => "iplocationB",
            NamedResource::IpLocationC => "iplocationC",
            NamedResource::Service => "service",
            NamedResource::Xray => "xray",
            NamedResource::XrayConfig => "config.xray",
            NamedResource::XrayModule => "module.xray",
            NamedResource::XrayPlugin => "plugin.xray",
            NamedResource::BlackDomain => "black_domain",
            NamedResource::BlackIp => "black_ip",
            NamedResource::TaskWorkspace => "task_workspace",
            NamedResource::FofaFilterKeyword => "fofa_filter_keyword",
            NamedResource::FofaFilterKeywordLocal => "fofa_filter_keyword_local",
        }
    }

    /// Path relative to `<root>/thirdparty`.
    pub fn relative_path(&self) -> &'static str {
        match self {
            NamedResource::HoneyPot => "custom/honeypot.txt",
            NamedResource::IpLocation => "custom/iplocation-custom.txt",
            NamedResource::IpLocationB => "custom/iplocation-custom-B.txt",
            NamedResource::IpLocationC => "custom/iplocation-custom-C.txt",
            NamedResource::Service => "custom/services-custom.txt",
            NamedResource::Xray => "xray/xray.yaml",
            NamedResource::XrayConfig => "xray/config.yaml",
            NamedResource::XrayModule => "xray/module.xray.yaml",
            NamedResource::XrayPlugin => "xray/plugin.xray.yaml",
            NamedResource::BlackDomain => "custom/black_domain.txt",
            NamedResource::BlackIp => "custom/black_ip.txt",
            NamedResource::TaskWorkspace => "custom/task_workspace.txt",
            NamedResource::FofaFilterKeyword => "custom/onlineapi_filter_keyword.txt",
            NamedResource::FofaFilterKeywordLocal => "custom/onlineapi_filter_keyword_local.txt",
        }
    }
}

impl fmt::Display for NamedResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// True when `path` is relative and made only of plain components, i.e. it
/// cannot climb out of whatever directory it is joined onto.
pub fn is_contained_relative(path: &Path) -> bool {
    !path.as_os_str().is_empty()
        && path
            .components()
            .all(|component| matches!(component, Component::Normal(_) | Component::CurDir))
}
