// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Gateway configuration shapes consumed by the reconciler (spec §4.F item
//! 4, §9 "Extension dispatch": a static `enabled` flag per namespace).

use hack_core::ExposureKind;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ExposureConfig {
    pub kind: ExposureKind,
    pub enabled: bool,
    pub dependency_binary: Option<String>,
    pub requires_public_bind: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfig {
    pub enabled: bool,
    pub bind: Option<String>,
    pub port: Option<u16>,
    pub allow_writes: bool,
    pub exposures: Vec<ExposureConfig>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        GatewayConfig {
            enabled: false,
            bind: None,
            port: None,
            allow_writes: false,
            exposures: vec![
                ExposureConfig {
                    kind: ExposureKind::LocalNetwork,
                    enabled: false,
                    dependency_binary: None,
                    requires_public_bind: false,
                },
                ExposureConfig {
                    kind: ExposureKind::MeshVpn,
                    enabled: false,
                    dependency_binary: Some("tailscale".to_string()),
                    requires_public_bind: false,
                },
                ExposureConfig {
                    kind: ExposureKind::PublicTunnel,
                    enabled: false,
                    dependency_binary: Some("cloudflared".to_string()),
                    requires_public_bind: true,
                },
            ],
        }
    }
}

/// Whether a bind address satisfies a public-reachability requirement
/// (spec §4.F "blocked ... the bind is loopback for an exposure that
/// requires a public bind").
pub fn bind_satisfies(bind: Option<&str>, requires_public_bind: bool) -> bool {
    if !requires_public_bind {
        return true;
    }
    match bind {
        Some(addr) => !is_loopback_bind(addr),
        None => false,
    }
}

fn is_loopback_bind(addr: &str) -> bool {
    matches!(addr, "127.0.0.1" | "::1" | "localhost")
}
