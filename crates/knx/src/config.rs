// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Gray Logic Ltd

//! Supervisor configuration and daemon argv construction.

use crate::address::IndividualAddress;
use gl_adapters::{RestartPolicy, ProcessSpec};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Transport the routing daemon uses to reach the KNX bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum KnxBackend {
    /// Local USB interface
    Usb,
    /// IP tunnelling to a remote gateway
    IpTunnel { host: String, port: u16 },
    /// IP multicast routing
    IpRouting { multicast: String },
}

impl KnxBackend {
    /// The daemon's `-b` argument form.
    pub fn as_arg(&self) -> String {
        match self {
            KnxBackend::Usb => "usb:".to_string(),
            KnxBackend::IpTunnel { host, port } => format!("ipt:{}:{}", host, port),
            KnxBackend::IpRouting { multicast } => format!("ip:{}", multicast),
        }
    }

    pub fn is_usb(&self) -> bool {
        matches!(self, KnxBackend::Usb)
    }
}

impl fmt::Display for KnxBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_arg())
    }
}

/// Restart behavior for the managed daemon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RestartSettings {
    pub strategy: RestartStrategy,
    /// Fixed delay, or exponential base
    pub delay_ms: u64,
    /// Exponential cap
    pub max_delay_ms: u64,
    pub max_attempts: u32,
    /// SIGTERM grace window before SIGKILL
    pub graceful_stop_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestartStrategy {
    Fixed,
    Exponential,
}

impl Default for RestartSettings {
    fn default() -> Self {
        Self {
            strategy: RestartStrategy::Exponential,
            delay_ms: 1_000,
            max_delay_ms: 30_000,
            max_attempts: 5,
            graceful_stop_ms: 5_000,
        }
    }
}

impl RestartSettings {
    pub fn to_policy(&self) -> RestartPolicy {
        match self.strategy {
            RestartStrategy::Fixed => RestartPolicy::Fixed {
                delay: Duration::from_millis(self.delay_ms),
                max_attempts: self.max_attempts,
            },
            RestartStrategy::Exponential => RestartPolicy::Exponential {
                base: Duration::from_millis(self.delay_ms),
                cap: Duration::from_millis(self.max_delay_ms),
                max_attempts: self.max_attempts,
            },
        }
    }
}

/// Everything the supervisor needs to run and probe the daemon.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KnxConfig {
    /// When false the daemon is external and only observed
    pub managed: bool,
    pub binary: PathBuf,
    /// The daemon's own physical address (`-e`)
    pub physical_address: IndividualAddress,
    /// First client-pool address (`-E`)
    pub client_start: IndividualAddress,
    /// Client-pool size
    pub client_count: u8,
    /// Accept local TCP clients (`-i`)
    pub listen_tcp: bool,
    pub listen_port: u16,
    pub backend: KnxBackend,
    /// Daemon log level (`-f`)
    pub log_level: Option<u8>,
    /// Daemon trace mask (`-t`)
    pub trace_mask: Option<u32>,
    pub usb_vendor_id: String,
    pub usb_product_id: String,
    /// Reset the USB interface when the bus dialogue fails
    pub reset_on_bus_failure: bool,
    /// Reset the USB interface before each restart attempt
    pub reset_on_retry: bool,
    /// Wall-clock budget per bus-dialogue attempt
    pub bus_check_timeout_ms: u64,
    /// Override the PID lockfile location (tests, containers)
    pub pid_file: Option<PathBuf>,
    pub restart: RestartSettings,
}

impl Default for KnxConfig {
    fn default() -> Self {
        Self {
            managed: true,
            binary: PathBuf::from("knxd"),
            physical_address: IndividualAddress {
                area: 1,
                line: 1,
                device: 128,
            },
            client_start: IndividualAddress {
                area: 1,
                line: 1,
                device: 129,
            },
            client_count: 8,
            listen_tcp: true,
            listen_port: 6720,
            backend: KnxBackend::Usb,
            log_level: None,
            trace_mask: None,
            usb_vendor_id: "0e77".to_string(),
            usb_product_id: "0104".to_string(),
            reset_on_bus_failure: false,
            reset_on_retry: false,
            bus_check_timeout_ms: 3_000,
            pid_file: None,
            restart: RestartSettings::default(),
        }
    }
}

impl KnxConfig {
    /// Daemon argv, in the order the daemon documents its flags.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = vec![
            "-e".to_string(),
            self.physical_address.to_string(),
            "-E".to_string(),
            format!("{}:{}", self.client_start, self.client_count),
        ];
        if self.listen_tcp {
            args.push(format!("-i{}", self.listen_port));
        }
        args.push("-b".to_string());
        args.push(self.backend.as_arg());
        if let Some(level) = self.log_level {
            args.push(format!("-f{}", level));
        }
        if let Some(mask) = self.trace_mask {
            args.push(format!("-t{:#x}", mask));
        }
        args
    }

    /// Process spec without the restart hook (the supervisor attaches it).
    pub fn process_spec(&self) -> ProcessSpec {
        let mut spec = ProcessSpec::new(self.binary.clone(), self.build_args());
        spec.restart = self.restart.to_policy();
        spec.graceful_stop = Duration::from_millis(self.restart.graceful_stop_ms);
        spec
    }

    /// How clients reach the daemon.
    pub fn connection_url(&self) -> String {
        if self.listen_tcp {
            format!("tcp://127.0.0.1:{}", self.listen_port)
        } else {
            self.backend.as_arg()
        }
    }

    pub fn bus_check_timeout(&self) -> Duration {
        Duration::from_millis(self.bus_check_timeout_ms)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
