/*
 *  identity.rs
 *
 *  NetMonS - host identity at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  Host name, primary IPv4 address and interface MAC
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use std::fs;
use std::net::IpAddr;
use std::process::Command;

use local_ip_address::local_ip;
use log::{debug, warn};
use thiserror::Error;

use crate::mac_addr::get_mac_addr_for;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("hostname lookup failed: {0}")]
    Hostname(String),
    #[error("no IPv4 address on the default route: {0}")]
    NoAddress(String),
    #[error("no MAC address for {iface}: {reason}")]
    NoMac { iface: String, reason: String },
}

/// Where the three displayed values come from, one method per field.
pub trait HostIdentity {
    fn hostname(&self) -> Result<String, IdentityError>;
    fn ip_address(&self) -> Result<String, IdentityError>;
    fn mac_address(&self) -> Result<String, IdentityError>;
}

/// Reads the live values from the running Linux host on every call.
#[derive(Debug, Clone)]
pub struct SystemIdentity {
    interface: String,
}

impl SystemIdentity {
    pub fn new(interface: &str) -> Self {
        Self { interface: interface.to_string() }
    }
}

impl HostIdentity for SystemIdentity {
    fn hostname(&self) -> Result<String, IdentityError> {
        let name = match fs::read_to_string("/proc/sys/kernel/hostname") {
            Ok(s) => s,
            Err(e) => {
                debug!("/proc hostname unavailable ({}), asking hostname(1)", e);
                let out = Command::new("hostname")
                    .output()
                    .map_err(|e| IdentityError::Hostname(e.to_string()))?;
                if !out.status.success() {
                    return Err(IdentityError::Hostname(format!("hostname exited with {}", out.status)));
                }
                String::from_utf8_lossy(&out.stdout).into_owned()
            }
        };
        let name = name.trim();
        if name.is_empty() {
            return Err(IdentityError::Hostname("empty hostname".to_string()));
        }
        Ok(name.to_string())
    }

    fn ip_address(&self) -> Result<String, IdentityError> {
        match local_ip() {
            Ok(IpAddr::V4(v4)) => Ok(v4.to_string()),
            Ok(IpAddr::V6(v6)) => Err(IdentityError::NoAddress(format!("only IPv6 available ({})", v6))),
            Err(e) => Err(IdentityError::NoAddress(e.to_string())),
        }
    }

    fn mac_address(&self) -> Result<String, IdentityError> {
        get_mac_addr_for(&self.interface).map_err(|e| IdentityError::NoMac {
            iface: self.interface.clone(),
            reason: e.to_string(),
        })
    }
}

/// One poll's worth of identity, never outlives the loop iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentitySnapshot {
    pub hostname: String,
    pub ip_address: String,
    pub mac_address: String,
}

impl IdentitySnapshot {
    /// Read every field; a field that fails is logged and shown as `placeholder`.
    pub fn read(source: &dyn HostIdentity, placeholder: &str) -> Self {
        Self {
            hostname: or_placeholder("hostname", source.hostname(), placeholder),
            ip_address: or_placeholder("ip", source.ip_address(), placeholder),
            mac_address: or_placeholder("mac", source.mac_address(), placeholder),
        }
    }
}

fn or_placeholder(field: &str, value: Result<String, IdentityError>, placeholder: &str) -> String {
    match value {
        Ok(v) => v,
        Err(e) => {
            warn!("{} unavailable, showing '{}': {}", field, placeholder, e);
            placeholder.to_string()
        }
    }
}
