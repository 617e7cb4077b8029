//! Device control for lightdeck: the seam between the registry and the
//! physical bulbs.
//!
//! [`Connector`] builds a [`Device`] handle from a MAC and an IP address.
//! Construction only validates the addresses; every network round trip
//! happens inside the [`Device`] methods, each of which can fail with a
//! [`DeviceError`].
//!
//! The [`lifx`] module provides the LIFX LAN implementation used by the
//! binary.

pub mod lifx;

use lightdeck_core::Hsbk;
use std::net::{IpAddr, SocketAddr};

pub use lifx::{LifxBulb, LifxConnector};

type Result<T> = std::result::Result<T, DeviceError>;

/// Errors raised while addressing or talking to a bulb.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    /// The MAC address is not six hex byte pairs.
    #[error("invalid MAC address {0:?}")]
    InvalidMac(String),

    /// The IP address is not an IPv4 or IPv6 literal.
    #[error("invalid IP address {0:?}")]
    InvalidIp(String),

    /// A socket operation failed.
    #[error("socket {action} error: {err}")]
    Socket {
        action: String,
        err: std::io::Error,
    },

    /// A message could not be encoded or decoded.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The bulb never answered.
    #[error("no reply from {addr} after {attempts} attempt(s)")]
    Timeout { addr: SocketAddr, attempts: u32 },
}

impl DeviceError {
    /// Create a new socket error
    pub fn socket(action: &str, err: std::io::Error) -> Self {
        DeviceError::Socket {
            action: action.to_string(),
            err,
        }
    }
}

/// A live handle to one bulb.
pub trait Device {
    /// Human-readable label stored on the bulb.
    fn get_label(&self) -> Result<String>;

    /// `true` when the bulb is emitting light.
    fn get_power(&self) -> Result<bool>;

    fn set_power(&self, on: bool) -> Result<()>;

    fn get_color(&self) -> Result<Hsbk>;

    fn set_color(&self, color: Hsbk) -> Result<()>;
}

/// Builds device handles from stored addresses.
pub trait Connector {
    type Device: Device;

    fn connect(&self, mac_addr: &str, ip_addr: &str) -> Result<Self::Device>;
}

/// Parse `aa:bb:cc:dd:ee:ff` (or `-`-separated) into six bytes.
pub fn parse_mac(mac: &str) -> Result<[u8; 6]> {
    let invalid = || DeviceError::InvalidMac(mac.to_string());
    let parts: Vec<&str> = mac.trim().split([':', '-']).collect();
    if parts.len() != 6 {
        return Err(invalid());
    }
    let mut bytes = [0u8; 6];
    for (slot, part) in bytes.iter_mut().zip(&parts) {
        if part.len() != 2 || !part.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        *slot = u8::from_str_radix(part, 16).map_err(|_| invalid())?;
    }
    Ok(bytes)
}

/// Parse an IPv4 or IPv6 literal.
pub fn parse_ip(ip: &str) -> Result<IpAddr> {
    ip.trim()
        .parse()
        .map_err(|_| DeviceError::InvalidIp(ip.to_string()))
}

#[cfg(test)]
#[path = "tests/device_tests.rs"]
mod tests;
