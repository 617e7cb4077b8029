//! Blocking LIFX LAN client.
//!
//! Every request opens a short-lived UDP socket, sends one `lifx-core`
//! frame addressed to the bulb's MAC, and waits for the reply that carries
//! our source id and sequence number. Reads ask for a response
//! (`res_required`), writes ask for an acknowledgement (`ack_required`).
//! A request is resent up to `attempts` times before the bulb counts as
//! unreachable.

use std::cell::Cell;
use std::io::ErrorKind;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, UdpSocket};
use std::time::{Duration, Instant};

use lifx_core::{BuildOptions, Message, RawMessage, HSBK};
use lightdeck_core::Hsbk;
use log::debug;

use crate::{parse_ip, parse_mac, Connector, Device, DeviceError};

type Result<T> = std::result::Result<T, DeviceError>;

/// Power level the protocol uses for "on".
const POWER_ON: u16 = u16::MAX;

/// Builds [`LifxBulb`] handles that share one timeout policy.
#[derive(Debug, Clone)]
pub struct LifxConnector {
    timeout: Duration,
    attempts: u32,
    port: u16,
    source: u32,
}

impl Default for LifxConnector {
    fn default() -> Self {
        Self::new(Duration::from_millis(1000), 2)
    }
}

impl LifxConnector {
    pub const PORT: u16 = 56700;

    pub fn new(timeout: Duration, attempts: u32) -> Self {
        Self {
            timeout,
            attempts: attempts.max(1),
            port: Self::PORT,
            // 0 and 1 ask bulbs to broadcast their replies
            source: std::process::id() | 0x0001_0000,
        }
    }

    /// Talk to bulbs on a non-standard UDP port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }
}

impl Connector for LifxConnector {
    type Device = LifxBulb;

    fn connect(&self, mac_addr: &str, ip_addr: &str) -> Result<LifxBulb> {
        let target = mac_to_target(parse_mac(mac_addr)?);
        let ip = parse_ip(ip_addr)?;
        Ok(LifxBulb {
            addr: SocketAddr::new(ip, self.port),
            target,
            source: self.source,
            timeout: self.timeout,
            attempts: self.attempts,
            sequence: Cell::new(0),
        })
    }
}

/// Frame target for a MAC: the six bytes little-endian in the low end of a `u64`.
pub fn mac_to_target(mac: [u8; 6]) -> u64 {
    let [a, b, c, d, e, f] = mac;
    u64::from_le_bytes([a, b, c, d, e, f, 0, 0])
}

/// One LIFX bulb reachable over the LAN.
#[derive(Debug)]
pub struct LifxBulb {
    addr: SocketAddr,
    target: u64,
    source: u32,
    timeout: Duration,
    attempts: u32,
    sequence: Cell<u8>,
}

impl LifxBulb {
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    fn next_sequence(&self) -> u8 {
        let seq = self.sequence.get().wrapping_add(1);
        self.sequence.set(seq);
        seq
    }

    /// Send `message` and return the first reply `accept` maps to a value.
    fn exchange<T>(
        &self,
        message: Message,
        ack_required: bool,
        mut accept: impl FnMut(Message) -> Option<T>,
    ) -> Result<T> {
        let sequence = self.next_sequence();
        let options = BuildOptions {
            target: Some(self.target),
            ack_required,
            res_required: !ack_required,
            sequence,
            source: self.source,
        };
        debug!("{} <- {:?} (seq {})", self.addr, message, sequence);
        let raw = RawMessage::build(&options, message)
            .map_err(|e| DeviceError::Protocol(format!("{e:?}")))?;
        let bytes = raw
            .pack()
            .map_err(|e| DeviceError::Protocol(format!("{e:?}")))?;

        let bind: SocketAddr = match self.addr.ip() {
            IpAddr::V4(_) => (Ipv4Addr::UNSPECIFIED, 0).into(),
            IpAddr::V6(_) => (Ipv6Addr::UNSPECIFIED, 0).into(),
        };
        let socket = UdpSocket::bind(bind).map_err(|e| DeviceError::socket("bind", e))?;
        let mut buf = [0u8; 1024];

        for attempt in 1..=self.attempts {
            socket
                .send_to(&bytes, self.addr)
                .map_err(|e| DeviceError::socket("send", e))?;

            let deadline = Instant::now() + self.timeout;
            loop {
                let remaining = deadline.saturating_duration_since(Instant::now());
                if remaining.is_zero() {
                    break;
                }
                socket
                    .set_read_timeout(Some(remaining))
                    .map_err(|e| DeviceError::socket("configure", e))?;
                let n = match socket.recv_from(&mut buf) {
                    Ok((n, _)) => n,
                    Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                        break
                    }
                    Err(e) => return Err(DeviceError::socket("receive", e)),
                };
                let Ok(reply) = RawMessage::unpack(&buf[..n]) else {
                    continue;
                };
                if reply.frame.source != self.source || reply.frame_addr.sequence != sequence {
                    continue;
                }
                match Message::from_raw(&reply) {
                    Ok(msg) => {
                        debug!("{} -> {:?}", self.addr, msg);
                        if let Some(value) = accept(msg) {
                            return Ok(value);
                        }
                    }
                    Err(e) => debug!("{}: undecodable reply: {:?}", self.addr, e),
                }
            }
            debug!(
                "{}: no reply (attempt {}/{})",
                self.addr, attempt, self.attempts
            );
        }

        Err(DeviceError::Timeout {
            addr: self.addr,
            attempts: self.attempts,
        })
    }

    fn acknowledged(&self, message: Message) -> Result<()> {
        self.exchange(message, true, |reply| match reply {
            Message::Acknowledgement { .. } => Some(()),
            _ => None,
        })
    }
}

impl Device for LifxBulb {
    fn get_label(&self) -> Result<String> {
        self.exchange(Message::GetLabel, false, |reply| match reply {
            Message::StateLabel { label } => Some(label.to_string()),
            _ => None,
        })
    }

    fn get_power(&self) -> Result<bool> {
        self.exchange(Message::LightGetPower, false, |reply| match reply {
            Message::LightStatePower { level } => Some(level != 0),
            _ => None,
        })
    }

    fn set_power(&self, on: bool) -> Result<()> {
        self.acknowledged(Message::LightSetPower {
            level: if on { POWER_ON } else { 0 },
            duration: 0,
        })
    }

    fn get_color(&self) -> Result<Hsbk> {
        self.exchange(Message::LightGet, false, |reply| match reply {
            Message::LightState { color, .. } => Some(from_wire(&color)),
            _ => None,
        })
    }

    fn set_color(&self, color: Hsbk) -> Result<()> {
        self.acknowledged(Message::LightSetColor {
            reserved: 0,
            color: to_wire(color),
            duration: 0,
        })
    }
}

pub(crate) fn to_wire(c: Hsbk) -> HSBK {
    HSBK {
        hue: c.hue,
        saturation: c.saturation,
        brightness: c.brightness,
        kelvin: c.kelvin,
    }
}

pub(crate) fn from_wire(c: &HSBK) -> Hsbk {
    Hsbk::new(c.hue, c.saturation, c.brightness, c.kelvin)
}

#[cfg(test)]
#[path = "tests/lifx_tests.rs"]
mod tests;
