//! JSON-backed registry of known lights.
//!
//! File format (`lights_config.json`, 4-space indent, insertion order kept):
//!
//! ```json
//! {
//!     "light1": {
//!         "mac_addr": "d0:73:d5:00:00:01",
//!         "ip_addr": "192.168.1.20"
//!     }
//! }
//! ```
//!
//! The file is read once by [`Registry::load`] and rewritten wholesale after
//! every successful [`Registry::add`] or [`Registry::remove`].

use lightdeck_core::Error;
use lightdeck_device::{Connector, Device, DeviceError};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::Outcome;

/// Persisted identity of one light.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct LightConfig {
    mac_addr: String,
    ip_addr: String,
}

/// A registered light: identity plus live device handle.
#[derive(Debug)]
pub struct Light<D> {
    pub id: String,
    pub mac_addr: String,
    pub ip_addr: String,
    device: D,
}

impl<D: Device> Light<D> {
    pub fn device(&self) -> &D {
        &self.device
    }

    /// Query label and power from the device.
    pub fn query_info(&self) -> Result<LightInfo, DeviceError> {
        Ok(LightInfo {
            id: self.id.clone(),
            label: self.device.get_label()?,
            power: self.device.get_power()?,
            ip_addr: self.ip_addr.clone(),
            mac_addr: self.mac_addr.clone(),
        })
    }
}

/// Live snapshot of one light.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LightInfo {
    pub id: String,
    pub label: String,
    pub power: bool,
    pub ip_addr: String,
    pub mac_addr: String,
}

/// Ordered set of lights keyed by id. Insertion order is display order.
pub struct Registry<C: Connector> {
    path: PathBuf,
    connector: C,
    lights: Vec<Light<C::Device>>,
}

impl<C: Connector> Registry<C> {
    /// Registry with no lights that will persist to `path`.
    pub fn empty(path: impl Into<PathBuf>, connector: C) -> Self {
        Self {
            path: path.into(),
            connector,
            lights: Vec::new(),
        }
    }

    /// Load the registry file. A missing file gives an empty registry.
    ///
    /// Entries whose addresses the connector rejects are skipped with a
    /// warning; no device is contacted.
    pub fn load(path: impl Into<PathBuf>, connector: C) -> Result<Self, Error> {
        let mut registry = Self::empty(path, connector);
        let contents = match std::fs::read_to_string(&registry.path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No registry at {}, starting empty", registry.path.display());
                return Ok(registry);
            }
            Err(e) => return Err(Error::io("read", e)),
        };

        let entries: Map<String, Value> =
            serde_json::from_str(&contents).map_err(|e| Error::Json(e.to_string()))?;
        for (id, value) in entries {
            let cfg: LightConfig = serde_json::from_value(value)
                .map_err(|e| Error::Json(format!("entry {id:?}: {e}")))?;
            match registry.connector.connect(&cfg.mac_addr, &cfg.ip_addr) {
                Ok(device) => registry.lights.push(Light {
                    id,
                    mac_addr: cfg.mac_addr,
                    ip_addr: cfg.ip_addr,
                    device,
                }),
                Err(e) => warn!("Skipping light {id} from {}: {e}", registry.path.display()),
            }
        }
        info!(
            "Loaded {} light(s) from {}",
            registry.lights.len(),
            registry.path.display()
        );
        Ok(registry)
    }

    /// Write every light's id, MAC, and IP to the registry file.
    ///
    /// The document goes to a sibling temp file first and is renamed into
    /// place, so readers never see a half-written registry.
    pub fn save(&self) -> Result<(), Error> {
        let mut doc = Map::new();
        for light in &self.lights {
            let cfg = LightConfig {
                mac_addr: light.mac_addr.clone(),
                ip_addr: light.ip_addr.clone(),
            };
            let value = serde_json::to_value(cfg).map_err(|e| Error::Json(e.to_string()))?;
            doc.insert(light.id.clone(), value);
        }

        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        doc.serialize(&mut ser)
            .map_err(|e| Error::Json(e.to_string()))?;

        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                std::fs::create_dir_all(dir).map_err(|e| Error::io("create", e))?;
            }
        }
        let tmp = temp_path(&self.path);
        std::fs::write(&tmp, &buf).map_err(|e| Error::io("write", e))?;
        if let Err(e) = std::fs::rename(&tmp, &self.path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(Error::io("rename", e));
        }
        debug!(
            "Saved {} light(s) to {}",
            self.lights.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Register a light after proving it answers.
    ///
    /// The device must return its label before anything is stored. Any
    /// failure leaves the registry and the file untouched.
    pub fn add(&mut self, id: &str, mac_addr: &str, ip_addr: &str) -> Outcome {
        match self.try_add(id.trim(), mac_addr.trim(), ip_addr.trim()) {
            Ok(label) => {
                info!("Added light {} ({label})", id.trim());
                Outcome::ok("Light added successfully!")
            }
            Err(e) => Outcome::fail(format!("Error adding light: {e}")),
        }
    }

    fn try_add(&mut self, id: &str, mac_addr: &str, ip_addr: &str) -> Result<String, Error> {
        if id.is_empty() {
            return Err(Error::EmptyId);
        }
        if self.contains(id) {
            return Err(Error::DuplicateLight(id.to_string()));
        }
        let device = self
            .connector
            .connect(mac_addr, ip_addr)
            .map_err(|e| Error::unreachable(id, e))?;
        let label = device.get_label().map_err(|e| Error::unreachable(id, e))?;

        self.lights.push(Light {
            id: id.to_string(),
            mac_addr: mac_addr.to_string(),
            ip_addr: ip_addr.to_string(),
            device,
        });
        if let Err(e) = self.save() {
            self.lights.pop();
            return Err(e);
        }
        Ok(label)
    }

    /// Forget a light and persist. No confirmation at this layer.
    pub fn remove(&mut self, id: &str) -> Outcome {
        let Some(index) = self.position(id) else {
            return Outcome::fail(format!("Light {id} not found."));
        };
        let light = self.lights.remove(index);
        match self.save() {
            Ok(()) => {
                info!("Removed light {id}");
                Outcome::ok(format!("Light {id} removed successfully!"))
            }
            Err(e) => {
                self.lights.insert(index, light);
                Outcome::fail(format!("Error removing light: {e}"))
            }
        }
    }

    /// Live info for one light; `None` if unknown or unreachable.
    pub fn get_info(&self, id: &str) -> Option<LightInfo> {
        let light = self.get(id)?;
        match light.query_info() {
            Ok(info) => Some(info),
            Err(e) => {
                warn!("Error getting light info for {id}: {e}");
                None
            }
        }
    }

    /// Live info for every reachable light, in registry order.
    pub fn list_all(&self) -> Vec<LightInfo> {
        self.lights
            .iter()
            .filter_map(|light| self.get_info(&light.id))
            .collect()
    }

    pub fn get(&self, id: &str) -> Option<&Light<C::Device>> {
        self.lights.iter().find(|l| l.id == id)
    }

    /// Device handle for `id`, or [`Error::UnknownLight`].
    pub fn device(&self, id: &str) -> Result<&C::Device, Error> {
        self.get(id)
            .map(Light::device)
            .ok_or_else(|| Error::UnknownLight(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.lights.iter().position(|l| l.id == id)
    }

    /// Registered ids in display order.
    pub fn ids(&self) -> Vec<String> {
        self.lights.iter().map(|l| l.id.clone()).collect()
    }

    pub fn lights(&self) -> impl Iterator<Item = &Light<C::Device>> {
        self.lights.iter()
    }

    pub fn len(&self) -> usize {
        self.lights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "lights_config.json".into());
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
#[path = "tests/registry_tests.rs"]
mod tests;
