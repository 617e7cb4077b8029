//! Per-light and whole-registry commands.
//!
//! Each command resolves the id, talks to the device, and folds the result
//! into an [`Outcome`]. Bulk commands visit lights one at a time in
//! registry order and never stop at the first failure.

use lightdeck_core::Hsbk;
use lightdeck_device::{Connector, Device, DeviceError};
use log::{info, warn};

use crate::{Outcome, Registry};

impl<C: Connector> Registry<C> {
    fn run<F>(&self, id: &str, context: &str, op: F) -> Outcome
    where
        F: FnOnce(&C::Device) -> Result<String, DeviceError>,
    {
        let device = match self.device(id) {
            Ok(device) => device,
            Err(e) => return Outcome::fail(e.to_string()),
        };
        match op(device) {
            Ok(message) => {
                info!("{message}");
                Outcome::ok(message)
            }
            Err(e) => {
                warn!("Error {context} {id}: {e}");
                Outcome::fail(format!("Error {context} {id}: {e}"))
            }
        }
    }

    pub fn set_power(&self, id: &str, on: bool) -> Outcome {
        self.run(id, "setting power for", |device| {
            device.set_power(on)?;
            Ok(format!("Turned {id} {}", on_off(on)))
        })
    }

    /// Read the current power state and write its inverse.
    pub fn toggle(&self, id: &str) -> Outcome {
        self.run(id, "toggling", |device| {
            let on = !device.get_power()?;
            device.set_power(on)?;
            Ok(format!("Toggled {id} {}", on_off(on)))
        })
    }

    pub fn set_color(&self, id: &str, color: Hsbk) -> Outcome {
        self.run(id, "setting color for", |device| {
            device.set_color(color)?;
            Ok(format!("Color set for {id}"))
        })
    }

    /// Keep hue, saturation, and kelvin; replace brightness.
    pub fn set_brightness(&self, id: &str, brightness: u16) -> Outcome {
        self.run(id, "setting brightness for", |device| {
            let current = device.get_color()?;
            device.set_color(current.with_brightness(brightness))?;
            Ok(format!("Brightness set for {id}"))
        })
    }

    /// Power every light on at full neutral white.
    pub fn turn_all_on(&self) -> Vec<Outcome> {
        self.for_each_light("on", |device| {
            device.set_power(true)?;
            device.set_color(Hsbk::neutral_white())
        })
    }

    pub fn turn_all_off(&self) -> Vec<Outcome> {
        self.for_each_light("off", |device| device.set_power(false))
    }

    fn for_each_light<F>(&self, state: &str, op: F) -> Vec<Outcome>
    where
        F: Fn(&C::Device) -> Result<(), DeviceError>,
    {
        self.lights()
            .map(|light| match op(light.device()) {
                Ok(()) => Outcome::ok(format!("Successfully turned {state} {}", light.id)),
                Err(e) => {
                    warn!("Failed to turn {state} {}: {e}", light.id);
                    Outcome::fail(format!("Failed to turn {state} {}: {e}", light.id))
                }
            })
            .collect()
    }
}

fn on_off(on: bool) -> &'static str {
    if on {
        "on"
    } else {
        "off"
    }
}

#[cfg(test)]
#[path = "tests/commands_tests.rs"]
mod tests;
