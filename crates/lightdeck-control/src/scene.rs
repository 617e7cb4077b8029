//! Scene application.

use lightdeck_core::color::hex_to_hsbk;
use lightdeck_core::{Directive, Error, SceneCatalog};
use lightdeck_device::{Connector, Device};
use log::{info, warn};

use crate::{Light, Outcome, Registry};

impl<C: Connector> Registry<C> {
    /// Apply the scene called `name` (case-insensitive) to every registered
    /// light it addresses.
    ///
    /// Lights are visited in registry order; ids the scene names but the
    /// registry lacks are skipped. One [`Outcome`] per visited light. An
    /// unknown name fails before any device is contacted.
    pub fn apply_scene(&self, catalog: &SceneCatalog, name: &str) -> Result<Vec<Outcome>, Error> {
        let scene = catalog
            .get(name)
            .ok_or_else(|| Error::UnknownScene(name.to_string()))?;
        info!("Applying scene {}", scene.name);

        Ok(self
            .lights()
            .filter_map(|light| {
                let directive = scene.directive(&light.id)?;
                Some(match apply_directive(light, directive) {
                    Ok(()) => Outcome::ok(format!("Applied {} to {}", scene.name, light.id)),
                    Err(e) => {
                        warn!("Failed to process {}: {e}", light.id);
                        Outcome::fail(format!("Failed to process {}: {e}", light.id))
                    }
                })
            })
            .collect())
    }
}

fn apply_directive<D: Device>(light: &Light<D>, directive: &Directive) -> Result<(), Error> {
    let color = hex_to_hsbk(directive.color)?.with_brightness(directive.brightness);
    let device = light.device();
    device
        .set_power(true)
        .map_err(|e| Error::unreachable(&light.id, e))?;
    device
        .set_color(color)
        .map_err(|e| Error::unreachable(&light.id, e))
}

#[cfg(test)]
#[path = "tests/scene_tests.rs"]
mod tests;
