//! Built-in scene catalog.
//!
//! A scene assigns a hex color and an explicit brightness to each of the
//! three light slots `light1`..`light3`. The catalog is static data; callers
//! receive it by reference so tests can substitute their own table.

/// Light ids every built-in scene addresses, in preview order.
pub const LIGHT_SLOTS: [&str; 3] = ["light1", "light2", "light3"];

/// One light's target inside a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Directive {
    pub light_id: &'static str,
    /// `RRGGBB`, no `#`.
    pub color: &'static str,
    /// Overrides the brightness derived from `color`.
    pub brightness: u16,
}

/// A named preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scene {
    pub name: &'static str,
    pub directives: &'static [Directive],
}

impl Scene {
    /// Directive for `light_id`, if the scene addresses it.
    pub fn directive(&self, light_id: &str) -> Option<&Directive> {
        self.directives.iter().find(|d| d.light_id == light_id)
    }

    /// Hex color per [`LIGHT_SLOTS`] entry (`None` for slots the scene skips).
    pub fn slot_colors(&self) -> [Option<&'static str>; 3] {
        LIGHT_SLOTS.map(|slot| self.directive(slot).map(|d| d.color))
    }

    /// Display name: first letter uppercased.
    pub fn title(&self) -> String {
        let mut chars = self.name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

/// Read-only, ordered table of scenes.
#[derive(Debug, Clone, Copy)]
pub struct SceneCatalog {
    scenes: &'static [Scene],
}

impl Default for SceneCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl SceneCatalog {
    pub const fn new(scenes: &'static [Scene]) -> Self {
        Self { scenes }
    }

    /// The seven scenes shipped with lightdeck.
    pub const fn builtin() -> Self {
        Self::new(BUILTIN)
    }

    /// Case-insensitive lookup by name.
    pub fn get(&self, name: &str) -> Option<&'static Scene> {
        self.scenes
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name))
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.scenes.iter().map(|s| s.name).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static Scene> {
        self.scenes.iter()
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }
}

const fn d(light_id: &'static str, color: &'static str, brightness: u16) -> Directive {
    Directive {
        light_id,
        color,
        brightness,
    }
}

const FULL: u16 = 65535;
const DIM: u16 = 20000;

const BUILTIN: &[Scene] = &[
    Scene {
        name: "nature",
        directives: &[
            d("light1", "474A2C", FULL), // drab dark brown
            d("light2", "636940", FULL), // dark moss green
            d("light3", "59A96A", FULL), // jade
        ],
    },
    Scene {
        name: "ocean",
        directives: &[
            d("light1", "1A936F", FULL), // sea green
            d("light2", "88D498", FULL), // celadon
            d("light3", "FFFFFF", FULL),
        ],
    },
    Scene {
        name: "sunset",
        directives: &[
            d("light1", "CE4993", FULL), // mulberry
            d("light2", "FB9062", FULL), // atomic tangerine
            d("light3", "EEAF61", FULL), // earth yellow
        ],
    },
    Scene {
        name: "movie",
        directives: &[
            d("light1", "1A1A1A", DIM),
            d("light2", "000000", 0),
            d("light3", "1A1A1A", DIM),
        ],
    },
    Scene {
        name: "lime",
        directives: &[
            d("light1", "D7FFF1", FULL), // mint green
            d("light2", "AAFCB8", FULL),
            d("light3", "8CD790", FULL),
        ],
    },
    Scene {
        name: "game",
        directives: &[
            d("light1", "1D2F6F", FULL), // delft blue
            d("light2", "8390FA", FULL), // vista blue
            d("light3", "FAC748", FULL), // saffron
        ],
    },
    Scene {
        name: "night",
        directives: &[
            d("light1", "1A1A1A", DIM),
            d("light2", "1A1A1A", DIM),
            d("light3", "1A1A1A", DIM),
        ],
    },
];

#[cfg(test)]
#[path = "tests/scenes_tests.rs"]
mod tests;
