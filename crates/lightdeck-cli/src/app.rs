//! Interactive session state machine.
//!
//! [`App::handle_key`] is the only transition function. It never touches a
//! device or the terminal; anything with side effects is returned as an
//! [`Effect`] for the caller to perform, after which the caller reports the
//! result back through [`App::show_report`].

use lightdeck_control::Outcome;
use lightdeck_core::SceneCatalog;

/// Keys the session reacts to. Everything else is dropped by the reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Key {
    Up,
    Down,
    Enter,
    Esc,
    Backspace,
    Char(char),
    /// Ctrl+C
    Interrupt,
}

/// Work the caller must perform for a transition to complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Effect {
    Quit,
    AddLight {
        id: String,
        mac_addr: String,
        ip_addr: String,
    },
    RemoveLight(String),
    ApplyScene(&'static str),
}

/// Prompt and maximum length of each add-form field, in entry order.
pub(crate) const ADD_FIELDS: [(&str, usize); 3] = [
    ("Light ID (e.g., light4): ", 20),
    ("MAC Address (e.g., d0:73:d5:xx:xx:xx): ", 17),
    ("IP Address (e.g., 192.168.1.xxx): ", 15),
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct AddForm {
    pub(crate) values: [String; 3],
    /// Index into [`ADD_FIELDS`] of the field being edited.
    pub(crate) field: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RemoveForm {
    pub(crate) ids: Vec<String>,
    pub(crate) selected: usize,
}

/// Text shown on the result screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Report {
    pub(crate) success: bool,
    pub(crate) heading: String,
    pub(crate) details: Vec<Outcome>,
}

impl Report {
    pub(crate) fn from_outcome(outcome: Outcome) -> Self {
        Self {
            success: outcome.success,
            heading: outcome.message,
            details: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Screen {
    Menu,
    AddForm(AddForm),
    RemoveForm(RemoveForm),
    /// Transient: shown while an [`Effect`] runs.
    Processing(String),
    /// Waits for any key, then returns to the menu.
    Result(Report),
}

pub(crate) struct App {
    pub(crate) catalog: SceneCatalog,
    pub(crate) screen: Screen,
    /// Highlighted scene row on the menu.
    pub(crate) selected: usize,
}

impl App {
    pub(crate) fn new(catalog: SceneCatalog) -> Self {
        Self {
            catalog,
            screen: Screen::Menu,
            selected: 0,
        }
    }

    /// Advance the state machine by one key press.
    ///
    /// `light_ids` is the current registry order; it seeds the remove form.
    pub(crate) fn handle_key(&mut self, key: Key, light_ids: &[String]) -> Option<Effect> {
        if key == Key::Interrupt {
            return Some(Effect::Quit);
        }
        if self.screen == Screen::Menu {
            return self.menu_key(key, light_ids);
        }
        match &mut self.screen {
            Screen::Menu => None,
            Screen::AddForm(form) => {
                let effect = add_form_key(form, key);
                match &effect {
                    Some(Effect::AddLight { id, .. }) => {
                        self.screen = Screen::Processing(format!("Adding light {id}..."));
                    }
                    Some(_) => {}
                    None if key == Key::Esc => self.screen = Screen::Menu,
                    None => {}
                }
                effect
            }
            Screen::RemoveForm(form) => match key {
                Key::Up => {
                    form.selected = form.selected.saturating_sub(1);
                    None
                }
                Key::Down => {
                    if form.selected + 1 < form.ids.len() {
                        form.selected += 1;
                    }
                    None
                }
                Key::Enter => {
                    let id = form.ids.get(form.selected)?.clone();
                    self.screen = Screen::Processing(format!("Removing light {id}..."));
                    Some(Effect::RemoveLight(id))
                }
                Key::Esc => {
                    self.screen = Screen::Menu;
                    None
                }
                _ => None,
            },
            Screen::Processing(_) => None,
            Screen::Result(_) => {
                self.screen = Screen::Menu;
                None
            }
        }
    }

    fn menu_key(&mut self, key: Key, light_ids: &[String]) -> Option<Effect> {
        match key {
            Key::Up => self.selected = self.selected.saturating_sub(1),
            Key::Down => {
                if self.selected + 1 < self.catalog.len() {
                    self.selected += 1;
                }
            }
            Key::Enter => {
                let scene = self.catalog.iter().nth(self.selected)?;
                self.screen = Screen::Processing(format!("Applying scene: {}", scene.name));
                return Some(Effect::ApplyScene(scene.name));
            }
            Key::Esc => return Some(Effect::Quit),
            Key::Char(c) => match c.to_ascii_lowercase() {
                'q' => return Some(Effect::Quit),
                'a' => self.screen = Screen::AddForm(AddForm::default()),
                'r' if light_ids.is_empty() => {
                    self.screen = Screen::Result(Report {
                        success: false,
                        heading: "No lights available to remove".to_string(),
                        details: Vec::new(),
                    })
                }
                'r' => {
                    self.screen = Screen::RemoveForm(RemoveForm {
                        ids: light_ids.to_vec(),
                        selected: 0,
                    })
                }
                _ => {}
            },
            _ => {}
        }
        None
    }

    /// Finish a [`Screen::Processing`] step.
    pub(crate) fn show_report(&mut self, report: Report) {
        self.screen = Screen::Result(report);
    }
}

fn add_form_key(form: &mut AddForm, key: Key) -> Option<Effect> {
    let (_, max_len) = ADD_FIELDS[form.field];
    let value = &mut form.values[form.field];
    match key {
        Key::Char(c) if !c.is_control() && value.chars().count() < max_len => value.push(c),
        Key::Backspace => {
            value.pop();
        }
        Key::Enter if !value.trim().is_empty() => {
            if form.field + 1 < ADD_FIELDS.len() {
                form.field += 1;
            } else {
                let [id, mac_addr, ip_addr] = form.values.clone();
                return Some(Effect::AddLight {
                    id,
                    mac_addr,
                    ip_addr,
                });
            }
        }
        _ => {}
    }
    None
}
