//! Interactive TUI for lightdeck.
//!
//! A box-drawing terminal menu: scene previews rendered as 256-color
//! swatches, a live connected-lights panel, and modal add/remove forms.
//! State lives in [`App`]; this module only draws frames and performs the
//! effects the state machine asks for.

use crate::app::{AddForm, App, Effect, Key, RemoveForm, Report, Screen, ADD_FIELDS};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    queue,
    style::{Attribute, Color, ResetColor, SetAttribute, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};
use lightdeck_control::{Outcome, Registry};
use lightdeck_core::color::hex_to_256;
use lightdeck_core::{Error, Scene, SceneCatalog};
use lightdeck_device::Connector;
use std::cmp::Ordering;
use std::io::{self, Write};

// ── Layout constants ─────────────────────────────────────────────────────

pub(crate) const W: usize = 76;
pub(crate) const INNER: usize = W - 4; // Content width between "║ " and " ║"
pub(crate) const BAR: usize = W - 2; // Fill width between ╔/╗, ╟/╢, ╚/╝
pub(crate) const TITLE: &str = "Lightdeck";

const NAME_WIDTH: usize = 15;
const SWATCH_WIDTH: usize = 8;
const SWATCH_GAP: usize = 2;
const SWATCH_ROWS: usize = 2;
const CHOICE_WIDTH: usize = 20;

// ── Types ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LightStatus {
    On(String),
    Off(String),
    Disconnected,
}

/// One row of the connected-lights panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PanelEntry {
    pub(crate) id: String,
    pub(crate) status: LightStatus,
}

// ── Entry point ──────────────────────────────────────────────────────────

pub fn run<C: Connector>(
    registry: &mut Registry<C>,
    catalog: SceneCatalog,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut out = io::stdout();
    let mut app = App::new(catalog);

    queue!(out, cursor::Hide)?;
    let result = session(&mut out, &mut app, registry);
    queue!(out, cursor::Show)?;
    draw_goodbye(&mut out)?;
    result?;
    Ok(())
}

fn session<C: Connector>(
    out: &mut impl Write,
    app: &mut App,
    registry: &mut Registry<C>,
) -> io::Result<()> {
    loop {
        draw_screen(out, app, registry)?;
        out.flush()?;

        let key = read_key()?;
        let Some(effect) = app.handle_key(key, &registry.ids()) else {
            continue;
        };
        if effect != Effect::Quit {
            // Processing screen stays up while the devices are contacted
            draw_screen(out, app, registry)?;
            out.flush()?;
        }
        match perform(registry, &app.catalog, effect) {
            Some(report) => app.show_report(report),
            None => return Ok(()),
        }
    }
}

/// Run one effect against the registry. `None` ends the session.
pub(crate) fn perform<C: Connector>(
    registry: &mut Registry<C>,
    catalog: &SceneCatalog,
    effect: Effect,
) -> Option<Report> {
    let report = match effect {
        Effect::Quit => return None,
        Effect::AddLight {
            id,
            mac_addr,
            ip_addr,
        } => Report::from_outcome(registry.add(&id, &mac_addr, &ip_addr)),
        Effect::RemoveLight(id) => Report::from_outcome(registry.remove(&id)),
        Effect::ApplyScene(name) => scene_report(registry.apply_scene(catalog, name)),
    };
    Some(report)
}

/// A known scene counts as applied even when individual lights failed.
pub(crate) fn scene_report(result: Result<Vec<Outcome>, Error>) -> Report {
    match result {
        Ok(details) => Report {
            success: true,
            heading: "Scene applied successfully!".to_string(),
            details,
        },
        Err(e) => Report {
            success: false,
            heading: "Failed to apply scene".to_string(),
            details: vec![Outcome::fail(e.to_string())],
        },
    }
}

fn draw_screen<C: Connector>(
    out: &mut impl Write,
    app: &App,
    registry: &Registry<C>,
) -> io::Result<()> {
    match &app.screen {
        Screen::Menu => draw_menu(out, &app.catalog, app.selected, &gather_lights(registry)),
        Screen::AddForm(form) => draw_add_form(out, form),
        Screen::RemoveForm(form) => draw_remove_form(out, form),
        Screen::Processing(banner) => draw_processing(out, banner),
        Screen::Result(report) => draw_result(out, report),
    }
}

// ── Key reading (brief raw mode) ─────────────────────────────────────────

fn read_key() -> io::Result<Key> {
    terminal::enable_raw_mode()?;
    let key = loop {
        match event::read() {
            Ok(Event::Key(ev)) => {
                if let Some(key) = map_key(ev) {
                    break Ok(key);
                }
            }
            Ok(_) => continue,
            Err(e) => break Err(e),
        }
    };
    terminal::disable_raw_mode()?;
    key
}

/// Translate a terminal key event. Only presses count; on Windows
/// crossterm also reports releases and repeats.
pub(crate) fn map_key(ev: KeyEvent) -> Option<Key> {
    if ev.kind != KeyEventKind::Press {
        return None;
    }
    match ev.code {
        KeyCode::Char('c') if ev.modifiers.contains(KeyModifiers::CONTROL) => Some(Key::Interrupt),
        KeyCode::Char(c) => Some(Key::Char(c)),
        KeyCode::Up => Some(Key::Up),
        KeyCode::Down => Some(Key::Down),
        KeyCode::Enter => Some(Key::Enter),
        KeyCode::Esc => Some(Key::Esc),
        KeyCode::Backspace => Some(Key::Backspace),
        _ => None,
    }
}

// ── Status gathering ─────────────────────────────────────────────────────

/// Query every registered light. Unreachable lights become `Disconnected`.
pub(crate) fn gather_lights<C: Connector>(registry: &Registry<C>) -> Vec<PanelEntry> {
    registry
        .ids()
        .into_iter()
        .map(|id| {
            let status = match registry.get_info(&id) {
                Some(info) if info.power => LightStatus::On(info.label),
                Some(info) => LightStatus::Off(info.label),
                None => LightStatus::Disconnected,
            };
            PanelEntry { id, status }
        })
        .collect()
}

// ============================================================================
// Drawing: Main menu
// ============================================================================

pub(crate) fn draw_menu(
    out: &mut impl Write,
    catalog: &SceneCatalog,
    selected: usize,
    lights: &[PanelEntry],
) -> io::Result<()> {
    queue!(out, Clear(ClearType::All), cursor::MoveTo(0, 0))?;

    draw_header(out, lights.len())?;
    draw_sep(out, " SCENES ")?;
    draw_empty(out)?;
    for (i, scene) in catalog.iter().enumerate() {
        draw_scene_row(out, scene, i == selected)?;
        draw_empty(out)?;
    }

    draw_sep(out, " CONNECTED LIGHTS ")?;
    draw_empty(out)?;
    if lights.is_empty() {
        draw_line(
            out,
            "  No lights registered. Press [A] to add one.",
            Color::DarkGrey,
        )?;
    }
    for entry in lights {
        let (text, color) = match &entry.status {
            LightStatus::On(label) => (
                format!("  \u{25CF} {}: {} (Connected)", entry.id, label),
                Color::Green,
            ),
            LightStatus::Off(label) => (
                format!("  \u{25CB} {}: {} (Off)", entry.id, label),
                Color::Yellow,
            ),
            LightStatus::Disconnected => (
                format!("  \u{25CB} {}: Disconnected", entry.id),
                Color::Red,
            ),
        };
        draw_line(out, &text, color)?;
    }
    draw_empty(out)?;

    draw_sep(out, "")?;
    draw_item(out, "\u{2191}/\u{2193}", "Select scene")?;
    draw_item(out, "Enter", "Apply selected scene")?;
    draw_item(out, "A", "Add new light")?;
    draw_item(out, "R", "Remove light")?;
    draw_item_quit(out)?;
    draw_bottom(out)?;
    Ok(())
}

pub(crate) fn draw_header(out: &mut impl Write, light_count: usize) -> io::Result<()> {
    draw_top(out, TITLE)?;
    let version_line = format!(
        "Version {}  \u{2502}  {} light(s) registered",
        env!("CARGO_PKG_VERSION"),
        light_count
    );
    draw_line_center(out, &version_line, Color::DarkGrey)?;
    Ok(())
}

/// Scene name plus one swatch per light slot, [`SWATCH_ROWS`] rows high.
fn draw_scene_row(out: &mut impl Write, scene: &Scene, selected: bool) -> io::Result<()> {
    let preview = NAME_WIDTH + 3 * (SWATCH_WIDTH + SWATCH_GAP);
    let left = (INNER - preview) / 2;
    let right = INNER - preview - left;
    let colors = scene.slot_colors();

    for row in 0..SWATCH_ROWS {
        let name = if row == 0 { scene.title() } else { String::new() };

        queue!(out, SetForegroundColor(Color::Cyan))?;
        write!(out, "\u{2551} {}", " ".repeat(left))?;
        queue!(out, SetForegroundColor(Color::White))?;
        if selected {
            queue!(out, SetAttribute(Attribute::Reverse))?;
        }
        write!(out, "{:<width$}", name, width = NAME_WIDTH)?;
        for hex in colors {
            // A reversed block would take the background color
            if selected {
                queue!(out, SetAttribute(Attribute::NoReverse))?;
            }
            draw_swatch(out, hex)?;
            if selected {
                queue!(
                    out,
                    SetForegroundColor(Color::White),
                    SetAttribute(Attribute::Reverse)
                )?;
            }
            write!(out, "{}", " ".repeat(SWATCH_GAP))?;
        }
        if selected {
            queue!(out, SetAttribute(Attribute::NoReverse))?;
        }
        queue!(out, SetForegroundColor(Color::Cyan))?;
        writeln!(out, "{} \u{2551}", " ".repeat(right))?;
        queue!(out, ResetColor)?;
    }
    Ok(())
}

fn draw_swatch(out: &mut impl Write, hex: Option<&str>) -> io::Result<()> {
    let Some(hex) = hex else {
        return write!(out, "{}", " ".repeat(SWATCH_WIDTH));
    };
    match hex_to_256(hex) {
        Some(index) => {
            queue!(out, SetForegroundColor(Color::AnsiValue(index)))?;
            write!(out, "{}", "\u{2588}".repeat(SWATCH_WIDTH))
        }
        None => {
            queue!(out, SetForegroundColor(Color::DarkGrey))?;
            write!(out, "{}", "\u{25A0}".repeat(SWATCH_WIDTH))
        }
    }
}

// ============================================================================
// Drawing: Forms
// ============================================================================

pub(crate) fn draw_add_form(out: &mut impl Write, form: &AddForm) -> io::Result<()> {
    queue!(out, Clear(ClearType::All), cursor::MoveTo(0, 0))?;

    draw_top(out, " ADD NEW LIGHT ")?;
    draw_empty(out)?;
    draw_line_center(out, "Press ESC at any time to cancel", Color::DarkGrey)?;
    draw_empty(out)?;

    for (i, (prompt, _)) in ADD_FIELDS.iter().enumerate() {
        let value = &form.values[i];
        let (shown, color) = match i.cmp(&form.field) {
            Ordering::Less => (value.clone(), Color::Green),
            Ordering::Equal => (format!("{value}_"), Color::White),
            Ordering::Greater => (String::new(), Color::DarkGrey),
        };
        draw_status(out, prompt.trim_end(), &shown, color)?;
    }

    draw_empty(out)?;
    let (_, max_len) = ADD_FIELDS[form.field];
    let hint = format!(
        "  Field {} of {}  \u{2502}  up to {} characters  \u{2502}  Enter to continue",
        form.field + 1,
        ADD_FIELDS.len(),
        max_len
    );
    draw_line(out, &hint, Color::DarkGrey)?;
    draw_bottom(out)?;
    Ok(())
}

pub(crate) fn draw_remove_form(out: &mut impl Write, form: &RemoveForm) -> io::Result<()> {
    queue!(out, Clear(ClearType::All), cursor::MoveTo(0, 0))?;

    draw_top(out, " REMOVE LIGHT ")?;
    draw_empty(out)?;
    draw_line(out, "  Select light to remove:", Color::White)?;
    draw_line(
        out,
        "  Use \u{2191}/\u{2193} to select, Enter to confirm, ESC to cancel",
        Color::DarkGrey,
    )?;
    draw_empty(out)?;
    for (i, id) in form.ids.iter().enumerate() {
        draw_choice(out, id, i == form.selected)?;
    }
    draw_empty(out)?;
    draw_bottom(out)?;
    Ok(())
}

// ============================================================================
// Drawing: Processing and result screens
// ============================================================================

pub(crate) fn draw_processing(out: &mut impl Write, banner: &str) -> io::Result<()> {
    queue!(out, Clear(ClearType::All), cursor::MoveTo(0, 0))?;
    draw_top(out, " PROCESSING ")?;
    draw_empty(out)?;
    draw_line(out, banner, Color::Yellow)?;
    draw_empty(out)?;
    draw_bottom(out)?;
    writeln!(out)?;
    Ok(())
}

pub(crate) fn draw_result(out: &mut impl Write, report: &Report) -> io::Result<()> {
    queue!(out, Clear(ClearType::All), cursor::MoveTo(0, 0))?;
    draw_top(out, " RESULT ")?;
    draw_empty(out)?;
    let color = if report.success {
        Color::Green
    } else {
        Color::Red
    };
    draw_line_center(out, &report.heading, color)?;
    if !report.details.is_empty() {
        draw_empty(out)?;
        for outcome in &report.details {
            draw_outcome(out, outcome)?;
        }
    }
    draw_empty(out)?;
    draw_bottom(out)?;

    writeln!(out)?;
    queue!(out, SetForegroundColor(Color::DarkGrey))?;
    write!(out, "  Press any key to continue...")?;
    queue!(out, ResetColor)?;
    Ok(())
}

pub(crate) fn draw_goodbye(out: &mut impl Write) -> io::Result<()> {
    queue!(out, Clear(ClearType::All), cursor::MoveTo(0, 0))?;

    let thank = "Thank you for using Lightdeck!";
    let n = 44usize;
    let bar = "\u{2550}".repeat(n);
    let empty = " ".repeat(n);

    writeln!(out)?;
    queue!(out, SetForegroundColor(Color::Cyan))?;
    writeln!(out, "  \u{2554}{}\u{2557}", bar)?;
    writeln!(out, "  \u{2551}{}\u{2551}", empty)?;
    write!(out, "  \u{2551} ")?;
    queue!(out, SetForegroundColor(Color::White))?;
    write!(out, "{:<width$}", thank, width = n - 2)?;
    queue!(out, SetForegroundColor(Color::Cyan))?;
    writeln!(out, " \u{2551}")?;
    writeln!(out, "  \u{2551}{}\u{2551}", empty)?;
    writeln!(out, "  \u{255A}{}\u{255D}", bar)?;
    queue!(out, ResetColor)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

// ============================================================================
// Box drawing primitives
// ============================================================================

fn draw_top(out: &mut impl Write, title: &str) -> io::Result<()> {
    queue!(out, SetForegroundColor(Color::Cyan))?;
    if title.is_empty() {
        writeln!(out, "\u{2554}{}\u{2557}", "\u{2550}".repeat(BAR))?;
    } else {
        let label = format!(" {} ", title.trim());
        let pad = BAR.saturating_sub(label.chars().count());
        let left = pad / 2;
        let right = pad - left;
        writeln!(
            out,
            "\u{2554}{}{}{}\u{2557}",
            "\u{2550}".repeat(left),
            label,
            "\u{2550}".repeat(right)
        )?;
    }
    queue!(out, ResetColor)?;
    Ok(())
}

fn draw_bottom(out: &mut impl Write) -> io::Result<()> {
    queue!(out, SetForegroundColor(Color::Cyan))?;
    writeln!(out, "\u{255A}{}\u{255D}", "\u{2550}".repeat(BAR))?;
    queue!(out, ResetColor)?;
    Ok(())
}

fn draw_sep(out: &mut impl Write, title: &str) -> io::Result<()> {
    queue!(out, SetForegroundColor(Color::DarkCyan))?;
    if title.is_empty() {
        writeln!(out, "\u{255F}{}\u{2562}", "\u{2500}".repeat(BAR))?;
    } else {
        let pad = BAR.saturating_sub(title.chars().count());
        let left = pad / 2;
        let right = pad - left;
        writeln!(
            out,
            "\u{255F}{}{}{}\u{2562}",
            "\u{2500}".repeat(left),
            title,
            "\u{2500}".repeat(right)
        )?;
    }
    queue!(out, ResetColor)?;
    Ok(())
}

fn draw_line(out: &mut impl Write, text: &str, color: Color) -> io::Result<()> {
    queue!(out, SetForegroundColor(Color::Cyan))?;
    write!(out, "\u{2551} ")?;
    queue!(out, SetForegroundColor(color))?;
    write!(out, "{:<width$}", fit(text, INNER), width = INNER)?;
    queue!(out, SetForegroundColor(Color::Cyan))?;
    writeln!(out, " \u{2551}")?;
    queue!(out, ResetColor)?;
    Ok(())
}

fn draw_line_center(out: &mut impl Write, text: &str, color: Color) -> io::Result<()> {
    queue!(out, SetForegroundColor(Color::Cyan))?;
    write!(out, "\u{2551} ")?;
    queue!(out, SetForegroundColor(color))?;
    write!(out, "{:^width$}", fit(text, INNER), width = INNER)?;
    queue!(out, SetForegroundColor(Color::Cyan))?;
    writeln!(out, " \u{2551}")?;
    queue!(out, ResetColor)?;
    Ok(())
}

fn draw_empty(out: &mut impl Write) -> io::Result<()> {
    draw_line(out, "", Color::White)
}

fn draw_item(out: &mut impl Write, key: &str, text: &str) -> io::Result<()> {
    let key_display = format!("[{}]", key);
    let prefix_len = 2 + key_display.chars().count() + 1; // indent + key + space
    let text_width = INNER.saturating_sub(prefix_len);

    queue!(out, SetForegroundColor(Color::Cyan))?;
    write!(out, "\u{2551} ")?;
    write!(out, "  ")?;
    queue!(out, SetForegroundColor(Color::Yellow))?;
    write!(out, "{}", key_display)?;
    queue!(out, SetForegroundColor(Color::White))?;
    write!(out, " {:<width$}", text, width = text_width)?;
    queue!(out, SetForegroundColor(Color::Cyan))?;
    writeln!(out, " \u{2551}")?;
    queue!(out, ResetColor)?;
    Ok(())
}

fn draw_item_quit(out: &mut impl Write) -> io::Result<()> {
    let key_display = "[Q]";
    let text = "Quit";
    let prefix_len = 2 + key_display.len() + 1;
    let text_width = INNER.saturating_sub(prefix_len);

    queue!(out, SetForegroundColor(Color::Cyan))?;
    write!(out, "\u{2551} ")?;
    write!(out, "  ")?;
    queue!(out, SetForegroundColor(Color::Red))?;
    write!(out, "{}", key_display)?;
    queue!(out, SetForegroundColor(Color::DarkGrey))?;
    write!(out, " {:<width$}", text, width = text_width)?;
    queue!(out, SetForegroundColor(Color::Cyan))?;
    writeln!(out, " \u{2551}")?;
    queue!(out, ResetColor)?;
    Ok(())
}

fn draw_status(out: &mut impl Write, label: &str, value: &str, color: Color) -> io::Result<()> {
    let prefix = format!("  {} ", label);
    let value_width = INNER.saturating_sub(prefix.chars().count());

    queue!(out, SetForegroundColor(Color::Cyan))?;
    write!(out, "\u{2551} ")?;
    queue!(out, SetForegroundColor(Color::Grey))?;
    write!(out, "{}", prefix)?;
    queue!(out, SetForegroundColor(color))?;
    write!(
        out,
        "{:<width$}",
        fit(value, value_width),
        width = value_width
    )?;
    queue!(out, SetForegroundColor(Color::Cyan))?;
    writeln!(out, " \u{2551}")?;
    queue!(out, ResetColor)?;
    Ok(())
}

/// Selectable list entry; the highlighted one is drawn in reverse video.
fn draw_choice(out: &mut impl Write, text: &str, selected: bool) -> io::Result<()> {
    let indent = 4;
    let rest = INNER - indent - CHOICE_WIDTH;

    queue!(out, SetForegroundColor(Color::Cyan))?;
    write!(out, "\u{2551} {}", " ".repeat(indent))?;
    queue!(out, SetForegroundColor(Color::White))?;
    if selected {
        queue!(out, SetAttribute(Attribute::Reverse))?;
    }
    write!(
        out,
        "{:<width$}",
        fit(text, CHOICE_WIDTH),
        width = CHOICE_WIDTH
    )?;
    if selected {
        queue!(out, SetAttribute(Attribute::NoReverse))?;
    }
    queue!(out, SetForegroundColor(Color::Cyan))?;
    writeln!(out, "{} \u{2551}", " ".repeat(rest))?;
    queue!(out, ResetColor)?;
    Ok(())
}

/// `[ OK ]` / `[FAIL]` line inside the box.
fn draw_outcome(out: &mut impl Write, outcome: &Outcome) -> io::Result<()> {
    let (tag, color) = if outcome.success {
        ("[ OK ]", Color::Green)
    } else {
        ("[FAIL]", Color::Red)
    };
    let prefix_len = 2 + tag.len() + 1;
    let text_width = INNER - prefix_len;

    queue!(out, SetForegroundColor(Color::Cyan))?;
    write!(out, "\u{2551}   ")?;
    queue!(out, SetForegroundColor(color))?;
    write!(out, "{}", tag)?;
    queue!(out, SetForegroundColor(Color::White))?;
    write!(
        out,
        " {:<width$}",
        fit(&outcome.message, text_width),
        width = text_width
    )?;
    queue!(out, SetForegroundColor(Color::Cyan))?;
    writeln!(out, " \u{2551}")?;
    queue!(out, ResetColor)?;
    Ok(())
}

/// Clip `text` to `width` characters, marking the cut with an ellipsis.
fn fit(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut clipped: String = text.chars().take(width.saturating_sub(1)).collect();
    clipped.push('\u{2026}');
    clipped
}

#[cfg(test)]
mod tests {
    use super::*;
    use lightdeck_core::scenes::LIGHT_SLOTS;

    fn render_to_string<F>(f: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> io::Result<()>,
    {
        let mut buf = Vec::new();
        f(&mut buf).expect("draw should not fail");
        String::from_utf8_lossy(&buf).to_string()
    }

    /// Drop CSI escape sequences so only the visible text remains.
    fn strip_ansi(s: &str) -> String {
        let mut out = String::new();
        let mut chars = s.chars().peekable();
        while let Some(c) = chars.next() {
            if c == '\u{1b}' && chars.peek() == Some(&'[') {
                chars.next();
                for c in chars.by_ref() {
                    if ('@'..='~').contains(&c) {
                        break;
                    }
                }
            } else {
                out.push(c);
            }
        }
        out
    }

    fn assert_box_width(rendered: &str) {
        for line in strip_ansi(rendered).lines() {
            let line = line.trim_start_matches(['\r']);
            if line.starts_with('\u{2551}')
                || line.starts_with('\u{2554}')
                || line.starts_with('\u{255F}')
                || line.starts_with('\u{255A}')
            {
                assert_eq!(line.chars().count(), W, "bad width: {line:?}");
            }
        }
    }

    fn panel() -> Vec<PanelEntry> {
        vec![
            PanelEntry {
                id: "light1".into(),
                status: LightStatus::On("Desk".into()),
            },
            PanelEntry {
                id: "light2".into(),
                status: LightStatus::Off("Shelf".into()),
            },
            PanelEntry {
                id: "light3".into(),
                status: LightStatus::Disconnected,
            },
        ]
    }

    fn menu(selected: usize, lights: &[PanelEntry]) -> String {
        let catalog = SceneCatalog::builtin();
        render_to_string(|buf| draw_menu(buf, &catalog, selected, lights))
    }

    // ── Constants ────────────────────────────────────────────────

    #[test]
    fn layout_constants_are_consistent() {
        assert_eq!(INNER, W - 4);
        assert_eq!(BAR, W - 2);
        assert!(NAME_WIDTH + 3 * (SWATCH_WIDTH + SWATCH_GAP) <= INNER);
    }

    // ── Menu ─────────────────────────────────────────────────────

    #[test]
    fn menu_lists_every_scene_title() {
        let text = strip_ansi(&menu(0, &[]));
        for name in ["Nature", "Ocean", "Sunset", "Movie", "Lime", "Game", "Night"] {
            assert!(text.contains(name), "missing {name}");
        }
    }

    #[test]
    fn only_selected_scene_is_reversed() {
        let rendered = menu(3, &[]);
        let reverse = format!("{}", SetAttribute(Attribute::Reverse));
        // name cell plus one gap per slot, on every swatch row
        assert_eq!(
            rendered.matches(&reverse).count(),
            SWATCH_ROWS * (1 + LIGHT_SLOTS.len())
        );

        let first_reverse = rendered.find(&reverse).unwrap();
        let movie = rendered.find("Movie").unwrap();
        assert!(first_reverse < movie);
        assert!(rendered.find("Game").unwrap() > movie);
    }

    #[test]
    fn selected_row_reverses_gaps_but_not_swatches() {
        let rendered = menu(0, &[]);
        let reverse = format!("{}", SetAttribute(Attribute::Reverse));
        let no_reverse = format!("{}", SetAttribute(Attribute::NoReverse));
        let reversed_gap = format!("{reverse}{}", " ".repeat(SWATCH_GAP));
        assert_eq!(
            rendered.matches(&reversed_gap).count(),
            SWATCH_ROWS * LIGHT_SLOTS.len()
        );

        let index = hex_to_256("474A2C").unwrap();
        let swatch = format!("{}", SetForegroundColor(Color::AnsiValue(index)));
        let at = rendered.find(&swatch).unwrap();
        assert!(
            rendered[..at].ends_with(&no_reverse),
            "nature swatch drawn reversed"
        );
        assert_box_width(&rendered);
    }

    #[test]
    fn swatches_use_palette_colors() {
        let rendered = menu(0, &[]);
        let index = hex_to_256("1A936F").unwrap();
        let sgr = format!("{}", SetForegroundColor(Color::AnsiValue(index)));
        assert!(rendered.contains(&sgr), "ocean light1 swatch missing");
        assert!(rendered.contains(&"\u{2588}".repeat(SWATCH_WIDTH)));
    }

    #[test]
    fn missing_slot_renders_blank() {
        const PARTIAL: &[Scene] = &[Scene {
            name: "solo",
            directives: &[lightdeck_core::Directive {
                light_id: "light2",
                color: "FF0000",
                brightness: 65535,
            }],
        }];
        let rendered = render_to_string(|buf| {
            draw_menu(buf, &SceneCatalog::new(PARTIAL), 0, &[])
        });
        let block = "\u{2588}".repeat(SWATCH_WIDTH);
        assert_eq!(rendered.matches(&block).count(), SWATCH_ROWS);
        assert_box_width(&rendered);
    }

    #[test]
    fn panel_shows_connected_off_and_disconnected() {
        let text = strip_ansi(&menu(0, &panel()));
        assert!(text.contains("light1: Desk (Connected)"));
        assert!(text.contains("light2: Shelf (Off)"));
        assert!(text.contains("light3: Disconnected"));
        assert!(text.contains("3 light(s) registered"));
    }

    #[test]
    fn empty_panel_explains_how_to_add() {
        let text = strip_ansi(&menu(0, &[]));
        assert!(text.contains("No lights registered"));
    }

    #[test]
    fn menu_box_is_aligned() {
        assert_box_width(&menu(0, &panel()));
    }

    #[test]
    fn long_labels_are_clipped() {
        let lights = vec![PanelEntry {
            id: "light1".into(),
            status: LightStatus::On("x".repeat(200)),
        }];
        assert_box_width(&menu(0, &lights));
    }

    // ── Forms ────────────────────────────────────────────────────

    #[test]
    fn add_form_shows_prompts_and_cursor() {
        let form = AddForm {
            values: ["light4".into(), "d0:73".into(), String::new()],
            field: 1,
        };
        let rendered = render_to_string(|buf| draw_add_form(buf, &form));
        let text = strip_ansi(&rendered);
        assert!(text.contains("Light ID (e.g., light4): light4"));
        assert!(text.contains("d0:73_"));
        assert!(text.contains("IP Address (e.g., 192.168.1.xxx):"));
        assert!(text.contains("Press ESC at any time to cancel"));
        assert!(text.contains("Field 2 of 3"));
        assert_box_width(&rendered);
    }

    #[test]
    fn remove_form_highlights_selection() {
        let form = RemoveForm {
            ids: vec!["light1".into(), "light2".into()],
            selected: 1,
        };
        let rendered = render_to_string(|buf| draw_remove_form(buf, &form));
        let reverse = format!("{}", SetAttribute(Attribute::Reverse));
        let at = rendered.find(&reverse).unwrap();
        assert!(rendered[at..].trim_start_matches(&reverse).starts_with("light2"));
        assert_box_width(&rendered);
    }

    // ── Result screens ───────────────────────────────────────────

    #[test]
    fn processing_shows_banner() {
        let text = strip_ansi(&render_to_string(|buf| {
            draw_processing(buf, "Applying scene: movie")
        }));
        assert!(text.contains("PROCESSING"));
        assert!(text.contains("Applying scene: movie"));
    }

    #[test]
    fn result_lists_each_light() {
        let report = scene_report(Ok(vec![
            Outcome::ok("Applied movie to light1"),
            Outcome::fail("Failed to process light2: timeout"),
        ]));
        let rendered = render_to_string(|buf| draw_result(buf, &report));
        let text = strip_ansi(&rendered);
        assert!(text.contains("Scene applied successfully!"));
        assert!(text.contains("[ OK ] Applied movie to light1"));
        assert!(text.contains("[FAIL] Failed to process light2: timeout"));
        assert!(text.contains("Press any key to continue..."));
        assert_box_width(&rendered);
    }

    #[test]
    fn unknown_scene_reports_failure() {
        let report = scene_report(Err(Error::UnknownScene("disco".into())));
        assert!(!report.success);
        assert_eq!(report.heading, "Failed to apply scene");
    }

    #[test]
    fn goodbye_thanks_the_user() {
        let text = strip_ansi(&render_to_string(|buf| draw_goodbye(buf)));
        assert!(text.contains("Thank you for using Lightdeck!"));
    }

    // ── Registry wiring ──────────────────────────────────────────

    use lightdeck_core::Hsbk;
    use lightdeck_device::{Device, DeviceError};

    const MAC: &str = "d0:73:d5:01:02:03";

    /// Bulbs at 10.0.0.1 ("Desk", powered on) answer; every other IP fails.
    struct StubConnector;

    struct StubBulb {
        label: Option<&'static str>,
    }

    impl StubBulb {
        fn answer<T>(&self, value: T) -> Result<T, DeviceError> {
            match self.label {
                Some(_) => Ok(value),
                None => Err(DeviceError::Protocol("no reply".into())),
            }
        }
    }

    impl Connector for StubConnector {
        type Device = StubBulb;

        fn connect(&self, _mac_addr: &str, ip_addr: &str) -> Result<StubBulb, DeviceError> {
            let label = (ip_addr == "10.0.0.1").then_some("Desk");
            Ok(StubBulb { label })
        }
    }

    impl Device for StubBulb {
        fn get_label(&self) -> Result<String, DeviceError> {
            self.answer(self.label.unwrap_or_default().to_string())
        }

        fn get_power(&self) -> Result<bool, DeviceError> {
            self.answer(true)
        }

        fn set_power(&self, _on: bool) -> Result<(), DeviceError> {
            self.answer(())
        }

        fn get_color(&self) -> Result<Hsbk, DeviceError> {
            self.answer(Hsbk::default())
        }

        fn set_color(&self, _color: Hsbk) -> Result<(), DeviceError> {
            self.answer(())
        }
    }

    /// Registry with `light1` reachable and `light2` silent.
    fn stub_registry() -> (tempfile::TempDir, Registry<StubConnector>) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lights_config.json");
        std::fs::write(
            &path,
            format!(
                r#"{{"light1": {{"mac_addr": "{MAC}", "ip_addr": "10.0.0.1"}},
                    "light2": {{"mac_addr": "{MAC}", "ip_addr": "10.0.0.2"}}}}"#
            ),
        )
        .unwrap();
        let registry = Registry::load(path, StubConnector).unwrap();
        (dir, registry)
    }

    #[test]
    fn gather_lights_marks_failed_queries_disconnected() {
        let (_dir, registry) = stub_registry();
        assert_eq!(
            gather_lights(&registry),
            vec![
                PanelEntry {
                    id: "light1".into(),
                    status: LightStatus::On("Desk".into()),
                },
                PanelEntry {
                    id: "light2".into(),
                    status: LightStatus::Disconnected,
                },
            ]
        );
    }

    #[test]
    fn menu_frame_survives_unreachable_light() {
        let (_dir, registry) = stub_registry();
        let lights = gather_lights(&registry);
        let rendered = menu(0, &lights);
        let text = strip_ansi(&rendered);
        assert!(text.contains("light1: Desk (Connected)"));
        assert!(text.contains("light2: Disconnected"));
        assert_box_width(&rendered);
    }

    #[test]
    fn perform_scene_reports_each_light() {
        let (_dir, mut registry) = stub_registry();
        let catalog = SceneCatalog::builtin();
        let report = perform(&mut registry, &catalog, Effect::ApplyScene("movie")).unwrap();
        assert!(report.success);
        assert_eq!(report.heading, "Scene applied successfully!");
        assert_eq!(report.details.len(), 2);
        assert_eq!(report.details[0], Outcome::ok("Applied movie to light1"));
        assert!(!report.details[1].success);
        assert!(report.details[1]
            .message
            .starts_with("Failed to process light2"));
    }

    #[test]
    fn perform_remove_updates_registry() {
        let (_dir, mut registry) = stub_registry();
        let catalog = SceneCatalog::builtin();
        let report = perform(
            &mut registry,
            &catalog,
            Effect::RemoveLight("light2".into()),
        )
        .unwrap();
        assert_eq!(
            report,
            Report::from_outcome(Outcome::ok("Light light2 removed successfully!"))
        );
        assert_eq!(registry.ids(), ["light1"]);
    }

    #[test]
    fn perform_add_of_silent_light_fails() {
        let (_dir, mut registry) = stub_registry();
        let catalog = SceneCatalog::builtin();
        let effect = Effect::AddLight {
            id: "light3".into(),
            mac_addr: MAC.into(),
            ip_addr: "10.0.0.3".into(),
        };
        let report = perform(&mut registry, &catalog, effect).unwrap();
        assert!(!report.success);
        let heading = &report.heading;
        assert!(heading.starts_with("Error adding light"), "{heading}");
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn perform_quit_ends_session() {
        let (_dir, mut registry) = stub_registry();
        let catalog = SceneCatalog::builtin();
        assert!(perform(&mut registry, &catalog, Effect::Quit).is_none());
    }

    // ── Keys ─────────────────────────────────────────────────────

    #[test]
    fn ctrl_c_is_interrupt() {
        let ev = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(map_key(ev), Some(Key::Interrupt));
        let ev = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE);
        assert_eq!(map_key(ev), Some(Key::Char('c')));
    }

    #[test]
    fn releases_and_unused_keys_are_ignored() {
        let mut ev = KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE);
        ev.kind = KeyEventKind::Release;
        assert_eq!(map_key(ev), None);
        let f1 = KeyEvent::new(KeyCode::F(1), KeyModifiers::NONE);
        assert_eq!(map_key(f1), None);
        assert_eq!(
            map_key(KeyEvent::new(KeyCode::Up, KeyModifiers::NONE)),
            Some(Key::Up)
        );
    }

    #[test]
    fn fit_clips_with_ellipsis() {
        assert_eq!(fit("short", 10), "short");
        assert_eq!(fit("abcdefghij", 5), "abcd\u{2026}");
    }
}
