//! lightdeck: LIFX smart light controller.
//!
//! Runs one-shot commands (`on`, `off`, `<scene> on`, per-light control,
//! registry and settings management) or, with no command on a terminal,
//! the interactive scene picker.

use clap::{Parser, Subcommand, ValueEnum};
use lightdeck_control::{Outcome, Registry};
use lightdeck_core::color::hex_to_hsbk;
use lightdeck_core::config::{self, Settings};
use lightdeck_core::{Directive, SceneCatalog};
use lightdeck_device::LifxConnector;
use std::error::Error;
use std::ffi::OsString;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

mod app;
mod tui;

/// Exit status for invocations that do not name a valid command.
const USAGE_ERROR: u8 = 2;

/// Hidden subcommand that carries `<scene> on`.
const SCENE_COMMAND: &str = "scene";

/// Subcommand names, matched case-insensitively before clap sees them.
const KEYWORDS: &[&str] = &[
    "on",
    "off",
    "list",
    "scenes",
    "add",
    "remove",
    "toggle",
    "power",
    "color",
    "brightness",
    "config",
    "help",
];

#[derive(Parser)]
#[command(
    name = "lightdeck",
    version,
    about = "LIFX smart light controller",
    long_about = "Controls LIFX bulbs on the local network.\n\n\
        Run without a command to open the interactive scene picker, or use\n\
        `lightdeck on`, `lightdeck off`, and `lightdeck <scene> on` from scripts."
)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Light registry file (default: lights_config.json, or registry_path from lightdeck.toml)
    #[arg(long, global = true, value_name = "PATH")]
    registry: Option<PathBuf>,

    /// Force non-interactive CLI mode (skip TUI)
    #[arg(long, global = true)]
    non_interactive: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Turn every registered light on at full-brightness neutral white
    On,

    /// Turn every registered light off
    Off,

    /// Show every registered light with its live state
    List,

    /// Show the built-in scenes
    Scenes,

    /// Register a light after checking that it answers
    Add {
        /// Unique light id (e.g. light4)
        id: String,
        /// MAC address (e.g. d0:73:d5:01:02:03)
        mac_addr: String,
        /// IP address (e.g. 192.168.1.40)
        ip_addr: String,
    },

    /// Forget a registered light
    Remove { id: String },

    /// Flip one light's power state
    Toggle { id: String },

    /// Switch one light on or off
    Power {
        id: String,
        #[arg(value_enum, ignore_case = true)]
        state: PowerState,
    },

    /// Set one light's color from a hex string (RRGGBB)
    Color { id: String, hex: String },

    /// Set one light's brightness, keeping its color
    Brightness {
        id: String,
        /// 0-65535
        level: u16,
    },

    /// Settings management
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },

    /// Apply a built-in scene; written `lightdeck <scene> on`
    #[command(hide = true)]
    Scene {
        #[arg(required = true)]
        words: Vec<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PowerState {
    On,
    Off,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current settings
    Show,
    /// Print settings file path
    Path,
    /// Reset settings to defaults
    Reset,
}

fn main() -> Result<ExitCode, Box<dyn Error>> {
    let cli = Cli::parse_from(normalize_command(std::env::args_os().collect()));

    // No subcommand → interactive TUI (unless --non-interactive or not a terminal)
    if cli.command.is_none() {
        if !cli.non_interactive && std::io::stdout().is_terminal() {
            let settings = Settings::load();
            let path = cli.registry.unwrap_or_else(|| settings.registry_path());
            let mut registry = open_registry(path, &settings)?;
            tui::run(&mut registry, SceneCatalog::builtin())?;
            return Ok(ExitCode::SUCCESS);
        }
        // Non-interactive or not a terminal → show help
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(ExitCode::SUCCESS);
    }

    // CLI mode: console logger
    init_logger(cli.verbose);
    let settings = Settings::load();
    if settings.verbose {
        log::set_max_level(log::LevelFilter::Debug);
    }

    let catalog = SceneCatalog::builtin();
    let registry_path = cli
        .registry
        .clone()
        .unwrap_or_else(|| settings.registry_path());
    let open = || open_registry(registry_path.clone(), &settings);

    let code = match cli.command {
        None => unreachable!(), // handled above
        Some(Commands::Config { action }) => cmd_config(action)?,
        Some(Commands::Scenes) => cmd_scenes(&catalog),
        Some(Commands::Scene { words }) => cmd_scene(&open()?, &catalog, &words),
        Some(Commands::On) => print_bulk(&open()?.turn_all_on()),
        Some(Commands::Off) => print_bulk(&open()?.turn_all_off()),
        Some(Commands::List) => cmd_list(&open()?),
        Some(Commands::Add {
            id,
            mac_addr,
            ip_addr,
        }) => print_single(&open()?.add(&id, &mac_addr, &ip_addr)),
        Some(Commands::Remove { id }) => print_single(&open()?.remove(&id)),
        Some(Commands::Toggle { id }) => print_single(&open()?.toggle(&id)),
        Some(Commands::Power { id, state }) => {
            let on = matches!(state, PowerState::On);
            print_single(&open()?.set_power(&id, on))
        }
        Some(Commands::Color { id, hex }) => match hex_to_hsbk(&hex) {
            Ok(color) => print_single(&open()?.set_color(&id, color)),
            Err(e) => {
                eprintln!("[ERR ] {e}");
                ExitCode::from(USAGE_ERROR)
            }
        },
        Some(Commands::Brightness { id, level }) => {
            print_single(&open()?.set_brightness(&id, level))
        }
    };

    Ok(code)
}

/// Lowercase the command word when it is a known keyword, so `ON` and
/// `List` behave like `on` and `list`. Any other command word is a scene
/// name and gets the hidden scene subcommand in front of it, so global
/// flags after `<scene> on` still reach clap.
fn normalize_command(mut args: Vec<OsString>) -> Vec<OsString> {
    let mut skip_value = false;
    let mut command = None;
    for (i, arg) in args.iter().enumerate().skip(1) {
        let Some(s) = arg.to_str() else { break };
        if skip_value {
            skip_value = false;
            continue;
        }
        if s == "--registry" {
            skip_value = true;
            continue;
        }
        if s.starts_with('-') {
            continue;
        }
        command = Some((i, s.to_ascii_lowercase()));
        break;
    }

    if let Some((i, lower)) = command {
        if KEYWORDS.contains(&lower.as_str()) {
            args[i] = lower.into();
        } else {
            args.insert(i, SCENE_COMMAND.into());
        }
    }
    args
}

fn init_logger(verbose: bool) {
    // The logger admits everything; the global max level does the filtering
    // so the settings file can still raise it after startup.
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Debug)
        .format_timestamp(None)
        .init();
    log::set_max_level(if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    });
}

fn open_registry(
    path: PathBuf,
    settings: &Settings,
) -> Result<Registry<LifxConnector>, Box<dyn Error>> {
    let connector = LifxConnector::new(
        Duration::from_millis(settings.timeout_ms),
        settings.attempts,
    );
    Ok(Registry::load(path, connector)?)
}

// ============================================================================
// Command implementations
// ============================================================================

fn cmd_scene(
    registry: &Registry<LifxConnector>,
    catalog: &SceneCatalog,
    args: &[String],
) -> ExitCode {
    match args {
        [name, action] if action.eq_ignore_ascii_case("on") => {
            match registry.apply_scene(catalog, name) {
                Ok(outcomes) => {
                    println!("[INFO] Applying scene {}...", name.to_ascii_lowercase());
                    print_bulk(&outcomes)
                }
                Err(e) => {
                    eprintln!("[ERR ] {e}");
                    print_available(catalog);
                    ExitCode::FAILURE
                }
            }
        }
        _ => {
            eprintln!("[ERR ] Invalid command: {}", args.join(" "));
            eprintln!("Usage: lightdeck [on | off | <scene> on] (see --help)");
            print_available(catalog);
            ExitCode::from(USAGE_ERROR)
        }
    }
}

fn print_available(catalog: &SceneCatalog) {
    eprintln!("Available scenes: {}", catalog.names().join(", "));
}

fn cmd_scenes(catalog: &SceneCatalog) -> ExitCode {
    println!("{} scene(s):\n", catalog.len());
    for scene in catalog.iter() {
        let slots: Vec<String> = scene
            .directives
            .iter()
            .map(describe_slot)
            .collect();
        println!("  {:<8} {}", scene.name, slots.join("   "));
    }
    ExitCode::SUCCESS
}

fn describe_slot(d: &Directive) -> String {
    format!("{} #{} @ {:>5}", d.light_id, d.color, d.brightness)
}

fn cmd_list(registry: &Registry<LifxConnector>) -> ExitCode {
    if registry.is_empty() {
        println!("No lights registered ({}).", registry.path().display());
        return ExitCode::SUCCESS;
    }
    println!(
        "{} light(s) in {}:\n",
        registry.len(),
        registry.path().display()
    );
    for light in registry.lights() {
        match registry.get_info(&light.id) {
            Some(info) => println!(
                "  {:<12} {:<20} {:<4} {:<15} {}",
                info.id,
                info.label,
                if info.power { "On" } else { "Off" },
                info.ip_addr,
                info.mac_addr
            ),
            None => println!(
                "  {:<12} {:<20} {:<4} {:<15} {}",
                light.id, "Disconnected", "-", light.ip_addr, light.mac_addr
            ),
        }
    }
    ExitCode::SUCCESS
}

fn cmd_config(action: Option<ConfigAction>) -> Result<ExitCode, Box<dyn Error>> {
    match action {
        None | Some(ConfigAction::Show) => {
            let settings = Settings::load();
            println!("Config file: {}\n", config::config_path().display());
            println!("── Registry ──");
            println!("  registry_path = \"{}\"", settings.registry_path);
            println!("\n── Network ──");
            println!("  timeout_ms    = {}", settings.timeout_ms);
            println!("  attempts      = {}", settings.attempts);
            println!("\n── Debug ──");
            println!("  verbose       = {}", settings.verbose);
        }
        Some(ConfigAction::Path) => {
            println!("{}", config::config_path().display());
        }
        Some(ConfigAction::Reset) => {
            Settings::default().write()?;
            println!(
                "[OK] Config reset to defaults at {}",
                config::config_path().display()
            );
        }
    }
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// Output
// ============================================================================

fn tagged(outcome: &Outcome) -> String {
    let tag = if outcome.success { "[ OK ]" } else { "[FAIL]" };
    format!("{tag} {}", outcome.message)
}

/// Bulk commands are best effort: per-light failures do not fail the run.
fn print_bulk(outcomes: &[Outcome]) -> ExitCode {
    if outcomes.is_empty() {
        println!("[INFO] No lights registered.");
    }
    for outcome in outcomes {
        println!("{}", tagged(outcome));
    }
    ExitCode::SUCCESS
}

fn print_single(outcome: &Outcome) -> ExitCode {
    if outcome.success {
        println!("{}", tagged(outcome));
        ExitCode::SUCCESS
    } else {
        eprintln!("{}", tagged(outcome));
        ExitCode::FAILURE
    }
}
