use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use emu_core::logging::{LogCategory, LogConfig, LogLevel};
use emu_shell::config_file::keys::*;
use emu_shell::content::ContentPaths;
use emu_shell::input::{key_categories, key_display_name, KeyConfig};
use emu_shell::rom_detect::detect_rom_type;
use emu_shell::{Settings, SystemId};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "emuhost", about = "Headless multi-system emulator frontend")]
struct Args {
    /// Directory holding the per-system config files
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    /// Base directory for fallback save paths
    #[arg(long, global = true)]
    storage_dir: Option<PathBuf>,

    /// Level for every log category: off, error, warn, info, debug, trace
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Override one category, e.g. "states=debug" (repeatable)
    #[arg(long = "log", global = true)]
    log_category: Vec<String>,

    /// Append category log output to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the supported systems
    Systems,
    /// Print the system a content file belongs to
    Detect { file: PathBuf },
    /// Show or change a system's options
    Config {
        system: String,
        /// Dump every option, including defaults
        #[arg(long)]
        dump: bool,
        /// Set an option, e.g. --set sound=false (repeatable)
        #[arg(long, value_name = "KEY=VALUE")]
        set: Vec<String>,
    },
    /// List recently loaded content
    Recent {
        system: String,
        /// Empty the list
        #[arg(long)]
        clear: bool,
    },
    /// List the state slots of a content file
    States { system: String, content: PathBuf },
    /// Print the key tables and default key bindings
    Keys { system: String },
}

/// Frontend option names accepted by `config --set`
const OPTION_NAMES: &[(&str, u16)] = &[
    ("sound", CFGKEY_SOUND),
    ("sound-rate", CFGKEY_SOUND_RATE),
    ("frame-skip", CFGKEY_FRAME_SKIP),
    ("auto-save-state", CFGKEY_AUTO_SAVE_STATE),
    ("confirm-overwrite-state", CFGKEY_CONFIRM_OVERWRITE_STATE),
    ("fast-mode-speed", CFGKEY_FAST_MODE_SPEED),
    ("slow-mode-speed", CFGKEY_SLOW_MODE_SPEED),
    ("aspect-ratio", CFGKEY_ASPECT_RATIO),
    ("image-zoom", CFGKEY_IMAGE_ZOOM),
    ("show-bundled-games", CFGKEY_SHOW_BUNDLED_GAMES),
    ("save-path", CFGKEY_SAVE_PATH),
    ("firmware-path", CFGKEY_FIRMWARE_PATH),
    ("save-slot", CFGKEY_SAVE_SLOT),
];

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args)?;

    let config_dir = args
        .config_dir
        .clone()
        .unwrap_or_else(Settings::default_config_dir);
    let storage_dir = args.storage_dir.clone().unwrap_or_else(|| config_dir.clone());

    match args.command {
        Command::Systems => list_systems(),
        Command::Detect { file } => {
            let data = std::fs::read(&file).with_context(|| format!("reading {}", file.display()))?;
            let system = detect_rom_type(&data, Some(&file))?;
            println!("{} ({})", system.info().name, system.info().short_name);
        }
        Command::Config { system, dump, set } => {
            let system = parse_system(&system)?;
            let mut settings = Settings::load(system, &config_dir);
            if !set.is_empty() {
                for assignment in &set {
                    apply_setting(&mut settings, assignment)?;
                }
                let path = settings.save(&config_dir)?;
                println!("Wrote {}", path.display());
            }
            if dump || set.is_empty() {
                print_config(&settings, dump);
            }
        }
        Command::Recent { system, clear } => {
            let system = parse_system(&system)?;
            let mut settings = Settings::load(system, &config_dir);
            if clear {
                settings.recent.clear();
                settings.save(&config_dir)?;
            }
            if settings.recent.is_empty() {
                println!("No recent content");
            }
            for (i, entry) in settings.recent.iter().enumerate() {
                let missing = if Path::new(&entry.path).exists() { "" } else { " (missing)" };
                println!("{:2}. {} - {}{}", i + 1, entry.name, entry.path, missing);
            }
        }
        Command::States { system, content } => {
            let system = parse_system(&system)?;
            let settings = Settings::load(system, &config_dir);
            let mut paths = ContentPaths::for_file(&content);
            paths.resolve_save_directory(settings.options.save_path.get(), &storage_dir, system)?;
            let slots = paths
                .state_slots(system)
                .ok_or_else(|| anyhow!("no save directory for {}", content.display()))?;
            println!("States in {}", slots.directory().display());
            for status in slots.list() {
                let marker = if status.slot == *settings.options.save_slot.get() { '*' } else { ' ' };
                match &status.saved_at {
                    Some(when) => println!("{} {}: {}", marker, status.label, when),
                    None => println!("{} {}: Empty", marker, status.label),
                }
            }
        }
        Command::Keys { system } => print_keys(parse_system(&system)?),
    }
    Ok(())
}

/// Route `--log-level` to the core's category levels and to env_logger
fn init_logging(args: &Args) -> Result<()> {
    let level = LogLevel::from_str(&args.log_level)
        .ok_or_else(|| anyhow!("unknown log level '{}'", args.log_level))?;
    let config = LogConfig::global();
    config.set_global_level(level);
    for entry in &args.log_category {
        let (name, value) = entry
            .split_once('=')
            .ok_or_else(|| anyhow!("expected CATEGORY=LEVEL, got '{}'", entry))?;
        let category =
            LogCategory::from_str(name).ok_or_else(|| anyhow!("unknown log category '{}'", name))?;
        let level = LogLevel::from_str(value).ok_or_else(|| anyhow!("unknown log level '{}'", value))?;
        config.set_level(category, level);
    }
    if let Some(path) = &args.log_file {
        config
            .set_log_file(path.clone())
            .with_context(|| format!("opening log file {}", path.display()))?;
    }

    let filter = match level {
        LogLevel::Off => log::LevelFilter::Off,
        LogLevel::Error => log::LevelFilter::Error,
        LogLevel::Warn => log::LevelFilter::Warn,
        LogLevel::Info => log::LevelFilter::Info,
        LogLevel::Debug => log::LevelFilter::Debug,
        LogLevel::Trace => log::LevelFilter::Trace,
    };
    env_logger::Builder::from_default_env()
        .filter_level(filter)
        .init();
    Ok(())
}

fn parse_system(name: &str) -> Result<SystemId> {
    SystemId::from_short_name(name).ok_or_else(|| {
        let known: Vec<_> = SystemId::ALL.iter().map(|s| s.info().short_name).collect();
        anyhow!("unknown system '{}'; expected one of {}", name, known.join(", "))
    })
}

fn list_systems() {
    println!(
        "{:<11} {:<30} {:<16} {:>7} {:>4} {:>6}  EXTENSIONS",
        "SHORT", "NAME", "CONFIG", "PLAYERS", "FACE", "STATE"
    );
    for id in SystemId::ALL {
        let info = id.info();
        println!(
            "{:<11} {:<30} {:<16} {:>7} {:>4} {:>6}  {}",
            info.short_name,
            info.name,
            info.config_filename,
            info.max_players,
            info.face_buttons,
            info.state_extension,
            info.extensions.join(" ")
        );
    }
}

fn apply_setting(settings: &mut Settings, assignment: &str) -> Result<()> {
    let (name, value) = assignment
        .split_once('=')
        .ok_or_else(|| anyhow!("expected KEY=VALUE, got '{}'", assignment))?;
    if let Some((_, key)) = OPTION_NAMES.iter().find(|(n, _)| *n == name) {
        return settings
            .options
            .set_from_str(*key, value)
            .map_err(|e| anyhow!("{}: {}", name, e));
    }
    if settings.system_options.by_name(name).is_some() {
        return settings
            .system_options
            .set_from_str(name, value)
            .map_err(|e| anyhow!("{}: {}", name, e));
    }
    bail!("unknown option '{}'", name)
}

fn print_config(settings: &Settings, dump: bool) {
    let o = &settings.options;
    let frontend: [(&str, String, bool); 13] = [
        ("sound", o.sound.get().to_string(), o.sound.is_default()),
        ("sound-rate", o.sound_rate.get().to_string(), o.sound_rate.is_default()),
        ("frame-skip", o.frame_skip.get().to_string(), o.frame_skip.is_default()),
        ("auto-save-state", o.auto_save_state.get().to_string(), o.auto_save_state.is_default()),
        (
            "confirm-overwrite-state",
            o.confirm_overwrite_state.get().to_string(),
            o.confirm_overwrite_state.is_default(),
        ),
        ("fast-mode-speed", o.fast_mode_speed.get().to_string(), o.fast_mode_speed.is_default()),
        ("slow-mode-speed", o.slow_mode_speed.get().to_string(), o.slow_mode_speed.is_default()),
        ("aspect-ratio", o.aspect_ratio.get().to_string(), o.aspect_ratio.is_default()),
        ("image-zoom", o.image_zoom.get().to_string(), o.image_zoom.is_default()),
        (
            "show-bundled-games",
            o.show_bundled_games.get().to_string(),
            o.show_bundled_games.is_default(),
        ),
        ("save-path", o.save_path.get().clone(), o.save_path.is_default()),
        ("firmware-path", o.firmware_path.get().clone(), o.firmware_path.is_default()),
        ("save-slot", o.save_slot.get().to_string(), o.save_slot.is_default()),
    ];

    println!("[{}]", settings.system.info().name);
    let mut shown = 0;
    for (name, value, is_default) in &frontend {
        if dump || !is_default {
            println!("{} = {}", name, value);
            shown += 1;
        }
    }
    for (name, opt) in settings.system_options.iter() {
        if dump || !opt.is_default() {
            println!("{} = {}", name, opt.display_value());
            shown += 1;
        }
    }
    if shown == 0 {
        println!("(all defaults; use --dump to list them)");
    }
    for config in &settings.key_configs {
        println!("key config: {} ({:?})", config.name, config.device_type);
    }
}

fn print_keys(system: SystemId) {
    for category in key_categories(system) {
        let names: Vec<_> = category
            .keys
            .iter()
            .map(|k| key_display_name(system, *k))
            .collect();
        println!("{}: {}", category.name, names.join(", "));
    }
    for config in [KeyConfig::keyboard_default(system), KeyConfig::gamepad_default(system)] {
        println!();
        println!("{}", config.name);
        for (key, source) in &config.mappings {
            println!("  {:<12} {:?}", key_display_name(system, *key), source);
        }
    }
}
