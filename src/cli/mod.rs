//! Command-line interface for mado
//!
//! Commands that need the accessibility permission: list, move, preset apply,
//! preset rec. Everything else works without it. `version` and `completion`
//! also run without a readable config file.

mod executor;

pub use executor::{run, CliExecutor};

use crate::config::parse_duration;
use crate::models::preset::{Position, Size};
use crate::output::OutputFormat;
use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use std::time::Duration;

/// mado command-line interface
#[derive(Parser, Debug)]
#[command(name = "mado")]
#[command(about = "List, filter and arrange macOS windows")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct MadoCli {
    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format; overrides the config file
    #[arg(long, global = true, value_enum)]
    pub format: Option<OutputFormat>,

    /// Accessibility operation timeout (e.g. 500ms, 5s, 1m30s); overrides the config file
    #[arg(long, global = true, value_parser = parse_timeout)]
    pub timeout: Option<Duration>,

    /// Configuration file path (default: $MADO_CONFIG or ~/.config/mado/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List currently open windows
    List(ListArgs),

    /// Move and/or resize a single window
    Move(MoveArgs),

    /// List connected screens
    Screens,

    /// Manage and apply layout presets
    Preset(PresetCommands),

    /// Print the mado version
    Version,

    /// Generate a shell completion script
    Completion {
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Filters shared by `list` and `preset rec`
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Filter by app name (case-insensitive, exact match)
    #[arg(long)]
    pub app: Option<String>,

    /// Filter by screen id or name (exact match)
    #[arg(long)]
    pub screen: Option<String>,

    /// Filter by desktop number (1-based, Mission Control order)
    #[arg(long, allow_negative_numbers = true)]
    pub desktop: Option<i64>,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub filter: FilterArgs,

    /// Group windows under their application
    #[arg(long)]
    pub by_app: bool,
}

#[derive(Args, Debug)]
pub struct MoveArgs {
    /// Application owning the window (case-insensitive)
    #[arg(long)]
    pub app: String,

    /// Exact window title, required when the app has several windows
    #[arg(long)]
    pub title: Option<String>,

    /// Target origin as X,Y
    #[arg(long, value_parser = parse_position, allow_hyphen_values = true)]
    pub position: Option<Position>,

    /// Target size as WxH
    #[arg(long, value_parser = parse_size)]
    pub size: Option<Size>,
}

#[derive(Args, Debug)]
pub struct PresetCommands {
    #[command(subcommand)]
    pub action: PresetActions,
}

#[derive(Subcommand, Debug)]
pub enum PresetActions {
    /// Apply a preset to the open windows
    Apply {
        /// Preset name (case-sensitive)
        name: String,
    },

    /// List configured presets
    List,

    /// Show the rules of a preset
    Show {
        /// Preset name (case-sensitive)
        name: String,
    },

    /// Validate a configuration file
    Validate {
        /// File to validate instead of the active config
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Record the current layout as a preset and print it as TOML
    Rec(RecArgs),
}

#[derive(Args, Debug)]
pub struct RecArgs {
    /// Name for the new preset
    pub name: String,

    /// Description stored with the preset
    #[arg(long)]
    pub description: Option<String>,

    #[command(flatten)]
    pub filter: FilterArgs,
}

fn parse_timeout(value: &str) -> Result<Duration, String> {
    match parse_duration(value) {
        Ok(duration) if duration.is_zero() => Err("timeout must be greater than zero".to_string()),
        Ok(duration) => Ok(duration),
        Err(err) => Err(err.to_string()),
    }
}

fn parse_position(value: &str) -> Result<Position, String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y, got \"{value}\""))?;
    let x = x.trim().parse().map_err(|_| format!("invalid x coordinate \"{x}\""))?;
    let y = y.trim().parse().map_err(|_| format!("invalid y coordinate \"{y}\""))?;
    Ok(Position::new(x, y))
}

fn parse_size(value: &str) -> Result<Size, String> {
    let (width, height) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WxH, got \"{value}\""))?;
    let width: u32 = width
        .trim()
        .parse()
        .map_err(|_| format!("invalid width \"{width}\""))?;
    let height: u32 = height
        .trim()
        .parse()
        .map_err(|_| format!("invalid height \"{height}\""))?;
    if width == 0 || height == 0 {
        return Err("width and height must be positive".to_string());
    }
    Ok(Size::new(width, height))
}
