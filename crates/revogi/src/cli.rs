//! Clap derive structures for the `revogi` CLI.
//!
//! Defines the command tree, global flags, and shared value enums. Only
//! depends on clap + clap_complete so `build.rs` can include it for man
//! page generation.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// revogi -- control Revogi smart power strips through the cloud relay
#[derive(Debug, Parser)]
#[command(
    name = "revogi",
    version,
    about = "Control Revogi smart power strips from the command line",
    long_about = "Lists power strips registered to a Revogi account, shows per-port\n\
        usage, switches outlets, and keeps ports in the states set in the\n\
        config file.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config file to use instead of the platform default
    #[arg(long, env = "REVOGI_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Account username (overrides config)
    #[arg(long, short = 'u', env = "REVOGI_USERNAME", global = true)]
    pub username: Option<String>,

    /// Relay base URL (overrides config)
    #[arg(long, env = "REVOGI_API_URL", global = true, hide_env = true)]
    pub api_url: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "REVOGI_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept invalid TLS certificates
    #[arg(long, short = 'k', env = "REVOGI_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides config)
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Session renewals allowed per call (overrides config)
    #[arg(long, global = true)]
    pub max_retries: Option<u32>,

    /// Seconds to wait after a relay server error (overrides config)
    #[arg(long, global = true)]
    pub cooldown: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PowerState {
    On,
    Off,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in and report the relay domain assigned to the account
    Login,

    /// List and inspect power strips
    #[command(alias = "dev", alias = "d")]
    Devices(DevicesArgs),

    /// Show per-port usage for one or more devices
    Stats(StatsArgs),

    /// Switch a port on or off
    #[command(alias = "p")]
    Power(PowerArgs),

    /// Poll usage for all devices at a fixed interval
    #[command(alias = "w")]
    Watch(WatchArgs),

    /// Switch ports to the states set in the config file
    Apply(ApplyArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  DEVICES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct DevicesArgs {
    #[command(subcommand)]
    pub command: DevicesCommand,
}

#[derive(Debug, Subcommand)]
pub enum DevicesCommand {
    /// List all devices on the account
    #[command(alias = "ls")]
    List {
        /// Include online state and total draw
        #[arg(long, short = 's')]
        stats: bool,
    },

    /// Show a single device
    Get {
        /// Device serial number
        sn: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  STATS / POWER
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct StatsArgs {
    /// Device serial numbers
    #[arg(required = true)]
    pub serials: Vec<String>,
}

#[derive(Debug, Args)]
pub struct PowerArgs {
    /// Device serial number
    pub sn: String,

    /// Port number, starting at 1
    #[arg(value_parser = clap::value_parser!(u8).range(1..))]
    pub port: u8,

    /// Desired state
    pub state: PowerState,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  WATCH / APPLY
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Seconds between polls (defaults to poll_interval from config)
    #[arg(long, short = 'i', value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: Option<u64>,

    /// Stop after this many polls
    #[arg(long, short = 'n')]
    pub count: Option<u32>,
}

#[derive(Debug, Args)]
pub struct ApplyArgs {
    /// Show what would change without switching anything
    #[arg(long)]
    pub dry_run: bool,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG / COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current resolved configuration
    Show,

    /// Print the config file path
    Path,

    /// Store the account password in the system keyring
    SetPassword,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
