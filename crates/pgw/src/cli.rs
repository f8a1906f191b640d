//! Clap derive structures for the `pgw` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.
//! Only clap types are used here so `build.rs` can include this file.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// pgw -- console for a proxy gateway
#[derive(Debug, Parser)]
#[command(
    name = "pgw",
    version,
    about = "Manage a proxy gateway from the command line",
    long_about = "Operate an HTTP/SOCKS proxy gateway: register upstream proxies,\n\
        map client addresses onto them, run health checks and trigger rule\n\
        reconciliation on the gateway agent.",
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
    /// Gateway profile to use
    #[arg(long, short = 'p', env = "PGW_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Gateway API base URL (overrides profile)
    #[arg(long, env = "PGW_API", global = true)]
    pub api: Option<String>,

    /// Reconciliation agent base URL (overrides profile)
    #[arg(long, env = "PGW_AGENT", global = true)]
    pub agent: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "PGW_OUTPUT",
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
    #[arg(long, short = 'k', env = "PGW_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "PGW_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
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

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show gateway counters and refresh times
    #[command(alias = "st")]
    Status,

    /// Fetch proxies, clients and mappings from the gateway
    Refresh,

    /// Manage upstream proxies
    #[command(alias = "px")]
    Proxies(ProxiesArgs),

    /// Manage client-to-proxy mappings
    #[command(alias = "map", alias = "m")]
    Mappings(MappingsArgs),

    /// View registered clients
    #[command(alias = "cl")]
    Clients(ClientsArgs),

    /// Apply mapping state on the gateway agent
    Reconcile,

    /// Keep refreshing and print changes until interrupted
    Watch(WatchArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  PROXIES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ProxiesArgs {
    #[command(subcommand)]
    pub command: ProxiesCommand,
}

#[derive(Debug, Subcommand)]
pub enum ProxiesCommand {
    /// List proxies in the saved table order
    #[command(alias = "ls")]
    List,

    /// List proxies not used by any mapping
    Available,

    /// Register a proxy
    Add {
        /// Proxy host name or address
        host: String,

        /// Proxy port
        port: u16,

        /// Proxy protocol
        #[arg(long = "type", short = 't', default_value = "http")]
        proxy_type: ProxyKind,

        /// Upstream username
        #[arg(long, short = 'u')]
        username: Option<String>,

        /// Upstream password
        #[arg(long, env = "PGW_PROXY_PASSWORD", hide_env_values = true)]
        password: Option<String>,

        /// Display label
        #[arg(long)]
        label: Option<String>,

        /// Register the proxy disabled
        #[arg(long)]
        disabled: bool,
    },

    /// Import `host:port:username:password` lines
    Import {
        /// File to read (stdin when omitted or "-")
        file: Option<PathBuf>,
    },

    /// Delete a proxy and its mappings
    #[command(alias = "rm")]
    Delete {
        /// Proxy ID
        id: String,
    },

    /// Health-check one proxy
    Check {
        /// Proxy ID
        id: String,
    },

    /// Health-check every proxy
    CheckAll,

    /// Select the sort column (repeat to reverse) and show the table
    Sort {
        /// Column to sort by
        column: ProxyColumn,
    },

    /// Export proxies as CSV
    Export {
        /// Write to this file instead of stdout
        #[arg(long, short = 'f')]
        file: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ProxyKind {
    Http,
    Socks5,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ProxyColumn {
    Id,
    Type,
    Address,
    Status,
    Latency,
    Exit,
    Last,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  MAPPINGS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct MappingsArgs {
    #[command(subcommand)]
    pub command: MappingsCommand,
}

#[derive(Debug, Subcommand)]
pub enum MappingsCommand {
    /// List active mappings in the saved table order
    #[command(alias = "ls")]
    List,

    /// Route a client address through a proxy
    Add {
        /// Client IPv4 address (single host, no CIDR)
        client_ip: String,

        /// Proxy ID
        proxy: String,
    },

    /// Delete a mapping
    #[command(alias = "rm")]
    Delete {
        /// Mapping ID
        id: String,
    },

    /// Select the sort column (repeat to reverse) and show the table
    Sort {
        /// Column to sort by
        column: MappingColumn,
    },

    /// Export mappings as CSV
    Export {
        /// Write to this file instead of stdout
        #[arg(long, short = 'f')]
        file: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum MappingColumn {
    Id,
    Client,
    Proxy,
    State,
    Port,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CLIENTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ClientsArgs {
    #[command(subcommand)]
    pub command: ClientsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ClientsCommand {
    /// List registered clients
    #[command(alias = "ls")]
    List,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  WATCH
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Seconds between refreshes (overrides profile)
    #[arg(long, short = 'i')]
    pub interval: Option<u64>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create or update a profile (prompts for anything not given)
    Init {
        /// Profile name
        #[arg(long)]
        name: Option<String>,

        /// Make this the default profile
        #[arg(long)]
        set_default: bool,
    },

    /// Display the resolved configuration
    Show,

    /// Print the config file location
    Path,

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
