//! Clap derive structures for the `gorod` CLI.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// gorod -- Elektronny Gorod smart-intercom cloud from the command line
#[derive(Debug, Parser)]
#[command(
    name = "gorod",
    version,
    about = "Door cameras, locks and account balance of the Elektronny Gorod cloud",
    long_about = "A CLI for the Elektronny Gorod (Novotelecom) smart-intercom cloud.\n\n\
        Authenticate once with `gorod login` (password or SMS), then list\n\
        places, fetch camera snapshots and streams, open doors, and check\n\
        the account balance.",
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
    /// Stored account to use
    #[arg(long, short = 'a', env = "GOROD_ACCOUNT", global = true)]
    pub account: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "GOROD_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Request timeout in seconds
    #[arg(long, env = "GOROD_TIMEOUT", default_value = "30", global = true)]
    pub timeout: u64,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Authenticate and store an account (password or SMS wizard)
    Login(LoginArgs),

    /// List the subscriber's places
    #[command(alias = "pl")]
    Places,

    /// Camera listing, snapshots and streams
    #[command(alias = "cam")]
    Cameras(CamerasArgs),

    /// Door locks: list and open
    Locks(LocksArgs),

    /// Account balance per place
    #[command(alias = "bal")]
    Balance,

    /// go2rtc media-relay helpers
    Relay(RelayArgs),

    /// Inspect the account store
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Login ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Phone number (7XXXXXXXXXX); prompted for when omitted
    #[arg(long)]
    pub phone: Option<String>,
}

// ── Cameras ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CamerasArgs {
    #[command(subcommand)]
    pub command: CamerasCommand,
}

#[derive(Debug, Subcommand)]
pub enum CamerasCommand {
    /// List all cameras (deduplicated across places)
    #[command(alias = "ls")]
    List,

    /// Fetch a snapshot and write it to a file
    Snapshot(SnapshotArgs),

    /// Resolve a stream URL (direct FLV, or RTSP via the relay)
    Stream(StreamArgs),
}

#[derive(Debug, Args)]
pub struct SnapshotArgs {
    /// Camera id
    pub id: i64,

    /// Snapshot width (height defaults to a 16:9 fit)
    #[arg(long)]
    pub width: Option<u32>,

    /// Snapshot height
    #[arg(long)]
    pub height: Option<u32>,

    /// Output file (defaults to camera_<id>.jpg)
    #[arg(long, short = 'f')]
    pub file: Option<String>,
}

#[derive(Debug, Args)]
pub struct StreamArgs {
    /// Camera id
    pub id: i64,

    /// Register the stream with the configured go2rtc relay
    #[arg(long)]
    pub relay: bool,
}

// ── Locks ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct LocksArgs {
    #[command(subcommand)]
    pub command: LocksCommand,
}

#[derive(Debug, Subcommand)]
pub enum LocksCommand {
    /// List all locks
    #[command(alias = "ls")]
    List,

    /// Open a lock
    Open(OpenArgs),
}

#[derive(Debug, Args)]
pub struct OpenArgs {
    /// Place id (see `gorod locks list`)
    #[arg(long)]
    pub place: i64,

    /// Access control id
    #[arg(long = "access-control")]
    pub access_control: i64,

    /// Entrance id; omit for doors without entrances
    #[arg(long)]
    pub entrance: Option<i64>,
}

// ── Relay ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct RelayArgs {
    #[command(subcommand)]
    pub command: RelayCommand,
}

#[derive(Debug, Subcommand)]
pub enum RelayCommand {
    /// Validate a go2rtc instance (reachability + streams write check)
    Check(RelayCheckArgs),
}

#[derive(Debug, Args)]
pub struct RelayCheckArgs {
    /// Relay base URL; defaults to the stored account's setting
    #[arg(long)]
    pub url: Option<String>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the account store path
    Path,

    /// List stored accounts
    Show,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
