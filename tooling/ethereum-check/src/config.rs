use clap::Parser as ClapParser;
use std::time::Duration;
use tracing::Level;

pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8545";
/// Miner address that leaves the block liveness check disabled.
pub const DISABLED_MINER_ADDR: &str = "0x00";

#[derive(ClapParser, Debug, Clone)]
#[command(
    name = "ethereum-check",
    version,
    about = "Ethereum node peer and block liveness check plugin"
)]
pub struct Options {
    #[arg(
        short = 'u',
        long = "rpc-url",
        default_value = DEFAULT_RPC_URL,
        help = "Ethereum RPC URL",
        env = "ETH_CHECK_RPC_URL"
    )]
    pub rpc_url: String,
    #[arg(
        short = 'p',
        long = "warn-peers",
        default_value_t = 0,
        allow_negative_numbers = true,
        help = "Warning eth peers amount",
        long_help = "Warning eth peers amount. A negative value disables this tier.",
        env = "ETH_CHECK_WARN_PEERS"
    )]
    pub warn_peers: i64,
    #[arg(
        short = 'P',
        long = "crit-peers",
        default_value_t = 0,
        allow_negative_numbers = true,
        help = "Critical eth peers amount",
        long_help = "Critical eth peers amount. A negative value disables this tier.",
        env = "ETH_CHECK_CRIT_PEERS"
    )]
    pub crit_peers: i64,
    #[arg(
        short = 'a',
        long = "miner-addr",
        default_value = DISABLED_MINER_ADDR,
        help = "Miner address",
        long_help = "Address whose most recent block is checked for freshness. The default `0x00` disables the block liveness check.",
        env = "ETH_CHECK_MINER_ADDR"
    )]
    pub miner_addr: String,
    #[arg(
        short = 'x',
        long = "max-blocks",
        default_value_t = 100,
        help = "Max blocks to check for address",
        env = "ETH_CHECK_MAX_BLOCKS"
    )]
    pub max_blocks: u64,
    #[arg(
        short = 'b',
        long = "warn-max-time-without-block",
        default_value_t = 10.0,
        help = "Warning max minutes without block",
        env = "ETH_CHECK_WARN_MAX_TIME_WITHOUT_BLOCK"
    )]
    pub warn_max_minutes_without_block: f64,
    #[arg(
        short = 'B',
        long = "crit-max-time-without-block",
        default_value_t = 20.0,
        help = "Critical max minutes without block",
        env = "ETH_CHECK_CRIT_MAX_TIME_WITHOUT_BLOCK"
    )]
    pub crit_max_minutes_without_block: f64,
    #[arg(
        long = "rpc-timeout",
        value_name = "SECONDS",
        help = "Per-request RPC timeout in seconds",
        long_help = "When unset, requests wait as long as the HTTP transport allows.",
        env = "ETH_CHECK_RPC_TIMEOUT"
    )]
    pub rpc_timeout_secs: Option<u64>,
    #[arg(
        long = "log-level",
        default_value_t = Level::WARN,
        value_name = "LOG_LEVEL",
        help = "Diagnostic log level, written to stderr. RUST_LOG takes precedence.",
        env = "ETH_CHECK_LOG_LEVEL"
    )]
    pub log_level: Level,
}

/// A `(warning, critical)` threshold pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds<T> {
    pub warning: T,
    pub critical: T,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LivenessConfig {
    pub miner_address: String,
    pub max_blocks: u64,
    /// Minutes since the miner's last block.
    pub minutes_without_block: Thresholds<f64>,
}

/// Settings for one plugin run, fixed once parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckConfig {
    pub rpc_url: String,
    pub rpc_timeout: Option<Duration>,
    pub peers: Thresholds<i64>,
    /// `None` when no miner address was given.
    pub liveness: Option<LivenessConfig>,
}

impl From<&Options> for CheckConfig {
    fn from(options: &Options) -> Self {
        let liveness = (options.miner_addr != DISABLED_MINER_ADDR).then(|| LivenessConfig {
            miner_address: options.miner_addr.clone(),
            max_blocks: options.max_blocks,
            minutes_without_block: Thresholds {
                warning: options.warn_max_minutes_without_block,
                critical: options.crit_max_minutes_without_block,
            },
        });

        Self {
            rpc_url: options.rpc_url.clone(),
            rpc_timeout: options.rpc_timeout_secs.map(Duration::from_secs),
            peers: Thresholds {
                warning: options.warn_peers,
                critical: options.crit_peers,
            },
            liveness,
        }
    }
}
