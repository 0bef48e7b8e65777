use super::*;

#[derive(Clone, Default, Debug, Parser)]
pub struct Options {
    #[arg(long, help = "Load configuration from <CONFIG>.")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Load configuration from <CONFIG_DIR>/soloist.toml.")]
    pub config_dir: Option<PathBuf>,

    #[arg(long, help = "Connect to Stratum pool at <STRATUM_ENDPOINT>. [default port: 3333]")]
    pub stratum_endpoint: Option<String>,

    #[arg(long, help = "Authorize as <USERNAME>.")]
    pub username: Option<String>,

    #[arg(long, help = "Authorize with <PASSWORD>. [default: x]")]
    pub password: Option<String>,

    #[arg(long, help = "Hash on <THREADS> CPU threads. [default: all]")]
    pub threads: Option<usize>,

    #[arg(long, help = "Search <BATCH_SIZE> nonces per batch. [default: 16777216]")]
    pub batch_size: Option<u32>,

    #[arg(
        long,
        help = "Count hashes with at least <SHARE_TARGET> leading zero bits as shares. [default: 32]"
    )]
    pub share_target: Option<u32>,

    #[arg(long, help = "Do not submit found shares to the pool.")]
    pub no_submit: bool,

    #[arg(long, help = "Persist lifetime share count to <LEDGER>. [default: ~/.soloist_shares.json]")]
    pub ledger: Option<PathBuf>,

    #[arg(long, help = "Poll spot price JSON from <PRICE_URL>.")]
    pub price_url: Option<String>,

    #[arg(long, help = "Poll spot price every <PRICE_INTERVAL> seconds. [default: 60]")]
    pub price_interval: Option<u64>,

    #[arg(long, help = "Log status every <STATUS_INTERVAL> seconds when not on a terminal. [default: 10]")]
    pub status_interval: Option<u64>,

    #[arg(long, help = "Wait <RECONNECT_BACKOFF> seconds between reconnect attempts. [default: 5]")]
    pub reconnect_backoff: Option<u64>,

    #[arg(long, help = "Give up connecting after <TIMEOUT> seconds. [default: 10]")]
    pub timeout: Option<u64>,
}
