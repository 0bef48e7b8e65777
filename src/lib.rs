use {
    anyhow::{Context, Error, anyhow, ensure},
    arguments::Arguments,
    bitcoin::hashes::{Hash, sha256d},
    bytes::BytesMut,
    clap::Parser,
    derive_more::Display,
    futures::stream::StreamExt,
    hex::FromHex,
    parking_lot::{Mutex, RwLock},
    serde::{Deserialize, Serialize},
    serde_json::Value,
    serde_with::SerializeDisplay,
    snafu::Snafu,
    std::{
        collections::{BTreeMap, HashMap},
        env,
        fmt::{self, Display, Formatter},
        fs,
        io::{self, IsTerminal, Write},
        net::SocketAddr,
        path::{Path, PathBuf},
        process,
        sync::{
            Arc,
            atomic::{AtomicU32, AtomicU64, Ordering},
        },
        thread,
        time::{Duration, Instant},
    },
    stratum::{
        Authorize, Extranonce, Id, JobId, JsonRpcError, Message, Notify, SetDifficulty, Submit,
        Subscribe, SubscribeResult,
    },
    throbber::StatusLine,
    tokio::{
        io::{AsyncRead, AsyncWriteExt, BufWriter},
        net::{TcpStream, tcp::OwnedWriteHalf},
        runtime::Runtime,
        sync::{mpsc, oneshot, watch},
        task::{JoinHandle, JoinSet},
        time::{MissedTickBehavior, interval, sleep},
    },
    tokio_util::{
        codec::{Decoder, FramedRead, LinesCodec, LinesCodecError},
        sync::CancellationToken,
    },
    tracing::{debug, error, info, warn},
    tracing_appender::non_blocking,
    tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt},
};

pub use {
    coordinator::{Coordinator, CoordinatorConfig, Snapshot},
    engine::{BatchResult, Candidate, CpuEngine, HashEngine},
    hash_rate::HashRate,
    header::{Header, MalformedJob},
    job::Job,
    ledger::{LedgerWriter, ShareLedger},
    session::{Event, Session, SessionConfig, SessionState},
};

mod arguments;
pub mod coordinator;
pub mod engine;
mod hash_rate;
pub mod header;
mod job;
pub mod ledger;
mod logs;
mod options;
mod price;
pub mod session;
pub mod settings;
mod signal;
mod subcommand;
mod throbber;

pub const USER_AGENT: &str = concat!("soloist/", env!("CARGO_PKG_VERSION"));
pub const DEFAULT_STRATUM_PORT: u16 = 3333;
pub const MAX_MESSAGE_SIZE: usize = 32 * 1024;
pub const CHANNEL_BUFFER_SIZE: usize = 256;

type Result<T = (), E = Error> = std::result::Result<T, E>;

async fn resolve_stratum_endpoint(stratum_endpoint: &str) -> io::Result<SocketAddr> {
    let endpoint = if stratum_endpoint.contains(':') {
        stratum_endpoint.to_string()
    } else {
        format!("{stratum_endpoint}:{DEFAULT_STRATUM_PORT}")
    };

    tokio::net::lookup_host(&endpoint).await?.next().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::NotFound,
            format!("failed to resolve `{endpoint}`"),
        )
    })
}

pub fn main() {
    let _guard = logs::init();

    let args = Arguments::parse();

    let runtime = match Runtime::new() {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("error: failed to create tokio runtime: {err}");
            process::exit(1);
        }
    };

    runtime.block_on(async {
        let cancel_token = signal::setup_signal_handler();

        match args.run(cancel_token).await {
            Err(err) => {
                eprintln!("error: {err}");

                for (i, cause) in err.chain().skip(1).enumerate() {
                    if i == 0 {
                        eprintln!();
                        eprintln!("because:");
                    }
                    eprintln!("- {cause}");
                }

                if env::var_os("RUST_BACKTRACE")
                    .map(|val| val == "1")
                    .unwrap_or_default()
                {
                    eprintln!();
                    eprintln!("{}", err.backtrace());
                }
                process::exit(1);
            }
            Ok(_) => {
                process::exit(0);
            }
        }
    });
}
