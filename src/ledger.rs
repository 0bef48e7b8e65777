use super::*;

pub const LEDGER_FILE_NAME: &str = ".soloist_shares.json";

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("Failed to read share ledger `{}`", path.display()))]
    Read { path: PathBuf, source: io::Error },
    #[snafu(display("Failed to parse share ledger `{}`", path.display()))]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[snafu(display("Failed to serialize share ledger"))]
    Serialize { source: serde_json::Error },
    #[snafu(display("Failed to write share ledger `{}`", path.display()))]
    Write { path: PathBuf, source: io::Error },
}

/// On-disk form of the lifetime counter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub total: u64,
    pub updated: String,
}

#[derive(Debug, Default, Clone, Copy)]
struct Counters {
    session_shares: u64,
    lifetime_shares: u64,
    job_shares: u64,
    best_difficulty: u32,
}

/// Share counters for this run plus the persisted lifetime total.
///
/// Counting never touches the disk. The lifetime total is published on a
/// watch channel and a [`LedgerWriter`] persists it from its own task.
/// Persistence is best-effort: a failed read starts the lifetime count at
/// zero and a failed write is logged, neither is surfaced to callers.
#[derive(Debug)]
pub struct ShareLedger {
    path: Option<PathBuf>,
    counters: Mutex<Counters>,
    totals: watch::Sender<u64>,
}

/// Writes the latest lifetime total whenever it changes.
#[derive(Debug)]
pub struct LedgerWriter {
    path: PathBuf,
    totals: watch::Receiver<u64>,
    written: u64,
}

impl ShareLedger {
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(LEDGER_FILE_NAME))
    }

    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();

        let lifetime_shares = match Self::read(&path) {
            Ok(record) => record.total,
            Err(Error::Read { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                debug!("No share ledger at {}, starting from zero", path.display());
                0
            }
            Err(err) => {
                warn!("{err}, starting from zero");
                0
            }
        };

        info!(
            "Loaded {lifetime_shares} lifetime shares from {}",
            path.display()
        );

        Self {
            path: Some(path),
            counters: Mutex::new(Counters {
                lifetime_shares,
                ..Default::default()
            }),
            totals: watch::Sender::new(lifetime_shares),
        }
    }

    /// A ledger that never touches the filesystem.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            counters: Mutex::new(Counters::default()),
            totals: watch::Sender::new(0),
        }
    }

    pub fn read(path: &Path) -> Result<Record, Error> {
        let contents = fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.into(),
            source,
        })?;

        serde_json::from_str(&contents).map_err(|source| Error::Parse {
            path: path.into(),
            source,
        })
    }

    pub fn write(path: &Path, total: u64) -> Result<(), Error> {
        let record = Record {
            total,
            updated: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        };

        let json = serde_json::to_string(&record).map_err(|source| Error::Serialize { source })?;

        let tmp = path.with_extension("json.tmp");

        fs::write(&tmp, json).map_err(|source| Error::Write {
            path: tmp.clone(),
            source,
        })?;

        fs::rename(&tmp, path).map_err(|source| Error::Write {
            path: path.into(),
            source,
        })
    }

    /// A writer for this ledger's file, or `None` for an in-memory ledger.
    pub fn writer(&self) -> Option<LedgerWriter> {
        let path = self.path.clone()?;
        let totals = self.totals.subscribe();
        let written = *totals.borrow();

        Some(LedgerWriter {
            path,
            totals,
            written,
        })
    }

    /// Counts a share that met the share target and hands the new lifetime
    /// total to the writer. Returns `(session, lifetime)` after the increment.
    pub fn record_share(&self) -> (u64, u64) {
        let (session, lifetime) = {
            let mut counters = self.counters.lock();

            counters.session_shares += 1;
            counters.lifetime_shares += 1;
            counters.job_shares += 1;

            (counters.session_shares, counters.lifetime_shares)
        };

        self.totals.send_if_modified(|total| {
            if lifetime > *total {
                *total = lifetime;
                true
            } else {
                false
            }
        });

        (session, lifetime)
    }

    /// Tracks the best difficulty seen this run. Returns true on a new best.
    pub fn observe(&self, leading_zero_bits: u32) -> bool {
        let mut counters = self.counters.lock();

        if leading_zero_bits > counters.best_difficulty {
            counters.best_difficulty = leading_zero_bits;
            true
        } else {
            false
        }
    }

    pub fn reset_job(&self) {
        self.counters.lock().job_shares = 0;
    }

    pub fn session_shares(&self) -> u64 {
        self.counters.lock().session_shares
    }

    pub fn lifetime_shares(&self) -> u64 {
        self.counters.lock().lifetime_shares
    }

    pub fn job_shares(&self) -> u64 {
        self.counters.lock().job_shares
    }

    pub fn best_difficulty(&self) -> u32 {
        self.counters.lock().best_difficulty
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

impl LedgerWriter {
    /// Persists every new total until `done` fires, then writes whatever is
    /// still pending.
    pub async fn run(mut self, done: CancellationToken) {
        loop {
            tokio::select! {
                biased;

                changed = self.totals.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    self.flush().await;
                }
                _ = done.cancelled() => break,
            }
        }

        self.flush().await;
    }

    async fn flush(&mut self) {
        let total = *self.totals.borrow_and_update();

        if total == self.written {
            return;
        }

        let path = self.path.clone();

        match tokio::task::spawn_blocking(move || ShareLedger::write(&path, total)).await {
            Ok(Ok(())) => {
                debug!("Persisted {total} lifetime shares to {}", self.path.display());
                self.written = total;
            }
            Ok(Err(err)) => warn!("Share not persisted: {err}"),
            Err(err) => error!("Share ledger write panicked: {err}"),
        }
    }
}
