use super::*;

/// Everything the mining loop needs to build a header. Replaced in one write.
#[derive(Debug, Clone, Default)]
pub(super) struct Work {
    pub(super) job: Option<Arc<Job>>,
    pub(super) extranonce1: Option<Extranonce>,
    pub(super) extranonce2_size: usize,
    pub(super) ready: bool,
}

impl Work {
    pub(super) fn dispatchable(&self) -> Option<(Arc<Job>, Extranonce, usize)> {
        if !self.ready {
            return None;
        }

        Some((
            self.job.clone()?,
            self.extranonce1.clone()?,
            self.extranonce2_size,
        ))
    }
}

pub(super) struct State {
    pub(super) accepted: AtomicU64,
    pub(super) batches: AtomicU64,
    pub(super) block_started: RwLock<Option<Instant>>,
    pub(super) config: CoordinatorConfig,
    pub(super) cursor: NonceCursor,
    pub(super) disconnects: AtomicU64,
    pub(super) engine: Arc<dyn HashEngine>,
    pub(super) hash_rate: Mutex<HashRateMeter>,
    pub(super) hashes: AtomicU64,
    pub(super) ledger: ShareLedger,
    pub(super) malformed_job: Mutex<Option<JobId>>,
    pub(super) pool_difficulty: RwLock<Option<f64>>,
    pub(super) price: RwLock<Option<f64>>,
    pub(super) reconnects: AtomicU64,
    pub(super) rejected: AtomicU64,
    pub(super) started: Instant,
    pub(super) work: RwLock<Work>,
}

impl State {
    pub(super) fn new(
        config: CoordinatorConfig,
        engine: Arc<dyn HashEngine>,
        ledger: ShareLedger,
    ) -> Self {
        let now = Instant::now();

        Self {
            accepted: AtomicU64::new(0),
            batches: AtomicU64::new(0),
            block_started: RwLock::new(None),
            config,
            cursor: NonceCursor::default(),
            disconnects: AtomicU64::new(0),
            engine,
            hash_rate: Mutex::new(HashRateMeter::new(HASH_RATE_WINDOW, now)),
            hashes: AtomicU64::new(0),
            ledger,
            malformed_job: Mutex::new(None),
            pool_difficulty: RwLock::new(None),
            price: RwLock::new(None),
            reconnects: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
            started: now,
            work: RwLock::new(Work::default()),
        }
    }
}
