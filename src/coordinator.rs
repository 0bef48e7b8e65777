//! Drives the hash engine from session events.
//!
//! The coordinator owns all shared miner state. Session events are applied on
//! the async side in arrival order; the mining loop runs on a blocking worker
//! and reads the current work before every batch, so a job replacement takes
//! effect on the very next dispatch.

use {
    super::*,
    hash_rate::HashRateMeter,
    state::{State, Work},
};

pub use {nonce_cursor::NonceCursor, snapshot::Snapshot};

mod nonce_cursor;
mod snapshot;
mod state;

pub const DEFAULT_BATCH_SIZE: u32 = 1 << 24;
pub const DEFAULT_SHARE_TARGET: u32 = 32;
pub const IDLE_INTERVAL: Duration = Duration::from_millis(100);
pub const RECONNECT_BACKOFF: Duration = Duration::from_secs(5);

const HASH_RATE_WINDOW: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    pub batch_size: u32,
    pub share_target: u32,
    pub idle_interval: Duration,
    pub reconnect_backoff: Duration,
    pub submit: bool,
    pub username: String,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            share_target: DEFAULT_SHARE_TARGET,
            idle_interval: IDLE_INTERVAL,
            reconnect_backoff: RECONNECT_BACKOFF,
            submit: true,
            username: String::new(),
        }
    }
}

/// A nonce that met the share target, ready for `mining.submit`.
#[derive(Debug, Clone, PartialEq)]
pub struct FoundShare {
    pub job_id: JobId,
    pub extranonce2: Extranonce,
    pub ntime: String,
    pub nonce: u32,
    pub leading_zero_bits: u32,
}

#[derive(Debug, PartialEq)]
pub(crate) enum Step {
    Idle,
    Skipped,
    Dispatched(Vec<FoundShare>),
}

#[derive(Clone)]
pub struct Coordinator {
    state: Arc<State>,
}

impl Coordinator {
    pub fn new(
        config: CoordinatorConfig,
        engine: Arc<dyn HashEngine>,
        ledger: ShareLedger,
    ) -> Self {
        Self {
            state: Arc::new(State::new(config, engine, ledger)),
        }
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.state.config
    }

    pub fn ledger(&self) -> &ShareLedger {
        &self.state.ledger
    }

    pub fn set_price(&self, price: f64) {
        *self.state.price.write() = Some(price);
    }

    /// Folds one session event into the shared state.
    pub fn apply(&self, event: &Event) {
        match event {
            Event::Subscribed {
                extranonce1,
                extranonce2_size,
            } => {
                let mut work = self.state.work.write();
                work.extranonce1 = Some(extranonce1.clone());
                work.extranonce2_size = *extranonce2_size;
            }
            Event::Connected => {
                self.state.work.write().ready = true;
            }
            Event::Job(job) => {
                if job.clean_jobs {
                    *self.state.block_started.write() = Some(job.received);
                    self.state.ledger.reset_job();
                    info!("New block: job {}", job.id);
                } else {
                    debug!("Job update: {}", job.id);
                }

                self.state.work.write().job = Some(job.clone());
            }
            Event::Difficulty(difficulty) => {
                *self.state.pool_difficulty.write() = Some(*difficulty);
            }
            Event::ShareAccepted { .. } => {
                self.state.accepted.fetch_add(1, Ordering::Relaxed);
            }
            Event::ShareRejected { .. } => {
                self.state.rejected.fetch_add(1, Ordering::Relaxed);
            }
            Event::Disconnected => {
                *self.state.work.write() = Work::default();
                self.state.disconnects.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// One mining attempt against the current work.
    pub(crate) fn step(&self) -> Step {
        let Some((job, extranonce1, extranonce2_size)) = self.state.work.read().dispatchable()
        else {
            return Step::Idle;
        };

        let extranonce2 = Extranonce::generate(extranonce2_size);

        let header = match header::build(&job, &extranonce1, &extranonce2) {
            Ok(header) => header,
            Err(err) => {
                self.report_malformed(&job.id, &err);
                return Step::Skipped;
            }
        };

        let config = &self.state.config;
        let nonce_start = self.state.cursor.get();

        let result = self
            .state
            .engine
            .search_batch(&header, nonce_start, config.batch_size, config.share_target)
            .unwrap_or_else(|err| {
                warn!("Hash engine failed on batch at {nonce_start:#010x}: {err}");
                BatchResult::default()
            });

        self.state.cursor.advance(config.batch_size);
        self.state.batches.fetch_add(1, Ordering::Relaxed);
        self.state.hashes.fetch_add(result.hashes, Ordering::Relaxed);

        let mut found = Vec::new();

        for candidate in result.candidates {
            if self.state.ledger.observe(candidate.leading_zero_bits) {
                debug!("New best difficulty: {}", candidate.leading_zero_bits);
            }

            if candidate.leading_zero_bits < config.share_target {
                continue;
            }

            let (session, lifetime) = self.state.ledger.record_share();

            info!(
                "Share found: job={} nonce={:08x} difficulty={} (session {session}, lifetime {lifetime})",
                job.id, candidate.nonce, candidate.leading_zero_bits
            );

            found.push(FoundShare {
                job_id: job.id.clone(),
                extranonce2: extranonce2.clone(),
                ntime: job.ntime.clone(),
                nonce: candidate.nonce,
                leading_zero_bits: candidate.leading_zero_bits,
            });
        }

        Step::Dispatched(found)
    }

    fn report_malformed(&self, job_id: &JobId, err: &MalformedJob) {
        let mut last = self.state.malformed_job.lock();

        if last.as_ref() == Some(job_id) {
            debug!("Skipping malformed job {job_id}: {err}");
        } else {
            warn!("Skipping malformed job {job_id}: {err}");
            *last = Some(job_id.clone());
        }
    }

    /// Blocking mining loop. Returns once `cancel` fires.
    pub fn mine(&self, cancel: &CancellationToken, shares: &mpsc::Sender<FoundShare>) {
        info!("Mining loop started");

        while !cancel.is_cancelled() {
            match self.step() {
                Step::Idle | Step::Skipped => thread::sleep(self.state.config.idle_interval),
                Step::Dispatched(found) => {
                    for share in found {
                        if shares.blocking_send(share).is_err() {
                            debug!("Found share dropped: coordinator shutting down");
                        }
                    }
                }
            }
        }

        info!("Mining loop stopped");
    }

    pub fn snapshot(&self) -> Snapshot {
        let state = &self.state;
        let now = Instant::now();
        let hashes = state.hashes.load(Ordering::Relaxed);
        let work = state.work.read().clone();

        Snapshot {
            ready: work.ready,
            job_id: work.job.as_ref().map(|job| job.id.clone()),
            hashes,
            hash_rate: state.hash_rate.lock().sample(hashes, now),
            batches: state.batches.load(Ordering::Relaxed),
            nonce_cursor: state.cursor.get(),
            session_shares: state.ledger.session_shares(),
            lifetime_shares: state.ledger.lifetime_shares(),
            job_shares: state.ledger.job_shares(),
            best_difficulty: state.ledger.best_difficulty(),
            pool_difficulty: *state.pool_difficulty.read(),
            accepted: state.accepted.load(Ordering::Relaxed),
            rejected: state.rejected.load(Ordering::Relaxed),
            disconnects: state.disconnects.load(Ordering::Relaxed),
            reconnects: state.reconnects.load(Ordering::Relaxed),
            uptime_secs: now.duration_since(state.started).as_secs(),
            block_elapsed_secs: state
                .block_started
                .read()
                .map(|started| now.saturating_duration_since(started).as_secs()),
            price: *state.price.read(),
        }
    }

    /// Sleeps for the reconnect backoff. Returns false if cancelled first.
    async fn backoff(&self, cancel: &CancellationToken) -> bool {
        tokio::select! {
            _ = cancel.cancelled() => false,
            _ = sleep(self.state.config.reconnect_backoff) => true,
        }
    }

    /// Connects, retrying with a fixed backoff until it works or `cancel`
    /// fires. Returns false on cancellation.
    async fn connect(&self, session: &Session, cancel: &CancellationToken) -> bool {
        loop {
            let result = tokio::select! {
                _ = cancel.cancelled() => return false,
                result = session.connect() => result,
            };

            match result {
                Ok(()) => return true,
                Err(err) => warn!(
                    "Failed to connect to {}: {err}, retrying in {:?}",
                    session.endpoint(),
                    self.state.config.reconnect_backoff
                ),
            }

            if !self.backoff(cancel).await {
                return false;
            }
        }
    }

    async fn submit(&self, session: &Session, share: FoundShare) {
        if !self.state.config.submit {
            return;
        }

        let submit = Submit {
            username: self.state.config.username.clone(),
            job_id: share.job_id,
            extranonce2: share.extranonce2,
            ntime: share.ntime,
            nonce: share.nonce,
        };

        if let Err(err) = session.submit(submit).await {
            warn!("Failed to submit share: {err}");
        }
    }

    /// Runs until `cancel` fires: keeps the session connected, feeds events
    /// into the shared state and submits found shares. Returns the final
    /// snapshot.
    pub async fn run(
        &self,
        session: Session,
        mut events: mpsc::Receiver<Event>,
        cancel: CancellationToken,
    ) -> Snapshot {
        let (share_tx, mut share_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        let persisted = CancellationToken::new();
        let writer = self
            .state
            .ledger
            .writer()
            .map(|writer| tokio::spawn(writer.run(persisted.clone())));

        let miner = {
            let coordinator = self.clone();
            let cancel = cancel.clone();
            tokio::task::spawn_blocking(move || coordinator.mine(&cancel, &share_tx))
        };

        info!(
            "Connecting to {} as {}",
            session.endpoint(),
            session.username()
        );

        let mut running = self.connect(&session, &cancel).await;

        while running {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => running = false,
                Some(event) = events.recv() => {
                    self.apply(&event);

                    if event == Event::Disconnected {
                        warn!(
                            "Lost connection to {}, reconnecting in {:?}",
                            session.endpoint(),
                            self.state.config.reconnect_backoff
                        );

                        running = self.backoff(&cancel).await && self.connect(&session, &cancel).await;

                        if running {
                            self.state.reconnects.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                }
                Some(share) = share_rx.recv() => self.submit(&session, share).await,
                else => running = false,
            }
        }

        cancel.cancel();
        drop(share_rx);

        if let Err(err) = session.disconnect().await {
            debug!("Disconnect failed: {err}");
        }

        if let Err(err) = miner.await {
            error!("Mining loop panicked: {err}");
        }

        persisted.cancel();

        if let Some(writer) = writer
            && let Err(err) = writer.await
        {
            error!("Share ledger writer panicked: {err}");
        }

        self.snapshot()
    }
}
