use super::*;

#[derive(Debug)]
enum Incoming {
    Frame(Message),
    Closed { reason: String },
}

#[derive(Debug, Clone, PartialEq)]
enum Pending {
    Subscribe,
    Authorize,
    Submit(JobId),
}

struct Connection {
    generation: u64,
    reader_handle: JoinHandle<()>,
    writer: BufWriter<OwnedWriteHalf>,
}

pub(super) enum SessionMessage {
    Connect {
        respond_to: oneshot::Sender<Result>,
    },
    Submit {
        submit: Submit,
        respond_to: oneshot::Sender<Result>,
    },
    Disconnect {
        respond_to: oneshot::Sender<()>,
    },
}

pub(super) struct SessionActor {
    config: Arc<SessionConfig>,
    connection: Option<Connection>,
    events: mpsc::Sender<Event>,
    generation: u64,
    id_counter: u64,
    pending: HashMap<Id, Pending>,
    rx: mpsc::Receiver<SessionMessage>,
    state: watch::Sender<SessionState>,
}

impl SessionActor {
    pub(super) fn new(
        config: Arc<SessionConfig>,
        rx: mpsc::Receiver<SessionMessage>,
        events: mpsc::Sender<Event>,
        state: watch::Sender<SessionState>,
    ) -> Self {
        Self {
            config,
            connection: None,
            events,
            generation: 0,
            id_counter: 0,
            pending: HashMap::new(),
            rx,
            state,
        }
    }

    pub(super) async fn run(mut self) {
        let (incoming_tx, mut incoming_rx) =
            mpsc::channel::<(u64, Incoming)>(CHANNEL_BUFFER_SIZE);

        loop {
            tokio::select! {
                biased;

                Some((generation, incoming)) = incoming_rx.recv() => {
                    self.handle_incoming(generation, incoming).await;
                }
                msg = self.rx.recv() => {
                    match msg {
                        Some(SessionMessage::Connect { respond_to }) => {
                            let result = self.handle_connect(incoming_tx.clone()).await;
                            if respond_to.send(result).is_err() {
                                debug!("Connect response dropped: caller gave up");
                            }
                        }
                        Some(SessionMessage::Submit { submit, respond_to }) => {
                            let result = self.handle_submit(submit).await;
                            if respond_to.send(result).is_err() {
                                debug!("Submit response dropped: caller gave up");
                            }
                        }
                        Some(SessionMessage::Disconnect { respond_to }) => {
                            self.teardown().await;
                            if respond_to.send(()).is_err() {
                                debug!("Disconnect response dropped: caller gave up");
                            }
                        }
                        None => {
                            debug!("Session handle dropped, shutting down");
                            self.teardown().await;
                            break;
                        }
                    }
                }
            }
        }
    }

    fn set_state(&self, state: SessionState) {
        self.state.send_if_modified(|current| {
            if *current == state {
                false
            } else {
                debug!("Session {current} -> {state}");
                *current = state;
                true
            }
        });
    }

    async fn emit(&self, event: Event) {
        if self.events.send(event).await.is_err() {
            debug!("Session event dropped: no receiver");
        }
    }

    fn next_id(&mut self) -> u64 {
        let id = self.id_counter;
        self.id_counter += 1;
        id
    }

    async fn handle_connect(
        &mut self,
        incoming_tx: mpsc::Sender<(u64, Incoming)>,
    ) -> Result {
        if self.connection.is_some() {
            self.teardown().await;
        }

        self.set_state(SessionState::Connecting);

        let stream = match self.open_stream().await {
            Ok(stream) => stream,
            Err(err) => {
                self.set_state(SessionState::Disconnected);
                return Err(err);
            }
        };

        let (reader, writer) = stream.into_split();

        self.generation += 1;
        let generation = self.generation;

        let reader = FramedRead::new(reader, FrameCodec::new());

        let reader_handle = tokio::spawn(Self::reader_task(generation, reader, incoming_tx));

        self.connection = Some(Connection {
            generation,
            reader_handle,
            writer: BufWriter::new(writer),
        });

        info!("Connected to {}", self.config.endpoint);

        self.set_state(SessionState::Subscribing);

        let params = serde_json::to_value(Subscribe {
            user_agent: self.config.user_agent.clone(),
        })
        .map_err(|source| Error::Serialization { source })?;

        if let Err(err) = self
            .send_request("mining.subscribe", params, Pending::Subscribe)
            .await
        {
            error!("Failed to send mining.subscribe: {err}");
            self.teardown().await;
            return Err(err);
        }

        Ok(())
    }

    async fn open_stream(&self) -> Result<TcpStream> {
        let address = resolve_stratum_endpoint(&self.config.endpoint)
            .await
            .map_err(|source| Error::Resolve {
                endpoint: self.config.endpoint.clone(),
                source,
            })?;

        let stream = tokio::time::timeout(self.config.timeout, TcpStream::connect(address))
            .await
            .map_err(|source| Error::Timeout { source })?
            .map_err(|source| Error::Io { source })?;

        stream
            .set_nodelay(true)
            .map_err(|source| Error::Io { source })?;

        Ok(stream)
    }

    async fn handle_submit(&mut self, submit: Submit) -> Result {
        let job_id = submit.job_id.clone();

        let params =
            serde_json::to_value(&submit).map_err(|source| Error::Serialization { source })?;

        if let Err(err) = self
            .send_request("mining.submit", params, Pending::Submit(job_id))
            .await
        {
            error!("Failed to send mining.submit: {err}");

            if matches!(err, Error::Io { .. }) {
                self.fail().await;
            }

            return Err(err);
        }

        Ok(())
    }

    async fn send_request(&mut self, method: &str, params: Value, kind: Pending) -> Result {
        let id = self.next_id();

        let frame = Message::request(id, method, params)
            .to_frame()
            .map_err(|source| Error::Serialization { source })?;

        let connection = self.connection.as_mut().ok_or(Error::NotConnected)?;

        connection
            .writer
            .write_all(frame.as_bytes())
            .await
            .map_err(|source| Error::Io { source })?;

        connection
            .writer
            .flush()
            .await
            .map_err(|source| Error::Io { source })?;

        self.pending.insert(Id::Number(id), kind);

        Ok(())
    }

    /// Drops the connection without reporting it.
    async fn teardown(&mut self) {
        if let Some(mut connection) = self.connection.take() {
            connection.reader_handle.abort();

            if let Err(err) = connection.writer.shutdown().await {
                debug!("Shutdown of connection {} failed: {err}", connection.generation);
            }

            debug!("Connection {} closed", connection.generation);
        }

        self.pending.clear();
        self.set_state(SessionState::Disconnected);
    }

    /// Drops the connection and tells the owner, which decides on reconnecting.
    async fn fail(&mut self) {
        if self.connection.is_none() {
            return;
        }

        self.teardown().await;
        self.emit(Event::Disconnected).await;
    }

    async fn handle_incoming(&mut self, generation: u64, incoming: Incoming) {
        if self.connection.as_ref().map(|c| c.generation) != Some(generation) {
            debug!("Ignoring message from stale connection {generation}");
            return;
        }

        match incoming {
            Incoming::Frame(Message::Response {
                id,
                result,
                error,
                reject_reason,
            }) => match self.pending.remove(&id) {
                Some(Pending::Subscribe) => self.handle_subscribe_response(result, error).await,
                Some(Pending::Authorize) => self.handle_authorize_response(result, error).await,
                Some(Pending::Submit(job_id)) => {
                    self.handle_submit_response(job_id, result, error, reject_reason)
                        .await
                }
                None => warn!("Unmatched response ID={id}"),
            },
            Incoming::Frame(Message::Notification { method, params }) => {
                self.handle_notification(method, params).await
            }
            Incoming::Frame(Message::Request { method, .. }) => {
                debug!("Ignoring pool request: {method}");
            }
            Incoming::Closed { reason } => {
                warn!("Disconnected from {}: {reason}", self.config.endpoint);
                self.fail().await;
            }
        }
    }

    async fn handle_subscribe_response(
        &mut self,
        result: Option<Value>,
        error: Option<JsonRpcError>,
    ) {
        let subscribe = match (result, error) {
            (_, Some(err)) => {
                error!("mining.subscribe failed: {err}");
                self.fail().await;
                return;
            }
            (Some(result), None) => match serde_json::from_value::<SubscribeResult>(result) {
                Ok(subscribe) => subscribe,
                Err(err) => {
                    error!("Malformed mining.subscribe result: {err}");
                    self.fail().await;
                    return;
                }
            },
            (None, None) => {
                error!("Empty mining.subscribe result");
                self.fail().await;
                return;
            }
        };

        info!(
            "Subscribed: extranonce1={}, extranonce2_size={}",
            subscribe.extranonce1, subscribe.extranonce2_size
        );

        self.emit(Event::Subscribed {
            extranonce1: subscribe.extranonce1,
            extranonce2_size: subscribe.extranonce2_size,
        })
        .await;

        self.set_state(SessionState::Authorizing);

        let params = match serde_json::to_value(Authorize {
            username: self.config.username.clone(),
            password: self.config.password.clone(),
        }) {
            Ok(params) => params,
            Err(err) => {
                error!("Failed to serialize mining.authorize: {err}");
                self.fail().await;
                return;
            }
        };

        if let Err(err) = self
            .send_request("mining.authorize", params, Pending::Authorize)
            .await
        {
            error!("Failed to send mining.authorize: {err}");
            self.fail().await;
        }
    }

    async fn handle_authorize_response(
        &mut self,
        result: Option<Value>,
        error: Option<JsonRpcError>,
    ) {
        match (result, error) {
            (Some(Value::Bool(true)), None) => {
                info!("Authorized as {}", self.config.username);
                self.set_state(SessionState::Ready);
                self.emit(Event::Connected).await;
            }
            (_, Some(err)) => {
                error!("mining.authorize failed: {err}");
                self.fail().await;
            }
            (result, None) => {
                let result = result.unwrap_or(Value::Null);
                error!("Unauthorized: {} (result {result})", self.config.username);
                self.fail().await;
            }
        }
    }

    async fn handle_submit_response(
        &mut self,
        job_id: JobId,
        result: Option<Value>,
        error: Option<JsonRpcError>,
        reject_reason: Option<String>,
    ) {
        match (result, error) {
            (Some(Value::Bool(true)), None) => {
                info!("Share accepted for job {job_id}");
                self.emit(Event::ShareAccepted { job_id }).await;
            }
            (_, error) => {
                let reason = reject_reason
                    .or_else(|| error.map(|err| err.to_string()))
                    .unwrap_or_else(|| "rejected".into());

                warn!("Share rejected for job {job_id}: {reason}");
                self.emit(Event::ShareRejected { job_id, reason }).await;
            }
        }
    }

    async fn handle_notification(&mut self, method: String, params: Value) {
        match method.as_str() {
            "mining.notify" => match serde_json::from_value::<Notify>(params) {
                Ok(notify) => {
                    debug!(
                        "New job {} (clean_jobs={})",
                        notify.job_id, notify.clean_jobs
                    );
                    self.emit(Event::Job(Arc::new(Job::from(notify)))).await;
                }
                Err(err) => warn!("Failed to parse mining.notify: {err}"),
            },
            "mining.set_difficulty" => match serde_json::from_value::<SetDifficulty>(params) {
                Ok(set_difficulty) => match set_difficulty.difficulty() {
                    Some(difficulty) => {
                        info!("Pool difficulty set to {difficulty}");
                        self.emit(Event::Difficulty(difficulty)).await;
                    }
                    None => warn!("Empty mining.set_difficulty"),
                },
                Err(err) => warn!("Failed to parse mining.set_difficulty: {err}"),
            },
            _ => debug!("Ignoring notification: {method}"),
        }
    }

    async fn reader_task<R>(
        generation: u64,
        mut reader: FramedRead<R, FrameCodec>,
        incoming_tx: mpsc::Sender<(u64, Incoming)>,
    ) where
        R: AsyncRead + Unpin,
    {
        let reason = loop {
            let line = match reader.next().await {
                Some(Ok(line)) => line,
                Some(Err(err)) => break format!("read error: {err}"),
                None => break "server closed connection".to_string(),
            };

            if line.trim().is_empty() {
                continue;
            }

            let message = match serde_json::from_str::<Message>(&line) {
                Ok(message) => message,
                Err(err) => {
                    warn!("Invalid JSON message: {line:?} - {err}");
                    continue;
                }
            };

            if incoming_tx
                .send((generation, Incoming::Frame(message)))
                .await
                .is_err()
            {
                debug!("Frame forwarding dropped: actor shutting down");
                return;
            }
        };

        if incoming_tx
            .send((generation, Incoming::Closed { reason }))
            .await
            .is_err()
        {
            debug!("Closed notification dropped: actor already shut down");
        }
    }
}
