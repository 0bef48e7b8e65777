use super::*;

#[derive(Debug, Parser)]
pub(crate) struct Mine {
    #[arg(help = "Stratum <HOST:PORT>. Overrides --stratum-endpoint.")]
    stratum_endpoint: Option<String>,
}

impl Mine {
    pub(crate) async fn run(self, settings: Settings, cancel_token: CancellationToken) -> Result {
        let settings = Settings {
            stratum_endpoint: self.stratum_endpoint.or(settings.stratum_endpoint),
            ..settings
        };

        let session_config = settings.session_config()?;
        let coordinator_config = settings.coordinator_config()?;

        let engine = CpuEngine::new(settings.threads());

        info!(
            "Hashing on {} CPU threads, {} nonces per batch, share target {} bits",
            engine.threads(),
            coordinator_config.batch_size,
            coordinator_config.share_target,
        );

        if !coordinator_config.submit {
            info!("Share submission disabled");
        }

        let ledger = match settings.ledger() {
            Some(path) => ShareLedger::load(path),
            None => ShareLedger::in_memory(),
        };

        let coordinator = Coordinator::new(coordinator_config, Arc::new(engine), ledger);
        let (session, events) = Session::new(session_config);

        let mut tasks = JoinSet::new();

        let status = coordinator.clone();
        throbber::spawn_status(
            move || status.snapshot(),
            settings.status_interval(),
            cancel_token.clone(),
            &mut tasks,
        );

        if let Some(url) = settings.price_url() {
            price::spawn_price_feed(
                url.into(),
                settings.price_interval(),
                coordinator.clone(),
                cancel_token.clone(),
                &mut tasks,
            )?;
        }

        let snapshot = coordinator.run(session, events, cancel_token.clone()).await;

        cancel_token.cancel();
        while tasks.join_next().await.is_some() {}

        println!("{}", serde_json::to_string_pretty(&snapshot)?);

        Ok(())
    }
}
