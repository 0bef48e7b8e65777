use super::*;

pub const CONFIG_FILE_NAME: &str = "soloist.toml";
pub const ENV_PREFIX: &str = "SOLOIST_";

/// TOML config file structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub stratum_endpoint: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub ledger: Option<PathBuf>,
    pub price_url: Option<String>,
    pub price_interval: Option<u64>,
    pub status_interval: Option<u64>,

    pub mine: Option<MineSection>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MineSection {
    pub stratum_endpoint: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub threads: Option<usize>,
    pub batch_size: Option<u32>,
    pub share_target: Option<u32>,
    pub submit: Option<bool>,
    pub reconnect_backoff: Option<u64>,
    pub timeout: Option<u64>,
}

/// Resolved configuration. Sources in priority order: command line,
/// `SOLOIST_*` environment variables, config file, defaults.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Settings {
    pub config: Option<PathBuf>,
    pub config_dir: Option<PathBuf>,

    pub stratum_endpoint: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub threads: Option<usize>,
    pub batch_size: Option<u32>,
    pub share_target: Option<u32>,
    pub submit: Option<bool>,
    pub ledger: Option<PathBuf>,
    pub price_url: Option<String>,
    pub price_interval: Option<u64>,
    pub status_interval: Option<u64>,
    pub reconnect_backoff: Option<u64>,
    pub timeout: Option<u64>,
}

impl Settings {
    pub fn load(options: crate::options::Options) -> Result<Self> {
        let mut env = BTreeMap::<String, String>::new();

        for (var, value) in env::vars_os() {
            let Some(var) = var.to_str() else {
                continue;
            };

            let Some(key) = var.strip_prefix(ENV_PREFIX) else {
                continue;
            };

            env.insert(
                key.into(),
                value.into_string().map_err(|value| {
                    anyhow!(
                        "environment variable `{var}` not valid unicode: `{}`",
                        value.to_string_lossy()
                    )
                })?,
            );
        }

        Self::merge(options, env)
    }

    pub fn merge(options: crate::options::Options, env: BTreeMap<String, String>) -> Result<Self> {
        let settings = Self::from_options(&options).or(Self::from_env(&env)?);

        let config = match settings.find_config_path() {
            Some(path) => Self::read_config(&path)?,
            None => Config::default(),
        };

        let settings = settings
            .or(Self::from_config(&config))
            .or_defaults(ShareLedger::default_path());

        settings.validate()?;

        Ok(settings)
    }

    fn read_config(path: &Path) -> Result<Config> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to open config file `{}`", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to deserialize config file `{}`", path.display()))
    }

    fn find_config_path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.config {
            return Some(path.clone());
        }

        if let Some(dir) = &self.config_dir {
            let path = dir.join(CONFIG_FILE_NAME);
            if path.exists() {
                return Some(path);
            }
        }

        dirs::config_dir()
            .map(|dir| dir.join("soloist").join(CONFIG_FILE_NAME))
            .filter(|path| path.exists())
    }

    pub fn from_options(options: &crate::options::Options) -> Self {
        Self {
            config: options.config.clone(),
            config_dir: options.config_dir.clone(),
            stratum_endpoint: options.stratum_endpoint.clone(),
            username: options.username.clone(),
            password: options.password.clone(),
            threads: options.threads,
            batch_size: options.batch_size,
            share_target: options.share_target,
            submit: options.no_submit.then_some(false),
            ledger: options.ledger.clone(),
            price_url: options.price_url.clone(),
            price_interval: options.price_interval,
            status_interval: options.status_interval,
            reconnect_backoff: options.reconnect_backoff,
            timeout: options.timeout,
        }
    }

    pub fn from_env(env: &BTreeMap<String, String>) -> Result<Self> {
        let get_string = |key: &str| env.get(key).cloned();

        let get_path = |key: &str| env.get(key).map(PathBuf::from);

        let get_bool = |key: &str| {
            env.get(key)
                .map(|value| !value.is_empty() && value != "0" && value.to_lowercase() != "false")
        };

        fn parse<T: std::str::FromStr>(
            env: &BTreeMap<String, String>,
            key: &str,
            kind: &str,
        ) -> Result<Option<T>>
        where
            T::Err: std::error::Error + Send + Sync + 'static,
        {
            env.get(key)
                .map(|value| value.parse::<T>())
                .transpose()
                .with_context(|| {
                    format!("failed to parse environment variable {ENV_PREFIX}{key} as {kind}")
                })
        }

        Ok(Self {
            config: get_path("CONFIG"),
            config_dir: get_path("CONFIG_DIR"),
            stratum_endpoint: get_string("STRATUM_ENDPOINT"),
            username: get_string("USERNAME"),
            password: get_string("PASSWORD"),
            threads: parse(env, "THREADS", "usize")?,
            batch_size: parse(env, "BATCH_SIZE", "u32")?,
            share_target: parse(env, "SHARE_TARGET", "u32")?,
            submit: get_bool("SUBMIT"),
            ledger: get_path("LEDGER"),
            price_url: get_string("PRICE_URL"),
            price_interval: parse(env, "PRICE_INTERVAL", "u64")?,
            status_interval: parse(env, "STATUS_INTERVAL", "u64")?,
            reconnect_backoff: parse(env, "RECONNECT_BACKOFF", "u64")?,
            timeout: parse(env, "TIMEOUT", "u64")?,
        })
    }

    /// The `[mine]` section overrides top-level keys.
    pub fn from_config(config: &Config) -> Self {
        let mine = config.mine.as_ref();

        Self {
            config: None,
            config_dir: None,
            stratum_endpoint: mine
                .and_then(|m| m.stratum_endpoint.clone())
                .or(config.stratum_endpoint.clone()),
            username: mine
                .and_then(|m| m.username.clone())
                .or(config.username.clone()),
            password: mine
                .and_then(|m| m.password.clone())
                .or(config.password.clone()),
            threads: mine.and_then(|m| m.threads),
            batch_size: mine.and_then(|m| m.batch_size),
            share_target: mine.and_then(|m| m.share_target),
            submit: mine.and_then(|m| m.submit),
            ledger: config.ledger.clone(),
            price_url: config.price_url.clone(),
            price_interval: config.price_interval,
            status_interval: config.status_interval,
            reconnect_backoff: mine.and_then(|m| m.reconnect_backoff),
            timeout: mine.and_then(|m| m.timeout),
        }
    }

    /// Merge self with another Settings, self takes priority
    pub fn or(self, other: Self) -> Self {
        Self {
            config: self.config.or(other.config),
            config_dir: self.config_dir.or(other.config_dir),
            stratum_endpoint: self.stratum_endpoint.or(other.stratum_endpoint),
            username: self.username.or(other.username),
            password: self.password.or(other.password),
            threads: self.threads.or(other.threads),
            batch_size: self.batch_size.or(other.batch_size),
            share_target: self.share_target.or(other.share_target),
            submit: self.submit.or(other.submit),
            ledger: self.ledger.or(other.ledger),
            price_url: self.price_url.or(other.price_url),
            price_interval: self.price_interval.or(other.price_interval),
            status_interval: self.status_interval.or(other.status_interval),
            reconnect_backoff: self.reconnect_backoff.or(other.reconnect_backoff),
            timeout: self.timeout.or(other.timeout),
        }
    }

    /// Fills every unset field. Without a home directory there is no default
    /// ledger and shares are only counted in memory.
    fn or_defaults(self, default_ledger: Option<PathBuf>) -> Self {
        let threads = match self.threads {
            Some(threads) => threads,
            None => thread::available_parallelism().map_or(1, |n| n.get()),
        };

        if self.ledger.is_none() && default_ledger.is_none() {
            warn!("Could not locate home directory, share ledger will not be persisted");
        }

        Self {
            config: self.config,
            config_dir: self.config_dir,
            stratum_endpoint: self.stratum_endpoint,
            username: self.username,
            password: Some(self.password.unwrap_or_else(|| "x".into())),
            threads: Some(threads),
            batch_size: Some(self.batch_size.unwrap_or(coordinator::DEFAULT_BATCH_SIZE)),
            share_target: Some(
                self.share_target
                    .unwrap_or(coordinator::DEFAULT_SHARE_TARGET),
            ),
            submit: Some(self.submit.unwrap_or(true)),
            ledger: self.ledger.or(default_ledger),
            price_url: self.price_url.filter(|url| !url.is_empty()),
            price_interval: Some(self.price_interval.unwrap_or(60)),
            status_interval: Some(self.status_interval.unwrap_or(10)),
            reconnect_backoff: Some(
                self.reconnect_backoff
                    .unwrap_or(coordinator::RECONNECT_BACKOFF.as_secs()),
            ),
            timeout: Some(self.timeout.unwrap_or(10)),
        }
    }

    fn validate(&self) -> Result {
        ensure!(self.threads != Some(0), "threads must be at least 1");
        ensure!(self.batch_size != Some(0), "batch size must be at least 1");
        ensure!(
            self.share_target.is_none_or(|target| target <= 256),
            "share target must be at most 256 bits"
        );
        ensure!(
            self.price_interval != Some(0),
            "price interval must be at least 1 second"
        );
        ensure!(
            self.status_interval != Some(0),
            "status interval must be at least 1 second"
        );
        ensure!(self.timeout != Some(0), "timeout must be at least 1 second");

        Ok(())
    }

    pub fn stratum_endpoint(&self) -> Result<&str> {
        self.stratum_endpoint
            .as_deref()
            .filter(|endpoint| !endpoint.is_empty())
            .ok_or_else(|| {
                anyhow!("no stratum endpoint, pass --stratum-endpoint or set {ENV_PREFIX}STRATUM_ENDPOINT")
            })
    }

    pub fn username(&self) -> Result<&str> {
        self.username
            .as_deref()
            .filter(|username| !username.is_empty())
            .ok_or_else(|| anyhow!("no username, pass --username or set {ENV_PREFIX}USERNAME"))
    }

    pub fn password(&self) -> &str {
        self.password.as_deref().unwrap_or("x")
    }

    pub fn threads(&self) -> usize {
        self.threads.unwrap_or(1)
    }

    pub fn ledger(&self) -> Option<&Path> {
        self.ledger.as_deref()
    }

    pub fn price_url(&self) -> Option<&str> {
        self.price_url.as_deref()
    }

    pub fn price_interval(&self) -> Duration {
        Duration::from_secs(self.price_interval.unwrap_or(60))
    }

    pub fn status_interval(&self) -> Duration {
        Duration::from_secs(self.status_interval.unwrap_or(10))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout.unwrap_or(10))
    }

    pub fn session_config(&self) -> Result<SessionConfig> {
        Ok(SessionConfig {
            endpoint: self.stratum_endpoint()?.into(),
            username: self.username()?.into(),
            password: self.password().into(),
            user_agent: USER_AGENT.into(),
            timeout: self.timeout(),
        })
    }

    pub fn coordinator_config(&self) -> Result<CoordinatorConfig> {
        let defaults = CoordinatorConfig::default();

        Ok(CoordinatorConfig {
            batch_size: self.batch_size.unwrap_or(defaults.batch_size),
            share_target: self.share_target.unwrap_or(defaults.share_target),
            reconnect_backoff: self
                .reconnect_backoff
                .map(Duration::from_secs)
                .unwrap_or(defaults.reconnect_backoff),
            submit: self.submit.unwrap_or(defaults.submit),
            username: self.username()?.into(),
            ..defaults
        })
    }
}

#[cfg(test)]
mod tests {
    use {super::*, crate::options::Options, pretty_assertions::assert_eq};

    fn env(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    fn merge_with_config(options: Options, env: BTreeMap<String, String>, toml: &str) -> Settings {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, toml).unwrap();

        Settings::merge(
            Options {
                config: Some(path),
                ..options
            },
            env,
        )
        .unwrap()
    }

    #[test]
    fn ledger_defaults_to_home() {
        let settings =
            Settings::default().or_defaults(Some("/home/miner/.soloist_shares.json".into()));
        assert_eq!(
            settings.ledger(),
            Some(Path::new("/home/miner/.soloist_shares.json"))
        );
    }

    #[test]
    fn explicit_ledger_beats_default() {
        let settings = Settings {
            ledger: Some("/tmp/shares.json".into()),
            ..Default::default()
        }
        .or_defaults(None);

        assert_eq!(settings.ledger(), Some(Path::new("/tmp/shares.json")));
    }

    #[test]
    fn missing_home_leaves_ledger_in_memory() {
        let settings = Settings::default().or_defaults(None);

        assert_eq!(settings.ledger(), None);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn settings_from_empty_env() {
        let settings = Settings::from_env(&BTreeMap::new()).unwrap();
        assert!(settings.stratum_endpoint.is_none());
        assert!(settings.submit.is_none());
    }

    #[test]
    fn settings_from_env() {
        let settings = Settings::from_env(&env(&[
            ("STRATUM_ENDPOINT", "pool.example.com:3333"),
            ("USERNAME", "bc1qexample"),
            ("THREADS", "2"),
            ("SHARE_TARGET", "20"),
            ("SUBMIT", "false"),
        ]))
        .unwrap();

        assert_eq!(
            settings.stratum_endpoint,
            Some("pool.example.com:3333".into())
        );
        assert_eq!(settings.username, Some("bc1qexample".into()));
        assert_eq!(settings.threads, Some(2));
        assert_eq!(settings.share_target, Some(20));
        assert_eq!(settings.submit, Some(false));
    }

    #[test]
    fn invalid_env_number_fails() {
        let err = Settings::from_env(&env(&[("BATCH_SIZE", "lots")])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "failed to parse environment variable SOLOIST_BATCH_SIZE as u32"
        );
    }

    #[test]
    fn settings_merge_priority() {
        let high = Settings {
            username: Some("cli".into()),
            ..Default::default()
        };
        let low = Settings {
            username: Some("env".into()),
            threads: Some(3),
            ..Default::default()
        };

        let merged = high.or(low);
        assert_eq!(merged.username, Some("cli".into()));
        assert_eq!(merged.threads, Some(3));
    }

    #[test]
    fn cli_beats_env_beats_config() {
        let settings = merge_with_config(
            Options {
                username: Some("cli".into()),
                ..Default::default()
            },
            env(&[("USERNAME", "env"), ("STRATUM_ENDPOINT", "env.example.com")]),
            r#"
                username = "file"
                stratum_endpoint = "file.example.com"
                price_url = "https://prices.example.com/spot"
            "#,
        );

        assert_eq!(settings.username().unwrap(), "cli");
        assert_eq!(settings.stratum_endpoint().unwrap(), "env.example.com");
        assert_eq!(
            settings.price_url(),
            Some("https://prices.example.com/spot")
        );
    }

    #[test]
    fn config_file_parsing() {
        let config: Config = toml::from_str(
            r#"
                stratum_endpoint = "solo.example.com"
                ledger = "/tmp/shares.json"

                [mine]
                threads = 4
                share_target = 30
                submit = false
            "#,
        )
        .unwrap();

        assert_eq!(config.stratum_endpoint, Some("solo.example.com".into()));
        assert_eq!(config.ledger, Some("/tmp/shares.json".into()));

        let mine = config.mine.unwrap();
        assert_eq!(mine.threads, Some(4));
        assert_eq!(mine.share_target, Some(30));
        assert_eq!(mine.submit, Some(false));
    }

    #[test]
    fn unknown_config_key_fails() {
        assert!(toml::from_str::<Config>("bogus = 1").is_err());
    }

    #[test]
    fn mine_section_overrides_global() {
        let config: Config = toml::from_str(
            r#"
                username = "global"

                [mine]
                username = "section"
            "#,
        )
        .unwrap();

        assert_eq!(
            Settings::from_config(&config).username,
            Some("section".into())
        );
    }

    #[test]
    fn defaults() {
        let settings = merge_with_config(Options::default(), BTreeMap::new(), "");

        assert_eq!(settings.password(), "x");
        assert_eq!(settings.batch_size, Some(coordinator::DEFAULT_BATCH_SIZE));
        assert_eq!(settings.share_target, Some(coordinator::DEFAULT_SHARE_TARGET));
        assert_eq!(settings.submit, Some(true));
        assert_eq!(settings.timeout(), Duration::from_secs(10));
        assert_eq!(settings.status_interval(), Duration::from_secs(10));
        assert!(settings.threads() >= 1);
        assert!(settings.price_url().is_none());
    }

    #[test]
    fn no_submit_flag_disables_submission() {
        let settings = merge_with_config(
            Options {
                no_submit: true,
                ..Default::default()
            },
            env(&[("SUBMIT", "true")]),
            "",
        );

        assert_eq!(settings.submit, Some(false));
    }

    #[test]
    fn missing_username_is_reported() {
        let settings = merge_with_config(Options::default(), BTreeMap::new(), "");
        assert!(settings.username().is_err());
        assert!(settings.session_config().is_err());
    }

    #[test]
    fn zero_values_fail_validation() {
        for settings in [
            Settings {
                threads: Some(0),
                ..Default::default()
            },
            Settings {
                batch_size: Some(0),
                ..Default::default()
            },
            Settings {
                share_target: Some(257),
                ..Default::default()
            },
            Settings {
                timeout: Some(0),
                ..Default::default()
            },
        ] {
            assert!(settings.validate().is_err());
        }
    }

    #[test]
    fn session_and_coordinator_config() {
        let settings = merge_with_config(
            Options {
                stratum_endpoint: Some("127.0.0.1:3333".into()),
                username: Some("bc1qexample.rig".into()),
                reconnect_backoff: Some(2),
                ..Default::default()
            },
            BTreeMap::new(),
            "",
        );

        let session = settings.session_config().unwrap();
        assert_eq!(session.endpoint, "127.0.0.1:3333");
        assert_eq!(session.username, "bc1qexample.rig");
        assert_eq!(session.password, "x");
        assert_eq!(session.user_agent, USER_AGENT);

        let coordinator = settings.coordinator_config().unwrap();
        assert_eq!(coordinator.username, "bc1qexample.rig");
        assert_eq!(coordinator.reconnect_backoff, Duration::from_secs(2));
        assert!(coordinator.submit);
    }
}
