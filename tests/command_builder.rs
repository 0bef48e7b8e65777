use super::*;

pub(crate) trait ToArgs {
    fn to_args(&self) -> Vec<String>;
}

impl ToArgs for &str {
    fn to_args(&self) -> Vec<String> {
        self.split_whitespace().map(str::to_string).collect()
    }
}

impl ToArgs for Vec<String> {
    fn to_args(&self) -> Vec<String> {
        self.clone()
    }
}

/// Runs the `soloist` binary with `HOME` pointed at a scratch directory, so
/// neither the caller's config file nor their share ledger is touched.
pub(crate) struct CommandBuilder {
    args: Vec<String>,
    env: Vec<(String, String)>,
    expected_exit_code: i32,
    tempdir: Arc<TempDir>,
}

impl CommandBuilder {
    pub(crate) fn new(args: impl ToArgs) -> Self {
        Self {
            args: args.to_args(),
            env: Vec::new(),
            expected_exit_code: 0,
            tempdir: Arc::new(TempDir::new().unwrap()),
        }
    }

    pub(crate) fn env(mut self, key: &str, value: &str) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub(crate) fn expected_exit_code(self, expected_exit_code: i32) -> Self {
        Self {
            expected_exit_code,
            ..self
        }
    }

    pub(crate) fn tempdir(&self) -> &Path {
        self.tempdir.path()
    }

    pub(crate) fn command(&self) -> Command {
        let mut command = Command::new(env!("CARGO_BIN_EXE_soloist"));

        for (key, _) in std::env::vars() {
            if key.starts_with("SOLOIST_") {
                command.env_remove(key);
            }
        }

        command
            .env("HOME", self.tempdir.path())
            .env("XDG_CONFIG_HOME", self.tempdir.path().join(".config"))
            .envs(self.env.iter().map(|(key, value)| (key, value)))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .current_dir(self.tempdir.path())
            .args(&self.args);

        command
    }

    /// Runs to completion and returns `(stdout, stderr)`.
    #[track_caller]
    pub(crate) fn run(self) -> (String, String) {
        let output = self.command().output().unwrap();

        let stdout = String::from_utf8(output.stdout).unwrap();
        let stderr = String::from_utf8(output.stderr).unwrap();

        assert_eq!(
            output.status.code(),
            Some(self.expected_exit_code),
            "unexpected exit status\nstdout: {stdout}\nstderr: {stderr}"
        );

        (stdout, stderr)
    }

    #[track_caller]
    pub(crate) fn run_and_deserialize_output<T: DeserializeOwned>(self) -> T {
        let (stdout, _) = self.run();
        serde_json::from_str(&stdout).unwrap()
    }
}
