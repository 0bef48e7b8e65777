use {super::*, ledger::Error as LedgerError};

#[derive(Debug, Parser)]
pub(crate) struct Shares {}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct Output {
    pub(crate) path: PathBuf,
    pub(crate) total: u64,
    pub(crate) updated: Option<String>,
}

impl Shares {
    pub(crate) fn run(self, settings: &Settings) -> Result {
        let output = Self::output(settings)?;
        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }

    fn output(settings: &Settings) -> Result<Output> {
        let path = settings
            .ledger()
            .ok_or_else(|| anyhow!("no share ledger path, pass --ledger"))?;

        match ShareLedger::read(path) {
            Ok(record) => Ok(Output {
                path: path.into(),
                total: record.total,
                updated: Some(record.updated),
            }),
            Err(LedgerError::Read { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                Ok(Output {
                    path: path.into(),
                    total: 0,
                    updated: None,
                })
            }
            Err(err) => Err(err.into()),
        }
    }
}
