use {
    super::*,
    clap::builder::styling::{AnsiColor, Effects, Styles},
    options::Options,
    settings::Settings,
    subcommand::Subcommand,
};

#[derive(Debug, Parser)]
#[command(
  version,
  about = "Solo Stratum mining client",
  styles = Styles::styled()
    .error(AnsiColor::Red.on_default() | Effects::BOLD)
    .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
    .invalid(AnsiColor::Red.on_default())
    .literal(AnsiColor::Blue.on_default())
    .placeholder(AnsiColor::Cyan.on_default())
    .usage(AnsiColor::Yellow.on_default() | Effects::BOLD)
    .valid(AnsiColor::Green.on_default()),
)]
pub(crate) struct Arguments {
    #[command(flatten)]
    pub(crate) options: Options,
    #[command(subcommand)]
    pub(crate) subcommand: Subcommand,
}

impl Arguments {
    pub(crate) async fn run(self, cancel_token: CancellationToken) -> Result {
        let settings = Settings::load(self.options)?;
        self.subcommand.run(settings, cancel_token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_options_before_subcommand() {
        let arguments = Arguments::try_parse_from([
            "soloist",
            "--username",
            "bc1qexample",
            "--threads",
            "2",
            "mine",
        ])
        .unwrap();

        assert_eq!(arguments.options.username, Some("bc1qexample".into()));
        assert_eq!(arguments.options.threads, Some(2));
        assert!(matches!(arguments.subcommand, Subcommand::Mine(_)));
    }

    #[test]
    fn subcommand_is_required() {
        assert!(Arguments::try_parse_from(["soloist"]).is_err());
    }

    #[test]
    fn unknown_subcommand_fails() {
        assert!(Arguments::try_parse_from(["soloist", "pool"]).is_err());
    }
}
