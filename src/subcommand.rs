use {super::*, settings::Settings};

mod mine;
mod shares;

#[derive(Debug, Parser)]
pub(crate) enum Subcommand {
    #[command(about = "Mine against a Stratum pool")]
    Mine(mine::Mine),
    #[command(about = "Print the lifetime share ledger")]
    Shares(shares::Shares),
}

impl Subcommand {
    pub(crate) async fn run(self, settings: Settings, cancel_token: CancellationToken) -> Result {
        match self {
            Self::Mine(mine) => mine.run(settings, cancel_token).await,
            Self::Shares(shares) => shares.run(&settings),
        }
    }
}
