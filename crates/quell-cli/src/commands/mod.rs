mod run;
mod validate;

use crate::CommandOutcome;
use run::RunCmd;
use validate::ValidateCmd;

#[derive(Debug, clap::Subcommand)]
pub(crate) enum CommandEnum {
    Run(Box<RunCmd>),
    Validate(Box<ValidateCmd>),
}
impl CommandEnum {
    pub(crate) async fn run(self) -> CommandOutcome {
        match self {
            Self::Run(cmd) => cmd.run().await,
            Self::Validate(cmd) => cmd.run().await,
        }
    }
}
