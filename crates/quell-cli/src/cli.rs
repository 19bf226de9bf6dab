use crate::commands::CommandEnum;

#[derive(clap::Parser, Debug)]
#[command(name = "quell", version, arg_required_else_help = true)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) cmd: CommandEnum,

    #[arg(
        help="Enable verbose output.",
        long,
        short='v',
    )]
    pub verbose: bool,
}
