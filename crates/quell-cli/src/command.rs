use crate::CommandOutcome;

pub(crate) trait RunnableCommand: std::fmt::Debug {
    async fn run(self) -> CommandOutcome;
}
