use crate::CommandOutcome;
use crate::RunnableCommand;
use crate::output_utils;
use anyhow::Context;
use quell::CancellationToken;
use quell::Engine;
use quell::Resolvers;
use quell::schema::Schema;
use std::path::PathBuf;

/// Executes a query document against a schema whose root fields are served
/// from a static JSON data file. Every non-root field reads through to the
/// parent object, so any tree-shaped JSON document can back a schema.
#[derive(Debug, clap::Args)]
pub(crate) struct RunCmd {
    #[arg(
        help="Path to the schema definition file.",
        long,
    )]
    schema: PathBuf,

    #[arg(
        help="Path to a JSON file whose top-level keys provide the root \
             query fields.",
        long,
    )]
    data: PathBuf,

    #[arg(
        help="Name of the operation to run when the document defines more \
             than one.",
        long,
    )]
    operation: Option<String>,

    #[arg(
        default_value="{}",
        help="JSON object of variable values.",
        long,
    )]
    variables: String,

    #[arg(
        help="Path to the query document to execute.",
        name="QUERY_PATH",
    )]
    query_path: PathBuf,
}

#[inherent::inherent]
impl RunnableCommand for RunCmd {
    pub async fn run(self) -> CommandOutcome {
        match self.run_query().await {
            Ok(output) => CommandOutcome::success(format_args!("{output}")),
            Err(e) => CommandOutcome::failure(format_args!(
                "{} {e:#}",
                output_utils::RED_X,
            )),
        }
    }
}

impl RunCmd {
    async fn run_query(self) -> anyhow::Result<String> {
        let schema_text = std::fs::read_to_string(&self.schema)
            .with_context(|| format!("could not read schema file {:#?}", self.schema))?;
        let schema = Schema::parse(&schema_text)
            .map_err(|e| anyhow::anyhow!("schema error: {e}"))?;

        let data_text = std::fs::read_to_string(&self.data)
            .with_context(|| format!("could not read data file {:#?}", self.data))?;
        let data: serde_json::Value = serde_json::from_str(&data_text)
            .with_context(|| format!("could not parse data file {:#?}", self.data))?;
        anyhow::ensure!(
            data.is_object(),
            "data file {:#?} must contain a JSON object",
            self.data,
        );

        let variables: serde_json::Map<String, serde_json::Value> =
            serde_json::from_str(&self.variables)
                .context("--variables must be a JSON object")?;

        let query = std::fs::read_to_string(&self.query_path)
            .with_context(|| format!("could not read query file {:#?}", self.query_path))?;

        let root_name = schema.query_type().to_string();
        let root_fields: Vec<String> = schema
            .object(&root_name)
            .map(|object| object.fields().keys().cloned().collect())
            .unwrap_or_default();
        let object_names: Vec<String> = schema
            .objects()
            .map(|object| object.name().to_string())
            .collect();

        let mut resolvers = Resolvers::new();
        for field in root_fields {
            let value = data.get(&field).cloned().unwrap_or(serde_json::Value::Null);
            resolvers = resolvers.register(&root_name, &field, move |_ctx| {
                let value = value.clone();
                async move { Ok(value) }
            });
        }
        for name in &object_names {
            resolvers = resolvers.properties(&schema, name);
        }

        let engine = Engine::builder()
            .schema(schema)
            .resolvers(resolvers)
            .build()?;
        let response = engine
            .execute(
                CancellationToken::new(),
                &query,
                self.operation.as_deref(),
                variables,
            )
            .await;
        Ok(serde_json::to_string_pretty(&response)?)
    }
}
