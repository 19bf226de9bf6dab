use crate::CommandOutcome;
use crate::RunnableCommand;
use crate::output_utils;
use quell::QueryError;
use quell::query;
use quell::schema::Schema;
use quell::validation;
use std::collections::HashSet;
use std::path::PathBuf;
use walkdir::WalkDir;

#[derive(Debug, clap::Args)]
pub(crate) struct ValidateCmd {
    #[arg(
        help="Path to the schema definition file to validate (and to \
             validate query documents against).",
        long,
    )]
    schema: PathBuf,

    #[arg(
        default_values_t=[
            "graphql".to_string(),
            "gql".to_string(),
        ],
        help="Set of file extensions to filter to when searching for query \
             documents within a directory.",
        long,
        value_delimiter = ',',
    )]
    graphql_file_exts: Vec<String>,

    #[arg(
        help="Paths to zero or more query documents (or directories of query \
             documents) to validate against the schema.",
        name="QUERY_FILE_OR_DIR_PATHS",
    )]
    query_paths: Vec<PathBuf>,
}

#[inherent::inherent]
impl RunnableCommand for ValidateCmd {
    pub async fn run(self) -> CommandOutcome {
        let schema_text = match std::fs::read_to_string(&self.schema) {
            Ok(text) => text,
            Err(e) => {
                return CommandOutcome::failure(format_args!(
                    "{} Could not read schema file {:#?}: {e}",
                    output_utils::RED_X,
                    self.schema,
                ));
            }
        };
        let schema = match Schema::parse(&schema_text) {
            Ok(schema) => schema,
            Err(e) => {
                return CommandOutcome::failure(format_args!(
                    "{} Schema error in {:#?}: {}",
                    output_utils::RED_X,
                    self.schema,
                    format_error(&e),
                ));
            }
        };

        // Normalize the set of file extensions to filter with.
        let graphql_file_exts: HashSet<String> =
            self.graphql_file_exts.iter()
                .map(|ext| ext.trim_start_matches('.').to_string())
                .collect();

        log::debug!(
            "Scanning {} input paths...",
            self.query_paths.len(),
        );
        let mut walk_errors: Vec<String> = vec![];
        let mut num_skipped_files = 0;
        let mut query_files = vec![];
        for path in &self.query_paths {
            for entry in WalkDir::new(path.as_path()).follow_links(true) {
                match entry {
                    Ok(entry) => {
                        if !entry.file_type().is_file() {
                            continue;
                        }
                        let path = entry.path();
                        let matches = path.extension()
                            .map(|ext| ext.to_string_lossy().to_string())
                            .is_some_and(|ext| graphql_file_exts.contains(&ext));
                        if matches {
                            log::trace!("Found query document at {path:#?}.");
                            query_files.push(path.to_path_buf());
                        } else {
                            log::trace!("Skipping non-query file: {path:#?}.");
                            num_skipped_files += 1;
                        }
                    },

                    Err(e) => {
                        walk_errors.push(format!("{e}"));
                        continue
                    },
                }
            }
        }

        // A single explicitly-named file is validated even when its
        // extension doesn't match --graphql-file-exts.
        if query_files.is_empty()
            && self.query_paths.len() == 1
            && let Some(first_arg_path) = self.query_paths.first()
            && first_arg_path.is_file() {
            log::warn!(
                "Proceeding to validate {first_arg_path:#?} even though it \
                doesn't match any of the --graphql-file-exts ({}).",
                graphql_file_exts.iter()
                    .map(|ext| format!("`.{ext}`"))
                    .collect::<Vec<_>>()
                    .join(", "),
            );
            query_files.push(first_arg_path.clone());
        }

        log::debug!(
            "Found {} query documents to be validated.",
            query_files.len(),
        );

        let mut failures: Vec<String> = walk_errors;
        for file in &query_files {
            let text = match std::fs::read_to_string(file) {
                Ok(text) => text,
                Err(e) => {
                    failures.push(format!("{file:#?}: {e}"));
                    continue;
                }
            };
            let errors = match query::parse(&text) {
                Ok(document) => validation::validate(&schema, &document),
                Err(e) => vec![e],
            };
            for error in &errors {
                failures.push(format!("{file:#?}: {}", format_error(error)));
            }
        }

        if !failures.is_empty() {
            return CommandOutcome::failure(format_args!(
                "{} GraphQL validation errors:\n  {}",
                output_utils::RED_X,
                failures.join("\n  "),
            ));
        }

        CommandOutcome::success(format_args!(
            concat!(
                "{} All GraphQL validated successfully:\n",
                "  * Validated 1 schema file.\n",
                "  * Validated {} query documents.\n",
                "  * Skipped {} non-query files.",
            ),
            output_utils::GREEN_CHECK,
            query_files.len(),
            num_skipped_files,
        ))
    }
}

fn format_error(error: &QueryError) -> String {
    match error.locations.first() {
        Some(location) => {
            format!("{}:{}: {}", location.line, location.column, error.message)
        }
        None => error.message.clone(),
    }
}
