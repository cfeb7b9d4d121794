//! Downstream ingestion contract.
//!
//! A fixed sequence of named operations (ingest, chunk, embed, datastore
//! lifecycle) run through an external CLI. Each is an atomic call with no
//! visibility into its internals; this module only maps operation names to
//! argument lists and reports success or failure.

use std::path::Path;

use tracing::{debug, warn};

use docforge_shared::{CommandRunner, DocforgeError, IngestConfig, Result};

/// Thin client for the external ingestion CLI.
pub struct Ingestor<'a> {
    runner: &'a dyn CommandRunner,
    command: Vec<String>,
}

impl<'a> Ingestor<'a> {
    /// Build a client from the configured command prefix
    /// (e.g. `["uv", "run", "docs2db"]`).
    pub fn new(runner: &'a dyn CommandRunner, config: &IngestConfig) -> Result<Self> {
        if config.command.is_empty() {
            return Err(DocforgeError::config("ingest command must not be empty"));
        }
        Ok(Self {
            runner,
            command: config.command.clone(),
        })
    }

    /// Ingest a content directory.
    pub fn ingest(&self, content_dir: &Path) -> Result<()> {
        self.invoke(&["ingest", &content_dir.to_string_lossy()])
    }

    /// Chunk ingested documents (without contextual chunking — no LLM required).
    pub fn chunk(&self) -> Result<()> {
        self.invoke(&["chunk", "--skip-context"])
    }

    /// Generate embeddings.
    pub fn embed(&self) -> Result<()> {
        self.invoke(&["embed", "--workers", "1"])
    }

    /// Destroy any existing datastore. Allowed to fail — there may be
    /// nothing to destroy.
    pub fn db_destroy(&self) {
        if let Err(e) = self.invoke(&["db-destroy"]) {
            debug!(error = %e, "db-destroy failed (no existing database is fine)");
        }
    }

    /// Start the datastore.
    pub fn db_start(&self) -> Result<()> {
        self.invoke(&["db-start"])
    }

    /// Load ingested data into the datastore.
    pub fn load(&self, title: &str, description: &str) -> Result<()> {
        self.invoke(&["load", "--title", title, "--description", description])
    }

    /// Dump the datastore to a file.
    pub fn db_dump(&self, output_file: &Path) -> Result<()> {
        if let Some(parent) = output_file.parent() {
            std::fs::create_dir_all(parent).map_err(|e| DocforgeError::io(parent, e))?;
        }
        self.invoke(&["db-dump", "--output-file", &output_file.to_string_lossy()])
    }

    /// Stop the datastore.
    pub fn db_stop(&self) -> Result<()> {
        self.invoke(&["db-stop"])
    }

    /// Run one named operation through the command prefix.
    fn invoke(&self, op_args: &[&str]) -> Result<()> {
        let program = &self.command[0];
        let mut args: Vec<&str> = self.command[1..].iter().map(String::as_str).collect();
        args.extend_from_slice(op_args);

        let output = self.runner.run(program, &args, None)?;
        if output.success {
            Ok(())
        } else {
            warn!(op = op_args[0], code = ?output.code, "ingestion operation failed");
            Err(DocforgeError::Command(format!(
                "{} {} exited with status {:?}: {}",
                program,
                op_args.join(" "),
                output.code,
                output.stderr.trim()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::cell::RefCell;

    use docforge_shared::{CommandOutput, Invocation};

    struct Recorder {
        calls: RefCell<Vec<Invocation>>,
        fail_ops: Vec<&'static str>,
    }

    impl Recorder {
        fn new(fail_ops: Vec<&'static str>) -> Self {
            Self {
                calls: RefCell::new(Vec::new()),
                fail_ops,
            }
        }
    }

    impl CommandRunner for Recorder {
        fn run(&self, program: &str, args: &[&str], cwd: Option<&Path>) -> Result<CommandOutput> {
            self.calls.borrow_mut().push(Invocation {
                program: program.to_string(),
                args: args.iter().map(|s| s.to_string()).collect(),
                cwd: cwd.map(Path::to_path_buf),
            });
            if self.fail_ops.iter().any(|op| args.contains(op)) {
                Ok(CommandOutput::failed("operation failed"))
            } else {
                Ok(CommandOutput::ok())
            }
        }
    }

    fn config() -> IngestConfig {
        IngestConfig::default()
    }

    #[test]
    fn ops_run_through_command_prefix() {
        let runner = Recorder::new(vec![]);
        let ingestor = Ingestor::new(&runner, &config()).expect("ingestor");

        ingestor.ingest(Path::new("docs2db_content")).expect("ingest");
        ingestor.chunk().expect("chunk");

        let calls = runner.calls.borrow();
        assert_eq!(calls[0].program, "uv");
        assert_eq!(
            calls[0].args,
            ["run", "docs2db", "ingest", "docs2db_content"]
        );
        assert_eq!(calls[1].args, ["run", "docs2db", "chunk", "--skip-context"]);
    }

    #[test]
    fn db_destroy_failure_is_swallowed() {
        let runner = Recorder::new(vec!["db-destroy"]);
        let ingestor = Ingestor::new(&runner, &config()).expect("ingestor");
        ingestor.db_destroy();
        assert_eq!(runner.calls.borrow().len(), 1);
    }

    #[test]
    fn failed_op_is_a_command_error() {
        let runner = Recorder::new(vec!["embed"]);
        let ingestor = Ingestor::new(&runner, &config()).expect("ingestor");
        let err = ingestor.embed().unwrap_err();
        assert!(err.to_string().contains("embed"));
    }

    #[test]
    fn empty_command_prefix_is_rejected() {
        let runner = Recorder::new(vec![]);
        let bad = IngestConfig {
            command: vec![],
            ..IngestConfig::default()
        };
        assert!(Ingestor::new(&runner, &bad).is_err());
    }

    #[test]
    fn load_passes_title_and_description() {
        let runner = Recorder::new(vec![]);
        let ingestor = Ingestor::new(&runner, &config()).expect("ingestor");
        ingestor.load("Fedora Documentation", "RAG database").expect("load");

        let calls = runner.calls.borrow();
        assert!(calls[0].args.contains(&"--title".to_string()));
        assert!(calls[0].args.contains(&"Fedora Documentation".to_string()));
    }
}
