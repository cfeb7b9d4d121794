//! External static-site build invocation.
//!
//! The generator runs inside a container; this module only knows how to
//! find a container runtime and run the image against the work directory.

use std::path::Path;

use tracing::{info, instrument};

use docforge_shared::{CommandRunner, DocforgeError, Result};

/// Container runtimes probed in preference order.
const CONTAINER_RUNTIMES: [&str; 2] = ["podman", "docker"];

/// Check for required external tools. Returns the container runtime to use.
pub fn check_prerequisites(runner: &dyn CommandRunner) -> Result<String> {
    let mut missing = Vec::new();

    let runtime = CONTAINER_RUNTIMES
        .iter()
        .find(|rt| runner.is_available(rt))
        .map(|rt| rt.to_string());
    if runtime.is_none() {
        missing.push("podman or docker");
    }

    if !runner.is_available("git") {
        missing.push("git");
    }

    match runtime {
        Some(rt) if missing.is_empty() => {
            info!(runtime = %rt, "container runtime found");
            Ok(rt)
        }
        _ => Err(DocforgeError::config(format!(
            "missing required tools: {}",
            missing.join(", ")
        ))),
    }
}

/// Build the aggregated site by running the generator image against the
/// work directory. Synchronous, unbounded wait.
#[instrument(skip_all, fields(runtime, image, work_dir = %work_dir.display()))]
pub fn build_site(
    runner: &dyn CommandRunner,
    runtime: &str,
    image: &str,
    work_dir: &Path,
) -> Result<()> {
    let abs_work = std::fs::canonicalize(work_dir).map_err(|e| DocforgeError::io(work_dir, e))?;
    let volume = format!("{}:/antora:Z", abs_work.display());

    let output = runner.run(
        runtime,
        &[
            "run",
            "--rm",
            "-v",
            &volume,
            image,
            docforge_playbook::PLAYBOOK_FILE,
        ],
        None,
    )?;

    if !output.success {
        let stderr: String = output.stderr.chars().take(500).collect();
        return Err(DocforgeError::Command(format!(
            "site build failed (exit {:?}): {}",
            output.code,
            stderr.trim()
        )));
    }

    info!("site build complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use docforge_shared::CommandOutput;

    struct OnlyPrograms(Vec<&'static str>);

    impl CommandRunner for OnlyPrograms {
        fn run(
            &self,
            program: &str,
            _args: &[&str],
            _cwd: Option<&Path>,
        ) -> Result<CommandOutput> {
            if self.0.contains(&program) {
                Ok(CommandOutput::ok())
            } else {
                Err(DocforgeError::Command(format!(
                    "failed to start '{program}'"
                )))
            }
        }
    }

    #[test]
    fn prefers_podman_over_docker() {
        let runner = OnlyPrograms(vec!["podman", "docker", "git"]);
        assert_eq!(check_prerequisites(&runner).expect("runtime"), "podman");
    }

    #[test]
    fn falls_back_to_docker() {
        let runner = OnlyPrograms(vec!["docker", "git"]);
        assert_eq!(check_prerequisites(&runner).expect("runtime"), "docker");
    }

    #[test]
    fn reports_all_missing_tools() {
        let runner = OnlyPrograms(vec![]);
        let err = check_prerequisites(&runner).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("podman or docker"));
        assert!(msg.contains("git"));
    }
}
