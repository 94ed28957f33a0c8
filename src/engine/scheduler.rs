// ABOUTME: Concurrent fan-out of definition files with a concurrency limit
// ABOUTME: Runs one blocking render task per definition and collects results in input order

use futures::future::join_all;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use super::error::{EngineError, Result};
use super::orchestrator::{render_definition, RenderSettings};
use super::result::{DefinitionFailure, DefinitionReport, RunReport};

pub struct RenderScheduler {
    max_concurrent: usize,
    semaphore: Arc<Semaphore>,
    fail_fast: bool,
}

impl RenderScheduler {
    /// Create a scheduler running at most `max_concurrent` definitions at once
    pub fn new(max_concurrent: usize) -> Self {
        let max_concurrent = max_concurrent.max(1);
        Self {
            max_concurrent,
            semaphore: Arc::new(Semaphore::new(max_concurrent)),
            fail_fast: true,
        }
    }

    /// When set, the first failure cancels every definition that has not finished
    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Render all definitions concurrently and wait for every task
    pub async fn run(&self, definitions: Vec<PathBuf>, settings: RenderSettings) -> RunReport {
        if definitions.is_empty() {
            return RunReport::default();
        }

        info!(
            "Rendering {} definition(s), up to {} at a time",
            definitions.len(),
            self.max_concurrent
        );

        let settings = Arc::new(settings);
        let cancel = CancellationToken::new();

        let tasks = definitions.iter().cloned().map(|definition| {
            let semaphore = Arc::clone(&self.semaphore);
            let settings = Arc::clone(&settings);
            let cancel = cancel.clone();
            let fail_fast = self.fail_fast;

            tokio::spawn(async move {
                // Held until the failure has been signalled so queued tasks observe it
                let _permit = semaphore.acquire_owned().await;
                let result = run_one(definition.clone(), settings, cancel.clone()).await;

                if let Err(err) = &result {
                    if !err.is_cancelled() {
                        error!("Definition {} failed: {}", definition.display(), err);
                        if fail_fast {
                            cancel.cancel();
                        }
                    }
                }
                result
            })
        });

        let results = join_all(tasks).await;

        let mut report = RunReport::default();
        for (definition, joined) in definitions.into_iter().zip(results) {
            match joined.map_err(EngineError::from).and_then(|r| r) {
                Ok(definition_report) => {
                    debug!(
                        "Definition {} finished: {} rendered, {} skipped",
                        definition.display(),
                        definition_report.rendered_count(),
                        definition_report.skipped_count()
                    );
                    report.definitions.push(definition_report);
                }
                Err(error) => report.failures.push(DefinitionFailure { definition, error }),
            }
        }

        info!("Run completed: {}", report.summary());
        report
    }
}

async fn run_one(
    definition: PathBuf,
    settings: Arc<RenderSettings>,
    cancel: CancellationToken,
) -> Result<DefinitionReport> {
    if cancel.is_cancelled() {
        return Err(EngineError::Cancelled { definition });
    }

    let path = definition.clone();
    tokio::task::spawn_blocking(move || render_definition(&path, &settings, &cancel)).await?
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_definition(dir: &TempDir, name: &str, dest: &str) {
        fs::write(
            dir.path().join(name),
            format!("[[templates]]\nsrc = \"t.tmpl\"\ndest = \"{}\"\n", dest),
        )
        .unwrap();
    }

    #[tokio::test]
    async fn test_run_renders_every_definition() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("t.tmpl"), "ok").unwrap();
        write_definition(&dir, "one.toml", "one.txt");
        write_definition(&dir, "two.toml", "two.txt");

        let report = RenderScheduler::new(2)
            .run(
                vec![PathBuf::from("one.toml"), PathBuf::from("two.toml")],
                RenderSettings::new(dir.path()),
            )
            .await;

        assert!(report.is_success());
        assert_eq!(report.summary().rendered, 2);
        assert_eq!(report.definitions[0].definition, dir.path().join("one.toml"));
        assert_eq!(report.definitions[1].definition, dir.path().join("two.toml"));
        assert!(dir.path().join("one.txt").exists());
        assert!(dir.path().join("two.txt").exists());
    }

    #[tokio::test]
    async fn test_keep_going_collects_failures() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("t.tmpl"), "ok").unwrap();
        write_definition(&dir, "good.toml", "good.txt");

        let report = RenderScheduler::new(1)
            .with_fail_fast(false)
            .run(
                vec![PathBuf::from("missing.toml"), PathBuf::from("good.toml")],
                RenderSettings::new(dir.path()),
            )
            .await;

        assert!(!report.is_success());
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].definition, PathBuf::from("missing.toml"));
        assert_eq!(report.definitions.len(), 1);
        assert!(dir.path().join("good.txt").exists());
    }

    #[tokio::test]
    async fn test_fail_fast_cancels_queued_definitions() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("t.tmpl"), "ok").unwrap();
        write_definition(&dir, "good.toml", "good.txt");

        // A single permit serializes the tasks, so the failure lands first
        let report = RenderScheduler::new(1)
            .run(
                vec![PathBuf::from("missing.toml"), PathBuf::from("good.toml")],
                RenderSettings::new(dir.path()),
            )
            .await;

        let summary = report.summary();
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.cancelled, 1);
        assert!(!dir.path().join("good.txt").exists());
    }

    #[tokio::test]
    async fn test_empty_run_is_success() {
        let report = RenderScheduler::new(4)
            .run(Vec::new(), RenderSettings::new("/"))
            .await;
        assert!(report.is_success());
        assert_eq!(report.summary().definitions, 0);
    }
}
