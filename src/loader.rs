//! Run coordinator.
//!
//! Drives one import run through its phases: select the space, read the
//! tables, create tags, import entities, import relationships, validate,
//! report. Phases are strictly sequential; validation is best-effort. The
//! store session is released on every path, and the summary is printed
//! regardless of outcome.

use tracing::{debug, info, warn};

use crate::client::{GatewaySession, GraphSession};
use crate::config::{AppConfig, ImportConfig};
use crate::dataset::{Dataset, EntityRow, RelationshipRow};
use crate::error::LoadError;
use crate::executor::Executor;
use crate::schema::{ensure_tags, TagPlan};
use crate::statement::{edge_batches, group_by_tag, vertex_batches};
use crate::stats::ImportStats;
use crate::validate::validate_import;

/// Phases of one import run, in order. `Failed` is reachable from any step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    Disconnected,
    Connected,
    DataLoaded,
    SchemaReady,
    EntitiesImported,
    RelationshipsImported,
    Validated,
    Done,
    Failed,
}

impl LoadPhase {
    pub fn as_str(&self) -> &str {
        match self {
            LoadPhase::Disconnected => "disconnected",
            LoadPhase::Connected => "connected",
            LoadPhase::DataLoaded => "data_loaded",
            LoadPhase::SchemaReady => "schema_ready",
            LoadPhase::EntitiesImported => "entities_imported",
            LoadPhase::RelationshipsImported => "relationships_imported",
            LoadPhase::Validated => "validated",
            LoadPhase::Done => "done",
            LoadPhase::Failed => "failed",
        }
    }
}

impl std::fmt::Display for LoadPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coordinates one import run over a connected store session.
pub struct Loader<S: GraphSession> {
    config: AppConfig,
    session: S,
    stats: ImportStats,
    plan: TagPlan,
    phase: LoadPhase,
    dry_run: bool,
}

impl Loader<GatewaySession> {
    /// Connect to the store and build a loader for the run.
    pub async fn connect(config: AppConfig) -> Result<Loader<GatewaySession>, LoadError> {
        let session = GatewaySession::connect(&config.nebula).await?;
        Ok(Loader::with_session(config, session))
    }
}

impl<S: GraphSession> Loader<S> {
    /// Build a loader over an already-established session.
    pub fn with_session(config: AppConfig, session: S) -> Loader<S> {
        Loader {
            config,
            session,
            stats: ImportStats::default(),
            plan: TagPlan::default(),
            phase: LoadPhase::Disconnected,
            dry_run: false,
        }
    }

    /// Render and count batches without executing any mutation.
    pub fn with_dry_run(mut self, dry_run: bool) -> Loader<S> {
        self.dry_run = dry_run;
        self
    }

    /// Execute the full run. The session is released before returning, on
    /// success and failure alike, and the summary is printed either way.
    pub async fn run(mut self) -> Result<ImportStats, LoadError> {
        let outcome = self.run_inner().await;

        if outcome.is_err() {
            advance(&mut self.phase, LoadPhase::Failed);
        }
        if let Err(e) = self.session.disconnect().await {
            warn!("Releasing store session failed: {}", e);
        } else {
            info!("Store session released");
        }
        self.stats.print_summary(&self.plan);

        outcome.map(|()| self.stats)
    }

    async fn run_inner(&mut self) -> Result<(), LoadError> {
        info!("Starting GraphRAG import");
        let import_cfg = self.config.import.clone();
        let executor = Executor::new(
            &self.session,
            import_cfg.max_retries,
            import_cfg.retry_interval(),
        );

        let space = &self.config.nebula.space_name;
        executor
            .execute(&format!("USE {space}"))
            .await
            .map_err(|e| LoadError::Connection(format!("selecting space '{space}': {e}")))?;
        info!("Using space '{}'", space);
        advance(&mut self.phase, LoadPhase::Connected);

        let dataset = Dataset::load(
            &self.config.data.entities_file,
            &self.config.data.relationships_file,
        )?;
        advance(&mut self.phase, LoadPhase::DataLoaded);

        self.plan = TagPlan::discover(&dataset.entities);
        info!("Discovered {} entity tags", self.plan.len());
        ensure_tags(&executor, &self.plan).await?;
        advance(&mut self.phase, LoadPhase::SchemaReady);

        import_entities(
            &executor,
            &import_cfg,
            &dataset.entities,
            &mut self.stats,
            self.dry_run,
        )
        .await;
        advance(&mut self.phase, LoadPhase::EntitiesImported);

        import_relationships(
            &executor,
            &import_cfg,
            &dataset.relationships,
            &mut self.stats,
            self.dry_run,
        )
        .await;
        advance(&mut self.phase, LoadPhase::RelationshipsImported);

        if import_cfg.validate_data && !self.dry_run {
            validate_import(&self.session, &self.plan, &self.stats).await;
            advance(&mut self.phase, LoadPhase::Validated);
        }

        advance(&mut self.phase, LoadPhase::Done);
        info!("GraphRAG import finished");
        Ok(())
    }
}

fn advance(phase: &mut LoadPhase, next: LoadPhase) {
    debug!("Phase transition: {} -> {}", phase, next);
    *phase = next;
}

/// Import all entity rows, one tag at a time. Batch failures are recorded
/// and skipped; the import always runs to completion.
async fn import_entities<S: GraphSession>(
    executor: &Executor<'_, S>,
    config: &ImportConfig,
    rows: &[EntityRow],
    stats: &mut ImportStats,
    dry_run: bool,
) {
    let groups = group_by_tag(rows);
    info!(
        "Importing {} entities across {} tags (batch size: {})",
        rows.len(),
        groups.len(),
        config.batch_size
    );

    for (tag, tag_rows) in &groups {
        info!("Importing {} entities with tag '{}'", tag_rows.len(), tag);
        let mut done = 0usize;

        for batch in vertex_batches(tag, tag_rows, config.batch_size) {
            stats.add_entities_processed(batch.processed);
            done += batch.processed;

            let Some(statement) = &batch.statement else {
                debug!("Batch for tag '{}' had no rows with usable ids", tag);
                continue;
            };
            if batch.rendered < batch.processed {
                warn!(
                    "Dropped {} rows with empty ids from a '{}' batch",
                    batch.processed - batch.rendered,
                    tag
                );
            }

            let ok = if dry_run {
                debug!("Dry-run: skipping INSERT VERTEX batch for tag '{}'", tag);
                true
            } else {
                executor.execute_recorded(statement, stats).await
            };
            if ok {
                stats.add_entities_imported(batch.rendered);
            }

            if config.enable_progress {
                info!(
                    "Processed {}/{} entities for tag '{}'",
                    done,
                    tag_rows.len(),
                    tag
                );
            }
        }
    }

    info!(
        "Entity import complete: {} processed, {} imported",
        stats.entities_processed(),
        stats.entities_imported()
    );
}

/// Import all relationship rows as RELATED edges. Rows with a missing
/// endpoint count as processed but are never rendered or imported.
async fn import_relationships<S: GraphSession>(
    executor: &Executor<'_, S>,
    config: &ImportConfig,
    rows: &[RelationshipRow],
    stats: &mut ImportStats,
    dry_run: bool,
) {
    info!(
        "Importing {} relationships (batch size: {})",
        rows.len(),
        config.batch_size
    );
    let mut done = 0usize;

    for batch in edge_batches(rows, config.batch_size) {
        stats.add_relationships_processed(batch.processed);
        done += batch.processed;

        let Some(statement) = &batch.statement else {
            debug!("Relationship batch had no rows with both endpoints");
            continue;
        };
        if batch.rendered < batch.processed {
            warn!(
                "Dropped {} relationships with an empty endpoint from a batch",
                batch.processed - batch.rendered
            );
        }

        let ok = if dry_run {
            debug!("Dry-run: skipping INSERT EDGE batch");
            true
        } else {
            executor.execute_recorded(statement, stats).await
        };
        if ok {
            stats.add_relationships_imported(batch.rendered);
        }

        if config.enable_progress {
            info!("Processed {}/{} relationships", done, rows.len());
        }
    }

    info!(
        "Relationship import complete: {} processed, {} imported",
        stats.relationships_processed(),
        stats.relationships_imported()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_names() {
        assert_eq!(LoadPhase::Disconnected.as_str(), "disconnected");
        assert_eq!(LoadPhase::SchemaReady.to_string(), "schema_ready");
        assert_eq!(LoadPhase::Failed.to_string(), "failed");
    }
}
