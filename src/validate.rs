//! Post-load reconciliation.
//!
//! Compares per-tag and edge counts in the store against what the loader
//! expected to import. Purely advisory: mismatches and query failures are
//! logged, never raised, so validation cannot fail a run.

use tracing::{error, info, warn};

use crate::client::GraphSession;
use crate::schema::TagPlan;
use crate::stats::ImportStats;

/// Render the count query for one tag.
pub fn count_vertices_statement(tag: &str) -> String {
    format!("MATCH (v:{tag}) RETURN count(v) AS count")
}

/// Render the count query for the RELATED edge type.
pub fn count_edges_statement() -> String {
    "MATCH ()-[e:RELATED]->() RETURN count(e) AS count".to_string()
}

/// Reconcile stored counts against expectations. Returns the number of
/// mismatches found, for reporting only.
pub async fn validate_import<S: GraphSession>(
    session: &S,
    plan: &TagPlan,
    stats: &ImportStats,
) -> u64 {
    info!("Validating imported data");
    let mut mismatches = 0;

    for (tag, group) in plan.iter() {
        match fetch_count(session, &count_vertices_statement(tag)).await {
            Ok(actual) => {
                info!("Tag {}: expected {}, stored {}", tag, group.expected, actual);
                if actual != group.expected as i64 {
                    warn!(
                        "Tag {} count mismatch: expected {}, stored {}",
                        tag, group.expected, actual
                    );
                    mismatches += 1;
                }
            }
            Err(e) => error!("Validating tag {} failed: {}", tag, e),
        }
    }

    let expected_edges = stats.relationships_imported();
    match fetch_count(session, &count_edges_statement()).await {
        Ok(actual) => {
            info!("Edge RELATED: expected {}, stored {}", expected_edges, actual);
            if actual != expected_edges as i64 {
                warn!(
                    "Edge RELATED count mismatch: expected {}, stored {}",
                    expected_edges, actual
                );
                mismatches += 1;
            }
        }
        Err(e) => error!("Validating edges failed: {}", e),
    }

    info!("Validation complete ({} mismatches)", mismatches);
    mismatches
}

async fn fetch_count<S: GraphSession>(session: &S, statement: &str) -> Result<i64, String> {
    let outcome = session.execute(statement).await.map_err(|e| e.to_string())?;
    if !outcome.is_succeeded() {
        return Err(format!("code {}: {}", outcome.code, outcome.message));
    }
    outcome
        .first_count()
        .ok_or_else(|| "count query returned no rows".to_string())
}
