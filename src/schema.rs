//! Dynamic tag discovery and creation.
//!
//! The set of tags is data-driven: one per distinct sanitized entity type,
//! discovered at run time and never known at compile time. Tags are created
//! idempotently with a fixed column set before any row is inserted; a
//! creation failure aborts the run.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{info, warn};

use crate::client::GraphSession;
use crate::dataset::EntityRow;
use crate::error::LoadError;
use crate::executor::Executor;
use crate::ident::sanitize_label;

/// Vertex property columns, in insert order. Matches the entity row fields
/// minus `type`.
pub const VERTEX_COLUMNS: &str =
    "id, human_readable_id, title, description, text_unit_ids, frequency, degree, x, y";

/// Edge property columns for the single RELATED edge type.
pub const EDGE_COLUMNS: &str =
    "id, human_readable_id, description, weight, combined_degree, text_unit_ids";

/// One tag's source labels and expected (pre-filter) row count.
#[derive(Debug, Clone, Default)]
pub struct TagGroup {
    /// Distinct source labels that sanitize to this tag. More than one
    /// means a sanitization collision; those rows merge under one tag.
    pub labels: Vec<String>,
    /// Rows carrying any of these labels, before id filtering. Used for
    /// post-load reconciliation.
    pub expected: u64,
}

/// Runtime map from sanitized tag name to its source labels and expected
/// row count. Built once per run, immutable afterwards.
#[derive(Debug, Clone, Default)]
pub struct TagPlan {
    tags: BTreeMap<String, TagGroup>,
}

impl TagPlan {
    /// Discover the distinct tags in the entity row set. Rows with a blank
    /// or unsanitizable type belong to no tag. Collisions between distinct
    /// labels are merged, with a warning.
    pub fn discover(rows: &[EntityRow]) -> TagPlan {
        let mut tags: BTreeMap<String, TagGroup> = BTreeMap::new();
        let mut skipped: BTreeSet<String> = BTreeSet::new();

        for row in rows {
            let Some(tag) = sanitize_label(&row.entity_type) else {
                if !row.entity_type.is_empty() {
                    skipped.insert(row.entity_type.clone());
                }
                continue;
            };
            let group = tags.entry(tag).or_default();
            if !group.labels.contains(&row.entity_type) {
                group.labels.push(row.entity_type.clone());
            }
            group.expected += 1;
        }

        for label in &skipped {
            warn!("Skipping entity type '{}': nothing usable in the label", label);
        }
        for (tag, group) in &tags {
            if group.labels.len() > 1 {
                warn!(
                    "Entity types {:?} all sanitize to tag '{}'; their rows will be merged",
                    group.labels, tag
                );
            }
        }

        TagPlan { tags }
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.tags.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TagGroup)> {
        self.tags.iter().map(|(tag, group)| (tag.as_str(), group))
    }

    pub fn expected(&self, tag: &str) -> Option<u64> {
        self.tags.get(tag).map(|group| group.expected)
    }
}

/// Render the idempotent DDL statement for one tag.
pub fn create_tag_statement(tag: &str) -> String {
    format!(
        "CREATE TAG IF NOT EXISTS {tag}(\
         id string, \
         human_readable_id string, \
         title string, \
         description string, \
         text_unit_ids string, \
         frequency int, \
         degree int, \
         x double, \
         y double)"
    )
}

/// Create every discovered tag, strictly before any insert. Any failure is
/// fatal; tags already created stay in place (no rollback).
pub async fn ensure_tags<S: GraphSession>(
    executor: &Executor<'_, S>,
    plan: &TagPlan,
) -> Result<(), LoadError> {
    info!("Ensuring {} tags exist", plan.len());
    for tag in plan.tags() {
        executor
            .execute(&create_tag_statement(tag))
            .await
            .map_err(|e| LoadError::Schema(format!("creating tag '{tag}': {e}")))?;
        info!("Tag '{}' ready ({} rows expected)", tag, plan.expected(tag).unwrap_or(0));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(entity_type: &str) -> EntityRow {
        EntityRow {
            id: "e".to_string(),
            entity_type: entity_type.to_string(),
            ..EntityRow::default()
        }
    }

    #[test]
    fn test_discover_counts_rows_per_tag() {
        let rows = vec![
            entity("Person"),
            entity("Person"),
            entity("Event-Type A"),
            entity(""),
            entity("!!!"),
        ];
        let plan = TagPlan::discover(&rows);

        assert_eq!(plan.len(), 2);
        assert_eq!(plan.expected("PERSON"), Some(2));
        assert_eq!(plan.expected("EVENT_TYPE_A"), Some(1));
        assert_eq!(plan.expected("UNKNOWN"), None);
    }

    #[test]
    fn test_colliding_labels_merge_under_one_tag() {
        let rows = vec![entity("event type"), entity("EVENT-TYPE"), entity("event_type")];
        let plan = TagPlan::discover(&rows);

        assert_eq!(plan.len(), 1);
        assert_eq!(plan.expected("EVENT_TYPE"), Some(3));
        let (_, group) = plan.iter().next().unwrap();
        assert_eq!(group.labels.len(), 3);
    }

    #[test]
    fn test_create_tag_statement_has_fixed_columns() {
        let stmt = create_tag_statement("PERSON");
        assert!(stmt.starts_with("CREATE TAG IF NOT EXISTS PERSON("));
        assert!(stmt.contains("frequency int"));
        assert!(stmt.contains("x double"));
        assert!(stmt.contains("text_unit_ids string"));
    }

    #[test]
    fn test_same_label_same_tag_across_runs() {
        let first = TagPlan::discover(&[entity("Event-Type A")]);
        let second = TagPlan::discover(&[entity("Event-Type A")]);
        assert_eq!(
            first.tags().collect::<Vec<_>>(),
            second.tags().collect::<Vec<_>>()
        );
        assert_eq!(first.tags().next(), Some("EVENT_TYPE_A"));
    }
}
