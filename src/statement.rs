//! Bulk mutation statement rendering.
//!
//! Rows are grouped and sliced into contiguous, order-preserving batches;
//! each batch renders to one bulk INSERT statement. Rendering is driven one
//! batch at a time by the caller, so at most one batch's worth of statement
//! text is ever materialized.

use std::collections::BTreeMap;

use crate::dataset::{EntityRow, RelationshipRow};
use crate::ident::sanitize_label;
use crate::schema::{EDGE_COLUMNS, VERTEX_COLUMNS};
use crate::value::{float_literal, int_literal, string_literal};

/// Group entity rows by sanitized tag, preserving source order within each
/// group. Rows with a blank or unsanitizable type are excluded from every
/// group and take no part in the import.
pub fn group_by_tag(rows: &[EntityRow]) -> BTreeMap<String, Vec<&EntityRow>> {
    let mut groups: BTreeMap<String, Vec<&EntityRow>> = BTreeMap::new();
    for row in rows {
        if let Some(tag) = sanitize_label(&row.entity_type) {
            groups.entry(tag).or_default().push(row);
        }
    }
    groups
}

/// Render one batch of entity rows into a bulk INSERT VERTEX statement.
///
/// Rows with an empty id are dropped from the statement (an empty vertex
/// key is never written). Returns the statement and the number of rows it
/// carries, or `None` when no row in the batch is usable.
pub fn render_vertex_batch(tag: &str, rows: &[&EntityRow]) -> Option<(String, usize)> {
    let mut values = Vec::with_capacity(rows.len());
    for row in rows {
        if row.id.is_empty() {
            continue;
        }
        values.push(format!(
            "{}: ({}, {}, {}, {}, {}, {}, {}, {}, {})",
            string_literal(&row.id),
            string_literal(&row.id),
            string_literal(&row.human_readable_id),
            string_literal(&row.title),
            string_literal(&row.description),
            string_literal(&row.text_unit_ids),
            int_literal(row.frequency),
            int_literal(row.degree),
            float_literal(row.x),
            float_literal(row.y),
        ));
    }

    if values.is_empty() {
        return None;
    }
    let count = values.len();
    Some((
        format!(
            "INSERT VERTEX {tag}({VERTEX_COLUMNS}) VALUES {}",
            values.join(", ")
        ),
        count,
    ))
}

/// Render one batch of relationship rows into a bulk INSERT EDGE statement.
///
/// Rows with an empty source or target are dropped from the statement (they
/// still count as processed at the call site). Returns `None` when the
/// batch has no valid rows left.
pub fn render_edge_batch(rows: &[RelationshipRow]) -> Option<(String, usize)> {
    let mut values = Vec::with_capacity(rows.len());
    for row in rows {
        if row.source.is_empty() || row.target.is_empty() {
            continue;
        }
        values.push(format!(
            "{} -> {}: ({}, {}, {}, {}, {}, {})",
            string_literal(&row.source),
            string_literal(&row.target),
            string_literal(&row.id),
            string_literal(&row.human_readable_id),
            string_literal(&row.description),
            float_literal(row.weight),
            int_literal(row.combined_degree),
            string_literal(&row.text_unit_ids),
        ));
    }

    if values.is_empty() {
        return None;
    }
    let count = values.len();
    Some((
        format!(
            "INSERT EDGE RELATED({EDGE_COLUMNS}) VALUES {}",
            values.join(", ")
        ),
        count,
    ))
}

/// One rendered batch, produced lazily by [`vertex_batches`] or
/// [`edge_batches`]. `statement` is `None` when no row in the chunk was
/// usable; `processed` still reports the full chunk size so callers can
/// account for every source row.
pub struct RenderedBatch {
    pub statement: Option<String>,
    pub processed: usize,
    pub rendered: usize,
}

/// Lazy sequence of vertex batches for one tag's rows. At most one batch
/// is materialized at a time.
pub fn vertex_batches<'a>(
    tag: &'a str,
    rows: &'a [&'a EntityRow],
    batch_size: usize,
) -> impl Iterator<Item = RenderedBatch> + 'a {
    rows.chunks(batch_size)
        .map(move |chunk| match render_vertex_batch(tag, chunk) {
            Some((stmt, rendered)) => RenderedBatch {
                statement: Some(stmt),
                processed: chunk.len(),
                rendered,
            },
            None => RenderedBatch {
                statement: None,
                processed: chunk.len(),
                rendered: 0,
            },
        })
}

/// Lazy sequence of edge batches over the full relationship set.
pub fn edge_batches(
    rows: &[RelationshipRow],
    batch_size: usize,
) -> impl Iterator<Item = RenderedBatch> + '_ {
    rows.chunks(batch_size)
        .map(|chunk| match render_edge_batch(chunk) {
            Some((stmt, rendered)) => RenderedBatch {
                statement: Some(stmt),
                processed: chunk.len(),
                rendered,
            },
            None => RenderedBatch {
                statement: None,
                processed: chunk.len(),
                rendered: 0,
            },
        })
}
