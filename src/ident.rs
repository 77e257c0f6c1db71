//! Entity-type label sanitization.
//!
//! GraphRAG entity types are free text; NebulaGraph tag names are not.
//! [`sanitize_label`] maps a label to a valid tag name, or `None` when the
//! label has nothing usable in it and the category must be skipped.

/// Sanitize a free-text entity-type label into a valid tag name.
///
/// Uppercases the label, turns spaces and hyphens into underscores, then
/// drops every remaining character that is not alphanumeric or underscore.
/// Returns `None` when nothing survives.
///
/// Two distinct labels may sanitize to the same tag name; callers decide
/// how to treat that (schema sync logs a collision warning and merges).
pub fn sanitize_label(label: &str) -> Option<String> {
    let cleaned: String = label
        .to_uppercase()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect();

    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_labels() {
        assert_eq!(sanitize_label("Person"), Some("PERSON".to_string()));
        assert_eq!(sanitize_label("Event-Type A"), Some("EVENT_TYPE_A".to_string()));
        assert_eq!(sanitize_label("geo location"), Some("GEO_LOCATION".to_string()));
    }

    #[test]
    fn test_empty_and_punctuation_only_labels_are_skipped() {
        assert_eq!(sanitize_label(""), None);
        assert_eq!(sanitize_label("   "), Some("___".to_string()));
        assert_eq!(sanitize_label("!!!"), None);
        assert_eq!(sanitize_label("??.,;"), None);
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        for label in ["Person", "Event-Type A", "a b-c!d", "ORGANIZATION"] {
            let once = sanitize_label(label).unwrap();
            assert_eq!(sanitize_label(&once), Some(once.clone()));
        }
    }

    #[test]
    fn test_sanitize_is_stable_across_calls() {
        // Same label must produce the same tag name every time, including
        // across separate loader runs.
        assert_eq!(sanitize_label("Event-Type A"), sanitize_label("Event-Type A"));
        assert_eq!(sanitize_label("Event-Type A"), Some("EVENT_TYPE_A".to_string()));
    }

    #[test]
    fn test_distinct_labels_can_collide() {
        assert_eq!(sanitize_label("event type"), sanitize_label("EVENT-TYPE"));
    }
}
