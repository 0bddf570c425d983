//! Reporting on stored identifiers.
//!
//! Review is read-only: corrections are applied by the store, one
//! document at a time, after a human has confirmed them.

use std::collections::BTreeMap;

use crate::{is_loose_slug, slugify};

/// A stored identifier that fails the loose check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlugIssue {
    /// Store key of the offending document.
    pub document_id: String,
    /// The identifier as stored (empty when missing).
    pub current: String,
    /// Canonical replacement; empty if nothing slug-able remains.
    pub suggested: String,
}

/// An identifier shared by more than one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlugCollision {
    pub space_id: String,
    /// Document keys holding this identifier, in input order.
    pub document_ids: Vec<String>,
}

/// Checks every `(document_id, space_id)` pair against the loose slug form.
///
/// Returns one issue per failing pair, in input order, each carrying the
/// output of [`slugify`] as a suggestion.
pub fn review_slugs<'a, I>(entries: I) -> Vec<SlugIssue>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    entries
        .into_iter()
        .filter(|(_, space_id)| !is_loose_slug(space_id))
        .map(|(document_id, space_id)| SlugIssue {
            document_id: document_id.to_string(),
            current: space_id.to_string(),
            suggested: slugify(space_id),
        })
        .collect()
}

/// Finds identifiers used by more than one document.
///
/// Results are sorted by identifier. Empty identifiers are ignored.
pub fn find_collisions<'a, I>(entries: I) -> Vec<SlugCollision>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut by_id: BTreeMap<&str, Vec<String>> = BTreeMap::new();

    for (document_id, space_id) in entries {
        if space_id.is_empty() {
            continue;
        }
        by_id
            .entry(space_id)
            .or_default()
            .push(document_id.to_string());
    }

    by_id
        .into_iter()
        .filter(|(_, docs)| docs.len() > 1)
        .map(|(space_id, document_ids)| SlugCollision {
            space_id: space_id.to_string(),
            document_ids,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_only_failing_ids() {
        let entries = [
            ("doc1", "bryant-park"),
            ("doc2", "Bryant Park"),
            ("doc3", "-legacy--ok-"),
            ("doc4", ""),
        ];
        let issues = review_slugs(entries);

        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].document_id, "doc2");
        assert_eq!(issues[0].suggested, "bryant-park");
        assert_eq!(issues[1].document_id, "doc4");
        assert_eq!(issues[1].suggested, "");
    }

    #[test]
    fn finds_shared_ids() {
        let entries = [
            ("a", "park-one"),
            ("b", "park-two"),
            ("c", "park-one"),
            ("d", ""),
            ("e", ""),
        ];
        let collisions = find_collisions(entries);

        assert_eq!(
            collisions,
            vec![SlugCollision {
                space_id: "park-one".to_string(),
                document_ids: vec!["a".to_string(), "c".to_string()],
            }]
        );
    }
}
