//! Collision-free slug allocation.

use std::collections::BTreeSet;

use crate::slugify;

/// Fallback base used when a name produces an empty slug.
const EMPTY_BASE: &str = "space";

/// Hands out unique slugs within one batch.
///
/// The first request for a base gets the base itself; later requests get
/// `-2`, `-3`, and so on. Identifiers that already exist elsewhere can be
/// reserved up front so they are never handed out.
#[derive(Debug, Default, Clone)]
pub struct SlugAllocator {
    taken: BTreeSet<String>,
}

impl SlugAllocator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks existing identifiers as unavailable.
    pub fn reserve<I, S>(&mut self, existing: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.taken.extend(existing.into_iter().map(Into::into));
    }

    /// Whether `slug` has already been handed out or reserved.
    #[must_use]
    pub fn is_taken(&self, slug: &str) -> bool {
        self.taken.contains(slug)
    }

    /// Slugifies `text` and returns a slug not yet handed out.
    pub fn allocate(&mut self, text: &str) -> String {
        let base = slugify(text);
        let base = if base.is_empty() {
            EMPTY_BASE.to_string()
        } else {
            base
        };

        if self.taken.insert(base.clone()) {
            return base;
        }

        let mut n = 2u32;
        loop {
            let candidate = format!("{base}-{n}");
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}
