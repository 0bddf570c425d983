#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Space identifier validation and canonicalization.
//!
//! Two predicates are exposed on purpose: legacy identifiers are reviewed
//! against the loose form ([`is_loose_slug`]) while every identifier the
//! pipeline generates satisfies the strict kebab form ([`is_strict_slug`]).
//! Nothing here corrects stored identifiers; [`review`] only reports
//! problems together with a suggested replacement.

pub mod allocate;
pub mod review;

use std::sync::LazyLock;

use public_space_models::SpaceType;
use regex::Regex;
use unicode_normalization::UnicodeNormalization as _;
use unicode_normalization::char::is_combining_mark;

pub use allocate::SlugAllocator;
pub use review::{SlugCollision, SlugIssue, find_collisions, review_slugs};

/// Lowercase alphanumerics and hyphens in any arrangement.
static LOOSE_SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9\-]+$").expect("valid regex"));

/// Kebab case: alphanumeric words joined by single hyphens.
static STRICT_SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)*$").expect("valid regex"));

/// Runs of anything that cannot appear in a slug.
static NON_SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("valid regex"));

/// Repeated hyphens.
static REPEATED_HYPHEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-{2,}").expect("valid regex"));

/// Returns `true` if `s` uses only lowercase letters, digits and hyphens.
///
/// Accepts leading, trailing and doubled hyphens.
#[must_use]
pub fn is_loose_slug(s: &str) -> bool {
    LOOSE_SLUG_RE.is_match(s)
}

/// Returns `true` if `s` is kebab case (`^[a-z0-9]+(-[a-z0-9]+)*$`).
#[must_use]
pub fn is_strict_slug(s: &str) -> bool {
    STRICT_SLUG_RE.is_match(s)
}

/// Converts arbitrary text into a strict slug.
///
/// The pipeline:
/// 1. Lowercase
/// 2. Decompose (NFD) and drop combining marks, so `é` becomes `e`
/// 3. Replace runs of non-alphanumerics with a single hyphen
/// 4. Trim hyphens from both ends
/// 5. Collapse repeated hyphens
///
/// The result is either empty or satisfies [`is_strict_slug`], and
/// `slugify(slugify(s)) == slugify(s)`.
#[must_use]
pub fn slugify(s: &str) -> String {
    let stripped: String = s
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect();

    let hyphenated = NON_SLUG_RE.replace_all(&stripped, "-");
    let trimmed = hyphenated.trim_matches('-');
    REPEATED_HYPHEN_RE.replace_all(trimmed, "-").into_owned()
}

/// Suggests a fresh identifier for a space from its type and name.
///
/// Falls back to the bare type when the name has no slug-able characters.
#[must_use]
pub fn suggest_space_id(space_type: SpaceType, name: &str) -> String {
    slugify(&format!("{space_type} {name}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: &[&str] = &[
        "",
        "---",
        "Bryant Park",
        "  Hudson River Park  ",
        "Café Olé",
        "Père Marquette Plaza",
        "P.S. 123 / Mahalia Jackson",
        "already-a-slug",
        "-leading-and-trailing-",
        "double--hyphen",
        "UPPER_snake_Case",
        "Søren's Garden",
        "Straße 12",
        "日本庭園",
        "ÅNGSTRÖM",
        "tab\tand\nnewline",
        "1234",
        "a--b--c",
    ];

    #[test]
    fn slugify_is_idempotent() {
        for s in SAMPLES {
            let once = slugify(s);
            assert_eq!(slugify(&once), once, "not idempotent for {s:?}");
        }
    }

    #[test]
    fn slugify_output_is_strict_or_empty() {
        for s in SAMPLES {
            let slug = slugify(s);
            assert!(
                slug.is_empty() || is_strict_slug(&slug),
                "{s:?} produced non-strict {slug:?}"
            );
        }
    }

    #[test]
    fn slugify_strips_diacritics() {
        assert_eq!(slugify("Café Olé"), "cafe-ole");
        assert_eq!(slugify("Père Marquette Plaza"), "pere-marquette-plaza");
        assert_eq!(slugify("ÅNGSTRÖM"), "angstrom");
    }

    #[test]
    fn slugify_collapses_and_trims() {
        assert_eq!(slugify("  Hudson River Park  "), "hudson-river-park");
        assert_eq!(slugify("P.S. 123 / Mahalia Jackson"), "p-s-123-mahalia-jackson");
        assert_eq!(slugify("-leading-and-trailing-"), "leading-and-trailing");
        assert_eq!(slugify("a--b--c"), "a-b-c");
        assert_eq!(slugify("日本庭園"), "");
    }

    #[test]
    fn loose_and_strict_differ() {
        assert!(is_loose_slug("-legacy--id-"));
        assert!(!is_strict_slug("-legacy--id-"));
        assert!(is_loose_slug("park-bryant-park"));
        assert!(is_strict_slug("park-bryant-park"));
        assert!(!is_loose_slug("Bryant Park"));
        assert!(!is_loose_slug(""));
        assert!(!is_strict_slug(""));
    }

    #[test]
    fn suggests_ids_from_type_and_name() {
        assert_eq!(
            suggest_space_id(SpaceType::Pops, "590 Madison Avenue"),
            "pops-590-madison-avenue"
        );
        assert_eq!(suggest_space_id(SpaceType::Stp, "???"), "stp");
    }
}
