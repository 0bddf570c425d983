//! Per-dataset property extractors.
//!
//! Every upstream dataset names its fields differently. The table below
//! maps each [`SpaceType`] to three pure functions reading `name`,
//! `location` and `url` out of that dataset's properties. Any of them may
//! return `None`.

use public_space_models::SpaceType;
use serde_json::{Map, Value};

/// Raw feature properties.
pub type Properties = Map<String, Value>;

type Extract = fn(&Properties) -> Option<String>;

/// The name/location/url extractors for one dataset.
#[derive(Debug, Clone, Copy)]
pub struct Extractor {
    pub name: Extract,
    pub location: Extract,
    pub url: Extract,
}

const PARK: Extractor = Extractor {
    name: |p| text(p, "signname"),
    location: |p| text(p, "address").map(|a| to_capital_case(&a)),
    url: |p| text(p, "url"),
};

const PLAZA: Extractor = Extractor {
    name: |p| text(p, "plazaname"),
    location: |p| {
        let on = text(p, "onstreet")?;
        let from = text(p, "fromstreet").unwrap_or_default();
        let to = text(p, "tostreet").unwrap_or_default();
        Some(format!("{on} between {from} & {to}"))
    },
    url: |_| None,
};

const POPS: Extractor = Extractor {
    name: |p| text(p, "bldg_name").or_else(|| pops_address(p)),
    location: |p| text(p, "bldg_name").and_then(|_| pops_address(p)),
    url: |p| text(p, "popsnumber").map(|n| format!("https://apops.mas.org/pops/{n}")),
};

const WPAA: Extractor = Extractor {
    name: |p| text(p, "WPAA_Name"),
    location: |p| text(p, "Intersect_"),
    url: |p| {
        text(p, "WPAA_ID")
            .map(|id| format!("https://waterfrontaccess.planning.nyc.gov/profiles/{id}"))
    },
};

const STP: Extractor = Extractor {
    name: |p| {
        Some(
            text(p, "address")
                .map_or_else(|| "Schoolyard Playground".to_string(), |a| to_capital_case(&a)),
        )
    },
    location: |p| text(p, "location"),
    url: |_| None,
};

const MISC: Extractor = Extractor {
    name: |p| text(p, "name"),
    location: |p| text(p, "location"),
    url: |p| text(p, "url"),
};

/// Returns the extractor for `space_type`.
#[must_use]
pub const fn extractor(space_type: SpaceType) -> &'static Extractor {
    match space_type {
        SpaceType::Park => &PARK,
        SpaceType::Plaza => &PLAZA,
        SpaceType::Pops => &POPS,
        SpaceType::Wpaa => &WPAA,
        SpaceType::Stp => &STP,
        SpaceType::Misc => &MISC,
    }
}

/// Reads `key` as non-empty text. Numbers are rendered as written.
fn text(props: &Properties, key: &str) -> Option<String> {
    match props.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// `"{add_number} {streetname}"`, capital-cased.
fn pops_address(props: &Properties) -> Option<String> {
    let number = text(props, "add_number").unwrap_or_default();
    let street = text(props, "streetname").unwrap_or_default();
    let address = format!("{number} {street}");
    let address = address.trim();

    if address.is_empty() {
        None
    } else {
        Some(to_capital_case(address))
    }
}

/// Upper-cases the first letter of every space-separated word and
/// lower-cases the rest. Runs of spaces are kept as they are.
#[must_use]
pub fn to_capital_case(s: &str) -> String {
    s.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}
