#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Spatial joins over canonical spaces.
//!
//! * [`borough`]: compares the borough a record mentions in its text with
//!   the borough polygon that actually contains its point.
//! * [`reference`]: names records after their nearest reference feature
//!   (schools for the schoolyards program).
//!
//! Both joins only read their reference sets, which are loaded once per
//! run before any record is processed.

pub mod borough;
pub mod reference;

pub use borough::{BoroughCheckStage, BoroughChecker, BoroughMismatch, mentioned_borough};
pub use reference::{ReferenceFeature, ReferenceSet, SchoolyardEnricher};
