//! Search registry crate.
//!
//! Holds the set of active named searches, their resolution lifecycle,
//! color assignment, and the query-string round-trip.

pub mod palette;
pub mod params;
pub mod registry;

pub use palette::Palette;
pub use registry::{
    DisplayState, EditTarget, EntryId, RegistrySnapshot, SearchEntry, SearchRegistry, SearchState,
    SubmitOutcome,
};
