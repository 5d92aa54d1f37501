//! Search registry — the set of active named searches and their lifecycle.
//!
//! Every mutation happens through a method on [`SearchRegistry`]; after a
//! mutation the driver drains newly pending entries with [`take_pending`],
//! feeds fetch completions back through [`resolve`], and derives the
//! loaded/loading emission with [`snapshot`]. Stale completions (the entry
//! was deleted or edited while its fetch was in flight) are detected by a
//! text + state re-check and dropped.
//!
//! [`take_pending`]: SearchRegistry::take_pending
//! [`resolve`]: SearchRegistry::resolve
//! [`snapshot`]: SearchRegistry::snapshot

use common::{LoadedSeries, WeightSeries};
use serde::Serialize;
use tracing::debug;

use crate::palette::Palette;
use crate::params;

/// Opaque identity of a registry entry. Stable across text edits and
/// reordering; never reused within a registry's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct EntryId(u64);

/// Stored resolution state of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchState {
    /// Created, not yet handed to the resolver.
    Init,
    /// Fetch dispatched, completion pending.
    Loading,
    Loaded,
    Error,
}

/// What a view should show for an entry. Derived, never stored: an entry
/// open for edit displays as editing, and `Init` displays as loading
/// because dispatch is imminent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayState {
    Loading,
    Loaded,
    Error,
    Editing,
}

/// Which entry the edit affordance is open for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTarget {
    /// A new entry is being composed.
    New,
    /// An existing entry's text is being rewritten.
    Entry(EntryId),
}

/// Result of a submit call. Invalid submissions are rejected silently;
/// the caller only needs to know whether the text set changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// A new entry was appended.
    Added(EntryId),
    /// An existing entry was rewritten in place.
    Updated(EntryId),
    /// Empty text, duplicate text, unknown target, or registry full.
    Rejected,
}

impl SubmitOutcome {
    /// Whether the active text set changed.
    pub fn is_change(self) -> bool {
        !matches!(self, SubmitOutcome::Rejected)
    }
}

/// One active search and its resolution lifecycle.
#[derive(Debug, Clone, Serialize)]
pub struct SearchEntry {
    pub id: EntryId,
    /// Trimmed, non-empty, unique among active entries.
    pub text: String,
    /// Unique among active entries while both are active. Display only.
    pub color: String,
    pub state: SearchState,
    /// Resolved payload; `None` until loaded, cleared again on edit.
    #[serde(skip)]
    pub series: Option<WeightSeries>,
}

/// The loaded/loading emission derived after every registry transition.
#[derive(Debug, Clone, Default)]
pub struct RegistrySnapshot {
    /// Fully loaded series, each annotated with its entry's text and color.
    pub loaded: Vec<LoadedSeries>,
    /// Entries still awaiting resolution (`Init` counts — dispatch is
    /// imminent even though the fetch has not started).
    pub loading: usize,
}

/// Registry of active searches. At most `palette.max_entries()` entries;
/// no two share a text, no two share a color.
#[derive(Debug)]
pub struct SearchRegistry {
    entries: Vec<SearchEntry>,
    palette: Palette,
    editing: Option<EditTarget>,
    next_id: u64,
}

impl SearchRegistry {
    pub fn new(palette: Palette) -> Self {
        Self {
            entries: Vec::new(),
            palette,
            editing: None,
            next_id: 0,
        }
    }

    /// Initialize from a query string: texts are trimmed, deduplicated,
    /// truncated to the palette size, each starting `Init` with the next
    /// session color.
    pub fn from_query(query: &str, palette: Palette) -> Self {
        let mut registry = Self::new(palette);
        let mut texts = params::parse_texts(query);
        texts.truncate(registry.palette.max_entries());

        for (i, text) in texts.into_iter().enumerate() {
            let color = match registry.palette.color(i) {
                Some(c) => c.to_string(),
                None => break,
            };
            let id = registry.alloc_id();
            registry.entries.push(SearchEntry {
                id,
                text,
                color,
                state: SearchState::Init,
                series: None,
            });
        }
        registry
    }

    fn alloc_id(&mut self) -> EntryId {
        let id = EntryId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn entries(&self) -> &[SearchEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_entries(&self) -> usize {
        self.palette.max_entries()
    }

    /// Active texts in entry order.
    pub fn texts(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.text.clone()).collect()
    }

    // ── Submit / delete / edit ────────────────────────────────────────

    /// Submit `text` as a new entry (`target = None`) or as the new text
    /// of an existing one. Closes the edit affordance either way.
    pub fn submit(&mut self, text: &str, target: Option<EntryId>) -> SubmitOutcome {
        self.editing = None;

        // 1. Trim; empty submissions are dropped.
        let text = text.trim();
        if text.is_empty() {
            return SubmitOutcome::Rejected;
        }

        // 2. Duplicate text never enters the registry. This also covers
        //    editing an entry to its current text (no change, no bump).
        if self.entries.iter().any(|e| e.text == text) {
            return SubmitOutcome::Rejected;
        }

        match target {
            // 3a. Append with the first unused palette color.
            None => {
                let color = {
                    let used: Vec<&str> =
                        self.entries.iter().map(|e| e.color.as_str()).collect();
                    match self.palette.first_unused(&used) {
                        Some(c) => c.to_string(),
                        None => {
                            debug!("submit rejected, registry full: {text:?}");
                            return SubmitOutcome::Rejected;
                        }
                    }
                };
                let id = self.alloc_id();
                self.entries.push(SearchEntry {
                    id,
                    text: text.to_string(),
                    color,
                    state: SearchState::Init,
                    series: None,
                });
                SubmitOutcome::Added(id)
            }
            // 3b. Rewrite in place: reset lifecycle, keep id and color.
            Some(id) => {
                let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) else {
                    return SubmitOutcome::Rejected;
                };
                entry.text = text.to_string();
                entry.state = SearchState::Init;
                entry.series = None;
                SubmitOutcome::Updated(id)
            }
        }
    }

    /// Remove the entry with the given id. Unknown ids are a no-op.
    pub fn delete(&mut self, id: EntryId) -> bool {
        self.editing = None;
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    /// Open the edit affordance for an existing entry or for a new one.
    pub fn begin_edit(&mut self, target: Option<EntryId>) {
        self.editing = match target {
            None => Some(EditTarget::New),
            Some(id) if self.entries.iter().any(|e| e.id == id) => {
                Some(EditTarget::Entry(id))
            }
            Some(_) => None,
        };
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    pub fn editing(&self) -> Option<EditTarget> {
        self.editing
    }

    /// Current text of the entry the edit affordance is open for, if any.
    pub fn edit_text(&self) -> Option<&str> {
        match self.editing {
            Some(EditTarget::Entry(id)) => self
                .entries
                .iter()
                .find(|e| e.id == id)
                .map(|e| e.text.as_str()),
            Some(EditTarget::New) => Some(""),
            None => None,
        }
    }

    /// What a view should show for `entry` right now.
    pub fn display_state(&self, entry: &SearchEntry) -> DisplayState {
        if self.editing == Some(EditTarget::Entry(entry.id)) {
            return DisplayState::Editing;
        }
        match entry.state {
            SearchState::Init | SearchState::Loading => DisplayState::Loading,
            SearchState::Loaded => DisplayState::Loaded,
            SearchState::Error => DisplayState::Error,
        }
    }

    // ── Resolution ───────────────────────────────────────────────────

    /// Drain entries awaiting dispatch: every `Init` entry flips to
    /// `Loading` and is returned exactly once. Call after each mutation.
    pub fn take_pending(&mut self) -> Vec<(EntryId, String)> {
        let mut pending = Vec::new();
        for entry in &mut self.entries {
            if entry.state == SearchState::Init {
                entry.state = SearchState::Loading;
                pending.push((entry.id, entry.text.clone()));
            }
        }
        pending
    }

    /// Apply a fetch completion for `text`. `Some` resolves to `Loaded`,
    /// `None` (failure or no result) to `Error`. The completion is applied
    /// only if an entry with that text still exists and is still
    /// `Loading` — otherwise the result is stale and dropped.
    pub fn resolve(&mut self, text: &str, series: Option<WeightSeries>) -> bool {
        match self
            .entries
            .iter_mut()
            .find(|e| e.text == text && e.state == SearchState::Loading)
        {
            Some(entry) => {
                entry.state = if series.is_some() {
                    SearchState::Loaded
                } else {
                    SearchState::Error
                };
                entry.series = series;
                true
            }
            None => {
                debug!("dropping stale resolution for {text:?}");
                false
            }
        }
    }

    /// Derive the loaded/loading emission. Explicit pass invoked after
    /// every transition, replacing any scheduler-deferred re-emission.
    pub fn snapshot(&self) -> RegistrySnapshot {
        let loaded = self
            .entries
            .iter()
            .filter(|e| e.state == SearchState::Loaded)
            .filter_map(|e| {
                e.series.as_ref().map(|series| LoadedSeries {
                    text: e.text.clone(),
                    color: e.color.clone(),
                    series: series.clone(),
                })
            })
            .collect();
        let loading = self
            .entries
            .iter()
            .filter(|e| matches!(e.state, SearchState::Init | SearchState::Loading))
            .count();
        RegistrySnapshot { loaded, loading }
    }

    // ── Query string ─────────────────────────────────────────────────

    /// The sorted query string for the current text set.
    pub fn query_string(&self) -> String {
        params::encode_texts(&self.texts())
    }

    /// Rewrite `current` to match the active texts; `None` when it
    /// already does.
    pub fn sync_query(&self, current: &str) -> Option<String> {
        params::sync_query(current, &self.texts())
    }
}
