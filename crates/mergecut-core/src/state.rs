// crates/mergecut-core/src/state.rs
//
// Pure project data — no egui, no audio handles.
// Serializable via serde. Used by both mergecut-ui and mergecut-media consumers.

use std::path::PathBuf;
use uuid::Uuid;
use serde::{Deserialize, Serialize};

/// Where a new pause lands relative to the item the user right-clicked.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InsertPosition {
    Above,
    Below,
}

/// Default length for a freshly inserted pause, in seconds.
pub const DEFAULT_PAUSE_SECS: f64 = 1.0;

/// An imported audio file on the timeline.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AudioItem {
    pub id:       Uuid,
    pub path:     PathBuf,
    pub name:     String,
    /// Cached playable length in seconds. 0 until the probe returns.
    pub duration: f64,
}

/// A silent gap on the timeline. Duration is user-editable, never negative.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PauseItem {
    pub id:       Uuid,
    pub duration: f64,
}

/// One entry in the playback order — either sound or silence.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum TimelineItem {
    Audio(AudioItem),
    Pause(PauseItem),
}

impl TimelineItem {
    pub fn id(&self) -> Uuid {
        match self {
            TimelineItem::Audio(a) => a.id,
            TimelineItem::Pause(p) => p.id,
        }
    }

    pub fn duration(&self) -> f64 {
        match self {
            TimelineItem::Audio(a) => a.duration,
            TimelineItem::Pause(p) => p.duration,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProjectState {
    /// Ordered items — list order IS the playback order.
    /// Mutate only through the methods below so `version` stays honest.
    timeline: Vec<TimelineItem>,

    /// Bumped by every mutating list operation. The merge engine compares its
    /// last-rendered version against this; a mismatch means the merged buffer
    /// is stale. Private so no edit path can forget to bump it.
    #[serde(skip)]
    version: u64,

    pub selected_item: Option<Uuid>,

    /// Blocking user-visible failure (decode abort, no audio output).
    /// Shown as a banner until dismissed. Runtime-only.
    #[serde(skip)]
    pub error_banner: Option<String>,

    /// True while a merge render is in flight on the worker.
    #[serde(skip)]
    pub merge_in_flight: bool,

    /// Paths imported this frame, waiting for the worker to probe durations.
    #[serde(skip)]
    pub pending_probes: Vec<(Uuid, PathBuf)>,
}

impl Default for ProjectState {
    fn default() -> Self {
        Self {
            timeline:        Vec::new(),
            version:         0,
            selected_item:   None,
            error_banner:    None,
            merge_in_flight: false,
            pending_probes:  Vec::new(),
        }
    }
}

impl ProjectState {
    pub fn items(&self) -> &[TimelineItem] {
        &self.timeline
    }

    /// Current structural version of the timeline. Monotonically increasing;
    /// equal versions imply an identical item list (the converse does not hold
    /// — a duplicate-then-delete that restores the list still bumps twice, so
    /// cached renders are invalidated structurally, never by list comparison).
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Sum of every item's duration in list order.
    pub fn total_duration(&self) -> f64 {
        self.timeline.iter().map(|i| i.duration()).sum()
    }

    pub fn has_audio(&self) -> bool {
        self.timeline.iter().any(|i| matches!(i, TimelineItem::Audio(_)))
    }

    pub fn find(&self, id: Uuid) -> Option<&TimelineItem> {
        self.timeline.iter().find(|i| i.id() == id)
    }

    // ── Mutations (each bumps the version) ───────────────────────────────────

    /// Append an imported file. Duration = 0 until the probe returns — the
    /// probe request is queued on `pending_probes` for app.rs to drain.
    pub fn add_audio_item(&mut self, path: PathBuf) -> Uuid {
        let name = path.file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        let id = Uuid::new_v4();
        self.timeline.push(TimelineItem::Audio(AudioItem {
            id,
            path: path.clone(),
            name,
            duration: 0.0,
        }));
        self.pending_probes.push((id, path));
        self.version += 1;
        id
    }

    /// Fill in a probed duration. Not a structural edit from the user's point
    /// of view, but the merged output length depends on it, so it bumps too.
    pub fn update_item_duration(&mut self, id: Uuid, duration: f64) {
        if let Some(TimelineItem::Audio(a)) =
            self.timeline.iter_mut().find(|i| i.id() == id)
        {
            a.duration = duration;
            self.version += 1;
        }
    }

    /// Insert a 1-second pause above or below `index`.
    /// Items at or after the insertion point shift down by one.
    pub fn insert_pause(&mut self, index: usize, position: InsertPosition) -> Uuid {
        let at = match position {
            InsertPosition::Above => index,
            InsertPosition::Below => index + 1,
        }
        .min(self.timeline.len());

        let id = Uuid::new_v4();
        self.timeline.insert(at, TimelineItem::Pause(PauseItem {
            id,
            duration: DEFAULT_PAUSE_SECS,
        }));
        self.version += 1;
        id
    }

    pub fn delete_item(&mut self, id: Uuid) {
        let before = self.timeline.len();
        self.timeline.retain(|i| i.id() != id);
        if self.timeline.len() != before {
            if self.selected_item == Some(id) {
                self.selected_item = None;
            }
            self.version += 1;
        }
    }

    /// Clone `id` with a fresh id, inserted immediately after the source.
    /// Returns the new id, or None for an unknown source.
    pub fn duplicate_item(&mut self, id: Uuid) -> Option<Uuid> {
        let index = self.timeline.iter().position(|i| i.id() == id)?;
        let mut clone = self.timeline[index].clone();
        let new_id = Uuid::new_v4();
        match &mut clone {
            TimelineItem::Audio(a) => a.id = new_id,
            TimelineItem::Pause(p) => p.id = new_id,
        }
        self.timeline.insert(index + 1, clone);
        self.version += 1;
        Some(new_id)
    }

    /// Set a pause's duration. Negative values are rejected (no-op, no bump).
    /// No-op on audio items — their duration comes from the file.
    pub fn set_pause_duration(&mut self, id: Uuid, seconds: f64) {
        if seconds < 0.0 || seconds.is_nan() {
            return;
        }
        if let Some(TimelineItem::Pause(p)) =
            self.timeline.iter_mut().find(|i| i.id() == id)
        {
            p.duration = seconds;
            self.version += 1;
        }
    }

    /// Move the item at `from` to `to` (indices into the current list).
    /// No-op when the indices are equal or out of range.
    pub fn reorder(&mut self, from: usize, to: usize) {
        if from == to || from >= self.timeline.len() || to >= self.timeline.len() {
            return;
        }
        let item = self.timeline.remove(from);
        self.timeline.insert(to, item);
        self.version += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn audio(state: &mut ProjectState, name: &str) -> Uuid {
        let id = state.add_audio_item(PathBuf::from(format!("/tmp/{name}.mp3")));
        state.update_item_duration(id, 2.0);
        id
    }

    #[test]
    fn insert_pause_above_shifts_following_items() {
        let mut s = ProjectState::default();
        let a = audio(&mut s, "a");
        let b = audio(&mut s, "b");
        let c = audio(&mut s, "c");

        let p = s.insert_pause(1, InsertPosition::Above);

        let ids: Vec<Uuid> = s.items().iter().map(|i| i.id()).collect();
        assert_eq!(ids, vec![a, p, b, c]);
    }

    #[test]
    fn insert_pause_below_lands_after_index() {
        let mut s = ProjectState::default();
        let a = audio(&mut s, "a");
        let b = audio(&mut s, "b");

        let p = s.insert_pause(0, InsertPosition::Below);

        let ids: Vec<Uuid> = s.items().iter().map(|i| i.id()).collect();
        assert_eq!(ids, vec![a, p, b]);
    }

    #[test]
    fn insert_pause_clamps_past_end() {
        let mut s = ProjectState::default();
        let a = audio(&mut s, "a");
        let p = s.insert_pause(5, InsertPosition::Below);
        let ids: Vec<Uuid> = s.items().iter().map(|i| i.id()).collect();
        assert_eq!(ids, vec![a, p]);
    }

    #[test]
    fn duplicate_inserts_fresh_id_immediately_after_source() {
        let mut s = ProjectState::default();
        let a = audio(&mut s, "a");
        let b = audio(&mut s, "b");

        let dup = s.duplicate_item(a).unwrap();

        assert_ne!(dup, a);
        let ids: Vec<Uuid> = s.items().iter().map(|i| i.id()).collect();
        assert_eq!(ids, vec![a, dup, b]);
        // Source unchanged
        assert_eq!(s.find(a).unwrap().duration(), 2.0);
        assert_eq!(s.find(dup).unwrap().duration(), 2.0);
    }

    #[test]
    fn duplicate_unknown_id_is_noop() {
        let mut s = ProjectState::default();
        audio(&mut s, "a");
        let v = s.version();
        assert!(s.duplicate_item(Uuid::new_v4()).is_none());
        assert_eq!(s.version(), v);
    }

    #[test]
    fn negative_pause_duration_rejected() {
        let mut s = ProjectState::default();
        let p = s.insert_pause(0, InsertPosition::Above);
        let v = s.version();

        s.set_pause_duration(p, -1.0);
        assert_eq!(s.find(p).unwrap().duration(), DEFAULT_PAUSE_SECS);
        assert_eq!(s.version(), v);

        s.set_pause_duration(p, 0.0); // zero is legal
        assert_eq!(s.find(p).unwrap().duration(), 0.0);
        assert_eq!(s.version(), v + 1);
    }

    #[test]
    fn reorder_moves_item_and_same_index_is_noop() {
        let mut s = ProjectState::default();
        let a = audio(&mut s, "a");
        let b = audio(&mut s, "b");
        let c = audio(&mut s, "c");

        let v = s.version();
        s.reorder(1, 1);
        assert_eq!(s.version(), v); // no-op, no bump

        s.reorder(0, 2);
        let ids: Vec<Uuid> = s.items().iter().map(|i| i.id()).collect();
        assert_eq!(ids, vec![b, c, a]);
    }

    #[test]
    fn reorder_out_of_range_is_noop() {
        let mut s = ProjectState::default();
        audio(&mut s, "a");
        let v = s.version();
        s.reorder(0, 7);
        s.reorder(7, 0);
        assert_eq!(s.version(), v);
    }

    #[test]
    fn delete_clears_selection_and_bumps_once() {
        let mut s = ProjectState::default();
        let a = audio(&mut s, "a");
        s.selected_item = Some(a);
        let v = s.version();

        s.delete_item(a);
        assert!(s.items().is_empty());
        assert_eq!(s.selected_item, None);
        assert_eq!(s.version(), v + 1);

        s.delete_item(a); // already gone
        assert_eq!(s.version(), v + 1);
    }

    #[test]
    fn version_bumps_even_when_edit_restores_the_list() {
        // duplicate-then-delete leaves the list identical to before, but a
        // cached render keyed on the old version must still be invalidated.
        let mut s = ProjectState::default();
        let a = audio(&mut s, "a");
        let v = s.version();

        let dup = s.duplicate_item(a).unwrap();
        s.delete_item(dup);

        assert_eq!(s.items().len(), 1);
        assert!(s.version() > v);
    }

    #[test]
    fn total_duration_sums_in_order() {
        let mut s = ProjectState::default();
        let a = audio(&mut s, "a"); // 2.0
        s.insert_pause(1, InsertPosition::Above); // 1.0
        let b = audio(&mut s, "b"); // 2.0
        s.update_item_duration(b, 3.0);
        let _ = a;
        assert!((s.total_duration() - 6.0).abs() < 1e-9);
    }

    #[test]
    fn runtime_fields_do_not_serialize() {
        let mut s = ProjectState::default();
        s.error_banner = Some("boom".into());
        s.merge_in_flight = true;
        let json = serde_json::to_string(&s).unwrap();
        let back: ProjectState = serde_json::from_str(&json).unwrap();
        assert!(back.error_banner.is_none());
        assert!(!back.merge_in_flight);
    }
}
