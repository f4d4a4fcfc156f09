// crates/mergecut-core/src/commands.rs
//
// Every user action in MergeCut is expressed as an EditorCommand.
// Modules emit these; app.rs processes them after the UI pass.
// Adding a new feature = add a variant here + one match arm in app.rs.

use std::path::PathBuf;
use uuid::Uuid;
use crate::state::InsertPosition;

#[derive(Debug, Clone)]
pub enum EditorCommand {
    // ── Import ───────────────────────────────────────────────────────────────
    /// Append each file to the timeline as an audio item and queue a duration
    /// probe for it. Emitted by ControlsModule's picker and by drag-and-drop.
    ImportFiles(Vec<PathBuf>),

    // ── Timeline list ────────────────────────────────────────────────────────
    InsertPause { index: usize, position: InsertPosition },
    DeleteItem(Uuid),
    DuplicateItem(Uuid),
    SetPauseDuration { id: Uuid, seconds: f64 },
    /// Drag-reorder: move the item at `from` to `to`. No-op when equal.
    Reorder { from: usize, to: usize },
    SelectItem(Option<Uuid>),

    // ── Per-clip preview ─────────────────────────────────────────────────────
    /// Start (or restart) one clip's preview from `offset` seconds.
    /// Silences every other audible source first.
    PlayPreview { id: Uuid, offset: f64 },
    StopPreview(Uuid),
    SeekPreview { id: Uuid, time: f64 },

    // ── Merged playback ──────────────────────────────────────────────────────
    /// Render the timeline (or reuse a still-valid cached render) and play it.
    MergeAndPlay,
    StopMerged,
    SeekMerged(f64),

    // ── Export ───────────────────────────────────────────────────────────────
    /// Serialize the current merged buffer to WAV and open a save dialog.
    ExportWav,

    // ── UI ───────────────────────────────────────────────────────────────────
    ClearErrorBanner,
}
