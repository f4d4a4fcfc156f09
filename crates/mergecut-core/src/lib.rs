// crates/mergecut-core/src/lib.rs
//
// Pure project data and logic — no egui, no audio I/O, no threads.
// Used by both mergecut-media and mergecut-ui.

pub mod commands;
pub mod helpers;
pub mod media_types;
pub mod playback;
pub mod state;
