// crates/mergecut-ui/src/modules/mod.rs
//
// Module registry. To add a new panel:
//   1. Create modules/mypanel.rs implementing EditorModule
//   2. Add `pub mod mypanel;` below
//   3. Wire it into a panel in app.rs

pub mod controls;
pub mod playback;
pub mod timeline;

use mergecut_core::commands::EditorCommand;
use mergecut_core::state::ProjectState;
use egui::Ui;
use self::playback::PlaybackModule;

/// Every editor panel implements this trait.
/// Modules read state, emit commands — they never mutate state directly.
/// `playback` is passed read-only so panels can show positions and
/// play/stop toggles without owning any audio handle.
pub trait EditorModule {
    fn name(&self) -> &str;
    fn ui(
        &mut self,
        ui:       &mut Ui,
        state:    &ProjectState,
        playback: &PlaybackModule,
        cmd:      &mut Vec<EditorCommand>,
    );
}
