// crates/mergecut-ui/src/modules/controls.rs
//
// ControlsModule: left-panel UI for importing clips and driving the merged
// timeline — merge & play, stop, seek, export.
//
// State machine (driven by ProjectState + PlaybackModule views):
//
//   Idle       → "Merge & Play" enabled once the timeline has audio
//   Merging    → state.merge_in_flight; spinner shown, merge button disabled
//   Ready      → merged_view().ready: seek bar live, Export enabled,
//                "Merge & Play" resumes the cached render without re-rendering
//
// Any edit invalidates Ready back to Idle (PlaybackModule notices the version
// change); this panel never has to clear anything itself.

use super::EditorModule;
use super::playback::PlaybackModule;
use mergecut_core::commands::EditorCommand;
use mergecut_core::helpers::time::format_clock;
use mergecut_core::state::ProjectState;
use crate::theme::{DARK_TEXT_DIM, ERROR_BG};
use egui::{Color32, RichText, Stroke, Ui};

/// Muted green for the "render ready" status line.
const GREEN_DIM: Color32 = Color32::from_rgb(80, 190, 120);

/// File extensions offered by the import picker. Matches the set of decoders
/// compiled into the media crate.
pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "flac", "ogg", "m4a", "aac"];

fn wide_btn(label: impl Into<egui::WidgetText>) -> egui::Button<'static> {
    egui::Button::new(label).min_size(egui::vec2(120.0, 28.0))
}

pub struct ControlsModule;

impl ControlsModule {
    pub fn new() -> Self {
        Self
    }
}

impl EditorModule for ControlsModule {
    fn name(&self) -> &str { "Controls" }

    fn ui(
        &mut self,
        ui:       &mut Ui,
        state:    &ProjectState,
        playback: &PlaybackModule,
        cmd:      &mut Vec<EditorCommand>,
    ) {
        // ── Error banner ─────────────────────────────────────────────────────
        if let Some(msg) = &state.error_banner {
            egui::Frame::new()
                .fill(ERROR_BG)
                .stroke(Stroke::new(1.0, Color32::from_rgb(160, 60, 60)))
                .corner_radius(egui::CornerRadius::same(4))
                .inner_margin(egui::Margin::same(8))
                .show(ui, |ui| {
                    ui.label(RichText::new(msg).size(11.0));
                    if ui.small_button("Dismiss").clicked() {
                        cmd.push(EditorCommand::ClearErrorBanner);
                    }
                });
            ui.add_space(6.0);
        }

        // ── Import ───────────────────────────────────────────────────────────
        ui.heading("Library");
        ui.add_space(4.0);
        if ui.add(wide_btn("📁 Import Audio")).clicked() {
            let picked = rfd::FileDialog::new()
                .add_filter("Audio", AUDIO_EXTENSIONS)
                .set_title("Import audio files")
                .pick_files();
            if let Some(paths) = picked {
                cmd.push(EditorCommand::ImportFiles(paths));
            }
        }
        ui.label(
            RichText::new("mp3 · wav · flac · ogg · m4a · aac")
                .size(9.0)
                .color(DARK_TEXT_DIM),
        );

        ui.add_space(12.0);
        ui.separator();
        ui.add_space(6.0);

        // ── Merged transport ─────────────────────────────────────────────────
        ui.heading("Merged Output");
        ui.add_space(4.0);

        let merged = playback.merged_view(state);

        ui.horizontal(|ui| {
            if merged.playing {
                if ui.add(wide_btn("⏹ Stop")).clicked() {
                    cmd.push(EditorCommand::StopMerged);
                }
            } else {
                let can_merge = state.has_audio() && !state.merge_in_flight;
                let label = if merged.ready { "▶ Play" } else { "▶ Merge & Play" };
                let resp = ui
                    .add_enabled(can_merge, wide_btn(label))
                    .on_disabled_hover_text(if state.merge_in_flight {
                        "Rendering…"
                    } else {
                        "Import at least one audio clip first"
                    });
                if resp.clicked() {
                    cmd.push(EditorCommand::MergeAndPlay);
                }
            }
            if state.merge_in_flight {
                ui.spinner();
            }
        });

        // Seek bar — live once a valid render exists.
        if merged.ready && merged.duration > 0.0 {
            ui.add_space(4.0);
            let mut pos = merged.position;
            let slider = egui::Slider::new(&mut pos, 0.0..=merged.duration)
                .show_value(false);
            if ui.add_sized([ui.available_width(), 18.0], slider).changed() {
                cmd.push(EditorCommand::SeekMerged(pos));
            }
            ui.label(
                RichText::new(format!(
                    "{} / {}",
                    format_clock(merged.position),
                    format_clock(merged.duration),
                ))
                .monospace()
                .size(11.0)
                .color(DARK_TEXT_DIM),
            );
            ui.label(RichText::new("render up to date").size(10.0).color(GREEN_DIM));
        } else if state.merge_in_flight {
            ui.label(RichText::new("rendering timeline…").size(10.0).color(DARK_TEXT_DIM));
        } else if state.has_audio() {
            ui.label(
                RichText::new("edits pending — merge to render")
                    .size(10.0)
                    .color(DARK_TEXT_DIM),
            );
        }

        ui.add_space(12.0);
        ui.separator();
        ui.add_space(6.0);

        // ── Export ───────────────────────────────────────────────────────────
        ui.heading("Export");
        ui.add_space(4.0);
        let resp = ui
            .add_enabled(merged.ready, wide_btn("💾 Export WAV"))
            .on_hover_text("Save the merged timeline as a WAV file")
            .on_disabled_hover_text("Merge the timeline first — export always matches what you heard");
        if resp.clicked() {
            cmd.push(EditorCommand::ExportWav);
        }
    }
}
