// src/app.rs (mergecut-ui)
use mergecut_core::commands::EditorCommand;
use mergecut_core::state::ProjectState;
use mergecut_media::wav::{export_filename, serialize_wav};
use crate::context::AppContext;
use crate::theme::configure_style;
use crate::modules::{
    EditorModule,
    controls::ControlsModule,
    playback::PlaybackModule,
    timeline::TimelineModule,
};
use eframe::egui;
use serde::{Deserialize, Serialize};
use rfd::FileDialog;

#[derive(Serialize, Deserialize)]
struct AppStorage {
    project: ProjectState,
}

// ── App ───────────────────────────────────────────────────────────────────────

pub struct MergeCutApp {
    state:    ProjectState,
    context:  AppContext,
    // Panel modules as concrete types — a typo'd module is a compile error,
    // not a silently blank panel.
    controls: ControlsModule,
    timeline: TimelineModule,
    /// Non-rendering: owns every sink and the merged-buffer cache.
    playback: PlaybackModule,
    /// Commands emitted by modules each frame, processed after the UI pass
    pending_cmds: Vec<EditorCommand>,
}

impl MergeCutApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        configure_style(&cc.egui_ctx);
        // Pin to dark mode — prevents egui overwriting our theme on OS light/dark changes.
        cc.egui_ctx.options_mut(|o| {
            o.theme_preference = egui::ThemePreference::Dark;
        });

        let state = cc.storage
            .and_then(|s| eframe::get_value::<AppStorage>(s, eframe::APP_KEY))
            .map(|d| d.project)
            .unwrap_or_default();

        let context = AppContext::new();
        // Re-probe everything on startup: decoded buffers are runtime-only, and
        // a file may have changed (or vanished) since the project was saved.
        for item in state.items() {
            if let mergecut_core::state::TimelineItem::Audio(a) = item {
                context.media_worker.probe_clip(a.id, a.path.clone());
            }
        }

        Self {
            state,
            context,
            controls:     ControlsModule::new(),
            timeline:     TimelineModule::new(),
            playback:     PlaybackModule::new(),
            pending_cmds: Vec::new(),
        }
    }

    fn process_command(&mut self, cmd: EditorCommand) {
        match cmd {
            // ── Import ───────────────────────────────────────────────────────
            EditorCommand::ImportFiles(paths) => {
                for path in paths {
                    self.state.add_audio_item(path);
                }
            }

            // ── Timeline list ────────────────────────────────────────────────
            EditorCommand::InsertPause { index, position } => {
                self.state.insert_pause(index, position);
            }
            EditorCommand::DeleteItem(id) => {
                self.state.delete_item(id);
                self.playback.remove_preview(id);
            }
            EditorCommand::DuplicateItem(id) => {
                if let Some(new_id) = self.state.duplicate_item(id) {
                    // The duplicate shares the source file; reuse the decoded
                    // buffer instead of decoding the same file twice.
                    if let Some(buffer) = self.playback.preview_buffer(id) {
                        self.playback.set_preview_buffer(new_id, buffer);
                    }
                }
            }
            EditorCommand::SetPauseDuration { id, seconds } => {
                self.state.set_pause_duration(id, seconds);
            }
            EditorCommand::Reorder { from, to } => {
                self.state.reorder(from, to);
            }
            EditorCommand::SelectItem(id) => {
                self.state.selected_item = id;
            }

            // ── Preview playback ─────────────────────────────────────────────
            EditorCommand::PlayPreview { id, offset } => {
                self.playback.play_preview(&mut self.state, &mut self.context, id, offset);
            }
            EditorCommand::StopPreview(id) => {
                self.playback.stop_preview(id);
            }
            EditorCommand::SeekPreview { id, time } => {
                self.playback.seek_preview(&mut self.state, &mut self.context, id, time);
            }

            // ── Merged playback ──────────────────────────────────────────────
            EditorCommand::MergeAndPlay => {
                self.playback.merge_and_play(&mut self.state, &mut self.context);
            }
            EditorCommand::StopMerged => {
                self.playback.stop_merged();
            }
            EditorCommand::SeekMerged(time) => {
                self.playback.seek_merged(&mut self.state, &mut self.context, time);
            }

            // ── Export ───────────────────────────────────────────────────────
            EditorCommand::ExportWav => {
                self.export_wav();
            }

            // ── UI ───────────────────────────────────────────────────────────
            EditorCommand::ClearErrorBanner => {
                self.state.error_banner = None;
            }
        }
    }

    /// Serialize the current merged render and save it where the user picks.
    /// The Export button is disabled until a render matching the current
    /// timeline exists, so a missing buffer here is a stale-frame race, not
    /// a bug — it just declines quietly.
    fn export_wav(&mut self) {
        let Some(buffer) = self.playback.merged_buffer_if_current(self.state.version()) else {
            eprintln!("[export] no up-to-date render, ignoring export request");
            return;
        };

        let bytes = match serialize_wav(&buffer) {
            Ok(b) => b,
            Err(e) => {
                eprintln!("[export] WAV serialization failed: {e}");
                self.state.error_banner = Some(format!("Export failed: {e}"));
                return;
            }
        };

        let default_name = export_filename(chrono::Local::now());
        let Some(dest) = FileDialog::new()
            .set_file_name(&default_name)
            .add_filter("WAV", &["wav"])
            .save_file()
        else {
            return; // user cancelled
        };

        match std::fs::write(&dest, &bytes) {
            Ok(()) => {
                eprintln!(
                    "[export] wrote {:.1} KiB → {}",
                    bytes.len() as f64 / 1024.0,
                    dest.display()
                );
            }
            Err(e) => {
                eprintln!("[export] write failed for '{}': {e}", dest.display());
                self.state.error_banner =
                    Some(format!("Could not write '{}': {e}", dest.display()));
            }
        }
    }

    fn poll_media(&mut self, ctx: &egui::Context) {
        let pending: Vec<_> = self.state.pending_probes.drain(..).collect();
        for (id, path) in pending {
            self.context.media_worker.probe_clip(id, path);
        }
        self.context.ingest_media_results(&mut self.state, &mut self.playback, ctx);
    }

    fn handle_drag_and_drop(&mut self, ctx: &egui::Context) {
        let files = ctx.input(|i| i.raw.dropped_files.clone());
        for file in files {
            if let Some(path) = file.path {
                self.state.add_audio_item(path);
            }
        }
    }
}

// ── eframe::App ───────────────────────────────────────────────────────────────

impl eframe::App for MergeCutApp {
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, &AppStorage {
            project: self.state.clone(),
        });
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.playback.stop_everything();
        self.context.media_worker.shutdown();
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_drag_and_drop(ctx);
        self.poll_media(ctx);

        egui::TopBottomPanel::top("top_panel")
            .exact_height(36.0)
            .show(ctx, |ui| {
                ui.horizontal_centered(|ui| {
                    ui.label(
                        egui::RichText::new("✂ MergeCut")
                            .strong().size(15.0).color(crate::theme::ACCENT),
                    );
                    ui.separator();
                    ui.label(egui::RichText::new("Drop audio files to import").size(12.0).weak());
                });
            });

        egui::SidePanel::left("controls_panel")
            .resizable(true)
            .default_width(260.0)
            .min_width(200.0)
            .show(ctx, |ui| {
                self.controls.ui(ui, &self.state, &self.playback, &mut self.pending_cmds);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.timeline.ui(ui, &self.state, &self.playback, &mut self.pending_cmds);
        });

        // ── Process commands emitted by modules this frame ────────────────────
        let cmds: Vec<EditorCommand> = self.pending_cmds.drain(..).collect();
        for cmd in cmds {
            self.process_command(cmd);
        }

        // ── Tick the non-rendering playback module ────────────────────────────
        self.playback.tick(&self.state, ctx);
    }
}
