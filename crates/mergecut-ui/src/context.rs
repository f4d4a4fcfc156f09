// crates/mergecut-ui/src/context.rs
//
// AppContext bundles the process-wide runtime handles: the media worker and
// the (lazily opened) audio output stream. Kept separate from ProjectState so
// state stays serializable and handle-free.

use mergecut_core::media_types::MediaResult;
use mergecut_core::state::ProjectState;
use mergecut_media::MediaWorker;
use rodio::OutputStream;

use crate::modules::playback::PlaybackModule;

pub struct AppContext {
    pub media_worker: MediaWorker,
    /// Opened on the first play attempt; None until then or when the device
    /// was unavailable last time we tried.
    pub audio_stream: Option<OutputStream>,
}

impl AppContext {
    pub fn new() -> Self {
        Self {
            media_worker: MediaWorker::new(),
            audio_stream: None,
        }
    }

    /// Drain the worker channel. Called once per frame from app.rs; every
    /// result is applied here so worker threads never touch state directly.
    pub fn ingest_media_results(
        &mut self,
        state:    &mut ProjectState,
        playback: &mut PlaybackModule,
        egui_ctx: &egui::Context,
    ) {
        let mut got_any = false;

        while let Ok(result) = self.media_worker.rx.try_recv() {
            got_any = true;
            match result {
                MediaResult::Duration { id, seconds } => {
                    state.update_item_duration(id, seconds);
                    // Probe succeeded, so the file is readable — kick off the
                    // preview decode eagerly so play is instant later.
                    if let Some(item) = state.find(id) {
                        if let mergecut_core::state::TimelineItem::Audio(a) = item {
                            self.media_worker.decode_clip(id, a.path.clone());
                        }
                    }
                }
                MediaResult::ProbeError { id, msg } => {
                    // An unreadable import is removed rather than left as a
                    // zero-length ghost on the timeline.
                    let name = state.find(id).map(|i| match i {
                        mergecut_core::state::TimelineItem::Audio(a) => a.name.clone(),
                        mergecut_core::state::TimelineItem::Pause(_) => String::new(),
                    });
                    state.delete_item(id);
                    playback.remove_preview(id);
                    state.error_banner = Some(match name {
                        Some(n) if !n.is_empty() => {
                            format!("Could not read '{n}': {msg}")
                        }
                        _ => format!("Could not read imported file: {msg}"),
                    });
                }
                MediaResult::ClipDecoded { id, buffer } => {
                    playback.set_preview_buffer(id, buffer);
                }
                MediaResult::ClipDecodeError { id, .. } => {
                    playback.mark_preview_failed(id);
                }
                MediaResult::Merged { version, buffer } => {
                    playback.on_merged(state, self, version, buffer);
                }
                MediaResult::MergeError { version, msg } => {
                    playback.on_merge_error(state, version, msg);
                }
            }
        }

        if got_any {
            egui_ctx.request_repaint();
        }
    }
}
