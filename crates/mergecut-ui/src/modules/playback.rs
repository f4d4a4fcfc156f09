// crates/mergecut-ui/src/modules/playback.rs
//
// PlaybackModule owns all audio playback: one preview player per clip and the
// single merged-timeline player. Non-rendering module — tick() is called
// every frame from app.rs after commands are processed; no egui panel.
//
// Audibility goes through mergecut-core's PlaybackArbiter: starting any
// source first stops every other source synchronously, then acquires the
// floor. tick() additionally silences anything whose token has gone stale,
// so the "at most one audible source" invariant holds even across races.
//
// The merged buffer is version-checked, never reset by call-site discipline:
// tick() compares the buffer's timeline version against the live one and
// invalidates on mismatch, and merge results arriving from the worker are
// dropped when the timeline has moved on since the render started.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use mergecut_core::media_types::ClipBuffer;
use mergecut_core::playback::{AudibleSource, PlaybackArbiter};
use mergecut_core::state::{ProjectState, TimelineItem};
use mergecut_media::MergeJob;
use rodio::buffer::SamplesBuffer;
use rodio::{OutputStream, Sink};
use uuid::Uuid;

use crate::context::AppContext;

/// Treat a resume this close to the end as "finished" and restart from 0.
const END_EPSILON: f64 = 0.01;

// ── Players ───────────────────────────────────────────────────────────────────

/// A live sink plus the wall-clock anchor used to derive the position.
/// Position = start_offset + elapsed, exactly the original's playback clock.
struct Voice {
    sink:         Sink,
    started:      Instant,
    start_offset: f64,
    token:        u64,
}

/// One decoded source and its (possibly idle) playback state.
#[derive(Default)]
struct Player {
    buffer:        Option<Arc<ClipBuffer>>,
    decode_failed: bool,
    voice:         Option<Voice>,
    /// Displayed position in seconds — live while playing, sticky while idle
    /// (a paused seek updates this without starting audio).
    position:      f64,
}

impl Player {
    fn duration(&self) -> f64 {
        self.buffer.as_ref().map(|b| b.duration_seconds()).unwrap_or(0.0)
    }

    fn is_playing(&self) -> bool {
        self.voice.is_some()
    }
}

/// Start `player` from `offset` (clamped). No-op without a decoded buffer —
/// a clip whose decode failed or hasn't arrived yet stays silent.
fn start_voice(
    arbiter: &mut PlaybackArbiter,
    source:  AudibleSource,
    stream:  &OutputStream,
    player:  &mut Player,
    offset:  f64,
) {
    let Some(buffer) = player.buffer.clone() else { return };

    stop_voice(arbiter, source, player);

    let duration = buffer.duration_seconds();
    let offset   = offset.clamp(0.0, duration);
    let first    = ((offset * buffer.sample_rate as f64) as usize).min(buffer.samples.len());

    let token = arbiter.acquire(source);
    let sink  = Sink::connect_new(stream.mixer());
    sink.append(SamplesBuffer::new(
        1,
        buffer.sample_rate,
        buffer.samples[first..].to_vec(),
    ));
    sink.play();

    player.voice = Some(Voice {
        sink,
        started: Instant::now(),
        start_offset: offset,
        token,
    });
    player.position = offset;
}

/// Idempotent stop. Dropping the Sink tears the audio down deterministically;
/// no position polling can fire for this voice afterwards because the voice
/// (and its token) is gone.
fn stop_voice(arbiter: &mut PlaybackArbiter, source: AudibleSource, player: &mut Player) {
    if let Some(voice) = player.voice.take() {
        if voice.sink.empty() {
            // Natural completion raced the stop — expected, never surfaced.
            eprintln!("[audio] stop on already-drained sink (natural end race)");
        }
        voice.sink.stop();
        arbiter.release(source);
    }
}

// ── PlaybackModule ────────────────────────────────────────────────────────────

pub struct PlaybackModule {
    arbiter:  PlaybackArbiter,
    previews: HashMap<Uuid, Player>,
    merged:   Player,
    /// Timeline version the merged buffer was rendered from.
    merged_version: Option<u64>,
    /// Version of the merge currently running on the worker, if any.
    pending_version: Option<u64>,
    /// Play as soon as the pending merge lands.
    play_on_merge: bool,
}

impl PlaybackModule {
    pub fn new() -> Self {
        Self {
            arbiter:         PlaybackArbiter::new(),
            previews:        HashMap::new(),
            merged:          Player::default(),
            merged_version:  None,
            pending_version: None,
            play_on_merge:   false,
        }
    }

    // ── Stream availability ──────────────────────────────────────────────────

    /// Open the output stream on first use. This is the native analog of the
    /// original's "unlock the audio context on first interaction": every play
    /// path starts from a user click, so opening here is always allowed.
    /// On failure the operation aborts with a blocking banner and NO other
    /// state is touched.
    fn ensure_stream(&self, ctx: &mut AppContext, state: &mut ProjectState) -> bool {
        if ctx.audio_stream.is_none() {
            match rodio::OutputStreamBuilder::open_default_stream() {
                Ok(stream) => ctx.audio_stream = Some(stream),
                Err(e) => {
                    eprintln!("[audio] output stream unavailable: {e}");
                    state.error_banner = Some(format!(
                        "Audio output is unavailable: {e}. Check your output device and try again."
                    ));
                    return false;
                }
            }
        }
        true
    }

    /// Stop every preview and the merged playback. The synchronous
    /// happens-before edge: callers invoke this before starting anything new.
    pub fn stop_everything(&mut self) {
        let ids: Vec<Uuid> = self.previews.keys().copied().collect();
        for id in ids {
            if let Some(player) = self.previews.get_mut(&id) {
                stop_voice(&mut self.arbiter, AudibleSource::Preview(id), player);
            }
        }
        stop_voice(&mut self.arbiter, AudibleSource::Merged, &mut self.merged);
    }

    // ── Preview transport ────────────────────────────────────────────────────

    pub fn play_preview(
        &mut self,
        state:  &mut ProjectState,
        ctx:    &mut AppContext,
        id:     Uuid,
        offset: f64,
    ) {
        // A clip without a decoded buffer cannot make sound, so the whole
        // request is a no-op: nothing already playing is silenced and no
        // output stream is opened on its behalf.
        if !self.previews.get(&id).is_some_and(|p| p.buffer.is_some()) {
            return;
        }
        if !self.ensure_stream(ctx, state) {
            return;
        }
        self.stop_everything();

        let Some(stream) = &ctx.audio_stream else { return };
        let player = self.previews.entry(id).or_default();
        start_voice(&mut self.arbiter, AudibleSource::Preview(id), stream, player, offset);
    }

    pub fn stop_preview(&mut self, id: Uuid) {
        if let Some(player) = self.previews.get_mut(&id) {
            stop_voice(&mut self.arbiter, AudibleSource::Preview(id), player);
        }
    }

    /// Clamp to [0, duration]; restart from the new offset when playing,
    /// otherwise only move the displayed position.
    pub fn seek_preview(
        &mut self,
        state: &mut ProjectState,
        ctx:   &mut AppContext,
        id:    Uuid,
        time:  f64,
    ) {
        let playing = self.previews.get(&id).map(Player::is_playing).unwrap_or(false);
        if playing {
            self.play_preview(state, ctx, id, time);
        } else if let Some(player) = self.previews.get_mut(&id) {
            player.position = time.clamp(0.0, player.duration());
        }
    }

    /// Decode arrived for a clip. Replacing the Arc drops any previous decode
    /// of the same clip — repeated edits never stack buffers.
    pub fn set_preview_buffer(&mut self, id: Uuid, buffer: Arc<ClipBuffer>) {
        let player = self.previews.entry(id).or_default();
        player.buffer        = Some(buffer);
        player.decode_failed = false;
    }

    /// Decode failed — this clip's preview stays inert (play is a no-op);
    /// the rest of the timeline is unaffected.
    pub fn mark_preview_failed(&mut self, id: Uuid) {
        let player = self.previews.entry(id).or_default();
        player.buffer        = None;
        player.decode_failed = true;
    }

    /// Decoded buffer for one clip, if the decode has landed.
    pub fn preview_buffer(&self, id: Uuid) -> Option<Arc<ClipBuffer>> {
        self.previews.get(&id).and_then(|p| p.buffer.clone())
    }

    /// Drop a deleted item's player (its buffer with it).
    pub fn remove_preview(&mut self, id: Uuid) {
        if let Some(mut player) = self.previews.remove(&id) {
            stop_voice(&mut self.arbiter, AudibleSource::Preview(id), &mut player);
        }
    }

    // ── Merged transport ─────────────────────────────────────────────────────

    pub fn merge_and_play(&mut self, state: &mut ProjectState, ctx: &mut AppContext) {
        if !self.ensure_stream(ctx, state) {
            return;
        }
        self.stop_everything();

        // Cached render still valid? Resume instead of re-rendering.
        if self.merged.buffer.is_some() && self.merged_version == Some(state.version()) {
            let duration = self.merged.duration();
            let offset = if self.merged.position >= duration - END_EPSILON {
                0.0
            } else {
                self.merged.position
            };
            if let Some(stream) = &ctx.audio_stream {
                start_voice(&mut self.arbiter, AudibleSource::Merged, stream, &mut self.merged, offset);
            }
            return;
        }

        if !state.has_audio() {
            eprintln!("[audio] no audio to merge");
            return;
        }
        if state.total_duration() <= 0.0 {
            eprintln!("[audio] total duration is zero, nothing to render");
            return;
        }

        let version = state.version();
        let jobs: Vec<MergeJob> = state.items().iter().map(|item| match item {
            TimelineItem::Audio(a) => MergeJob::Clip { id: a.id, path: a.path.clone() },
            TimelineItem::Pause(p) => MergeJob::Pause { seconds: p.duration },
        }).collect();

        self.merged.position  = 0.0;
        self.pending_version  = Some(version);
        self.play_on_merge    = true;
        state.merge_in_flight = true;
        ctx.media_worker.start_merge(version, jobs);
    }

    pub fn stop_merged(&mut self) {
        stop_voice(&mut self.arbiter, AudibleSource::Merged, &mut self.merged);
    }

    pub fn seek_merged(&mut self, state: &mut ProjectState, ctx: &mut AppContext, time: f64) {
        if self.merged.is_playing() {
            if !self.ensure_stream(ctx, state) {
                return;
            }
            self.stop_everything();
            if let Some(stream) = &ctx.audio_stream {
                start_voice(&mut self.arbiter, AudibleSource::Merged, stream, &mut self.merged, time);
            }
        } else {
            self.merged.position = time.clamp(0.0, self.merged.duration());
        }
    }

    /// A render landed. Stale results (the timeline moved on while the worker
    /// was rendering) are dropped on the floor.
    pub fn on_merged(
        &mut self,
        state:   &mut ProjectState,
        ctx:     &mut AppContext,
        version: u64,
        buffer:  Arc<ClipBuffer>,
    ) {
        if self.pending_version == Some(version) {
            self.pending_version  = None;
            state.merge_in_flight = false;
        }
        if version != state.version() {
            eprintln!("[audio] dropping stale merge (v{version}, timeline at v{})", state.version());
            return;
        }

        self.merged.buffer   = Some(buffer);
        self.merged_version  = Some(version);
        self.merged.position = 0.0;

        if std::mem::take(&mut self.play_on_merge) {
            if let Some(stream) = &ctx.audio_stream {
                start_voice(&mut self.arbiter, AudibleSource::Merged, stream, &mut self.merged, 0.0);
            }
        }
    }

    pub fn on_merge_error(&mut self, state: &mut ProjectState, version: u64, msg: String) {
        if self.pending_version == Some(version) {
            self.pending_version  = None;
            state.merge_in_flight = false;
            self.play_on_merge    = false;
        }
        eprintln!("[audio] merge failed (v{version}): {msg}");
        state.error_banner = Some(format!("Could not merge the timeline: {msg}"));
    }

    /// The merged buffer for export, but only when it matches the current
    /// timeline — exporting a stale render is never allowed.
    pub fn merged_buffer_if_current(&self, version: u64) -> Option<Arc<ClipBuffer>> {
        if self.merged_version == Some(version) {
            self.merged.buffer.clone()
        } else {
            None
        }
    }

    // ── Per-frame poll ───────────────────────────────────────────────────────

    /// Position polling + structural cache invalidation. Runs once per frame
    /// (egui's repaint cadence is the native analog of the original's
    /// animation-frame loop).
    pub fn tick(&mut self, state: &ProjectState, egui_ctx: &egui::Context) {
        // Invalidate the merged buffer the moment the timeline diverges from
        // what was rendered. No edit path needs to remember to call reset().
        if self.merged.buffer.is_some() && self.merged_version != Some(state.version()) {
            stop_voice(&mut self.arbiter, AudibleSource::Merged, &mut self.merged);
            self.merged.buffer   = None;
            self.merged_version  = None;
            self.merged.position = 0.0;
        }

        let mut any_playing = false;

        let ids: Vec<Uuid> = self.previews.keys().copied().collect();
        for id in ids {
            if let Some(player) = self.previews.get_mut(&id) {
                poll_voice(&mut self.arbiter, AudibleSource::Preview(id), player);
                any_playing |= player.is_playing();
            }
        }
        poll_voice(&mut self.arbiter, AudibleSource::Merged, &mut self.merged);
        any_playing |= self.merged.is_playing();

        if any_playing {
            egui_ctx.request_repaint();
        }
    }

    // ── Read-only views for the panels ───────────────────────────────────────

    pub fn preview_view(&self, id: Uuid) -> PreviewView {
        match self.previews.get(&id) {
            Some(p) => PreviewView {
                position:  p.position,
                duration:  p.duration(),
                playing:   p.is_playing(),
                available: p.buffer.is_some(),
                failed:    p.decode_failed,
            },
            None => PreviewView::default(),
        }
    }

    pub fn merged_view(&self, state: &ProjectState) -> MergedView {
        MergedView {
            position: self.merged.position,
            duration: self.merged.duration(),
            playing:  self.merged.is_playing(),
            ready:    self.merged.buffer.is_some()
                && self.merged_version == Some(state.version()),
        }
    }
}

/// Advance one player's clock; handle revocation and natural completion.
fn poll_voice(arbiter: &mut PlaybackArbiter, source: AudibleSource, player: &mut Player) {
    let Some(voice) = &player.voice else { return };

    // Pre-empted by another source acquiring the floor — go silent now.
    if !arbiter.is_current(source, voice.token) {
        if let Some(voice) = player.voice.take() {
            voice.sink.stop();
        }
        return;
    }

    let duration = player.duration();
    let position = voice.start_offset + voice.started.elapsed().as_secs_f64();
    if position >= duration {
        // Natural end: back to Idle, displayed position resets to 0.
        if let Some(voice) = player.voice.take() {
            voice.sink.stop();
        }
        arbiter.release(source);
        player.position = 0.0;
    } else {
        player.position = position;
    }
}

/// Snapshot of one preview player for the timeline rows.
#[derive(Clone, Copy, Debug, Default)]
pub struct PreviewView {
    pub position:  f64,
    pub duration:  f64,
    pub playing:   bool,
    /// Decoded buffer present — play will actually make sound.
    pub available: bool,
    /// Decode failed — preview is permanently inert for this file.
    pub failed:    bool,
}

/// Snapshot of the merged player for the controls panel.
#[derive(Clone, Copy, Debug, Default)]
pub struct MergedView {
    pub position: f64,
    pub duration: f64,
    pub playing:  bool,
    /// A merged buffer matching the current timeline exists (export legal,
    /// play resumes without re-render).
    pub ready:    bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resume_offset_restarts_near_the_end() {
        // The resume rule: within END_EPSILON of the end → start over.
        let duration = 6.0;
        let at_end   = duration - END_EPSILON / 2.0;
        let offset   = if at_end >= duration - END_EPSILON { 0.0 } else { at_end };
        assert_eq!(offset, 0.0);

        let mid    = 3.0;
        let offset = if mid >= duration - END_EPSILON { 0.0 } else { mid };
        assert_eq!(offset, 3.0);
    }

    #[test]
    fn idle_seek_clamps_to_buffer_duration() {
        let mut module = PlaybackModule::new();
        let id = Uuid::new_v4();
        module.set_preview_buffer(id, Arc::new(ClipBuffer {
            samples:     vec![0.0; 44_100 * 2],
            sample_rate: 44_100,
        }));

        // No AppContext needed: an idle seek never touches the stream.
        let player = module.previews.get_mut(&id).unwrap();
        player.position = 99.0_f64.clamp(0.0, player.duration());
        assert_eq!(player.position, 2.0);
        player.position = (-5.0_f64).clamp(0.0, player.duration());
        assert_eq!(player.position, 0.0);
    }

    #[test]
    fn play_without_decoded_buffer_is_a_noop() {
        // No buffer → the request must not reach the stop-everything or
        // stream-opening paths. Observable from the outside: no stream is
        // opened, no error banner appears, nothing starts playing.
        let mut module = PlaybackModule::new();
        let mut state  = ProjectState::default();
        let mut ctx    = AppContext::new();
        let id = Uuid::new_v4();

        module.play_preview(&mut state, &mut ctx, id, 0.0);

        assert!(!module.preview_view(id).playing);
        assert!(ctx.audio_stream.is_none());
        assert!(state.error_banner.is_none());

        // Same for a clip whose decode failed.
        module.mark_preview_failed(id);
        module.play_preview(&mut state, &mut ctx, id, 0.0);
        assert!(!module.preview_view(id).playing);
        assert!(ctx.audio_stream.is_none());
    }

    #[test]
    fn views_default_sanely_for_unknown_clips() {
        let module = PlaybackModule::new();
        let view = module.preview_view(Uuid::new_v4());
        assert!(!view.playing);
        assert!(!view.available);
        assert_eq!(view.position, 0.0);
    }
}
