// crates/mergecut-media/src/worker.rs
//
// MediaWorker: background probe/decode/render threads.
// All public API that mergecut-ui calls lives here.

use std::path::PathBuf;
use std::sync::{Arc, Condvar, Mutex, atomic::{AtomicBool, Ordering}};
use std::thread;

use crossbeam_channel::{bounded, Receiver, Sender};
use uuid::Uuid;

use mergecut_core::media_types::MediaResult;

use crate::decode::decode_clip;
use crate::probe::probe_duration;
use crate::render::{render_segments, RenderSegment};

/// One timeline entry of a merge request, in playback order. Paths travel by
/// value so the render thread never touches project state.
#[derive(Debug, Clone)]
pub enum MergeJob {
    Clip { id: Uuid, path: PathBuf },
    Pause { seconds: f64 },
}

// ── MediaWorker ───────────────────────────────────────────────────────────────

pub struct MediaWorker {
    /// Shared result channel: probes, preview decodes, merge results.
    /// Drained once per frame by AppContext::ingest_media_results.
    pub rx:   Receiver<MediaResult>,
    tx:       Sender<MediaResult>,
    shutdown: Arc<AtomicBool>,
    /// Limits concurrent probe threads: (active_count, Condvar). Max = PROBE_CONCURRENCY.
    probe_sem: Arc<(Mutex<u32>, Condvar)>,
}

impl MediaWorker {
    pub fn new() -> Self {
        let (tx, rx) = bounded(512);
        Self {
            rx,
            tx,
            shutdown:  Arc::new(AtomicBool::new(false)),
            probe_sem: Arc::new((Mutex::new(0), Condvar::new())),
        }
    }

    /// Idempotent. In-flight threads observe the flag at their next checkpoint
    /// and exit without sending.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Probe `path`'s duration on a background thread; sends `Duration` or
    /// `ProbeError`.
    pub fn probe_clip(&self, id: Uuid, path: PathBuf) {
        let tx  = self.tx.clone();
        let sd  = self.shutdown.clone();
        let sem = self.probe_sem.clone();

        // Gatekeeper thread acquires the semaphore *before* doing the work, so
        // importing a large batch holds at most PROBE_CONCURRENCY probes plus
        // queued waiters — not one busy decoder thread per file.
        thread::spawn(move || {
            const PROBE_CONCURRENCY: u32 = 4;
            {
                let (lock, cvar) = &*sem;
                let mut count = lock.lock().unwrap();
                while *count >= PROBE_CONCURRENCY {
                    count = cvar.wait(count).unwrap();
                }
                *count += 1;
            }
            // RAII release guard — decrements count and wakes next waiter on drop
            struct SemGuard(Arc<(Mutex<u32>, Condvar)>);
            impl Drop for SemGuard {
                fn drop(&mut self) {
                    let (lock, cvar) = &*self.0;
                    *lock.lock().unwrap() -= 1;
                    cvar.notify_one();
                }
            }
            let _guard = SemGuard(sem);

            if sd.load(Ordering::Relaxed) { return; }
            match probe_duration(&path) {
                Ok(seconds) => {
                    eprintln!("[media] duration {seconds:.2}s ← {}", path.display());
                    let _ = tx.send(MediaResult::Duration { id, seconds });
                }
                Err(e) => {
                    eprintln!("[media] probe failed for '{}': {e}", path.display());
                    let _ = tx.send(MediaResult::ProbeError { id, msg: e.to_string() });
                }
            }
        });
    }

    /// Decode one clip for preview playback; sends `ClipDecoded` or
    /// `ClipDecodeError`. A failed decode leaves only that clip's preview
    /// inert — nothing else is touched.
    pub fn decode_clip(&self, id: Uuid, path: PathBuf) {
        let tx = self.tx.clone();
        let sd = self.shutdown.clone();
        thread::spawn(move || {
            if sd.load(Ordering::Relaxed) { return; }
            match decode_clip(&path) {
                Ok(buffer) => {
                    eprintln!(
                        "[media] decoded {:.2}s ← {}",
                        buffer.duration_seconds(),
                        path.display()
                    );
                    let _ = tx.send(MediaResult::ClipDecoded { id, buffer: Arc::new(buffer) });
                }
                Err(e) => {
                    eprintln!("[media] decode failed for '{}': {e}", path.display());
                    let _ = tx.send(MediaResult::ClipDecodeError { id, msg: e.to_string() });
                }
            }
        });
    }

    /// Render the whole timeline on a background thread.
    ///
    /// `version` is the timeline version the plan was built from; it travels
    /// with the result so the UI can drop a render that a later edit has
    /// already invalidated. Any clip failing to decode aborts the whole merge
    /// — no partial buffer is ever sent.
    pub fn start_merge(&self, version: u64, jobs: Vec<MergeJob>) {
        let tx = self.tx.clone();
        let sd = self.shutdown.clone();
        thread::spawn(move || {
            if sd.load(Ordering::Relaxed) { return; }

            let mut segments = Vec::with_capacity(jobs.len());
            for job in &jobs {
                match job {
                    MergeJob::Clip { path, .. } => match decode_clip(path) {
                        Ok(buffer) => segments.push(RenderSegment::Clip(Arc::new(buffer))),
                        Err(e) => {
                            eprintln!("[media] merge aborted at '{}': {e}", path.display());
                            let _ = tx.send(MediaResult::MergeError {
                                version,
                                msg: e.to_string(),
                            });
                            return;
                        }
                    },
                    MergeJob::Pause { seconds } => {
                        segments.push(RenderSegment::Silence(*seconds));
                    }
                }
                if sd.load(Ordering::Relaxed) { return; }
            }

            match render_segments(&segments) {
                Ok(buffer) => {
                    eprintln!(
                        "[media] merged {} segments → {:.2}s (v{version})",
                        segments.len(),
                        buffer.duration_seconds()
                    );
                    let _ = tx.send(MediaResult::Merged { version, buffer: Arc::new(buffer) });
                }
                Err(e) => {
                    eprintln!("[media] render failed: {e}");
                    let _ = tx.send(MediaResult::MergeError { version, msg: e.to_string() });
                }
            }
        });
    }
}

impl Default for MediaWorker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn recv(worker: &MediaWorker) -> MediaResult {
        worker.rx.recv_timeout(Duration::from_secs(10)).expect("worker result")
    }

    fn write_wav(path: &std::path::Path, seconds: f64, value: i16) {
        let spec = hound::WavSpec {
            channels:        1,
            sample_rate:     44_100,
            bits_per_sample: 16,
            sample_format:   hound::SampleFormat::Int,
        };
        let mut w = hound::WavWriter::create(path, spec).unwrap();
        for _ in 0..(seconds * 44_100.0) as usize {
            w.write_sample(value).unwrap();
        }
        w.finalize().unwrap();
    }

    #[test]
    fn probe_result_arrives_on_the_channel() {
        let dir = std::env::temp_dir().join("mergecut_worker_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("probe_me.wav");
        write_wav(&path, 1.0, 0);

        let worker = MediaWorker::new();
        let id = Uuid::new_v4();
        worker.probe_clip(id, path);

        match recv(&worker) {
            MediaResult::Duration { id: got, seconds } => {
                assert_eq!(got, id);
                assert!((seconds - 1.0).abs() < 0.01);
            }
            _ => panic!("expected Duration"),
        }
    }

    #[test]
    fn merge_with_unreadable_clip_sends_error_not_partial_buffer() {
        let dir = std::env::temp_dir().join("mergecut_worker_test");
        std::fs::create_dir_all(&dir).unwrap();
        let good = dir.join("good.wav");
        write_wav(&good, 0.1, 100);

        let worker = MediaWorker::new();
        worker.start_merge(7, vec![
            MergeJob::Clip { id: Uuid::new_v4(), path: good },
            MergeJob::Clip { id: Uuid::new_v4(), path: dir.join("missing.wav") },
        ]);

        match recv(&worker) {
            MediaResult::MergeError { version, .. } => assert_eq!(version, 7),
            _ => panic!("expected MergeError"),
        }
        // Nothing else may follow the abort.
        assert!(worker.rx.recv_timeout(Duration::from_millis(200)).is_err());
    }

    #[test]
    fn merge_renders_clips_and_pauses_in_order() {
        let dir = std::env::temp_dir().join("mergecut_worker_test");
        std::fs::create_dir_all(&dir).unwrap();
        let a = dir.join("a.wav");
        write_wav(&a, 0.5, 1000);

        let worker = MediaWorker::new();
        worker.start_merge(3, vec![
            MergeJob::Clip { id: Uuid::new_v4(), path: a },
            MergeJob::Pause { seconds: 0.5 },
        ]);

        match recv(&worker) {
            MediaResult::Merged { version, buffer } => {
                assert_eq!(version, 3);
                assert!((buffer.duration_seconds() - 1.0).abs() < 0.01);
                // Tail half is the pause — silent by construction.
                let half = buffer.samples.len() / 2;
                assert!(buffer.samples[half + 100..].iter().all(|&s| s == 0.0));
            }
            _ => panic!("expected Merged"),
        }
    }

    #[test]
    fn empty_merge_plan_reports_empty_render() {
        let worker = MediaWorker::new();
        worker.start_merge(1, vec![MergeJob::Pause { seconds: 0.0 }]);
        match recv(&worker) {
            MediaResult::MergeError { version, msg } => {
                assert_eq!(version, 1);
                assert!(msg.contains("empty"), "msg = {msg}");
            }
            _ => panic!("expected MergeError"),
        }
    }
}
