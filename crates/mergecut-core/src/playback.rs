// crates/mergecut-core/src/playback.rs
//
// PlaybackArbiter: the single process-wide object every player must go
// through before becoming audible. At most one source holds the floor at
// any instant — clip previews and the merged playback all compete here
// instead of cross-referencing each other.

use uuid::Uuid;

/// Identity of something that can make noise.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AudibleSource {
    /// Per-clip preview, keyed by the timeline item id.
    Preview(Uuid),
    /// The merged-timeline playback. There is only one.
    Merged,
}

/// Generation-counter floor. `acquire` hands out a token tied to the current
/// generation; any later acquire (by anyone) bumps the generation, which
/// silently revokes every older token. Players poll `is_current` each tick
/// and stop themselves when revoked, so pre-emption needs no callbacks.
#[derive(Debug, Default)]
pub struct PlaybackArbiter {
    generation: u64,
    holder:     Option<AudibleSource>,
}

impl PlaybackArbiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the floor. Revokes whatever token was live before.
    pub fn acquire(&mut self, source: AudibleSource) -> u64 {
        self.generation += 1;
        self.holder = Some(source);
        self.generation
    }

    /// True while `source`'s `token` is still the live one.
    pub fn is_current(&self, source: AudibleSource, token: u64) -> bool {
        self.holder == Some(source) && token == self.generation
    }

    /// Give the floor back. Only the current holder can release — a stale
    /// release (after someone else acquired) is a no-op, so stop() stays
    /// idempotent and safe from any state.
    pub fn release(&mut self, source: AudibleSource) {
        if self.holder == Some(source) {
            self.holder = None;
        }
    }

    pub fn holder(&self) -> Option<AudibleSource> {
        self.holder
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_revokes_first() {
        let mut arb = PlaybackArbiter::new();
        let a = AudibleSource::Preview(Uuid::new_v4());
        let b = AudibleSource::Preview(Uuid::new_v4());

        let ta = arb.acquire(a);
        assert!(arb.is_current(a, ta));

        let tb = arb.acquire(b);
        assert!(!arb.is_current(a, ta));
        assert!(arb.is_current(b, tb));
    }

    #[test]
    fn merged_and_previews_share_one_floor() {
        let mut arb = PlaybackArbiter::new();
        let p = AudibleSource::Preview(Uuid::new_v4());

        let tp = arb.acquire(p);
        let tm = arb.acquire(AudibleSource::Merged);
        assert!(!arb.is_current(p, tp));
        assert!(arb.is_current(AudibleSource::Merged, tm));
    }

    #[test]
    fn stale_release_does_not_steal_the_floor() {
        let mut arb = PlaybackArbiter::new();
        let a = AudibleSource::Preview(Uuid::new_v4());

        let _ta = arb.acquire(a);
        let tm = arb.acquire(AudibleSource::Merged);

        // a finished late and releases — Merged must keep the floor.
        arb.release(a);
        assert!(arb.is_current(AudibleSource::Merged, tm));
        assert_eq!(arb.holder(), Some(AudibleSource::Merged));
    }

    #[test]
    fn release_is_idempotent() {
        let mut arb = PlaybackArbiter::new();
        let a = AudibleSource::Preview(Uuid::new_v4());
        arb.acquire(a);
        arb.release(a);
        arb.release(a);
        assert_eq!(arb.holder(), None);
    }

    #[test]
    fn reacquiring_same_source_bumps_generation() {
        // A seek restarts playback — the old token must go stale so a racing
        // tick for the old run can't keep polling as if it were live.
        let mut arb = PlaybackArbiter::new();
        let a = AudibleSource::Preview(Uuid::new_v4());
        let t1 = arb.acquire(a);
        let t2 = arb.acquire(a);
        assert!(!arb.is_current(a, t1));
        assert!(arb.is_current(a, t2));
    }
}
