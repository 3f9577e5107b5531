//! Timed effects keyed on the session clock
//!
//! Each entry is stamped with the session generation when scheduled. A
//! restart bumps the generation, so anything still queued from the previous
//! run is dropped when it comes due instead of firing.

use super::state::GameOverReport;

/// Deferred state change
#[derive(Debug, Clone, PartialEq)]
pub enum TimedEffect {
    /// Undo a single-mode Speed pickup for player `id`
    RevertSpeed(u8),
    /// Duel shield expiry
    ClearShield(u8),
    /// Duel speed boost expiry
    ClearSpeedBoost(u8),
    /// Delayed duel game-over notification
    AnnounceGameOver(GameOverReport),
}

#[derive(Debug, Clone)]
struct Scheduled {
    due_ms: f64,
    generation: u32,
    seq: u64,
    effect: TimedEffect,
}

#[derive(Debug, Clone, Default)]
pub struct TimerQueue {
    entries: Vec<Scheduled>,
    next_seq: u64,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due_ms: f64, generation: u32, effect: TimedEffect) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.push(Scheduled {
            due_ms,
            generation,
            seq,
            effect,
        });
    }

    /// Remove every entry due at `now_ms`, returning those that belong to
    /// `generation` in due order (ties in scheduling order)
    pub fn drain_due(&mut self, now_ms: f64, generation: u32) -> Vec<TimedEffect> {
        let mut due = Vec::new();
        for i in (0..self.entries.len()).rev() {
            if self.entries[i].due_ms <= now_ms {
                let entry = self.entries.remove(i);
                if entry.generation == generation {
                    due.push(entry);
                } else {
                    log::debug!("Dropping stale timed effect {:?}", entry.effect);
                }
            }
        }
        due.sort_by(|a, b| a.due_ms.total_cmp(&b.due_ms).then(a.seq.cmp(&b.seq)));
        due.into_iter().map(|e| e.effect).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pending effects without draining them
    pub fn pending(&self) -> impl Iterator<Item = &TimedEffect> {
        self.entries.iter().map(|e| &e.effect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_in_due_order() {
        let mut q = TimerQueue::new();
        q.schedule(300.0, 0, TimedEffect::ClearShield(1));
        q.schedule(100.0, 0, TimedEffect::RevertSpeed(1));
        q.schedule(100.0, 0, TimedEffect::ClearSpeedBoost(2));
        q.schedule(900.0, 0, TimedEffect::ClearShield(2));

        let due = q.drain_due(300.0, 0);
        assert_eq!(
            due,
            vec![
                TimedEffect::RevertSpeed(1),
                TimedEffect::ClearSpeedBoost(2),
                TimedEffect::ClearShield(1),
            ]
        );
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn test_stale_generation_is_dropped() {
        let mut q = TimerQueue::new();
        q.schedule(100.0, 0, TimedEffect::RevertSpeed(1));
        q.schedule(100.0, 1, TimedEffect::ClearShield(1));

        let due = q.drain_due(500.0, 1);
        assert_eq!(due, vec![TimedEffect::ClearShield(1)]);
        assert!(q.is_empty());
    }

    #[test]
    fn test_nothing_due_yet() {
        let mut q = TimerQueue::new();
        q.schedule(100.0, 0, TimedEffect::RevertSpeed(1));
        assert!(q.drain_due(99.9, 0).is_empty());
        assert_eq!(q.len(), 1);
    }
}
