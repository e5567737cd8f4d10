//! Timestep scheduler.
//!
//! Each dataset category runs on its own clock (index, interval, elapsed
//! accumulator); all clocks share one pause flag. Every index change fires,
//! in order: evict the frame two steps behind, request the frame
//! `lookahead` steps ahead, broadcast the new index to subscribers. Nothing
//! on this path blocks; loads resolve in the background via the
//! [`FrameLoader`] sink.
//!
//! Series of different lengths wrap together: the first clock to exhaust its
//! own frame count resets to 0 and forces every other clock to walk its
//! remaining indices (firing their prefetch/evict side effects) and park just
//! before the wrap, so its next tick lands on 0. The playback loop is as long
//! as the shortest series.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use crossbeam::channel::{self, Receiver, Sender};

use crate::assets::FrameSequence;
use crate::cache::FrameLoader;

/// How many frames ahead of the play head to keep loading.
pub const DEFAULT_LOOKAHEAD: usize = 9;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Category {
    Obstruction,
    Slice,
    Volume,
}

/// Live view of a clock's update interval. Consumers that pace themselves
/// against the clock (the cross-fades) hold a clone and read it every
/// update, so a rate change reaches fades already in flight.
#[derive(Clone, Debug)]
pub struct IntervalHandle(Arc<AtomicU32>);

impl IntervalHandle {
    pub fn new(interval: f32) -> Self {
        Self(Arc::new(AtomicU32::new(interval.to_bits())))
    }

    pub fn get(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }

    pub(crate) fn set(&self, interval: f32) {
        self.0.store(interval.to_bits(), Ordering::Relaxed);
    }
}

struct Clock {
    category: Category,
    time_count: usize,
    interval: IntervalHandle,
    current: usize,
    /// Parked just before the wrap; the next tick lands on 0.
    pending_wrap: bool,
    elapsed: f32,
    sequences: Vec<FrameSequence>,
    listeners: Vec<Sender<usize>>,
}

pub struct Scheduler {
    clocks: Vec<Clock>,
    lookahead: usize,
    paused: bool,
}

impl Scheduler {
    pub fn new(lookahead: usize) -> Self {
        Self {
            clocks: Vec::new(),
            lookahead,
            paused: false,
        }
    }

    /// Adds a frame series to its category's clock. The first registration of
    /// a category fixes the clock's frame count and interval; later series
    /// with a different length still play, but only their first
    /// `time_count` frames are scheduled.
    pub fn register(&mut self, category: Category, interval: f32, sequence: FrameSequence) {
        match self.clock_mut(category) {
            Some(clock) => {
                if sequence.len() != clock.time_count {
                    tracing::warn!(
                        ?category,
                        clock = clock.time_count,
                        series = sequence.len(),
                        "series length differs from its category clock"
                    );
                }
                clock.sequences.push(sequence);
            }
            None => self.clocks.push(Clock {
                category,
                time_count: sequence.len(),
                interval: IntervalHandle::new(interval),
                current: 0,
                pending_wrap: false,
                elapsed: 0.,
                sequences: vec![sequence],
                listeners: Vec::new(),
            }),
        }
    }

    /// Index broadcasts for one category, one message per index change.
    pub fn subscribe(&mut self, category: Category) -> Option<Receiver<usize>> {
        let (tx, rx) = channel::unbounded();
        self.clock_mut(category)?.listeners.push(tx);
        Some(rx)
    }

    pub fn current(&self, category: Category) -> Option<usize> {
        self.clock(category).map(|c| c.current)
    }

    pub fn time_count(&self, category: Category) -> Option<usize> {
        self.clock(category).map(|c| c.time_count)
    }

    /// The live interval of a category's clock, for consumers that pace a
    /// fade against it.
    pub fn interval_handle(&self, category: Category) -> Option<IntervalHandle> {
        self.clock(category).map(|c| c.interval.clone())
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        self.paused
    }

    /// Swaps a clock's tick period. Returns the display time scale
    /// `old / new` relative to the previous rate.
    pub fn set_update_rate(&mut self, category: Category, interval: f32) -> Option<f32> {
        if !(interval > 0.) {
            tracing::warn!(?category, interval, "ignoring non-positive update interval");
            return None;
        }
        let clock = self.clock_mut(category)?;
        let old = clock.interval.get();
        clock.interval.set(interval);
        Some(old / interval)
    }

    /// Cooperative driver: accumulates `dt` seconds on every clock and fires
    /// the ticks that became due. A no-op while paused; elapsed time is kept,
    /// so resuming continues mid-interval instead of restarting.
    pub fn advance(&mut self, dt: f32, loader: &dyn FrameLoader) {
        if self.paused {
            return;
        }
        for clock in &mut self.clocks {
            clock.elapsed += dt;
        }
        loop {
            // Clocks closest to their own wrap tick first, so a wrap drags
            // the other clocks along before they can step past it.
            let mut due: Vec<usize> = (0..self.clocks.len())
                .filter(|&idx| {
                    let clock = &self.clocks[idx];
                    let interval = clock.interval.get();
                    interval > 0. && clock.elapsed >= interval
                })
                .collect();
            if due.is_empty() {
                break;
            }
            due.sort_by_key(|&idx| self.clocks[idx].time_count - self.clocks[idx].current);
            for idx in due {
                // A wrap earlier in this round may have consumed this
                // clock's pending time.
                let interval = self.clocks[idx].interval.get();
                if interval > 0. && self.clocks[idx].elapsed >= interval {
                    self.clocks[idx].elapsed -= interval;
                    self.tick(idx, loader);
                }
            }
        }
    }

    /// Jumps every clock `amount` frames forward. The landing index is
    /// `current + amount - 1`: the jump replaces the tick that would have
    /// advanced playback by one.
    pub fn fast_forward(&mut self, amount: usize, loader: &dyn FrameLoader) {
        if amount == 0 {
            return;
        }
        for idx in 0..self.clocks.len() {
            {
                let clock = &mut self.clocks[idx];
                if clock.time_count == 0 {
                    continue;
                }
                clock.current = (clock.current + amount - 1) % clock.time_count;
                clock.pending_wrap = false;
                clock.elapsed = 0.;
            }
            self.apply(idx, loader);
            self.broadcast(idx);
        }
    }

    /// Jumps every clock back, clamping at the first frame.
    pub fn rewind(&mut self, amount: usize, loader: &dyn FrameLoader) {
        for idx in 0..self.clocks.len() {
            {
                let clock = &mut self.clocks[idx];
                if clock.time_count == 0 {
                    continue;
                }
                clock.current -= amount.min(clock.current);
                clock.pending_wrap = false;
                clock.elapsed = 0.;
            }
            self.apply(idx, loader);
            self.broadcast(idx);
        }
    }

    fn tick(&mut self, idx: usize, loader: &dyn FrameLoader) {
        let wrapped = {
            let clock = &mut self.clocks[idx];
            if clock.time_count == 0 {
                return;
            }
            if clock.pending_wrap {
                clock.pending_wrap = false;
                clock.current = 0;
                false
            } else {
                clock.current += 1;
                if clock.current == clock.time_count {
                    clock.current = 0;
                    true
                } else {
                    false
                }
            }
        };

        self.apply(idx, loader);
        self.broadcast(idx);

        if wrapped {
            for other in 0..self.clocks.len() {
                if other != idx {
                    self.force_wrap(other, loader);
                }
            }
        }
    }

    /// Walks a clock's remaining indices (side effects only, no broadcasts)
    /// and parks it on the last one, so its next tick lands on 0.
    fn force_wrap(&mut self, idx: usize, loader: &dyn FrameLoader) {
        let (start, count) = {
            let clock = &self.clocks[idx];
            if clock.pending_wrap || clock.time_count == 0 {
                return;
            }
            (clock.current, clock.time_count)
        };
        for index in start + 1..count {
            Self::side_effects(&self.clocks[idx], index, self.lookahead, loader);
        }
        let clock = &mut self.clocks[idx];
        clock.current = count - 1;
        clock.pending_wrap = true;
        clock.elapsed = 0.;
    }

    fn apply(&self, idx: usize, loader: &dyn FrameLoader) {
        let clock = &self.clocks[idx];
        Self::side_effects(clock, clock.current, self.lookahead, loader);
    }

    fn side_effects(clock: &Clock, index: usize, lookahead: usize, loader: &dyn FrameLoader) {
        let count = clock.time_count;
        if count == 0 {
            return;
        }
        // Two behind is the oldest frame that can no longer be blending.
        let evict = (index + count - 2) % count;
        let prefetch = (index + lookahead) % count;
        for sequence in &clock.sequences {
            if let Some(handle) = sequence.handle(evict) {
                loader.unload(handle);
            }
            if let Some(handle) = sequence.handle(prefetch) {
                loader.request_load(handle);
            }
        }
    }

    fn broadcast(&mut self, idx: usize) {
        let clock = &mut self.clocks[idx];
        let current = clock.current;
        clock.listeners.retain(|tx| tx.send(current).is_ok());
    }

    fn clock(&self, category: Category) -> Option<&Clock> {
        self.clocks.iter().find(|c| c.category == category)
    }

    fn clock_mut(&mut self, category: Category) -> Option<&mut Clock> {
        self.clocks.iter_mut().find(|c| c.category == category)
    }
}

#[cfg(test)]
mod test {
    use std::path::PathBuf;
    use std::sync::Mutex;

    use super::*;
    use crate::assets::FrameHandle;
    use crate::naming;

    #[derive(Default)]
    struct RecordingLoader {
        loads: Mutex<Vec<usize>>,
        evicts: Mutex<Vec<usize>>,
    }

    impl RecordingLoader {
        fn last_load(&self) -> Option<usize> {
            self.loads.lock().unwrap().last().copied()
        }

        fn last_evict(&self) -> Option<usize> {
            self.evicts.lock().unwrap().last().copied()
        }
    }

    impl FrameLoader for RecordingLoader {
        fn request_load(&self, handle: &FrameHandle) {
            self.loads.lock().unwrap().push(handle.index);
        }

        fn unload(&self, handle: &FrameHandle) {
            self.evicts.lock().unwrap().push(handle.index);
        }
    }

    fn sequence(stem: &str, len: usize) -> FrameSequence {
        let frames = (0..len)
            .map(|index| FrameHandle {
                path: PathBuf::from(format!("{stem}_{index}.raw")),
                name: naming::frame_name(stem, index),
                index,
            })
            .collect();
        FrameSequence::new(stem, frames)
    }

    fn scheduler_with(counts: &[(Category, usize)]) -> Scheduler {
        let mut scheduler = Scheduler::new(DEFAULT_LOOKAHEAD);
        for &(category, len) in counts {
            scheduler.register(category, 1., sequence("S", len));
        }
        scheduler
    }

    #[test]
    fn ticks_fire_when_the_interval_elapses() {
        let loader = RecordingLoader::default();
        let mut scheduler = scheduler_with(&[(Category::Slice, 10)]);
        let rx = scheduler.subscribe(Category::Slice).unwrap();

        scheduler.advance(0.6, &loader);
        assert_eq!(scheduler.current(Category::Slice), Some(0));
        assert!(rx.try_recv().is_err());

        scheduler.advance(0.6, &loader);
        assert_eq!(scheduler.current(Category::Slice), Some(1));
        assert_eq!(rx.try_recv(), Ok(1));
    }

    #[test]
    fn eviction_never_hits_the_blend_window() {
        let loader = RecordingLoader::default();
        let count = 10;
        let mut scheduler = scheduler_with(&[(Category::Volume, count)]);

        for _ in 0..35 {
            scheduler.advance(1., &loader);
            let current = scheduler.current(Category::Volume).unwrap();
            let evicted = loader.last_evict().unwrap();
            assert_eq!(evicted, (current + count - 2) % count);
            assert_ne!(evicted, current);
            assert_ne!(evicted, (current + count - 1) % count);
        }
    }

    #[test]
    fn prefetch_runs_ahead_of_the_play_head() {
        let loader = RecordingLoader::default();
        let mut scheduler = scheduler_with(&[(Category::Volume, 30)]);

        for _ in 0..12 {
            scheduler.advance(1., &loader);
            let current = scheduler.current(Category::Volume).unwrap();
            assert_eq!(loader.last_load(), Some((current + 9) % 30));
        }
    }

    #[test]
    fn unequal_series_wrap_together() {
        let loader = RecordingLoader::default();
        let mut scheduler = scheduler_with(&[
            (Category::Obstruction, 10),
            (Category::Slice, 15),
            (Category::Volume, 20),
        ]);

        for _ in 0..9 {
            scheduler.advance(1., &loader);
        }
        assert_eq!(scheduler.current(Category::Obstruction), Some(9));
        assert_eq!(scheduler.current(Category::Slice), Some(9));
        assert_eq!(scheduler.current(Category::Volume), Some(9));

        // Shortest series exhausts its frames and drags the others to the
        // brink of their own wrap.
        scheduler.advance(1., &loader);
        assert_eq!(scheduler.current(Category::Obstruction), Some(0));
        assert_eq!(scheduler.current(Category::Slice), Some(14));
        assert_eq!(scheduler.current(Category::Volume), Some(19));

        scheduler.advance(1., &loader);
        assert_eq!(scheduler.current(Category::Slice), Some(0));
        assert_eq!(scheduler.current(Category::Volume), Some(0));
        assert_eq!(scheduler.current(Category::Obstruction), Some(1));
    }

    #[test]
    fn longer_series_never_outrun_the_wrap() {
        let loader = RecordingLoader::default();
        // Registration order must not matter: even listed first, the longer
        // series may not step past index 9 before the short one wraps.
        let mut scheduler = scheduler_with(&[
            (Category::Volume, 20),
            (Category::Slice, 15),
            (Category::Obstruction, 10),
        ]);
        let rx = scheduler.subscribe(Category::Volume).unwrap();

        for _ in 0..11 {
            scheduler.advance(1., &loader);
        }
        assert_eq!(scheduler.current(Category::Volume), Some(0));
        // The walk to the park position fires no broadcasts, so consumers
        // only ever see the shared 0..=9 loop.
        while let Ok(index) = rx.try_recv() {
            assert!(index <= 9, "volume broadcast index {index}");
        }
    }

    #[test]
    fn skipped_frames_still_get_side_effects() {
        let loader = RecordingLoader::default();
        let mut scheduler =
            scheduler_with(&[(Category::Obstruction, 10), (Category::Slice, 15)]);

        for _ in 0..10 {
            scheduler.advance(1., &loader);
        }
        // The slice clock walked indices 10..=14. Walked indices 12..=14
        // evict (index + 13) % 15 = 10, 11, 12; no regular tick of either
        // clock can produce those eviction indices.
        let evicts = loader.evicts.lock().unwrap();
        for evicted in 10..13 {
            assert!(evicts.contains(&evicted), "missing evict {evicted} from the wrap walk");
        }
    }

    #[test]
    fn fast_forward_lands_one_short_of_the_amount() {
        let loader = RecordingLoader::default();
        let mut scheduler = scheduler_with(&[(Category::Volume, 30)]);
        let rx = scheduler.subscribe(Category::Volume).unwrap();

        scheduler.fast_forward(25, &loader);
        assert_eq!(scheduler.current(Category::Volume), Some(24));
        assert_eq!(rx.try_recv(), Ok(24));
        assert_eq!(loader.last_load(), Some((24 + 9) % 30));
    }

    #[test]
    fn rewind_clamps_at_the_first_frame() {
        let loader = RecordingLoader::default();
        let mut scheduler = scheduler_with(&[(Category::Volume, 30)]);

        for _ in 0..5 {
            scheduler.advance(1., &loader);
        }
        assert_eq!(scheduler.current(Category::Volume), Some(5));

        scheduler.rewind(25, &loader);
        assert_eq!(scheduler.current(Category::Volume), Some(0));
    }

    #[test]
    fn pause_preserves_elapsed_time() {
        let loader = RecordingLoader::default();
        let mut scheduler = scheduler_with(&[(Category::Slice, 10)]);

        scheduler.advance(0.7, &loader);
        assert!(scheduler.toggle_pause());
        scheduler.advance(5., &loader);
        assert_eq!(scheduler.current(Category::Slice), Some(0));

        assert!(!scheduler.toggle_pause());
        scheduler.advance(0.4, &loader);
        assert_eq!(scheduler.current(Category::Slice), Some(1));
    }

    #[test]
    fn update_rate_swap_returns_the_display_scale() {
        let mut scheduler = scheduler_with(&[(Category::Slice, 10)]);
        assert_eq!(scheduler.set_update_rate(Category::Slice, 0.5), Some(2.));
        assert_eq!(scheduler.set_update_rate(Category::Slice, 2.), Some(0.25));
        assert_eq!(scheduler.set_update_rate(Category::Slice, 0.), None);
        assert_eq!(scheduler.set_update_rate(Category::Volume, 1.), None);
    }
}
