//! Cross-fade consumer: the per-entity pair of frames a renderer
//! interpolates between, driven by scheduler broadcasts.

use crossbeam::channel::Receiver;
use ndarray::ArrayView3;

use smokevis_core::geom::IVec4;

use crate::assets::{self, FrameSequence};
use crate::cache::{FrameCache, FrameData};
use crate::scheduler::IntervalHandle;

pub struct CrossFade {
    sequence: FrameSequence,
    /// Live view of the clock's update interval; one full fade takes one
    /// interval, including rate changes mid-fade.
    interval: IntervalHandle,
    updates: Receiver<usize>,
    frame_t0: Option<FrameData>,
    frame_t1: Option<FrameData>,
    blend: f32,
}

impl CrossFade {
    pub fn new(sequence: FrameSequence, interval: IntervalHandle, updates: Receiver<usize>) -> Self {
        Self {
            sequence,
            interval,
            updates,
            frame_t0: None,
            frame_t1: None,
            blend: 0.,
        }
    }

    /// Resolves the frames around `current` before the first broadcast, so
    /// the first visible frame never fades in from nothing.
    pub fn prime(&mut self, cache: &FrameCache, current: usize) {
        let len = self.sequence.len();
        if len == 0 {
            return;
        }
        self.apply(cache, (current + len - 1) % len);
        self.apply(cache, current);
    }

    /// Handles one broadcast: the frame after `index` becomes the blend
    /// target, the previous target becomes the base, and the fade restarts.
    /// An unresolved target keeps the stale pair on screen.
    pub fn apply(&mut self, cache: &FrameCache, index: usize) {
        let len = self.sequence.len();
        if len == 0 {
            return;
        }
        let Some(handle) = self.sequence.handle((index + 1) % len) else {
            return;
        };
        match cache.resolve(handle) {
            Some(data) => {
                self.frame_t0 = self.frame_t1.take();
                self.frame_t1 = Some(data);
                self.blend = 0.;
            }
            None => {
                tracing::warn!(name = %handle.name, "blend target not loaded yet, keeping stale frame");
            }
        }
    }

    /// Per-render update: drains pending broadcasts, then eases the blend
    /// factor toward 1 over one update interval.
    pub fn update(&mut self, dt: f32, cache: &FrameCache) {
        while let Ok(index) = self.updates.try_recv() {
            self.apply(cache, index);
        }
        let interval = self.interval.get();
        if interval > 0. {
            self.blend = (self.blend + dt / interval).clamp(0., 1.);
        }
    }

    /// The pair to interpolate: fade from the first toward the second.
    pub fn frames(&self) -> (Option<&FrameData>, Option<&FrameData>) {
        (self.frame_t0.as_ref(), self.frame_t1.as_ref())
    }

    pub fn blend_factor(&self) -> f32 {
        self.blend
    }

    /// The pair as spatial views shaped by the dataset's dimensions, for
    /// renderers that sample the frames as voxel grids.
    pub fn frame_views(&self, dimensions: IVec4) -> Option<(ArrayView3<'_, u8>, ArrayView3<'_, u8>)> {
        let t0 = assets::frame_view(self.frame_t0.as_deref()?, dimensions)?;
        let t1 = assets::frame_view(self.frame_t1.as_deref()?, dimensions)?;
        Some((t0, t1))
    }
}
