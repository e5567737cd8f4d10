//! Simulation registry: owns the scheduler, the frame cache and the imported
//! dataset metadata, and wires new series into playback.

use std::path::PathBuf;

use crossbeam::channel::Receiver;
use thiserror::Error;

use smokevis_core::meta::DatasetInfo;

use crate::assets::FrameSequence;
use crate::cache::{CacheError, FrameCache};
use crate::import::ImportedDataset;
use crate::scheduler::{Category, IntervalHandle, Scheduler, DEFAULT_LOOKAHEAD};

/// FDS default mass extinction coefficient for soot, m2/kg.
pub const DEFAULT_EXTINCTION_COEFFICIENT: f32 = 8700.;
/// Frames primed synchronously when a series is registered.
pub const DEFAULT_PRELOAD: usize = 10;
const DEFAULT_CACHE_BYTES: u64 = 512 * 1024 * 1024;

/// Explicit runtime configuration; there is no global state.
#[derive(Debug, Clone)]
pub struct Context {
    pub extinction_coefficient: f32,
    pub lookahead: usize,
    pub preload: usize,
    pub output_dir: PathBuf,
}

impl Context {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            extinction_coefficient: DEFAULT_EXTINCTION_COEFFICIENT,
            lookahead: DEFAULT_LOOKAHEAD,
            preload: DEFAULT_PRELOAD,
            output_dir: output_dir.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Cache(#[from] CacheError),
}

pub struct Simulation {
    context: Context,
    cache: FrameCache,
    scheduler: Scheduler,
    datasets: Vec<DatasetInfo>,
}

impl Simulation {
    pub fn new(context: Context) -> Self {
        Self {
            cache: FrameCache::new(DEFAULT_CACHE_BYTES),
            scheduler: Scheduler::new(context.lookahead),
            context,
            datasets: Vec::new(),
        }
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn cache(&self) -> &FrameCache {
        &self.cache
    }

    pub fn datasets(&self) -> &[DatasetInfo] {
        &self.datasets
    }

    /// Adds an imported dataset to playback: each of its series is primed
    /// with the first frames synchronously and joins its category's clock.
    pub fn register(&mut self, dataset: ImportedDataset) -> Result<(), SimError> {
        let category = match &dataset.info {
            DatasetInfo::Boundary(_) => Category::Obstruction,
            DatasetInfo::Slice(_) => Category::Slice,
            DatasetInfo::Volume(_) => Category::Volume,
        };
        let interval = dataset.info.frame_interval();
        let current = self.scheduler.current(category).unwrap_or(0);

        for sequence in dataset.sequences {
            self.preload(&sequence, current)?;
            self.scheduler.register(category, interval, sequence);
        }
        self.datasets.push(dataset.info);
        Ok(())
    }

    fn preload(&self, sequence: &FrameSequence, current: usize) -> Result<(), SimError> {
        let len = sequence.len();
        for step in 0..self.context.preload.min(len) {
            if let Some(handle) = sequence.handle((current + step) % len) {
                self.cache.load_sync(handle)?;
            }
        }
        Ok(())
    }

    pub fn subscribe(&mut self, category: Category) -> Option<Receiver<usize>> {
        self.scheduler.subscribe(category)
    }

    pub fn current(&self, category: Category) -> Option<usize> {
        self.scheduler.current(category)
    }

    /// Live update interval of a category's clock, to pace cross-fades with.
    pub fn interval_handle(&self, category: Category) -> Option<IntervalHandle> {
        self.scheduler.interval_handle(category)
    }

    pub fn advance(&mut self, dt: f32) {
        self.scheduler.advance(dt, &self.cache);
    }

    pub fn fast_forward(&mut self, amount: usize) {
        self.scheduler.fast_forward(amount, &self.cache);
    }

    pub fn rewind(&mut self, amount: usize) {
        self.scheduler.rewind(amount, &self.cache);
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.scheduler.toggle_pause()
    }

    pub fn is_paused(&self) -> bool {
        self.scheduler.is_paused()
    }

    pub fn set_update_rate(&mut self, category: Category, interval: f32) -> Option<f32> {
        self.scheduler.set_update_rate(category, interval)
    }

    /// Merged value range of one quantity across every registered dataset,
    /// for scaling a shared color map.
    pub fn active_range(&self, quantity: &str) -> Option<(f32, f32)> {
        let quantity = quantity.trim().to_lowercase();
        let mut range: Option<(f32, f32)> = None;
        for info in &self.datasets {
            let (min, max) = match info {
                DatasetInfo::Boundary(b) => {
                    match (b.min_values.get(&quantity), b.max_values.get(&quantity)) {
                        (Some(&min), Some(&max)) => (min, max),
                        _ => continue,
                    }
                }
                DatasetInfo::Slice(s) if s.grid.quantity == quantity => {
                    (s.grid.min_value, s.grid.max_value)
                }
                DatasetInfo::Volume(v) if v.grid.quantity == quantity => {
                    (v.grid.min_value, v.grid.max_value)
                }
                _ => continue,
            };
            range = Some(match range {
                Some((lo, hi)) => (lo.min(min), hi.max(max)),
                None => (min, max),
            });
        }
        range
    }
}
