use std::collections::HashMap;
use std::ops::Deref;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use crate::error::{PaintError, Result};

use super::PipelineDescriptor;

/// Pipeline compilation backend.
///
/// Called at most once per descriptor per storage (until invalidated). Failures
/// are reported as `BuildFailure` and are not retried for that descriptor.
pub trait PipelineBuilder: Send + Sync {
    type Pipeline: Send + Sync;

    fn build(&self, descriptor: &PipelineDescriptor) -> anyhow::Result<Self::Pipeline>;
}

/// Shared reference to a built pipeline.
///
/// Cheap to clone. Two handles are equal iff they refer to the same build.
pub struct PipelineHandle<P> {
    id: u64,
    pipeline: Arc<P>,
}

impl<P> PipelineHandle<P> {
    /// Build identity, unique within one storage.
    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl<P> Clone for PipelineHandle<P> {
    fn clone(&self) -> Self {
        Self { id: self.id, pipeline: Arc::clone(&self.pipeline) }
    }
}

impl<P> PartialEq for PipelineHandle<P> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && Arc::ptr_eq(&self.pipeline, &other.pipeline)
    }
}

impl<P> Eq for PipelineHandle<P> {}

impl<P> Deref for PipelineHandle<P> {
    type Target = P;

    fn deref(&self) -> &P {
        &self.pipeline
    }
}

impl<P> std::fmt::Debug for PipelineHandle<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineHandle").field("id", &self.id).finish_non_exhaustive()
    }
}

/// One descriptor's build. A slot invalidated while its build is still
/// running stays in the map marked stale, so later requests wait for that
/// build instead of starting a second one, then retry on a fresh slot.
struct SlotState<P> {
    cell: OnceLock<Result<PipelineHandle<P>>>,
    stale: AtomicBool,
}

impl<P> Default for SlotState<P> {
    fn default() -> Self {
        Self { cell: OnceLock::new(), stale: AtomicBool::new(false) }
    }
}

impl<P> SlotState<P> {
    #[inline]
    fn is_stale(&self) -> bool {
        self.stale.load(Ordering::Acquire)
    }

    #[inline]
    fn is_built(&self) -> bool {
        self.cell.get().is_some()
    }
}

type Slot<P> = Arc<SlotState<P>>;

/// Device-lifetime pipeline cache shared by every rendering context.
///
/// Concurrency:
/// - the map lock is held only to find or insert a descriptor's slot
/// - the build itself runs inside the slot's one-time initialization, so
///   concurrent requests for one descriptor wait for and reuse a single build
///   while different descriptors build in parallel
/// - at most one build per descriptor runs at a time, even across invalidation
///
/// Share it via `Arc`; the storage never evicts on its own.
pub struct PipelineStateStorage<B: PipelineBuilder> {
    id: u64,
    builder: B,
    slots: Mutex<HashMap<PipelineDescriptor, Slot<B::Pipeline>>>,
    next_id: AtomicU64,
    builds: AtomicU64,
    generation: AtomicU64,
}

impl<B: PipelineBuilder> PipelineStateStorage<B> {
    pub fn new(builder: B) -> Self {
        static NEXT_STORAGE: AtomicU64 = AtomicU64::new(1);
        Self {
            id: NEXT_STORAGE.fetch_add(1, Ordering::Relaxed),
            builder,
            slots: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            builds: AtomicU64::new(0),
            generation: AtomicU64::new(0),
        }
    }

    /// Process-unique storage identity.
    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[inline]
    pub fn builder(&self) -> &B {
        &self.builder
    }

    /// Returns the cached pipeline for `descriptor`, building it on first use.
    ///
    /// A build failure is cached: later requests for the same descriptor get the
    /// same `BuildFailure` without rebuilding.
    pub fn lookup_or_build(
        &self,
        descriptor: &PipelineDescriptor,
    ) -> Result<PipelineHandle<B::Pipeline>> {
        loop {
            let slot = {
                let mut slots = self.lock_slots();
                Arc::clone(slots.entry(*descriptor).or_default())
            };

            let result = match slot.cell.get() {
                Some(done) => {
                    log::trace!("pipeline cache hit: {descriptor}");
                    done
                }
                None => slot.cell.get_or_init(|| self.build(descriptor)),
            };
            if !slot.is_stale() {
                return result.clone();
            }

            // Invalidated mid-build: retire the slot (unless another waiter
            // already did) and build again.
            log::debug!("discarding pipeline invalidated during build: {descriptor}");
            let mut slots = self.lock_slots();
            if slots.get(descriptor).is_some_and(|cur| Arc::ptr_eq(cur, &slot)) {
                slots.remove(descriptor);
            }
        }
    }

    /// Returns the cached pipeline without building.
    pub fn get(&self, descriptor: &PipelineDescriptor) -> Option<PipelineHandle<B::Pipeline>> {
        let slot = self.lock_slots().get(descriptor).cloned()?;
        if slot.is_stale() {
            return None;
        }
        slot.cell.get().and_then(|r| r.as_ref().ok().cloned())
    }

    /// Drops the entry for `descriptor`; the next request rebuilds it.
    ///
    /// Handles already given out stay valid for as long as callers hold them.
    /// A build still running is not interrupted; its result is discarded and
    /// the requests waiting on it rebuild once it finishes.
    pub fn invalidate(&self, descriptor: &PipelineDescriptor) {
        let mut slots = self.lock_slots();
        let Some(slot) = slots.get(descriptor) else {
            return;
        };
        if slot.is_built() {
            slots.remove(descriptor);
        } else {
            slot.stale.store(true, Ordering::Release);
        }
        drop(slots);
        self.generation.fetch_add(1, Ordering::AcqRel);
        log::debug!("pipeline invalidated: {descriptor}");
    }

    /// Drops every entry (e.g. after device loss).
    pub fn invalidate_all(&self) {
        let dropped = {
            let mut slots = self.lock_slots();
            let n = slots.len();
            slots.retain(|_, slot| {
                if slot.is_built() {
                    return false;
                }
                slot.stale.store(true, Ordering::Release);
                true
            });
            n
        };
        self.generation.fetch_add(1, Ordering::AcqRel);
        log::debug!("pipeline cache cleared ({dropped} entries)");
    }

    /// Number of cached descriptors, including in-flight and failed builds
    /// but not builds already invalidated.
    pub fn len(&self) -> usize {
        self.lock_slots().values().filter(|slot| !slot.is_stale()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total number of builds attempted over the storage lifetime.
    #[inline]
    pub fn build_count(&self) -> u64 {
        self.builds.load(Ordering::Acquire)
    }

    /// Incremented on every invalidation.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    fn build(&self, descriptor: &PipelineDescriptor) -> Result<PipelineHandle<B::Pipeline>> {
        self.builds.fetch_add(1, Ordering::AcqRel);
        log::debug!("building pipeline: {descriptor}");

        match self.builder.build(descriptor) {
            Ok(pipeline) => Ok(PipelineHandle {
                id: self.next_id.fetch_add(1, Ordering::Relaxed),
                pipeline: Arc::new(pipeline),
            }),
            Err(err) => {
                log::warn!("pipeline build failed for {descriptor}: {err:#}");
                Err(PaintError::BuildFailure {
                    descriptor: *descriptor,
                    message: format!("{err:#}"),
                })
            }
        }
    }

    fn lock_slots(&self) -> MutexGuard<'_, HashMap<PipelineDescriptor, Slot<B::Pipeline>>> {
        // Slots are only inserted or removed under the lock; a panic elsewhere
        // cannot leave the map half-updated.
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composite::CompositeRule;
    use crate::paint::PaintKind;
    use crate::surface::RasterFlags;
    use std::sync::Barrier;
    use std::time::Duration;

    /// Counts builds and fails for `Clear`.
    #[derive(Default)]
    struct CountingBuilder {
        calls: AtomicU64,
        active: AtomicU64,
        peak: AtomicU64,
        delay: Option<Duration>,
    }

    impl PipelineBuilder for CountingBuilder {
        type Pipeline = PipelineDescriptor;

        fn build(&self, descriptor: &PipelineDescriptor) -> anyhow::Result<Self::Pipeline> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let running = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(running, Ordering::SeqCst);
            if let Some(d) = self.delay {
                std::thread::sleep(d);
            }
            self.active.fetch_sub(1, Ordering::SeqCst);
            anyhow::ensure!(descriptor.rule != CompositeRule::Clear, "clear is not supported");
            Ok(*descriptor)
        }
    }

    fn desc(rule: CompositeRule) -> PipelineDescriptor {
        PipelineDescriptor {
            kind: PaintKind::Color,
            use_mask: false,
            cycle: None,
            filter: None,
            is_texture: false,
            rule,
            src_flags: RasterFlags::PREMULTIPLIED,
            dst_flags: RasterFlags::PREMULTIPLIED,
        }
    }

    // ── lookup ────────────────────────────────────────────────────────────

    #[test]
    fn second_lookup_reuses_build() {
        let storage = PipelineStateStorage::new(CountingBuilder::default());
        let a = storage.lookup_or_build(&desc(CompositeRule::SrcOver)).unwrap();
        let b = storage.lookup_or_build(&desc(CompositeRule::SrcOver)).unwrap();
        assert_eq!(a, b);
        assert_eq!(*a, desc(CompositeRule::SrcOver));
        assert_eq!(storage.build_count(), 1);
        assert_eq!(storage.get(&desc(CompositeRule::SrcOver)), Some(a));
    }

    #[test]
    fn distinct_descriptors_get_distinct_pipelines() {
        let storage = PipelineStateStorage::new(CountingBuilder::default());
        let a = storage.lookup_or_build(&desc(CompositeRule::SrcOver)).unwrap();
        let b = storage.lookup_or_build(&desc(CompositeRule::Src)).unwrap();
        assert_ne!(a, b);
        assert_eq!(storage.len(), 2);
    }

    // ── failures ──────────────────────────────────────────────────────────

    #[test]
    fn failure_is_cached_and_not_retried() {
        let storage = PipelineStateStorage::new(CountingBuilder::default());
        let d = desc(CompositeRule::Clear);
        let e1 = storage.lookup_or_build(&d).unwrap_err();
        let e2 = storage.lookup_or_build(&d).unwrap_err();
        assert_eq!(e1, e2);
        assert_eq!(e1.kind(), crate::ErrorKind::BuildFailure);
        assert_eq!(storage.builder().calls.load(Ordering::SeqCst), 1);
        assert!(storage.get(&d).is_none());

        // Other descriptors are unaffected.
        assert!(storage.lookup_or_build(&desc(CompositeRule::Src)).is_ok());
    }

    // ── invalidation ──────────────────────────────────────────────────────

    #[test]
    fn invalidate_forces_rebuild() {
        let storage = PipelineStateStorage::new(CountingBuilder::default());
        let d = desc(CompositeRule::SrcOver);
        let a = storage.lookup_or_build(&d).unwrap();
        let g0 = storage.generation();
        storage.invalidate(&d);
        assert!(storage.generation() > g0);
        let b = storage.lookup_or_build(&d).unwrap();
        assert_ne!(a, b);
        assert_eq!(storage.build_count(), 2);
    }

    #[test]
    fn invalidate_all_empties_cache() {
        let storage = PipelineStateStorage::new(CountingBuilder::default());
        storage.lookup_or_build(&desc(CompositeRule::SrcOver)).unwrap();
        storage.lookup_or_build(&desc(CompositeRule::Src)).unwrap();
        storage.invalidate_all();
        assert!(storage.is_empty());
    }

    // ── single flight ─────────────────────────────────────────────────────

    #[test]
    fn concurrent_requests_share_one_build() {
        const THREADS: usize = 8;
        let storage = PipelineStateStorage::new(CountingBuilder {
            delay: Some(Duration::from_millis(20)),
            ..Default::default()
        });
        let barrier = Barrier::new(THREADS);
        let d = desc(CompositeRule::SrcAtop);

        let handles: Vec<_> = std::thread::scope(|s| {
            let workers: Vec<_> = (0..THREADS)
                .map(|_| {
                    s.spawn(|| {
                        barrier.wait();
                        storage.lookup_or_build(&d)
                    })
                })
                .collect();
            workers.into_iter().map(|w| w.join().unwrap().unwrap()).collect()
        });

        assert_eq!(storage.builder().calls.load(Ordering::SeqCst), 1);
        assert!(handles.iter().all(|h| *h == handles[0]));
    }

    #[test]
    fn invalidate_during_build_waits_for_it_then_rebuilds_once() {
        let storage = PipelineStateStorage::new(CountingBuilder {
            delay: Some(Duration::from_millis(200)),
            ..Default::default()
        });
        let d = desc(CompositeRule::SrcOver);

        let (a, b) = std::thread::scope(|s| {
            let first = s.spawn(|| storage.lookup_or_build(&d));
            while storage.builder().active.load(Ordering::SeqCst) == 0 {
                std::thread::yield_now();
            }
            storage.invalidate(&d);
            assert!(storage.get(&d).is_none());
            let second = s.spawn(|| storage.lookup_or_build(&d));
            (first.join().unwrap().unwrap(), second.join().unwrap().unwrap())
        });

        assert_eq!(storage.builder().peak.load(Ordering::SeqCst), 1);
        assert_eq!(storage.builder().calls.load(Ordering::SeqCst), 2);
        assert_eq!(a, b);
        assert_eq!(storage.get(&d), Some(a));
        assert_eq!(storage.len(), 1);
    }
}
