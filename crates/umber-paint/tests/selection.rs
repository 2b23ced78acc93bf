//! End-to-end paint configuration and pipeline selection against a recording
//! backend.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Barrier, Mutex};

use umber_paint::encode::{LinearProjection, PaintUniforms, StopTable};
use umber_paint::logging::{init_logging, LoggingConfig};
use umber_paint::paint::ColorSpace;
use umber_paint::{
    Affine, Composite, CompositeRule, CycleMethod, ErrorKind, PaintError, PaintKind, PaintState,
    PipelineBuilder, PipelineDescriptor, PipelineSelector, PipelineStateStorage, Pixel, RasterFlags,
    Vec2,
};

const RED: Pixel = Pixel(0xffff0000);
const BLUE: Pixel = Pixel(0xff0000ff);

/// Records every descriptor it is asked to build.
#[derive(Default)]
struct Recorder {
    built: Mutex<Vec<PipelineDescriptor>>,
    calls: AtomicU64,
}

impl PipelineBuilder for Recorder {
    type Pipeline = PipelineDescriptor;

    fn build(&self, d: &PipelineDescriptor) -> anyhow::Result<PipelineDescriptor> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(std::time::Duration::from_millis(5));
        self.built.lock().unwrap().push(*d);
        Ok(*d)
    }
}

fn storage() -> PipelineStateStorage<Recorder> {
    init_logging(LoggingConfig::for_tests());
    PipelineStateStorage::new(Recorder::default())
}

const SRC: RasterFlags = RasterFlags::PREMULTIPLIED;
const DST: RasterFlags = RasterFlags::PREMULTIPLIED;

fn red_to_blue(state: &mut PaintState) {
    state
        .set_linear_gradient(
            false,
            false,
            CycleMethod::NoCycle,
            Vec2::new(0.0, 0.0),
            Vec2::new(100.0, 0.0),
            Vec2::new(0.0, 100.0),
            &[0.0, 1.0],
            &[RED, BLUE],
        )
        .unwrap();
}

// ── linear gradient draw ──────────────────────────────────────────────────

#[test]
fn red_to_blue_linear_gradient() {
    let storage = storage();
    let mut state = PaintState::new();
    let mut selector = PipelineSelector::new();
    red_to_blue(&mut state);

    let handle = selector
        .select(&state, CompositeRule::SrcOver, false, SRC, DST, &storage)
        .unwrap();
    assert_eq!(handle.kind, PaintKind::LinearGradient);
    assert_eq!(handle.cycle, Some(CycleMethod::NoCycle));
    assert_eq!(handle.filter, None);

    let u = PaintUniforms::encode(&state, &Composite::default(), [100.0, 100.0]).unwrap();
    assert_eq!(u.num_stops, 2);
    assert_eq!(u.colors[0], [1.0, 0.0, 0.0, 1.0]);
    assert_eq!(u.colors[1], [0.0, 0.0, 1.0, 1.0]);

    let proj = LinearProjection { a: u.linear[0], b: u.linear[1], c: u.linear[2] };
    let mid = proj.eval(Vec2::new(50.0, 37.0));
    assert!((mid - 0.5).abs() < 1e-5);

    let table = StopTable::from_stops(
        &umber_paint::paint::GradientStops::new(&[0.0, 1.0], &[RED, BLUE]).unwrap(),
        ColorSpace::Srgb,
    );
    let c = table.sample(mid, CycleMethod::NoCycle).to_array();
    assert!((c[0] - 0.5).abs() < 1e-3);
    assert!((c[2] - 0.5).abs() < 1e-3);
}

#[test]
fn composite_rule_changes_the_pipeline_only() {
    let storage = storage();
    let mut state = PaintState::new();
    let mut selector = PipelineSelector::new();
    red_to_blue(&mut state);

    let over = selector.select(&state, CompositeRule::SrcOver, false, SRC, DST, &storage).unwrap();
    let src = selector.select(&state, CompositeRule::Src, false, SRC, DST, &storage).unwrap();
    assert_ne!(over, src);

    // Extra alpha is a uniform; it never reaches the descriptor.
    let half = Composite::new(CompositeRule::SrcOver, 0.5).unwrap();
    let again = selector.select(&state, half.rule, false, SRC, DST, &storage).unwrap();
    assert_eq!(again, over);
    assert_eq!(storage.build_count(), 2);
}

#[test]
fn identical_calls_return_identical_handles() {
    let storage = storage();
    let mut state = PaintState::new();
    let mut a = PipelineSelector::new();
    let mut b = PipelineSelector::new();
    state.set_color(RED).unwrap();

    let h1 = a.select(&state, CompositeRule::SrcOver, false, SRC, DST, &storage).unwrap();
    let h2 = a.select(&state, CompositeRule::SrcOver, false, SRC, DST, &storage).unwrap();
    let h3 = b.select(&state, CompositeRule::SrcOver, false, SRC, DST, &storage).unwrap();
    assert_eq!(h1, h2);
    assert_eq!(h1, h3);
    assert_eq!(storage.build_count(), 1);
}

// ── concurrency ───────────────────────────────────────────────────────────

#[test]
fn contexts_on_many_threads_build_once() {
    const THREADS: usize = 6;
    let storage = Arc::new(storage());
    let barrier = Arc::new(Barrier::new(THREADS));

    let workers: Vec<_> = (0..THREADS)
        .map(|_| {
            let storage = Arc::clone(&storage);
            let barrier = Arc::clone(&barrier);
            std::thread::spawn(move || {
                let mut state = PaintState::new();
                let mut selector = PipelineSelector::new();
                red_to_blue(&mut state);
                barrier.wait();
                selector
                    .select(&state, CompositeRule::SrcOver, false, SRC, DST, &storage)
                    .unwrap()
            })
        })
        .collect();

    let handles: Vec<_> = workers.into_iter().map(|w| w.join().unwrap()).collect();
    assert!(handles.iter().all(|h| *h == handles[0]));
    assert_eq!(storage.builder().calls.load(Ordering::SeqCst), 1);
    assert_eq!(storage.builder().built.lock().unwrap().len(), 1);
}

// ── two-color shortcut ────────────────────────────────────────────────────

#[test]
fn two_color_shortcut_matches_explicit_two_stop_gradient() {
    let storage = storage();
    let mut selector = PipelineSelector::new();
    let (p0, p1, p3) = (Vec2::new(0.0, 0.0), Vec2::new(20.0, 0.0), Vec2::new(0.0, 20.0));

    for (cyclic, cycle) in [(true, CycleMethod::Reflect), (false, CycleMethod::NoCycle)] {
        let mut shortcut = PaintState::new();
        shortcut.set_gradient(false, cyclic, p0, p1, p3, RED, BLUE).unwrap();

        let mut explicit = PaintState::new();
        explicit
            .set_linear_gradient(false, false, cycle, p0, p1, p3, &[0.0, 1.0], &[RED, BLUE])
            .unwrap();

        assert_eq!(shortcut, explicit);
        let a = selector.select(&shortcut, CompositeRule::SrcOver, false, SRC, DST, &storage).unwrap();
        let b = selector.select(&explicit, CompositeRule::SrcOver, false, SRC, DST, &storage).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.cycle, Some(cycle));

        let c = Composite::default();
        let ua = PaintUniforms::encode(&shortcut, &c, [20.0, 20.0]).unwrap();
        let ub = PaintUniforms::encode(&explicit, &c, [20.0, 20.0]).unwrap();
        assert_eq!(ua, ub);
    }
}

#[test]
fn linear_rgb_interpolation_shares_the_pipeline() {
    let storage = storage();
    let mut selector = PipelineSelector::new();
    let (p0, p1, p3) = (Vec2::new(0.0, 0.0), Vec2::new(20.0, 0.0), Vec2::new(0.0, 20.0));

    let mut srgb = PaintState::new();
    srgb.set_linear_gradient(false, false, CycleMethod::Repeat, p0, p1, p3, &[0.0, 1.0], &[RED, BLUE])
        .unwrap();
    let mut linear = PaintState::new();
    linear
        .set_linear_gradient(false, true, CycleMethod::Repeat, p0, p1, p3, &[0.0, 1.0], &[RED, BLUE])
        .unwrap();

    let a = selector.select(&srgb, CompositeRule::SrcOver, false, SRC, DST, &storage).unwrap();
    let b = selector.select(&linear, CompositeRule::SrcOver, false, SRC, DST, &storage).unwrap();
    assert_eq!(a, b);
}

// ── rejected configurations ───────────────────────────────────────────────

#[test]
fn degenerate_gradient_never_reaches_selection() {
    let storage = storage();
    let mut selector = PipelineSelector::new();
    let mut state = PaintState::new();
    let p = Vec2::new(3.0, 3.0);

    let err = state.set_gradient(false, false, p, p, Vec2::new(3.0, 4.0), RED, BLUE).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidParameter);

    let err = selector
        .select(&state, CompositeRule::SrcOver, false, SRC, DST, &storage)
        .unwrap_err();
    assert_eq!(err, PaintError::NoActivePaint);
    assert_eq!(storage.build_count(), 0);
}

#[test]
fn radial_focus_must_stay_inside_the_circle() {
    let mut state = PaintState::new();
    let set = |state: &mut PaintState, fx: f32| {
        state.set_radial_gradient(
            false,
            false,
            CycleMethod::NoCycle,
            Affine::IDENTITY,
            fx,
            &[0.0, 0.5, 1.0],
            &[RED, BLUE, RED],
        )
    };

    assert!(set(&mut state, 0.0).is_ok());
    assert!(set(&mut state, -0.999).is_ok());
    for fx in [1.0, -1.0, 1.5, f32::NAN] {
        let err = set(&mut state, fx).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
    }
    assert_eq!(state.paint().kind(), Some(PaintKind::RadialGradient));
}

#[test]
fn stop_tables_are_validated() {
    let mut state = PaintState::new();
    let (p0, p1, p3) = (Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0));
    let mut set = |fractions: &[f32], pixels: &[Pixel]| {
        state.set_linear_gradient(false, false, CycleMethod::NoCycle, p0, p1, p3, fractions, pixels)
    };

    assert!(set(&[0.0, 0.5, 1.0], &[RED, BLUE]).is_err());
    assert!(set(&[0.0, 0.6, 0.4, 1.0], &[RED, BLUE, RED, BLUE]).is_err());
    assert!(set(&[0.0], &[RED]).is_err());

    let fractions: Vec<f32> = (0..13).map(|i| i as f32 / 12.0).collect();
    let pixels = vec![RED; 13];
    assert!(set(&fractions, &pixels).is_err());
    let twelve: Vec<f32> = (0..12).map(|i| i as f32 / 11.0).collect();
    assert!(set(&twelve, &pixels[..12]).is_ok());
}

// ── invalidation ──────────────────────────────────────────────────────────

#[test]
fn invalidation_is_seen_by_every_selector() {
    let storage = storage();
    let mut state = PaintState::new();
    state.set_color(BLUE).unwrap();
    let mut a = PipelineSelector::new();
    let mut b = PipelineSelector::new();

    let first = a.select(&state, CompositeRule::Xor, false, SRC, DST, &storage).unwrap();
    b.select(&state, CompositeRule::Xor, false, SRC, DST, &storage).unwrap();

    storage.invalidate_all();

    let second = b.select(&state, CompositeRule::Xor, false, SRC, DST, &storage).unwrap();
    let third = a.select(&state, CompositeRule::Xor, false, SRC, DST, &storage).unwrap();
    assert_ne!(first, second);
    assert_eq!(second, third);
    assert_eq!(storage.build_count(), 2);
}
