//! Tick benchmark: Measure the scheduler's per-tick cost with full lanes.
//!
//! Target: < 5µs per tick for 20 active items

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use danmaku::{
    DetRng, DisplayBounds, LaneLayout, Placement, Renderer, Scheduler, SchedulerConfig, Size,
    Translation,
};

/// Renderer that does nothing but hand out ids and fixed widths.
struct NullRenderer(u64);

impl Renderer<u32> for NullRenderer {
    type Handle = u64;

    fn materialize(&mut self, _content: &u32, _placement: Placement) -> u64 {
        self.0 += 1;
        self.0
    }

    fn measure(&mut self, _handle: &u64) -> Size {
        Size::new(120.0, 30.0)
    }

    fn animate_translation(&mut self, _handle: &u64, _translation: Translation) {}

    fn cancel_animation(&mut self, _handle: &u64) {}

    fn dispose(&mut self, _handle: u64) {}
}

fn busy_scheduler() -> Scheduler<u32, NullRenderer> {
    let layout = LaneLayout {
        item_height: 30.0,
        vertical_gap: 5.0,
        max_lane_count: 20,
    };
    let config = SchedulerConfig {
        seed: Some(1),
        layout,
        ..SchedulerConfig::default()
    };
    let mut scheduler = Scheduler::new(config, NullRenderer(0)).with_random_source(DetRng::new(9));
    scheduler.configure_lanes(DisplayBounds::new(1920.0, 720.0), layout);
    for i in 0..10_000 {
        scheduler.put_data(i);
    }
    // Fill the pool
    for _ in 0..64 {
        scheduler.tick();
    }
    scheduler
}

fn tick_steady_state(c: &mut Criterion) {
    let mut scheduler = busy_scheduler();

    c.bench_function("tick_steady_state", |b| {
        b.iter(|| {
            if scheduler.pending_len() < 100 {
                for i in 0..1_000 {
                    scheduler.put_data(i);
                }
            }
            black_box(scheduler.tick())
        });
    });
}

fn select_lane(c: &mut Criterion) {
    let scheduler = busy_scheduler();

    c.bench_function("select_lane_20", |b| {
        b.iter(|| black_box(scheduler.select_lane()));
    });
}

criterion_group!(benches, tick_steady_state, select_lane);
criterion_main!(benches);
