//! Controller: start/stop lifecycle around a shared scheduler.
//!
//! The controller owns the scheduler behind a mutex, the command channel and
//! at most one tick loop. Content always reaches the scheduler through the
//! channel, so the tick loop is the only writer of lane and pool state while
//! it runs.

use super::messages::{Command, Producer};
use super::ticker::TickLoop;
use crate::config::{LaneLayout, SchedulerConfig};
use crate::error::ControllerError;
use crate::render::Renderer;
use crate::scheduler::{DisplayBounds, Scheduler, SchedulerSnapshot};
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;
use tracing::{error, info, warn};

type CleanupHook = Arc<dyn Fn() + Send + Sync>;

/// Runs a [`Scheduler`] on its own tick thread.
///
/// # Example
///
/// ```rust,ignore
/// use danmaku::{DanmakuController, DisplayBounds, SchedulerConfig};
///
/// let mut controller = DanmakuController::new(SchedulerConfig::default(), renderer);
/// controller.configure_lanes(DisplayBounds::new(1280.0, 200.0))?;
/// controller.start()?;
///
/// let producer = controller.producer();
/// std::thread::spawn(move || producer.put("hello".to_string()));
///
/// controller.stop()?;
/// ```
pub struct DanmakuController<T, R: Renderer<T>> {
    /// Scheduler shared with the tick thread.
    scheduler: Arc<Mutex<Scheduler<T, R>>>,
    /// Command sender handed to producers.
    commands: Sender<Command<T>>,
    /// Command receiver handed to each tick loop.
    inbox: Receiver<Command<T>>,
    /// The running tick loop, if any.
    ticker: Option<TickLoop>,
    /// Fired after the grace delay following `stop()`.
    cleanup: Option<CleanupHook>,
    interval: Duration,
    grace: Duration,
}

impl<T, R> DanmakuController<T, R>
where
    T: Send + 'static,
    R: Renderer<T> + Send + 'static,
    R::Handle: Send + 'static,
{
    /// Create a stopped controller around a fresh scheduler.
    pub fn new(config: SchedulerConfig, renderer: R) -> Self {
        Self::from_scheduler(Scheduler::new(config, renderer))
    }

    /// Create a stopped controller around an existing scheduler.
    pub fn from_scheduler(scheduler: Scheduler<T, R>) -> Self {
        let (commands, inbox) = unbounded();
        let interval = scheduler.config().tick_interval();
        let grace = scheduler.config().cleanup_grace();
        Self {
            scheduler: Arc::new(Mutex::new(scheduler)),
            commands,
            inbox,
            ticker: None,
            cleanup: None,
            interval,
            grace,
        }
    }

    /// Check if the tick loop is running.
    pub const fn is_running(&self) -> bool {
        self.ticker.is_some()
    }

    /// A handle other threads can use to feed content.
    pub fn producer(&self) -> Producer<T> {
        Producer::new(self.commands.clone())
    }

    /// Send content towards the pending queue.
    ///
    /// While stopped, content waits in the channel until the next `start()`.
    pub fn put_data(&self, content: T) {
        // The controller holds the receiver, so the channel cannot be disconnected
        let _ = self.commands.send(Command::Put(content));
    }

    /// Carve the display into lanes using the configured layout.
    pub fn configure_lanes(&self, bounds: DisplayBounds) -> Result<usize, ControllerError> {
        let layout = self.lock()?.config().layout;
        self.configure_lanes_with(bounds, layout)
    }

    /// Carve the display into lanes using an explicit layout.
    ///
    /// Fails with [`ControllerError::Running`] while the tick loop runs.
    pub fn configure_lanes_with(
        &self,
        bounds: DisplayBounds,
        layout: LaneLayout,
    ) -> Result<usize, ControllerError> {
        if self.is_running() {
            return Err(ControllerError::Running);
        }
        Ok(self.lock()?.configure_lanes(bounds, layout))
    }

    /// Register a callback fired on a helper thread once the grace delay
    /// after `stop()` has passed. It does not wait for animations to finish.
    pub fn on_surface_cleanup(&mut self, hook: impl Fn() + Send + Sync + 'static) {
        self.cleanup = Some(Arc::new(hook));
    }

    /// Start the tick loop. A loop that is already running is stopped first,
    /// keeping its active items, so exactly one loop is ever live.
    pub fn start(&mut self) -> Result<(), ControllerError> {
        if let Some(ticker) = self.ticker.take() {
            if !ticker.stop() {
                error!("tick loop panicked before restart");
                return Err(ControllerError::TickLoopPanicked);
            }
        }

        let ticker = TickLoop::spawn(
            Arc::clone(&self.scheduler),
            self.inbox.clone(),
            self.interval,
        )
        .map_err(ControllerError::Spawn)?;
        self.ticker = Some(ticker);

        info!(interval = ?self.interval, "tick loop started");
        Ok(())
    }

    /// Freeze active items and suspend admission.
    pub fn pause(&self) -> Result<(), ControllerError> {
        if self.is_running() {
            let _ = self.commands.send(Command::Pause);
        } else {
            self.lock()?.pause();
        }
        Ok(())
    }

    /// Undo [`pause`](Self::pause).
    pub fn resume(&self) -> Result<(), ControllerError> {
        if self.is_running() {
            let _ = self.commands.send(Command::Resume);
        } else {
            self.lock()?.resume();
        }
        Ok(())
    }

    /// Capture scheduler state. Blocks while a tick is in flight.
    pub fn snapshot(&self) -> Result<SchedulerSnapshot, ControllerError> {
        Ok(self.lock()?.snapshot())
    }

    /// Run `f` with exclusive access to the scheduler, between ticks.
    pub fn with_scheduler<U>(
        &self,
        f: impl FnOnce(&mut Scheduler<T, R>) -> U,
    ) -> Result<U, ControllerError> {
        let mut scheduler = self.lock()?;
        Ok(f(&mut scheduler))
    }
}

impl<T, R: Renderer<T>> DanmakuController<T, R> {
    /// Stop the tick loop, then cancel and dispose every active item.
    ///
    /// Waits for an in-flight tick to finish rather than interrupting it.
    /// Pending content is kept, including content still in the channel;
    /// pause and resume requests the loop never saw are discarded. Safe to
    /// call when already stopped.
    pub fn stop(&mut self) -> Result<(), ControllerError> {
        let Some(ticker) = self.ticker.take() else {
            return Ok(());
        };
        if !ticker.stop() {
            error!("tick loop panicked");
            return Err(ControllerError::TickLoopPanicked);
        }

        {
            let mut scheduler = self.lock()?;
            for command in self.inbox.try_iter() {
                if let Command::Put(content) = command {
                    scheduler.put_data(content);
                }
            }
            scheduler.halt();
        }
        info!("tick loop stopped");

        if let Some(hook) = self.cleanup.clone() {
            let grace = self.grace;
            let spawned = thread::Builder::new()
                .name("danmaku-cleanup".to_string())
                .spawn(move || {
                    thread::sleep(grace);
                    hook();
                });
            if let Err(e) = spawned {
                warn!(error = %e, "failed to schedule surface cleanup");
            }
        }
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Scheduler<T, R>>, ControllerError> {
        self.scheduler.lock().map_err(|_| ControllerError::Poisoned)
    }
}

impl<T, R: Renderer<T>> Drop for DanmakuController<T, R> {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::tests::{test_config, FixedSource, Recorder, WIDE_100};
    use std::time::Instant;

    fn controller(config: SchedulerConfig) -> DanmakuController<&'static str, Recorder> {
        let scheduler =
            Scheduler::new(config, Recorder::default()).with_random_source(FixedSource(0.5));
        let controller = DanmakuController::from_scheduler(scheduler);
        controller
            .configure_lanes(DisplayBounds::new(1000.0, 120.0))
            .unwrap();
        controller
    }

    fn fast_config() -> SchedulerConfig {
        SchedulerConfig {
            tick_interval_ms: 5,
            cleanup_grace_ms: 20,
            ..test_config()
        }
    }

    fn wait_for(
        controller: &DanmakuController<&'static str, Recorder>,
        pred: impl Fn(&SchedulerSnapshot) -> bool,
    ) -> bool {
        let deadline = Instant::now() + Duration::from_secs(2);
        while Instant::now() < deadline {
            if pred(&controller.snapshot().unwrap()) {
                return true;
            }
            thread::sleep(Duration::from_millis(2));
        }
        false
    }

    #[test]
    fn test_start_admits_and_stop_clears() {
        let mut c = controller(fast_config());
        c.put_data(WIDE_100);
        c.put_data(WIDE_100);
        c.start().unwrap();
        assert!(c.is_running());

        assert!(wait_for(&c, |s| s.pool_len == 2));

        c.stop().unwrap();
        assert!(!c.is_running());
        let snap = c.snapshot().unwrap();
        assert_eq!(snap.pool_len, 0);
        for lane in &snap.lanes {
            assert!(lane.items.is_empty());
            assert!(lane.occupied_width.abs() < f32::EPSILON);
        }

        c.start().unwrap();
        let snap = c.snapshot().unwrap();
        assert_eq!(snap.pool_len, 0);
        c.stop().unwrap();
    }

    #[test]
    fn test_stop_when_idle() {
        let mut c = controller(fast_config());
        c.stop().unwrap();
        c.stop().unwrap();
        assert!(!c.is_running());
    }

    #[test]
    fn test_restart_keeps_single_loop() {
        let mut c = controller(fast_config());
        c.start().unwrap();
        c.start().unwrap();
        assert!(c.is_running());
        c.put_data(WIDE_100);
        assert!(wait_for(&c, |s| s.pool_len == 1));
        c.stop().unwrap();
    }

    #[test]
    fn test_producer_from_other_thread() {
        let mut c = controller(fast_config());
        c.start().unwrap();

        let producer = c.producer();
        let feeder = thread::spawn(move || {
            for _ in 0..3 {
                assert!(producer.put(WIDE_100));
            }
        });
        feeder.join().unwrap();

        // Third item waits for a lane to drain below the display width
        assert!(wait_for(&c, |s| s.pending == 0 && s.pool_len == 3));
        c.stop().unwrap();
    }

    #[test]
    fn test_configure_while_running() {
        let mut c = controller(fast_config());
        c.start().unwrap();
        let err = c
            .configure_lanes(DisplayBounds::new(800.0, 100.0))
            .unwrap_err();
        assert!(matches!(err, ControllerError::Running));
        c.stop().unwrap();
        assert_eq!(c.configure_lanes(DisplayBounds::new(800.0, 100.0)).unwrap(), 2);
    }

    #[test]
    fn test_pause_freezes_items() {
        let mut c = controller(fast_config());
        c.put_data(WIDE_100);
        c.start().unwrap();
        assert!(wait_for(&c, |s| s.pool_len == 1));

        c.pause().unwrap();
        assert!(wait_for(&c, |s| s.paused));
        let frozen = c.snapshot().unwrap();
        thread::sleep(Duration::from_millis(30));
        assert_eq!(c.snapshot().unwrap().lanes, frozen.lanes);

        c.resume().unwrap();
        assert!(wait_for(&c, |s| {
            s.lanes[0].items[0].offset < frozen.lanes[0].items[0].offset
        }));
        c.stop().unwrap();
    }

    #[test]
    fn test_cleanup_hook_after_grace() {
        let mut c = controller(fast_config());
        let (tx, rx) = crossbeam_channel::bounded(1);
        c.on_surface_cleanup(move || {
            let _ = tx.try_send(Instant::now());
        });

        c.start().unwrap();
        let stopped = Instant::now();
        c.stop().unwrap();

        let fired = rx.recv_timeout(Duration::from_secs(1)).unwrap();
        assert!(fired.duration_since(stopped) >= Duration::from_millis(20));
    }

    #[test]
    fn test_with_scheduler_sees_renderer() {
        let mut c = controller(fast_config());
        c.put_data(WIDE_100);
        c.start().unwrap();
        assert!(wait_for(&c, |s| s.pool_len == 1));
        c.stop().unwrap();

        let disposed = c
            .with_scheduler(|s| {
                s.renderer()
                    .count(|e| matches!(e, crate::scheduler::tests::Event::Dispose(_)))
            })
            .unwrap();
        assert_eq!(disposed, 1);
    }

    #[test]
    fn test_pause_before_stop_not_carried_over() {
        let mut c = controller(SchedulerConfig {
            tick_interval_ms: 1000,
            ..test_config()
        });
        c.start().unwrap();
        // First tick has run; the loop now waits out the long interval
        thread::sleep(Duration::from_millis(50));

        c.pause().unwrap();
        c.put_data(WIDE_100);
        c.stop().unwrap();

        let snap = c.snapshot().unwrap();
        assert!(!snap.paused);
        assert_eq!(snap.pending, 1);

        c.start().unwrap();
        assert!(wait_for(&c, |s| !s.paused && s.pool_len == 1 && s.pending == 0));
        c.stop().unwrap();
    }

    #[test]
    fn test_drop_disposes_active_items() {
        let mut c = controller(fast_config());
        c.put_data(WIDE_100);
        c.start().unwrap();
        assert!(wait_for(&c, |s| s.pool_len == 1));

        let shared = Arc::clone(&c.scheduler);
        drop(c);

        let scheduler = shared.lock().unwrap();
        assert!(scheduler.pool().is_empty());
        assert!(scheduler.lanes().iter().all(|l| l.is_empty()));
        let disposed = scheduler
            .renderer()
            .count(|e| matches!(e, crate::scheduler::tests::Event::Dispose(_)));
        assert_eq!(disposed, 1);
    }

    /// Panics as soon as the scheduler tries to materialize anything.
    struct Exploding;

    impl Renderer<&'static str> for Exploding {
        type Handle = ();

        fn materialize(&mut self, _content: &&'static str, _placement: crate::Placement) {
            panic!("materialize failed");
        }

        fn measure(&mut self, _handle: &()) -> crate::Size {
            crate::Size::default()
        }

        fn animate_translation(&mut self, _handle: &(), _translation: crate::Translation) {}

        fn cancel_animation(&mut self, _handle: &()) {}

        fn dispose(&mut self, _handle: ()) {}
    }

    #[test]
    fn test_panicked_tick_loop_reported() {
        let mut c = DanmakuController::new(fast_config(), Exploding);
        c.configure_lanes(DisplayBounds::new(1000.0, 120.0)).unwrap();
        c.put_data(WIDE_100);
        c.start().unwrap();

        let deadline = Instant::now() + Duration::from_secs(2);
        while !c.scheduler.is_poisoned() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(2));
        }
        assert!(c.scheduler.is_poisoned());

        let err = c.stop().unwrap_err();
        assert!(matches!(err, ControllerError::TickLoopPanicked));
        assert!(!c.is_running());
        assert!(matches!(c.snapshot(), Err(ControllerError::Poisoned)));
    }
}
