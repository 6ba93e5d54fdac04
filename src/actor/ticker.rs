//! Tick loop: dedicated thread driving the scheduler at a fixed cadence.
//!
//! Each iteration drains pending commands, runs one scheduler tick, then
//! waits one full interval. The wait is not compensated for the time the tick
//! took, so under load simulated time drifts behind wall-clock time rather
//! than bursting to catch up.

use super::messages::Command;
use crate::render::Renderer;
use crate::scheduler::Scheduler;
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use std::io;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{error, trace};

/// Handle to a running tick thread.
pub(crate) struct TickLoop {
    /// Handle to the tick thread.
    handle: Option<JoinHandle<()>>,
    /// Dropping this disconnects the stop channel and ends the loop.
    stop_tx: Option<Sender<()>>,
}

impl TickLoop {
    /// Spawn the tick thread.
    ///
    /// # Arguments
    ///
    /// * `scheduler` - Shared scheduler; locked for the duration of each tick.
    /// * `commands` - Commands drained at the start of every tick.
    /// * `interval` - Delay between the end of one tick and the start of the next.
    pub(crate) fn spawn<T, R>(
        scheduler: Arc<Mutex<Scheduler<T, R>>>,
        commands: Receiver<Command<T>>,
        interval: Duration,
    ) -> io::Result<Self>
    where
        T: Send + 'static,
        R: Renderer<T> + Send + 'static,
        R::Handle: Send + 'static,
    {
        let (stop_tx, stop_rx) = bounded::<()>(1);

        let handle = thread::Builder::new()
            .name("danmaku-ticker".to_string())
            .spawn(move || {
                Self::run_loop(&scheduler, &commands, &stop_rx, interval);
            })?;

        Ok(Self {
            handle: Some(handle),
            stop_tx: Some(stop_tx),
        })
    }

    /// Signal the loop to stop and wait for the in-flight tick to finish.
    ///
    /// Returns `false` if the tick thread panicked.
    pub(crate) fn stop(mut self) -> bool {
        self.stop_tx.take();
        match self.handle.take() {
            Some(handle) => handle.join().is_ok(),
            None => true,
        }
    }

    /// Main tick loop.
    fn run_loop<T, R: Renderer<T>>(
        scheduler: &Mutex<Scheduler<T, R>>,
        commands: &Receiver<Command<T>>,
        stop_rx: &Receiver<()>,
        interval: Duration,
    ) {
        let mut frame = 0u64;
        loop {
            {
                let Ok(mut scheduler) = scheduler.lock() else {
                    error!("scheduler lock poisoned, stopping tick loop");
                    break;
                };

                for command in commands.try_iter() {
                    match command {
                        Command::Put(content) => {
                            scheduler.put_data(content);
                        }
                        Command::Pause => scheduler.pause(),
                        Command::Resume => scheduler.resume(),
                    }
                }

                let report = scheduler.tick();
                if report.admitted.is_some() || report.retired > 0 {
                    trace!(
                        frame,
                        admitted = report.admitted.map(|id| id.0),
                        retired = report.retired,
                        "tick"
                    );
                }
            }
            frame += 1;

            match stop_rx.recv_timeout(interval) {
                Err(RecvTimeoutError::Timeout) => {}
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    }
}

impl Drop for TickLoop {
    fn drop(&mut self) {
        self.stop_tx.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
