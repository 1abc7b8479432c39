//! Input report timer
//!
//! A background thread posts `TimerTick` events at a fixed interval. Every
//! start bumps the generation, so ticks still in the channel from a cancelled
//! timer can be recognised and dropped by the engine.

use crate::event::{Event, EventSender};
use log::{debug, trace};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Debug, Default)]
pub struct ReportTimer {
    generation: u64,
    cancel: Option<Arc<AtomicBool>>,
}

impl ReportTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts ticking at `interval`, replacing any running timer.
    ///
    /// Returns the generation carried by the new timer's ticks.
    pub fn start(&mut self, interval: Duration, events: EventSender) -> u64 {
        self.cancel();
        self.generation += 1;
        let generation = self.generation;
        let cancelled = Arc::new(AtomicBool::new(false));
        self.cancel = Some(cancelled.clone());

        debug!("Report timer {} started at {:?}", generation, interval);
        thread::spawn(move || loop {
            thread::sleep(interval);
            if cancelled.load(Ordering::Acquire) {
                trace!("Report timer {} stopped", generation);
                break;
            }
            if events.send(Event::TimerTick { generation }).is_err() {
                break;
            }
        });
        generation
    }

    /// Stops the running timer, if any.
    pub fn cancel(&mut self) {
        if let Some(cancelled) = self.cancel.take() {
            cancelled.store(true, Ordering::Release);
            debug!("Report timer {} cancelled", self.generation);
        }
    }

    pub fn is_running(&self) -> bool {
        self.cancel.is_some()
    }

    /// Generation of the running timer.
    pub fn generation(&self) -> Option<u64> {
        self.cancel.as_ref().map(|_| self.generation)
    }

    /// Whether a tick belongs to the running timer.
    pub fn is_current(&self, generation: u64) -> bool {
        self.is_running() && generation == self.generation
    }
}

impl Drop for ReportTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::event_channel;

    #[test]
    fn test_ticks_carry_generation() {
        let (events, rx) = event_channel();
        let mut timer = ReportTimer::new();
        let generation = timer.start(Duration::from_millis(1), events);

        let tick = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(tick, Event::TimerTick { generation });
        assert!(timer.is_current(generation));
    }

    #[test]
    fn test_restart_invalidates_old_generation() {
        let (events, _rx) = event_channel();
        let mut timer = ReportTimer::new();
        let first = timer.start(Duration::from_millis(50), events.clone());
        let second = timer.start(Duration::from_millis(50), events);

        assert!(second > first);
        assert!(!timer.is_current(first));
        assert!(timer.is_current(second));

        timer.cancel();
        assert!(!timer.is_running());
        assert!(!timer.is_current(second));
    }
}
