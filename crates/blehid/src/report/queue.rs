//! Input report queue
//!
//! Any thread may produce reports through a cloned [`InputReportSender`];
//! only the engine thread consumes them, one per scheduler tick.

use log::{debug, trace};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

/// Producer side of the input report queue.
#[derive(Debug, Clone)]
pub struct InputReportSender {
    tx: Sender<Vec<u8>>,
}

impl InputReportSender {
    /// Queues a report for delivery.
    ///
    /// Empty reports are discarded. Returns `false` if the report was empty or
    /// the consuming engine is gone.
    pub fn push(&self, report: impl Into<Vec<u8>>) -> bool {
        let report = report.into();
        if report.is_empty() {
            trace!("Ignoring empty input report");
            return false;
        }
        debug!("Queueing input report {}", hex::encode(&report));
        self.tx.send(report).is_ok()
    }
}

/// Consumer side of the input report queue, owned by the engine.
#[derive(Debug)]
pub struct InputReportQueue {
    rx: Receiver<Vec<u8>>,
}

impl InputReportQueue {
    /// Takes the oldest queued report, if any.
    pub fn poll(&self) -> Option<Vec<u8>> {
        match self.rx.try_recv() {
            Ok(report) => Some(report),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Drops every queued report, returning how many were dropped.
    pub fn drain(&self) -> usize {
        let mut dropped = 0;
        while self.poll().is_some() {
            dropped += 1;
        }
        dropped
    }
}

/// Creates a connected sender/queue pair.
pub fn input_report_queue() -> (InputReportSender, InputReportQueue) {
    let (tx, rx) = mpsc::channel();
    (InputReportSender { tx }, InputReportQueue { rx })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_fifo_order_and_empty_reports() {
        let (sender, queue) = input_report_queue();
        assert!(sender.push(vec![1, 2]));
        assert!(!sender.push(Vec::new()));
        assert!(sender.push([3u8, 4]));

        assert_eq!(queue.poll(), Some(vec![1, 2]));
        assert_eq!(queue.poll(), Some(vec![3, 4]));
        assert_eq!(queue.poll(), None);
    }

    #[test]
    fn test_multiple_producers() {
        let (sender, queue) = input_report_queue();
        let workers: Vec<_> = (0..4u8)
            .map(|n| {
                let sender = sender.clone();
                thread::spawn(move || {
                    for i in 0..10u8 {
                        sender.push(vec![n, i]);
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        let mut per_producer = [Vec::new(), Vec::new(), Vec::new(), Vec::new()];
        while let Some(report) = queue.poll() {
            per_producer[report[0] as usize].push(report[1]);
        }
        for received in per_producer.iter() {
            assert_eq!(received, &(0..10u8).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_drain_and_closed_queue() {
        let (sender, queue) = input_report_queue();
        sender.push(vec![1]);
        sender.push(vec![2]);
        assert_eq!(queue.drain(), 2);
        drop(queue);
        assert!(!sender.push(vec![3]));
    }
}
