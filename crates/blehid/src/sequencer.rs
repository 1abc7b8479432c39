//! Service registration sequencer
//!
//! Stacks accept one service registration at a time. Services are queued here
//! and submitted in order; the head of the queue is the registration in flight
//! and is only popped when the stack acknowledges it.

use crate::gatt::constants::GATT_SUCCESS;
use crate::gatt::AttributeTree;
use crate::stack::PeripheralStack;
use log::{debug, error, warn};
use std::collections::VecDeque;

/// Outcome of a queue operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The service with this handle was submitted to the stack.
    Submitted(u16),
    /// Queued behind the registration in flight.
    Waiting,
    /// The last pending service was acknowledged.
    Complete,
    /// Acknowledgment with nothing in flight.
    Ignored,
    /// The stack refused a submission; the queue was cleared.
    Aborted,
}

#[derive(Debug, Default)]
pub struct ServiceSequencer {
    pending: VecDeque<u16>,
}

impl ServiceSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a service, submitting it immediately if nothing is in flight.
    pub fn enqueue<S: PeripheralStack + ?Sized>(
        &mut self,
        stack: &mut S,
        tree: &AttributeTree,
        service_handle: u16,
    ) -> Step {
        self.pending.push_back(service_handle);
        if self.pending.len() == 1 {
            self.submit_head(stack, tree)
        } else {
            debug!("Service 0x{:04x} queued behind {} others", service_handle, self.pending.len() - 1);
            Step::Waiting
        }
    }

    /// Handles the stack's acknowledgment of the registration in flight.
    ///
    /// A failed registration is logged and the queue still advances.
    pub fn acknowledge<S: PeripheralStack + ?Sized>(
        &mut self,
        stack: &mut S,
        tree: &AttributeTree,
        status: u8,
    ) -> Step {
        let Some(done) = self.pending.pop_front() else {
            warn!("Service acknowledgment with no registration pending, ignoring");
            return Step::Ignored;
        };

        if status == GATT_SUCCESS {
            debug!("Service 0x{:04x} registered", done);
        } else {
            error!("Service 0x{:04x} registration failed with status 0x{:02x}", done, status);
        }

        if self.pending.is_empty() {
            Step::Complete
        } else {
            self.submit_head(stack, tree)
        }
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Handle of the registration in flight.
    pub fn in_flight(&self) -> Option<u16> {
        self.pending.front().copied()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    fn submit_head<S: PeripheralStack + ?Sized>(&mut self, stack: &mut S, tree: &AttributeTree) -> Step {
        let Some(&head) = self.pending.front() else {
            return Step::Complete;
        };
        match stack.add_service(tree, head) {
            Ok(()) => Step::Submitted(head),
            Err(e) => {
                error!("Failed to submit service 0x{:04x}: {}", head, e);
                self.pending.clear();
                Step::Aborted
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StackError;
    use crate::gatt::constants::{GATT_FAILURE, SERVICE_BATTERY, SERVICE_DEVICE_INFORMATION, SERVICE_HID};
    use crate::sim::{SimulatedStack, StackCall};

    fn tree_with_services() -> (AttributeTree, Vec<u16>) {
        let mut tree = AttributeTree::new();
        let handles = [SERVICE_DEVICE_INFORMATION, SERVICE_BATTERY, SERVICE_HID]
            .iter()
            .map(|uuid| tree.add_service(*uuid, true).unwrap())
            .collect();
        (tree, handles)
    }

    fn submitted(stack: &SimulatedStack) -> Vec<u16> {
        stack
            .calls()
            .iter()
            .filter_map(|c| match c {
                StackCall::AddService(handle) => Some(*handle),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_one_registration_in_flight() {
        let (tree, handles) = tree_with_services();
        let mut stack = SimulatedStack::new();
        let mut sequencer = ServiceSequencer::new();

        assert_eq!(sequencer.enqueue(&mut stack, &tree, handles[0]), Step::Submitted(handles[0]));
        assert_eq!(sequencer.enqueue(&mut stack, &tree, handles[1]), Step::Waiting);
        assert_eq!(sequencer.enqueue(&mut stack, &tree, handles[2]), Step::Waiting);
        assert_eq!(submitted(&stack), vec![handles[0]]);

        assert_eq!(sequencer.acknowledge(&mut stack, &tree, GATT_SUCCESS), Step::Submitted(handles[1]));
        assert_eq!(sequencer.acknowledge(&mut stack, &tree, GATT_SUCCESS), Step::Submitted(handles[2]));
        assert_eq!(submitted(&stack), handles);
    }

    #[test]
    fn test_completes_exactly_once() {
        let (tree, handles) = tree_with_services();
        let mut stack = SimulatedStack::new();
        let mut sequencer = ServiceSequencer::new();
        for handle in &handles {
            sequencer.enqueue(&mut stack, &tree, *handle);
        }

        let steps: Vec<Step> = (0..handles.len() + 2)
            .map(|_| sequencer.acknowledge(&mut stack, &tree, GATT_SUCCESS))
            .collect();
        let completions = steps.iter().filter(|s| **s == Step::Complete).count();
        assert_eq!(completions, 1);
        assert_eq!(steps[handles.len() - 1], Step::Complete);
        assert_eq!(steps[handles.len()], Step::Ignored);
    }

    #[test]
    fn test_failed_ack_still_advances() {
        let (tree, handles) = tree_with_services();
        let mut stack = SimulatedStack::new();
        let mut sequencer = ServiceSequencer::new();
        sequencer.enqueue(&mut stack, &tree, handles[0]);
        sequencer.enqueue(&mut stack, &tree, handles[1]);

        assert_eq!(sequencer.acknowledge(&mut stack, &tree, GATT_FAILURE), Step::Submitted(handles[1]));
        assert_eq!(sequencer.acknowledge(&mut stack, &tree, GATT_SUCCESS), Step::Complete);
    }

    #[test]
    fn test_rejected_submission_aborts() {
        let (tree, handles) = tree_with_services();
        let mut stack = SimulatedStack::new();
        stack.fail_add_service(StackError::Rejected("busy".into()));
        let mut sequencer = ServiceSequencer::new();

        assert_eq!(sequencer.enqueue(&mut stack, &tree, handles[0]), Step::Aborted);
        assert!(sequencer.is_empty());
    }

    #[test]
    fn test_clear() {
        let (tree, handles) = tree_with_services();
        let mut stack = SimulatedStack::new();
        let mut sequencer = ServiceSequencer::new();
        sequencer.enqueue(&mut stack, &tree, handles[0]);
        sequencer.enqueue(&mut stack, &tree, handles[1]);
        assert_eq!(sequencer.in_flight(), Some(handles[0]));

        sequencer.clear();
        assert_eq!(sequencer.len(), 0);
        assert_eq!(sequencer.acknowledge(&mut stack, &tree, GATT_SUCCESS), Step::Ignored);
    }
}
