//! Property-based tests for the refill hand-off.
//! Any interleaving of DMA events and foreground polls must match a simple
//! single-slot model: last request wins, overwrites are counted, errors
//! never touch the slot.
#![allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]

use firmware::audio::{RefillRequest, RefillState};
use platform::{BufferHalf, DmaEvent};
use proptest::prelude::*;

#[derive(Debug, Clone, Copy)]
enum Step {
    Event(DmaEvent),
    Poll,
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        Just(Step::Event(DmaEvent::HalfTransfer)),
        Just(Step::Event(DmaEvent::TransferComplete)),
        Just(Step::Event(DmaEvent::TransferError)),
        Just(Step::Poll),
    ]
}

/// Reference model of the hand-off.
#[derive(Default)]
struct Model {
    slot: Option<BufferHalf>,
    underruns: u32,
    transfer_errors: u32,
}

impl Model {
    fn apply(&mut self, step: Step) -> Option<BufferHalf> {
        match step {
            Step::Event(event) => {
                match event.refill_half() {
                    Some(half) => {
                        if self.slot.is_some() {
                            self.underruns += 1;
                        }
                        self.slot = Some(half);
                    }
                    None => self.transfer_errors += 1,
                }
                None
            }
            Step::Poll => self.slot.take(),
        }
    }
}

proptest! {
    #[test]
    fn handoff_matches_single_slot_model(steps in proptest::collection::vec(step(), 0..200)) {
        let request = RefillRequest::new();
        let mut model = Model::default();

        for step in steps {
            let expected = model.apply(step);
            let actual = match step {
                Step::Event(event) => {
                    request.on_event(event);
                    None
                }
                Step::Poll => {
                    let half = request.pending();
                    if let Some(half) = half {
                        prop_assert!(request.complete(half));
                    }
                    half
                }
            };
            prop_assert_eq!(actual, expected);
            prop_assert_eq!(request.pending(), model.slot);
            prop_assert_eq!(request.underruns(), model.underruns);
            prop_assert_eq!(request.transfer_errors(), model.transfer_errors);
        }
    }

    /// Alternating half/full events with a poll after each are always served in order.
    #[test]
    fn alternating_events_never_underrun(pairs in 1usize..100) {
        let request = RefillRequest::new();
        for _ in 0..pairs {
            for (event, half) in [
                (DmaEvent::HalfTransfer, BufferHalf::First),
                (DmaEvent::TransferComplete, BufferHalf::Second),
            ] {
                request.on_event(event);
                prop_assert_eq!(request.pending(), Some(half));
                prop_assert!(request.complete(half));
                prop_assert_eq!(request.state(), RefillState::Idle);
            }
        }
        prop_assert_eq!(request.underruns(), 0);
    }

    /// N back-to-back requests without a poll cost N - 1 under-runs and leave the last one.
    #[test]
    fn back_to_back_requests_keep_only_the_last(events in proptest::collection::vec(proptest::bool::ANY, 1..50)) {
        let request = RefillRequest::new();
        for &first in &events {
            if first {
                request.on_half_complete();
            } else {
                request.on_full_complete();
            }
        }
        let last = if events.last().copied().unwrap() { BufferHalf::First } else { BufferHalf::Second };
        prop_assert_eq!(request.pending(), Some(last));
        prop_assert_eq!(request.underruns() as usize, events.len() - 1);
    }
}
