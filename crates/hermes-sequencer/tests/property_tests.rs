//! Property-based tests for the sequencer's reorder and duplicate-handling
//! laws (§8 "Sequencer idempotence on duplicates", "Sequencer round-trip").

use hermes_protocol::SequencedFrame;
use hermes_ring::{Config, Ring};
use hermes_sequencer::Sequencer;
use proptest::prelude::*;

#[derive(Clone, Copy)]
struct Seq(u64);

impl SequencedFrame for Seq {
    fn sequence(&self) -> u64 {
        self.0
    }
}

fn run_to_idle(seq: &mut Sequencer<Seq>, input: &Ring<Seq>, output: &Ring<Seq>) {
    loop {
        if matches!(seq.run_once(input, output), hermes_sequencer::Cycle::Idle) {
            break;
        }
    }
}

fn drain(output: &Ring<Seq>) -> Vec<u64> {
    let mut out = Vec::new();
    while let Some(item) = output.pop() {
        out.push(item.0);
    }
    out
}

/// Fisher-Yates shuffle of `1..=n` driven by a vector of proptest sample
/// indices, so the permutation is part of the shrinkable input space
/// without pulling in a separate `rand` dependency.
fn permutation_strategy(n: u64) -> impl Strategy<Value = Vec<u64>> {
    prop::collection::vec(any::<prop::sample::Index>(), n as usize - 1).prop_map(move |swaps| {
        let mut v: Vec<u64> = (1..=n).collect();
        for (i, swap) in swaps.into_iter().enumerate() {
            let j = i + swap.index(v.len() - i);
            v.swap(i, j);
        }
        v
    })
}

proptest! {
    /// Round-trip: any permutation of a contiguous run 1..=N arriving
    /// within the reorder window comes out strictly in order.
    #[test]
    fn prop_sequencer_round_trip_any_permutation(
        mut perm in permutation_strategy(64),
    ) {
        let input = Ring::<Seq>::new(Config::default());
        let output = Ring::<Seq>::new(Config::default());
        let mut sequencer = Sequencer::<Seq>::new(128);

        for n in perm.drain(..) {
            prop_assert!(input.push(Seq(n)));
        }
        run_to_idle(&mut sequencer, &input, &output);

        let out = drain(&output);
        let expected: Vec<u64> = (1..=64).collect();
        prop_assert_eq!(out, expected);
        prop_assert_eq!(sequencer.next_expected(), 65);
    }

    /// Idempotence: feeding the same sequence number twice (anywhere in
    /// an otherwise-ordered run) produces exactly one downstream event
    /// for it.
    #[test]
    fn prop_duplicate_sequence_emitted_once(
        n in 1u64..64,
        dup_after in 0usize..3,
    ) {
        let input = Ring::<Seq>::new(Config::default());
        let output = Ring::<Seq>::new(Config::default());
        let mut sequencer = Sequencer::<Seq>::new(128);

        for s in 1..=n {
            prop_assert!(input.push(Seq(s)));
            if dup_after == (s as usize % 3) {
                prop_assert!(input.push(Seq(s)));
            }
        }
        run_to_idle(&mut sequencer, &input, &output);

        let out = drain(&output);
        let expected: Vec<u64> = (1..=n).collect();
        prop_assert_eq!(out, expected);
        prop_assert_eq!(sequencer.next_expected(), n + 1);
    }
}
