//! Property-based tests for queue state invariants
//!
//! Random command sequences against the queue must never leave it in an
//! inconsistent state: the context index stays in bounds, a user-queue
//! detour implies a non-empty user queue, and navigation with repeat off
//! always terminates.

use arioso_core::{Track, TrackId};
use arioso_playback::{QueueManager, RepeatMode};
use proptest::prelude::*;
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

const POOL_SIZE: usize = 8;

fn pool_track(n: usize) -> Track {
    let mut track = Track::new(format!("Track {n}"), PathBuf::from(format!("{n}.flac")))
        .with_duration(Duration::from_secs(120));
    track.id = TrackId::new(format!("pool-{n}"));
    track
}

#[derive(Debug, Clone)]
enum Op {
    PlayTrack { track: usize, context_len: usize },
    PlayNow(usize),
    AddToQueue(usize),
    Next,
    Prev,
    SkipTo(usize),
    Remove(usize),
    Reorder(usize, usize),
    ClearUserQueue,
    ClearAll,
    ToggleShuffle,
    CycleRepeat,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..POOL_SIZE, 0..=POOL_SIZE).prop_map(|(track, context_len)| Op::PlayTrack {
            track,
            context_len
        }),
        (0..POOL_SIZE).prop_map(Op::PlayNow),
        (0..POOL_SIZE).prop_map(Op::AddToQueue),
        any::<bool>().prop_map(|fwd| if fwd { Op::Next } else { Op::Prev }),
        (0..POOL_SIZE + 2).prop_map(Op::SkipTo),
        (0..POOL_SIZE + 2).prop_map(Op::Remove),
        ((0..POOL_SIZE + 2), (0..POOL_SIZE + 2)).prop_map(|(f, t)| Op::Reorder(f, t)),
        any::<bool>().prop_map(|all| if all { Op::ClearAll } else { Op::ClearUserQueue }),
        Just(Op::ToggleShuffle),
        Just(Op::CycleRepeat),
    ]
}

fn apply(queue: &mut QueueManager, op: &Op) {
    match *op {
        Op::PlayTrack { track, context_len } => {
            let context: Vec<Track> = (0..context_len).map(pool_track).collect();
            queue.play_track(&pool_track(track), context);
        }
        Op::PlayNow(n) => queue.play_now(pool_track(n)),
        Op::AddToQueue(n) => queue.add_to_queue([pool_track(n)]),
        Op::Next => {
            queue.next();
        }
        Op::Prev => {
            queue.prev();
        }
        Op::SkipTo(i) => {
            queue.skip_to_index(i);
        }
        Op::Remove(i) => {
            queue.remove_from_user_queue(i);
        }
        Op::Reorder(f, t) => {
            queue.reorder_user_queue(f, t);
        }
        Op::ClearUserQueue => queue.clear_user_queue(),
        Op::ClearAll => queue.clear_all(),
        Op::ToggleShuffle => {
            queue.toggle_shuffle();
        }
        Op::CycleRepeat => {
            queue.cycle_repeat_mode();
        }
    }
}

fn assert_consistent(queue: &QueueManager) {
    if queue.playing_from_user_queue() {
        assert!(
            !queue.user_queue().is_empty(),
            "detour flag set with an empty user queue"
        );
    }
    if !queue.context().is_empty() {
        assert!(
            queue.context_index() < queue.context().len(),
            "context index out of bounds"
        );
    }
    let has_current = queue.playing_from_user_queue() || !queue.context().is_empty();
    assert_eq!(queue.current().is_some(), has_current);
}

proptest! {
    #[test]
    fn queue_state_stays_consistent(ops in prop::collection::vec(op_strategy(), 0..60)) {
        let mut queue = QueueManager::default();
        for op in &ops {
            apply(&mut queue, op);
            assert_consistent(&queue);
        }
    }

    #[test]
    fn has_next_predicts_next(ops in prop::collection::vec(op_strategy(), 0..40)) {
        let mut queue = QueueManager::default();
        for op in &ops {
            apply(&mut queue, op);
            let before = queue.current().map(|t| t.id.clone());
            let predicted = queue.has_next();
            let moved = queue.next();
            prop_assert_eq!(predicted, moved, "has_next disagreed with next");
            if !moved {
                prop_assert_eq!(
                    before,
                    queue.current().map(|t| t.id.clone()),
                    "a refused next changed the current track"
                );
            }
        }
    }

    #[test]
    fn has_prev_predicts_prev(ops in prop::collection::vec(op_strategy(), 0..40)) {
        let mut queue = QueueManager::default();
        for op in &ops {
            apply(&mut queue, op);
            let predicted = queue.has_prev();
            let moved = queue.prev();
            prop_assert_eq!(predicted, moved, "has_prev disagreed with prev");
        }
    }

    #[test]
    fn next_terminates_with_repeat_off(ops in prop::collection::vec(op_strategy(), 0..40)) {
        let mut queue = QueueManager::default();
        for op in &ops {
            // Skip repeat changes so the mode stays Off.
            if matches!(op, Op::CycleRepeat) {
                continue;
            }
            apply(&mut queue, op);
        }
        prop_assert_eq!(queue.repeat_mode(), RepeatMode::Off);

        let bound = queue.context().len() + queue.user_queue().len() + 1;
        let mut steps = 0;
        while queue.next() {
            steps += 1;
            prop_assert!(steps <= bound, "next() failed to terminate with repeat off");
        }
    }

    #[test]
    fn shuffle_preserves_the_context_multiset(
        played in 0..POOL_SIZE,
        toggles in 1..4usize,
    ) {
        let context: Vec<Track> = (0..POOL_SIZE).map(pool_track).collect();
        let mut queue = QueueManager::default();
        queue.play_track(&context[played], context.clone());

        let before: HashSet<String> = queue
            .context()
            .iter()
            .map(|t| t.id.as_str().to_owned())
            .collect();
        let current = queue.current().map(|t| t.id.clone());

        for _ in 0..toggles {
            queue.toggle_shuffle();
        }

        let after: HashSet<String> = queue
            .context()
            .iter()
            .map(|t| t.id.as_str().to_owned())
            .collect();
        prop_assert_eq!(before, after);
        prop_assert_eq!(current, queue.current().map(|t| t.id.clone()));
    }
}
