//! Property tests for navigation invariants.
//!
//! Uses proptest to verify:
//! 1. Progress ratio runs from 0.0 on the first page to 1.0 on the last,
//!    increasing with the page index
//! 2. Input during a transition is dropped, never queued
//! 3. Saved progress restores exactly when in range, otherwise page 0

use proptest::prelude::*;
use std::time::{Duration, Instant};

use folio::core::book::PageSequence;
use folio::core::navigation::NavigationController;
use folio::core::progress::{MemoryStore, load_progress, save_progress};
use folio::core::scheduler::Scheduler;
use folio::core::surface::{Stage, VisualTag, WidgetId};

const KEY: &str = "prop.progress";
const EXIT: Duration = Duration::from_millis(300);

// ── Helpers ──────────────────────────────────────────────────────────

fn ids(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("p{i}")).collect()
}

fn controller_at(count: usize, index: usize) -> (NavigationController, Stage) {
    let ids = ids(count);
    let mut store = MemoryStore::new();
    save_progress(&mut store, KEY, index);
    let pages = PageSequence::new(ids.iter().map(String::as_str)).unwrap();
    let nav = NavigationController::restore(pages, Box::new(store), KEY, EXIT);
    let mut stage = Stage::with_pages(ids.iter().map(String::as_str));
    nav.mount(&mut stage);
    (nav, stage)
}

#[derive(Debug, Clone, Copy)]
enum Press {
    Next,
    Previous,
    First,
    Last,
}

fn arb_press() -> impl Strategy<Value = Press> {
    prop_oneof![
        Just(Press::Next),
        Just(Press::Previous),
        Just(Press::First),
        Just(Press::Last),
    ]
}

// ── 1. Progress Ratio ────────────────────────────────────────────────

proptest! {
    #[test]
    fn progress_ratio_is_monotonic_and_bounded(count in 2usize..40) {
        let mut previous = -1.0;
        for index in 0..count {
            let (nav, _) = controller_at(count, index);
            let ratio = nav.progress_ratio();
            prop_assert!(ratio > previous);
            prop_assert!((0.0..=1.0).contains(&ratio));
            previous = ratio;
        }
        prop_assert_eq!(controller_at(count, 0).0.progress_ratio(), 0.0);
        prop_assert_eq!(controller_at(count, count - 1).0.progress_ratio(), 1.0);
    }

// ── 2. Transition Lock ───────────────────────────────────────────────

    /// However many keys arrive inside one exit delay, only the first
    /// accepted one moves the reader.
    #[test]
    fn burst_of_input_moves_at_most_once(
        count in 2usize..20,
        start_seed in any::<usize>(),
        presses in prop::collection::vec(arb_press(), 1..12),
    ) {
        let start = start_seed % count;
        let (mut nav, mut stage) = controller_at(count, start);
        let mut scheduler = Scheduler::new();
        let t0 = Instant::now();

        let mut expected = start;
        let mut accepted = false;
        for (i, press) in presses.iter().enumerate() {
            let now = t0 + Duration::from_millis(i as u64);
            if !accepted {
                let target = match press {
                    Press::Next if start + 1 < count => Some(start + 1),
                    Press::Previous if start > 0 => Some(start - 1),
                    Press::First => Some(0),
                    Press::Last => Some(count - 1),
                    _ => None,
                };
                if let Some(target) = target {
                    expected = target;
                    accepted = true;
                }
            }
            let _ = match press {
                Press::Next => nav.next(&mut stage, &mut scheduler, now),
                Press::Previous => nav.previous(&mut stage, &mut scheduler, now),
                Press::First => nav.jump_to_first(&mut stage, &mut scheduler, now),
                Press::Last => nav.jump_to_last(&mut stage, &mut scheduler, now),
            };
            prop_assert!(scheduler.pending() <= 1);
        }

        for _ in scheduler.due(t0 + Duration::from_secs(5)) {
            nav.finish_transition(&mut stage);
        }
        prop_assert_eq!(nav.current_index(), expected);
        prop_assert!(!nav.is_transitioning());

        let active = stage.widgets_with(VisualTag::Active);
        prop_assert_eq!(active.len(), 1);
        prop_assert_eq!(active[0], &WidgetId::page(&format!("p{expected}")));
    }

// ── 3. Persistence Round Trip ────────────────────────────────────────

    #[test]
    fn saved_progress_round_trips(count in 1usize..50, index in 0usize..80) {
        let mut store = MemoryStore::new();
        prop_assert!(save_progress(&mut store, KEY, index).is_some());
        let restored = load_progress(&store, KEY, count);
        if index < count {
            prop_assert_eq!(restored.page_index, index);
        } else {
            prop_assert_eq!(restored.page_index, 0);
        }
    }
}
