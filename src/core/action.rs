//! # Actions
//!
//! Everything that can happen in Folio becomes an `Action`.
//! Reader presses →? That's `Action::Next`.
//! A timer comes due? `Action::Tick` picks it up.
//!
//! The `update()` function takes the current state, an action, and the
//! current time, mutates the state, and returns an `Effect` for the event
//! loop. Terminal I/O happens elsewhere.
//!
//! ```text
//! State + Action + now  →  update()  →  State', Effect
//! ```
//!
//! Time is an argument rather than a clock read, so tests drive timers by
//! passing later instants.

use std::time::Instant;

use log::{debug, error, info, warn};

use crate::core::activity::drag_drop::{self, MatchState};
use crate::core::activity::quiz;
use crate::core::navigation::{NavError, NavigationController};
use crate::core::scheduler::{Deferred, Scheduler};
use crate::core::state::{App, CheckStatus, DragSession, DragSource, FeedbackNotice};
use crate::core::surface::{Stage, WidgetId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    // Navigation
    Next,
    Previous,
    First,
    Last,
    GoTo(String),

    // Quiz
    SelectOption { group: String, option: String },
    CheckAnswers,

    // Drag and drop (pointer lifecycle)
    DragStart(String),
    DragOver(String),
    DragLeave(String),
    Drop { zone: String, payload: String },
    DragEnd(String),
    /// Put down whatever is being carried.
    CancelDrag,

    // Focus
    FocusNext,
    FocusPrevious,
    /// Act on the focused widget (Enter / Space).
    Activate,

    /// Run every deferred action that is due.
    Tick,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    /// A transition committed; the renderer should reset per-page state.
    PageChanged,
    Quit,
}

pub fn update(app: &mut App, action: Action, now: Instant) -> Effect {
    match action {
        Action::Next => navigate(app, |nav, stage, sch| nav.next(stage, sch, now)),
        Action::Previous => navigate(app, |nav, stage, sch| nav.previous(stage, sch, now)),
        Action::First => navigate(app, |nav, stage, sch| nav.jump_to_first(stage, sch, now)),
        Action::Last => navigate(app, |nav, stage, sch| nav.jump_to_last(stage, sch, now)),
        Action::GoTo(page) => navigate(app, |nav, stage, sch| nav.go_to(&page, stage, sch, now)),

        Action::SelectOption { group, option } => {
            select_option(app, &group, &option, now);
            Effect::None
        }
        Action::CheckAnswers => {
            check_answers(app, now);
            Effect::None
        }

        Action::DragStart(item) => {
            start_drag(app, &item, DragSource::Pointer);
            Effect::None
        }
        Action::DragOver(zone) => {
            hover_zone(app, &zone);
            Effect::None
        }
        Action::DragLeave(zone) => {
            leave_zone(app, &zone);
            Effect::None
        }
        Action::Drop { zone, payload } => {
            drop_on_zone(app, &zone, &payload, now);
            Effect::None
        }
        Action::DragEnd(item) => {
            end_drag(app, &item);
            Effect::None
        }
        Action::CancelDrag => {
            cancel_drag(app);
            Effect::None
        }

        Action::FocusNext => {
            move_focus(app, true);
            Effect::None
        }
        Action::FocusPrevious => {
            move_focus(app, false);
            Effect::None
        }
        Action::Activate => activate(app, now),

        Action::Tick => tick(app, now),
        Action::Quit => Effect::Quit,
    }
}

// ============================================================================
// Navigation
// ============================================================================

fn navigate<F>(app: &mut App, op: F) -> Effect
where
    F: FnOnce(&mut NavigationController, &mut Stage, &mut Scheduler) -> Result<(), NavError>,
{
    let was_transitioning = app.nav.is_transitioning();
    match op(&mut app.nav, &mut app.stage, &mut app.scheduler) {
        Ok(()) => {
            // The carried item belongs to the page that is leaving
            if !was_transitioning && app.nav.is_transitioning() {
                cancel_drag(app);
            }
        }
        Err(NavError::TransitionBusy) => debug!("Navigation dropped: transition in flight"),
        Err(e) => error!("Cannot navigate: {}", e),
    }
    Effect::None
}

// ============================================================================
// Quiz
// ============================================================================

fn select_option(app: &mut App, group_id: &str, option_id: &str, now: Instant) {
    let Some(group) = app.quiz.iter_mut().find(|g| g.id == group_id) else {
        warn!("Unknown quiz group '{}'", group_id);
        return;
    };
    let Some(verdict) = quiz::select_option(group, option_id, &mut app.stage) else {
        return;
    };

    let serial = app.next_feedback_serial();
    app.feedback.insert(
        group_id.to_string(),
        FeedbackNotice {
            serial,
            verdict,
            fading: false,
        },
    );
    app.scheduler.schedule(
        now,
        app.timing.feedback_visible,
        Deferred::FadeFeedback {
            group: group_id.to_string(),
            serial,
        },
    );
    app.status_message = verdict.message().to_string();
}

fn check_answers(app: &mut App, now: Instant) {
    let all_correct = quiz::check_all_answers(&app.quiz);
    app.check_status = if all_correct {
        CheckStatus::AllCorrect
    } else {
        CheckStatus::SomeIncorrect
    };
    info!("Answers checked: all correct = {}", all_correct);
    app.scheduler
        .schedule(now, app.timing.check_status, Deferred::ResetCheckStatus);
    app.status_message = app.check_status.label().to_string();
}

// ============================================================================
// Drag and drop
// ============================================================================

fn start_drag(app: &mut App, item_id: &str, source: DragSource) {
    if app.drag.is_some() {
        cancel_drag(app);
    }
    let Some(item) = app.items.iter().find(|i| i.id == item_id) else {
        warn!("Unknown drag item '{}'", item_id);
        return;
    };
    let payload = drag_drop::drag_start(item, &mut app.stage);
    if source == DragSource::Keyboard {
        app.status_message = format!("Carrying \"{}\". Tab to a zone and press Enter.", item.label);
    }
    app.drag = Some(DragSession {
        item: item_id.to_string(),
        payload,
        source,
        over: None,
    });
}

fn hover_zone(app: &mut App, zone_id: &str) {
    let Some(zone) = app.zones.iter().find(|z| z.id == zone_id) else {
        warn!("Unknown drop zone '{}'", zone_id);
        return;
    };
    drag_drop::drag_over(zone, &mut app.stage);
    if let Some(session) = app.drag.as_mut() {
        session.over = Some(zone_id.to_string());
    }
}

fn leave_zone(app: &mut App, zone_id: &str) {
    let Some(zone) = app.zones.iter().find(|z| z.id == zone_id) else {
        warn!("Unknown drop zone '{}'", zone_id);
        return;
    };
    drag_drop::drag_leave(zone, &mut app.stage);
    if let Some(session) = app.drag.as_mut()
        && session.over.as_deref() == Some(zone_id)
    {
        session.over = None;
    }
}

fn drop_on_zone(app: &mut App, zone_id: &str, payload: &str, now: Instant) {
    let Some(zone) = app.zones.iter_mut().find(|z| z.id == zone_id) else {
        warn!("Unknown drop zone '{}'", zone_id);
        return;
    };
    let outcome = drag_drop::drop(zone, payload, &mut app.stage);
    let matched = outcome == MatchState::Matched;
    app.status_message = if matched {
        format!("Matched: {}", zone.label)
    } else {
        format!("Not a match for {}", zone.label)
    };
    app.scheduler.schedule(
        now,
        app.timing.drop_feedback,
        Deferred::ClearZone {
            zone: zone_id.to_string(),
            matched,
        },
    );
    if let Some(session) = app.drag.as_mut() {
        session.over = None;
    }
}

fn end_drag(app: &mut App, item_id: &str) {
    if let Some(item) = app.items.iter().find(|i| i.id == item_id) {
        drag_drop::drag_end(item, &mut app.stage);
    }
    if app.drag.as_ref().is_some_and(|s| s.item == item_id) {
        app.drag = None;
    }
}

fn cancel_drag(app: &mut App) {
    let Some(session) = app.drag.take() else {
        return;
    };
    if let Some(zone) = session.over.as_deref() {
        leave_zone(app, zone);
    }
    end_drag(app, &session.item);
    debug!("Drag of '{}' cancelled", session.item);
}

// ============================================================================
// Focus and keyboard activation
// ============================================================================

fn move_focus(app: &mut App, forward: bool) {
    let previous = app.cycle_focus(forward);
    let keyboard_drag = app
        .drag
        .as_ref()
        .is_some_and(|s| s.source == DragSource::Keyboard);
    if !keyboard_drag {
        return;
    }
    if let Some(WidgetId::DropZone(zone)) = previous {
        leave_zone(app, &zone);
    }
    if let Some(WidgetId::DropZone(zone)) = app.stage.focused().cloned() {
        hover_zone(app, &zone);
    }
}

fn activate(app: &mut App, now: Instant) -> Effect {
    if !app.focus_is_interactive() {
        return Effect::None;
    }
    let Some(focused) = app.stage.focused().cloned() else {
        return Effect::None;
    };
    match focused {
        WidgetId::QuizOption { group, option } => {
            update(app, Action::SelectOption { group, option }, now)
        }
        WidgetId::CheckButton => update(app, Action::CheckAnswers, now),
        WidgetId::DragItem(item) => {
            let carrying_this = app.drag.as_ref().is_some_and(|s| s.item == item);
            if carrying_this {
                cancel_drag(app);
            } else {
                start_drag(app, &item, DragSource::Keyboard);
            }
            Effect::None
        }
        WidgetId::DropZone(zone) => {
            match app.drag.clone() {
                Some(session) => {
                    drop_on_zone(app, &zone, &session.payload, now);
                    end_drag(app, &session.item);
                }
                None => app.status_message = "Pick up an item first".to_string(),
            }
            Effect::None
        }
        WidgetId::Page(_) | WidgetId::Heading(_) => Effect::None,
    }
}

// ============================================================================
// Deferred actions
// ============================================================================

fn tick(app: &mut App, now: Instant) -> Effect {
    let mut effect = Effect::None;
    // Tasks can chain follow-ups whose deadline has also passed
    loop {
        let due = app.scheduler.due(now);
        if due.is_empty() {
            return effect;
        }
        for (deadline, task) in due {
            if run_deferred(app, deadline, task) {
                effect = Effect::PageChanged;
            }
        }
    }
}

/// Returns true if a page transition committed.
fn run_deferred(app: &mut App, deadline: Instant, task: Deferred) -> bool {
    match task {
        Deferred::FinishTransition => {
            if app.nav.finish_transition(&mut app.stage) {
                app.status_message = format!(
                    "Page {} of {}",
                    app.nav.current_index() + 1,
                    app.nav.pages().len()
                );
                return true;
            }
        }
        Deferred::FadeFeedback { group, serial } => {
            if let Some(notice) = app.feedback.get_mut(&group)
                && notice.serial == serial
            {
                notice.fading = true;
                app.scheduler.schedule(
                    deadline,
                    app.timing.feedback_fade,
                    Deferred::DismissFeedback { group, serial },
                );
            }
        }
        Deferred::DismissFeedback { group, serial } => {
            if app.feedback.get(&group).is_some_and(|n| n.serial == serial) {
                app.feedback.remove(&group);
            }
        }
        Deferred::ResetCheckStatus => app.check_status = CheckStatus::Neutral,
        Deferred::ClearZone { zone, matched } => {
            if let Some(zone) = app.zones.iter_mut().find(|z| z.id == zone) {
                drag_drop::clear_indicator(zone, matched, &mut app.stage);
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::activity::quiz::SelectionState;
    use crate::core::surface::VisualTag;
    use crate::test_support::{test_app, test_app_at};
    use std::time::Duration;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn select(group: &str, option: &str) -> Action {
        Action::SelectOption {
            group: group.into(),
            option: option.into(),
        }
    }

    #[test]
    fn test_next_commits_after_tick() {
        let mut app = test_app();
        let t0 = Instant::now();

        assert_eq!(update(&mut app, Action::Next, t0), Effect::None);
        assert_eq!(update(&mut app, Action::Tick, t0 + ms(100)), Effect::None);
        assert_eq!(app.nav.current_page_id(), "intro");

        assert_eq!(update(&mut app, Action::Tick, t0 + ms(300)), Effect::PageChanged);
        assert_eq!(app.nav.current_page_id(), "quiz");
        assert_eq!(app.status_message, "Page 2 of 4");
        assert_eq!(app.stage.focused(), Some(&WidgetId::heading("quiz")));
    }

    #[test]
    fn test_rapid_input_is_dropped_not_queued() {
        let mut app = test_app();
        let t0 = Instant::now();
        update(&mut app, Action::Next, t0);
        update(&mut app, Action::Next, t0 + ms(10));
        update(&mut app, Action::Last, t0 + ms(20));
        update(&mut app, Action::Tick, t0 + ms(1000));
        assert_eq!(app.nav.current_page_id(), "quiz");
        assert!(app.scheduler.is_idle());
    }

    #[test]
    fn test_go_to_unknown_page_changes_nothing() {
        let mut app = test_app();
        update(&mut app, Action::GoTo("missing".into()), Instant::now());
        assert!(!app.nav.is_transitioning());
        assert!(app.scheduler.is_idle());
    }

    #[test]
    fn test_select_option_posts_feedback_that_fades_then_dismisses() {
        let mut app = test_app_at(1);
        let t0 = Instant::now();

        update(&mut app, select("colors", "red"), t0);
        let notice = app.feedback["colors"];
        assert_eq!(notice.text(), "Correct!");
        assert!(!notice.fading);
        assert_eq!(app.status_message, "Correct!");

        update(&mut app, Action::Tick, t0 + ms(2000));
        assert!(app.feedback["colors"].fading);

        update(&mut app, Action::Tick, t0 + ms(2499));
        assert!(app.feedback.contains_key("colors"));

        update(&mut app, Action::Tick, t0 + ms(2500));
        assert!(!app.feedback.contains_key("colors"));
    }

    #[test]
    fn test_stale_feedback_timer_leaves_newer_notice() {
        let mut app = test_app_at(1);
        let t0 = Instant::now();

        update(&mut app, select("colors", "blue"), t0);
        update(&mut app, select("colors", "red"), t0 + ms(1500));

        // First notice's fade time passes; the newer one stays solid
        update(&mut app, Action::Tick, t0 + ms(2600));
        let notice = app.feedback["colors"];
        assert_eq!(notice.text(), "Correct!");
        assert!(!notice.fading);

        update(&mut app, Action::Tick, t0 + ms(4000));
        assert!(!app.feedback.contains_key("colors"));
    }

    #[test]
    fn test_selecting_clears_siblings() {
        let mut app = test_app_at(1);
        let t0 = Instant::now();
        update(&mut app, select("colors", "blue"), t0);
        update(&mut app, select("colors", "red"), t0);

        let colors = &app.quiz[0];
        assert_eq!(colors.options[0].selection, SelectionState::MarkedCorrect);
        assert_eq!(colors.options[1].selection, SelectionState::Unselected);
    }

    #[test]
    fn test_check_answers_reports_then_resets() {
        let mut app = test_app_at(1);
        let t0 = Instant::now();
        update(&mut app, select("colors", "red"), t0);

        update(&mut app, Action::CheckAnswers, t0);
        assert_eq!(app.check_status, CheckStatus::SomeIncorrect);
        assert_eq!(app.status_message, "Some answers are incorrect");

        update(&mut app, Action::Tick, t0 + ms(3000));
        assert_eq!(app.check_status, CheckStatus::Neutral);
    }

    #[test]
    fn test_pointer_drag_and_drop() {
        let mut app = test_app_at(2);
        let t0 = Instant::now();

        update(&mut app, Action::DragStart("run".into()), t0);
        assert!(app.stage.has_tag(&WidgetId::item("run"), VisualTag::Dragging));

        update(&mut app, Action::DragOver("verbs".into()), t0);
        assert!(app.stage.has_tag(&WidgetId::zone("verbs"), VisualTag::Hover));

        let payload = app.drag.as_ref().unwrap().payload.clone();
        update(&mut app, Action::Drop { zone: "verbs".into(), payload }, t0);
        update(&mut app, Action::DragEnd("run".into()), t0);

        assert!(app.stage.has_tag(&WidgetId::zone("verbs"), VisualTag::Matched));
        assert!(!app.stage.has_tag(&WidgetId::zone("verbs"), VisualTag::Hover));
        assert!(!app.stage.has_tag(&WidgetId::item("run"), VisualTag::Dragging));
        assert_eq!(app.zone("verbs").unwrap().match_state, MatchState::Matched);
        assert!(app.drag.is_none());

        update(&mut app, Action::Tick, t0 + ms(2000));
        assert!(!app.stage.has_tag(&WidgetId::zone("verbs"), VisualTag::Matched));
        assert_eq!(app.zone("verbs").unwrap().match_state, MatchState::Neutral);
    }

    #[test]
    fn test_drop_on_wrong_zone() {
        let mut app = test_app_at(2);
        update(
            &mut app,
            Action::Drop {
                zone: "nouns".into(),
                payload: "verb".into(),
            },
            Instant::now(),
        );
        assert_eq!(app.zone("nouns").unwrap().match_state, MatchState::Mismatched);
        assert_eq!(app.status_message, "Not a match for Nouns");
    }

    #[test]
    fn test_keyboard_drag_path() {
        let mut app = test_app_at(2);
        let t0 = Instant::now();

        // heading -> run
        update(&mut app, Action::FocusNext, t0);
        assert_eq!(app.stage.focused(), Some(&WidgetId::item("run")));
        update(&mut app, Action::Activate, t0);
        assert!(app.stage.has_tag(&WidgetId::item("run"), VisualTag::Dragging));

        // run -> tree -> verbs
        update(&mut app, Action::FocusNext, t0);
        update(&mut app, Action::FocusNext, t0);
        assert!(app.stage.has_tag(&WidgetId::zone("verbs"), VisualTag::Hover));

        // verbs -> nouns moves the hover along
        update(&mut app, Action::FocusNext, t0);
        assert!(!app.stage.has_tag(&WidgetId::zone("verbs"), VisualTag::Hover));
        assert!(app.stage.has_tag(&WidgetId::zone("nouns"), VisualTag::Hover));

        update(&mut app, Action::Activate, t0);
        assert_eq!(app.zone("nouns").unwrap().match_state, MatchState::Mismatched);
        assert!(!app.stage.has_tag(&WidgetId::item("run"), VisualTag::Dragging));
        assert!(app.drag.is_none());
    }

    #[test]
    fn test_activating_carried_item_again_cancels() {
        let mut app = test_app_at(2);
        let t0 = Instant::now();
        update(&mut app, Action::FocusNext, t0);
        update(&mut app, Action::Activate, t0);
        update(&mut app, Action::Activate, t0);
        assert!(app.drag.is_none());
        assert!(!app.stage.has_tag(&WidgetId::item("run"), VisualTag::Dragging));
    }

    #[test]
    fn test_activating_zone_without_item() {
        let mut app = test_app_at(2);
        let t0 = Instant::now();
        for _ in 0..3 {
            update(&mut app, Action::FocusNext, t0);
        }
        assert_eq!(app.stage.focused(), Some(&WidgetId::zone("verbs")));
        update(&mut app, Action::Activate, t0);
        assert_eq!(app.zone("verbs").unwrap().match_state, MatchState::Neutral);
        assert_eq!(app.status_message, "Pick up an item first");
    }

    #[test]
    fn test_page_transition_cancels_carried_item() {
        let mut app = test_app_at(2);
        let t0 = Instant::now();
        update(&mut app, Action::DragStart("tree".into()), t0);
        update(&mut app, Action::Next, t0);
        assert!(app.drag.is_none());
        assert!(!app.stage.has_tag(&WidgetId::item("tree"), VisualTag::Dragging));
    }

    #[test]
    fn test_activate_on_option_selects_it() {
        let mut app = test_app_at(1);
        let t0 = Instant::now();
        update(&mut app, Action::FocusNext, t0);
        update(&mut app, Action::FocusNext, t0);
        assert_eq!(app.stage.focused(), Some(&WidgetId::option("colors", "blue")));
        update(&mut app, Action::Activate, t0);
        assert_eq!(app.quiz[0].options[1].selection, SelectionState::MarkedIncorrect);
    }

    #[test]
    fn test_activate_on_heading_does_nothing() {
        let mut app = test_app();
        assert_eq!(update(&mut app, Action::Activate, Instant::now()), Effect::None);
        assert!(app.scheduler.is_idle());
    }

    #[test]
    fn test_quit() {
        let mut app = test_app();
        assert_eq!(update(&mut app, Action::Quit, Instant::now()), Effect::Quit);
    }
}
