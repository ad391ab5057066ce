use std::time::{Duration, Instant};

use folio::core::action::{Action, Effect, update};
use folio::core::activity::drag_drop::MatchState;
use folio::core::book::{Book, BookError};
use folio::core::config::Timing;
use folio::core::progress::{FileStore, MemoryStore, ProgressStore};
use folio::core::state::{App, CheckStatus};
use folio::core::surface::{VisualTag, WidgetId};
use tempfile::TempDir;

// ============================================================================
// Helper Functions
// ============================================================================

const LESSON: &str = r#"
id = "lesson"
title = "Lesson"

[[pages]]
id = "a"
heading = "First"

[[pages]]
id = "b"
heading = "Second"

[[pages.quiz]]
id = "only"
prompt = "Pick the right one"
options = [{ id = "yes", label = "Yes", correct = true }]

[[pages]]
id = "c"
heading = "Third"

[pages.drag_drop]
items = [{ id = "jump", label = "jump", type = "verb" }]
zones = [
    { id = "verbs", label = "Verbs", accept = "verb" },
    { id = "nouns", label = "Nouns", accept = "noun" },
]
"#;

fn lesson() -> Book {
    Book::from_toml(LESSON).unwrap()
}

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

/// Open the lesson over `store` with default timing.
fn open(store: Box<dyn ProgressStore>, restart: bool) -> App {
    App::new(lesson(), store, Timing::default(), restart).unwrap()
}

/// Dispatch `action` at `now`, then let every timer expire.
fn settle(app: &mut App, action: Action, now: Instant) -> Instant {
    update(app, action, now);
    let later = now + ms(10_000);
    update(app, Action::Tick, later);
    later
}

// ============================================================================
// Navigation
// ============================================================================

#[test]
fn test_walk_forward_and_back() {
    let mut app = open(Box::new(MemoryStore::new()), false);
    let mut now = Instant::now();

    assert!(!app.nav.is_previous_enabled());
    now = settle(&mut app, Action::Next, now);
    now = settle(&mut app, Action::Next, now);
    assert_eq!(app.nav.current_page_id(), "c");
    assert!(!app.nav.is_next_enabled());
    assert_eq!(app.nav.progress_ratio(), 1.0);

    // Ends are silent no-ops
    update(&mut app, Action::Next, now);
    assert!(!app.nav.is_transitioning());

    settle(&mut app, Action::First, now);
    assert_eq!(app.nav.current_page_id(), "a");
    assert_eq!(app.nav.progress_ratio(), 0.0);
}

#[test]
fn test_only_one_active_page_at_a_time() {
    let mut app = open(Box::new(MemoryStore::new()), false);
    let now = Instant::now();
    update(&mut app, Action::Last, now);

    // During the exit animation the old page is still the active one
    assert_eq!(app.stage.widgets_with(VisualTag::Active), vec![&WidgetId::page("a")]);
    assert_eq!(app.stage.widgets_with(VisualTag::Exiting), vec![&WidgetId::page("a")]);

    assert_eq!(update(&mut app, Action::Tick, now + ms(300)), Effect::PageChanged);
    assert_eq!(app.stage.widgets_with(VisualTag::Active), vec![&WidgetId::page("c")]);
    assert!(app.stage.widgets_with(VisualTag::Exiting).is_empty());
}

// ============================================================================
// Persistence
// ============================================================================

#[test]
fn test_progress_survives_restart() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("progress.json");

    {
        let mut app = open(Box::new(FileStore::new(&path)), false);
        settle(&mut app, Action::GoTo("c".into()), Instant::now());
        assert!(app.nav.last_saved_at().is_some());
    }

    let store = FileStore::new(&path);
    let raw = store.get("lesson.progress").unwrap().unwrap();
    assert!(raw.contains("\"page_index\":2"));

    let app = open(Box::new(store), false);
    assert_eq!(app.nav.current_page_id(), "c");
    assert!(app.stage.has_tag(&WidgetId::page("c"), VisualTag::Active));

    let fresh = open(Box::new(FileStore::new(&path)), true);
    assert_eq!(fresh.nav.current_page_id(), "a");
}

#[test]
fn test_corrupt_progress_file_starts_over() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("progress.json");
    std::fs::write(&path, "{ not json").unwrap();

    let app = open(Box::new(FileStore::new(&path)), false);
    assert_eq!(app.nav.current_page_id(), "a");
}

// ============================================================================
// Activities
// ============================================================================

#[test]
fn test_single_option_quiz_can_pass_check() {
    let mut app = open(Box::new(MemoryStore::new()), false);
    let now = Instant::now();
    update(
        &mut app,
        Action::SelectOption {
            group: "only".into(),
            option: "yes".into(),
        },
        now,
    );
    update(&mut app, Action::CheckAnswers, now);
    assert_eq!(app.check_status, CheckStatus::AllCorrect);
    assert_eq!(app.status_message, "All correct!");
}

#[test]
fn test_drop_feedback_clears_after_delay() {
    let mut app = open(Box::new(MemoryStore::new()), false);
    let now = Instant::now();
    update(
        &mut app,
        Action::Drop {
            zone: "verbs".into(),
            payload: "verb".into(),
        },
        now,
    );
    assert_eq!(app.zone("verbs").unwrap().match_state, MatchState::Matched);

    update(&mut app, Action::Tick, now + ms(1999));
    assert!(app.stage.has_tag(&WidgetId::zone("verbs"), VisualTag::Matched));

    update(&mut app, Action::Tick, now + ms(2000));
    assert!(!app.stage.has_tag(&WidgetId::zone("verbs"), VisualTag::Matched));
    assert_eq!(app.zone("verbs").unwrap().match_state, MatchState::Neutral);
}

#[test]
fn test_custom_timing_is_honoured() {
    let timing = Timing {
        page_exit: ms(50),
        ..Timing::default()
    };
    let mut app = App::new(lesson(), Box::new(MemoryStore::new()), timing, false).unwrap();
    let now = Instant::now();
    update(&mut app, Action::Next, now);
    assert_eq!(update(&mut app, Action::Tick, now + ms(50)), Effect::PageChanged);
}

// ============================================================================
// Book files
// ============================================================================

#[test]
fn test_load_book_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("lesson.toml");
    std::fs::write(&path, LESSON).unwrap();
    let book = Book::load(&path).unwrap();
    assert_eq!(book.title, "Lesson");
    assert_eq!(book.pages.len(), 3);
}

#[test]
fn test_missing_book_file() {
    let dir = TempDir::new().unwrap();
    let result = Book::load(&dir.path().join("does_not_exist.toml"));
    assert!(matches!(result, Err(BookError::Io(_))));
}

#[test]
fn test_builtin_book_opens() {
    let book = Book::builtin().unwrap();
    let app = App::new(book, Box::new(MemoryStore::new()), Timing::default(), false).unwrap();
    assert_eq!(app.nav.current_page_id(), "cover");
    assert!(!app.quiz.is_empty());
    assert!(!app.zones.is_empty());
}
