//! # Core Reading Logic
//!
//! Folio's navigation and activity logic. Nothing in here touches the
//! terminal: visual changes are expressed as tags on a [`surface::Surface`]
//! and delayed work is handed to a [`scheduler::Scheduler`].
//!
//! ```text
//!   Action ──► update(&mut App, action, now) ──► Effect
//!                 │            │           │
//!                 ▼            ▼           ▼
//!            NavigationCtl   Quiz /     Scheduler
//!                 │        DragDrop    (deferred)
//!                 ▼            │
//!          ProgressStore       ▼
//!          (JSON file)      Stage (tags, focus) ◄── tui draws from here
//! ```
//!
//! ## Modules
//!
//! - [`state`]: The `App` struct, all application state in one place
//! - [`action`]: The `Action` enum and the `update()` reducer
//! - [`navigation`]: Page sequence walking with exit transitions
//! - [`activity`]: Quiz and drag-and-drop evaluation
//! - [`book`]: Loading and validating book content
//! - [`surface`]: Widget identities, visual tags, the `Surface` seam
//! - [`scheduler`]: One-shot deferred actions
//! - [`progress`]: Reading position persistence
//! - [`config`]: `~/.folio/config.toml`

pub mod action;
pub mod activity;
pub mod book;
pub mod config;
pub mod navigation;
pub mod progress;
pub mod scheduler;
pub mod state;
pub mod surface;
