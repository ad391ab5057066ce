//! # Activities
//!
//! Embedded exercises, independent of page navigation.
//!
//! - [`quiz`]: multiple-choice selection and the "check all" pass
//! - [`drag_drop`]: type-tag matching between items and zones
//!
//! Both are stateless evaluators: plain functions that take the widget they
//! act on and the surface to tag. Timers for transient feedback are
//! scheduled by the caller (`action::update`), not here.

pub mod drag_drop;
pub mod quiz;
