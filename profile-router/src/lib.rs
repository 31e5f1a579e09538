//! Profile-based public transport routing.
//!
//! Answers, for every station of a network at once: "what are the
//! Pareto-optimal ways to reach this destination today?" A single
//! connection scan over one day's timetable produces a [`profile::Profile`]
//! of per-station fronts, and [`extract::journeys`] turns any station's
//! front back into concrete journeys.

pub mod criteria;
pub mod extract;
pub mod front;
pub mod journey;
pub mod pack;
pub mod profile;
pub mod router;
pub mod timetable;

#[cfg(test)]
mod router_tests;
