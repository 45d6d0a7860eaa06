//! Calendar grids, hour-slot binding and a persisted task list.
//!
//! [`planner::Planner`] ties the pieces together: it owns the [`storage::TaskStore`]
//! and a [`calendar::Navigator`], and applies [`planner::Intent`]s coming from
//! whatever front end drives it.

pub mod calendar;
pub mod config;
pub mod domain;
pub mod logging;
pub mod paths;
pub mod planner;
pub mod slots;
pub mod storage;
pub mod ui;
