//! Business logic services.

pub mod activity;
pub mod auth;
pub mod dwr;
pub mod expense_lifecycle;
pub mod expenses;
pub mod fse_dashboard;
pub mod jobs;
pub mod latest;
pub mod leadgen_metrics;
pub mod leads;
pub mod partial;
pub mod targets;
pub mod team;
pub mod team_dashboard;
