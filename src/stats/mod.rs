//! Statistics domain: recorded actions and the declarative tables mapping
//! them to counters, point decisions, and category eligibility.

pub mod action;
pub mod catalog;

pub use action::{
    Action, AttackResult, AttitudeGrade, BlockResult, Category, DefenseResult, PlacementResult,
    ReceptionResult, ServePlacement, ServeResult,
};
pub use catalog::{CounterField, PointDecision, allowed_categories, counter_for, point_decision};
