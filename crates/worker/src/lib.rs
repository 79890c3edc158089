//! Reporting sweep over the breeding engine's scheduled state.
//!
//! The engine has no scheduler of its own; this crate is what an operator
//! (or cron) runs to see which alerts surface on a given day and which
//! pregnancies have run past their expected birth date.

pub mod sweep;
