//! Textbook LP/MIP word problems modeled with `lpex-solver`.
//!
//! Each exercise is a builder function returning a fresh [`Program`]
//! together with the window a plot of its feasible region should cover.

mod catalog;

pub use catalog::{AxisWindow, Exercise, catalog, find};

pub use lpex_solver::{ModelError, Program};
