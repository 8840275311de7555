//! Sweep combinator algebra: leaf and composite nodes that lazily enumerate
//! ordered parameter assignments.

mod assignment;
pub mod decimal;
mod node;
pub mod parse;

pub use assignment::ParameterAssignment;
pub use decimal::{Decimal, NumberFormat};
pub use node::{Assignments, NumericSequence, SweepNode, ValueList};
pub use parse::{node_from_value, scalar_text, sweeps_from_values};
