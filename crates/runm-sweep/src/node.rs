use std::iter::Fuse;
use std::slice;

use runm_core::errors::{ErrorInfo, RunmError};

use crate::assignment::ParameterAssignment;
use crate::decimal::{Decimal, NumberFormat};

/// Declarative sweep tree.
///
/// Leaves produce single-parameter assignments; composites zip
/// ([`SweepNode::Parallel`]) or multiply ([`SweepNode::Combination`]) the
/// sequences of their children. Every node enumerates a finite sequence and
/// each call to [`SweepNode::enumerate`] starts over from the beginning.
#[derive(Debug, Clone, PartialEq)]
pub enum SweepNode {
    /// Inclusive arithmetic progression.
    NumericSequence(NumericSequence),
    /// Explicit list of values for one parameter.
    ValueList(ValueList),
    /// Lock-step zip of the children.
    Parallel {
        /// Children advanced together.
        children: Vec<SweepNode>,
    },
    /// Cartesian product of the children, last child varying fastest.
    Combination {
        /// Children multiplied together.
        children: Vec<SweepNode>,
    },
}

/// Explicit value list for one parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueList {
    /// Parameter name.
    pub parameter: String,
    /// Values in emission order.
    pub values: Vec<String>,
}

/// Decimal-exact progression `from, from + by, ...` up to and including `to`.
///
/// Construction rejects progressions that would never terminate, so a value of
/// this type always enumerates a finite sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericSequence {
    parameter: String,
    from: Decimal,
    to: Decimal,
    by: Decimal,
    format: NumberFormat,
}

impl NumericSequence {
    /// Validates and builds a sequence.
    pub fn new(
        parameter: impl Into<String>,
        from: Decimal,
        to: Decimal,
        by: Decimal,
    ) -> Result<Self, RunmError> {
        let parameter = parameter.into();
        let error = |code: &str, message: &str| {
            RunmError::Config(
                ErrorInfo::new(code, message)
                    .with_parameter(parameter.clone())
                    .with_context("from", from.to_string())
                    .with_context("to", to.to_string())
                    .with_context("by", by.to_string()),
            )
        };
        if by.is_zero() {
            return Err(error("sequence_step_zero", "sequence step must be nonzero"));
        }
        if from <= to && by.is_negative() {
            return Err(error(
                "sequence_nonterminating",
                "sequence step must be positive when from <= to",
            ));
        }
        let format = NumberFormat::covering([&from, &to, &by]);
        for bound in [&from, &to, &by] {
            if bound.rescale(format.fraction_digits).is_none() {
                return Err(error("decimal_overflow", "sequence bounds out of range"));
            }
        }
        Ok(Self {
            parameter,
            from,
            to,
            by,
            format,
        })
    }

    /// Parses textual bounds and builds a sequence.
    pub fn parse(
        parameter: impl Into<String>,
        from: &str,
        to: &str,
        by: &str,
    ) -> Result<Self, RunmError> {
        Self::new(parameter, from.parse()?, to.parse()?, by.parse()?)
    }

    /// Parameter name.
    pub fn parameter(&self) -> &str {
        &self.parameter
    }

    /// First value.
    pub fn from(&self) -> Decimal {
        self.from
    }

    /// Inclusive upper bound.
    pub fn to(&self) -> Decimal {
        self.to
    }

    /// Step.
    pub fn by(&self) -> Decimal {
        self.by
    }

    /// Format shared by every emitted value.
    pub fn format(&self) -> NumberFormat {
        self.format
    }
}

impl SweepNode {
    /// Value list leaf.
    pub fn list<P, I, V>(parameter: P, values: I) -> Self
    where
        P: Into<String>,
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        SweepNode::ValueList(ValueList {
            parameter: parameter.into(),
            values: values.into_iter().map(Into::into).collect(),
        })
    }

    /// Numeric sequence leaf parsed from textual bounds.
    pub fn sequence(
        parameter: impl Into<String>,
        from: &str,
        to: &str,
        by: &str,
    ) -> Result<Self, RunmError> {
        NumericSequence::parse(parameter, from, to, by).map(SweepNode::NumericSequence)
    }

    /// Lock-step zip of `children`.
    pub fn parallel(children: Vec<SweepNode>) -> Self {
        SweepNode::Parallel { children }
    }

    /// Cartesian product of `children`.
    pub fn combination(children: Vec<SweepNode>) -> Self {
        SweepNode::Combination { children }
    }

    /// Starts a fresh, independent enumeration of this node.
    pub fn enumerate(&self) -> Assignments<'_> {
        let inner = match self {
            SweepNode::ValueList(list) => Inner::List {
                parameter: &list.parameter,
                values: list.values.iter(),
            },
            SweepNode::NumericSequence(seq) => Inner::Sequence {
                seq,
                next: Some(seq.from),
            },
            SweepNode::Parallel { children } => Inner::Parallel {
                children: children.iter().map(|child| child.enumerate().fuse()).collect(),
                current: ParameterAssignment::new(),
                finished: false,
            },
            SweepNode::Combination { children } => Inner::Combination {
                nodes: children,
                iters: children.iter().map(SweepNode::enumerate).collect(),
                level: 0,
                current: ParameterAssignment::new(),
                finished: false,
            },
        };
        Assignments { inner }
    }

    /// Names of every parameter this tree can assign, in first-seen order.
    pub fn parameters(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_parameters(&mut names);
        names
    }

    fn collect_parameters<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            SweepNode::ValueList(list) => push_unique(names, &list.parameter),
            SweepNode::NumericSequence(seq) => push_unique(names, &seq.parameter),
            SweepNode::Parallel { children } | SweepNode::Combination { children } => {
                for child in children {
                    child.collect_parameters(names);
                }
            }
        }
    }
}

fn push_unique<'a>(names: &mut Vec<&'a str>, name: &'a str) {
    if !names.contains(&name) {
        names.push(name);
    }
}

/// Lazy sequence of assignments produced by [`SweepNode::enumerate`].
pub struct Assignments<'a> {
    inner: Inner<'a>,
}

enum Inner<'a> {
    List {
        parameter: &'a str,
        values: slice::Iter<'a, String>,
    },
    Sequence {
        seq: &'a NumericSequence,
        next: Option<Decimal>,
    },
    Parallel {
        children: Vec<Fuse<Assignments<'a>>>,
        current: ParameterAssignment,
        finished: bool,
    },
    Combination {
        nodes: &'a [SweepNode],
        iters: Vec<Assignments<'a>>,
        level: usize,
        current: ParameterAssignment,
        finished: bool,
    },
}

impl<'a> Iterator for Assignments<'a> {
    type Item = ParameterAssignment;

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.inner {
            Inner::List { parameter, values } => values
                .next()
                .map(|value| ParameterAssignment::single(*parameter, value.as_str())),
            Inner::Sequence { seq, next } => {
                let value = next.take()?;
                if value > seq.to {
                    return None;
                }
                *next = value.checked_add(&seq.by);
                Some(ParameterAssignment::single(
                    seq.parameter.as_str(),
                    seq.format.render(&value),
                ))
            }
            Inner::Parallel {
                children,
                current,
                finished,
            } => {
                if *finished {
                    return None;
                }
                // Exhausted children keep contributing their last value.
                let mut exhausted = 0;
                for child in children.iter_mut() {
                    match child.next() {
                        Some(assignment) => current.merge(assignment),
                        None => exhausted += 1,
                    }
                }
                if exhausted == children.len() {
                    *finished = true;
                    return None;
                }
                Some(current.clone())
            }
            Inner::Combination {
                nodes,
                iters,
                level,
                current,
                finished,
            } => {
                if *finished {
                    return None;
                }
                let nodes: &'a [SweepNode] = *nodes;
                if nodes.is_empty() {
                    *finished = true;
                    return Some(ParameterAssignment::new());
                }
                let last = nodes.len() - 1;
                loop {
                    match iters[*level].next() {
                        Some(assignment) => {
                            current.merge(assignment);
                            if *level == last {
                                return Some(current.clone());
                            }
                            *level += 1;
                        }
                        None => {
                            if *level == 0 {
                                *finished = true;
                                return None;
                            }
                            iters[*level] = nodes[*level].enumerate();
                            *level -= 1;
                        }
                    }
                }
            }
        }
    }
}
