use std::fmt;

/// Branch condition guarding one outgoing edge of a cell.
///
/// Comparisons read the first element of the step input, `inp[0]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Condition {
    Literal(bool),
    Less(i64),
    AtLeast(i64),
    Equals(i64),
    /// `flag == 1` when true, `flag == 0` otherwise.
    Flag(bool),
    Both(Box<Condition>, Box<Condition>),
}

impl Condition {
    /// Conjunction of two conditions, dropping a literal `true` operand.
    pub fn conjoin(lhs: Condition, rhs: Condition) -> Condition {
        match (lhs, rhs) {
            (Condition::Literal(true), other) | (other, Condition::Literal(true)) => other,
            (lhs, rhs) => Condition::Both(Box::new(lhs), Box::new(rhs)),
        }
    }

    /// Evaluates the condition for `input` with the cell's flag set to `flag`.
    ///
    /// An input without a first element satisfies no comparison.
    pub fn holds(&self, input: &[i64], flag: bool) -> bool {
        let first = input.first().copied();
        match self {
            Condition::Literal(b) => *b,
            Condition::Less(v) => first.map_or(false, |x| x < *v),
            Condition::AtLeast(v) => first.map_or(false, |x| x >= *v),
            Condition::Equals(v) => first.map_or(false, |x| x == *v),
            Condition::Flag(expected) => flag == *expected,
            Condition::Both(lhs, rhs) => lhs.holds(input, flag) && rhs.holds(input, flag),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Literal(b) => write!(f, "{}", b),
            Condition::Less(v) => write!(f, "inp[0] < {}", v),
            Condition::AtLeast(v) => write!(f, "inp[0] >= {}", v),
            Condition::Equals(v) => write!(f, "inp[0] == {}", v),
            Condition::Flag(set) => write!(f, "flag == {}", if *set { 1 } else { 0 }),
            Condition::Both(lhs, rhs) => write!(f, "{} && {}", lhs, rhs),
        }
    }
}
