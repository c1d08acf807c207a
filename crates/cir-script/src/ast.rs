use std::fmt;

/// Something a script reads from outside: another item's answer, or the
/// item bound to a named EMR field (`emr.birthDate`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Reference {
    Item(String),
    Emr(String),
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Item(id) => f.write_str(id),
            Self::Emr(field) => write!(f, "emr.{field}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Str(String),
    Num(f64),
    Bool(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CmpOp {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Literal),
    Ref(Reference),
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Compare {
        op: CmpOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// `isSet(ref)`: the referenced item has a non-blank answer.
    IsSet(Reference),
    /// `contains(ref, "val")`: selection membership, or text equality.
    Contains(Reference, String),
    /// `num(ref)`: explicit numeric reading of a text answer.
    ToNumber(Reference),
}

impl Expr {
    pub fn node_count(&self) -> usize {
        match self {
            Self::Literal(_) | Self::Ref(_) | Self::IsSet(_) | Self::Contains(..) | Self::ToNumber(_) => 1,
            Self::Not(inner) => 1 + inner.node_count(),
            Self::And(a, b) | Self::Or(a, b) => 1 + a.node_count() + b.node_count(),
            Self::Compare { lhs, rhs, .. } => 1 + lhs.node_count() + rhs.node_count(),
        }
    }
}

/// A compiled script, kept with its source text.
#[derive(Debug, Clone, PartialEq)]
pub struct Script {
    pub source: String,
    pub expr: Expr,
}
