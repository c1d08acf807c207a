use std::collections::BTreeSet;
use std::fmt;

use crate::ast::{CmpOp, Expr, Literal, Reference, Script};
use crate::error::EvalError;

/// Node evaluations allowed per script run unless the caller picks a limit.
pub const DEFAULT_MAX_STEPS: u32 = 10_000;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Num(f64),
    Bool(bool),
    /// Selected values of a multi-select answer.
    Set(BTreeSet<String>),
    /// The referenced item has no answer.
    Null,
}

impl Value {
    fn type_name(&self) -> &'static str {
        match self {
            Self::Str(_) => "string",
            Self::Num(_) => "number",
            Self::Bool(_) => "boolean",
            Self::Set(_) => "selection",
            Self::Null => "null",
        }
    }

    fn is_blank(&self) -> bool {
        match self {
            Self::Str(s) => s.trim().is_empty(),
            Self::Set(set) => set.iter().all(|v| v.trim().is_empty()),
            Self::Null => true,
            Self::Num(_) | Self::Bool(_) => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => write!(f, "{s:?}"),
            Self::Num(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Set(set) => write!(f, "{set:?}"),
            Self::Null => f.write_str("null"),
        }
    }
}

/// Outcome of resolving a [`Reference`].
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    Value(Value),
    /// The reference names something real that has no answer.
    Unset,
    /// The reference names nothing in scope.
    Unknown,
}

/// Source of reference values for one evaluation. Implementations must be
/// read-only views; the interpreter never writes through them.
pub trait Bindings {
    fn lookup(&self, reference: &Reference) -> Lookup;
}

/// Evaluate `script` to a boolean. `true` means the condition holds and the
/// validator passes.
pub fn evaluate(script: &Script, bindings: &dyn Bindings, max_steps: u32) -> Result<bool, EvalError> {
    let mut run = Run {
        bindings,
        steps: 0,
        max_steps,
    };
    let result = run.eval(&script.expr);
    tracing::trace!(steps = run.steps, ok = result.is_ok(), "script evaluated");

    match result? {
        Value::Bool(b) => Ok(b),
        other => Err(EvalError::Type(format!(
            "expression must produce a boolean, got {}",
            other.type_name()
        ))),
    }
}

struct Run<'a> {
    bindings: &'a dyn Bindings,
    steps: u32,
    max_steps: u32,
}

impl Run<'_> {
    fn tick(&mut self) -> Result<(), EvalError> {
        self.steps += 1;
        if self.steps > self.max_steps {
            return Err(EvalError::BudgetExceeded {
                limit: self.max_steps,
            });
        }
        Ok(())
    }

    fn resolve(&self, reference: &Reference) -> Result<Value, EvalError> {
        match self.bindings.lookup(reference) {
            Lookup::Value(v) => Ok(v),
            Lookup::Unset => Ok(Value::Null),
            Lookup::Unknown => Err(EvalError::UnknownReference(reference.to_string())),
        }
    }

    fn eval(&mut self, expr: &Expr) -> Result<Value, EvalError> {
        self.tick()?;
        match expr {
            Expr::Literal(Literal::Str(s)) => Ok(Value::Str(s.clone())),
            Expr::Literal(Literal::Num(n)) => Ok(Value::Num(*n)),
            Expr::Literal(Literal::Bool(b)) => Ok(Value::Bool(*b)),
            Expr::Ref(reference) => self.resolve(reference),
            Expr::Not(inner) => {
                let value = self.eval(inner)?;
                Ok(Value::Bool(!self.boolean(&value, "!")?))
            }
            Expr::And(lhs, rhs) => {
                let left = self.eval(lhs)?;
                if !self.boolean(&left, "&&")? {
                    return Ok(Value::Bool(false));
                }
                let right = self.eval(rhs)?;
                Ok(Value::Bool(self.boolean(&right, "&&")?))
            }
            Expr::Or(lhs, rhs) => {
                let left = self.eval(lhs)?;
                if self.boolean(&left, "||")? {
                    return Ok(Value::Bool(true));
                }
                let right = self.eval(rhs)?;
                Ok(Value::Bool(self.boolean(&right, "||")?))
            }
            Expr::Compare { op, lhs, rhs } => {
                let left = self.eval(lhs)?;
                let right = self.eval(rhs)?;
                compare(*op, &left, &right).map(Value::Bool)
            }
            Expr::IsSet(reference) => {
                let value = self.resolve(reference)?;
                Ok(Value::Bool(!value.is_blank()))
            }
            Expr::Contains(reference, needle) => match self.resolve(reference)? {
                Value::Set(set) => Ok(Value::Bool(set.contains(needle))),
                Value::Str(s) => Ok(Value::Bool(&s == needle)),
                Value::Null => Ok(Value::Bool(false)),
                other => Err(EvalError::Type(format!(
                    "contains({reference}, ..) needs a selection or string, got {}",
                    other.type_name()
                ))),
            },
            Expr::ToNumber(reference) => match self.resolve(reference)? {
                Value::Num(n) => Ok(Value::Num(n)),
                Value::Str(s) => match s.trim().parse::<f64>() {
                    // `inf` and `NaN` parse as f64 but are not numeric answers.
                    Ok(n) if n.is_finite() => Ok(Value::Num(n)),
                    _ => Err(EvalError::Type(format!("num({reference}): {s:?} is not a number"))),
                },
                other => Err(EvalError::Type(format!(
                    "num({reference}) needs a string answer, got {}",
                    other.type_name()
                ))),
            },
        }
    }

    fn boolean(&self, value: &Value, op: &str) -> Result<bool, EvalError> {
        match value {
            Value::Bool(b) => Ok(*b),
            other => Err(EvalError::Type(format!(
                "'{op}' needs boolean operands, got {}",
                other.type_name()
            ))),
        }
    }
}

/// Compare without coercion. `null` only supports `==`/`!=` and equals
/// only `null`.
fn compare(op: CmpOp, left: &Value, right: &Value) -> Result<bool, EvalError> {
    let mismatch = || {
        EvalError::Type(format!(
            "cannot compare {} {} {}",
            left.type_name(),
            op.as_str(),
            right.type_name()
        ))
    };

    let ordering = match (left, right) {
        (Value::Null, _) | (_, Value::Null) => {
            let equal = matches!((left, right), (Value::Null, Value::Null));
            return match op {
                CmpOp::Eq => Ok(equal),
                CmpOp::Ne => Ok(!equal),
                _ => Err(mismatch()),
            };
        }
        (Value::Str(a), Value::Str(b)) => a.cmp(b),
        (Value::Num(a), Value::Num(b)) => a.partial_cmp(b).ok_or_else(mismatch)?,
        (Value::Bool(a), Value::Bool(b)) => {
            return match op {
                CmpOp::Eq => Ok(a == b),
                CmpOp::Ne => Ok(a != b),
                _ => Err(mismatch()),
            };
        }
        (Value::Set(a), Value::Set(b)) => {
            return match op {
                CmpOp::Eq => Ok(a == b),
                CmpOp::Ne => Ok(a != b),
                _ => Err(mismatch()),
            };
        }
        _ => return Err(mismatch()),
    };

    Ok(match op {
        CmpOp::Eq => ordering.is_eq(),
        CmpOp::Ne => ordering.is_ne(),
        CmpOp::Lt => ordering.is_lt(),
        CmpOp::Le => ordering.is_le(),
        CmpOp::Gt => ordering.is_gt(),
        CmpOp::Ge => ordering.is_ge(),
    })
}
