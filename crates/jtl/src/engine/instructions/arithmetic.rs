//! Binary arithmetic. Integer operands stay integral while the result fits;
//! everything else is computed in `f64`.

use serde_json::{Number, Value};
use std::rc::Rc;

use super::common::{Produced, number, selected, single};
use crate::engine::runtime::{Error, ErrorKind};
use crate::engine::scope::Scope;
use crate::model::NodeList;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Op {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Power,
}

impl Op {
    fn name(self) -> &'static str {
        match self {
            Op::Add => "add",
            Op::Subtract => "subtract",
            Op::Multiply => "multiply",
            Op::Divide => "divide",
            Op::Modulo => "modulo",
            Op::Power => "power",
        }
    }

    fn integer(self, a: i64, b: i64) -> Option<i64> {
        match self {
            Op::Add => a.checked_add(b),
            Op::Subtract => a.checked_sub(b),
            Op::Multiply => a.checked_mul(b),
            Op::Divide => (b != 0 && a.checked_rem(b) == Some(0)).then(|| a.checked_div(b)).flatten(),
            Op::Modulo => a.checked_rem(b),
            Op::Power => u32::try_from(b).ok().and_then(|exp| a.checked_pow(exp)),
        }
    }

    fn float(self, a: f64, b: f64) -> f64 {
        match self {
            Op::Add => a + b,
            Op::Subtract => a - b,
            Op::Multiply => a * b,
            Op::Divide => a / b,
            Op::Modulo => a % b,
            Op::Power => a.powf(b),
        }
    }

    /// Apply to two JSON numbers; `None` when the result is not finite.
    pub(crate) fn apply(self, a: &Number, b: &Number) -> Option<Number> {
        if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64())
            && let Some(r) = self.integer(x, y)
        {
            return Some(Number::from(r));
        }
        let x = a.as_f64()?;
        let y = b.as_f64()?;
        Number::from_f64(self.float(x, y))
    }
}

fn binary(scope: &Rc<Scope>, op: Op) -> Produced {
    let selected = selected(scope)?;
    let compare = scope.require_attribute("compare")?;
    let operand = number(scope, single(scope, &compare, "arithmetic operand")?, "arithmetic operand")?.clone();
    let mut results = NodeList::new();
    for entry in &selected {
        let value = number(scope, entry, op.name())?;
        let result = op.apply(value, &operand).ok_or_else(|| -> Error {
            scope.error(
                ErrorKind::ResultNodeUnexpectedType,
                format!("{} of {value} and {operand} is not a finite number", op.name()),
            )
        })?;
        results.push_member(NodeList::of_value(Value::Number(result)));
    }
    Ok(Some(results))
}

pub(super) fn add(scope: &Rc<Scope>) -> Produced {
    binary(scope, Op::Add)
}

pub(super) fn subtract(scope: &Rc<Scope>) -> Produced {
    binary(scope, Op::Subtract)
}

pub(super) fn multiply(scope: &Rc<Scope>) -> Produced {
    binary(scope, Op::Multiply)
}

pub(super) fn divide(scope: &Rc<Scope>) -> Produced {
    binary(scope, Op::Divide)
}

pub(super) fn modulo(scope: &Rc<Scope>) -> Produced {
    binary(scope, Op::Modulo)
}

pub(super) fn power(scope: &Rc<Scope>) -> Produced {
    binary(scope, Op::Power)
}
