// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The operator table.
//!
//! Every operator takes its arguments already evaluated, in order. `if` and
//! `var` are not operators: they are tree variants handled by the evaluator.
//!
//! | name | arity | result |
//! |------|-------|--------|
//! | `eq`, `neq` | 2 | value equality, numbers compared numerically |
//! | `in`, `contains` | 2 | container first, member second |
//! | `startswith`, `endswith` | 2 | false unless both are strings |
//! | `lt`, `gt` | 2 | number/number or string/string ordering |
//! | `and`, `or` | 1+ | all / any truthy |
//! | `not` | 1 | negated truthiness |
//! | `len` | 1 | length, 0 for null |
//! | `regexMatch` | 2 | pattern first, anchored at the start of the subject |

use std::cmp::Ordering;
use std::fmt;

use regex::Regex;
use serde_json::Value;

use super::engine::is_truthy;
use super::error::EvalError;

pub type OperatorFn = fn(&[Value]) -> Result<Value, EvalError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
	Exact(usize),
	AtLeast(usize),
}

impl Arity {
	pub fn accepts(self, count: usize) -> bool {
		match self {
			Arity::Exact(n) => count == n,
			Arity::AtLeast(n) => count >= n,
		}
	}
}

impl fmt::Display for Arity {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Arity::Exact(n) => write!(f, "{n}"),
			Arity::AtLeast(n) => write!(f, "at least {n}"),
		}
	}
}

pub struct Operator {
	pub name: &'static str,
	pub arity: Arity,
	apply: OperatorFn,
}

impl Operator {
	pub fn apply(&self, args: &[Value]) -> Result<Value, EvalError> {
		if !self.arity.accepts(args.len()) {
			return Err(EvalError::Arity {
				op: self.name.to_string(),
				expected: self.arity.to_string(),
				actual: args.len(),
			});
		}
		(self.apply)(args)
	}
}

impl fmt::Debug for Operator {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Operator")
			.field("name", &self.name)
			.field("arity", &self.arity)
			.finish()
	}
}

impl PartialEq for Operator {
	fn eq(&self, other: &Self) -> bool {
		self.name == other.name
	}
}

pub static OPERATORS: &[Operator] = &[
	Operator {
		name: "eq",
		arity: Arity::Exact(2),
		apply: op_eq,
	},
	Operator {
		name: "neq",
		arity: Arity::Exact(2),
		apply: op_neq,
	},
	Operator {
		name: "in",
		arity: Arity::Exact(2),
		apply: op_in,
	},
	Operator {
		name: "contains",
		arity: Arity::Exact(2),
		apply: op_in,
	},
	Operator {
		name: "startswith",
		arity: Arity::Exact(2),
		apply: op_startswith,
	},
	Operator {
		name: "endswith",
		arity: Arity::Exact(2),
		apply: op_endswith,
	},
	Operator {
		name: "lt",
		arity: Arity::Exact(2),
		apply: op_lt,
	},
	Operator {
		name: "gt",
		arity: Arity::Exact(2),
		apply: op_gt,
	},
	Operator {
		name: "and",
		arity: Arity::AtLeast(1),
		apply: op_and,
	},
	Operator {
		name: "or",
		arity: Arity::AtLeast(1),
		apply: op_or,
	},
	Operator {
		name: "not",
		arity: Arity::Exact(1),
		apply: op_not,
	},
	Operator {
		name: "len",
		arity: Arity::Exact(1),
		apply: op_len,
	},
	Operator {
		name: "regexMatch",
		arity: Arity::Exact(2),
		apply: op_regex_match,
	},
];

pub fn lookup(name: &str) -> Option<&'static Operator> {
	OPERATORS.iter().find(|op| op.name == name)
}

/// JSON equality with numbers compared by value, so `1 == 1.0`.
pub fn values_equal(a: &Value, b: &Value) -> bool {
	match (a, b) {
		(Value::Number(_), Value::Number(_)) => compare_numbers(a, b) == Some(Ordering::Equal),
		(Value::Array(xs), Value::Array(ys)) => {
			xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| values_equal(x, y))
		}
		(Value::Object(xs), Value::Object(ys)) => {
			xs.len() == ys.len()
				&& xs
					.iter()
					.all(|(k, x)| ys.get(k).is_some_and(|y| values_equal(x, y)))
		}
		_ => a == b,
	}
}

fn compare_numbers(a: &Value, b: &Value) -> Option<Ordering> {
	if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
		return Some(x.cmp(&y));
	}
	if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
		return Some(x.cmp(&y));
	}
	a.as_f64()?.partial_cmp(&b.as_f64()?)
}

fn type_name(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "bool",
		Value::Number(_) => "number",
		Value::String(_) => "string",
		Value::Array(_) => "array",
		Value::Object(_) => "object",
	}
}

fn op_eq(args: &[Value]) -> Result<Value, EvalError> {
	Ok(Value::Bool(values_equal(&args[0], &args[1])))
}

fn op_neq(args: &[Value]) -> Result<Value, EvalError> {
	Ok(Value::Bool(!values_equal(&args[0], &args[1])))
}

/// Membership: arrays by element, strings by substring. Any other container is false.
fn op_in(args: &[Value]) -> Result<Value, EvalError> {
	let found = match (&args[0], &args[1]) {
		(Value::Array(items), member) => items.iter().any(|item| values_equal(item, member)),
		(Value::String(haystack), Value::String(needle)) => haystack.contains(needle.as_str()),
		_ => false,
	};
	Ok(Value::Bool(found))
}

fn op_startswith(args: &[Value]) -> Result<Value, EvalError> {
	Ok(Value::Bool(match (&args[0], &args[1]) {
		(Value::String(s), Value::String(prefix)) => s.starts_with(prefix.as_str()),
		_ => false,
	}))
}

fn op_endswith(args: &[Value]) -> Result<Value, EvalError> {
	Ok(Value::Bool(match (&args[0], &args[1]) {
		(Value::String(s), Value::String(suffix)) => s.ends_with(suffix.as_str()),
		_ => false,
	}))
}

fn ordering(op: &'static str, a: &Value, b: &Value) -> Result<Ordering, EvalError> {
	let ord = match (a, b) {
		(Value::Number(_), Value::Number(_)) => compare_numbers(a, b),
		(Value::String(x), Value::String(y)) => Some(x.cmp(y)),
		_ => None,
	};
	ord.ok_or_else(|| EvalError::TypeMismatch {
		op,
		detail: format!("{} and {}", type_name(a), type_name(b)),
	})
}

fn op_lt(args: &[Value]) -> Result<Value, EvalError> {
	Ok(Value::Bool(
		ordering("lt", &args[0], &args[1])? == Ordering::Less,
	))
}

fn op_gt(args: &[Value]) -> Result<Value, EvalError> {
	Ok(Value::Bool(
		ordering("gt", &args[0], &args[1])? == Ordering::Greater,
	))
}

fn op_and(args: &[Value]) -> Result<Value, EvalError> {
	Ok(Value::Bool(args.iter().all(is_truthy)))
}

fn op_or(args: &[Value]) -> Result<Value, EvalError> {
	Ok(Value::Bool(args.iter().any(is_truthy)))
}

fn op_not(args: &[Value]) -> Result<Value, EvalError> {
	Ok(Value::Bool(!is_truthy(&args[0])))
}

fn op_len(args: &[Value]) -> Result<Value, EvalError> {
	let len = match &args[0] {
		Value::Null => 0,
		Value::String(s) => s.chars().count(),
		Value::Array(items) => items.len(),
		Value::Object(map) => map.len(),
		other => {
			return Err(EvalError::TypeMismatch {
				op: "len",
				detail: type_name(other).to_string(),
			})
		}
	};
	Ok(Value::from(len as u64))
}

fn op_regex_match(args: &[Value]) -> Result<Value, EvalError> {
	let pattern = match &args[0] {
		Value::String(p) => p,
		other => {
			return Err(EvalError::TypeMismatch {
				op: "regexMatch",
				detail: format!("{} pattern", type_name(other)),
			})
		}
	};
	let Value::String(subject) = &args[1] else {
		return Ok(Value::Bool(false));
	};

	let regex = Regex::new(&format!(r"\A(?:{pattern})")).map_err(|e| EvalError::InvalidPattern {
		pattern: pattern.clone(),
		message: e.to_string(),
	})?;
	Ok(Value::Bool(regex.is_match(subject)))
}
