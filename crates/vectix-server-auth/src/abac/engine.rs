// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Expression evaluation.
//!
//! [`evaluate`] walks a parsed [`Expr`] against a context value, normally
//! `{"actor": {...}, "target": {...}}`. Evaluation is pure: the same tree and
//! context always produce the same result.

use serde_json::Value;

use super::error::EvalError;
use super::expr::Expr;

/// Evaluate a parsed expression against `context`.
///
/// `if` evaluates its condition first and then only the selected branch. A
/// false condition without an else branch yields `null`.
pub fn evaluate(expr: &Expr, context: &Value) -> Result<Value, EvalError> {
	match expr {
		Expr::Literal(value) => Ok(value.clone()),
		Expr::Var(path) => Ok(resolve_var(context, path)),
		Expr::If {
			cond,
			then,
			otherwise,
		} => {
			if is_truthy(&evaluate(cond, context)?) {
				evaluate(then, context)
			} else if let Some(otherwise) = otherwise {
				evaluate(otherwise, context)
			} else {
				Ok(Value::Null)
			}
		}
		Expr::Op { op, args } => {
			let values = args
				.iter()
				.map(|arg| evaluate(arg, context))
				.collect::<Result<Vec<_>, _>>()?;
			op.apply(&values)
		}
	}
}

/// Parse and evaluate a stored expression in one step.
pub fn evaluate_value(expr: &Value, context: &Value) -> Result<Value, EvalError> {
	evaluate(&Expr::parse(expr)?, context)
}

/// Resolve a dot-separated path. Any missing or non-object step yields `null`.
pub fn resolve_var(context: &Value, path: &str) -> Value {
	let mut current = context;
	for part in path.split('.') {
		match current.as_object().and_then(|map| map.get(part)) {
			Some(next) => current = next,
			None => return Value::Null,
		}
	}
	current.clone()
}

/// `null`, `false`, `0`, `""`, `[]` and `{}` are falsy. Everything else is truthy.
pub fn is_truthy(value: &Value) -> bool {
	match value {
		Value::Null => false,
		Value::Bool(b) => *b,
		Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
		Value::String(s) => !s.is_empty(),
		Value::Array(items) => !items.is_empty(),
		Value::Object(map) => !map.is_empty(),
	}
}
