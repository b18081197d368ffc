// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The typed expression tree and its JSON storage form.
//!
//! Storage form, as written by policy authoring tools:
//!
//! ```text
//! literal           "editor", 3, true, null, [1, 2, 3]
//! variable          {"var": "target.owner_id"}
//! operator          {"eq": [<expr>, <expr>]}   or   {"not": <expr>}
//! conditional       {"if": [<cond>, <then>]}   or   {"if": [<cond>, <then>, <else>]}
//! ```
//!
//! A scalar argument is shorthand for a one-element list. Arrays are literals
//! and their elements are not evaluated.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use super::error::EvalError;
use super::operators::{lookup, Operator};

/// Nesting limit for operator and conditional nodes.
pub const MAX_DEPTH: usize = 64;

const VAR_KEY: &str = "var";
const IF_KEY: &str = "if";

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
	Literal(Value),
	/// Dot-separated path into the evaluation context.
	Var(String),
	Op {
		op: &'static Operator,
		args: Vec<Expr>,
	},
	If {
		cond: Box<Expr>,
		then: Box<Expr>,
		otherwise: Option<Box<Expr>>,
	},
}

impl Expr {
	/// Parse the stored JSON form. Unknown operators and bad arity are
	/// rejected anywhere in the tree, including untaken branches.
	pub fn parse(value: &Value) -> Result<Expr, EvalError> {
		parse_at(value, 1)
	}

	/// The stored JSON form. Operator arguments are always written as a list.
	pub fn to_value(&self) -> Value {
		match self {
			Expr::Literal(v) => v.clone(),
			Expr::Var(path) => single_key(VAR_KEY, Value::String(path.clone())),
			Expr::Op { op, args } => {
				single_key(op.name, Value::Array(args.iter().map(Expr::to_value).collect()))
			}
			Expr::If {
				cond,
				then,
				otherwise,
			} => {
				let mut branches = vec![cond.to_value(), then.to_value()];
				if let Some(otherwise) = otherwise {
					branches.push(otherwise.to_value());
				}
				single_key(IF_KEY, Value::Array(branches))
			}
		}
	}
}

fn single_key(key: &str, value: Value) -> Value {
	let mut map = Map::with_capacity(1);
	map.insert(key.to_string(), value);
	Value::Object(map)
}

fn parse_var(path: &Value) -> Result<Expr, EvalError> {
	match path {
		Value::String(path) => Ok(Expr::Var(path.clone())),
		other => Err(EvalError::Malformed(format!(
			"`var` expects a string path, got {other}"
		))),
	}
}

fn parse_at(value: &Value, depth: usize) -> Result<Expr, EvalError> {
	let Value::Object(map) = value else {
		return Ok(Expr::Literal(value.clone()));
	};

	if depth > MAX_DEPTH {
		return Err(EvalError::TooDeep(MAX_DEPTH));
	}

	// A `var` reference ignores sibling keys.
	if let Some(path) = map.get(VAR_KEY) {
		return parse_var(path);
	}

	let mut entries = map.iter();
	let (key, args) = match (entries.next(), entries.next()) {
		(Some(entry), None) => entry,
		_ => {
			return Err(EvalError::Malformed(format!(
				"expression object must have exactly one key, found {}",
				map.len()
			)))
		}
	};

	match key.as_str() {
		IF_KEY => parse_if(args, depth),
		name => {
			let op = lookup(name).ok_or_else(|| EvalError::UnknownOperator(name.to_string()))?;
			let args = match args {
				Value::Array(items) => items
					.iter()
					.map(|item| parse_at(item, depth + 1))
					.collect::<Result<Vec<_>, _>>()?,
				scalar => vec![parse_at(scalar, depth + 1)?],
			};
			if !op.arity.accepts(args.len()) {
				return Err(EvalError::Arity {
					op: op.name.to_string(),
					expected: op.arity.to_string(),
					actual: args.len(),
				});
			}
			Ok(Expr::Op { op, args })
		}
	}
}

fn parse_if(args: &Value, depth: usize) -> Result<Expr, EvalError> {
	let items = match args {
		Value::Array(items) if (2..=3).contains(&items.len()) => items,
		Value::Array(items) => {
			return Err(EvalError::Arity {
				op: IF_KEY.to_string(),
				expected: "2 or 3".to_string(),
				actual: items.len(),
			})
		}
		_ => {
			return Err(EvalError::Arity {
				op: IF_KEY.to_string(),
				expected: "2 or 3".to_string(),
				actual: 1,
			})
		}
	};

	let cond = parse_at(&items[0], depth + 1)?;
	let then = parse_at(&items[1], depth + 1)?;
	let otherwise = items
		.get(2)
		.map(|item| parse_at(item, depth + 1))
		.transpose()?;

	Ok(Expr::If {
		cond: Box::new(cond),
		then: Box::new(then),
		otherwise: otherwise.map(Box::new),
	})
}

impl TryFrom<&Value> for Expr {
	type Error = EvalError;

	fn try_from(value: &Value) -> Result<Self, Self::Error> {
		Expr::parse(value)
	}
}

impl Serialize for Expr {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		self.to_value().serialize(serializer)
	}
}

impl<'de> Deserialize<'de> for Expr {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let value = Value::deserialize(deserializer)?;
		Expr::parse(&value).map_err(D::Error::custom)
	}
}
