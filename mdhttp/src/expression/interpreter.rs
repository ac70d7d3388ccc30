use super::{
    error::EvalError,
    parser::{BinaryOperator, Expr, UnaryOperator},
    value::Value,
    Context,
};
use crate::interpolation::Store;
use std::cmp::Ordering;

/// Fields of `this` that come from the response and cannot be assigned.
pub(crate) const CONTEXT_FIELDS: &[&str] = &["status", "json", "body", "headers", "store"];

pub(crate) struct Interpreter<'a, 'b> {
    context: &'a Context<'b>,
    store: &'a Store,
}

impl<'a, 'b> Interpreter<'a, 'b> {
    pub(crate) fn new(context: &'a Context<'b>, store: &'a Store) -> Self {
        Self { context, store }
    }

    pub(crate) fn evaluate(&self, expression: &Expr) -> Result<Value, EvalError> {
        match expression {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Array(items) => Ok(Value::Array(
                items
                    .iter()
                    .map(|item| self.evaluate(item))
                    .collect::<Result<_, _>>()?,
            )),
            Expr::This => Ok(Value::Object(
                CONTEXT_FIELDS
                    .iter()
                    .filter_map(|name| Some((name.to_string(), self.context_field(name)?)))
                    .collect(),
            )),
            Expr::Identifier(name) => self
                .context_field(name)
                .ok_or_else(|| EvalError::UnknownIdentifier(name.clone())),
            Expr::Member { object, property } => {
                let key = self.evaluate(property)?;
                match object.as_ref() {
                    Expr::This => Ok(self
                        .context_field(&key.to_string())
                        .unwrap_or_else(|| self.stored(&key))),
                    Expr::Identifier(name) if name == "store" => Ok(self.stored(&key)),
                    other => property_of(&self.evaluate(other)?, &key),
                }
            }
            Expr::Call {
                object,
                method,
                arguments,
            } => {
                let object = self.evaluate(object)?;
                let arguments = arguments
                    .iter()
                    .map(|argument| self.evaluate(argument))
                    .collect::<Result<Vec<_>, _>>()?;
                call_method(&object, method, &arguments)
            }
            Expr::Unary { operator, operand } => {
                let operand = self.evaluate(operand)?;
                Ok(match operator {
                    UnaryOperator::Not => Value::Bool(!operand.is_truthy()),
                    UnaryOperator::Negate => Value::Number(-operand.to_number()),
                    UnaryOperator::Plus => Value::Number(operand.to_number()),
                    UnaryOperator::TypeOf => Value::from(operand.type_name()),
                })
            }
            Expr::Binary {
                operator,
                left,
                right,
            } => {
                let left = self.evaluate(left)?;
                match operator {
                    BinaryOperator::And if !left.is_truthy() => Ok(left),
                    BinaryOperator::Or if left.is_truthy() => Ok(left),
                    BinaryOperator::And | BinaryOperator::Or => self.evaluate(right),
                    _ => Ok(binary(*operator, &left, &self.evaluate(right)?)),
                }
            }
            Expr::Conditional {
                test,
                consequent,
                alternate,
            } => {
                if self.evaluate(test)?.is_truthy() {
                    self.evaluate(consequent)
                } else {
                    self.evaluate(alternate)
                }
            }
        }
    }

    fn context_field(&self, name: &str) -> Option<Value> {
        let value = match name {
            "status" => Value::Number(f64::from(self.context.status)),
            "json" => self.context.json.clone(),
            "body" => Value::from(self.context.body),
            "headers" => Value::Object(
                self.context
                    .headers
                    .iter()
                    .map(|(key, value)| (key.clone(), Value::from(value.as_str())))
                    .collect(),
            ),
            "store" => Value::Object(
                self.store
                    .iter()
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect(),
            ),
            _ => return None,
        };

        Some(value)
    }

    fn stored(&self, key: &Value) -> Value {
        self.store
            .get(&key.to_string())
            .cloned()
            .unwrap_or(Value::Undefined)
    }
}

fn nothing_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        _ => "undefined",
    }
}

fn array_index(key: &Value) -> Option<usize> {
    match key {
        Value::Number(n) if *n >= 0.0 && n.fract() == 0.0 => Some(*n as usize),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn property_of(object: &Value, key: &Value) -> Result<Value, EvalError> {
    let value = match object {
        Value::Undefined | Value::Null => {
            return Err(EvalError::PropertyOfNothing {
                property: key.to_string(),
                object: nothing_name(object),
            })
        }
        Value::String(s) => match key {
            Value::String(name) if name == "length" => Value::Number(s.chars().count() as f64),
            _ => array_index(key)
                .and_then(|index| s.chars().nth(index))
                .map(|c| Value::String(c.to_string()))
                .unwrap_or(Value::Undefined),
        },
        Value::Array(items) => match key {
            Value::String(name) if name == "length" => Value::Number(items.len() as f64),
            _ => array_index(key)
                .and_then(|index| items.get(index))
                .cloned()
                .unwrap_or(Value::Undefined),
        },
        Value::Object(map) => map
            .get(&key.to_string())
            .cloned()
            .unwrap_or(Value::Undefined),
        Value::Bool(_) | Value::Number(_) => Value::Undefined,
    };

    Ok(value)
}

fn call_method(object: &Value, method: &str, arguments: &[Value]) -> Result<Value, EvalError> {
    let argument = |index: usize| arguments.get(index).cloned().unwrap_or(Value::Undefined);

    let value = match (object, method) {
        (Value::Undefined, _) | (Value::Null, _) => {
            return Err(EvalError::PropertyOfNothing {
                property: method.into(),
                object: nothing_name(object),
            })
        }
        (_, "toString") => Value::String(object.to_string()),
        (Value::String(s), "includes") => Value::Bool(s.contains(&argument(0).to_string())),
        (Value::String(s), "startsWith") => Value::Bool(s.starts_with(&argument(0).to_string())),
        (Value::String(s), "endsWith") => Value::Bool(s.ends_with(&argument(0).to_string())),
        (Value::String(s), "indexOf") => Value::Number(
            s.find(&argument(0).to_string())
                .map(|position| s[..position].chars().count() as f64)
                .unwrap_or(-1.0),
        ),
        (Value::String(s), "toLowerCase") => Value::String(s.to_lowercase()),
        (Value::String(s), "toUpperCase") => Value::String(s.to_uppercase()),
        (Value::String(s), "trim") => Value::String(s.trim().into()),
        (Value::Array(items), "includes") => {
            let needle = argument(0);
            Value::Bool(items.iter().any(|item| item.strict_equals(&needle)))
        }
        (Value::Array(items), "indexOf") => {
            let needle = argument(0);
            Value::Number(
                items
                    .iter()
                    .position(|item| item.strict_equals(&needle))
                    .map(|position| position as f64)
                    .unwrap_or(-1.0),
            )
        }
        (Value::Array(items), "join") => {
            let separator = match argument(0) {
                Value::Undefined => ",".to_string(),
                other => other.to_string(),
            };
            Value::String(
                items
                    .iter()
                    .map(|item| match item {
                        Value::Undefined | Value::Null => String::new(),
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(&separator),
            )
        }
        _ => return Err(EvalError::NotAFunction(method.into())),
    };

    Ok(value)
}

fn binary(operator: BinaryOperator, left: &Value, right: &Value) -> Value {
    match operator {
        BinaryOperator::Add => {
            if is_string_like(left) || is_string_like(right) {
                Value::String(format!("{}{}", left, right))
            } else {
                Value::Number(left.to_number() + right.to_number())
            }
        }
        BinaryOperator::Subtract => Value::Number(left.to_number() - right.to_number()),
        BinaryOperator::Multiply => Value::Number(left.to_number() * right.to_number()),
        BinaryOperator::Divide => Value::Number(left.to_number() / right.to_number()),
        BinaryOperator::Remainder => Value::Number(left.to_number() % right.to_number()),
        BinaryOperator::Less => Value::Bool(compare(left, right) == Some(Ordering::Less)),
        BinaryOperator::LessEqual => Value::Bool(matches!(
            compare(left, right),
            Some(Ordering::Less) | Some(Ordering::Equal)
        )),
        BinaryOperator::Greater => Value::Bool(compare(left, right) == Some(Ordering::Greater)),
        BinaryOperator::GreaterEqual => Value::Bool(matches!(
            compare(left, right),
            Some(Ordering::Greater) | Some(Ordering::Equal)
        )),
        BinaryOperator::Equal => Value::Bool(left.loose_equals(right)),
        BinaryOperator::NotEqual => Value::Bool(!left.loose_equals(right)),
        BinaryOperator::StrictEqual => Value::Bool(left.strict_equals(right)),
        BinaryOperator::StrictNotEqual => Value::Bool(!left.strict_equals(right)),
        // Short-circuited by the caller.
        BinaryOperator::And | BinaryOperator::Or => Value::Undefined,
    }
}

fn is_string_like(value: &Value) -> bool {
    matches!(value, Value::String(_) | Value::Array(_) | Value::Object(_))
}

fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => left.to_number().partial_cmp(&right.to_number()),
    }
}
