//! A small, side-effect free expression language for `>` assertions and
//! `%` side effects.
//!
//! Sources are JavaScript-flavoured (`this.status === 200`,
//! `store.token = this.json.token`) but are parsed into an AST and
//! interpreted against a fixed context. Nothing outside the response and
//! the interpolation store is reachable, and the only writable location is
//! the store.

mod error;
mod interpreter;
mod lexer;
mod parser;
mod value;

pub use error::EvalError;
pub use value::Value;

use crate::{interpolation::Store, request::Headers};
use interpreter::{Interpreter, CONTEXT_FIELDS};
use parser::{parse_expression, parse_statements, Expr, Statement};

/// What `this` refers to while a request's trailers are evaluated.
#[derive(Debug, Clone, Copy)]
pub struct Context<'a> {
    pub status: u16,
    pub json: &'a Value,
    pub body: &'a str,
    pub headers: &'a Headers,
}

#[derive(Debug, Clone)]
pub struct Assertion {
    source: String,
    expression: Expr,
}

impl Assertion {
    pub fn compile<S: Into<String>>(source: S) -> Result<Self, EvalError> {
        let source = source.into();
        let expression = parse_expression(&source)?;

        Ok(Self { source, expression })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Any truthy result counts as a pass.
    pub fn evaluate(&self, context: &Context, store: &Store) -> Result<bool, EvalError> {
        Ok(Interpreter::new(context, store)
            .evaluate(&self.expression)?
            .is_truthy())
    }
}

#[derive(Debug, Clone)]
pub struct SideEffect {
    source: String,
    statements: Vec<Statement>,
}

impl SideEffect {
    pub fn compile<S: Into<String>>(source: S) -> Result<Self, EvalError> {
        let source = source.into();
        let statements = parse_statements(&source)?;

        Ok(Self { source, statements })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Runs every statement in order. Assignments land in `store` before the
    /// next statement is evaluated.
    pub fn execute(&self, context: &Context, store: &mut Store) -> Result<(), EvalError> {
        for statement in &self.statements {
            match statement {
                Statement::Expression(expression) => {
                    Interpreter::new(context, store).evaluate(expression)?;
                }
                Statement::Assign { target, value } => {
                    let (key, value) = {
                        let interpreter = Interpreter::new(context, store);
                        (
                            assignment_key(&interpreter, target)?,
                            interpreter.evaluate(value)?,
                        )
                    };
                    store.insert(key, value);
                }
            }
        }

        Ok(())
    }
}

fn assignment_key(interpreter: &Interpreter, target: &Expr) -> Result<String, EvalError> {
    match target {
        Expr::Member { object, property } => {
            let key = interpreter.evaluate(property)?.to_string();
            match object.as_ref() {
                Expr::This if CONTEXT_FIELDS.contains(&key.as_str()) => {
                    Err(EvalError::ReadOnlyProperty(key))
                }
                Expr::This => Ok(key),
                Expr::Identifier(name) if name == "store" => Ok(key),
                _ => Err(EvalError::InvalidAssignmentTarget),
            }
        }
        _ => Err(EvalError::InvalidAssignmentTarget),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn check(source: &str, json: serde_json::Value) -> Result<bool, EvalError> {
        let json = Value::from(json);
        let headers = Headers::new();
        let context = Context {
            status: 200,
            json: &json,
            body: "{\"ok\": true}",
            headers: &headers,
        };
        let store = Store::new();

        Assertion::compile(source)?.evaluate(&context, &store)
    }

    #[test]
    fn compares_status() {
        assert_eq!(check(" this.status === 200", json!(null)), Ok(true));
        assert_eq!(check("this.status !== 200", json!(null)), Ok(false));
        assert_eq!(check("status >= 200 && status < 300", json!(null)), Ok(true));
    }

    #[test]
    fn reads_nested_json() {
        let json = json!({"items": [{"id": 7, "name": "first"}], "count": 1});

        assert_eq!(check("this.json.items[0].id === 7", json.clone()), Ok(true));
        assert_eq!(check("this.json.items.length === this.json.count", json.clone()), Ok(true));
        assert_eq!(check("this.json['items'][0].name.startsWith('fi')", json.clone()), Ok(true));
        assert_eq!(check("this.json.missing === undefined", json), Ok(true));
    }

    #[test]
    fn any_truthy_value_passes() {
        assert_eq!(check("this.json.title", json!({"title": "x"})), Ok(true));
        assert_eq!(check("this.json.title", json!({"title": ""})), Ok(false));
        assert_eq!(check("this.body.length", json!(null)), Ok(true));
        assert_eq!(check("this.json.count || 0", json!({"count": 0})), Ok(false));
    }

    #[test]
    fn body_methods() {
        assert_eq!(check("this.body.includes('ok')", json!(null)), Ok(true));
        assert_eq!(check("typeof this.body === 'string'", json!(null)), Ok(true));
    }

    #[test]
    fn arithmetic_and_concatenation() {
        assert_eq!(check("1 + 2 * 3 === 7", json!(null)), Ok(true));
        assert_eq!(check("'a' + 1 === 'a1'", json!(null)), Ok(true));
        assert_eq!(check("(10 - 4) % 4 == '2'", json!(null)), Ok(true));
        assert_eq!(check("this.status === 200 ? true : false", json!(null)), Ok(true));
    }

    #[test]
    fn reading_through_undefined_is_an_error() {
        assert_eq!(
            check("this.json.id === 1", json!(null)),
            Err(EvalError::PropertyOfNothing {
                property: "id".into(),
                object: "null",
            })
        );
    }

    #[test]
    fn unknown_identifiers_are_rejected() {
        assert_eq!(
            check("process.exit(1)", json!(null)),
            Err(EvalError::UnknownIdentifier("process".into()))
        );
    }

    #[test]
    fn side_effects_write_to_store() {
        let json = Value::from(json!({"id": 42, "token": "abc"}));
        let headers = Headers::new();
        let context = Context {
            status: 201,
            json: &json,
            body: "",
            headers: &headers,
        };
        let mut store = Store::new();

        SideEffect::compile(" store.id = this.json.id; this.token = this.json.token")
            .unwrap()
            .execute(&context, &mut store)
            .unwrap();
        SideEffect::compile("store['next'] = store.id + 1")
            .unwrap()
            .execute(&context, &mut store)
            .unwrap();

        assert_eq!(store["id"], Value::Number(42.0));
        assert_eq!(store["token"], Value::from("abc"));
        assert_eq!(store["next"], Value::Number(43.0));

        let seen = Assertion::compile("this.token === 'abc' && store.next === 43")
            .unwrap()
            .evaluate(&context, &store);
        assert_eq!(seen, Ok(true));
    }

    #[test]
    fn context_fields_are_read_only() {
        let json = Value::Undefined;
        let headers = Headers::new();
        let context = Context {
            status: 200,
            json: &json,
            body: "",
            headers: &headers,
        };
        let mut store = Store::new();

        let result = SideEffect::compile("this.status = 500")
            .unwrap()
            .execute(&context, &mut store);

        assert_eq!(result, Err(EvalError::ReadOnlyProperty("status".into())));
        assert!(store.is_empty());
    }
}
