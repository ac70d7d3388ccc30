use super::{
    error::EvalError,
    lexer::{tokenize, Token, TokenKind},
    value::Value,
};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum UnaryOperator {
    Not,
    Negate,
    Plus,
    TypeOf,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Remainder,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Equal,
    NotEqual,
    StrictEqual,
    StrictNotEqual,
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Value),
    Array(Vec<Expr>),
    This,
    Identifier(String),
    Member {
        object: Box<Expr>,
        property: Box<Expr>,
    },
    Call {
        object: Box<Expr>,
        method: String,
        arguments: Vec<Expr>,
    },
    Unary {
        operator: UnaryOperator,
        operand: Box<Expr>,
    },
    Binary {
        operator: BinaryOperator,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Conditional {
        test: Box<Expr>,
        consequent: Box<Expr>,
        alternate: Box<Expr>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Expression(Expr),
    Assign { target: Expr, value: Expr },
}

/// Parses a single expression. A trailing `;` is tolerated.
pub fn parse_expression(source: &str) -> Result<Expr, EvalError> {
    let mut parser = Parser::new(tokenize(source)?);
    let expression = parser.expression()?;
    parser.eat(";");
    parser.expect_end()?;
    Ok(expression)
}

/// Parses `;`-separated statements, each an expression or an assignment.
pub fn parse_statements(source: &str) -> Result<Vec<Statement>, EvalError> {
    let mut parser = Parser::new(tokenize(source)?);
    let mut statements = Vec::new();

    while !parser.at_end() {
        if parser.eat(";") {
            continue;
        }

        statements.push(parser.statement()?);

        if !parser.at_end() && !parser.eat(";") {
            return Err(parser.unexpected());
        }
    }

    Ok(statements)
}

struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            position: 0,
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn at_end(&self) -> bool {
        self.position >= self.tokens.len()
    }

    fn check(&self, symbol: &str) -> bool {
        matches!(self.peek(), Some(Token { kind: TokenKind::Symbol(s), .. }) if *s == symbol)
    }

    fn eat(&mut self, symbol: &str) -> bool {
        if self.check(symbol) {
            self.position += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, symbol: &str) -> Result<(), EvalError> {
        if self.eat(symbol) {
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn expect_end(&self) -> Result<(), EvalError> {
        if self.at_end() {
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn unexpected(&self) -> EvalError {
        match self.peek() {
            Some(token) => EvalError::UnexpectedToken {
                found: token.kind.describe(),
                offset: token.offset,
            },
            None => EvalError::UnexpectedEnd,
        }
    }

    fn next(&mut self) -> Result<Token, EvalError> {
        let token = self.peek().cloned().ok_or(EvalError::UnexpectedEnd)?;
        self.position += 1;
        Ok(token)
    }

    fn statement(&mut self) -> Result<Statement, EvalError> {
        let expression = self.expression()?;

        if !self.eat("=") {
            return Ok(Statement::Expression(expression));
        }

        let assignable = match &expression {
            Expr::Member { object, .. } => match object.as_ref() {
                Expr::This => true,
                Expr::Identifier(name) => name == "store",
                _ => false,
            },
            _ => false,
        };

        if !assignable {
            return Err(EvalError::InvalidAssignmentTarget);
        }

        Ok(Statement::Assign {
            target: expression,
            value: self.expression()?,
        })
    }

    fn expression(&mut self) -> Result<Expr, EvalError> {
        let test = self.binary(0)?;

        if !self.eat("?") {
            return Ok(test);
        }

        let consequent = self.expression()?;
        self.expect(":")?;
        let alternate = self.expression()?;

        Ok(Expr::Conditional {
            test: Box::new(test),
            consequent: Box::new(consequent),
            alternate: Box::new(alternate),
        })
    }

    fn binary_operator(&self) -> Option<(BinaryOperator, u8)> {
        let symbol = match self.peek() {
            Some(Token {
                kind: TokenKind::Symbol(symbol),
                ..
            }) => *symbol,
            _ => return None,
        };

        let operator = match symbol {
            "||" => (BinaryOperator::Or, 1),
            "&&" => (BinaryOperator::And, 2),
            "==" => (BinaryOperator::Equal, 3),
            "!=" => (BinaryOperator::NotEqual, 3),
            "===" => (BinaryOperator::StrictEqual, 3),
            "!==" => (BinaryOperator::StrictNotEqual, 3),
            "<" => (BinaryOperator::Less, 4),
            "<=" => (BinaryOperator::LessEqual, 4),
            ">" => (BinaryOperator::Greater, 4),
            ">=" => (BinaryOperator::GreaterEqual, 4),
            "+" => (BinaryOperator::Add, 5),
            "-" => (BinaryOperator::Subtract, 5),
            "*" => (BinaryOperator::Multiply, 6),
            "/" => (BinaryOperator::Divide, 6),
            "%" => (BinaryOperator::Remainder, 6),
            _ => return None,
        };

        Some(operator)
    }

    // Precedence climbing; every binary operator is left-associative.
    fn binary(&mut self, min_precedence: u8) -> Result<Expr, EvalError> {
        let mut left = self.unary()?;

        while let Some((operator, precedence)) = self.binary_operator() {
            if precedence <= min_precedence {
                break;
            }
            self.position += 1;

            let right = self.binary(precedence)?;
            left = Expr::Binary {
                operator,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn unary(&mut self) -> Result<Expr, EvalError> {
        let operator = if self.eat("!") {
            UnaryOperator::Not
        } else if self.eat("-") {
            UnaryOperator::Negate
        } else if self.eat("+") {
            UnaryOperator::Plus
        } else if matches!(self.peek(), Some(Token { kind: TokenKind::Identifier(name), .. }) if name == "typeof")
        {
            self.position += 1;
            UnaryOperator::TypeOf
        } else {
            return self.postfix();
        };

        Ok(Expr::Unary {
            operator,
            operand: Box::new(self.unary()?),
        })
    }

    fn postfix(&mut self) -> Result<Expr, EvalError> {
        let mut expression = self.primary()?;

        loop {
            if self.eat(".") {
                let Token { kind, offset } = self.next()?;
                let name = match kind {
                    TokenKind::Identifier(name) => name,
                    other => {
                        return Err(EvalError::UnexpectedToken {
                            found: other.describe(),
                            offset,
                        })
                    }
                };
                expression = Expr::Member {
                    object: Box::new(expression),
                    property: Box::new(Expr::Literal(Value::String(name))),
                };
            } else if self.eat("[") {
                let property = self.expression()?;
                self.expect("]")?;
                expression = Expr::Member {
                    object: Box::new(expression),
                    property: Box::new(property),
                };
            } else if self.eat("(") {
                let arguments = self.arguments(")")?;
                expression = match expression {
                    Expr::Member { object, property } => match *property {
                        Expr::Literal(Value::String(method)) => Expr::Call {
                            object,
                            method,
                            arguments,
                        },
                        _ => return Err(EvalError::UnsupportedCall),
                    },
                    _ => return Err(EvalError::UnsupportedCall),
                };
            } else {
                return Ok(expression);
            }
        }
    }

    fn arguments(&mut self, close: &str) -> Result<Vec<Expr>, EvalError> {
        let mut arguments = Vec::new();

        if self.eat(close) {
            return Ok(arguments);
        }

        loop {
            arguments.push(self.expression()?);
            if self.eat(close) {
                return Ok(arguments);
            }
            self.expect(",")?;
        }
    }

    fn primary(&mut self) -> Result<Expr, EvalError> {
        let Token { kind, offset } = self.next()?;

        let expression = match kind {
            TokenKind::Number(n) => Expr::Literal(Value::Number(n)),
            TokenKind::Str(s) => Expr::Literal(Value::String(s)),
            TokenKind::Identifier(name) => match name.as_str() {
                "true" => Expr::Literal(Value::Bool(true)),
                "false" => Expr::Literal(Value::Bool(false)),
                "null" => Expr::Literal(Value::Null),
                "undefined" => Expr::Literal(Value::Undefined),
                "NaN" => Expr::Literal(Value::Number(f64::NAN)),
                "Infinity" => Expr::Literal(Value::Number(f64::INFINITY)),
                "this" => Expr::This,
                _ => Expr::Identifier(name),
            },
            TokenKind::Symbol("(") => {
                let expression = self.expression()?;
                self.expect(")")?;
                expression
            }
            TokenKind::Symbol("[") => Expr::Array(self.arguments("]")?),
            TokenKind::Symbol(symbol) => {
                return Err(EvalError::UnexpectedToken {
                    found: symbol.to_string(),
                    offset,
                })
            }
        };

        Ok(expression)
    }
}
