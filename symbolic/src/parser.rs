//! Tokeniser and shunting-yard parser turning infix text into an
//! [`Expression`] tree.

use regex::Regex;

use crate::error::{Error, Result};
use crate::expr::{Expression, Func, Op};

fn precedence(op: Op) -> u8 {
    match op {
        Op::Add | Op::Sub => 1,
        Op::Mul | Op::Div => 2,
        Op::Pow => 3,
    }
}

fn is_right_associative(op: Op) -> bool {
    matches!(op, Op::Pow)
}

fn op_from_symbol(symbol: &str) -> Option<Op> {
    match symbol {
        "+" => Some(Op::Add),
        "-" => Some(Op::Sub),
        "*" => Some(Op::Mul),
        "/" => Some(Op::Div),
        "^" => Some(Op::Pow),
        _ => None,
    }
}

fn is_operator_symbol(token: &str) -> bool {
    op_from_symbol(token).is_some()
}

/// An item waiting on the operator stack.
enum StackItem {
    LParen,
    UnaryMinus,
    Func(Func),
    Op(Op),
}

/// An item in the shunting-yard output queue.
enum OutputItem {
    Value(Expression),
    UnaryMinus,
    Func(Func),
    Op(Op),
}

/// Parses `input` as an infix algebraic expression.
///
/// Tokens are `\d+\.?\d*|[a-zA-Z_][a-zA-Z0-9_]*|[+\-*/^()]`; `pi` and `e`
/// resolve to their numeric values rather than becoming variables. A `-`
/// at the very start, right after another operator, or right after `(`
/// is unary and desugars to multiplying the following operand by `-1`,
/// rather than becoming a binary `Sub` node.
pub fn parse(input: &str) -> Result<Expression> {
    let token_pattern = Regex::new(r"\d+\.?\d*|[a-zA-Z_][a-zA-Z0-9_]*|[+\-*/^()]")
        .expect("token pattern is a fixed, valid regex");
    let tokens: Vec<&str> = token_pattern.find_iter(input).map(|m| m.as_str()).collect();

    let mut output: Vec<OutputItem> = Vec::new();
    let mut operators: Vec<StackItem> = Vec::new();
    let mut prev_token: Option<&str> = None;

    for token in tokens {
        let starts_unary = prev_token.is_none()
            || prev_token.map(is_operator_symbol).unwrap_or(false)
            || prev_token == Some("(");

        if token == "-" && starts_unary {
            operators.push(StackItem::UnaryMinus);
        } else if token.chars().next().is_some_and(|c| c.is_ascii_digit()) {
            let value: f64 = token
                .parse()
                .map_err(|_| Error::MalformedToken(token.to_string()))?;
            output.push(OutputItem::Value(Expression::constant(value)));
        } else if token == "pi" {
            output.push(OutputItem::Value(Expression::constant(std::f64::consts::PI)));
        } else if token == "e" {
            output.push(OutputItem::Value(Expression::constant(std::f64::consts::E)));
        } else if let Some(func) = Func::from_name(token) {
            operators.push(StackItem::Func(func));
        } else if token.chars().next().is_some_and(|c| c.is_alphabetic() || c == '_') {
            output.push(OutputItem::Value(Expression::variable(token)));
        } else if let Some(op) = op_from_symbol(token) {
            while let Some(StackItem::Op(top)) = operators.last() {
                let top = *top;
                let should_pop = if is_right_associative(op) {
                    precedence(op) < precedence(top)
                } else {
                    precedence(op) <= precedence(top)
                };
                if !should_pop {
                    break;
                }
                operators.pop();
                output.push(OutputItem::Op(top));
            }
            operators.push(StackItem::Op(op));
        } else if token == "(" {
            operators.push(StackItem::LParen);
        } else if token == ")" {
            while let Some(top) = operators.last() {
                if matches!(top, StackItem::LParen) {
                    break;
                }
                match operators.pop().expect("just peeked Some") {
                    StackItem::Op(op) => output.push(OutputItem::Op(op)),
                    StackItem::UnaryMinus => output.push(OutputItem::UnaryMinus),
                    // A function/`(` with no matching close before this one
                    // means the parens in the input don't balance.
                    StackItem::Func(_) | StackItem::LParen => {
                        return Err(Error::MismatchedParentheses)
                    }
                }
            }
            match operators.pop() {
                Some(StackItem::LParen) => {}
                _ => return Err(Error::MismatchedParentheses),
            }
            if matches!(operators.last(), Some(StackItem::Func(_))) {
                if let Some(StackItem::Func(func)) = operators.pop() {
                    output.push(OutputItem::Func(func));
                }
            }
        } else {
            return Err(Error::MalformedToken(token.to_string()));
        }

        prev_token = Some(token);
    }

    while let Some(item) = operators.pop() {
        match item {
            StackItem::LParen => return Err(Error::MismatchedParentheses),
            StackItem::Op(op) => output.push(OutputItem::Op(op)),
            StackItem::UnaryMinus => output.push(OutputItem::UnaryMinus),
            StackItem::Func(func) => output.push(OutputItem::Func(func)),
        }
    }

    let mut stack: Vec<Expression> = Vec::new();
    for item in output {
        match item {
            OutputItem::Value(expr) => stack.push(expr),
            OutputItem::UnaryMinus => {
                let operand = stack.pop().ok_or(Error::InvalidExpression)?;
                stack.push(Expression::constant(-1.0) * operand);
            }
            OutputItem::Func(func) => {
                let arg = stack.pop().ok_or(Error::InvalidExpression)?;
                stack.push(Expression::function(func, arg));
            }
            OutputItem::Op(op) => {
                if stack.len() < 2 {
                    return Err(Error::InvalidExpression);
                }
                let right = stack.pop().expect("length checked above");
                let left = stack.pop().expect("length checked above");
                stack.push(Expression::Operator(op, Box::new(left), Box::new(right)));
            }
        }
    }

    if stack.len() != 1 {
        return Err(Error::InvalidExpression);
    }
    Ok(stack.remove(0))
}
