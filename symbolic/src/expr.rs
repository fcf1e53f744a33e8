//! The expression tree and its three core operations: simplification,
//! differentiation, and integration.
//!
//! `Expression` is immutable — every rewrite in this module consumes the
//! trees it reads and produces a fresh one. Structural equality (`==`)
//! is exact tree equality; no algebraic normalisation is implied by it.

use std::fmt;
use std::ops::{Add, Div, Mul, Sub};

use crate::error::{Error, Result};

/// The five binary operators an [`Expression::Operator`] node can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl Op {
    fn symbol(self) -> &'static str {
        match self {
            Op::Add => "+",
            Op::Sub => "-",
            Op::Mul => "*",
            Op::Div => "/",
            Op::Pow => "^",
        }
    }
}

/// The seven unary functions an [`Expression::Function`] node can apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Func {
    Sin,
    Cos,
    Tan,
    Ln,
    Log,
    Exp,
    Sqrt,
}

impl Func {
    fn name(self) -> &'static str {
        match self {
            Func::Sin => "sin",
            Func::Cos => "cos",
            Func::Tan => "tan",
            Func::Ln => "ln",
            Func::Log => "log",
            Func::Exp => "exp",
            Func::Sqrt => "sqrt",
        }
    }

    pub fn from_name(name: &str) -> Option<Func> {
        Some(match name {
            "sin" => Func::Sin,
            "cos" => Func::Cos,
            "tan" => Func::Tan,
            "ln" => Func::Ln,
            "log" => Func::Log,
            "exp" => Func::Exp,
            "sqrt" => Func::Sqrt,
            _ => return None,
        })
    }
}

/// A node in the symbolic expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Constant(f64),
    Variable(String),
    Operator(Op, Box<Expression>, Box<Expression>),
    Function(Func, Box<Expression>),
}

impl Expression {
    pub fn constant(value: f64) -> Expression {
        Expression::Constant(value)
    }

    pub fn variable(name: impl Into<String>) -> Expression {
        Expression::Variable(name.into())
    }

    pub fn function(func: Func, arg: Expression) -> Expression {
        Expression::Function(func, Box::new(arg))
    }

    /// Builds `self ^ exponent`. A method rather than an operator overload
    /// since `^` on Rust types means bitwise xor, not exponentiation.
    pub fn pow(self, exponent: Expression) -> Expression {
        Expression::Operator(Op::Pow, Box::new(self), Box::new(exponent))
    }

    fn as_const(&self) -> Option<f64> {
        match self {
            Expression::Constant(v) => Some(*v),
            _ => None,
        }
    }

    /// One bottom-up rewrite pass: both children are simplified first,
    /// then a fixed set of local rules is tried, in order, against the
    /// simplified children. Rewrites that produce a new tree recurse by
    /// calling `simplify` again on the replacement before returning it,
    /// so the result is a fixed point of this one traversal.
    pub fn simplify(&self) -> Expression {
        match self {
            Expression::Constant(_) | Expression::Variable(_) => self.clone(),
            Expression::Function(func, arg) => {
                let arg = arg.simplify();
                if *func == Func::Ln {
                    if let Expression::Function(Func::Exp, inner) = &arg {
                        return inner.as_ref().clone();
                    }
                }
                Expression::Function(*func, Box::new(arg))
            }
            Expression::Operator(op, l, r) => self.simplify_operator(*op, l.simplify(), r.simplify()),
        }
    }

    fn simplify_operator(&self, op: Op, left: Expression, right: Expression) -> Expression {
        let lc = left.as_const();
        let rc = right.as_const();

        // Constant folding (division by zero is suppressed, left symbolic).
        if let (Some(a), Some(b)) = (lc, rc) {
            match op {
                Op::Add => return Expression::Constant(a + b),
                Op::Sub => return Expression::Constant(a - b),
                Op::Mul => return Expression::Constant(a * b),
                Op::Div if b != 0.0 => return Expression::Constant(a / b),
                Op::Div => {}
                Op::Pow => return Expression::Constant(a.powf(b)),
            }
        }

        // Identities.
        if op == Op::Add && rc == Some(0.0) {
            return left;
        }
        if op == Op::Add && lc == Some(0.0) {
            return right;
        }
        if op == Op::Sub && rc == Some(0.0) {
            return left;
        }
        if op == Op::Mul && rc == Some(1.0) {
            return left;
        }
        if op == Op::Mul && lc == Some(1.0) {
            return right;
        }
        if op == Op::Mul && (rc == Some(0.0) || lc == Some(0.0)) {
            return Expression::Constant(0.0);
        }
        if op == Op::Div && rc == Some(1.0) {
            return left;
        }
        if op == Op::Pow && rc == Some(1.0) {
            return left;
        }
        if op == Op::Pow && rc == Some(0.0) {
            return Expression::Constant(1.0);
        }
        if op == Op::Pow && lc == Some(1.0) {
            return Expression::Constant(1.0);
        }

        // Cancellations.
        if op == Op::Sub && left == right {
            return Expression::Constant(0.0);
        }
        if op == Op::Div && left == right && lc != Some(0.0) {
            return Expression::Constant(1.0);
        }

        // Re-association collapsing constants.
        if op == Op::Add {
            if let Expression::Operator(Op::Add, ll, lr) = &left {
                if let (Some(c1), Some(c2)) = (lr.as_const(), rc) {
                    return (ll.as_ref().clone() + Expression::Constant(c1 + c2)).simplify();
                }
            }
        }
        if op == Op::Mul {
            if let Expression::Operator(Op::Mul, ll, lr) = &left {
                if let (Some(c1), Some(c2)) = (lr.as_const(), rc) {
                    return (ll.as_ref().clone() * Expression::Constant(c1 * c2)).simplify();
                }
            }
        }
        if op == Op::Mul {
            if let Expression::Operator(Op::Mul, ll, lr) = &left {
                if let (Some(c1), Some(c2)) = (ll.as_const(), rc) {
                    return (Expression::Constant(c1 * c2) * lr.as_ref().clone()).simplify();
                }
            }
        }
        if op == Op::Sub {
            if let Expression::Operator(Op::Add, ll, lr) = &left {
                if let (Some(c1), Some(c2)) = (lr.as_const(), rc) {
                    return (ll.as_ref().clone() + Expression::Constant(c1 - c2)).simplify();
                }
            }
        }
        if op == Op::Div {
            if let Expression::Operator(Op::Mul, ll, lr) = &left {
                if let (Some(c1), Some(c2)) = (ll.as_const(), rc) {
                    if c2 != 0.0 {
                        return (Expression::Constant(c1 / c2) * lr.as_ref().clone()).simplify();
                    }
                }
            }
        }

        // sin(u)^2 + cos(u)^2 = 1
        if op == Op::Add {
            if let (Expression::Operator(Op::Pow, ll, lr), Expression::Operator(Op::Pow, rl, rr)) =
                (&left, &right)
            {
                if let (Expression::Function(Func::Sin, larg), Expression::Function(Func::Cos, rarg)) =
                    (ll.as_ref(), rl.as_ref())
                {
                    if larg == rarg && lr.as_const() == Some(2.0) && rr.as_const() == Some(2.0) {
                        return Expression::Constant(1.0);
                    }
                }
            }
        }

        // Combining like terms: c1*x + c2*x -> (c1+c2)*x, and the
        // symmetric right-factor case.
        if op == Op::Add {
            if let (Expression::Operator(Op::Mul, ll, lr), Expression::Operator(Op::Mul, rl, rr)) =
                (&left, &right)
            {
                if let Some(c1) = ll.as_const() {
                    if lr.as_ref() == rr.as_ref() {
                        if let Some(c2) = rl.as_const() {
                            return (Expression::Constant(c1 + c2) * lr.as_ref().clone()).simplify();
                        }
                    }
                }
                if let Some(c1) = lr.as_const() {
                    if ll.as_ref() == rl.as_ref() {
                        if let Some(c2) = rr.as_const() {
                            return (Expression::Constant(c1 + c2) * ll.as_ref().clone()).simplify();
                        }
                    }
                }
            }
        }

        // x + x -> 2*x
        if op == Op::Add && left == right {
            return (Expression::Constant(2.0) * left).simplify();
        }

        // c * (x / c) -> x
        if op == Op::Mul {
            if let (Some(c1), Expression::Operator(Op::Div, rl, rr)) = (lc, &right) {
                if let Some(c2) = rr.as_const() {
                    if c1 == c2 {
                        return rl.simplify();
                    }
                }
            }
        }

        // Binomial expansion: (a+b)^2 -> a^2 + 2ab + b^2
        if op == Op::Pow {
            if let Expression::Operator(Op::Add, a, b) = &left {
                if rc == Some(2.0) {
                    let a = a.as_ref().clone();
                    let b = b.as_ref().clone();
                    return (a.clone().pow(Expression::Constant(2.0))
                        + Expression::Constant(2.0) * a * b.clone()
                        + b.pow(Expression::Constant(2.0)))
                    .simplify();
                }
            }
        }

        // Difference of squares: a^2 - b^2 -> (a-b)(a+b), also a^2 - 1.
        if op == Op::Sub {
            if let Expression::Operator(Op::Pow, la, lexp) = &left {
                if lexp.as_const() == Some(2.0) {
                    let a = la.as_ref().clone();
                    if rc == Some(1.0) {
                        let b = Expression::Constant(1.0);
                        return ((a.clone() - b.clone()).simplify() * (a + b).simplify()).simplify();
                    }
                    if let Expression::Operator(Op::Pow, ra, rexp) = &right {
                        if rexp.as_const() == Some(2.0) {
                            let b = ra.as_ref().clone();
                            return ((a.clone() - b.clone()).simplify() * (a + b).simplify())
                                .simplify();
                        }
                    }
                }
            }
        }

        // Monomial-in-fraction cancellation: (a*b)/a -> b, (a*b)/b -> a.
        if op == Op::Div {
            if let Expression::Operator(Op::Mul, ll, lr) = &left {
                if ll.as_ref() == &right {
                    return lr.simplify();
                }
                if lr.as_ref() == &right {
                    return ll.simplify();
                }
            }
        }

        Expression::Operator(op, Box::new(left), Box::new(right))
    }

    /// Structural-induction differentiation with respect to `var`. Every
    /// branch's result is passed through [`Expression::simplify`] before
    /// being returned, per the recursive definition: a derivative built
    /// from already-simplified sub-derivatives is simplified once more
    /// at each level.
    pub fn differentiate(&self, var: &str) -> Result<Expression> {
        let raw = match self {
            Expression::Constant(_) => Expression::Constant(0.0),
            Expression::Variable(name) => Expression::Constant(if name == var { 1.0 } else { 0.0 }),
            Expression::Operator(op, l, r) => {
                let dl = l.differentiate(var)?;
                let dr = r.differentiate(var)?;
                match op {
                    Op::Add => dl + dr,
                    Op::Sub => dl - dr,
                    Op::Mul => (l.as_ref().clone() * dr) + (dl * r.as_ref().clone()),
                    Op::Div => {
                        ((dl * r.as_ref().clone()) - (l.as_ref().clone() * dr))
                            / r.as_ref().clone().pow(Expression::Constant(2.0))
                    }
                    Op::Pow => {
                        if let Expression::Constant(n) = r.as_ref() {
                            Expression::Constant(*n)
                                * l.as_ref().clone().pow(Expression::Constant(n - 1.0))
                                * dl
                        } else {
                            let f = l.as_ref().clone();
                            let g = r.as_ref().clone();
                            f.clone().pow(g.clone())
                                * ((dr * Expression::Function(Func::Ln, Box::new(f.clone())))
                                    + (g * dl / f))
                        }
                    }
                }
            }
            Expression::Function(func, arg) => {
                let darg = arg.differentiate(var)?;
                match func {
                    Func::Sin => Expression::Function(Func::Cos, arg.clone()) * darg,
                    Func::Cos => {
                        Expression::Constant(-1.0) * Expression::Function(Func::Sin, arg.clone()) * darg
                    }
                    Func::Tan => {
                        darg / Expression::Function(Func::Cos, arg.clone())
                            .pow(Expression::Constant(2.0))
                    }
                    Func::Ln | Func::Log => darg / arg.as_ref().clone(),
                    Func::Exp => Expression::Function(Func::Exp, arg.clone()) * darg,
                    Func::Sqrt => {
                        darg / (Expression::Constant(2.0) * Expression::Function(Func::Sqrt, arg.clone()))
                    }
                }
            }
        };
        Ok(raw.simplify())
    }

    /// Structural integration against a small, named repertoire of rules.
    /// Anything outside it fails with [`Error::IntegrationNotImplemented`].
    pub fn integrate(&self, var: &str) -> Result<Expression> {
        match self {
            Expression::Constant(_) => Ok(self.clone() * Expression::Variable(var.to_string())),
            Expression::Variable(name) => {
                if name == var {
                    Ok(self.clone().pow(Expression::Constant(2.0)) / Expression::Constant(2.0))
                } else {
                    Ok(self.clone() * Expression::Variable(var.to_string()))
                }
            }
            Expression::Operator(op, l, r) => match op {
                Op::Add => Ok((l.integrate(var)? + r.integrate(var)?).simplify()),
                Op::Sub => Ok((l.integrate(var)? - r.integrate(var)?).simplify()),
                Op::Mul => {
                    if let Expression::Constant(_) = l.as_ref() {
                        Ok((l.as_ref().clone() * r.integrate(var)?).simplify())
                    } else if let Expression::Constant(_) = r.as_ref() {
                        Ok((r.as_ref().clone() * l.integrate(var)?).simplify())
                    } else {
                        Err(Error::IntegrationNotImplemented(self.to_string()))
                    }
                }
                Op::Pow => self.integrate_power(l, r, var),
                _ => Err(Error::IntegrationNotImplemented(self.to_string())),
            },
            Expression::Function(func, arg) => {
                if let Expression::Variable(name) = arg.as_ref() {
                    if name == var {
                        return match func {
                            Func::Sin => {
                                Ok(Expression::Constant(-1.0) * Expression::Function(Func::Cos, arg.clone()))
                            }
                            Func::Cos => Ok(Expression::Function(Func::Sin, arg.clone())),
                            Func::Exp => Ok(Expression::Function(Func::Exp, arg.clone())),
                            Func::Ln | Func::Log => Ok(arg.as_ref().clone()
                                * Expression::Function(Func::Ln, arg.clone())
                                - arg.as_ref().clone()),
                            _ => Err(Error::IntegrationNotImplemented(self.to_string())),
                        };
                    }
                }
                Err(Error::IntegrationNotImplemented(self.to_string()))
            }
        }
    }

    fn integrate_power(&self, l: &Expression, r: &Expression, var: &str) -> Result<Expression> {
        if let (Expression::Variable(name), Expression::Constant(n)) = (l, r) {
            if name == var {
                return Ok(l.clone().pow(Expression::Constant(n + 1.0)) / Expression::Constant(n + 1.0));
            }
        }
        // (a*x+b)^n, a and b constant.
        if let (Expression::Operator(Op::Add, a, b), Expression::Constant(n)) = (l, r) {
            if let Expression::Operator(Op::Mul, al, ar) = a.as_ref() {
                if let (Expression::Constant(_), Expression::Variable(name)) = (al.as_ref(), ar.as_ref())
                {
                    if name == var {
                        if let Expression::Constant(_) = b.as_ref() {
                            let a_coeff = al.as_ref().clone();
                            return Ok((l.clone().pow(Expression::Constant(n + 1.0))
                                / (Expression::Constant(n + 1.0) * a_coeff))
                                .simplify());
                        }
                    }
                }
            }
        }
        Err(Error::IntegrationNotImplemented(self.to_string()))
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Constant(v) => write!(f, "{v:?}"),
            Expression::Variable(name) => write!(f, "{name}"),
            Expression::Operator(op, l, r) => write!(f, "({l} {} {r})", op.symbol()),
            Expression::Function(func, arg) => write!(f, "{}({arg})", func.name()),
        }
    }
}

impl Add for Expression {
    type Output = Expression;
    fn add(self, rhs: Expression) -> Expression {
        Expression::Operator(Op::Add, Box::new(self), Box::new(rhs))
    }
}

impl Sub for Expression {
    type Output = Expression;
    fn sub(self, rhs: Expression) -> Expression {
        Expression::Operator(Op::Sub, Box::new(self), Box::new(rhs))
    }
}

impl Mul for Expression {
    type Output = Expression;
    fn mul(self, rhs: Expression) -> Expression {
        Expression::Operator(Op::Mul, Box::new(self), Box::new(rhs))
    }
}

impl Div for Expression {
    type Output = Expression;
    fn div(self, rhs: Expression) -> Expression {
        Expression::Operator(Op::Div, Box::new(self), Box::new(rhs))
    }
}
