use rsm_symbolic::{parse, Expression, Func};

fn evaluate(expr: &Expression, var: &str, value: f64) -> f64 {
    match expr {
        Expression::Constant(v) => *v,
        Expression::Variable(name) => if name == var { value } else { 0.0 },
        Expression::Function(func, arg) => {
            let arg = evaluate(arg, var, value);
            match func {
                Func::Sin => arg.sin(),
                Func::Cos => arg.cos(),
                Func::Tan => arg.tan(),
                Func::Ln | Func::Log => arg.ln(),
                Func::Exp => arg.exp(),
                Func::Sqrt => arg.sqrt(),
            }
        }
        Expression::Operator(op, l, r) => {
            let left = evaluate(l, var, value);
            let right = evaluate(r, var, value);
            match op {
                rsm_symbolic::Op::Add => left + right,
                rsm_symbolic::Op::Sub => left - right,
                rsm_symbolic::Op::Mul => left * right,
                rsm_symbolic::Op::Div => left / right,
                rsm_symbolic::Op::Pow => left.powf(right),
            }
        }
    }
}

fn numerical_derivative(expr: &Expression, var: &str, at: f64) -> f64 {
    let h = 1e-6;
    (evaluate(expr, var, at + h) - evaluate(expr, var, at - h)) / (2.0 * h)
}

#[test]
fn parser_renders_expected_repr() {
    assert_eq!(parse("x + 1").unwrap().to_string(), "(x + 1.0)");
    assert_eq!(parse("2 * (x + 1)").unwrap().to_string(), "(2.0 * (x + 1.0))");
    assert_eq!(parse("sin(x^2)").unwrap().to_string(), "sin((x ^ 2.0))");
    assert_eq!(parse("ln(exp(x))").unwrap().to_string(), "ln(exp(x))");
    assert_eq!(parse("-x").unwrap().to_string(), "(-1.0 * x)");
}

#[test]
fn parser_rejects_mismatched_parentheses() {
    assert!(parse("(x + 1").is_err());
    assert!(parse("x + 1)").is_err());
}

#[test]
fn simplification_matches_expected_renderings() {
    let cases = [
        ("x+0", "x"),
        ("0+x", "x"),
        ("x*1", "x"),
        ("1*x", "x"),
        ("x*0", "0.0"),
        ("0*x", "0.0"),
        ("x^1", "x"),
        ("2+2", "4.0"),
        ("2*3", "6.0"),
        ("ln(exp(x))", "x"),
        ("(x+0)*1", "x"),
        ("x+1+2", "(x + 3.0)"),
        ("x*2*3", "(x * 6.0)"),
        ("(x+1-1)", "x"),
        ("x/1", "x"),
        ("(x^2)/x", "((x ^ 2.0) / x)"),
        ("sin(x)^2+cos(x)^2", "1.0"),
        ("2*x + 3*x", "(5.0 * x)"),
        ("(x+1)^2", "(((x ^ 2.0) + (2.0 * x)) + 1.0)"),
        ("x^2-1", "((x - 1.0) * (x + 1.0))"),
        ("(x+1)*(x-1)", "((x + 1.0) * (x - 1.0))"),
        ("x/x", "1.0"),
        ("x-x", "0.0"),
        ("(x^2-1)/(x-1)", "(x + 1.0)"),
        ("(2*x)/2", "x"),
        ("x+x", "(2.0 * x)"),
        ("2*(x/2)", "x"),
    ];
    for (input, expected) in cases {
        let got = parse(input).unwrap().simplify().to_string();
        assert_eq!(got, expected, "simplifying {input:?}");
    }
}

#[test]
fn simplification_is_idempotent() {
    for input in ["(x+1)^2", "x^2-1", "2*x + 3*x", "sin(x)^2+cos(x)^2"] {
        let once = parse(input).unwrap().simplify();
        let twice = once.simplify();
        assert_eq!(once, twice, "simplify should be a fixed point for {input:?}");
    }
}

#[test]
fn differentiation_agrees_with_numerical_derivative() {
    for input in ["x^2", "sin(x)", "cos(x)", "ln(x)", "exp(x)", "x*sin(x)"] {
        let expr = parse(input).unwrap();
        let derivative = expr.differentiate("x").unwrap();
        let symbolic = evaluate(&derivative, "x", 1.0);
        let numeric = numerical_derivative(&expr, "x", 1.0);
        assert!(
            (symbolic - numeric).abs() < 1e-5,
            "symbolic derivative of {input:?} at x=1 was {symbolic}, numerical check gave {numeric}"
        );
    }
}

#[test]
fn integration_matches_known_antiderivatives() {
    assert_eq!(
        parse("x").unwrap().integrate("x").unwrap().to_string(),
        "((x ^ 2.0) / 2.0)"
    );
    assert_eq!(
        parse("2*x").unwrap().integrate("x").unwrap().to_string(),
        "(x ^ 2.0)"
    );
    assert_eq!(
        parse("sin(x)").unwrap().integrate("x").unwrap().to_string(),
        "(-1.0 * cos(x))"
    );
    assert_eq!(
        parse("cos(x)").unwrap().integrate("x").unwrap().to_string(),
        "sin(x)"
    );
    assert_eq!(
        parse("exp(x)").unwrap().integrate("x").unwrap().to_string(),
        "exp(x)"
    );
    assert_eq!(
        parse("(2*x+1)^2").unwrap().integrate("x").unwrap().to_string(),
        "((((2.0 * x) + 1.0) ^ 3.0) / 6.0)"
    );
}

#[test]
fn integration_then_differentiation_round_trips() {
    let x = parse("x").unwrap();
    let round_tripped = x
        .integrate("x")
        .unwrap()
        .differentiate("x")
        .unwrap()
        .simplify();
    assert_eq!(round_tripped.to_string(), "x");

    let cos_x = parse("cos(x)").unwrap();
    let round_tripped = cos_x
        .integrate("x")
        .unwrap()
        .differentiate("x")
        .unwrap()
        .simplify();
    assert_eq!(round_tripped.to_string(), "cos(x)");
}

#[test]
fn integration_of_unsupported_shape_is_surfaced_as_an_error() {
    let tan_x = parse("tan(x)").unwrap();
    assert!(tan_x.integrate("x").is_err());
}
