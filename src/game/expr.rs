//! Expression validation and evaluation.
//!
//! The selection builder guarantees digit/operator alternation, but the
//! evaluator stands on its own: anything malformed, non-integer, or dividing
//! by zero comes back as `None` rather than an error. A single trailing
//! operator is stripped first -- such an expression is merely unfinished.

use super::symbols::Op;

#[derive(Debug, PartialEq)]
enum Token {
    Num(f64),
    Op(Op),
}

/// Evaluate an arithmetic expression, accepting only integer results.
///
/// Returns `None` for empty input, expressions without at least one
/// digit-operator-digit pattern, malformed token sequences, and results that
/// are non-integer or non-finite (division by zero).
pub fn evaluate(expr: &str) -> Option<i64> {
    let clean = expr
        .strip_suffix(['+', '-', '*', '/'])
        .unwrap_or(expr);
    if !contains_operation(clean) {
        return None;
    }
    let value = eval_tokens(&tokenize(clean)?)?;
    // Evaluation runs in floating point so mixed chains like 6/4*2 land on an
    // integer; only exact integers count as a result.
    if value.is_finite() && value.fract() == 0.0 {
        Some(value as i64)
    } else {
        None
    }
}

/// True when the string has at least one digit-operator-digit pattern.
fn contains_operation(expr: &str) -> bool {
    let chars: Vec<char> = expr.chars().collect();
    chars.windows(3).any(|w| {
        w[0].is_ascii_digit() && matches!(w[1], '+' | '-' | '*' | '/') && w[2].is_ascii_digit()
    })
}

fn tokenize(expr: &str) -> Option<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = expr.chars().peekable();
    while let Some(&c) = chars.peek() {
        match c {
            '0'..='9' => {
                let mut value = 0f64;
                while let Some(d) = chars.peek().and_then(|c| c.to_digit(10)) {
                    value = value * 10.0 + d as f64;
                    chars.next();
                }
                tokens.push(Token::Num(value));
            }
            '+' => {
                chars.next();
                tokens.push(Token::Op(Op::Add));
            }
            '-' => {
                chars.next();
                tokens.push(Token::Op(Op::Sub));
            }
            '*' => {
                chars.next();
                tokens.push(Token::Op(Op::Mul));
            }
            '/' => {
                chars.next();
                tokens.push(Token::Op(Op::Div));
            }
            _ => return None,
        }
    }
    Some(tokens)
}

/// Left-to-right evaluation with mul/div binding tighter than add/sub.
/// Expects number (op number)*; anything else is malformed.
fn eval_tokens(tokens: &[Token]) -> Option<f64> {
    let mut current = match tokens.first()? {
        Token::Num(n) => *n,
        Token::Op(_) => return None,
    };
    let mut terms: Vec<f64> = Vec::new();
    let mut i = 1;
    while i < tokens.len() {
        let op = match tokens[i] {
            Token::Op(op) => op,
            Token::Num(_) => return None,
        };
        let rhs = match tokens.get(i + 1) {
            Some(Token::Num(n)) => *n,
            _ => return None,
        };
        match op {
            Op::Mul => current *= rhs,
            // Division by zero yields a non-finite value, rejected above.
            Op::Div => current /= rhs,
            Op::Add => {
                terms.push(current);
                current = rhs;
            }
            Op::Sub => {
                terms.push(current);
                current = -rhs;
            }
        }
        i += 2;
    }
    terms.push(current);
    Some(terms.into_iter().sum())
}

/// How close a live evaluation sits to the target number.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Proximity {
    Near,
    Close,
    Far,
}

/// Bucket the distance between an evaluated result and the target.
pub fn proximity(result: i64, target: i64) -> Proximity {
    let diff = (result - target).abs();
    if diff <= 2 {
        Proximity::Near
    } else if diff <= 10 {
        Proximity::Close
    } else {
        Proximity::Far
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_addition() {
        assert_eq!(evaluate("6+7"), Some(13));
    }

    #[test]
    fn non_integer_division_is_invalid() {
        assert_eq!(evaluate("6/4"), None);
    }

    #[test]
    fn trailing_operator_is_incomplete() {
        // "6+" strips to "6", which has no operation yet.
        assert_eq!(evaluate("6+"), None);
        assert_eq!(evaluate("6+7*"), Some(13));
    }

    #[test]
    fn empty_and_single_digit_are_invalid() {
        assert_eq!(evaluate(""), None);
        assert_eq!(evaluate("9"), None);
    }

    #[test]
    fn multiplication_binds_tighter() {
        assert_eq!(evaluate("2+3*4"), Some(14));
        assert_eq!(evaluate("9-2*3"), Some(3));
    }

    #[test]
    fn float_intermediate_with_integer_result_is_valid() {
        // 6/4 = 1.5, then *2 = 3; mirrors evaluating the whole chain at once.
        assert_eq!(evaluate("6/4*2"), Some(3));
    }

    #[test]
    fn division_by_zero_is_invalid() {
        assert_eq!(evaluate("5/0"), None);
    }

    #[test]
    fn negative_results_are_integers_too() {
        assert_eq!(evaluate("3-8"), Some(-5));
    }

    #[test]
    fn malformed_sequences_are_invalid() {
        assert_eq!(evaluate("+6+7"), None);
        assert_eq!(evaluate("6++7"), None);
        assert_eq!(evaluate("6+7a"), None);
    }

    #[test]
    fn proximity_buckets() {
        assert_eq!(proximity(13, 13), Proximity::Near);
        assert_eq!(proximity(11, 13), Proximity::Near);
        assert_eq!(proximity(20, 13), Proximity::Close);
        assert_eq!(proximity(3, 13), Proximity::Close);
        assert_eq!(proximity(40, 13), Proximity::Far);
    }
}
