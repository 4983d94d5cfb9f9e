use super::{BinOp, Formula, Quantifier, UnOp};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("empty formula")]
    Empty,
    #[error("unbalanced brackets in '{0}'")]
    UnbalancedBrackets(String),
    #[error("operator '{op}' is missing an operand in '{input}'")]
    MissingOperand { op: char, input: String },
    #[error("quantifier '{quantifier}' is not followed by a variable in '{input}'")]
    MissingVariable { quantifier: char, input: String },
    #[error("unexpected text before '{op}' in '{input}'")]
    DanglingText { op: char, input: String },
    #[error("invalid atom '{0}'")]
    InvalidAtom(String),
}

/// The main connective of a string, found by [find_main_operator].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MainOp {
    Binary(usize, BinOp),
    Unary(usize, UnOp),
}

/// Parses a formula.
///
/// Binary connectives are not ordered by precedence. The main connective is the first binary connective at bracket depth zero.
/// Only if there is none, the first unary connective at depth zero is used. Hence `~P∧Q` parses as `(~P)∧Q` and `P∧Q∨R` as `P∧(Q∨R)`.
/// A quantifier binds everything up to the end of the (bracket-stripped) string it starts.
pub fn parse(input: &str) -> Result<Formula, ParseError> {
    let chars: Vec<char> = input.chars().filter(|c| !c.is_whitespace()).collect();
    check_balanced(&chars)?;
    let f = parse_chars(&chars)?;
    log::trace!("Parsed '{}' as {}", input, f);
    Ok(f)
}

fn parse_chars(s: &[char]) -> Result<Formula, ParseError> {
    let s = strip_outer_brackets(s);
    if s.is_empty() {
        return Err(ParseError::Empty);
    }

    // Quantifier
    if let Some(q) = Quantifier::from_symbol(s[0]) {
        return match s.get(1) {
            Some(v) if v.is_alphabetic() => {
                let body = &s[2..];
                if strip_outer_brackets(body).is_empty() {
                    return Err(ParseError::MissingOperand {
                        op: s[0],
                        input: s.iter().collect(),
                    });
                }
                Ok(Formula::Quantified(q, *v, Box::new(parse_chars(body)?)))
            }
            _ => Err(ParseError::MissingVariable {
                quantifier: s[0],
                input: s.iter().collect(),
            }),
        };
    }

    match find_main_operator(s) {
        Some(MainOp::Binary(i, op)) => {
            let (left, right) = (&s[..i], &s[i + 1..]);
            if strip_outer_brackets(left).is_empty() || strip_outer_brackets(right).is_empty() {
                return Err(ParseError::MissingOperand {
                    op: s[i],
                    input: s.iter().collect(),
                });
            }
            Ok(Formula::binary(op, parse_chars(left)?, parse_chars(right)?))
        }
        Some(MainOp::Unary(i, op)) => {
            if i > 0 {
                return Err(ParseError::DanglingText {
                    op: s[i],
                    input: s.iter().collect(),
                });
            }
            let operand = &s[i + 1..];
            if strip_outer_brackets(operand).is_empty() {
                return Err(ParseError::MissingOperand {
                    op: s[i],
                    input: s.iter().collect(),
                });
            }
            Ok(Formula::Unary(op, Box::new(parse_chars(operand)?)))
        }
        None => parse_atom(s),
    }
}

fn parse_atom(s: &[char]) -> Result<Formula, ParseError> {
    let name: String = s.iter().collect();
    let starts_alphabetic = s.first().map(|c| c.is_alphabetic()).unwrap_or(false);
    if !starts_alphabetic || s.iter().any(|c| Quantifier::from_symbol(*c).is_some()) {
        return Err(ParseError::InvalidAtom(name));
    }
    Ok(Formula::Atomic(name))
}

fn is_open(c: char) -> bool {
    c == '(' || c == '['
}

fn is_close(c: char) -> bool {
    c == ')' || c == ']'
}

fn closing(open: char) -> char {
    match open {
        '[' => ']',
        _ => ')',
    }
}

/// Checks that every bracket is closed by a bracket of the same kind.
fn check_balanced(s: &[char]) -> Result<(), ParseError> {
    let mut open = Vec::new();
    for &c in s {
        if is_open(c) {
            open.push(c);
        } else if is_close(c) {
            match open.pop() {
                Some(o) if closing(o) == c => {}
                _ => return Err(ParseError::UnbalancedBrackets(s.iter().collect())),
            }
        }
    }
    if !open.is_empty() {
        return Err(ParseError::UnbalancedBrackets(s.iter().collect()));
    }
    Ok(())
}

/// Returns true if the first and last character are brackets and the first one is closed by the last one.
/// `(P)∧(Q)` starts and ends with a bracket, but the first bracket closes before the end.
fn is_wrapped(s: &[char]) -> bool {
    if s.len() < 2 || !is_open(s[0]) || !is_close(s[s.len() - 1]) {
        return false;
    }
    let mut depth = 0usize;
    for (i, &c) in s.iter().enumerate() {
        if is_open(c) {
            depth += 1;
        } else if is_close(c) {
            depth = depth.saturating_sub(1);
            if depth == 0 {
                return i == s.len() - 1;
            }
        }
    }
    false
}

/// Removes all layers of brackets that enclose the entire string.
fn strip_outer_brackets(mut s: &[char]) -> &[char] {
    while is_wrapped(s) {
        s = &s[1..s.len() - 1];
    }
    s
}

/// Finds the main connective: the first binary connective at depth zero, or, if there is none, the first unary connective at depth zero.
fn find_main_operator(s: &[char]) -> Option<MainOp> {
    let mut depth = 0usize;
    let mut unary = None;
    for (i, &c) in s.iter().enumerate() {
        if is_open(c) {
            depth += 1;
        } else if is_close(c) {
            depth = depth.saturating_sub(1);
        } else if depth == 0 {
            if let Some(op) = BinOp::from_symbol(c) {
                return Some(MainOp::Binary(i, op));
            } else if let Some(op) = UnOp::from_symbol(c) {
                if unary.is_none() {
                    unary = Some(MainOp::Unary(i, op));
                }
            }
        }
    }
    unary
}
