//! Minimal s-expression tree for precondition and effect text.

use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExprError {
    #[error("Unbalanced parentheses: {0}")]
    Unbalanced(String),

    #[error("Empty expression")]
    Empty,
}

/// An atom (`and`, `?x`, `connected`) or a parenthesized list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    Atom(String),
    List(Vec<Expr>),
}

impl Expr {
    /// Parse text holding exactly one expression.
    pub fn parse(text: &str) -> Result<Expr, ExprError> {
        let mut exprs = parse_all(text)?;
        match exprs.len() {
            0 => Err(ExprError::Empty),
            1 => Ok(exprs.remove(0)),
            n => Err(ExprError::Unbalanced(format!("expected one expression, found {}", n))),
        }
    }

    pub fn atom(text: impl Into<String>) -> Self {
        Expr::Atom(text.into())
    }

    pub fn as_atom(&self) -> Option<&str> {
        match self {
            Expr::Atom(a) => Some(a),
            Expr::List(_) => None,
        }
    }

    /// First element of a list, when it is an atom.
    pub fn head(&self) -> Option<&str> {
        match self {
            Expr::List(items) => items.first().and_then(Expr::as_atom),
            Expr::Atom(_) => None,
        }
    }

    /// Everything after the head of a list.
    pub fn args(&self) -> &[Expr] {
        match self {
            Expr::List(items) if !items.is_empty() => &items[1..],
            _ => &[],
        }
    }

    pub fn is_variable(&self) -> bool {
        self.as_atom().is_some_and(|a| a.starts_with('?'))
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Atom(a) => write!(f, "{}", a),
            Expr::List(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, ")")
            }
        }
    }
}

#[derive(Debug, PartialEq)]
enum Token {
    Open,
    Close,
    Atom(String),
}

fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars();

    let flush = |current: &mut String, tokens: &mut Vec<Token>| {
        if !current.is_empty() {
            tokens.push(Token::Atom(std::mem::take(current)));
        }
    };

    while let Some(c) = chars.next() {
        match c {
            '(' => {
                flush(&mut current, &mut tokens);
                tokens.push(Token::Open);
            }
            ')' => {
                flush(&mut current, &mut tokens);
                tokens.push(Token::Close);
            }
            ';' => {
                flush(&mut current, &mut tokens);
                for skipped in chars.by_ref() {
                    if skipped == '\n' {
                        break;
                    }
                }
            }
            c if c.is_whitespace() => flush(&mut current, &mut tokens),
            c => current.push(c),
        }
    }
    flush(&mut current, &mut tokens);
    tokens
}

/// Parse every top-level expression in `text`. `;` starts a comment.
pub fn parse_all(text: &str) -> Result<Vec<Expr>, ExprError> {
    let mut stack: Vec<Vec<Expr>> = vec![Vec::new()];

    for token in tokenize(text) {
        match token {
            Token::Open => stack.push(Vec::new()),
            Token::Close => {
                if stack.len() < 2 {
                    return Err(ExprError::Unbalanced("unexpected ')'".to_string()));
                }
                let items = stack.pop().unwrap_or_default();
                if let Some(parent) = stack.last_mut() {
                    parent.push(Expr::List(items));
                }
            }
            Token::Atom(a) => {
                if let Some(current) = stack.last_mut() {
                    current.push(Expr::Atom(a));
                }
            }
        }
    }

    if stack.len() != 1 {
        return Err(ExprError::Unbalanced(format!("{} unclosed '('", stack.len() - 1)));
    }
    Ok(stack.pop().unwrap_or_default())
}
