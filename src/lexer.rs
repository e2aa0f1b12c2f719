//! Splits a query into tokens: parentheses stand alone, everything else is
//! delimited by whitespace. There is no quoting, so a value cannot contain a
//! space.

/// A slice of the query together with its byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub text: &'a str,
    pub offset: usize,
}

impl<'a> Token<'a> {
    pub fn is_open_paren(&self) -> bool {
        self.text == "("
    }

    pub fn is_close_paren(&self) -> bool {
        self.text == ")"
    }
}

pub fn tokenize(src: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut start: Option<usize> = None;

    for (i, ch) in src.char_indices() {
        if ch.is_whitespace() || ch == '(' || ch == ')' {
            if let Some(s) = start.take() {
                tokens.push(Token {
                    text: &src[s..i],
                    offset: s,
                });
            }
            if ch == '(' || ch == ')' {
                tokens.push(Token {
                    text: &src[i..i + 1],
                    offset: i,
                });
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        tokens.push(Token {
            text: &src[s..],
            offset: s,
        });
    }

    tokens
}
