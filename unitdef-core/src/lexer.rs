//! Tokenizer for unit and arithmetic expressions

use crate::ExprError;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Numeric literal, kept as written
    Number(String),
    /// Unit name or bracketed dimension name
    Name(String),
    Plus,
    Minus,
    Star,
    Slash,
    /// `**` or `^`
    Pow,
    LParen,
    RParen,
}

impl Token {
    /// True if this token can start an operand (used for implicit multiplication)
    pub fn starts_operand(&self) -> bool {
        matches!(self, Token::Number(_) | Token::Name(_) | Token::LParen)
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Number(s) | Token::Name(s) => write!(f, "{}", s),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::Pow => write!(f, "**"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
        }
    }
}

fn is_name_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_name_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Split an expression into tokens
pub fn tokenize(input: &str) -> Result<Vec<Token>, ExprError> {
    let chars: Vec<(usize, char)> = input.char_indices().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let (pos, c) = chars[i];

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        match c {
            '+' => tokens.push(Token::Plus),
            '-' => tokens.push(Token::Minus),
            '/' => tokens.push(Token::Slash),
            '^' => tokens.push(Token::Pow),
            '(' => tokens.push(Token::LParen),
            ')' => tokens.push(Token::RParen),
            '*' => {
                if i + 1 < chars.len() && chars[i + 1].1 == '*' {
                    tokens.push(Token::Pow);
                    i += 1;
                } else {
                    tokens.push(Token::Star);
                }
            }
            '[' => {
                // Dimension name: everything up to the closing bracket
                let mut j = i + 1;
                while j < chars.len() && chars[j].1 != ']' {
                    let inner = chars[j].1;
                    if !is_name_continue(inner) {
                        return Err(ExprError::UnexpectedChar(inner, chars[j].0));
                    }
                    j += 1;
                }
                if j == chars.len() {
                    return Err(ExprError::UnexpectedEnd);
                }
                let end = chars[j].0 + 1;
                tokens.push(Token::Name(input[pos..end].to_string()));
                i = j;
            }
            c if c.is_ascii_digit() || c == '.' => {
                let end = scan_number(&chars, i);
                let stop = chars.get(end).map_or(input.len(), |&(p, _)| p);
                tokens.push(Token::Number(input[pos..stop].to_string()));
                i = end;
                continue;
            }
            c if is_name_start(c) => {
                let mut j = i + 1;
                while j < chars.len() && is_name_continue(chars[j].1) {
                    j += 1;
                }
                let stop = chars.get(j).map_or(input.len(), |&(p, _)| p);
                tokens.push(Token::Name(input[pos..stop].to_string()));
                i = j;
                continue;
            }
            _ => return Err(ExprError::UnexpectedChar(c, pos)),
        }
        i += 1;
    }

    Ok(tokens)
}

/// Scan a numeric literal starting at `start`; returns the index one past its end.
/// The exponent marker is only consumed when digits follow it.
fn scan_number(chars: &[(usize, char)], start: usize) -> usize {
    let mut j = start;
    while j < chars.len() && (chars[j].1.is_ascii_digit() || chars[j].1 == '.') {
        j += 1;
    }

    if j < chars.len() && (chars[j].1 == 'e' || chars[j].1 == 'E') {
        let mut k = j + 1;
        if k < chars.len() && (chars[k].1 == '+' || chars[k].1 == '-') {
            k += 1;
        }
        if k < chars.len() && chars[k].1.is_ascii_digit() {
            while k < chars.len() && chars[k].1.is_ascii_digit() {
                k += 1;
            }
            return k;
        }
    }

    j
}
