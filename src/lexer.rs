use std::{fmt, iter::Peekable, str::Chars};

use crate::grammar::END_MARKER;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Identifier,
    True,
    False,
    Union,
    Intersection,
    Or,
    And,
    LParen,
    RParen,
    Not,
    Illegal,
    End,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Identifier => "IDENTIFIER",
            Self::True => "TRUE",
            Self::False => "FALSE",
            Self::Union => "UNION",
            Self::Intersection => "INTERSECTION",
            Self::Or => "OR",
            Self::And => "AND",
            Self::LParen => "LPAREN",
            Self::RParen => "RPAREN",
            Self::Not => "NOT",
            Self::Illegal => "ILLEGAL",
            Self::End => "END",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
}

impl Token {
    pub fn new(kind: TokenKind, value: impl Into<String>) -> Self {
        Token {
            kind,
            value: value.into(),
        }
    }

    // The `$` marker the parser expects after the last real token.
    pub fn end() -> Self {
        Token::new(TokenKind::End, END_MARKER)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.value)
    }
}

// Splits `source` into tokens. Alternative spellings are normalized: `||`
// reads as `V`, `&&` as `^` and `!` as `-`. No end token is produced.
pub fn tokenize(source: &str) -> Vec<Token> {
    let mut chars = source.chars().peekable();
    let mut tokens = Vec::new();

    while let Some(ch) = chars.next() {
        let token = match ch {
            ch if ch.is_whitespace() => continue,
            'V' => Token::new(TokenKind::Union, "V"),
            '|' => match chars.next_if_eq(&'|') {
                Some(_) => Token::new(TokenKind::Or, "V"),
                None => Token::new(TokenKind::Illegal, "|"),
            },
            '^' => Token::new(TokenKind::Intersection, "^"),
            '&' => match chars.next_if_eq(&'&') {
                Some(_) => Token::new(TokenKind::And, "^"),
                None => Token::new(TokenKind::Illegal, "&"),
            },
            '-' | '!' => Token::new(TokenKind::Not, "-"),
            '(' => Token::new(TokenKind::LParen, "("),
            ')' => Token::new(TokenKind::RParen, ")"),
            ch if ch.is_ascii_alphabetic() => read_word(ch, &mut chars),
            ch => Token::new(TokenKind::Illegal, ch.to_string()),
        };
        tokens.push(token);
    }

    tokens
}

fn read_word(first: char, chars: &mut Peekable<Chars<'_>>) -> Token {
    let mut word = String::from(first);
    while let Some(ch) = chars.next_if(|ch| ch.is_ascii_alphanumeric() || *ch == '_') {
        word.push(ch);
    }

    let kind = match word.as_str() {
        "true" => TokenKind::True,
        "false" => TokenKind::False,
        _ => TokenKind::Identifier,
    };
    Token::new(kind, word)
}
