use core::fmt;

pub use logos::Span;
use logos::{Lexer, Logos};

use crate::ast::{Comparator, Operator};

fn process_string(lexer: &mut Lexer<Token>) -> Result<Box<str>, LexerError> {
    let mut string = String::new();

    // Skip the ' at the beginning
    let mut chars = lexer.slice().chars().skip(1).peekable();

    while let Some(c) = chars.next() {
        match c {
            '\'' => break,
            '\\' => match chars.next() {
                Some('t') => string.push('\t'),
                Some('n') => string.push('\n'),
                Some('r') => string.push('\r'),
                // quotes, backslashes and anything else stand for themselves
                Some(c) => string.push(c),
                None => Err(LexerError::UnterminatedString)?,
            },
            c => string.push(c),
        }
    }

    if chars.next().is_some() {
        return Err(LexerError::UnterminatedString);
    }
    Ok(Box::from(string.as_str()))
}

fn read_integer(lexer: &mut Lexer<Token>) -> Result<i32, LexerError> {
    let digits = lexer.slice().replace('_', "");
    digits.parse().map_err(|_| LexerError::NumberTooBig)
}

fn read_float(lexer: &mut Lexer<Token>) -> Result<f64, LexerError> {
    let digits = lexer.slice().replace('_', "");
    digits.parse().map_err(|_| LexerError::MalformedNumber)
}

#[derive(thiserror::Error, Debug, PartialEq, Clone, Default)]
pub enum LexerError {
    #[default]
    #[error("invalid token encountered")]
    Invalid,
    #[error("unterminated string")]
    UnterminatedString,
    #[error("malformed number")]
    MalformedNumber,
    #[error("integer literal does not fit in 32 bits")]
    NumberTooBig,
}

#[derive(Debug, Clone, PartialEq, Logos)]
#[logos(error = LexerError)]
#[logos(skip r"([ \t\r\n\f]+|//[^\n]*)")]
pub enum Token {
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(",")]
    Comma,

    #[token("create")]
    Create,
    #[token("if")]
    If,
    #[token("as")]
    As,
    #[token("not")]
    Not,

    #[regex("[a-zA-Z_][a-zA-Z0-9_]*", |l| Box::from(l.slice()))]
    Identifier(Box<str>),
    #[regex(r"'([^'\\]|\\.)*'", process_string)]
    #[regex(r"'([^'\\]|\\.)*", |_| { Err::<Box<str>, _>(LexerError::UnterminatedString) })]
    String(Box<str>),
    #[regex("[0-9][0-9_]*", read_integer)]
    Integer(i32),
    #[regex(r"[0-9][0-9_]*\.[0-9_]*", read_float)]
    Float(f64),

    #[token("+", |_| Operator::Add)]
    #[token("-", |_| Operator::Sub)]
    #[token("*", |_| Operator::Mul)]
    #[token("/", |_| Operator::Div)]
    #[token("%", |_| Operator::Mod)]
    Operation(Operator),
    #[token("=", |_| Operator::Set)]
    #[token("+=", |_| Operator::Add)]
    #[token("-=", |_| Operator::Sub)]
    #[token("*=", |_| Operator::Mul)]
    #[token("/=", |_| Operator::Div)]
    #[token("%=", |_| Operator::Mod)]
    Assignment(Operator),
    #[token("++")]
    Increment,
    #[token("--")]
    Decrement,
    #[token("==", |_| Comparator::Eq)]
    #[token("!=", |_| Comparator::Neq)]
    #[token("<", |_| Comparator::Lt)]
    #[token("<=", |_| Comparator::Lte)]
    #[token(">", |_| Comparator::Gt)]
    #[token(">=", |_| Comparator::Gte)]
    Comparison(Comparator),
}

impl Token {
    pub fn lexer(source: &str) -> Lexer<Self> {
        <Self as Logos>::lexer(source)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LBrace => f.write_str("{"),
            Self::RBrace => f.write_str("}"),
            Self::LParen => f.write_str("("),
            Self::RParen => f.write_str(")"),
            Self::LBracket => f.write_str("["),
            Self::RBracket => f.write_str("]"),
            Self::Comma => f.write_str(","),
            Self::Create => f.write_str("create"),
            Self::If => f.write_str("if"),
            Self::As => f.write_str("as"),
            Self::Not => f.write_str("not"),
            Self::Identifier(name) => f.write_str(name),
            Self::String(content) => write!(f, "'{content}'"),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Operation(operator) => write!(f, "{operator}"),
            Self::Assignment(Operator::Set) => f.write_str("="),
            Self::Assignment(operator) => write!(f, "{operator}="),
            Self::Increment => f.write_str("++"),
            Self::Decrement => f.write_str("--"),
            Self::Comparison(comparator) => write!(f, "{comparator}"),
        }
    }
}
