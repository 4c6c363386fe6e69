use std::fmt::Display;
use std::rc::Rc;

use thiserror::Error;

use crate::lexer::{Token, TokenKind};

#[derive(Debug, PartialEq, Clone, Error)]
pub enum ParseError {
    #[error("unexpected end of input, expected {expected}")]
    PrematureEndOfInput { expected: Expected, offset: usize },
    #[error("expected {expected}, got {}", got.kind)]
    UnexpectedToken { expected: Expected, got: Token },
    #[error("no prefix parse function for {}", .0.kind)]
    NoPrefixFunction(Token),
    #[error("cannot assign with {} to {target}", operator.kind)]
    InvalidAssignmentTarget { operator: Token, target: Rc<str> },
    #[error("could not parse {} as a number", .0.kind.literal())]
    InvalidLiteral(Token),
    #[error("{message}")]
    Lex { message: Rc<str>, offset: usize },
}

#[derive(Debug, PartialEq, Clone)]
pub enum Expected {
    Token(TokenKind),
    Identifier,
    Expression,
    TemplateContinuation,
}

impl Display for Expected {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expected::Token(kind) => write!(f, "{}", kind),
            Expected::Identifier => write!(f, "identifier"),
            Expected::Expression => write!(f, "expression"),
            Expected::TemplateContinuation => write!(f, "end of template interpolation"),
        }
    }
}

impl ParseError {
    pub fn premature_end_expected_expression(offset: usize) -> Self {
        ParseError::PrematureEndOfInput {
            expected: Expected::Expression,
            offset,
        }
    }

    pub fn unexpected_token(expected: TokenKind, got: Option<Token>, end: usize) -> ParseError {
        Self::unexpected_other(Expected::Token(expected), got, end)
    }

    pub fn unexpected_other(expected: Expected, got: Option<Token>, end: usize) -> ParseError {
        match got {
            Some(got) => ParseError::UnexpectedToken { expected, got },
            None => ParseError::PrematureEndOfInput {
                expected,
                offset: end,
            },
        }
    }

    /// Byte offset into the source the error points at.
    pub fn offset(&self) -> usize {
        match self {
            ParseError::PrematureEndOfInput { offset, .. } => *offset,
            ParseError::UnexpectedToken { got, .. } => got.start,
            ParseError::NoPrefixFunction(token) => token.start,
            ParseError::InvalidAssignmentTarget { operator, .. } => operator.start,
            ParseError::InvalidLiteral(token) => token.start,
            ParseError::Lex { offset, .. } => *offset,
        }
    }
}
