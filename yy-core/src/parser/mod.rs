pub mod control;
pub mod error;
pub mod expressions;

use crate::ast::{Block, Expression, Program};
use crate::lexer::{Lexer, Token, TokenKind};
pub use error::ParseError;
use expressions::{parse_expression, Precedence};

pub struct Parser<'a> {
    pub iter: std::iter::Peekable<Lexer<'a>>,
    errors: Vec<ParseError>,
    panic_mode: bool,
    end: usize,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Self {
        let iter = Lexer::new(input).peekable();
        Self {
            iter,
            errors: Vec::new(),
            panic_mode: false,
            end: input.len(),
        }
    }

    /// Offset used when the input runs out.
    pub(crate) fn end(&self) -> usize {
        self.end
    }

    pub(crate) fn parse_ident(&mut self) -> Result<std::rc::Rc<str>, ParseError> {
        let token = self.iter.next();
        match token {
            Some(Token {
                kind: TokenKind::Ident(name),
                ..
            }) => Ok(name),
            _ => Err(ParseError::unexpected_other(
                error::Expected::Identifier,
                token,
                self.end,
            )),
        }
    }

    pub(crate) fn expect_token(&mut self, token_kind: TokenKind) -> Result<(), ParseError> {
        let token = self.iter.next();
        match token {
            Some(Token { kind, .. }) if kind == token_kind => Ok(()),
            _ => Err(ParseError::unexpected_token(token_kind, token, self.end)),
        }
    }

    pub(crate) fn next_is(&mut self, token_kind: &TokenKind) -> bool {
        matches!(self.iter.peek(), Some(token) if token.kind == *token_kind)
    }

    fn skip_semicolons(&mut self) {
        while self
            .iter
            .next_if(|token| token.kind == TokenKind::SemiColon)
            .is_some()
        {}
    }

    /// Parses expressions up to the closing `}`, which is consumed. The
    /// opening `{` must already be consumed.
    pub(crate) fn parse_block(&mut self) -> Result<Block, ParseError> {
        let mut expressions = Vec::new();
        loop {
            self.skip_semicolons();
            match self.iter.peek() {
                Some(Token {
                    kind: TokenKind::RBrace,
                    ..
                }) => {
                    self.iter.next();
                    return Ok(Block { expressions });
                }
                None => {
                    return Err(ParseError::unexpected_token(
                        TokenKind::RBrace,
                        None,
                        self.end,
                    ))
                }
                Some(_) => expressions.push(parse_expression(self, Precedence::Lowest)?),
            }
        }
    }

    fn record_error(&mut self, error: ParseError) {
        if self.panic_mode {
            log::debug!("suppressed parse error while recovering: {}", error);
            return;
        }
        log::debug!("parse error at {}: {}", error.offset(), error);
        self.panic_mode = true;
        self.errors.push(error);
    }

    /// Skips tokens until a `;` (consumed) or the start of a construct
    /// that can begin a new expression.
    fn sync(&mut self) {
        while let Some(token) = self.iter.peek() {
            match token.kind {
                TokenKind::SemiColon => {
                    self.iter.next();
                    return;
                }
                TokenKind::Yeet
                | TokenKind::Yif
                | TokenKind::Yall
                | TokenKind::Yoyo
                | TokenKind::Yolo
                | TokenKind::Backslash
                | TokenKind::MacroIntro => return,
                _ => {
                    self.iter.next();
                }
            }
        }
    }

    /// Parses the whole input, replacing every expression that failed to
    /// parse with `Expression::Bad`. Errors are returned alongside.
    pub fn parse_program_with_errors(&mut self) -> (Program, Vec<ParseError>) {
        let mut expressions = Vec::new();

        loop {
            self.skip_semicolons();
            let Some(next) = self.iter.peek() else {
                break;
            };
            let start = next.clone();

            match parse_expression(self, Precedence::Lowest) {
                Ok(expression) => {
                    expressions.push(expression);
                    self.panic_mode = false;
                }
                Err(error) => {
                    self.record_error(error);
                    expressions.push(Expression::Bad(start));
                    self.sync();
                }
            }
        }

        (Program { expressions }, std::mem::take(&mut self.errors))
    }

    pub fn parse_program(&mut self) -> Result<Program, Vec<ParseError>> {
        let (program, errors) = self.parse_program_with_errors();
        if errors.is_empty() {
            log::trace!("parsed program:\n{}", program);
            Ok(program)
        } else {
            Err(errors)
        }
    }
}
