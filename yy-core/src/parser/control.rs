use crate::ast::{Block, Expression, Identifier};
use crate::lexer::TokenKind;
use crate::parser::expressions::{parse_expression, Precedence};
use crate::parser::{ParseError, Parser};

/// Binding name used by `yall` when none is given.
pub const DEFAULT_YALL_KEY: &str = "yt";

fn parse_braced_block(parser: &mut Parser) -> Result<Block, ParseError> {
    parser.expect_token(TokenKind::LBrace)?;
    parser.parse_block()
}

pub fn parse_yif(parser: &mut Parser) -> Result<Expression, ParseError> {
    let condition = Box::new(parse_expression(parser, Precedence::Lowest)?);
    let consequence = parse_braced_block(parser)?;

    let alternative = if parser
        .iter
        .next_if(|token| token.kind == TokenKind::Yels)
        .is_some()
    {
        if parser
            .iter
            .next_if(|token| token.kind == TokenKind::Yif)
            .is_some()
        {
            Some(Block {
                expressions: vec![parse_yif(parser)?],
            })
        } else {
            Some(parse_braced_block(parser)?)
        }
    } else {
        None
    };

    Ok(Expression::Yif {
        condition,
        consequence,
        alternative,
    })
}

pub fn parse_yoyo(parser: &mut Parser) -> Result<Expression, ParseError> {
    let condition = if parser.next_is(&TokenKind::LBrace) {
        Expression::BooleanLiteral(true)
    } else {
        parse_expression(parser, Precedence::Lowest)?
    };
    let body = parse_braced_block(parser)?;

    Ok(Expression::Yoyo {
        condition: Box::new(condition),
        body,
    })
}

pub fn parse_yall(parser: &mut Parser) -> Result<Expression, ParseError> {
    let first = parse_expression(parser, Precedence::Lowest)?;

    let (key, iterable) = match first {
        Expression::Identifier(key) if parser.next_is(&TokenKind::Colon) => {
            parser.iter.next();
            (key, parse_expression(parser, Precedence::Lowest)?)
        }
        iterable => (Identifier::new(DEFAULT_YALL_KEY), iterable),
    };
    let body = parse_braced_block(parser)?;

    Ok(Expression::Yall {
        key,
        iterable: Box::new(iterable),
        body,
    })
}

pub fn parse_yolo(parser: &mut Parser) -> Result<Expression, ParseError> {
    Ok(Expression::Yolo(parse_braced_block(parser)?))
}

pub fn parse_yeet(parser: &mut Parser) -> Result<Expression, ParseError> {
    let bare = match parser.iter.peek() {
        None => true,
        Some(token) => matches!(
            token.kind,
            TokenKind::SemiColon | TokenKind::RBrace | TokenKind::RParen
        ),
    };
    let value = if bare {
        Expression::NullLiteral
    } else {
        parse_expression(parser, Precedence::Lowest)?
    };

    Ok(Expression::Yeet(Box::new(value)))
}
