use super::control;
use super::error::{self, ParseError};
use crate::ast::{AssignKind, Expression, Identifier, InfixOperationKind, PrefixOperationKind};
use crate::lexer::{Token, TokenKind};
use crate::parser::Parser;

#[derive(PartialOrd, PartialEq, Debug, Clone, Copy)]
pub enum Precedence {
    Lowest = 0,
    Assignment,
    Or,
    And,
    Equals,
    LessGreater,
    Range,
    Sum,
    Product,
    Prefix,
    Call,
    Index,
}

pub fn precedence_of(token: &TokenKind) -> Precedence {
    match token {
        TokenKind::Assign
        | TokenKind::Walrus
        | TokenKind::PlusAssign
        | TokenKind::MinusAssign
        | TokenKind::AsteriskAssign
        | TokenKind::SlashAssign
        | TokenKind::PercentAssign => Precedence::Assignment,
        TokenKind::Or => Precedence::Or,
        TokenKind::And => Precedence::And,
        TokenKind::Equal => Precedence::Equals,
        TokenKind::NotEqual => Precedence::Equals,
        TokenKind::LessThan => Precedence::LessGreater,
        TokenKind::LessEqual => Precedence::LessGreater,
        TokenKind::GreaterThan => Precedence::LessGreater,
        TokenKind::GreaterEqual => Precedence::LessGreater,
        TokenKind::ShiftLeft => Precedence::LessGreater,
        TokenKind::Range => Precedence::Range,
        TokenKind::Plus => Precedence::Sum,
        TokenKind::Minus => Precedence::Sum,
        TokenKind::Asterisk => Precedence::Product,
        TokenKind::Slash => Precedence::Product,
        TokenKind::Percent => Precedence::Product,
        TokenKind::LParen => Precedence::Call,
        TokenKind::LBracket => Precedence::Index,
        _ => Precedence::Lowest,
    }
}

pub fn parse_expression(
    parser: &mut Parser,
    precedence: Precedence,
) -> Result<Expression, ParseError> {
    let Some(token) = parser.iter.next() else {
        return Err(ParseError::premature_end_expected_expression(parser.end()));
    };
    let mut left_expression = prefix_parsing(token, parser)?;

    loop {
        let Some(next_token) = parser.iter.peek() else {
            break;
        };

        let next_precedence = precedence_of(&next_token.kind);
        if precedence >= next_precedence {
            break;
        }

        let Some(next_token) = parser.iter.next() else {
            break;
        };
        let Some(infix_parse_function) = infix_parsing_function(next_token) else {
            break;
        };
        left_expression = infix_parse_function(left_expression, parser)?;
    }

    Ok(left_expression)
}

fn prefix_operation(
    kind: PrefixOperationKind,
) -> impl FnOnce(&mut Parser) -> Result<Expression, ParseError> {
    move |parser| {
        Ok(Expression::PrefixOperation(
            kind,
            Box::new(parse_expression(parser, Precedence::Prefix)?),
        ))
    }
}

fn parse_grouped_expression(parser: &mut Parser) -> Result<Expression, ParseError> {
    let expression = parse_expression(parser, Precedence::Lowest)?;
    parser.expect_token(TokenKind::RParen)?;

    Ok(expression)
}

pub(crate) fn parse_sequence<T>(
    parser: &mut Parser,
    parse_element: impl Fn(&mut Parser) -> Result<T, ParseError>,
    separator: TokenKind,
    terminator: TokenKind,
) -> Result<Vec<T>, ParseError> {
    let mut elements = Vec::new();

    loop {
        match parser.iter.peek() {
            Some(next) if next.kind == terminator => {
                parser.iter.next();
                return Ok(elements);
            }
            None => {
                return Err(ParseError::unexpected_token(terminator, None, parser.end()));
            }
            _ => {
                elements.push(parse_element(parser)?);
            }
        }

        match parser.iter.next() {
            Some(next) if next.kind == separator => continue,
            Some(next) if next.kind == terminator => return Ok(elements),
            next => return Err(ParseError::unexpected_token(separator, next, parser.end())),
        }
    }
}

fn parse_array_literal(parser: &mut Parser) -> Result<Expression, ParseError> {
    let expressions = parse_sequence(
        parser,
        |parser| parse_expression(parser, Precedence::Lowest),
        TokenKind::Comma,
        TokenKind::RBracket,
    )?;
    Ok(Expression::ArrayLiteral(expressions))
}

fn parse_hash_literal(parser: &mut Parser) -> Result<Expression, ParseError> {
    let pairs = parse_sequence(
        parser,
        |parser| {
            let key = parse_expression(parser, Precedence::Lowest)?;
            parser.expect_token(TokenKind::Colon)?;
            let value = parse_expression(parser, Precedence::Lowest)?;
            Ok((key, value))
        },
        TokenKind::Comma,
        TokenKind::RBrace,
    )?;
    Ok(Expression::HashLiteral(pairs))
}

fn escape_template_text(text: &str) -> String {
    text.replace('%', "%%")
}

/// Continues a template string after its `TemplateHead`. Every head or
/// middle part is followed by one interpolated expression, which may itself
/// be a template.
fn parse_template_string(head: &str, parser: &mut Parser) -> Result<Expression, ParseError> {
    let mut template = escape_template_text(head);
    let mut values = Vec::new();

    loop {
        if let Some(Token {
            kind: TokenKind::TemplateMiddle(_) | TokenKind::TemplateTail(_),
            ..
        }) = parser.iter.peek()
        {
            let token = parser.iter.next();
            return Err(ParseError::unexpected_other(
                error::Expected::Expression,
                token,
                parser.end(),
            ));
        }

        template.push_str("%s");
        values.push(parse_expression(parser, Precedence::Lowest)?);

        match parser.iter.next() {
            Some(Token {
                kind: TokenKind::TemplateMiddle(text),
                ..
            }) => template.push_str(&escape_template_text(&text)),
            Some(Token {
                kind: TokenKind::TemplateTail(text),
                ..
            }) => {
                template.push_str(&escape_template_text(&text));
                return Ok(Expression::TemplateString { template, values });
            }
            other => {
                return Err(ParseError::unexpected_other(
                    error::Expected::TemplateContinuation,
                    other,
                    parser.end(),
                ))
            }
        }
    }
}

/// Parameters of `\` and `@\` literals: identifiers with optional commas,
/// optionally wrapped in parentheses, followed by the body block.
fn parse_parameters_and_body(
    parser: &mut Parser,
) -> Result<(Vec<Identifier>, crate::ast::Block), ParseError> {
    let parenthesized = parser
        .iter
        .next_if(|token| token.kind == TokenKind::LParen)
        .is_some();
    let terminator = if parenthesized {
        TokenKind::RParen
    } else {
        TokenKind::LBrace
    };

    let mut parameters = Vec::new();
    loop {
        match parser.iter.peek() {
            Some(token) if token.kind == terminator => break,
            Some(token) if token.kind == TokenKind::Comma && !parameters.is_empty() => {
                parser.iter.next();
            }
            _ => parameters.push(Identifier {
                name: parser.parse_ident()?,
            }),
        }
    }

    if parenthesized {
        parser.expect_token(TokenKind::RParen)?;
    }
    parser.expect_token(TokenKind::LBrace)?;
    let body = parser.parse_block()?;

    Ok((parameters, body))
}

fn parse_lambda_literal(parser: &mut Parser) -> Result<Expression, ParseError> {
    let (parameters, body) = parse_parameters_and_body(parser)?;
    Ok(Expression::Lambda { parameters, body })
}

fn parse_macro_literal(parser: &mut Parser) -> Result<Expression, ParseError> {
    let (parameters, body) = parse_parameters_and_body(parser)?;
    Ok(Expression::Macro { parameters, body })
}

pub fn prefix_parsing(token: Token, parser: &mut Parser) -> Result<Expression, ParseError> {
    match token.kind {
        TokenKind::Ident(name) => Ok(Expression::Identifier(Identifier { name })),
        TokenKind::Int(ref val) => val
            .parse()
            .map(Expression::IntegerLiteral)
            .map_err(|_| ParseError::InvalidLiteral(token.clone())),
        TokenKind::Float(ref val) => val
            .parse()
            .map(Expression::NumberLiteral)
            .map_err(|_| ParseError::InvalidLiteral(token.clone())),
        TokenKind::String(val) => Ok(Expression::StringLiteral(val.to_string())),
        TokenKind::TemplateHead(text) => parse_template_string(&text, parser),
        TokenKind::TemplateString(text) => Ok(Expression::TemplateString {
            template: escape_template_text(&text),
            values: Vec::new(),
        }),
        TokenKind::True => Ok(Expression::BooleanLiteral(true)),
        TokenKind::False => Ok(Expression::BooleanLiteral(false)),
        TokenKind::Null => Ok(Expression::NullLiteral),
        TokenKind::Bang => prefix_operation(PrefixOperationKind::Bang)(parser),
        TokenKind::Minus => prefix_operation(PrefixOperationKind::Minus)(parser),
        TokenKind::LParen => parse_grouped_expression(parser),
        TokenKind::LBracket => parse_array_literal(parser),
        TokenKind::Hashmap => parse_hash_literal(parser),
        TokenKind::LBrace => Ok(Expression::Block(parser.parse_block()?)),
        TokenKind::Yif => control::parse_yif(parser),
        TokenKind::Yoyo => control::parse_yoyo(parser),
        TokenKind::Yall => control::parse_yall(parser),
        TokenKind::Yolo => control::parse_yolo(parser),
        TokenKind::Yeet => control::parse_yeet(parser),
        TokenKind::Backslash => parse_lambda_literal(parser),
        TokenKind::MacroIntro => parse_macro_literal(parser),
        TokenKind::Illegal(message) => Err(ParseError::Lex {
            message,
            offset: token.start,
        }),
        _ => Err(ParseError::NoPrefixFunction(token)),
    }
}

type InfixFunction = Box<dyn FnOnce(Expression, &mut Parser) -> Result<Expression, ParseError>>;

fn infix_operation(token: TokenKind, kind: InfixOperationKind) -> InfixFunction {
    Box::new(move |left: Expression, parser: &mut Parser| -> Result<Expression, ParseError> {
        let right = parse_expression(parser, precedence_of(&token))?;
        Ok(Expression::InfixOperation(kind, Box::new(left), Box::new(right)))
    })
}

fn parse_range(left: Expression, parser: &mut Parser) -> Result<Expression, ParseError> {
    let end = parse_expression(parser, Precedence::Range)?;
    Ok(Expression::Range {
        start: Box::new(left),
        end: Box::new(end),
    })
}

fn parse_and(left: Expression, parser: &mut Parser) -> Result<Expression, ParseError> {
    let right = parse_expression(parser, Precedence::And)?;
    Ok(Expression::And(Box::new(left), Box::new(right)))
}

fn parse_or(left: Expression, parser: &mut Parser) -> Result<Expression, ParseError> {
    let right = parse_expression(parser, Precedence::Or)?;
    Ok(Expression::Or(Box::new(left), Box::new(right)))
}

fn parse_call_expression(function: Expression, parser: &mut Parser) -> Result<Expression, ParseError> {
    let arguments = parse_sequence(
        parser,
        |parser| parse_expression(parser, Precedence::Lowest),
        TokenKind::Comma,
        TokenKind::RParen,
    )?;
    Ok(Expression::CallExpression {
        function: Box::new(function),
        arguments,
    })
}

fn parse_index_expression(left: Expression, parser: &mut Parser) -> Result<Expression, ParseError> {
    let index = parse_expression(parser, Precedence::Lowest)?;
    parser.expect_token(TokenKind::RBracket)?;
    Ok(Expression::IndexExpression {
        left: Box::new(left),
        index: Box::new(index),
    })
}

/// `:=`, `=` and the compound forms. Assignment is right associative, so
/// the value is parsed from the lowest precedence again.
fn assignment(operator: Token) -> InfixFunction {
    Box::new(move |target: Expression, parser: &mut Parser| -> Result<Expression, ParseError> {
        let valid_target = match (&operator.kind, &target) {
            (_, Expression::Identifier(_)) => true,
            (TokenKind::Walrus, _) => false,
            (_, Expression::IndexExpression { .. }) => true,
            _ => false,
        };
        if !valid_target {
            return Err(ParseError::InvalidAssignmentTarget {
                operator,
                target: target.to_string().into(),
            });
        }

        let value = parse_expression(parser, Precedence::Lowest)?;
        let compound = match operator.kind {
            TokenKind::Walrus => {
                return Ok(Expression::Assign {
                    target: Box::new(target),
                    value: Box::new(value),
                    kind: AssignKind::Declare,
                })
            }
            TokenKind::PlusAssign => Some(InfixOperationKind::Plus),
            TokenKind::MinusAssign => Some(InfixOperationKind::Minus),
            TokenKind::AsteriskAssign => Some(InfixOperationKind::Multiply),
            TokenKind::SlashAssign => Some(InfixOperationKind::Divide),
            TokenKind::PercentAssign => Some(InfixOperationKind::Modulo),
            _ => None,
        };

        let value = match compound {
            Some(kind) => {
                Expression::InfixOperation(kind, Box::new(target.clone()), Box::new(value))
            }
            None => value,
        };
        Ok(Expression::Assign {
            target: Box::new(target),
            value: Box::new(value),
            kind: AssignKind::Assign,
        })
    })
}

fn infix_parsing_function(token: Token) -> Option<InfixFunction> {
    match token.kind {
        TokenKind::Plus => Some(infix_operation(token.kind, InfixOperationKind::Plus)),
        TokenKind::Minus => Some(infix_operation(token.kind, InfixOperationKind::Minus)),
        TokenKind::Asterisk => Some(infix_operation(token.kind, InfixOperationKind::Multiply)),
        TokenKind::Slash => Some(infix_operation(token.kind, InfixOperationKind::Divide)),
        TokenKind::Percent => Some(infix_operation(token.kind, InfixOperationKind::Modulo)),
        TokenKind::Equal => Some(infix_operation(token.kind, InfixOperationKind::Equal)),
        TokenKind::NotEqual => Some(infix_operation(token.kind, InfixOperationKind::NotEqual)),
        TokenKind::LessThan => Some(infix_operation(token.kind, InfixOperationKind::LessThan)),
        TokenKind::LessEqual => Some(infix_operation(token.kind, InfixOperationKind::LessEqual)),
        TokenKind::GreaterThan => {
            Some(infix_operation(token.kind, InfixOperationKind::GreaterThan))
        }
        TokenKind::GreaterEqual => {
            Some(infix_operation(token.kind, InfixOperationKind::GreaterEqual))
        }
        TokenKind::ShiftLeft => Some(infix_operation(token.kind, InfixOperationKind::Push)),
        TokenKind::Range => Some(Box::new(parse_range)),
        TokenKind::And => Some(Box::new(parse_and)),
        TokenKind::Or => Some(Box::new(parse_or)),
        TokenKind::LParen => Some(Box::new(parse_call_expression)),
        TokenKind::LBracket => Some(Box::new(parse_index_expression)),
        TokenKind::Assign
        | TokenKind::Walrus
        | TokenKind::PlusAssign
        | TokenKind::MinusAssign
        | TokenKind::AsteriskAssign
        | TokenKind::SlashAssign
        | TokenKind::PercentAssign => Some(assignment(token)),
        _ => None,
    }
}
