use std::fmt::Display;
use std::rc::Rc;

use crate::lexer::Token;

#[derive(Debug, PartialEq, Clone)]
pub enum Expression {
    Identifier(Identifier),
    IntegerLiteral(i64),
    NumberLiteral(f64),
    BooleanLiteral(bool),
    NullLiteral,
    StringLiteral(String),
    /// `template` holds the literal text with a `%s` hole for each value;
    /// a literal percent sign is stored as `%%`.
    TemplateString {
        template: String,
        values: Vec<Expression>,
    },
    ArrayLiteral(Vec<Expression>),
    HashLiteral(Vec<(Expression, Expression)>),
    Range {
        start: Box<Expression>,
        end: Box<Expression>,
    },
    PrefixOperation(PrefixOperationKind, Box<Expression>),
    InfixOperation(InfixOperationKind, Box<Expression>, Box<Expression>),
    And(Box<Expression>, Box<Expression>),
    Or(Box<Expression>, Box<Expression>),
    IndexExpression {
        left: Box<Expression>,
        index: Box<Expression>,
    },
    CallExpression {
        function: Box<Expression>,
        arguments: Vec<Expression>,
    },
    Assign {
        target: Box<Expression>,
        value: Box<Expression>,
        kind: AssignKind,
    },
    Block(Block),
    Yif {
        condition: Box<Expression>,
        consequence: Block,
        alternative: Option<Block>,
    },
    Yoyo {
        condition: Box<Expression>,
        body: Block,
    },
    Yall {
        key: Identifier,
        iterable: Box<Expression>,
        body: Block,
    },
    Yeet(Box<Expression>),
    Yolo(Block),
    Lambda {
        parameters: Vec<Identifier>,
        body: Block,
    },
    Macro {
        parameters: Vec<Identifier>,
        body: Block,
    },
    Bad(Token),
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum AssignKind {
    Declare,
    Assign,
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum InfixOperationKind {
    Plus,
    Minus,
    Multiply,
    Divide,
    Modulo,
    LessThan,
    LessEqual,
    GreaterThan,
    GreaterEqual,
    Equal,
    NotEqual,
    Push,
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum PrefixOperationKind {
    Minus,
    Bang,
}

#[derive(Debug, PartialEq, Clone)]
pub struct Identifier {
    pub name: Rc<str>,
}

impl Identifier {
    pub fn new(name: &str) -> Self {
        Identifier { name: name.into() }
    }
}

#[derive(Debug, PartialEq, Clone, Default)]
pub struct Program {
    pub expressions: Vec<Expression>,
}

#[derive(Debug, PartialEq, Clone, Default)]
pub struct Block {
    pub expressions: Vec<Expression>,
}

impl Display for Block {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.expressions.is_empty() {
            return write!(f, "{{ }}");
        }
        write!(f, "{{ ")?;
        for (i, expression) in self.expressions.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}", expression)?;
        }
        write!(f, " }}")
    }
}

fn write_parameters(f: &mut std::fmt::Formatter<'_>, parameters: &[Identifier]) -> std::fmt::Result {
    let names = parameters
        .iter()
        .map(|parameter| parameter.name.as_ref())
        .collect::<Box<[&str]>>()
        .join(", ");
    if names.is_empty() {
        write!(f, " ")
    } else {
        write!(f, "{} ", names)
    }
}

fn write_string_literal(f: &mut std::fmt::Formatter<'_>, value: &str) -> std::fmt::Result {
    write!(f, "\"")?;
    for ch in value.chars() {
        match ch {
            '"' => write!(f, "\\\"")?,
            '\\' => write!(f, "\\\\")?,
            '\n' => write!(f, "\\n")?,
            '\t' => write!(f, "\\t")?,
            '\r' => write!(f, "\\r")?,
            ch => write!(f, "{}", ch)?,
        }
    }
    write!(f, "\"")
}

fn write_template(
    f: &mut std::fmt::Formatter<'_>,
    template: &str,
    values: &[Expression],
) -> std::fmt::Result {
    write!(f, "`")?;
    let mut values = values.iter();
    let mut chars = template.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '%' => match chars.next() {
                Some('s') => match values.next() {
                    Some(value) => write!(f, "{{{}}}", value)?,
                    None => write!(f, "{{null}}")?,
                },
                Some(other) => write!(f, "{}", other)?,
                None => write!(f, "%")?,
            },
            '{' => write!(f, "{{{{")?,
            '}' => write!(f, "}}}}")?,
            ch => write!(f, "{}", ch)?,
        }
    }
    write!(f, "`")
}

impl Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use Expression::*;
        match self {
            Identifier(ident) => write!(f, "{}", ident.name),
            IntegerLiteral(val) => write!(f, "{}", val),
            NumberLiteral(val) => {
                if val.fract() == 0.0 && val.is_finite() {
                    write!(f, "{:.1}", val)
                } else {
                    write!(f, "{}", val)
                }
            }
            BooleanLiteral(val) => write!(f, "{}", val),
            NullLiteral => write!(f, "null"),
            StringLiteral(val) => write_string_literal(f, val),
            TemplateString { template, values } => write_template(f, template, values),
            ArrayLiteral(arr) => {
                write!(f, "[")?;
                for (i, expr) in arr.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", expr)?;
                }
                write!(f, "]")
            }
            HashLiteral(hash) => {
                write!(f, "%{{")?;
                for (i, (key, value)) in hash.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                write!(f, "}}")
            }
            Range { start, end } => write!(f, "({}..{})", start, end),
            PrefixOperation(kind, expr) => write!(f, "({}{})", kind.to_str(), expr),
            InfixOperation(kind, left, right) => {
                write!(f, "({} {} {})", left, kind.to_str(), right)
            }
            And(left, right) => write!(f, "({} && {})", left, right),
            Or(left, right) => write!(f, "({} || {})", left, right),
            IndexExpression { left, index } => write!(f, "({}[{}])", left, index),
            CallExpression {
                function,
                arguments,
            } => {
                write!(
                    f,
                    "{}({})",
                    function,
                    arguments
                        .iter()
                        .map(|arg| arg.to_string())
                        .collect::<Vec<String>>()
                        .join(", ")
                )
            }
            Assign {
                target,
                value,
                kind,
            } => {
                let operator = match kind {
                    AssignKind::Declare => ":=",
                    AssignKind::Assign => "=",
                };
                write!(f, "({} {} {})", target, operator, value)
            }
            Block(block) => write!(f, "{}", block),
            Yif {
                condition,
                consequence,
                alternative,
            } => {
                write!(f, "yif {} {}", condition, consequence)?;
                if let Some(alternative) = alternative {
                    write!(f, " yels {}", alternative)?;
                }
                Ok(())
            }
            Yoyo { condition, body } => write!(f, "yoyo {} {}", condition, body),
            Yall {
                key,
                iterable,
                body,
            } => write!(f, "yall {}: {} {}", key.name, iterable, body),
            Yeet(value) => write!(f, "(yeet {})", value),
            Yolo(body) => write!(f, "yolo {}", body),
            Lambda { parameters, body } => {
                write!(f, "\\")?;
                write_parameters(f, parameters)?;
                write!(f, "{}", body)
            }
            Macro { parameters, body } => {
                write!(f, "@\\")?;
                write_parameters(f, parameters)?;
                write!(f, "{}", body)
            }
            Bad(token) => write!(f, "<bad {}>", token.kind),
        }
    }
}

impl Display for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for expression in &self.expressions {
            writeln!(f, "{};", expression)?;
        }
        Ok(())
    }
}

impl PrefixOperationKind {
    pub fn to_str(&self) -> &'static str {
        use PrefixOperationKind::*;
        match self {
            Minus => "-",
            Bang => "!",
        }
    }
}

impl InfixOperationKind {
    pub fn to_str(&self) -> &'static str {
        use InfixOperationKind::*;
        match self {
            Plus => "+",
            Minus => "-",
            Multiply => "*",
            Divide => "/",
            Modulo => "%",
            LessThan => "<",
            LessEqual => "<=",
            GreaterThan => ">",
            GreaterEqual => ">=",
            Equal => "==",
            NotEqual => "!=",
            Push => "<<",
        }
    }
}

fn try_modify_boxed<E>(
    expression: Box<Expression>,
    modifier: &mut impl FnMut(Expression) -> Result<Expression, E>,
) -> Result<Box<Expression>, E> {
    Ok(Box::new(try_modify(*expression, modifier)?))
}

fn try_modify_all<E>(
    expressions: Vec<Expression>,
    modifier: &mut impl FnMut(Expression) -> Result<Expression, E>,
) -> Result<Vec<Expression>, E> {
    expressions
        .into_iter()
        .map(|expression| try_modify(expression, modifier))
        .collect()
}

pub fn try_modify_block<E>(
    block: Block,
    modifier: &mut impl FnMut(Expression) -> Result<Expression, E>,
) -> Result<Block, E> {
    Ok(Block {
        expressions: try_modify_all(block.expressions, modifier)?,
    })
}

pub fn try_modify_program<E>(
    program: Program,
    modifier: &mut impl FnMut(Expression) -> Result<Expression, E>,
) -> Result<Program, E> {
    Ok(Program {
        expressions: try_modify_all(program.expressions, modifier)?,
    })
}

/// Rebuilds `expression` bottom-up, handing every node to `modifier` after
/// its children have been rebuilt.
pub fn try_modify<E>(
    expression: Expression,
    modifier: &mut impl FnMut(Expression) -> Result<Expression, E>,
) -> Result<Expression, E> {
    use Expression::*;
    let rebuilt = match expression {
        TemplateString { template, values } => TemplateString {
            template,
            values: try_modify_all(values, modifier)?,
        },
        ArrayLiteral(elements) => ArrayLiteral(try_modify_all(elements, modifier)?),
        HashLiteral(pairs) => HashLiteral(
            pairs
                .into_iter()
                .map(|(key, value)| Ok((try_modify(key, modifier)?, try_modify(value, modifier)?)))
                .collect::<Result<_, E>>()?,
        ),
        Range { start, end } => Range {
            start: try_modify_boxed(start, modifier)?,
            end: try_modify_boxed(end, modifier)?,
        },
        PrefixOperation(kind, right) => PrefixOperation(kind, try_modify_boxed(right, modifier)?),
        InfixOperation(kind, left, right) => InfixOperation(
            kind,
            try_modify_boxed(left, modifier)?,
            try_modify_boxed(right, modifier)?,
        ),
        And(left, right) => And(
            try_modify_boxed(left, modifier)?,
            try_modify_boxed(right, modifier)?,
        ),
        Or(left, right) => Or(
            try_modify_boxed(left, modifier)?,
            try_modify_boxed(right, modifier)?,
        ),
        IndexExpression { left, index } => IndexExpression {
            left: try_modify_boxed(left, modifier)?,
            index: try_modify_boxed(index, modifier)?,
        },
        CallExpression {
            function,
            arguments,
        } => CallExpression {
            function: try_modify_boxed(function, modifier)?,
            arguments: try_modify_all(arguments, modifier)?,
        },
        Assign {
            target,
            value,
            kind,
        } => Assign {
            target: try_modify_boxed(target, modifier)?,
            value: try_modify_boxed(value, modifier)?,
            kind,
        },
        Block(block) => Block(try_modify_block(block, modifier)?),
        Yif {
            condition,
            consequence,
            alternative,
        } => Yif {
            condition: try_modify_boxed(condition, modifier)?,
            consequence: try_modify_block(consequence, modifier)?,
            alternative: match alternative {
                Some(alternative) => Some(try_modify_block(alternative, modifier)?),
                None => None,
            },
        },
        Yoyo { condition, body } => Yoyo {
            condition: try_modify_boxed(condition, modifier)?,
            body: try_modify_block(body, modifier)?,
        },
        Yall {
            key,
            iterable,
            body,
        } => Yall {
            key,
            iterable: try_modify_boxed(iterable, modifier)?,
            body: try_modify_block(body, modifier)?,
        },
        Yeet(value) => Yeet(try_modify_boxed(value, modifier)?),
        Yolo(body) => Yolo(try_modify_block(body, modifier)?),
        Lambda { parameters, body } => Lambda {
            parameters,
            body: try_modify_block(body, modifier)?,
        },
        Macro { parameters, body } => Macro {
            parameters,
            body: try_modify_block(body, modifier)?,
        },
        leaf @ (Identifier(_)
        | IntegerLiteral(_)
        | NumberLiteral(_)
        | BooleanLiteral(_)
        | NullLiteral
        | StringLiteral(_)
        | Bad(_)) => leaf,
    };
    modifier(rebuilt)
}

pub fn modify(expression: Expression, modifier: &mut impl FnMut(Expression) -> Expression) -> Expression {
    let result: Result<Expression, std::convert::Infallible> =
        try_modify(expression, &mut |expression| Ok(modifier(expression)));
    match result {
        Ok(expression) => expression,
        Err(never) => match never {},
    }
}

pub fn modify_program(program: Program, modifier: &mut impl FnMut(Expression) -> Expression) -> Program {
    Program {
        expressions: program
            .expressions
            .into_iter()
            .map(|expression| modify(expression, modifier))
            .collect(),
    }
}
