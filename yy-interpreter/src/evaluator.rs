use std::rc::Rc;

use gc::Gc;
use yy_core::ast::{self, AssignKind, Expression, InfixOperationKind, PrefixOperationKind};

use crate::builtins;
use crate::environment::Environment;
use crate::macros;
use crate::object::{EvaluationError, Object, QuickReturn};
use crate::yolo;

pub fn eval_program(
    program: &ast::Program,
    environment: &Environment,
) -> Result<Gc<Object>, EvaluationError> {
    let mut output = Object::null();
    for expression in &program.expressions {
        match eval_expression(expression, environment) {
            Err(QuickReturn::Return(value)) => return Ok(value),
            Err(QuickReturn::Error(error)) => return Err(error),
            Ok(object) => output = object,
        };
    }
    Ok(output)
}

pub(crate) fn eval_block(
    block: &ast::Block,
    environment: &Environment,
) -> Result<Gc<Object>, QuickReturn> {
    let mut result = Object::null();
    for expression in &block.expressions {
        result = eval_expression(expression, environment)?;
    }
    Ok(result)
}

/// Stack left before evaluation moves onto a freshly allocated segment.
const STACK_RED_ZONE: usize = 128 * 1024;
const STACK_GROW_SIZE: usize = 4 * 1024 * 1024;

pub(crate) fn eval_expression(
    expression: &Expression,
    environment: &Environment,
) -> Result<Gc<Object>, QuickReturn> {
    stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || {
        eval_expression_inner(expression, environment)
    })
}

fn eval_expression_inner(
    expression: &Expression,
    environment: &Environment,
) -> Result<Gc<Object>, QuickReturn> {
    match expression {
        Expression::IntegerLiteral(value) => Ok(Object::integer(*value)),
        Expression::NumberLiteral(value) => Ok(Object::number(*value)),
        Expression::BooleanLiteral(value) => Ok(Object::boolean(*value)),
        Expression::NullLiteral => Ok(Object::null()),
        Expression::StringLiteral(value) => Ok(Object::string(interpolate(value, environment)?)),
        Expression::TemplateString { template, values } => {
            let values = eval_expressions(values, environment)?;
            Ok(Object::string(fill_template(template, &values)))
        }
        Expression::ArrayLiteral(array) => Ok(Object::array(eval_expressions(array, environment)?)),
        Expression::HashLiteral(literal) => {
            let mut hashmap = crate::object::Hashmap::new();
            for (key, value) in literal {
                let key = eval_expression(key, environment)?;
                let value = eval_expression(value, environment)?;
                hashmap.insert(&key, value)?;
            }
            Ok(Object::hashmap(hashmap))
        }
        Expression::Range { start, end } => {
            let start = eval_expression(start, environment)?;
            let end = eval_expression(end, environment)?;
            match (start.as_ref(), end.as_ref()) {
                (Object::Integer(start), Object::Integer(end)) => Ok(Object::range(*start, *end)),
                _ => Err(EvaluationError::InvalidRange {
                    start: start.kind(),
                    end: end.kind(),
                }
                .into()),
            }
        }
        Expression::Identifier(identifier) => Ok(eval_identifier(identifier, environment)?),
        Expression::PrefixOperation(kind, right) => {
            let right = eval_expression(right, environment)?;
            Ok(eval_prefix(*kind, &right, environment.is_yolo())?)
        }
        Expression::InfixOperation(InfixOperationKind::Push, left, right)
            if matches!(left.as_ref(), Expression::Identifier(_)) =>
        {
            let target = eval_expression(left, environment)?;
            let value = eval_expression(right, environment)?;
            if let Object::Array(array) = target.as_ref() {
                array.borrow_mut().push(value);
                return Ok(target);
            }
            Ok(eval_infix(
                InfixOperationKind::Push,
                &target,
                &value,
                environment.is_yolo(),
            )?)
        }
        Expression::InfixOperation(kind, left, right) => {
            let left = eval_expression(left, environment)?;
            let right = eval_expression(right, environment)?;
            Ok(eval_infix(*kind, &left, &right, environment.is_yolo())?)
        }
        Expression::And(left, right) => {
            let left = eval_expression(left, environment)?;
            if !left.is_truthy() {
                return Ok(left);
            }
            eval_expression(right, environment)
        }
        Expression::Or(left, right) => {
            let left = eval_expression(left, environment)?;
            if left.is_truthy() {
                return Ok(left);
            }
            eval_expression(right, environment)
        }
        Expression::IndexExpression { left, index } => {
            let left = eval_expression(left, environment)?;
            let index = eval_expression(index, environment)?;
            Ok(eval_index(&left, &index)?)
        }
        Expression::CallExpression {
            function,
            arguments,
        } => {
            if matches!(function.as_ref(), Expression::Identifier(identifier) if identifier.name.as_ref() == "quote")
            {
                return macros::quote(arguments, environment);
            }
            let callee = eval_expression(function, environment)?;
            let arguments = eval_expressions(arguments, environment)?;
            Ok(apply_function(function, &callee, arguments)?)
        }
        Expression::Assign {
            target,
            value,
            kind,
        } => eval_assign(target, value, *kind, environment),
        Expression::Block(block) => eval_block(block, environment),
        Expression::Yif {
            condition,
            consequence,
            alternative,
        } => {
            let condition = eval_expression(condition, environment)?;
            if condition.is_truthy() {
                eval_block(consequence, environment)
            } else if let Some(alternative) = alternative {
                eval_block(alternative, environment)
            } else {
                Ok(Object::null())
            }
        }
        Expression::Yoyo { condition, body } => {
            let scope = Environment::new_enclosed(environment.clone());
            let mut result = Object::null();
            while eval_expression(condition, &scope)?.is_truthy() {
                result = eval_block(body, &scope)?;
            }
            Ok(result)
        }
        Expression::Yall {
            key,
            iterable,
            body,
        } => {
            let iterable = eval_expression(iterable, environment)?;
            let scope = Environment::new_enclosed(environment.clone());
            let mut result = Object::null();
            for item in iteration_items(&iterable)? {
                scope.set(key.name.clone(), item);
                result = eval_block(body, &scope)?;
            }
            Ok(result)
        }
        Expression::Yeet(value) => {
            let value = eval_expression(value, environment)?;
            Err(QuickReturn::Return(value))
        }
        Expression::Yolo(body) => {
            let scope = Environment::new_enclosed(environment.clone());
            scope.mark_yolo();
            eval_block(body, &scope)
        }
        Expression::Lambda { parameters, body } => Ok(Object::function(
            parameters.as_slice().into(),
            Rc::new(body.clone()),
            environment.clone(),
        )),
        Expression::Macro { parameters, body } => Ok(Object::macro_(
            parameters.as_slice().into(),
            Rc::new(body.clone()),
            environment.clone(),
        )),
        Expression::Bad(_) => Err(EvaluationError::BadExpression.into()),
    }
}

fn eval_expressions(
    expressions: &[Expression],
    environment: &Environment,
) -> Result<Vec<Gc<Object>>, QuickReturn> {
    let mut result = Vec::with_capacity(expressions.len());
    for expression in expressions {
        result.push(eval_expression(expression, environment)?);
    }
    Ok(result)
}

/// Environment bindings first, then the builtin table.
fn eval_identifier(
    identifier: &ast::Identifier,
    environment: &Environment,
) -> Result<Gc<Object>, EvaluationError> {
    if let Some(value) = environment.get(&identifier.name) {
        return Ok(value);
    }
    builtins::lookup(&identifier.name)
        .map(Object::builtin)
        .ok_or_else(|| EvaluationError::UnknownIdentifier(identifier.name.clone()))
}

/// Replaces `$name` with the display form of `name`. `$$` is a literal `$`.
fn interpolate(literal: &str, environment: &Environment) -> Result<String, EvaluationError> {
    if !literal.contains('$') {
        return Ok(literal.to_owned());
    }
    let mut output = String::with_capacity(literal.len());
    let mut chars = literal.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '$' {
            output.push(ch);
            continue;
        }
        match chars.peek() {
            Some('$') => {
                chars.next();
                output.push('$');
            }
            Some(next) if next.is_ascii_alphabetic() || *next == '_' => {
                let mut name = String::new();
                while let Some(ch) = chars.next_if(|ch| ch.is_ascii_alphanumeric() || *ch == '_') {
                    name.push(ch);
                }
                let value = eval_identifier(&ast::Identifier::new(&name), environment)?;
                output.push_str(&value.to_string());
            }
            _ => output.push('$'),
        }
    }
    Ok(output)
}

fn fill_template(template: &str, values: &[Gc<Object>]) -> String {
    let mut values = values.iter();
    let mut output = String::with_capacity(template.len());
    let mut chars = template.chars();
    while let Some(ch) = chars.next() {
        if ch != '%' {
            output.push(ch);
            continue;
        }
        match chars.next() {
            Some('s') => {
                if let Some(value) = values.next() {
                    output.push_str(&value.to_string());
                }
            }
            Some('%') => output.push('%'),
            Some(other) => {
                output.push('%');
                output.push(other);
            }
            None => output.push('%'),
        }
    }
    output
}

fn apply_function(
    callee: &Expression,
    function: &Gc<Object>,
    arguments: Vec<Gc<Object>>,
) -> Result<Gc<Object>, EvaluationError> {
    match function.as_ref() {
        Object::Function(function) => {
            if function.parameters.len() != arguments.len() {
                return Err(EvaluationError::WrongArgumentCount {
                    name: callee.to_string().into(),
                    got: arguments.len(),
                    want: function.parameters.len().to_string().into(),
                });
            }
            let scope = Environment::new_enclosed(function.env.clone());
            for (parameter, argument) in function.parameters.iter().zip(arguments) {
                scope.set(parameter.name.clone(), argument);
            }
            match eval_block(&function.body, &scope) {
                Ok(value) | Err(QuickReturn::Return(value)) => Ok(value),
                Err(QuickReturn::Error(error)) => Err(error),
            }
        }
        Object::Builtin(builtin) => (builtin.func)(arguments),
        other => Err(EvaluationError::NotAFunction(other.kind())),
    }
}

fn eval_assign(
    target: &Expression,
    value: &Expression,
    kind: AssignKind,
    environment: &Environment,
) -> Result<Gc<Object>, QuickReturn> {
    match (kind, target) {
        (AssignKind::Declare, Expression::Identifier(identifier)) => {
            let value = eval_expression(value, environment)?;
            environment.set(identifier.name.clone(), value.clone());
            Ok(value)
        }
        (AssignKind::Assign, Expression::Identifier(identifier)) => {
            let value = eval_expression(value, environment)?;
            if environment.update(&identifier.name, value.clone()) {
                return Ok(value);
            }
            if environment.is_yolo() {
                environment.set(identifier.name.clone(), value.clone());
                return Ok(value);
            }
            Err(EvaluationError::UndeclaredAssignment(identifier.name.clone()).into())
        }
        (AssignKind::Assign, Expression::IndexExpression { left, index }) => {
            let container = eval_expression(left, environment)?;
            let index = eval_expression(index, environment)?;
            let value = eval_expression(value, environment)?;
            Ok(assign_index(&container, &index, value, left)?)
        }
        _ => Err(EvaluationError::InvalidAssignmentTarget(target.to_string().into()).into()),
    }
}

fn assign_index(
    container: &Gc<Object>,
    index: &Gc<Object>,
    value: Gc<Object>,
    target: &Expression,
) -> Result<Gc<Object>, EvaluationError> {
    let out_of_bounds = |kind| EvaluationError::AssignOutOfBounds {
        kind,
        name: target.to_string().into(),
    };
    match (container.as_ref(), index.as_ref()) {
        (Object::Array(array), Object::Integer(idx)) => {
            let mut array = array.borrow_mut();
            let slot = usize::try_from(*idx)
                .ok()
                .and_then(|idx| array.get_mut(idx))
                .ok_or_else(|| out_of_bounds("array"))?;
            *slot = value.clone();
            Ok(value)
        }
        (Object::String(string), Object::Integer(idx)) => {
            let replacement = value.to_string();
            let mut string = string.borrow_mut();
            let (offset, ch) = usize::try_from(*idx)
                .ok()
                .and_then(|idx| string.char_indices().nth(idx))
                .ok_or_else(|| out_of_bounds("string"))?;
            string.replace_range(offset..offset + ch.len_utf8(), &replacement);
            Ok(value)
        }
        (Object::Hashmap(hashmap), _) => {
            // Unhashable keys leave the map untouched.
            if index.hash_key().is_some() {
                hashmap.borrow_mut().insert(index, value.clone())?;
            }
            Ok(value)
        }
        _ => Err(EvaluationError::IndexNotSupported {
            left: container.kind(),
            index: index.kind(),
        }),
    }
}

/// Clamps `start..end` to `0..len`; an inverted range is empty.
fn clamp_slice(start: i64, end: i64, len: usize) -> (usize, usize) {
    let clamp = |value: i64| value.clamp(0, len as i64) as usize;
    let (start, end) = (clamp(start), clamp(end));
    (start, end.max(start))
}

fn eval_index(left: &Gc<Object>, index: &Gc<Object>) -> Result<Gc<Object>, EvaluationError> {
    match (left.as_ref(), index.as_ref()) {
        (Object::Array(array), Object::Integer(idx)) => Ok(usize::try_from(*idx)
            .ok()
            .and_then(|idx| array.borrow().get(idx).cloned())
            .unwrap_or_else(Object::null)),
        (Object::Array(array), Object::Range { start, end }) => {
            let array = array.borrow();
            let (start, end) = clamp_slice(*start, *end, array.len());
            Ok(Object::array(array[start..end].to_vec()))
        }
        (Object::String(string), Object::Integer(idx)) => Ok(usize::try_from(*idx)
            .ok()
            .and_then(|idx| string.borrow().chars().nth(idx))
            .map(|ch| Object::string(ch.to_string()))
            .unwrap_or_else(Object::null)),
        (Object::String(string), Object::Range { start, end }) => {
            let string = string.borrow();
            let (start, end) = clamp_slice(*start, *end, string.chars().count());
            Ok(Object::string(
                string.chars().skip(start).take(end - start).collect(),
            ))
        }
        (Object::Hashmap(hashmap), _) => Ok(hashmap
            .borrow()
            .get(index)?
            .unwrap_or_else(Object::null)),
        _ => Err(EvaluationError::IndexNotSupported {
            left: left.kind(),
            index: index.kind(),
        }),
    }
}

fn iteration_items(
    iterable: &Gc<Object>,
) -> Result<Box<dyn Iterator<Item = Gc<Object>>>, EvaluationError> {
    fn inclusive(start: i64, end: i64) -> Box<dyn Iterator<Item = Gc<Object>>> {
        if start <= end {
            Box::new((start..=end).map(Object::integer))
        } else {
            Box::new((end..=start).rev().map(Object::integer))
        }
    }

    match iterable.as_ref() {
        Object::Array(array) => Ok(Box::new(array.borrow().clone().into_iter())),
        Object::String(string) => Ok(Box::new(
            string
                .borrow()
                .chars()
                .map(|ch| Object::string(ch.to_string()))
                .collect::<Vec<_>>()
                .into_iter(),
        )),
        Object::Range { start, end } => Ok(inclusive(*start, *end)),
        Object::Integer(n) if *n >= 0 => Ok(inclusive(0, *n)),
        Object::Integer(n) => Ok(inclusive(*n, 0)),
        other => Err(EvaluationError::CannotIterate(other.kind())),
    }
}

pub(crate) fn eval_prefix(
    kind: PrefixOperationKind,
    right: &Gc<Object>,
    yolo: bool,
) -> Result<Gc<Object>, EvaluationError> {
    match (kind, right.as_ref()) {
        (PrefixOperationKind::Bang, _) => Ok(Object::boolean(!right.is_truthy())),
        (PrefixOperationKind::Minus, Object::Integer(value)) => {
            Ok(Object::integer(value.wrapping_neg()))
        }
        (PrefixOperationKind::Minus, Object::Number(value)) => Ok(Object::number(-value)),
        _ if yolo => yolo::prefix(kind, right),
        _ => Err(EvaluationError::UnknownPrefixOperator {
            operator: kind.to_str(),
            right: right.kind(),
        }),
    }
}

pub(crate) fn eval_infix(
    kind: InfixOperationKind,
    left: &Gc<Object>,
    right: &Gc<Object>,
    yolo: bool,
) -> Result<Gc<Object>, EvaluationError> {
    if let Some(result) = typed_infix(kind, left, right)? {
        return Ok(result);
    }
    match kind {
        InfixOperationKind::Equal => return Ok(Object::boolean(left == right)),
        InfixOperationKind::NotEqual => return Ok(Object::boolean(left != right)),
        _ => {}
    }
    if yolo {
        return yolo::infix(kind, left, right);
    }
    if left.kind() != right.kind() {
        Err(EvaluationError::TypeMismatch {
            left: left.kind(),
            operator: kind.to_str(),
            right: right.kind(),
        })
    } else {
        Err(EvaluationError::UnknownInfixOperator {
            left: left.kind(),
            operator: kind.to_str(),
            right: right.kind(),
        })
    }
}

fn as_number(object: &Object) -> Option<f64> {
    match object {
        Object::Integer(value) => Some(*value as f64),
        Object::Number(value) => Some(*value),
        _ => None,
    }
}

/// Operators with a meaning for the operand types regardless of yolo.
fn typed_infix(
    kind: InfixOperationKind,
    left: &Gc<Object>,
    right: &Gc<Object>,
) -> Result<Option<Gc<Object>>, EvaluationError> {
    let result = match (left.as_ref(), right.as_ref()) {
        (Object::Integer(left), Object::Integer(right)) => integer_infix(kind, *left, *right)?,
        (Object::String(left), Object::String(right)) if kind == InfixOperationKind::Plus => {
            Some(Object::string(format!("{}{}", left.borrow(), right.borrow())))
        }
        (Object::Array(array), _) if kind == InfixOperationKind::Push => {
            let mut array = array.borrow().clone();
            array.push(right.clone());
            Some(Object::array(array))
        }
        (Object::Array(left), Object::Array(right)) if kind == InfixOperationKind::Plus => {
            let mut array = left.borrow().clone();
            array.extend(right.borrow().iter().cloned());
            Some(Object::array(array))
        }
        (left, right) => match (as_number(left), as_number(right)) {
            (Some(left), Some(right)) => number_infix(kind, left, right),
            _ => None,
        },
    };
    Ok(result)
}

fn integer_infix(
    kind: InfixOperationKind,
    left: i64,
    right: i64,
) -> Result<Option<Gc<Object>>, EvaluationError> {
    use InfixOperationKind as Op;
    let result = match kind {
        Op::Plus => Object::integer(left.wrapping_add(right)),
        Op::Minus => Object::integer(left.wrapping_sub(right)),
        Op::Multiply => Object::integer(left.wrapping_mul(right)),
        Op::Divide | Op::Modulo if right == 0 => return Err(EvaluationError::DivisionByZero),
        Op::Divide => Object::integer(left.wrapping_div(right)),
        Op::Modulo => Object::integer(left.wrapping_rem(right)),
        Op::LessThan => Object::boolean(left < right),
        Op::LessEqual => Object::boolean(left <= right),
        Op::GreaterThan => Object::boolean(left > right),
        Op::GreaterEqual => Object::boolean(left >= right),
        Op::Equal => Object::boolean(left == right),
        Op::NotEqual => Object::boolean(left != right),
        Op::Push => return Ok(None),
    };
    Ok(Some(result))
}

fn number_infix(kind: InfixOperationKind, left: f64, right: f64) -> Option<Gc<Object>> {
    use InfixOperationKind as Op;
    Some(match kind {
        Op::Plus => Object::number(left + right),
        Op::Minus => Object::number(left - right),
        Op::Multiply => Object::number(left * right),
        Op::Divide => Object::number(left / right),
        Op::Modulo => Object::number(left % right),
        Op::LessThan => Object::boolean(left < right),
        Op::LessEqual => Object::boolean(left <= right),
        Op::GreaterThan => Object::boolean(left > right),
        Op::GreaterEqual => Object::boolean(left >= right),
        Op::Equal => Object::boolean(left == right),
        Op::NotEqual => Object::boolean(left != right),
        Op::Push => return None,
    })
}

#[cfg(test)]
mod tests {
    use gc::Gc;
    use yy_core::parser::Parser;

    use crate::environment::Environment;
    use crate::object::{EvaluationError, Hashmap, Object, ObjectKind};

    fn run(input: &str) -> Result<Gc<Object>, EvaluationError> {
        let program = Parser::new(input).parse_program().unwrap();
        super::eval_program(&program, &Environment::new())
    }

    fn test_evaluation(inputs: Vec<(&str, Result<Gc<Object>, EvaluationError>)>) {
        for (input, output) in inputs {
            assert_eq!(run(input), output, "input: {}", input);
        }
    }

    fn test_errors(inputs: Vec<(&str, &str)>) {
        for (input, message) in inputs {
            match run(input) {
                Err(error) => assert_eq!(error.to_string(), message, "input: {}", input),
                Ok(value) => panic!("expected error for {}, got {}", input, value),
            }
        }
    }

    fn int_array(values: &[i64]) -> Gc<Object> {
        Object::array(values.iter().copied().map(Object::integer).collect())
    }

    fn string(value: &str) -> Gc<Object> {
        Object::string(value.to_owned())
    }

    #[test]
    fn test_literal() {
        let inputs = vec![
            ("5;", Ok(Object::integer(5))),
            ("2.5", Ok(Object::number(2.5))),
            ("true;", Ok(Object::boolean(true))),
            ("false;", Ok(Object::boolean(false))),
            ("\"hello\";", Ok(string("hello"))),
            ("null;", Ok(Object::null())),
            ("0..3", Ok(Object::range(0, 3))),
            ("", Ok(Object::null())),
        ];

        test_evaluation(inputs);
    }

    #[test]
    fn test_integer_arithmetic() {
        let inputs = vec![
            ("-5", Ok(Object::integer(-5))),
            ("--5", Ok(Object::integer(5))),
            ("5 + 5 + 5 + 5 - 10", Ok(Object::integer(10))),
            ("2 * 2 * 2 * 2 * 2", Ok(Object::integer(32))),
            ("-50 + 100 + -50", Ok(Object::integer(0))),
            ("20 + 2 * -10", Ok(Object::integer(0))),
            ("50 / 2 * 2 + 10", Ok(Object::integer(60))),
            ("(5 + 10 * 2 + 15 / 3) * 2 + -10", Ok(Object::integer(50))),
            ("7 / 2", Ok(Object::integer(3))),
            ("-7 / 2", Ok(Object::integer(-3))),
            ("7 % 3", Ok(Object::integer(1))),
            ("-7 % 3", Ok(Object::integer(-1))),
            ("7 % -3", Ok(Object::integer(1))),
        ];

        test_evaluation(inputs);
    }

    #[test]
    fn test_number_promotion() {
        let inputs = vec![
            ("1 + 0.5", Ok(Object::number(1.5))),
            ("0.5 * 4", Ok(Object::number(2.0))),
            ("5 / 2.0", Ok(Object::number(2.5))),
            ("1 == 1.0", Ok(Object::boolean(true))),
            ("1 < 1.5", Ok(Object::boolean(true))),
            ("-2.5", Ok(Object::number(-2.5))),
        ];

        test_evaluation(inputs);
    }

    #[test]
    fn test_boolean_expressions() {
        let inputs = vec![
            ("1 < 2", Ok(Object::boolean(true))),
            ("1 > 2", Ok(Object::boolean(false))),
            ("1 <= 1", Ok(Object::boolean(true))),
            ("1 >= 2", Ok(Object::boolean(false))),
            ("1 != 2", Ok(Object::boolean(true))),
            ("true == false", Ok(Object::boolean(false))),
            ("(1 < 2) == true", Ok(Object::boolean(true))),
            ("null == null", Ok(Object::boolean(true))),
            ("\"a\" == \"a\"", Ok(Object::boolean(true))),
            ("\"a\" != \"b\"", Ok(Object::boolean(true))),
            ("1 == \"1\"", Ok(Object::boolean(false))),
            ("1 != null", Ok(Object::boolean(true))),
            ("[1, [2]] == [1, [2]]", Ok(Object::boolean(true))),
            ("%{\"a\": 1, 2: true} == %{2: true, \"a\": 1}", Ok(Object::boolean(true))),
        ];

        test_evaluation(inputs);
    }

    #[test]
    fn test_bang_operator() {
        let inputs = vec![
            ("!true", Ok(Object::boolean(false))),
            ("!5", Ok(Object::boolean(false))),
            ("!0", Ok(Object::boolean(false))),
            ("!null", Ok(Object::boolean(true))),
            ("!\"\"", Ok(Object::boolean(true))),
            ("![]", Ok(Object::boolean(true))),
            ("!%{}", Ok(Object::boolean(true))),
            ("!!5", Ok(Object::boolean(true))),
        ];

        test_evaluation(inputs);
    }

    #[test]
    fn test_and_or() {
        let inputs = vec![
            ("false && 1", Ok(Object::boolean(false))),
            ("true && 1", Ok(Object::integer(1))),
            ("false || 1", Ok(Object::integer(1))),
            ("true || 1", Ok(Object::boolean(true))),
            ("null || \"\" || 3", Ok(Object::integer(3))),
            ("x := 0; false && (x = 1); x", Ok(Object::integer(0))),
            ("x := 0; true || (x = 1); x", Ok(Object::integer(0))),
            ("x := 0; true && (x = 1); x", Ok(Object::integer(1))),
        ];

        test_evaluation(inputs);
    }

    #[test]
    fn test_strings() {
        let inputs = vec![
            ("\"con\" + \"cat\" + \"enation\"", Ok(string("concatenation"))),
            ("age := 69; \"i'm $age yr old\"", Ok(string("i'm 69 yr old"))),
            ("a := [1]; \"$a!\"", Ok(string("[1]!"))),
            ("a := 1; \"$$a\"", Ok(string("$a"))),
            ("a := 1; \"$$$a\"", Ok(string("$1"))),
            ("\"$$$$\"", Ok(string("$$"))),
            ("\"cost: 5$\"", Ok(string("cost: 5$"))),
            ("`i'm { 8 + 2 * 3 } yr old`", Ok(string("i'm 14 yr old"))),
            ("s := \"x\"; `{s}{{}}{ [s] }`", Ok(string("x{}[\"x\"]"))),
            ("`100%`", Ok(string("100%"))),
            ("`a{`b`}c`", Ok(string("abc"))),
            ("x := 2; `x{ `y{x + 1}` }w`", Ok(string("xy3w"))),
            ("n := 1; `<{ `({ `[{n}%]` })` }>`", Ok(string("<([1%])>"))),
        ];

        test_evaluation(inputs);
    }

    #[test]
    fn test_assignment() {
        let inputs = vec![
            ("a := 5; a;", Ok(Object::integer(5))),
            ("a := 5 * 5; a;", Ok(Object::integer(25))),
            ("a := 5; b := a; c := a + b + 5; c;", Ok(Object::integer(15))),
            ("a := 5; a = 6; a", Ok(Object::integer(6))),
            ("a := 5; a += 2; a", Ok(Object::integer(7))),
            ("a := 5; a -= 2; a *= 3; a /= 2; a %= 4", Ok(Object::integer(0))),
            ("a := 1; f := \\ { a = 2 }; f(); a", Ok(Object::integer(2))),
            ("a := 1; f := \\ { a := 2 }; f(); a", Ok(Object::integer(1))),
        ];

        test_evaluation(inputs);
    }

    #[test]
    fn test_arrays_and_indexing() {
        let inputs = vec![
            ("[1, 2 * 2, 3 + 3]", Ok(int_array(&[1, 4, 6]))),
            ("[1, 2, 3][0]", Ok(Object::integer(1))),
            ("i := 0; [1][i]", Ok(Object::integer(1))),
            ("[1, 2, 3][3]", Ok(Object::null())),
            ("[1, 2, 3][-1]", Ok(Object::null())),
            ("a := [1, 2, 3]; a[0..len(a)]", Ok(int_array(&[1, 2, 3]))),
            ("a := [1, 2, 3]; a[1..10]", Ok(int_array(&[2, 3]))),
            ("a := [1, 2, 3]; a[-5..1]", Ok(int_array(&[1]))),
            ("a := [1, 2, 3]; a[2..1]", Ok(int_array(&[]))),
            ("\"hello\"[1]", Ok(string("e"))),
            ("\"hello\"[9]", Ok(Object::null())),
            ("\"hello\"[1..3]", Ok(string("el"))),
            ("[1] + [2, 3]", Ok(int_array(&[1, 2, 3]))),
            ("[1] << 2", Ok(int_array(&[1, 2]))),
            ("a := [1]; b := a << 2; a", Ok(int_array(&[1, 2]))),
            ("a := [1]; b := [a][0] << 2; a", Ok(int_array(&[1]))),
        ];

        test_evaluation(inputs);
    }

    #[test]
    fn test_reference_semantics() {
        let inputs = vec![
            ("a := [1, 2]; b := a; b[0] = 9; a", Ok(int_array(&[9, 2]))),
            ("a := [1, 2]; b := a[0..2]; b[0] = 9; a", Ok(int_array(&[1, 2]))),
            ("s := \"cat\"; t := s; t[0] = \"b\"; s", Ok(string("bat"))),
            ("h := %{}; g := h; g[\"k\"] = 1; h[\"k\"]", Ok(Object::integer(1))),
            ("a := [1, 2]; a[1] += 5; a", Ok(int_array(&[1, 7]))),
        ];

        test_evaluation(inputs);
    }

    #[test]
    fn test_hashmaps() {
        let mut expected = Hashmap::new();
        expected.insert(&string("one"), Object::integer(1)).unwrap();
        expected.insert(&Object::integer(4), Object::integer(4)).unwrap();
        expected
            .insert(&Object::boolean(true), Object::integer(5))
            .unwrap();

        let inputs = vec![
            (
                "two := \"two\"; %{\"one\": 10 - 9, 4: 4, true: 5}",
                Ok(Object::hashmap(expected)),
            ),
            ("%{\"foo\": 5}[\"foo\"]", Ok(Object::integer(5))),
            ("%{\"foo\": 5}[\"bar\"]", Ok(Object::null())),
            ("key := \"foo\"; %{\"foo\": 5}[key]", Ok(Object::integer(5))),
            ("%{5: 5}[5]", Ok(Object::integer(5))),
            ("%{false: 5}[false]", Ok(Object::integer(5))),
            ("h := %{}; h[[1]] = 3", Ok(Object::integer(3))),
            ("h := %{}; h[[1]] = 3; len(h)", Ok(Object::integer(0))),
            ("h := %{1: 1}; h[1] = 2; h[1]", Ok(Object::integer(2))),
        ];

        test_evaluation(inputs);
    }

    #[test]
    fn test_yif() {
        let inputs = vec![
            ("yif true { 10 }", Ok(Object::integer(10))),
            ("yif false { 10 }", Ok(Object::null())),
            ("yif 1 { 10 }", Ok(Object::integer(10))),
            ("yif 0 { 10 }", Ok(Object::integer(10))),
            ("yif \"\" { 10 } yels { 20 }", Ok(Object::integer(20))),
            ("yif 1 > 2 { 10 } yels { 20 }", Ok(Object::integer(20))),
            (
                "x := 2; yif x == 1 { 10 } yels yif x == 2 { 20 } yels { 30 }",
                Ok(Object::integer(20)),
            ),
            ("{ 1; 2; 3 }", Ok(Object::integer(3))),
            ("{ }", Ok(Object::null())),
        ];

        test_evaluation(inputs);
    }

    #[test]
    fn test_loops() {
        let inputs = vec![
            ("i := 0; yoyo i < 5 { i += 1 }", Ok(Object::integer(5))),
            ("i := 10; yoyo i < 5 { i += 1 }", Ok(Object::null())),
            ("s := 0; yall [1, 2, 3] { s += yt }; s", Ok(Object::integer(6))),
            ("yall [1, 2, 3] { yt }", Ok(Object::integer(3))),
            ("s := \"\"; yall \"abc\" { s = yt + s }; s", Ok(string("cba"))),
            ("s := []; yall 3..1 { s << yt }; s", Ok(int_array(&[3, 2, 1]))),
            ("s := []; yall 0..2 { s << yt }; s", Ok(int_array(&[0, 1, 2]))),
            ("s := []; yall 2 { s << yt }; s", Ok(int_array(&[0, 1, 2]))),
            ("s := []; yall -2 { s << yt }; s", Ok(int_array(&[-2, -1, 0]))),
            ("s := 0; yall i: [1, 2] { s += i }; s", Ok(Object::integer(3))),
            ("f := \\ { yoyo { yeet 7 } }; f()", Ok(Object::integer(7))),
            (
                "f := \\ { yall [1, 2, 3] { yif yt == 2 { yeet yt } }; 0 }; f()",
                Ok(Object::integer(2)),
            ),
        ];

        test_evaluation(inputs);

        test_errors(vec![
            ("yall i: [1] { yt }", "identifier not found: yt"),
            ("yall %{} { yt }", "cannot iterate over HASHMAP"),
        ]);
    }

    #[test]
    fn test_yeet() {
        let inputs = vec![
            ("yeet 10;", Ok(Object::integer(10))),
            ("yeet 10; 9;", Ok(Object::integer(10))),
            ("9; yeet 2 * 5; 9;", Ok(Object::integer(10))),
            (
                "yif 10 > 1 { yif 10 > 1 { yeet 10; } yeet 1; }",
                Ok(Object::integer(10)),
            ),
            ("f := \\ { yeet; 1 }; f()", Ok(Object::null())),
            ("f := \\ { yeet 1; 2 }; f() + 1", Ok(Object::integer(2))),
        ];

        test_evaluation(inputs);
    }

    #[test]
    fn test_function_application() {
        let inputs = vec![
            ("identity := \\x { x }; identity(5)", Ok(Object::integer(5))),
            ("identity := \\x { yeet x }; identity(5)", Ok(Object::integer(5))),
            ("add := \\x, y { x + y }; add(5 + 5, add(5, 5))", Ok(Object::integer(20))),
            ("add := \\(x y) { x + y }; add(1, 2)", Ok(Object::integer(3))),
            ("\\x { x }(5)", Ok(Object::integer(5))),
            (
                "factorial := \\n { yif n < 2 { 1 } yels { factorial(n - 1) * n } }; factorial(5)",
                Ok(Object::integer(120)),
            ),
            (
                "newAdder := \\x { \\y { x + y } }; newAdder(2)(3)",
                Ok(Object::integer(5)),
            ),
            (
                "counter := \\ { n := 0; \\ { n += 1 } }; c := counter(); c(); c(); c()",
                Ok(Object::integer(3)),
            ),
        ];

        test_evaluation(inputs);
    }

    #[test]
    fn test_deep_recursion() {
        let inputs = vec![
            (
                "f := \\n { yif n == 0 { 0 } yels { f(n - 1) } }; f(500)",
                Ok(Object::integer(0)),
            ),
            (
                "sum := \\n { yif n == 0 { 0 } yels { n + sum(n - 1) } }; sum(20000)",
                Ok(Object::integer(200010000)),
            ),
        ];

        test_evaluation(inputs);
    }

    #[test]
    fn test_closure_uses_definition_scope() {
        let inputs = vec![(
            "x := 1; f := \\ { x }; g := \\ { x := 2; f() }; g()",
            Ok(Object::integer(1)),
        )];

        test_evaluation(inputs);
    }

    #[test]
    fn test_error_handling() {
        test_errors(vec![
            ("5 + true;", "type mismatch: INTEGER + BOOLEAN"),
            ("5 + true; 5;", "type mismatch: INTEGER + BOOLEAN"),
            ("2 + \"troll\"", "type mismatch: INTEGER + STRING"),
            ("-true", "unknown operator: -BOOLEAN"),
            ("true + false;", "unknown operator: BOOLEAN + BOOLEAN"),
            ("\"a\" - \"b\"", "unknown operator: STRING - STRING"),
            ("yif 10 > 1 { true + false; }", "unknown operator: BOOLEAN + BOOLEAN"),
            (
                "yif 10 > 1 { yif 10 > 1 { yeet true + false; } yeet 1; }",
                "unknown operator: BOOLEAN + BOOLEAN",
            ),
            ("foobar", "identifier not found: foobar"),
            ("\"hi $nobody\"", "identifier not found: nobody"),
            (
                "x = 8",
                "identifier not found: x (to declare a variable use := operator)",
            ),
            ("%{[1]: 2}", "key not hashable: ARRAY"),
            ("%{}[\\ { }]", "key not hashable: FUNCTION"),
            ("5[0]", "index operator not supported: INTEGER[INTEGER]"),
            ("[1][\"a\"]", "index operator not supported: ARRAY[STRING]"),
            ("1 / 0", "division by zero"),
            ("1 % 0", "division by zero"),
            ("5()", "not a function: INTEGER"),
            ("f := \\x { x }; f(1, 2)", "wrong number of args for f (got 2, want 1)"),
            ("1..\"a\"", "range endpoints must be integers, got INTEGER..STRING"),
            ("a := [1]; a[3] = 1", "attempted to assign out of bounds for array 'a'"),
            ("s := \"ab\"; s[2] = \"c\"", "attempted to assign out of bounds for string 's'"),
        ]);
    }

    #[test]
    fn test_builtin_fallback_and_shadowing() {
        let inputs = vec![
            ("len(\"four\")", Ok(Object::integer(4))),
            ("len := \\x { 0 }; len(\"four\")", Ok(Object::integer(0))),
            ("f := len; f([1, 2])", Ok(Object::integer(2))),
        ];

        test_evaluation(inputs);
    }

    #[test]
    fn test_display_of_values() {
        let inputs = vec![
            ("\\x, y { x + y }", "\\x, y { (x + y) }"),
            ("[1, \"a\", [null]]", "[1, \"a\", [null]]"),
            ("%{\"a\": 1}", "%{\"a\": 1}"),
            ("len", "builtin len"),
        ];

        for (input, expected) in inputs {
            assert_eq!(run(input).unwrap().to_string(), expected);
        }
    }

    #[test]
    fn test_kind_of_values() {
        assert_eq!(run("\\ { }").unwrap().kind(), ObjectKind::Function);
        assert_eq!(run("@\\ { }").unwrap().kind(), ObjectKind::Macro);
        assert_eq!(run("quote(1 + 2)").unwrap().kind(), ObjectKind::Quote);
    }
}
