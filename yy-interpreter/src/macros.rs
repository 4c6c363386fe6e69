use std::rc::Rc;

use gc::Gc;
use yy_core::ast::{self, AssignKind, Expression, Program};

use crate::environment::Environment;
use crate::evaluator::{eval_block, eval_expression};
use crate::object::{EvaluationError, Function, Object, QuickReturn};

/// Moves every top-level `name := @\...` out of `program` and binds it in
/// `environment` as a macro.
pub fn define_macros(program: &mut Program, environment: &Environment) {
    program.expressions.retain(|expression| {
        let Expression::Assign {
            target,
            value,
            kind: AssignKind::Declare,
        } = expression
        else {
            return true;
        };
        match (target.as_ref(), value.as_ref()) {
            (Expression::Identifier(name), Expression::Macro { parameters, body }) => {
                log::debug!("defining macro {}", name.name);
                environment.set(
                    name.name.clone(),
                    Object::macro_(
                        parameters.as_slice().into(),
                        Rc::new(body.clone()),
                        environment.clone(),
                    ),
                );
                false
            }
            _ => true,
        }
    });
}

/// Replaces every call to a macro bound in `environment` with the AST the
/// macro returns.
pub fn expand_macros(program: Program, environment: &Environment) -> Result<Program, EvaluationError> {
    ast::try_modify_program(program, &mut |expression| {
        expand_macro_call(expression, environment)
    })
}

fn macro_definition(expression: &Expression, environment: &Environment) -> Option<(Rc<str>, Function)> {
    let Expression::CallExpression { function, .. } = expression else {
        return None;
    };
    let Expression::Identifier(identifier) = function.as_ref() else {
        return None;
    };
    match environment.get(&identifier.name)?.as_ref() {
        Object::Macro(definition) => Some((identifier.name.clone(), definition.clone())),
        _ => None,
    }
}

fn expand_macro_call(
    expression: Expression,
    environment: &Environment,
) -> Result<Expression, EvaluationError> {
    let Some((name, definition)) = macro_definition(&expression, environment) else {
        return Ok(expression);
    };
    let arguments = match expression {
        Expression::CallExpression { arguments, .. } => arguments,
        other => return Ok(other),
    };
    if definition.parameters.len() != arguments.len() {
        return Err(EvaluationError::WrongArgumentCount {
            name,
            got: arguments.len(),
            want: definition.parameters.len().to_string().into(),
        });
    }

    log::trace!("expanding macro {}", name);
    let scope = Environment::new_enclosed(definition.env.clone());
    for (parameter, argument) in definition.parameters.iter().zip(arguments) {
        scope.set(parameter.name.clone(), Object::quote(argument));
    }
    let evaluated = match eval_block(&definition.body, &scope) {
        Ok(value) | Err(QuickReturn::Return(value)) => value,
        Err(QuickReturn::Error(error)) => return Err(error),
    };
    match evaluated.as_ref() {
        Object::Quote(quote) => Ok(quote.node.as_ref().clone()),
        other => Err(EvaluationError::MacroNotQuote(other.kind())),
    }
}

/// The `quote(expr)` special form. `unquote(e)` calls inside `expr` are
/// evaluated and spliced back in as AST.
pub(crate) fn quote(
    arguments: &[Expression],
    environment: &Environment,
) -> Result<Gc<Object>, QuickReturn> {
    let [node] = arguments else {
        return Err(EvaluationError::WrongArgumentCount {
            name: "quote".into(),
            got: arguments.len(),
            want: "1".into(),
        }
        .into());
    };
    let node = ast::try_modify(node.clone(), &mut |expression| {
        eval_unquote_call(expression, environment)
    })?;
    Ok(Object::quote(node))
}

fn eval_unquote_call(
    expression: Expression,
    environment: &Environment,
) -> Result<Expression, QuickReturn> {
    match expression {
        Expression::CallExpression {
            function,
            arguments,
        } if matches!(function.as_ref(), Expression::Identifier(identifier) if identifier.name.as_ref() == "unquote")
            && arguments.len() == 1 =>
        {
            let value = eval_expression(&arguments[0], environment)?;
            object_to_expression(&value)
                .ok_or_else(|| EvaluationError::CannotUnquote(value.kind()).into())
        }
        other => Ok(other),
    }
}

/// AST literal that evaluates back to `object`, if there is one.
pub(crate) fn object_to_expression(object: &Object) -> Option<Expression> {
    let expression = match object {
        Object::Integer(value) => Expression::IntegerLiteral(*value),
        Object::Number(value) => Expression::NumberLiteral(*value),
        Object::Boolean(value) => Expression::BooleanLiteral(*value),
        Object::Null => Expression::NullLiteral,
        // `$` is doubled so the literal does not interpolate again.
        Object::String(value) => Expression::StringLiteral(value.borrow().replace('$', "$$")),
        Object::Array(array) => Expression::ArrayLiteral(
            array
                .borrow()
                .iter()
                .map(|element| object_to_expression(element))
                .collect::<Option<Vec<_>>>()?,
        ),
        Object::Hashmap(hashmap) => Expression::HashLiteral(
            hashmap
                .borrow()
                .iter()
                .map(|pair| Some((object_to_expression(&pair.key)?, object_to_expression(&pair.value)?)))
                .collect::<Option<Vec<_>>>()?,
        ),
        Object::Range { start, end } => Expression::Range {
            start: Box::new(Expression::IntegerLiteral(*start)),
            end: Box::new(Expression::IntegerLiteral(*end)),
        },
        Object::Quote(quote) => quote.node.as_ref().clone(),
        Object::Function(_) | Object::Macro(_) | Object::Builtin(_) => return None,
    };
    Some(expression)
}

#[cfg(test)]
mod tests {
    use yy_core::ast::Program;
    use yy_core::parser::Parser;

    use super::{define_macros, expand_macros};
    use crate::environment::Environment;
    use crate::evaluator::eval_program;
    use crate::object::{EvaluationError, Object};

    fn parse(input: &str) -> Program {
        Parser::new(input).parse_program().unwrap()
    }

    #[test]
    fn test_define_macros() {
        let input = "
            number := 1
            mymacro := @\\x, y { x + y }
            function := \\x, y { x + y }
            mymacro2 := @\\x, y { x + y }
        ";
        let environment = Environment::new();
        let mut program = parse(input);

        define_macros(&mut program, &environment);

        assert_eq!(program.expressions.len(), 2);
        assert_eq!(environment.get("number"), None);
        assert_eq!(environment.get("function"), None);
        assert!(environment.get("mymacro2").is_some());
        match environment.get("mymacro").as_deref() {
            Some(Object::Macro(definition)) => {
                let names = definition
                    .parameters
                    .iter()
                    .map(|parameter| parameter.name.as_ref())
                    .collect::<Vec<_>>();
                assert_eq!(names, vec!["x", "y"]);
                assert_eq!(definition.body.to_string(), "{ (x + y) }");
            }
            other => panic!("expected a macro, got {:?}", other),
        }
    }

    #[test]
    fn test_expand_macros() {
        let inputs = vec![
            (
                "infixExpression := @\\ { quote(1 + 2) }
                infixExpression()",
                "(1 + 2)",
            ),
            (
                "reverse := @\\a, b { quote(unquote(b) - unquote(a)) }
                reverse(2 + 2, 10 - 5)",
                "(10 - 5) - (2 + 2)",
            ),
            (
                "unless := @\\condition, consequence, alternative {
                    quote(yif (!(unquote(condition))) {
                        unquote(consequence)
                    } yels {
                        unquote(alternative)
                    })
                }
                unless(69 > 7, yap(\"no\"), yap(\"yes\"))",
                "yif (!(69 > 7)) { yap(\"no\") } yels { yap(\"yes\") }",
            ),
            (
                "twice := @\\e { quote([unquote(e), unquote(e)]) }
                x := twice(1 + 1)",
                "x := [1 + 1, 1 + 1]",
            ),
        ];

        for (input, expected) in inputs {
            let environment = Environment::new();
            let mut program = parse(input);
            define_macros(&mut program, &environment);
            let expanded = expand_macros(program, &environment).unwrap();

            assert_eq!(expanded, parse(expected), "input: {}", input);
        }
    }

    #[test]
    fn test_expand_errors() {
        let inputs = vec![
            (
                "m := @\\ { 1 }; m()",
                "only quoted objects can be returned from macros, got INTEGER",
            ),
            (
                "m := @\\x { quote(x) }; m()",
                "wrong number of args for m (got 0, want 1)",
            ),
        ];

        for (input, message) in inputs {
            let environment = Environment::new();
            let mut program = parse(input);
            define_macros(&mut program, &environment);
            let error = expand_macros(program, &environment).unwrap_err();
            assert_eq!(error.to_string(), message);
        }
    }

    #[test]
    fn test_quote_unquote() {
        let inputs = vec![
            ("quote(5)", "5"),
            ("quote(5 + 8)", "(5 + 8)"),
            ("quote(foobar)", "foobar"),
            ("quote(foobar + barfoo)", "(foobar + barfoo)"),
            ("quote(unquote(4))", "4"),
            ("quote(unquote(4 + 4))", "8"),
            ("quote(8 + unquote(4 + 4))", "(8 + 8)"),
            ("quote(unquote(4 + 4) + 8)", "(8 + 8)"),
            ("foobar := 8; quote(foobar)", "foobar"),
            ("foobar := 8; quote(unquote(foobar))", "8"),
            ("quote(unquote(true))", "true"),
            ("quote(unquote(true == false))", "false"),
            ("quote(unquote(quote(4 + 4)))", "(4 + 4)"),
            (
                "quotedInfixExpression := quote(4 + 4);
                quote(unquote(4 + 4) + unquote(quotedInfixExpression))",
                "(8 + (4 + 4))",
            ),
            ("quote(unquote([1, null]))", "[1, null]"),
            ("quote(unquote(1..2))", "(1..2)"),
            ("s := \"$$x\"; quote(unquote(s))", "\"$$x\""),
        ];

        for (input, expected) in inputs {
            let result = eval_program(&parse(input), &Environment::new()).unwrap();
            match result.as_ref() {
                Object::Quote(quote) => assert_eq!(quote.node.to_string(), expected),
                other => panic!("expected a quote for {}, got {}", input, other),
            }
        }
    }

    #[test]
    fn test_unquote_errors() {
        let inputs = vec![
            (
                "quote(unquote(\\x { x }))",
                EvaluationError::CannotUnquote(crate::object::ObjectKind::Function),
            ),
            (
                "quote(1, 2)",
                EvaluationError::WrongArgumentCount {
                    name: "quote".into(),
                    got: 2,
                    want: "1".into(),
                },
            ),
        ];

        for (input, expected) in inputs {
            assert_eq!(
                eval_program(&parse(input), &Environment::new()),
                Err(expected)
            );
        }
    }
}
