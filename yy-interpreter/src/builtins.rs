use gc::Gc;

use crate::object::{Builtin, EvaluationError, Object};

pub fn lookup(name: &str) -> Option<Builtin> {
    let builtin = match name {
        "len" => Builtin {
            name: "len",
            func: builtin_len,
        },
        "last" => Builtin {
            name: "last",
            func: builtin_last,
        },
        "rest" => Builtin {
            name: "rest",
            func: builtin_rest,
        },
        "push" => Builtin {
            name: "push",
            func: builtin_push,
        },
        "yoink" => Builtin {
            name: "yoink",
            func: builtin_yoink,
        },
        "swap" => Builtin {
            name: "swap",
            func: builtin_swap,
        },
        "yell" => Builtin {
            name: "yell",
            func: builtin_yell,
        },
        "yelp" => Builtin {
            name: "yelp",
            func: builtin_yelp,
        },
        "yap" => Builtin {
            name: "yap",
            func: builtin_yelp,
        },
        "yassert" => Builtin {
            name: "yassert",
            func: builtin_yassert,
        },
        "yarn" => Builtin {
            name: "yarn",
            func: builtin_yarn,
        },
        "chr" => Builtin {
            name: "chr",
            func: builtin_chr,
        },
        "int" => Builtin {
            name: "int",
            func: builtin_int,
        },
        "float" => Builtin {
            name: "float",
            func: builtin_float,
        },
        _ => return None,
    };
    Some(builtin)
}

fn expect_arguments(
    name: &str,
    args: &[Gc<Object>],
    range: std::ops::RangeInclusive<usize>,
) -> Result<(), EvaluationError> {
    if range.contains(&args.len()) {
        return Ok(());
    }
    let want = if range.start() == range.end() {
        range.start().to_string()
    } else {
        format!("{} or {}", range.start(), range.end())
    };
    Err(EvaluationError::WrongArgumentCount {
        name: name.into(),
        got: args.len(),
        want: want.into(),
    })
}

fn unsupported(name: &str, object: &Object) -> EvaluationError {
    EvaluationError::UnsupportedArgument {
        name: name.into(),
        kind: object.kind(),
    }
}

fn builtin_len(args: Vec<Gc<Object>>) -> Result<Gc<Object>, EvaluationError> {
    expect_arguments("len", &args, 1..=1)?;
    let len = match args[0].as_ref() {
        Object::String(string) => string.borrow().len() as i64,
        Object::Array(array) => array.borrow().len() as i64,
        Object::Hashmap(hashmap) => hashmap.borrow().len() as i64,
        Object::Range { start, end } => end
            .abs_diff(*start)
            .checked_add(1)
            .and_then(|len| i64::try_from(len).ok())
            .ok_or_else(|| EvaluationError::LengthOverflow(args[0].to_string().into()))?,
        other => return Err(unsupported("len", other)),
    };
    Ok(Object::integer(len))
}

fn builtin_last(args: Vec<Gc<Object>>) -> Result<Gc<Object>, EvaluationError> {
    expect_arguments("last", &args, 1..=1)?;
    match args[0].as_ref() {
        Object::Array(array) => Ok(array.borrow().last().cloned().unwrap_or_else(Object::null)),
        other => Err(unsupported("last", other)),
    }
}

fn builtin_rest(args: Vec<Gc<Object>>) -> Result<Gc<Object>, EvaluationError> {
    expect_arguments("rest", &args, 1..=1)?;
    match args[0].as_ref() {
        Object::Array(array) => {
            let array = array.borrow();
            match array.split_first() {
                Some((_, rest)) => Ok(Object::array(rest.to_vec())),
                None => Ok(Object::null()),
            }
        }
        other => Err(unsupported("rest", other)),
    }
}

fn builtin_push(args: Vec<Gc<Object>>) -> Result<Gc<Object>, EvaluationError> {
    expect_arguments("push", &args, 2..=2)?;
    match args[0].as_ref() {
        Object::Array(array) => {
            let mut new_array = array.borrow().clone();
            new_array.push(args[1].clone());
            Ok(Object::array(new_array))
        }
        other => Err(unsupported("push", other)),
    }
}

/// Removes the element at the given index (default: last) in place.
fn builtin_yoink(args: Vec<Gc<Object>>) -> Result<Gc<Object>, EvaluationError> {
    expect_arguments("yoink", &args, 1..=2)?;
    let index = match args.get(1).map(|index| index.as_ref()) {
        None => None,
        Some(Object::Integer(index)) => Some(*index),
        Some(other) => return Err(unsupported("yoink", other)),
    };
    let resolve = |len: usize| -> Option<usize> {
        match index {
            None => len.checked_sub(1),
            Some(index) => usize::try_from(index).ok().filter(|index| *index < len),
        }
    };

    match args[0].as_ref() {
        Object::Array(array) => {
            let mut array = array.borrow_mut();
            Ok(match resolve(array.len()) {
                Some(index) => array.remove(index),
                None => Object::null(),
            })
        }
        Object::String(string) => {
            let mut string = string.borrow_mut();
            let offset = resolve(string.chars().count())
                .and_then(|index| string.char_indices().nth(index))
                .map(|(offset, _)| offset);
            Ok(match offset {
                Some(offset) => Object::string(string.remove(offset).to_string()),
                None => Object::null(),
            })
        }
        other => Err(EvaluationError::CannotYoink(other.kind())),
    }
}

/// Swaps two elements in place. Out of range indexes leave the array as is.
fn builtin_swap(args: Vec<Gc<Object>>) -> Result<Gc<Object>, EvaluationError> {
    expect_arguments("swap", &args, 3..=3)?;
    let (Object::Integer(first), Object::Integer(second)) = (args[1].as_ref(), args[2].as_ref())
    else {
        let culprit = if matches!(args[1].as_ref(), Object::Integer(_)) {
            &args[2]
        } else {
            &args[1]
        };
        return Err(unsupported("swap", culprit));
    };
    match args[0].as_ref() {
        Object::Array(array) => {
            let mut array = array.borrow_mut();
            let len = array.len();
            let in_range = |index: i64| usize::try_from(index).ok().filter(|index| *index < len);
            if let (Some(first), Some(second)) = (in_range(*first), in_range(*second)) {
                array.swap(first, second);
            }
        }
        other => return Err(unsupported("swap", other)),
    }
    Ok(args[0].clone())
}

fn joined(args: &[Gc<Object>]) -> String {
    args.iter()
        .map(|arg| arg.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

fn builtin_yell(args: Vec<Gc<Object>>) -> Result<Gc<Object>, EvaluationError> {
    println!("{}", joined(&args).to_uppercase());
    Ok(Object::null())
}

fn builtin_yelp(args: Vec<Gc<Object>>) -> Result<Gc<Object>, EvaluationError> {
    println!("{}", joined(&args));
    Ok(Object::null())
}

fn builtin_yassert(args: Vec<Gc<Object>>) -> Result<Gc<Object>, EvaluationError> {
    expect_arguments("yassert", &args, 1..=2)?;
    if args[0].is_truthy() {
        return Ok(Object::null());
    }
    let message = args.get(1).map(|message| message.to_string().into());
    Err(EvaluationError::YassertFailed(message))
}

fn builtin_yarn(args: Vec<Gc<Object>>) -> Result<Gc<Object>, EvaluationError> {
    expect_arguments("yarn", &args, 1..=1)?;
    Ok(Object::string(args[0].to_string()))
}

fn builtin_chr(args: Vec<Gc<Object>>) -> Result<Gc<Object>, EvaluationError> {
    expect_arguments("chr", &args, 1..=1)?;
    match args[0].as_ref() {
        Object::Integer(code) => u32::try_from(*code)
            .ok()
            .and_then(char::from_u32)
            .map(|ch| Object::string(ch.to_string()))
            .ok_or_else(|| EvaluationError::ConversionFailed {
                value: code.to_string().into(),
                target: "character",
            }),
        other => Err(unsupported("chr", other)),
    }
}

fn builtin_int(args: Vec<Gc<Object>>) -> Result<Gc<Object>, EvaluationError> {
    expect_arguments("int", &args, 1..=1)?;
    let value = match args[0].as_ref() {
        Object::Integer(value) => *value,
        Object::Number(value) => value.trunc() as i64,
        Object::Boolean(value) => i64::from(*value),
        Object::String(string) => {
            let string = string.borrow();
            string
                .trim()
                .parse::<i64>()
                .map_err(|_| EvaluationError::ConversionFailed {
                    value: string.as_str().into(),
                    target: "int",
                })?
        }
        other => return Err(unsupported("int", other)),
    };
    Ok(Object::integer(value))
}

fn builtin_float(args: Vec<Gc<Object>>) -> Result<Gc<Object>, EvaluationError> {
    expect_arguments("float", &args, 1..=1)?;
    let value = match args[0].as_ref() {
        Object::Integer(value) => *value as f64,
        Object::Number(value) => *value,
        Object::Boolean(value) => f64::from(u8::from(*value)),
        Object::String(string) => {
            let string = string.borrow();
            string
                .trim()
                .parse::<f64>()
                .map_err(|_| EvaluationError::ConversionFailed {
                    value: string.as_str().into(),
                    target: "float",
                })?
        }
        other => return Err(unsupported("float", other)),
    };
    Ok(Object::number(value))
}

#[cfg(test)]
mod tests {
    use gc::Gc;
    use yy_core::parser::Parser;

    use crate::environment::Environment;
    use crate::evaluator::eval_program;
    use crate::object::{EvaluationError, Object};

    fn run(input: &str) -> Result<Gc<Object>, EvaluationError> {
        let program = Parser::new(input).parse_program().unwrap();
        eval_program(&program, &Environment::new())
    }

    fn test_evaluation(inputs: Vec<(&str, Result<Gc<Object>, EvaluationError>)>) {
        for (input, output) in inputs {
            assert_eq!(run(input), output, "input: {}", input);
        }
    }

    fn test_errors(inputs: Vec<(&str, &str)>) {
        for (input, message) in inputs {
            let error = run(input).unwrap_err();
            assert_eq!(error.to_string(), message, "input: {}", input);
        }
    }

    fn int_array(values: &[i64]) -> Gc<Object> {
        Object::array(values.iter().copied().map(Object::integer).collect())
    }

    fn string(value: &str) -> Gc<Object> {
        Object::string(value.to_owned())
    }

    #[test]
    fn test_len() {
        test_evaluation(vec![
            ("len(\"\")", Ok(Object::integer(0))),
            ("len(\"four\")", Ok(Object::integer(4))),
            ("len(\"é\")", Ok(Object::integer(2))),
            ("len([1, 2, 3])", Ok(Object::integer(3))),
            ("len(0..3)", Ok(Object::integer(4))),
            ("len(3..0)", Ok(Object::integer(4))),
            ("len(-2..2)", Ok(Object::integer(5))),
            ("len(%{\"a\": 1, \"b\": 2})", Ok(Object::integer(2))),
            ("len(1..9223372036854775807)", Ok(Object::integer(i64::MAX))),
        ]);
        test_errors(vec![
            ("len(1)", "unsupported argument type for len, got INTEGER"),
            (
                "len(0..9223372036854775807)",
                "length of 0..9223372036854775807 does not fit in an integer",
            ),
            (
                "min := 0 - 9223372036854775807 - 1; len(min..9223372036854775807)",
                "length of -9223372036854775808..9223372036854775807 does not fit in an integer",
            ),
            (
                "len(\"one\", \"two\")",
                "wrong number of args for len (got 2, want 1)",
            ),
        ]);
    }

    #[test]
    fn test_array_builtins() {
        test_evaluation(vec![
            ("last([1, 2, 3])", Ok(Object::integer(3))),
            ("last([])", Ok(Object::null())),
            ("rest([1, 2, 3])", Ok(int_array(&[2, 3]))),
            ("rest([1])", Ok(int_array(&[]))),
            ("rest([])", Ok(Object::null())),
            ("a := [1]; b := push(a, 2); a", Ok(int_array(&[1]))),
            ("a := [1]; push(a, 2)", Ok(int_array(&[1, 2]))),
        ]);
        test_errors(vec![
            ("push(1, 2)", "unsupported argument type for push, got INTEGER"),
            ("push([])", "wrong number of args for push (got 1, want 2)"),
        ]);
    }

    #[test]
    fn test_yassert() {
        test_evaluation(vec![
            ("yassert(1 == 1)", Ok(Object::null())),
            ("yassert(true)", Ok(Object::null())),
        ]);
        test_errors(vec![
            ("yassert(1 == 2)", "yassert failed"),
            ("yassert(false)", "yassert failed"),
            ("a := 5; b := 6; yassert(a == b)", "yassert failed"),
            (
                "yassert(1 == 2, \"one isn't two\")",
                "yassert failed: one isn't two",
            ),
            ("yassert()", "wrong number of args for yassert (got 0, want 1 or 2)"),
        ]);
    }

    #[test]
    fn test_yoink() {
        test_evaluation(vec![
            ("arr := [1, 2, 3]; x := yoink(arr); x", Ok(Object::integer(3))),
            ("arr := [1, 2, 3]; x := yoink(arr); arr", Ok(int_array(&[1, 2]))),
            ("arr := [1, 2, 3]; x := yoink(arr, 1); x", Ok(Object::integer(2))),
            ("arr := [1, 2, 3]; x := yoink(arr, 1); arr", Ok(int_array(&[1, 3]))),
            ("arr := [1]; yoink(arr, 5)", Ok(Object::null())),
            ("arr := []; yoink(arr)", Ok(Object::null())),
            ("str := \"howdy\"; x := yoink(str); x", Ok(string("y"))),
            ("str := \"howdy\"; x := yoink(str); str", Ok(string("howd"))),
            ("str := \"howdy\"; x := yoink(str, 1); x", Ok(string("o"))),
            ("str := \"howdy\"; x := yoink(str, 1); str", Ok(string("hwdy"))),
        ]);
        test_errors(vec![("yoink(69)", "cannot yoink from INTEGER")]);
    }

    #[test]
    fn test_swap() {
        test_evaluation(vec![
            ("swap([1, 2, 3, 4], 0, 2)", Ok(int_array(&[3, 2, 1, 4]))),
            ("a := swap([1, 2, 3, 4], 1, 3); a", Ok(int_array(&[1, 4, 3, 2]))),
            ("a := [1, 2, 3, 4]; swap(a, 1, 3); a", Ok(int_array(&[1, 4, 3, 2]))),
            ("a := [1, 2, 3, 4]; swap(a, 1, 69)", Ok(int_array(&[1, 2, 3, 4]))),
            ("a := [1, 2, 3, 4]; swap(a, 1, -3)", Ok(int_array(&[1, 2, 3, 4]))),
        ]);
        test_errors(vec![(
            "swap([1], 0, \"a\")",
            "unsupported argument type for swap, got STRING",
        )]);
    }

    #[test]
    fn test_conversions() {
        test_evaluation(vec![
            ("yarn(5)", Ok(string("5"))),
            ("yarn(true)", Ok(string("true"))),
            ("yarn([1, 2, 3])", Ok(string("[1, 2, 3]"))),
            ("yarn(0..2)", Ok(string("0..2"))),
            ("yarn(\"test\")", Ok(string("test"))),
            ("chr(65)", Ok(string("A"))),
            ("int(5)", Ok(Object::integer(5))),
            ("int(5.0)", Ok(Object::integer(5))),
            ("int(-5.7)", Ok(Object::integer(-5))),
            ("int(true)", Ok(Object::integer(1))),
            ("int(false)", Ok(Object::integer(0))),
            ("int(\"5\")", Ok(Object::integer(5))),
            ("float(5)", Ok(Object::number(5.0))),
            ("float(5.0)", Ok(Object::number(5.0))),
            ("float(true)", Ok(Object::number(1.0))),
            ("float(false)", Ok(Object::number(0.0))),
            ("float(\"5\")", Ok(Object::number(5.0))),
        ]);
        test_errors(vec![
            ("int(0..2)", "unsupported argument type for int, got RANGE"),
            ("int([1, 2, 3])", "unsupported argument type for int, got ARRAY"),
            ("float(0..2)", "unsupported argument type for float, got RANGE"),
            ("float([1, 2, 3])", "unsupported argument type for float, got ARRAY"),
            ("int(\"five\")", "could not convert \"five\" to int"),
            ("chr(-1)", "could not convert \"-1\" to character"),
        ]);
    }

    #[test]
    fn test_printing_returns_null() {
        test_evaluation(vec![
            ("yell(\"quiet\", 1)", Ok(Object::null())),
            ("yelp(\"quiet\")", Ok(Object::null())),
            ("yap(\"sum:\", 1 + 2)", Ok(Object::null())),
        ]);
    }
}
