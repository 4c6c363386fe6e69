use std::rc::Rc;

use gc::Gc;
use yy_core::ast::{Block, Expression, Identifier, InfixOperationKind, PrefixOperationKind};

use crate::environment::Environment;
use crate::evaluator::{eval_infix, eval_prefix};
use crate::macros::object_to_expression;
use crate::object::{EvaluationError, Function, Hashmap, Object};

/// Binding names used by composed functions. `#` cannot start an
/// identifier, so these never collide with user code.
const COMPOSED_FIRST: &str = "#f";
const COMPOSED_SECOND: &str = "#g";

/// Longest string `string * n` builds; anything longer is the abyss.
const MAX_REPEATED_LEN: usize = 1 << 24;

pub(crate) fn prefix(
    kind: PrefixOperationKind,
    right: &Gc<Object>,
) -> Result<Gc<Object>, EvaluationError> {
    if kind == PrefixOperationKind::Minus {
        match right.as_ref() {
            Object::Null => return Ok(Object::abyss()),
            Object::String(string) => {
                return Ok(Object::string(string.borrow().chars().map(rot13).collect()))
            }
            Object::Array(array) => {
                let negated = array
                    .borrow()
                    .iter()
                    .map(|element| {
                        eval_prefix(kind, element, true)
                            .unwrap_or_else(|_| fallback_prefix(kind, element))
                    })
                    .collect();
                return Ok(Object::array(negated));
            }
            Object::Boolean(value) => return Ok(Object::boolean(!value)),
            Object::Hashmap(hashmap) => {
                let mut swapped = Hashmap::new();
                // Pairs whose value cannot be a key are dropped.
                for pair in hashmap.borrow().iter() {
                    if pair.value.hash_key().is_some() {
                        swapped.insert(&pair.value, pair.key.clone())?;
                    }
                }
                return Ok(Object::hashmap(swapped));
            }
            Object::Range { start, end } => return Ok(Object::range(*end, *start)),
            Object::Function(function) => {
                let body = Block {
                    expressions: vec![Expression::PrefixOperation(
                        kind,
                        Box::new(Expression::Block(function.body.as_ref().clone())),
                    )],
                };
                return Ok(Object::function(
                    function.parameters.clone(),
                    Rc::new(body),
                    function.env.clone(),
                ));
            }
            _ => {}
        }
    }
    Ok(fallback_prefix(kind, right))
}

fn fallback_prefix(kind: PrefixOperationKind, right: &Gc<Object>) -> Gc<Object> {
    Object::string(format!("{}{}", kind.to_str(), right))
}

fn rot13(ch: char) -> char {
    match ch {
        'A'..='M' | 'a'..='m' => ((ch as u8) + 13) as char,
        'N'..='Z' | 'n'..='z' => ((ch as u8) - 13) as char,
        _ => ch,
    }
}

fn is_arithmetic(kind: InfixOperationKind) -> bool {
    matches!(
        kind,
        InfixOperationKind::Plus
            | InfixOperationKind::Minus
            | InfixOperationKind::Multiply
            | InfixOperationKind::Divide
    )
}

/// A scalar orders below any array or string. `scalar_first` is set when
/// the scalar is the left operand.
fn ordering(kind: InfixOperationKind, scalar_first: bool) -> Option<Gc<Object>> {
    let less = match kind {
        InfixOperationKind::LessThan | InfixOperationKind::LessEqual => true,
        InfixOperationKind::GreaterThan | InfixOperationKind::GreaterEqual => false,
        _ => return None,
    };
    Some(Object::boolean(less == scalar_first))
}

/// `string * n` repeats (or names the group), `string / n` splits into
/// characters. Either operand may come first.
fn repeat_or_split(kind: InfixOperationKind, count: i64, string: &str) -> Option<Gc<Object>> {
    match kind {
        InfixOperationKind::Multiply => {
            let Ok(count) = usize::try_from(count) else {
                return Some(Object::abyss());
            };
            if let Some(noun) = collective_noun(string.trim()) {
                return Some(Object::string(noun.to_owned()));
            }
            match string.len().checked_mul(count) {
                Some(len) if len <= MAX_REPEATED_LEN => Some(Object::string(string.repeat(count))),
                _ => Some(Object::abyss()),
            }
        }
        InfixOperationKind::Divide if count <= 0 => Some(Object::abyss()),
        InfixOperationKind::Divide => Some(Object::array(
            string.chars().map(|ch| Object::string(ch.to_string())).collect(),
        )),
        _ => None,
    }
}

fn elementwise(
    array: &[Gc<Object>],
    apply: impl Fn(&Gc<Object>) -> Result<Gc<Object>, EvaluationError>,
) -> Result<Gc<Object>, EvaluationError> {
    Ok(Object::array(
        array.iter().map(apply).collect::<Result<Vec<_>, _>>()?,
    ))
}

fn parse_integer(string: &str) -> Option<Gc<Object>> {
    string.parse::<i64>().ok().map(Object::integer)
}

pub(crate) fn infix(
    kind: InfixOperationKind,
    left: &Gc<Object>,
    right: &Gc<Object>,
) -> Result<Gc<Object>, EvaluationError> {
    match (left.as_ref(), right.as_ref()) {
        (Object::Integer(_) | Object::Number(_), Object::Array(array)) => {
            if is_arithmetic(kind) {
                let array = array.borrow().clone();
                return elementwise(&array, |element| eval_infix(kind, left, element, true));
            }
            if let Some(result) = ordering(kind, true) {
                return Ok(result);
            }
        }
        (Object::Array(array), Object::Integer(_) | Object::Number(_)) => {
            if is_arithmetic(kind) {
                let array = array.borrow().clone();
                return elementwise(&array, |element| eval_infix(kind, element, right, true));
            }
            if let Some(result) = ordering(kind, false) {
                return Ok(result);
            }
        }
        (Object::String(string), Object::Integer(count)) => {
            if let Some(parsed) = parse_integer(&string.borrow()) {
                return eval_infix(kind, &parsed, right, true);
            }
            if let Some(result) = repeat_or_split(kind, *count, &string.borrow()) {
                return Ok(result);
            }
            if let Some(result) = ordering(kind, false) {
                return Ok(result);
            }
        }
        (Object::Integer(count), Object::String(string)) => {
            if let Some(parsed) = parse_integer(&string.borrow()) {
                return eval_infix(kind, left, &parsed, true);
            }
            if let Some(result) = repeat_or_split(kind, *count, &string.borrow()) {
                return Ok(result);
            }
            if let Some(result) = ordering(kind, true) {
                return Ok(result);
            }
        }
        (Object::Boolean(value), Object::Integer(_) | Object::Number(_)) => {
            return eval_infix(kind, &Object::integer(i64::from(*value)), right, true);
        }
        (Object::Integer(_) | Object::Number(_), Object::Boolean(value)) => {
            return eval_infix(kind, left, &Object::integer(i64::from(*value)), true);
        }
        (Object::Range { start, end }, Object::Integer(value)) => {
            if let Some(range) = shift_range(kind, *start, *end, *value, false) {
                return Ok(range);
            }
        }
        (Object::Integer(value), Object::Range { start, end }) => {
            if let Some(range) = shift_range(kind, *start, *end, *value, true) {
                return Ok(range);
            }
        }
        (Object::Function(first), Object::Function(_))
            if kind == InfixOperationKind::Plus =>
        {
            return Ok(compose(first, left, right));
        }
        (Object::Function(function), _) if kind == InfixOperationKind::Plus => {
            return Ok(bake_arguments(function, left, right));
        }
        (_, Object::Function(function)) if kind == InfixOperationKind::Plus => {
            return Ok(bake_arguments(function, right, left));
        }
        (Object::Function(function), _) => {
            if let Some(literal) = object_to_expression(right) {
                let body = Expression::InfixOperation(
                    kind,
                    Box::new(Expression::Block(function.body.as_ref().clone())),
                    Box::new(literal),
                );
                return Ok(with_body(function, body));
            }
        }
        (_, Object::Function(function)) => {
            if let Some(literal) = object_to_expression(left) {
                let body = Expression::InfixOperation(
                    kind,
                    Box::new(literal),
                    Box::new(Expression::Block(function.body.as_ref().clone())),
                );
                return Ok(with_body(function, body));
            }
        }
        _ => {}
    }
    Ok(Object::string(format!("{}{}", left, right)))
}

/// Applies `value` to both endpoints. `value_first` puts the integer on the
/// left of each operation.
fn shift_range(
    kind: InfixOperationKind,
    start: i64,
    end: i64,
    value: i64,
    value_first: bool,
) -> Option<Gc<Object>> {
    let apply = |endpoint: i64| -> Option<i64> {
        let (left, right) = if value_first {
            (value, endpoint)
        } else {
            (endpoint, value)
        };
        match kind {
            InfixOperationKind::Plus => Some(left.wrapping_add(right)),
            InfixOperationKind::Minus => Some(left.wrapping_sub(right)),
            InfixOperationKind::Multiply => Some(left.wrapping_mul(right)),
            InfixOperationKind::Divide => left.checked_div(right),
            _ => None,
        }
    };
    if !is_arithmetic(kind) {
        return None;
    }
    match (apply(start), apply(end)) {
        (Some(start), Some(end)) => Some(Object::range(start, end)),
        _ => Some(Object::abyss()),
    }
}

fn with_body(function: &Function, expression: Expression) -> Gc<Object> {
    Object::function(
        function.parameters.clone(),
        Rc::new(Block {
            expressions: vec![expression],
        }),
        function.env.clone(),
    )
}

/// Pre-binds parameters of `function` from `value`: hashmaps by parameter
/// name, arrays by position, anything else fills the first parameter.
fn bake_arguments(
    function: &Function,
    function_object: &Gc<Object>,
    value: &Gc<Object>,
) -> Gc<Object> {
    let scope = Environment::new_enclosed(function.env.clone());
    let remaining: Vec<Identifier> = match value.as_ref() {
        Object::Null => return function_object.clone(),
        Object::Hashmap(hashmap) => {
            let hashmap = hashmap.borrow();
            function
                .parameters
                .iter()
                .filter(|parameter| {
                    let key = Object::string(parameter.name.to_string());
                    match hashmap.get(&key) {
                        Ok(Some(bound)) => {
                            scope.set(parameter.name.clone(), bound);
                            false
                        }
                        _ => true,
                    }
                })
                .cloned()
                .collect()
        }
        Object::Array(array) => {
            let array = array.borrow();
            for (parameter, element) in function.parameters.iter().zip(array.iter()) {
                scope.set(parameter.name.clone(), element.clone());
            }
            function
                .parameters
                .iter()
                .skip(array.len())
                .cloned()
                .collect()
        }
        _ => match function.parameters.split_first() {
            Some((first, rest)) => {
                scope.set(first.name.clone(), value.clone());
                rest.to_vec()
            }
            None => Vec::new(),
        },
    };
    Object::function(remaining.into(), function.body.clone(), scope)
}

/// `(first + second)(x)` is `second(first(x))`.
fn compose(first: &Function, first_object: &Gc<Object>, second_object: &Gc<Object>) -> Gc<Object> {
    let scope = Environment::new_enclosed(first.env.clone());
    scope.set(COMPOSED_FIRST.into(), first_object.clone());
    scope.set(COMPOSED_SECOND.into(), second_object.clone());

    let inner = Expression::CallExpression {
        function: Box::new(Expression::Identifier(Identifier::new(COMPOSED_FIRST))),
        arguments: first
            .parameters
            .iter()
            .map(|parameter| Expression::Identifier(parameter.clone()))
            .collect(),
    };
    let outer = Expression::CallExpression {
        function: Box::new(Expression::Identifier(Identifier::new(COMPOSED_SECOND))),
        arguments: vec![inner],
    };
    Object::function(
        first.parameters.clone(),
        Rc::new(Block {
            expressions: vec![outer],
        }),
        scope,
    )
}

fn collective_noun(word: &str) -> Option<&'static str> {
    let noun = match word {
        "actor" => "cast",
        "angel" => "choir",
        "ant" => "army",
        "asteroid" => "belt",
        "bacteria" => "culture",
        "badger" => "cete",
        "balloon" => "festival",
        "banana" => "bunch",
        "barracuda" => "battery",
        "bat" => "colony",
        "beaver" => "colony",
        "bee" => "commonwealth",
        "book" => "library",
        "camel" => "caravan",
        "cat" => "destruction",
        "cheetah" => "coalition",
        "chick" => "chattering",
        "chicken" => "cluck",
        "chimpanzee" => "cartload",
        "clam" => "bed",
        "coyote" => "pack",
        "crocodile" => "bask",
        "crow" => "murder",
        "cutlery" => "canteen",
        "deer" => "bevy",
        "director" => "board",
        "diver" => "bubble",
        "doctor" => "confab",
        "donkey" => "drove",
        "dove" => "bevy",
        "drawer" => "chest",
        "duck" => "badelynge",
        "eagle" => "aerie",
        "economist" => "clashing",
        "eel" => "bind",
        "egg" => "clutch",
        "event" => "chain",
        "fairie" => "charm",
        "ferret" => "business",
        "finche" => "charm",
        "fish" => "haul",
        "flie" => "business",
        "flour" => "boll",
        "flower" => "bouquet",
        "game" => "bag",
        "giraffe" => "corps",
        "goat" => "drove",
        "gorilla" => "band",
        "grape" => "bunch",
        "grasshopper" => "cloud",
        "grouse" => "brood",
        "guillemot" => "bazaar",
        "gun" => "arsenal",
        "hawk" => "aerie",
        "hedgehog" => "array",
        "hen" => "brood",
        "herring" => "army",
        "hippopotamus" => "crash",
        "horsemen" => "cavalcade",
        "hound" => "cry",
        "hummingbird" => "charm",
        "hyena" => "clan",
        "insect" => "swarm",
        "island" => "archipelago",
        "judge" => "bench",
        "knight" => "banner",
        "lark" => "ascension",
        "leper" => "colony",
        "matche" => "chain",
        "meerkat" => "mob",
        "monkey" => "cartload",
        "mule" => "barren",
        "musician" => "band",
        "native" => "tribe",
        "onlooker" => "crowd",
        "otter" => "bevy",
        "owl" => "wisdom",
        "oyster" => "bed",
        "paper" => "budget",
        "partridge" => "bew",
        "peasant" => "toil",
        "performer" => "troupe",
        "pheasant" => "brace",
        "pigeon" => "bunch",
        "polar bear" => "aurora",
        "prairie dog" => "coterie",
        "ptarmigan" => "covey",
        "puffin" => "circus",
        "quail" => "bevy",
        "rabbit" => "wrack",
        "raven" => "conspiracy",
        "reed" => "clump",
        "rhinoceros" => "crash",
        "sailor" => "crew",
        "salmon" => "bind",
        "savage" => "horde",
        "seal" => "harem",
        "ship" => "armada",
        "slug" => "cornucopia",
        "soldier" => "brigade",
        "spider" => "cluster",
        "star" => "constellation",
        "starling" => "clutter",
        "student" => "class",
        "swan" => "bevy",
        "thief" => "den",
        "tiger" => "ambush",
        "toucan" => "durante",
        "tree" => "forest",
        "truck" => "convoy",
        "turkey" => "brood",
        "turtle" => "bale",
        "unicorn" => "blessing",
        "vulture" => "wake",
        "widow" => "ambush",
        "wigeon" => "coil",
        "woodcock" => "covey",
        "worm" => "clew",
        "zebra" => "zeal",
        _ => return None,
    };
    Some(noun)
}
