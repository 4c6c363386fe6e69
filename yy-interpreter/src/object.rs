use std::collections::HashMap;
use std::fmt::Display;
use std::rc::Rc;

use gc::{Finalize, Gc, GcCell, Trace};
use thiserror::Error;
use yy_core::ast;

use crate::environment::Environment;

/// String returned by degenerate yolo operations.
pub const ABYSS: &str = "Stare at the abyss long enough, and it starts to stare back at you.";

#[derive(Debug, Trace, Finalize)]
pub enum Object {
    Integer(i64),
    Number(f64),
    Boolean(bool),
    String(GcCell<String>),
    Null,
    Array(GcCell<Vec<Gc<Object>>>),
    Hashmap(GcCell<Hashmap>),
    Range { start: i64, end: i64 },
    Function(Function),
    Macro(Function),
    Builtin(Builtin),
    Quote(Quote),
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum ObjectKind {
    Integer,
    Number,
    Boolean,
    String,
    Null,
    Array,
    Hashmap,
    Range,
    Function,
    Macro,
    Builtin,
    Quote,
}

impl Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ObjectKind::Integer => "INTEGER",
            ObjectKind::Number => "NUMBER",
            ObjectKind::Boolean => "BOOLEAN",
            ObjectKind::String => "STRING",
            ObjectKind::Null => "NULL",
            ObjectKind::Array => "ARRAY",
            ObjectKind::Hashmap => "HASHMAP",
            ObjectKind::Range => "RANGE",
            ObjectKind::Function => "FUNCTION",
            ObjectKind::Macro => "MACRO",
            ObjectKind::Builtin => "BUILTIN",
            ObjectKind::Quote => "QUOTE",
        };
        write!(f, "{}", name)
    }
}

impl Object {
    pub fn null() -> Gc<Object> {
        Gc::new(Object::Null)
    }
    pub fn boolean(value: bool) -> Gc<Object> {
        Gc::new(Object::Boolean(value))
    }
    pub fn integer(value: i64) -> Gc<Object> {
        Gc::new(Object::Integer(value))
    }
    pub fn number(value: f64) -> Gc<Object> {
        Gc::new(Object::Number(value))
    }
    pub fn string(value: String) -> Gc<Object> {
        Gc::new(Object::String(GcCell::new(value)))
    }
    pub fn abyss() -> Gc<Object> {
        Object::string(ABYSS.to_owned())
    }
    pub fn array(array: Vec<Gc<Object>>) -> Gc<Object> {
        Gc::new(Object::Array(GcCell::new(array)))
    }
    pub fn hashmap(hashmap: Hashmap) -> Gc<Object> {
        Gc::new(Object::Hashmap(GcCell::new(hashmap)))
    }
    pub fn range(start: i64, end: i64) -> Gc<Object> {
        Gc::new(Object::Range { start, end })
    }
    pub fn function(
        parameters: Rc<[ast::Identifier]>,
        body: Rc<ast::Block>,
        env: Environment,
    ) -> Gc<Object> {
        Gc::new(Object::Function(Function {
            parameters,
            body,
            env,
        }))
    }
    pub fn macro_(
        parameters: Rc<[ast::Identifier]>,
        body: Rc<ast::Block>,
        env: Environment,
    ) -> Gc<Object> {
        Gc::new(Object::Macro(Function {
            parameters,
            body,
            env,
        }))
    }
    pub fn builtin(builtin: Builtin) -> Gc<Object> {
        Gc::new(Object::Builtin(builtin))
    }
    pub fn quote(node: ast::Expression) -> Gc<Object> {
        Gc::new(Object::Quote(Quote {
            node: Rc::new(node),
        }))
    }

    pub fn kind(&self) -> ObjectKind {
        match self {
            Object::Integer(_) => ObjectKind::Integer,
            Object::Number(_) => ObjectKind::Number,
            Object::Boolean(_) => ObjectKind::Boolean,
            Object::String(_) => ObjectKind::String,
            Object::Null => ObjectKind::Null,
            Object::Array(_) => ObjectKind::Array,
            Object::Hashmap(_) => ObjectKind::Hashmap,
            Object::Range { .. } => ObjectKind::Range,
            Object::Function(_) => ObjectKind::Function,
            Object::Macro(_) => ObjectKind::Macro,
            Object::Builtin(_) => ObjectKind::Builtin,
            Object::Quote(_) => ObjectKind::Quote,
        }
    }

    /// `false`, `null` and empty strings, arrays and hashmaps are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Object::Boolean(value) => *value,
            Object::Null => false,
            Object::String(value) => !value.borrow().is_empty(),
            Object::Array(array) => !array.borrow().is_empty(),
            Object::Hashmap(hashmap) => hashmap.borrow().len() != 0,
            _ => true,
        }
    }

    pub fn hash_key(&self) -> Option<HashKey> {
        match self {
            Object::Integer(value) => Some(HashKey {
                kind: ObjectKind::Integer,
                value: *value as u64,
            }),
            Object::Boolean(value) => Some(HashKey {
                kind: ObjectKind::Boolean,
                value: *value as u64,
            }),
            Object::String(value) => Some(HashKey {
                kind: ObjectKind::String,
                value: fnv1a(value.borrow().as_bytes()),
            }),
            _ => None,
        }
    }

    /// Display form used inside containers: strings are quoted.
    pub fn inspect(&self) -> String {
        match self {
            Object::String(value) => format!("{:?}", value.borrow().as_str()),
            other => other.to_string(),
        }
    }

    /// Copies strings so the result does not alias `object`; every other
    /// kind is immutable as a key and is shared.
    fn detached_key(object: &Gc<Object>) -> Gc<Object> {
        match object.as_ref() {
            Object::String(value) => Object::string(value.borrow().clone()),
            _ => object.clone(),
        }
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;
    bytes.iter().fold(OFFSET_BASIS, |hash, byte| {
        (hash ^ u64::from(*byte)).wrapping_mul(PRIME)
    })
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.is_finite() {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

/// Writes an array or hashmap. `open` holds the containers currently being
/// written, so a container that reaches itself prints as `[...]`/`%{...}`.
fn write_container(
    f: &mut std::fmt::Formatter<'_>,
    container: &Object,
    open: &mut Vec<*const Object>,
) -> std::fmt::Result {
    let id = container as *const Object;
    match container {
        Object::Array(_) if open.contains(&id) => write!(f, "[...]"),
        Object::Hashmap(_) if open.contains(&id) => write!(f, "%{{...}}"),
        Object::Array(array) => {
            open.push(id);
            write!(f, "[")?;
            for (i, element) in array.borrow().iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write_element(f, element, open)?;
            }
            open.pop();
            write!(f, "]")
        }
        Object::Hashmap(hashmap) => {
            open.push(id);
            write!(f, "%{{")?;
            for (i, pair) in hashmap.borrow().iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write_element(f, &pair.key, open)?;
                write!(f, ": ")?;
                write_element(f, &pair.value, open)?;
            }
            open.pop();
            write!(f, "}}")
        }
        other => write!(f, "{}", other),
    }
}

fn write_element(
    f: &mut std::fmt::Formatter<'_>,
    element: &Object,
    open: &mut Vec<*const Object>,
) -> std::fmt::Result {
    match element {
        Object::String(value) => write!(f, "{:?}", value.borrow().as_str()),
        Object::Array(_) | Object::Hashmap(_) => write_container(f, element, open),
        other => write!(f, "{}", other),
    }
}

impl Display for Object {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Object::Integer(value) => write!(f, "{}", value),
            Object::Number(value) => write!(f, "{}", format_number(*value)),
            Object::Boolean(value) => write!(f, "{}", value),
            Object::String(value) => write!(f, "{}", value.borrow()),
            Object::Null => write!(f, "null"),
            Object::Array(_) | Object::Hashmap(_) => write_container(f, self, &mut Vec::new()),
            Object::Range { start, end } => write!(f, "{}..{}", start, end),
            Object::Function(function) => write!(
                f,
                "{}",
                ast::Expression::Lambda {
                    parameters: function.parameters.to_vec(),
                    body: function.body.as_ref().clone(),
                }
            ),
            Object::Macro(function) => write!(
                f,
                "{}",
                ast::Expression::Macro {
                    parameters: function.parameters.to_vec(),
                    body: function.body.as_ref().clone(),
                }
            ),
            Object::Builtin(builtin) => write!(f, "builtin {}", builtin.name),
            Object::Quote(quote) => write!(f, "quote({})", quote.node),
        }
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Object::Integer(left), Object::Integer(right)) => left == right,
            (Object::Number(left), Object::Number(right)) => left == right,
            (Object::Boolean(left), Object::Boolean(right)) => left == right,
            (Object::String(left), Object::String(right)) => *left.borrow() == *right.borrow(),
            (Object::Null, Object::Null) => true,
            (Object::Array(left), Object::Array(right)) => {
                std::ptr::eq(left, right) || *left.borrow() == *right.borrow()
            }
            (Object::Hashmap(left), Object::Hashmap(right)) => {
                std::ptr::eq(left, right) || *left.borrow() == *right.borrow()
            }
            (
                Object::Range { start, end },
                Object::Range {
                    start: other_start,
                    end: other_end,
                },
            ) => start == other_start && end == other_end,
            (Object::Function(left), Object::Function(right)) => left == right,
            (Object::Macro(left), Object::Macro(right)) => left == right,
            (Object::Builtin(left), Object::Builtin(right)) => left.name == right.name,
            (Object::Quote(left), Object::Quote(right)) => left.node == right.node,
            _ => false,
        }
    }
}

#[derive(Clone, Trace, Finalize)]
pub struct Function {
    #[unsafe_ignore_trace]
    pub parameters: Rc<[ast::Identifier]>,
    #[unsafe_ignore_trace]
    pub body: Rc<ast::Block>,
    pub env: Environment,
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        self.parameters == other.parameters
            && Rc::ptr_eq(&self.body, &other.body)
            && self.env == other.env
    }
}

impl std::fmt::Debug for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Function")
            .field("parameters", &self.parameters)
            .field("body", &self.body.to_string())
            .finish()
    }
}

pub type BuiltinFunction = fn(Vec<Gc<Object>>) -> Result<Gc<Object>, EvaluationError>;

#[derive(Clone, Trace, Finalize)]
pub struct Builtin {
    #[unsafe_ignore_trace]
    pub name: &'static str,
    #[unsafe_ignore_trace]
    pub func: BuiltinFunction,
}

impl std::fmt::Debug for Builtin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Builtin").field("name", &self.name).finish()
    }
}

#[derive(Debug, Clone, Trace, Finalize)]
pub struct Quote {
    #[unsafe_ignore_trace]
    pub node: Rc<ast::Expression>,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct HashKey {
    pub kind: ObjectKind,
    pub value: u64,
}

#[derive(Debug, Clone, Trace, Finalize)]
pub struct HashPair {
    pub key: Gc<Object>,
    pub value: Gc<Object>,
}

/// Insertion ordered map. Each `HashKey` slot lists the pairs sharing that
/// key, and lookups compare the stored key objects to resolve collisions.
#[derive(Debug, Default, Clone, Trace, Finalize)]
pub struct Hashmap {
    pairs: Vec<HashPair>,
    #[unsafe_ignore_trace]
    slots: HashMap<HashKey, Vec<usize>>,
}

impl Hashmap {
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, hash_key: &HashKey, key: &Object) -> Option<usize> {
        self.slots
            .get(hash_key)?
            .iter()
            .copied()
            .find(|idx| self.pairs[*idx].key.as_ref() == key)
    }

    pub fn get(&self, key: &Gc<Object>) -> Result<Option<Gc<Object>>, EvaluationError> {
        let hash_key = key
            .hash_key()
            .ok_or(EvaluationError::KeyNotHashable(key.kind()))?;
        Ok(self
            .position(&hash_key, key)
            .map(|idx| self.pairs[idx].value.clone()))
    }

    pub fn insert(&mut self, key: &Gc<Object>, value: Gc<Object>) -> Result<(), EvaluationError> {
        let hash_key = key
            .hash_key()
            .ok_or(EvaluationError::KeyNotHashable(key.kind()))?;
        match self.position(&hash_key, key) {
            Some(idx) => self.pairs[idx].value = value,
            None => {
                self.slots.entry(hash_key).or_default().push(self.pairs.len());
                self.pairs.push(HashPair {
                    key: Object::detached_key(key),
                    value,
                });
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HashPair> {
        self.pairs.iter()
    }
}

impl PartialEq for Hashmap {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self.pairs.iter().all(|pair| {
                matches!(other.get(&pair.key), Ok(Some(value)) if value == pair.value)
            })
    }
}

#[derive(Debug, PartialEq)]
pub enum QuickReturn {
    Return(Gc<Object>),
    Error(EvaluationError),
}

impl From<EvaluationError> for QuickReturn {
    fn from(error: EvaluationError) -> Self {
        QuickReturn::Error(error)
    }
}

fn optional_message(message: &Option<Rc<str>>) -> String {
    message
        .as_ref()
        .map(|message| format!(": {}", message))
        .unwrap_or_default()
}

#[derive(Debug, PartialEq, Clone, Error)]
pub enum EvaluationError {
    #[error("type mismatch: {left} {operator} {right}")]
    TypeMismatch {
        left: ObjectKind,
        operator: &'static str,
        right: ObjectKind,
    },
    #[error("unknown operator: {left} {operator} {right}")]
    UnknownInfixOperator {
        left: ObjectKind,
        operator: &'static str,
        right: ObjectKind,
    },
    #[error("unknown operator: {operator}{right}")]
    UnknownPrefixOperator {
        operator: &'static str,
        right: ObjectKind,
    },
    #[error("identifier not found: {0}")]
    UnknownIdentifier(Rc<str>),
    #[error("identifier not found: {0} (to declare a variable use := operator)")]
    UndeclaredAssignment(Rc<str>),
    #[error("index operator not supported: {left}[{index}]")]
    IndexNotSupported { left: ObjectKind, index: ObjectKind },
    #[error("key not hashable: {0}")]
    KeyNotHashable(ObjectKind),
    #[error("wrong number of args for {name} (got {got}, want {want})")]
    WrongArgumentCount {
        name: Rc<str>,
        got: usize,
        want: Rc<str>,
    },
    #[error("unsupported argument type for {name}, got {kind}")]
    UnsupportedArgument { name: Rc<str>, kind: ObjectKind },
    #[error("attempted to assign out of bounds for {kind} '{name}'")]
    AssignOutOfBounds { kind: &'static str, name: Rc<str> },
    #[error("cannot assign to {0}")]
    InvalidAssignmentTarget(Rc<str>),
    #[error("cannot yoink from {0}")]
    CannotYoink(ObjectKind),
    #[error("yassert failed{}", optional_message(.0))]
    YassertFailed(Option<Rc<str>>),
    #[error("division by zero")]
    DivisionByZero,
    #[error("length of {0} does not fit in an integer")]
    LengthOverflow(Rc<str>),
    #[error("not a function: {0}")]
    NotAFunction(ObjectKind),
    #[error("cannot iterate over {0}")]
    CannotIterate(ObjectKind),
    #[error("range endpoints must be integers, got {start}..{end}")]
    InvalidRange { start: ObjectKind, end: ObjectKind },
    #[error("only quoted objects can be returned from macros, got {0}")]
    MacroNotQuote(ObjectKind),
    #[error("cannot unquote {0}")]
    CannotUnquote(ObjectKind),
    #[error("could not convert {value:?} to {target}")]
    ConversionFailed { value: Rc<str>, target: &'static str },
    #[error("cannot evaluate an expression that failed to parse")]
    BadExpression,
}

#[cfg(test)]
mod tests {
    use super::{Hashmap, Object, ObjectKind, ABYSS};

    #[test]
    fn test_string_hash_keys() {
        let hello1 = Object::string("Hello World".to_owned());
        let hello2 = Object::string("Hello World".to_owned());
        let diff1 = Object::string("My name is johnny".to_owned());
        let diff2 = Object::string("My name is johnny".to_owned());

        assert_eq!(hello1.hash_key(), hello2.hash_key());
        assert_eq!(diff1.hash_key(), diff2.hash_key());
        assert_ne!(hello1.hash_key(), diff1.hash_key());
    }

    #[test]
    fn test_hash_keys_by_kind() {
        assert_eq!(
            Object::integer(1).hash_key().map(|key| key.kind),
            Some(ObjectKind::Integer)
        );
        assert_ne!(Object::integer(1).hash_key(), Object::boolean(true).hash_key());
        assert_eq!(Object::array(vec![]).hash_key(), None);
        assert_eq!(Object::null().hash_key(), None);
    }

    #[test]
    fn test_truthiness() {
        let tests = vec![
            (Object::null(), false),
            (Object::boolean(false), false),
            (Object::string(String::new()), false),
            (Object::array(vec![]), false),
            (Object::hashmap(Hashmap::new()), false),
            (Object::integer(0), true),
            (Object::number(0.0), true),
            (Object::string("0".to_owned()), true),
            (Object::array(vec![Object::null()]), true),
            (Object::range(0, 0), true),
        ];

        for (object, expected) in tests {
            assert_eq!(object.is_truthy(), expected, "{}", object);
        }
    }

    #[test]
    fn test_hashmap_keeps_insertion_order_and_overwrites() {
        let mut hashmap = Hashmap::new();
        hashmap
            .insert(&Object::string("b".to_owned()), Object::integer(1))
            .unwrap();
        hashmap
            .insert(&Object::integer(7), Object::integer(2))
            .unwrap();
        hashmap
            .insert(&Object::string("b".to_owned()), Object::integer(3))
            .unwrap();

        assert_eq!(hashmap.len(), 2);
        assert_eq!(
            hashmap.get(&Object::string("b".to_owned())).unwrap(),
            Some(Object::integer(3))
        );
        assert_eq!(hashmap.get(&Object::integer(8)).unwrap(), None);
        assert_eq!(Object::hashmap(hashmap).to_string(), "%{\"b\": 3, 7: 2}");
    }

    #[test]
    fn test_hashmap_rejects_unhashable_keys() {
        let mut hashmap = Hashmap::new();
        assert!(hashmap.insert(&Object::null(), Object::integer(1)).is_err());
        assert_eq!(
            hashmap.get(&Object::array(vec![])).unwrap_err().to_string(),
            "key not hashable: ARRAY"
        );
    }

    #[test]
    fn test_hashmap_keys_do_not_alias_strings() {
        let key = Object::string("k".to_owned());
        let mut hashmap = Hashmap::new();
        hashmap.insert(&key, Object::integer(1)).unwrap();
        if let Object::String(value) = key.as_ref() {
            value.borrow_mut().push('!');
        }
        assert_eq!(
            hashmap.get(&Object::string("k".to_owned())).unwrap(),
            Some(Object::integer(1))
        );
    }

    #[test]
    fn test_display() {
        let tests = vec![
            (Object::integer(-3), "-3"),
            (Object::number(2.0), "2.0"),
            (Object::number(0.5), "0.5"),
            (Object::string("raw".to_owned()), "raw"),
            (
                Object::array(vec![Object::string("a".to_owned()), Object::null()]),
                "[\"a\", null]",
            ),
            (Object::range(0, 2), "0..2"),
            (Object::abyss(), ABYSS),
        ];

        for (object, expected) in tests {
            assert_eq!(object.to_string(), expected);
        }
    }

    #[test]
    fn test_display_of_self_containing_values() {
        let array = Object::array(vec![Object::integer(1)]);
        if let Object::Array(elements) = array.as_ref() {
            elements.borrow_mut().push(array.clone());
        }
        assert_eq!(array.to_string(), "[1, [...]]");
        assert_eq!(array, array.clone());

        let hashmap = Object::hashmap(Hashmap::new());
        if let Object::Hashmap(pairs) = hashmap.as_ref() {
            pairs
                .borrow_mut()
                .insert(&Object::string("me".to_owned()), hashmap.clone())
                .unwrap();
        }
        assert_eq!(hashmap.to_string(), "%{\"me\": %{...}}");

        let shared = Object::array(vec![Object::integer(2)]);
        let twice = Object::array(vec![shared.clone(), shared]);
        assert_eq!(twice.to_string(), "[[2], [2]]");
    }
}
