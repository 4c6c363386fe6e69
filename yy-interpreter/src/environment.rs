use crate::object::Object;
use gc::{Finalize, Gc, GcCell, Trace};
use std::collections::HashMap;
use std::rc::Rc;

/// Key marking a scope opened by a `yolo` block. `#` cannot start an
/// identifier or a `$name` interpolation, so programs never see it.
const YOLO_SENTINEL: &str = "#yolo";

#[derive(Debug, Clone, Trace, Finalize)]
pub struct EnvironmentCore {
    store: HashMap<Rc<str>, Gc<Object>>,
    outer: Option<Environment>,
}

#[derive(Debug, Clone, Trace, Finalize)]
pub struct Environment {
    environment: Gc<GcCell<EnvironmentCore>>,
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            environment: Gc::new(GcCell::new(EnvironmentCore {
                store: HashMap::new(),
                outer: None,
            })),
        }
    }

    pub fn new_enclosed(outer: Environment) -> Environment {
        Environment {
            environment: Gc::new(GcCell::new(EnvironmentCore {
                store: HashMap::new(),
                outer: Some(outer),
            })),
        }
    }

    pub fn get(&self, key: &str) -> Option<Gc<Object>> {
        let env = self.environment.borrow();
        match env.store.get(key) {
            Some(value) => Some(value.clone()),
            None => env.outer.as_ref().and_then(|outer| outer.get(key)),
        }
    }

    /// Binds `key` in this scope, shadowing any outer binding.
    pub fn set(&self, key: Rc<str>, value: Gc<Object>) {
        self.environment.borrow_mut().store.insert(key, value);
    }

    /// Rebinds `key` in the nearest scope that already holds it. Returns
    /// `false` when no scope does.
    pub fn update(&self, key: &str, value: Gc<Object>) -> bool {
        let mut env = self.environment.borrow_mut();
        if let Some(slot) = env.store.get_mut(key) {
            *slot = value;
            return true;
        }
        match &env.outer {
            Some(outer) => outer.update(key, value),
            None => false,
        }
    }

    pub fn mark_yolo(&self) {
        self.set(YOLO_SENTINEL.into(), Object::boolean(true));
    }

    pub fn is_yolo(&self) -> bool {
        self.get(YOLO_SENTINEL).is_some()
    }
}

impl PartialEq for Environment {
    fn eq(&self, other: &Self) -> bool {
        Gc::ptr_eq(&self.environment, &other.environment)
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::Environment;
    use crate::object::Object;

    #[test]
    fn test_get_walks_outward() {
        let outer = Environment::new();
        outer.set("a".into(), Object::integer(1));
        let inner = Environment::new_enclosed(outer.clone());
        inner.set("b".into(), Object::integer(2));

        assert_eq!(inner.get("a"), Some(Object::integer(1)));
        assert_eq!(inner.get("b"), Some(Object::integer(2)));
        assert_eq!(outer.get("b"), None);
    }

    #[test]
    fn test_update_rebinds_nearest_scope() {
        let outer = Environment::new();
        outer.set("a".into(), Object::integer(1));
        let inner = Environment::new_enclosed(outer.clone());

        assert!(inner.update("a", Object::integer(5)));
        assert_eq!(outer.get("a"), Some(Object::integer(5)));
        assert!(!inner.update("missing", Object::null()));
        assert_eq!(inner.get("missing"), None);
    }

    #[test]
    fn test_yolo_marker_is_scoped() {
        let outer = Environment::new();
        let yolo = Environment::new_enclosed(outer.clone());
        yolo.mark_yolo();
        let nested = Environment::new_enclosed(yolo.clone());

        assert!(!outer.is_yolo());
        assert!(yolo.is_yolo());
        assert!(nested.is_yolo());
        assert_eq!(yolo.get("yolo"), None);
    }
}
