use std::cell::RefCell;
use std::rc::Rc;

use hashbrown::HashMap;

use crate::error::SkiffError;
use crate::value::{resolve, Spur, Value};

/// Binding state flags. A binding is `defined` once `define` (or parameter
/// binding) has given it a value; `constant` bindings reject both
/// redefinition and assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Flags {
    pub defined: bool,
    pub constant: bool,
}

#[derive(Debug, Clone)]
struct Binding {
    value: Value,
    flags: Flags,
}

/// One lexical frame: a map from names to storage locations plus a link to
/// the enclosing frame. Frames are shared; a closure retains its defining
/// frame through this handle, and the frame lives as long as any holder.
#[derive(Debug, Clone)]
pub struct Env {
    bindings: Rc<RefCell<HashMap<Spur, Binding>>>,
    pub parent: Option<Rc<Env>>,
}

impl Env {
    pub fn new() -> Self {
        Env {
            bindings: Rc::new(RefCell::new(HashMap::new())),
            parent: None,
        }
    }

    pub fn with_parent(parent: Rc<Env>) -> Self {
        Env {
            bindings: Rc::new(RefCell::new(HashMap::new())),
            parent: Some(parent),
        }
    }

    /// Resolve a name, walking from this frame outward to the root.
    pub fn get(&self, name: Spur) -> Option<Value> {
        if let Some(binding) = self.bindings.borrow().get(&name) {
            Some(binding.value.clone())
        } else if let Some(parent) = &self.parent {
            parent.get(name)
        } else {
            None
        }
    }

    /// Create or overwrite a binding in this frame, shadowing any outer
    /// binding of the same name. Redefining a constant in this frame fails.
    pub fn define(&self, name: Spur, value: Value) -> Result<(), SkiffError> {
        let mut bindings = self.bindings.borrow_mut();
        if let Some(existing) = bindings.get(&name) {
            if existing.flags.constant {
                return Err(SkiffError::Constant(resolve(name)));
            }
        }
        bindings.insert(
            name,
            Binding {
                value,
                flags: Flags {
                    defined: true,
                    constant: false,
                },
            },
        );
        Ok(())
    }

    /// Install a constant binding. Used for the builtin registry at
    /// interpreter startup; the registry is immutable once constructed.
    pub fn define_const(&self, name: Spur, value: Value) {
        self.bindings.borrow_mut().insert(
            name,
            Binding {
                value,
                flags: Flags {
                    defined: true,
                    constant: true,
                },
            },
        );
    }

    /// Mutate the nearest existing binding, walking outward. Assigning an
    /// unbound name never creates a binding.
    pub fn assign(&self, name: Spur, value: Value) -> Result<(), SkiffError> {
        let mut bindings = self.bindings.borrow_mut();
        if let Some(binding) = bindings.get_mut(&name) {
            if binding.flags.constant {
                return Err(SkiffError::Constant(resolve(name)));
            }
            binding.value = value;
            return Ok(());
        }
        drop(bindings);
        match &self.parent {
            Some(parent) => parent.assign(name, value),
            None => Err(SkiffError::AssignUnbound(resolve(name))),
        }
    }

    /// Flags for a binding visible from this frame, if any.
    pub fn flags(&self, name: Spur) -> Option<Flags> {
        if let Some(binding) = self.bindings.borrow().get(&name) {
            Some(binding.flags)
        } else if let Some(parent) = &self.parent {
            parent.flags(name)
        } else {
            None
        }
    }
}

impl Default for Env {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::intern;

    #[test]
    fn lookup_walks_outward() {
        let root = Env::new();
        root.define(intern("x"), Value::int(1)).unwrap();
        let child = Env::with_parent(Rc::new(root));
        assert_eq!(child.get(intern("x")), Some(Value::int(1)));
        assert_eq!(child.get(intern("y")), None);
    }

    #[test]
    fn define_shadows_without_mutating_outer() {
        let root = Rc::new(Env::new());
        root.define(intern("x"), Value::int(1)).unwrap();
        let child = Env::with_parent(Rc::clone(&root));
        child.define(intern("x"), Value::int(2)).unwrap();
        assert_eq!(child.get(intern("x")), Some(Value::int(2)));
        assert_eq!(root.get(intern("x")), Some(Value::int(1)));
    }

    #[test]
    fn assign_mutates_nearest_binding() {
        let root = Rc::new(Env::new());
        root.define(intern("x"), Value::int(1)).unwrap();
        let child = Env::with_parent(Rc::clone(&root));
        child.assign(intern("x"), Value::int(9)).unwrap();
        assert_eq!(root.get(intern("x")), Some(Value::int(9)));
    }

    #[test]
    fn assign_unbound_fails_without_creating_binding() {
        let env = Env::new();
        let err = env.assign(intern("ghost"), Value::int(1)).unwrap_err();
        assert!(matches!(err, SkiffError::AssignUnbound(_)));
        assert_eq!(env.get(intern("ghost")), None);
    }

    #[test]
    fn constants_reject_assignment_and_redefinition() {
        let env = Env::new();
        env.define_const(intern("car"), Value::int(0));
        assert!(matches!(
            env.assign(intern("car"), Value::int(1)),
            Err(SkiffError::Constant(_))
        ));
        assert!(matches!(
            env.define(intern("car"), Value::int(1)),
            Err(SkiffError::Constant(_))
        ));
    }

    #[test]
    fn constants_can_be_shadowed_in_child_frames() {
        let root = Rc::new(Env::new());
        root.define_const(intern("car"), Value::int(0));
        let child = Env::with_parent(root);
        child.define(intern("car"), Value::int(1)).unwrap();
        assert_eq!(child.get(intern("car")), Some(Value::int(1)));
    }

    #[test]
    fn frames_are_shared_not_copied() {
        let env = Env::new();
        let alias = env.clone();
        env.define(intern("x"), Value::int(7)).unwrap();
        assert_eq!(alias.get(intern("x")), Some(Value::int(7)));
    }
}
