//! The scope/binding tree, and the one piece of manual cycle-breaking this
//! interpreter needs: a recursive `define`d lambda captures the very scope
//! it's bound in, which is a reference cycle plain `Rc` counting can't
//! collect on its own.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::value::Value;

#[derive(Debug)]
pub struct ScopeData {
    bindings: BTreeMap<Rc<str>, Value>,
    parent: Option<Scope>,
}

/// A lexical frame. Cheap to clone (an `Rc` bump); two `Scope`s are the
/// "same scope" iff [`Scope::same`] says so.
#[derive(Debug, Clone)]
pub struct Scope(Rc<RefCell<ScopeData>>);

impl PartialEq for Scope {
    fn eq(&self, other: &Scope) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Scope {
    /// The single root scope of a `Context`. Only `Context::new` calls this.
    pub fn root() -> Scope {
        Scope(Rc::new(RefCell::new(ScopeData {
            bindings: BTreeMap::new(),
            parent: None,
        })))
    }

    /// Enter a fresh lexical frame nested under `self`.
    pub fn child(&self) -> Scope {
        Scope(Rc::new(RefCell::new(ScopeData {
            bindings: BTreeMap::new(),
            parent: Some(self.clone()),
        })))
    }

    pub fn same(&self, other: &Scope) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Insert-or-overwrite `name` in *this* scope. `name == None` means
    /// "anonymous": evaluate for effect only, don't bind anything.
    pub fn define(&self, name: Option<&Rc<str>>, value: Value) {
        if let Some(name) = name {
            self.0.borrow_mut().bindings.insert(name.clone(), value);
        }
    }

    /// Unconditionally drop every binding in *this* scope, severing any
    /// cycle the scope is part of regardless of reachability.
    ///
    /// Unlike [`Scope::leave`], this is not a reachability check: it is
    /// only correct at context teardown, where nothing downstream still
    /// expects to look names up in this scope. `Context::new`'s root scope
    /// is never explicitly left (it's only ever dropped, when the whole
    /// `Context` goes away) and any lambda `define`d at top level captures
    /// that root scope, so the root scope and such a lambda keep each
    /// other alive exactly like the recursive-`define` cycle below — but
    /// there `Scope::leave` is the natural place to check; here there's no
    /// "leaving" to hook, only teardown. Called once, by `Context`'s `Drop`.
    pub fn clear(&self) {
        self.0.borrow_mut().bindings.clear();
    }

    /// Walk this scope, then its parent, ... for a binding.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        let data = self.0.borrow();
        if let Some(v) = data.bindings.get(name) {
            return Some(v.clone());
        }
        match &data.parent {
            Some(parent) => {
                let parent = parent.clone();
                drop(data);
                parent.lookup(name)
            }
            None => None,
        }
    }

    /// Leave a lexical frame: run the cycle-reclamation check, then drop.
    ///
    /// Consumes `self` so a left scope cannot be looked up or defined into
    /// again by the caller.
    ///
    /// The check: scan `self`'s own bindings for a `Lambda` whose captured
    /// scope is (by identity) `self`, and whose only surviving owner is
    /// this very binding (`Rc::strong_count(&lambda) == 1`, counting the
    /// binding itself plus the local handle the match arm holds while
    /// iterating). Such lambdas are unreachable the instant this scope's
    /// last external handle drops, but a plain `Rc` cycle (lambda -> scope,
    /// scope -> binding -> lambda) would otherwise never hit a strong count
    /// of zero. Clearing the binding first breaks the cycle by hand, in
    /// exactly the one place this interpreter needs it: leaving a lexical
    /// frame.
    pub fn leave(self) {
        let mut data = self.0.borrow_mut();
        let self_refs: Vec<Rc<str>> = data
            .bindings
            .iter()
            .filter_map(|(name, value)| match value {
                Value::Lambda(lambda) => {
                    if lambda.env.same(&self) && Rc::strong_count(lambda) == 1 {
                        Some(name.clone())
                    } else {
                        None
                    }
                }
                _ => None,
            })
            .collect();
        for name in self_refs {
            data.bindings.remove(&name);
        }
        // `data` (the RefCell borrow) and then `self` (our own Rc handle)
        // drop here; if nothing else holds `self`'s Rc, the scope and
        // anything it still owns are freed normally.
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::value::LambdaData;

    #[test]
    fn lookup_walks_up_to_the_parent() {
        let root = Scope::root();
        root.define(Some(&Rc::from("x")), Value::Number(1.0));
        let child = root.child();
        assert_eq!(child.lookup("x"), Some(Value::Number(1.0)));
    }

    #[test]
    fn child_binding_shadows_without_touching_the_parent() {
        let root = Scope::root();
        root.define(Some(&Rc::from("x")), Value::Number(1.0));
        let child = root.child();
        child.define(Some(&Rc::from("x")), Value::Number(2.0));
        assert_eq!(child.lookup("x"), Some(Value::Number(2.0)));
        assert_eq!(root.lookup("x"), Some(Value::Number(1.0)));
    }

    #[test]
    fn leaving_a_scope_reclaims_a_self_referential_lambda() {
        let root = Scope::root();
        let child = root.child();
        let lambda = Rc::new(LambdaData {
            env: child.clone(),
            params: vec![Rc::from("n")],
            body: vec![Value::Number(0.0)],
        });
        let weak = Rc::downgrade(&lambda);
        child.define(Some(&Rc::from("f")), Value::Lambda(lambda));
        child.leave();
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn leaving_a_scope_keeps_a_lambda_still_reachable_elsewhere() {
        let root = Scope::root();
        let child = root.child();
        let lambda = Rc::new(LambdaData {
            env: child.clone(),
            params: vec![],
            body: vec![Value::Number(0.0)],
        });
        let weak = Rc::downgrade(&lambda);
        let escaped = Value::Lambda(lambda);
        child.define(Some(&Rc::from("f")), escaped.clone());
        child.leave();
        assert!(weak.upgrade().is_some());
        drop(escaped);
        assert!(weak.upgrade().is_none());
    }
}
