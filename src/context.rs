//! The embedding API: create/destroy a context, register host functions,
//! parse and evaluate.
//!
//! Host functions register into a name→function table the same way a
//! `compile`/`run` embedding surface would, generalized from a
//! compile-time-only table to the runtime `Special` binding this
//! tree-walking interpreter uses.

use std::cell::Cell;
use std::rc::Rc;

use crate::builtins;
use crate::evaluator::{self, MAX_EVAL_DEPTH};
use crate::parser::Parser;
use crate::scope::Scope;
use crate::value::{SpecialData, SpecialFn, Value};

/// Owns the scope stack and recursion-depth counter for one interpreter
/// session.
///
/// The root scope is never explicitly "left" the way a `begin`/lambda-call
/// frame is (see [`Scope::leave`]), so a lambda `define`d at top level —
/// recursive or not — forms the same kind of scope/lambda cycle that rule
/// targets, just anchored at a scope nothing ever walks away from during
/// normal execution. `Context`'s `Drop` is this crate's `destroy_context`:
/// it clears every scope still on the stack before the stack itself drops,
/// severing those cycles unconditionally instead of waiting on a
/// reachability check that would never fire for the root.
pub struct Context {
    scopes: std::cell::RefCell<Vec<Scope>>,
    depth: Cell<usize>,
    line: Cell<usize>,
}

impl Context {
    /// Initializes the root scope, registers built-ins, and binds `nil`.
    pub fn new() -> Context {
        let root = Scope::root();
        let ctx = Context {
            scopes: std::cell::RefCell::new(vec![root]),
            depth: Cell::new(0),
            line: Cell::new(1),
        };
        builtins::register_all(&ctx);
        ctx.define_value(Some("nil"), Value::Nil);
        ctx
    }

    pub fn current_scope(&self) -> Scope {
        self.scopes.borrow().last().cloned().expect("scope stack is never empty")
    }

    pub fn push_scope(&self, scope: Scope) {
        self.scopes.borrow_mut().push(scope);
    }

    /// Pop the current frame off the stack. Does *not* run the cycle check
    /// itself — callers are expected to call [`crate::scope::Scope::leave`]
    /// on the popped frame once they're done with their own handle to it,
    /// matching "Scopes are created on entering a lexical frame and dropped
    /// on leaving."
    pub fn pop_scope(&self) -> Scope {
        self.scopes.borrow_mut().pop().expect("popped past the root scope")
    }

    pub fn line(&self) -> usize {
        self.line.get()
    }

    pub fn set_line(&self, line: usize) {
        self.line.set(line);
    }

    /// Bumps the recursion counter, returning `None` (and not bumping it)
    /// if that would exceed [`MAX_EVAL_DEPTH`]. The `Some` case hands back
    /// an RAII guard that decrements the counter again on drop.
    pub fn enter_eval(&self) -> Option<EvalGuard<'_>> {
        let d = self.depth.get();
        if d >= MAX_EVAL_DEPTH {
            return None;
        }
        self.depth.set(d + 1);
        Some(EvalGuard { depth: &self.depth })
    }

    /// Binds `name` in the current scope. `name == None` evaluates for
    /// effect only (no binding).
    pub fn define_value(&self, name: Option<&str>, v: Value) {
        let name: Option<Rc<str>> = name.map(Into::into);
        self.current_scope().define(name.as_ref(), v);
    }

    pub fn define_number(&self, name: &str, value: f64) {
        self.define_value(Some(name), Value::Number(value));
    }

    pub fn define_special(
        &self,
        name: &str,
        func: impl Fn(&Context, &Scope, &Value) -> Value + 'static,
    ) {
        let func: SpecialFn = Rc::new(func);
        let special = Value::Special(Rc::new(SpecialData { name: name.into(), func }));
        self.define_value(Some(name), special);
    }

    /// Parses and advances past exactly one top-level expression, or
    /// returns `None` at end of input.
    pub fn parse_one(&self, parser: &mut Parser<'_>) -> Option<Value> {
        let v = parser.parse_one();
        self.set_line(parser.line());
        v
    }

    /// Evaluates `v` in the current scope, returning an owned result.
    pub fn evaluate(&self, v: &Value) -> Value {
        let scope = self.current_scope();
        evaluator::evaluate(self, &scope, v)
    }

    /// Pretty-prints a value in JL's own read syntax.
    pub fn print(&self, v: &Value) -> String {
        format!("{}", v)
    }
}

impl Default for Context {
    fn default() -> Self {
        Context::new()
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        for scope in self.scopes.borrow().iter() {
            scope.clear();
        }
    }
}

pub struct EvalGuard<'a> {
    depth: &'a Cell<usize>,
}

impl<'a> Drop for EvalGuard<'a> {
    fn drop(&mut self) {
        self.depth.set(self.depth.get() - 1);
    }
}

/// Cloning an `Rc` handle.
pub fn retain(v: &Value) -> Value {
    crate::value::retain(v)
}

/// Dropping a value.
pub fn release(v: Value) {
    crate::value::release(v)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn fresh_context_binds_nil() {
        let ctx = Context::new();
        assert_eq!(ctx.current_scope().lookup("nil"), Some(Value::Nil));
    }

    #[test]
    fn define_and_lookup() {
        let ctx = Context::new();
        ctx.define_number("pi", 3.5);
        assert_eq!(ctx.current_scope().lookup("pi"), Some(Value::Number(3.5)));
    }

    /// Dropping the context drops its root scope and everything only it
    /// still held — no leak hiding behind a global/static table.
    #[test]
    fn dropping_the_context_frees_its_lambdas() {
        use crate::parser::Parser;

        let ctx = Context::new();
        let mut p = Parser::new("(define adder (lambda (x y) (+ x y)))");
        let expr = ctx.parse_one(&mut p).unwrap();
        ctx.evaluate(&expr);

        let weak = match ctx.current_scope().lookup("adder") {
            Some(Value::Lambda(l)) => Rc::downgrade(&l),
            other => panic!("expected a lambda binding, got {:?}", other),
        };
        assert!(weak.upgrade().is_some());

        drop(ctx);
        assert!(weak.upgrade().is_none());
    }
}
