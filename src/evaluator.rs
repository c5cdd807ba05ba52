//! The evaluator core: dispatch of variable/list/literal forms, the
//! recursion-depth guard, and the lambda-call protocol.
//!
//! Structured as a dispatch loop, adapted from bytecode-stepping to direct
//! tree walking since this interpreter has no compile step — it evaluates
//! the parsed `Value` graph directly.

use crate::context::Context;
use crate::diagnostic;
use crate::scope::Scope;
use crate::value::{LambdaData, Value};

/// Recursion bound past which evaluation bails out instead of overflowing
/// the host stack.
pub const MAX_EVAL_DEPTH: usize = 32768;

/// Evaluate `v` in `scope`, under `ctx`'s recursion-depth budget.
///
/// Classification:
/// 1. `Nil` self-evaluates.
/// 2. depth guard.
/// 3. a `List` headed by a `Variable` is an application.
/// 4. a bare `Variable` looks itself up.
/// 5. anything else self-evaluates.
pub fn evaluate(ctx: &Context, scope: &Scope, v: &Value) -> Value {
    if v.is_nil() {
        return Value::Nil;
    }

    let _guard = match ctx.enter_eval() {
        Some(guard) => guard,
        None => {
            diagnostic::error(ctx.line(), "maximum evaluation depth exceeded");
            return Value::Nil;
        }
    };

    match v {
        Value::List(cell) if cell.head.is_variable() => {
            let name = cell.head.as_variable().unwrap();
            match scope.lookup(name) {
                Some(Value::Special(special)) => (special.func)(ctx, scope, v),
                Some(Value::Lambda(lambda)) => apply(ctx, &lambda, v),
                Some(bound) => evaluate(ctx, scope, &bound),
                None => {
                    diagnostic::error(ctx.line(), format!("'{}' is not defined", name));
                    Value::Nil
                }
            }
        }
        Value::Variable(name) => match scope.lookup(name) {
            Some(bound) => bound,
            None => {
                diagnostic::error(ctx.line(), format!("'{}' is not defined", name));
                Value::Nil
            }
        },
        other => other.clone(),
    }
}

/// The lambda-call protocol: evaluate arguments in the caller's scope, bind
/// them in a fresh frame under the lambda's captured scope, run the body.
///
/// `call_list` is the original, unevaluated `(name arg1 arg2 …)` list; its
/// head (the name) is skipped when walking arguments in lockstep with the
/// parameter list.
pub fn apply(ctx: &Context, lambda: &std::rc::Rc<LambdaData>, call_list: &Value) -> Value {
    let args: Vec<Value> = call_list.iter_list().skip(1).collect();
    let caller_scope = ctx.current_scope();

    if args.len() != lambda.params.len() {
        let msg = if args.len() < lambda.params.len() {
            "too few arguments"
        } else {
            "too many arguments"
        };
        diagnostic::error(ctx.line(), msg);
        return Value::Nil;
    }

    // Arguments are evaluated in the *caller's* scope (lexical resolution
    // at the call site) before the frame switches to the lambda's captured
    // environment (closure semantics).
    let evaluated: Vec<Value> = args.iter().map(|a| evaluate(ctx, &caller_scope, a)).collect();

    let frame = lambda.env.child();
    for (param, value) in lambda.params.iter().zip(evaluated.into_iter()) {
        frame.define(Some(param), value);
    }

    ctx.push_scope(frame.clone());
    let mut result = Value::Nil;
    for form in &lambda.body {
        result = evaluate(ctx, &frame, form);
    }
    ctx.pop_scope();
    frame.leave();

    result
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::context::Context;
    use crate::parser::Parser;

    fn eval_str(ctx: &Context, src: &str) -> Value {
        let mut p = Parser::new(src);
        let v = p.parse_one().expect("parse");
        ctx.evaluate(&v)
    }

    #[test]
    fn self_evaluating_literal() {
        let ctx = Context::new();
        assert_eq!(eval_str(&ctx, "5"), Value::Number(5.0));
        assert_eq!(eval_str(&ctx, "\"hi\""), Value::string("hi"));
    }

    #[test]
    fn unbound_variable_is_nil() {
        let ctx = Context::new();
        assert_eq!(eval_str(&ctx, "undefined-name"), Value::Nil);
    }

    #[test]
    fn depth_guard_does_not_overflow_the_stack() {
        let ctx = Context::new();
        eval_str(
            &ctx,
            "(define loop (lambda (n) (loop (+ n 1))))",
        );
        let result = eval_str(&ctx, "(loop 0)");
        assert_eq!(result, Value::Nil);
    }
}
