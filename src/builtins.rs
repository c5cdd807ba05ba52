//! The built-in special forms: arithmetic, comparison, list operations,
//! `if`/`and`/`or`/`not`, `begin`, `define`, `lambda`, and string ops.
//!
//! All built-ins are "special": registered as [`crate::value::Special`]s,
//! they receive the unevaluated call list and decide for themselves what to
//! evaluate, rather than a pre-packed tuple of already-evaluated arguments,
//! since JL special forms see their own name as the list head.

use std::rc::Rc;

use crate::context::Context;
use crate::diagnostic;
use crate::evaluator::evaluate;
use crate::scope::Scope;
use crate::value::Value;

const TRUE: Value = Value::Number(1.0);

/// The unevaluated arguments of a call list, skipping the leading name.
fn args(call: &Value) -> Vec<Value> {
    call.iter_list().skip(1).collect()
}

fn eval_all(ctx: &Context, scope: &Scope, args: &[Value]) -> Vec<Value> {
    args.iter().map(|a| evaluate(ctx, scope, a)).collect()
}

fn bool_value(b: bool) -> Value {
    if b {
        TRUE
    } else {
        Value::Nil
    }
}

fn wrong_arity(ctx: &Context, form: &str) -> Value {
    diagnostic::error(ctx.line(), format!("wrong number of arguments to '{}'", form));
    Value::Nil
}

fn type_error(ctx: &Context, message: &str) -> Value {
    diagnostic::error(ctx.line(), message);
    Value::Nil
}

/// Registers every built-in special form into `ctx`'s root scope. Called
/// once by [`Context::new`].
pub fn register_all(ctx: &Context) {
    ctx.define_special("=", cmp_eq);
    ctx.define_special("!=", cmp_ne);
    ctx.define_special("<", |c, s, v| cmp_order(c, s, v, "<", |o| o == std::cmp::Ordering::Less));
    ctx.define_special("<=", |c, s, v| {
        cmp_order(c, s, v, "<=", |o| o != std::cmp::Ordering::Greater)
    });
    ctx.define_special(">", |c, s, v| {
        cmp_order(c, s, v, ">", |o| o == std::cmp::Ordering::Greater)
    });
    ctx.define_special(">=", |c, s, v| {
        cmp_order(c, s, v, ">=", |o| o != std::cmp::Ordering::Less)
    });

    ctx.define_special("+", add);
    ctx.define_special("-", sub);
    ctx.define_special("*", mul);
    ctx.define_special("/", div);
    ctx.define_special("mod", modulo);

    ctx.define_special("and", and);
    ctx.define_special("or", or);
    ctx.define_special("not", not);

    ctx.define_special("if", if_form);
    ctx.define_special("begin", begin);
    ctx.define_special("define", define);
    ctx.define_special("lambda", lambda);

    ctx.define_special("list", list);
    ctx.define_special("cons", cons);
    ctx.define_special("head", head);
    ctx.define_special("rest", rest);

    ctx.define_special("char", char_at);
    ctx.define_special("substr", substr);
    ctx.define_special("concat", concat);

    ctx.define_special("number?", |_c, _s, v| type_pred(_c, _s, v, Value::is_number));
    ctx.define_special("string?", |_c, _s, v| type_pred(_c, _s, v, Value::is_string));
    ctx.define_special("list?", |_c, _s, v| type_pred(_c, _s, v, Value::is_list));
    ctx.define_special("null?", |_c, _s, v| type_pred(_c, _s, v, Value::is_nil));
}

fn type_pred(ctx: &Context, scope: &Scope, call: &Value, pred: impl Fn(&Value) -> bool) -> Value {
    let a = args(call);
    if a.len() != 1 {
        return wrong_arity(ctx, "type predicate");
    }
    let v = evaluate(ctx, scope, &a[0]);
    bool_value(pred(&v))
}

/// `=`/`!=` work on any pair of same-typed, non-nil values, plus the
/// special case that two nils compare equal/unequal respectively.
fn values_equal(a: &Value, b: &Value) -> Option<bool> {
    match (a, b) {
        (Value::Nil, Value::Nil) => Some(true),
        (Value::Number(x), Value::Number(y)) => Some(x == y),
        (Value::String(x), Value::String(y)) => Some(x == y),
        _ => None,
    }
}

fn cmp_eq(ctx: &Context, scope: &Scope, call: &Value) -> Value {
    let a = args(call);
    if a.len() != 2 {
        return wrong_arity(ctx, "=");
    }
    let (l, r) = (evaluate(ctx, scope, &a[0]), evaluate(ctx, scope, &a[1]));
    match values_equal(&l, &r) {
        Some(eq) => bool_value(eq),
        None => type_error(ctx, "'=' requires two values of the same comparable type"),
    }
}

fn cmp_ne(ctx: &Context, scope: &Scope, call: &Value) -> Value {
    let a = args(call);
    if a.len() != 2 {
        return wrong_arity(ctx, "!=");
    }
    let (l, r) = (evaluate(ctx, scope, &a[0]), evaluate(ctx, scope, &a[1]));
    match values_equal(&l, &r) {
        Some(eq) => bool_value(!eq),
        // Values of different (or non-comparable) types are never equal.
        None => TRUE,
    }
}

fn cmp_order(
    ctx: &Context,
    scope: &Scope,
    call: &Value,
    name: &str,
    accept: impl Fn(std::cmp::Ordering) -> bool,
) -> Value {
    let a = args(call);
    if a.len() != 2 {
        return wrong_arity(ctx, name);
    }
    let (l, r) = (evaluate(ctx, scope, &a[0]), evaluate(ctx, scope, &a[1]));
    let ordering = match (&l, &r) {
        (Value::Number(x), Value::Number(y)) => x.partial_cmp(y),
        (Value::String(x), Value::String(y)) => Some(x.as_ref().cmp(y.as_ref())),
        _ => None,
    };
    match ordering {
        Some(o) => bool_value(accept(o)),
        None => type_error(
            ctx,
            &format!("'{}' requires two numbers or two strings of the same type", name),
        ),
    }
}

fn add(ctx: &Context, scope: &Scope, call: &Value) -> Value {
    let mut sum = 0.0;
    for v in eval_all(ctx, scope, &args(call)) {
        match v.as_number() {
            Some(n) => sum += n,
            None => return type_error(ctx, "'+' requires numbers"),
        }
    }
    Value::Number(sum)
}

fn sub(ctx: &Context, scope: &Scope, call: &Value) -> Value {
    let evaluated = eval_all(ctx, scope, &args(call));
    if evaluated.is_empty() {
        return wrong_arity(ctx, "-");
    }
    let mut iter = evaluated.into_iter();
    let first = match iter.next().unwrap().as_number() {
        Some(n) => n,
        None => return type_error(ctx, "'-' requires numbers"),
    };
    let mut result = first;
    for v in iter {
        match v.as_number() {
            Some(n) => result -= n,
            None => return type_error(ctx, "'-' requires numbers"),
        }
    }
    Value::Number(result)
}

fn mul(ctx: &Context, scope: &Scope, call: &Value) -> Value {
    let mut product = 1.0;
    for v in eval_all(ctx, scope, &args(call)) {
        match v.as_number() {
            Some(n) => product *= n,
            None => return type_error(ctx, "'*' requires numbers"),
        }
    }
    Value::Number(product)
}

fn div(ctx: &Context, scope: &Scope, call: &Value) -> Value {
    let a = args(call);
    if a.len() != 2 {
        return wrong_arity(ctx, "/");
    }
    let (l, r) = (evaluate(ctx, scope, &a[0]), evaluate(ctx, scope, &a[1]));
    match (l.as_number(), r.as_number()) {
        (Some(l), Some(r)) => Value::Number(l / r),
        _ => type_error(ctx, "'/' requires numbers"),
    }
}

fn modulo(ctx: &Context, scope: &Scope, call: &Value) -> Value {
    let a = args(call);
    if a.len() != 2 {
        return wrong_arity(ctx, "mod");
    }
    let (l, r) = (evaluate(ctx, scope, &a[0]), evaluate(ctx, scope, &a[1]));
    match (l.as_number(), r.as_number()) {
        (Some(l), Some(r)) => {
            let r = r.trunc() as i64;
            if r == 0 {
                Value::Nil
            } else {
                Value::Number(((l.trunc() as i64) % r) as f64)
            }
        }
        _ => type_error(ctx, "'mod' requires numbers"),
    }
}

fn and(ctx: &Context, scope: &Scope, call: &Value) -> Value {
    for a in args(call) {
        if !evaluate(ctx, scope, &a).truthy() {
            return Value::Nil;
        }
    }
    TRUE
}

fn or(ctx: &Context, scope: &Scope, call: &Value) -> Value {
    for a in args(call) {
        if evaluate(ctx, scope, &a).truthy() {
            return TRUE;
        }
    }
    Value::Nil
}

fn not(ctx: &Context, scope: &Scope, call: &Value) -> Value {
    let a = args(call);
    if a.len() != 1 {
        return wrong_arity(ctx, "not");
    }
    bool_value(!evaluate(ctx, scope, &a[0]).truthy())
}

fn if_form(ctx: &Context, scope: &Scope, call: &Value) -> Value {
    let a = args(call);
    if a.len() != 2 && a.len() != 3 {
        return wrong_arity(ctx, "if");
    }
    if evaluate(ctx, scope, &a[0]).truthy() {
        evaluate(ctx, scope, &a[1])
    } else if a.len() == 3 {
        evaluate(ctx, scope, &a[2])
    } else {
        Value::Nil
    }
}

fn begin(ctx: &Context, scope: &Scope, call: &Value) -> Value {
    let frame = scope.child();
    ctx.push_scope(frame.clone());
    let mut result = Value::Nil;
    for form in args(call) {
        result = evaluate(ctx, &frame, &form);
    }
    ctx.pop_scope();
    frame.leave();
    result
}

fn define(ctx: &Context, scope: &Scope, call: &Value) -> Value {
    let a = args(call);
    if a.len() != 2 {
        return wrong_arity(ctx, "define");
    }
    let name = match a[0].as_variable() {
        Some(n) => Rc::<str>::from(n),
        None => return type_error(ctx, "'define' requires a variable name as its first argument"),
    };
    let value = evaluate(ctx, scope, &a[1]);
    scope.define(Some(&name), value.clone());
    value
}

fn lambda(ctx: &Context, scope: &Scope, call: &Value) -> Value {
    let mut a = args(call);
    if a.is_empty() {
        return wrong_arity(ctx, "lambda");
    }
    let params_list = a.remove(0);
    if !params_list.is_list() {
        return type_error(ctx, "'lambda' requires a parameter list as its first argument");
    }
    let mut params = Vec::new();
    for p in params_list.iter_list() {
        match p.as_variable() {
            Some(n) => params.push(Rc::<str>::from(n)),
            None => return type_error(ctx, "lambda parameters must be variable names"),
        }
    }
    Value::Lambda(Rc::new(crate::value::LambdaData { env: scope.clone(), params, body: a }))
}

fn list(ctx: &Context, scope: &Scope, call: &Value) -> Value {
    Value::list(eval_all(ctx, scope, &args(call)))
}

fn cons(ctx: &Context, scope: &Scope, call: &Value) -> Value {
    let a = args(call);
    if a.len() != 2 {
        return wrong_arity(ctx, "cons");
    }
    let head = evaluate(ctx, scope, &a[0]);
    let tail = evaluate(ctx, scope, &a[1]);
    match tail {
        Value::List(next) => Value::List(Rc::new(crate::value::ConsCell { head, next: Some(next) })),
        Value::Nil => Value::List(Rc::new(crate::value::ConsCell { head, next: None })),
        _ => type_error(ctx, "'cons' requires a list (or nil) as its second argument"),
    }
}

fn head(ctx: &Context, scope: &Scope, call: &Value) -> Value {
    let a = args(call);
    if a.len() != 1 {
        return wrong_arity(ctx, "head");
    }
    let v = evaluate(ctx, scope, &a[0]);
    if !v.is_list() {
        return type_error(ctx, "'head' requires a list");
    }
    v.head().unwrap_or(Value::Nil)
}

fn rest(ctx: &Context, scope: &Scope, call: &Value) -> Value {
    let a = args(call);
    if a.len() != 1 {
        return wrong_arity(ctx, "rest");
    }
    let v = evaluate(ctx, scope, &a[0]);
    if !v.is_list() {
        return type_error(ctx, "'rest' requires a list");
    }
    v.rest().unwrap_or(Value::Nil)
}

fn char_at(ctx: &Context, scope: &Scope, call: &Value) -> Value {
    let a = args(call);
    if a.len() != 2 {
        return wrong_arity(ctx, "char");
    }
    let s = evaluate(ctx, scope, &a[0]);
    let i = evaluate(ctx, scope, &a[1]);
    match (s.as_str(), i.as_number()) {
        (Some(s), Some(i)) => {
            let chars: Vec<char> = s.chars().collect();
            let idx = i as i64;
            if idx < 0 || idx as usize >= chars.len() {
                Value::Nil
            } else {
                Value::string(chars[idx as usize].to_string())
            }
        }
        _ => type_error(ctx, "'char' requires a string and a number"),
    }
}

fn substr(ctx: &Context, scope: &Scope, call: &Value) -> Value {
    let a = args(call);
    if a.len() != 2 && a.len() != 3 {
        return wrong_arity(ctx, "substr");
    }
    let s = evaluate(ctx, scope, &a[0]);
    let start = evaluate(ctx, scope, &a[1]);
    let (s, start) = match (s.as_str(), start.as_number()) {
        (Some(s), Some(start)) => (s, start),
        _ => return type_error(ctx, "'substr' requires a string and a number"),
    };
    let chars: Vec<char> = s.chars().collect();
    let start_idx = start as i64;
    if start_idx < 0 || start_idx as usize >= chars.len() {
        return Value::Nil;
    }
    let start_idx = start_idx as usize;
    let len = if a.len() == 3 {
        match evaluate(ctx, scope, &a[2]).as_number() {
            Some(n) => n as i64,
            None => return type_error(ctx, "'substr' requires a number length"),
        }
    } else {
        (chars.len() - start_idx) as i64
    };
    let len = len.max(0) as usize;
    let end = (start_idx + len).min(chars.len());
    Value::string(chars[start_idx..end].iter().collect::<String>())
}

fn concat(ctx: &Context, scope: &Scope, call: &Value) -> Value {
    let mut out = String::new();
    for v in eval_all(ctx, scope, &args(call)) {
        match v.as_str() {
            Some(s) => out.push_str(s),
            None => return type_error(ctx, "'concat' requires strings"),
        }
    }
    Value::string(out)
}
