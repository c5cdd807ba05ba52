//! End-to-end snippet tests, one per scenario in SPEC_FULL.md §8, in the
//! spirit of the teacher's own snippet-driven `tests/fledgling.rs` (rewritten
//! against this crate's actual embedding API, which has no lex/parse/
//! desugar/hoist/gen pipeline to drive).

use jl::context::Context;
use jl::parser::Parser;

fn run(ctx: &Context, src: &str) -> String {
    let mut parser = Parser::new(src);
    let mut last = String::from("nil");
    while let Some(expr) = ctx.parse_one(&mut parser) {
        let result = ctx.evaluate(&expr);
        last = ctx.print(&result);
    }
    last
}

#[test]
fn sum_of_three() {
    let ctx = Context::new();
    assert_eq!(run(&ctx, "(+ 1 2 3)"), "6");
}

#[test]
fn define_then_call_a_lambda() {
    let ctx = Context::new();
    assert_eq!(
        run(&ctx, "(define sq (lambda (x) (* x x))) (sq 5)"),
        "25"
    );
}

#[test]
fn if_picks_the_true_branch() {
    let ctx = Context::new();
    assert_eq!(run(&ctx, "(if (< 2 3) \"yes\" \"no\")"), "\"yes\"");
}

#[test]
fn recursive_factorial() {
    let ctx = Context::new();
    assert_eq!(
        run(
            &ctx,
            "(define f (lambda (n) (if (<= n 1) 1 (* n (f (- n 1)))))) (f 6)"
        ),
        "720"
    );
}

#[test]
fn head_of_rest_of_a_list() {
    let ctx = Context::new();
    assert_eq!(run(&ctx, "(head (rest (list 10 20 30)))"), "20");
}

#[test]
fn concat_and_substr() {
    let ctx = Context::new();
    assert_eq!(run(&ctx, r#"(concat "a" (substr "hello" 1 3))"#), "\"aell\"");
}

#[test]
fn closures_capture_their_defining_scope_not_the_call_site() {
    let ctx = Context::new();
    run(&ctx, "(define x 1)");
    run(&ctx, "(define get-x (lambda () x))");
    // A nested scope that shadows `x` must not affect `get-x`'s result:
    // `get-x` was defined where `x` was 1, and that's what it should see
    // even when called from somewhere `x` means something else.
    assert_eq!(
        run(&ctx, "(begin (define x 2) (get-x))"),
        "1"
    );
}

#[test]
fn recursion_bound_terminates_instead_of_overflowing_the_stack() {
    let ctx = Context::new();
    run(&ctx, "(define loop (lambda (n) (loop (+ n 1))))");
    assert_eq!(run(&ctx, "(loop 0)"), "nil");
}

#[test]
fn mutual_arity_errors_return_nil_not_a_panic() {
    let ctx = Context::new();
    run(&ctx, "(define one-arg (lambda (x) x))");
    assert_eq!(run(&ctx, "(one-arg 1 2)"), "nil");
    assert_eq!(run(&ctx, "(one-arg)"), "nil");
}

#[test]
fn string_type_predicates() {
    let ctx = Context::new();
    assert_eq!(run(&ctx, r#"(string? "hi")"#), "1");
    assert_eq!(run(&ctx, "(number? \"hi\")"), "nil");
    assert_eq!(run(&ctx, "(list? (list 1 2))"), "1");
    assert_eq!(run(&ctx, "(null? nil)"), "1");
}
