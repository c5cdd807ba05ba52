//! Property tests over arbitrary input, in the spirit of the teacher's own
//! `proptest!` blocks in its lexer/reader tests.

use jl::context::Context;
use jl::parser::Parser;
use jl::value::Value;

use proptest::prelude::*;

proptest! {
    /// However malformed, the parser must never panic: every input either
    /// produces a value or falls back to the advisory diagnostic path.
    #[test]
    fn parser_never_panics_on_arbitrary_input(src in ".*") {
        let mut parser = Parser::new(&src);
        while parser.parse_one().is_some() {}
    }

    /// A finite `f64` printed by this crate's number formatter reads back
    /// as a number close to the original value.
    #[test]
    fn number_round_trips_through_print(n in -1.0e12f64..1.0e12f64) {
        let ctx = Context::new();
        let printed = ctx.print(&Value::Number(n));
        let mut parser = Parser::new(&printed);
        let reparsed = parser.parse_one().expect("printed number reparses");
        match reparsed.as_number() {
            Some(m) => prop_assert!((m - n).abs() <= n.abs().max(1.0) * 1e-9),
            None => prop_assert!(false, "printed form did not parse back as a number"),
        }
    }

    /// A parenthesized list of `n` numbers always parses to a list of
    /// length `n`, regardless of which numbers.
    #[test]
    fn list_of_numbers_has_matching_length(numbers in prop::collection::vec(-1000.0f64..1000.0, 0..20)) {
        let src = format!(
            "({})",
            numbers.iter().map(|n| n.to_string()).collect::<Vec<_>>().join(" ")
        );
        let mut parser = Parser::new(&src);
        let v = parser.parse_one().expect("well-formed list parses");
        prop_assert_eq!(v.list_len(), Some(numbers.len()));
    }
}
