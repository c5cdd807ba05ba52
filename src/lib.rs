//! # JL
//!
//! A small embeddable interpreter for the JL Lisp-family expression
//! language: textual S-expressions are parsed into a reference-counted
//! value graph, then evaluated under lexical scoping with first-class
//! closures.
//!
//! ## Overview
//!
//! - [`value`] — the `Value` tagged variant and its cons-cell list
//!   representation.
//! - [`scope`] — the lexical scope/binding tree, including the rule that
//!   reclaims the cycle a recursively `define`d lambda forms with its own
//!   captured scope.
//! - [`parser`] — turns source text into `Value`s, one top-level expression
//!   at a time.
//! - [`evaluator`] — dispatches variables, applications, and literals under
//!   a bounded recursion depth, and implements the lambda-call protocol.
//! - [`builtins`] — the built-in special forms (`if`, `lambda`, `define`,
//!   arithmetic, list operations, string operations, …).
//! - [`context`] — the embedding API: create a [`context::Context`],
//!   register host functions, parse and evaluate.
//!
//! ## Embedding JL in Rust
//!
//! ```
//! use jl::context::Context;
//! use jl::parser::Parser;
//!
//! let ctx = Context::new();
//! let mut parser = Parser::new("(+ 1 2 3)");
//! let expr = ctx.parse_one(&mut parser).unwrap();
//! let result = ctx.evaluate(&expr);
//! assert_eq!(ctx.print(&result), "6");
//! ```
//!
//! See `src/main.rs` for the command-line REPL/file-runner built on top of
//! this API.

pub mod builtins;
pub mod context;
pub mod diagnostic;
pub mod evaluator;
pub mod parser;
pub mod scope;
pub mod value;
