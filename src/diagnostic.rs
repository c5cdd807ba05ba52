//! A line-tagged, advisory-only diagnostic sink.
//!
//! Errors in JL are never exceptions: a diagnostic is reported and the
//! offending operation falls back to `Nil`/`None`. This module is the
//! single place that formatting happens, routed through the `log` crate the
//! way `fatho-syn-txt` and `passerine-aspen` structure their own CLI
//! diagnostics, rather than printing directly to stderr.

/// Report a recoverable error tagged with the source line it occurred on.
pub fn error(line: usize, message: impl AsRef<str>) {
    log::warn!("line {}: {}", line, message.as_ref());
}

/// Report a parse-time failure; parse errors always abort the current
/// top-level expression, so they're logged at a higher severity than a
/// runtime builtin misuse.
pub fn parse_error(line: usize, message: impl AsRef<str>) {
    log::error!("line {}: {}", line, message.as_ref());
}
