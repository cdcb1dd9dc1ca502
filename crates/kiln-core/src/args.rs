//! Parsed argument model and argv scanner.
//!
//! The dispatcher works on a loose argument shape: ordered positional
//! tokens plus a map of option values. Option values are coerced to
//! booleans and numbers where the raw token allows it, and stay strings
//! otherwise. The verb surface is discovered at runtime from plugin
//! manifests, so the scanner is hand-built rather than derived.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single option value: string, boolean, or number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    /// Boolean flag value.
    Bool(bool),

    /// Numeric value.
    Number(f64),

    /// String value.
    String(String),
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(v) => write!(f, "{}", v),
            OptionValue::Number(v) => {
                if v.fract() == 0.0 {
                    write!(f, "{}", *v as i64)
                } else {
                    write!(f, "{}", v)
                }
            }
            OptionValue::String(v) => write!(f, "{}", v),
        }
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::String(value.to_string())
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        OptionValue::Bool(value)
    }
}

impl From<f64> for OptionValue {
    fn from(value: f64) -> Self {
        OptionValue::Number(value)
    }
}

/// Coerces a raw token into a typed option value.
fn coerce(raw: &str) -> OptionValue {
    match raw {
        "true" => OptionValue::Bool(true),
        "false" => OptionValue::Bool(false),
        _ => raw
            .parse::<f64>()
            .map_or_else(|_| OptionValue::String(raw.to_string()), OptionValue::Number),
    }
}

/// Parsed command-line arguments.
///
/// Positional tokens keep their order; option keys keep first-seen
/// order. The first one or two positional tokens address a group and
/// command; `consumed` records how many of them the dispatcher matched
/// as verbs, so handlers can see only the trailing operands.
#[derive(Debug, Clone, Default)]
pub struct ParsedArgs {
    positionals: Vec<String>,
    options: IndexMap<String, OptionValue>,
    help: bool,
    consumed: usize,
}

impl ParsedArgs {
    /// Creates an empty argument set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scans an argv slice (without the program name) into arguments.
    ///
    /// Recognized forms: `--key=value`, `--key value`, `--flag`,
    /// `-k value`, `-k`, and `--` to end option parsing. `-h` and
    /// `--help` set the help flag instead of becoming options.
    pub fn parse(argv: &[String]) -> Self {
        let mut args = Self::new();
        let mut iter = argv.iter().peekable();
        let mut options_done = false;

        while let Some(token) = iter.next() {
            if options_done {
                args.positionals.push(token.clone());
                continue;
            }
            if token == "--" {
                options_done = true;
                continue;
            }
            if token == "-h" || token == "--help" {
                args.help = true;
                continue;
            }
            if let Some(stripped) = token.strip_prefix("--").or_else(|| token.strip_prefix('-')) {
                if stripped.is_empty() {
                    args.positionals.push(token.clone());
                    continue;
                }
                if let Some((key, value)) = stripped.split_once('=') {
                    args.options.insert(key.to_string(), coerce(value));
                    continue;
                }
                // A bare flag consumes the next token as its value
                // unless that token is itself an option.
                match iter.peek() {
                    Some(next) if !next.starts_with('-') => {
                        let value = iter.next().unwrap();
                        args.options.insert(stripped.to_string(), coerce(value));
                    }
                    _ => {
                        args.options.insert(stripped.to_string(), OptionValue::Bool(true));
                    }
                }
                continue;
            }
            args.positionals.push(token.clone());
        }

        args
    }

    /// Returns all positional tokens.
    pub fn positionals(&self) -> &[String] {
        &self.positionals
    }

    /// Returns the positional token at `index`, if present.
    pub fn positional(&self, index: usize) -> Option<&str> {
        self.positionals.get(index).map(String::as_str)
    }

    /// Appends a positional token.
    pub fn push_positional(&mut self, token: impl Into<String>) {
        self.positionals.push(token.into());
    }

    /// Returns the option map in first-seen order.
    pub fn options(&self) -> &IndexMap<String, OptionValue> {
        &self.options
    }

    /// Returns the value for `key`, if present.
    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.options.get(key)
    }

    /// Returns true if `key` was supplied.
    pub fn contains(&self, key: &str) -> bool {
        self.options.contains_key(key)
    }

    /// Sets (or overrides) an option value.
    pub fn set(&mut self, key: impl Into<String>, value: OptionValue) {
        self.options.insert(key.into(), value);
    }

    /// Returns true if `-h`/`--help` was supplied.
    pub fn help_requested(&self) -> bool {
        self.help
    }

    /// Marks the first `count` positional tokens as matched verbs.
    pub fn set_consumed(&mut self, count: usize) {
        self.consumed = count.min(self.positionals.len());
    }

    /// Returns the positional tokens after the matched verbs.
    pub fn tail(&self) -> &[String] {
        &self.positionals[self.consumed..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_parse_positionals() {
        let args = ParsedArgs::parse(&argv(&["build", "webpack"]));
        assert_eq!(args.positionals(), &["build", "webpack"]);
        assert!(args.options().is_empty());
        assert!(!args.help_requested());
    }

    #[test]
    fn test_parse_long_option_with_value() {
        let args = ParsedArgs::parse(&argv(&["build", "--mode", "production"]));
        assert_eq!(args.get("mode"), Some(&OptionValue::String("production".to_string())));
    }

    #[test]
    fn test_parse_equals_form() {
        let args = ParsedArgs::parse(&argv(&["build", "--mode=dev"]));
        assert_eq!(args.get("mode"), Some(&OptionValue::String("dev".to_string())));
    }

    #[test]
    fn test_parse_bare_flag_is_true() {
        let args = ParsedArgs::parse(&argv(&["build", "--watch"]));
        assert_eq!(args.get("watch"), Some(&OptionValue::Bool(true)));
    }

    #[test]
    fn test_parse_flag_before_another_flag() {
        let args = ParsedArgs::parse(&argv(&["--watch", "--mode", "dev"]));
        assert_eq!(args.get("watch"), Some(&OptionValue::Bool(true)));
        assert_eq!(args.get("mode"), Some(&OptionValue::String("dev".to_string())));
    }

    #[test]
    fn test_parse_short_option() {
        let args = ParsedArgs::parse(&argv(&["-m", "dev"]));
        assert_eq!(args.get("m"), Some(&OptionValue::String("dev".to_string())));
    }

    #[test]
    fn test_parse_help_flags() {
        assert!(ParsedArgs::parse(&argv(&["-h"])).help_requested());
        assert!(ParsedArgs::parse(&argv(&["build", "--help"])).help_requested());
    }

    #[test]
    fn test_parse_number_and_bool_coercion() {
        let args = ParsedArgs::parse(&argv(&["--port", "8080", "--strict", "false"]));
        assert_eq!(args.get("port"), Some(&OptionValue::Number(8080.0)));
        assert_eq!(args.get("strict"), Some(&OptionValue::Bool(false)));
    }

    #[test]
    fn test_parse_double_dash_ends_options() {
        let args = ParsedArgs::parse(&argv(&["run", "--", "--not-an-option"]));
        assert_eq!(args.positionals(), &["run", "--not-an-option"]);
        assert!(args.options().is_empty());
    }

    #[test]
    fn test_set_overrides_existing_value() {
        let mut args = ParsedArgs::parse(&argv(&["--mode", "dev"]));
        args.set("mode", OptionValue::String("production".to_string()));
        assert_eq!(args.get("mode"), Some(&OptionValue::String("production".to_string())));
    }

    #[test]
    fn test_tail_skips_consumed_verbs() {
        let mut args = ParsedArgs::parse(&argv(&["build", "webpack", "src/main.ts"]));
        args.set_consumed(2);
        assert_eq!(args.tail(), &["src/main.ts"]);
    }

    #[test]
    fn test_option_value_display() {
        assert_eq!(OptionValue::String("dev".to_string()).to_string(), "dev");
        assert_eq!(OptionValue::Bool(true).to_string(), "true");
        assert_eq!(OptionValue::Number(8080.0).to_string(), "8080");
        assert_eq!(OptionValue::Number(1.5).to_string(), "1.5");
    }
}
