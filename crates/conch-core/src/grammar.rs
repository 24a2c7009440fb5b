// crates/conch-core/src/grammar.rs - Parsing grammar and argument parsing
//
// The grammar is a pure configuration struct shared by every command in one
// dispatcher instance. It controls two things:
//
// 1. How a raw line is split into a command name and argument text.
// 2. How argument text is split into either a name->value mapping (keyed
//    style) or an ordered list of tokens (positional style).
//
// Parsing is a single pass over the argument text. No quoting or escaping is
// supported; delimiters always split.
//
// LINE FORMAT:
//   <alias>[<command_separator><argument text>]
//
// Default separators: `|` between command and arguments; in keyed style ` `
// between pairs and `=` between key and value; in positional style `,`
// between values.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors that can occur while validating a grammar
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GrammarError {
    #[error("Empty {role} delimiter")]
    EmptyDelimiter { role: &'static str },

    #[error("Pair delimiter {pair:?} must differ from key-value delimiter {key_value:?}")]
    DelimiterClash { pair: String, key_value: String },
}

/// Result type for grammar validation
pub type GrammarResult<T> = Result<T, GrammarError>;

/// Errors that can occur while parsing argument text
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// A keyed fragment carried no value after the key-value delimiter.
    ///
    /// An omitted optional argument must be omitted entirely; `key=` with an
    /// empty value is rejected rather than treated as an omission.
    #[error("Argument fragment {0:?} has no value")]
    MalformedArgument(String),
}

/// Result type for argument parsing
pub type ParseResult<T> = Result<T, ParseError>;

/// Shape of parsed arguments: a name->value mapping or an ordered list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgumentStyle {
    /// `name=value` pairs, producing a mapping
    #[default]
    Keyed,
    /// Delimited values, producing an ordered sequence
    Positional,
}

impl fmt::Display for ArgumentStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Keyed => "keyed",
            Self::Positional => "positional",
        })
    }
}

/// Delimiter configuration for one dispatcher instance
///
/// All fields are plain data so a grammar can be loaded from configuration,
/// snapshotted into history entries, and compared in tests. A grammar must
/// pass [`Grammar::validate`] before the dispatcher accepts it.
///
/// Delimiters are full strings, not single characters, so multi-character
/// separators like `::` or `->` work without special handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grammar {
    /// Argument parsing style for every command in the dispatcher
    #[serde(default)]
    pub style: ArgumentStyle,

    /// Delimiter between the command name and the argument text
    #[serde(default = "default_command_separator")]
    pub command_separator: String,

    /// Delimiter between an argument's key and value (keyed style)
    #[serde(default = "default_key_value_separator")]
    pub key_value_separator: String,

    /// Delimiter between key-value pairs (keyed style)
    #[serde(default = "default_pair_separator")]
    pub pair_separator: String,

    /// Delimiter between positional values (positional style)
    #[serde(default = "default_list_separator")]
    pub list_separator: String,
}

fn default_command_separator() -> String {
    "|".to_string()
}
fn default_key_value_separator() -> String {
    "=".to_string()
}
fn default_pair_separator() -> String {
    " ".to_string()
}
fn default_list_separator() -> String {
    ",".to_string()
}

impl Default for Grammar {
    fn default() -> Self {
        Self {
            style: ArgumentStyle::default(),
            command_separator: default_command_separator(),
            key_value_separator: default_key_value_separator(),
            pair_separator: default_pair_separator(),
            list_separator: default_list_separator(),
        }
    }
}

impl Grammar {
    /// Default grammar in keyed style: `add|op1=3 op2=4`
    pub fn keyed() -> Self {
        Self::default()
    }

    /// Default grammar in positional style: `add|3,4`
    pub fn positional() -> Self {
        Self {
            style: ArgumentStyle::Positional,
            ..Self::default()
        }
    }

    /// Check that the delimiters can actually drive a parse
    ///
    /// Every delimiter must be non-empty. In keyed style the pair delimiter
    /// and the key-value delimiter must differ, otherwise `a=1 b=2` has no
    /// unambiguous reading. The command separator may coincide with argument
    /// delimiters since the line is split before argument parsing begins.
    pub fn validate(&self) -> GrammarResult<()> {
        let delimiters = [
            ("command", &self.command_separator),
            ("key-value", &self.key_value_separator),
            ("pair", &self.pair_separator),
            ("list", &self.list_separator),
        ];
        for (role, delimiter) in delimiters {
            if delimiter.is_empty() {
                return Err(GrammarError::EmptyDelimiter { role });
            }
        }

        if self.style == ArgumentStyle::Keyed && self.pair_separator == self.key_value_separator {
            return Err(GrammarError::DelimiterClash {
                pair: self.pair_separator.clone(),
                key_value: self.key_value_separator.clone(),
            });
        }

        Ok(())
    }

    /// Split a raw line into a command name and optional argument text
    ///
    /// Leading command separators are skipped, the next segment is the
    /// command name, and everything after the separator that follows it is
    /// the argument text. Returns `None` when the line holds no non-empty
    /// segment at all.
    pub(crate) fn split_line<'a>(&self, line: &'a str) -> Option<(&'a str, Option<&'a str>)> {
        let separator = self.command_separator.as_str();

        let mut rest = line;
        while let Some(stripped) = rest.strip_prefix(separator) {
            rest = stripped;
        }
        if rest.is_empty() {
            return None;
        }

        match rest.split_once(separator) {
            Some((name, mut tail)) => {
                while let Some(stripped) = tail.strip_prefix(separator) {
                    tail = stripped;
                }
                Some((name, (!tail.is_empty()).then_some(tail)))
            }
            None => Some((rest, None)),
        }
    }

    /// Parse argument text into the shape selected by the style
    pub fn parse_arguments(&self, text: &str) -> ParseResult<Arguments> {
        match self.style {
            ArgumentStyle::Keyed => self.parse_keyed(text).map(Arguments::Keyed),
            ArgumentStyle::Positional => Ok(Arguments::Positional(self.parse_positional(text))),
        }
    }

    /// Keyed parse: `op1=3 op2=4` -> `{op1: "3", op2: "4"}`
    ///
    /// Empty fragments and empty pieces around the key-value delimiter are
    /// discarded, so repeated delimiters are tolerated. A fragment that
    /// yields a key but no value is malformed. When the same key appears
    /// twice the last occurrence wins and the first occurrence keeps its
    /// position in the mapping.
    fn parse_keyed(&self, text: &str) -> ParseResult<IndexMap<String, String>> {
        let mut arguments = IndexMap::new();

        for fragment in text
            .split(self.pair_separator.as_str())
            .filter(|fragment| !fragment.is_empty())
        {
            let mut pieces = fragment
                .split(self.key_value_separator.as_str())
                .filter(|piece| !piece.is_empty());

            let key = pieces
                .next()
                .ok_or_else(|| ParseError::MalformedArgument(fragment.to_string()))?;
            let value = pieces
                .next()
                .ok_or_else(|| ParseError::MalformedArgument(fragment.to_string()))?;

            arguments.insert(key.to_string(), value.to_string());
        }

        Ok(arguments)
    }

    /// Positional parse: `3,4` -> `["3", "4"]`, empty fragments discarded
    fn parse_positional(&self, text: &str) -> Vec<String> {
        text.split(self.list_separator.as_str())
            .filter(|fragment| !fragment.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Parsed arguments in the shape the active grammar produced
///
/// Serializes untagged: a keyed set becomes a JSON object, a positional set
/// becomes a JSON array.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Arguments {
    /// Name->value mapping, insertion order preserved
    Keyed(IndexMap<String, String>),
    /// Ordered sequence of raw tokens
    Positional(Vec<String>),
}

impl Arguments {
    /// Empty argument set of the given style
    pub fn empty(style: ArgumentStyle) -> Self {
        match style {
            ArgumentStyle::Keyed => Self::Keyed(IndexMap::new()),
            ArgumentStyle::Positional => Self::Positional(Vec::new()),
        }
    }

    /// Number of arguments present
    pub fn len(&self) -> usize {
        match self {
            Self::Keyed(map) => map.len(),
            Self::Positional(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The style this argument set was parsed under
    pub fn style(&self) -> ArgumentStyle {
        match self {
            Self::Keyed(_) => ArgumentStyle::Keyed,
            Self::Positional(_) => ArgumentStyle::Positional,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn keyed(pairs: &[(&str, &str)]) -> Arguments {
        Arguments::Keyed(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_default_grammar() {
        let grammar = Grammar::default();
        assert_eq!(grammar.style, ArgumentStyle::Keyed);
        assert_eq!(grammar.command_separator, "|");
        assert_eq!(grammar.key_value_separator, "=");
        assert_eq!(grammar.pair_separator, " ");
        assert_eq!(grammar.list_separator, ",");
        assert!(grammar.validate().is_ok());
        assert!(Grammar::positional().validate().is_ok());
    }

    #[test]
    fn test_split_line_basic() {
        let grammar = Grammar::default();
        assert_eq!(
            grammar.split_line("add|op1=3 op2=4"),
            Some(("add", Some("op1=3 op2=4")))
        );
        assert_eq!(grammar.split_line("status"), Some(("status", None)));
        assert_eq!(grammar.split_line("status|"), Some(("status", None)));
    }

    #[test]
    fn test_split_line_separator_runs() {
        let grammar = Grammar::default();
        // Leading separators are skipped to find the command name.
        assert_eq!(grammar.split_line("|add|op1=3"), Some(("add", Some("op1=3"))));
        // Separator runs after the name are collapsed.
        assert_eq!(grammar.split_line("add||op1=3"), Some(("add", Some("op1=3"))));
        // Later separators belong to the argument text.
        assert_eq!(
            grammar.split_line("add|op1=3|op2=4"),
            Some(("add", Some("op1=3|op2=4")))
        );
    }

    #[test]
    fn test_split_line_empty() {
        let grammar = Grammar::default();
        assert_eq!(grammar.split_line(""), None);
        assert_eq!(grammar.split_line("|"), None);
        assert_eq!(grammar.split_line("|||"), None);
    }

    #[test]
    fn test_split_line_multichar_separator() {
        let grammar = Grammar {
            command_separator: "::".to_string(),
            ..Grammar::default()
        };
        assert_eq!(grammar.split_line("add::op1=3"), Some(("add", Some("op1=3"))));
        assert_eq!(grammar.split_line("add:op1"), Some(("add:op1", None)));
    }

    #[test]
    fn test_parse_keyed() {
        let grammar = Grammar::default();
        assert_eq!(
            grammar.parse_arguments("op1=3 op2=4").unwrap(),
            keyed(&[("op1", "3"), ("op2", "4")])
        );
        // Repeated pair delimiters are tolerated.
        assert_eq!(
            grammar.parse_arguments("op1=3   op2=4 ").unwrap(),
            keyed(&[("op1", "3"), ("op2", "4")])
        );
        // Repeated key-value delimiters collapse.
        assert_eq!(grammar.parse_arguments("op1==3").unwrap(), keyed(&[("op1", "3")]));
        assert_eq!(grammar.parse_arguments("").unwrap(), keyed(&[]));
    }

    #[test]
    fn test_parse_keyed_duplicate_key_last_wins() {
        let grammar = Grammar::default();
        let parsed = grammar.parse_arguments("a=1 b=2 a=3").unwrap();
        assert_eq!(parsed, keyed(&[("a", "3"), ("b", "2")]));
        // First occurrence keeps its position.
        match parsed {
            Arguments::Keyed(map) => {
                assert_eq!(map.get_index(0), Some((&"a".to_string(), &"3".to_string())));
            }
            Arguments::Positional(_) => unreachable!(),
        }
    }

    #[test]
    fn test_parse_keyed_malformed() {
        let grammar = Grammar::default();
        for text in ["op1=", "op1", "=op1", "a=1 op2="] {
            match grammar.parse_arguments(text) {
                Err(ParseError::MalformedArgument(_)) => {}
                other => panic!("expected MalformedArgument for {text:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_parse_positional() {
        let grammar = Grammar::positional();
        assert_eq!(
            grammar.parse_arguments("3,4").unwrap(),
            Arguments::Positional(vec!["3".to_string(), "4".to_string()])
        );
        // Empty fragments discarded, order preserved.
        assert_eq!(
            grammar.parse_arguments(",c,,a,b,").unwrap(),
            Arguments::Positional(vec!["c".to_string(), "a".to_string(), "b".to_string()])
        );
        assert_eq!(grammar.parse_arguments("").unwrap(), Arguments::Positional(vec![]));
    }

    #[test]
    fn test_validate_rejects_empty_delimiter() {
        let grammar = Grammar {
            command_separator: String::new(),
            ..Grammar::default()
        };
        assert_eq!(
            grammar.validate(),
            Err(GrammarError::EmptyDelimiter { role: "command" })
        );
    }

    #[test]
    fn test_validate_rejects_delimiter_clash() {
        let grammar = Grammar {
            pair_separator: "=".to_string(),
            ..Grammar::default()
        };
        assert!(matches!(
            grammar.validate(),
            Err(GrammarError::DelimiterClash { .. })
        ));

        // The clash only matters in keyed style.
        let positional = Grammar {
            pair_separator: "=".to_string(),
            ..Grammar::positional()
        };
        assert!(positional.validate().is_ok());
    }

    #[test]
    fn test_arguments_len_and_style() {
        let empty = Arguments::empty(ArgumentStyle::Keyed);
        assert!(empty.is_empty());
        assert_eq!(empty.style(), ArgumentStyle::Keyed);

        let positional = Arguments::Positional(vec!["3".to_string()]);
        assert_eq!(positional.len(), 1);
        assert_eq!(positional.style(), ArgumentStyle::Positional);
    }

    proptest! {
        // Parsing is a left-inverse of a canonical re-join for mappings with
        // no empty keys or values and no delimiter characters inside them.
        #[test]
        fn test_keyed_parse_inverts_join(
            map in proptest::collection::hash_map("[a-z][a-z0-9]{0,7}", "[A-Za-z0-9]{1,8}", 0..8)
        ) {
            let grammar = Grammar::default();
            let joined = map
                .iter()
                .map(|(key, value)| format!("{key}={value}"))
                .collect::<Vec<_>>()
                .join(" ");

            match grammar.parse_arguments(&joined).unwrap() {
                Arguments::Keyed(parsed) => {
                    prop_assert_eq!(parsed.len(), map.len());
                    for (key, value) in &map {
                        prop_assert_eq!(parsed.get(key.as_str()), Some(value));
                    }
                }
                Arguments::Positional(_) => prop_assert!(false, "keyed grammar produced positional"),
            }
        }

        #[test]
        fn test_positional_parse_inverts_join(
            values in proptest::collection::vec("[A-Za-z0-9]{1,8}", 0..8)
        ) {
            let grammar = Grammar::positional();
            let joined = values.join(",");
            prop_assert_eq!(
                grammar.parse_arguments(&joined).unwrap(),
                Arguments::Positional(values)
            );
        }
    }
}
