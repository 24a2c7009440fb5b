// crates/conch-core/src/command.rs - Command descriptions for registration
//
// A `Command` is everything the dispatcher needs to register one operation:
// an alias list (the first alias is canonical), the declared parameter list
// the contract is derived from, and the operation itself.
//
// Operations come in exactly two shapes, selected when the command is built:
// keyed operations receive a name->value mapping, positional operations
// receive an ordered token slice. The dispatcher only accepts a command
// whose shape matches the active grammar style, so an operation never sees
// arguments in the wrong shape.

use std::fmt;

use indexmap::IndexMap;
use serde_json::Value;

use crate::contract::Param;
use crate::grammar::{ArgumentStyle, Arguments};

/// Boxed callable receiving keyed arguments
pub type KeyedFn = Box<dyn FnMut(&IndexMap<String, String>) -> anyhow::Result<Value>>;

/// Boxed callable receiving positional arguments
pub type PositionalFn = Box<dyn FnMut(&[String]) -> anyhow::Result<Value>>;

/// A registered operation in one of the two capability shapes
///
/// Operations return `serde_json::Value`; the dispatcher never inspects it,
/// and `Value::Null` is the conventional "no result". A returned `Err` is an
/// operation fault and propagates to the caller unmodified.
pub enum Operation {
    Keyed(KeyedFn),
    Positional(PositionalFn),
}

impl Operation {
    pub fn keyed<F>(operation: F) -> Self
    where
        F: FnMut(&IndexMap<String, String>) -> anyhow::Result<Value> + 'static,
    {
        Self::Keyed(Box::new(operation))
    }

    pub fn positional<F>(operation: F) -> Self
    where
        F: FnMut(&[String]) -> anyhow::Result<Value> + 'static,
    {
        Self::Positional(Box::new(operation))
    }

    /// Argument shape this operation expects
    pub fn style(&self) -> ArgumentStyle {
        match self {
            Self::Keyed(_) => ArgumentStyle::Keyed,
            Self::Positional(_) => ArgumentStyle::Positional,
        }
    }

    /// Invoke with already-validated arguments
    ///
    /// The dispatcher guarantees the argument shape matches this operation's
    /// shape (checked at registration and on every grammar change).
    pub(crate) fn invoke(&mut self, arguments: &Arguments) -> anyhow::Result<Value> {
        match (self, arguments) {
            (Self::Keyed(operation), Arguments::Keyed(map)) => operation(map),
            (Self::Positional(operation), Arguments::Positional(values)) => operation(values),
            _ => unreachable!("operation shape is checked against the grammar at registration"),
        }
    }
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Operation").field(&self.style()).finish()
    }
}

/// A fully described registration request for [`crate::Dispatcher::register`]
#[derive(Debug)]
pub struct Command {
    pub(crate) names: Vec<String>,
    pub(crate) params: Vec<Param>,
    pub(crate) operation: Operation,
}

impl Command {
    /// Start describing a command under its canonical name
    pub fn new(name: impl Into<String>) -> CommandBuilder {
        CommandBuilder {
            names: vec![name.into()],
            params: Vec::new(),
        }
    }

    /// Canonical name followed by any aliases
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

/// Builder for [`Command`], finished by choosing the operation shape
#[derive(Debug)]
pub struct CommandBuilder {
    names: Vec<String>,
    params: Vec<Param>,
}

impl CommandBuilder {
    /// Add an alias that resolves to this command
    pub fn alias(mut self, name: impl Into<String>) -> Self {
        self.names.push(name.into());
        self
    }

    /// Declare a parameter with no default value
    pub fn required(mut self, name: impl Into<String>) -> Self {
        self.params.push(Param::required(name));
        self
    }

    /// Declare a parameter with a default value
    pub fn optional(mut self, name: impl Into<String>) -> Self {
        self.params.push(Param::optional(name));
        self
    }

    /// Finish with an explicitly constructed operation
    pub fn operation(self, operation: Operation) -> Command {
        Command {
            names: self.names,
            params: self.params,
            operation,
        }
    }

    /// Finish with a keyed operation
    pub fn keyed<F>(self, operation: F) -> Command
    where
        F: FnMut(&IndexMap<String, String>) -> anyhow::Result<Value> + 'static,
    {
        self.operation(Operation::keyed(operation))
    }

    /// Finish with a positional operation
    pub fn positional<F>(self, operation: F) -> Command
    where
        F: FnMut(&[String]) -> anyhow::Result<Value> + 'static,
    {
        self.operation(Operation::positional(operation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::indexmap;
    use serde_json::json;

    #[test]
    fn test_builder_collects_names_in_order() {
        let command = Command::new("multiply")
            .alias("mul")
            .alias("times")
            .required("op1")
            .required("op2")
            .keyed(|_| Ok(Value::Null));

        assert_eq!(command.names(), ["multiply", "mul", "times"]);
        assert_eq!(command.operation.style(), ArgumentStyle::Keyed);
    }

    #[test]
    fn test_operation_styles() {
        let keyed = Operation::keyed(|_| Ok(Value::Null));
        let positional = Operation::positional(|_| Ok(Value::Null));
        assert_eq!(keyed.style(), ArgumentStyle::Keyed);
        assert_eq!(positional.style(), ArgumentStyle::Positional);
        assert_eq!(format!("{keyed:?}"), "Operation(Keyed)");
    }

    #[test]
    fn test_invoke_matching_shapes() {
        let mut keyed = Operation::keyed(|args| Ok(json!(args.len())));
        let arguments = Arguments::Keyed(indexmap! {
            "a".to_string() => "1".to_string(),
        });
        assert_eq!(keyed.invoke(&arguments).unwrap(), json!(1));

        let mut positional = Operation::positional(|values| Ok(json!(values.join("+"))));
        let arguments = Arguments::Positional(vec!["3".to_string(), "4".to_string()]);
        assert_eq!(positional.invoke(&arguments).unwrap(), json!("3+4"));
    }
}
