// crates/conch-core/src/dispatcher.rs - Command registry and dispatch pipeline
//
// The dispatcher owns three pieces of state: the alias registry, the active
// grammar, and the append-only invocation history. `handle_line` runs the
// whole pipeline synchronously: split the line, look up the command, parse
// the argument text, validate against the contract, invoke, record.
//
// Every dispatch-time failure is detected before the operation runs and
// comes back as a `DispatchError` value; the operation is guaranteed not to
// have been invoked when one fires. Registration-time failures
// (`RegisterError`) come back from `register` and `set_grammar`.
//
// One dispatcher serves one interactive session. There is no internal
// locking; a caller that drives one dispatcher from several threads must
// serialize access externally.

use chrono::Utc;
use indexmap::IndexMap;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, trace};

use crate::command::{Command, Operation};
use crate::contract::{Contract, ContractError, ValidationError};
use crate::grammar::{ArgumentStyle, Arguments, Grammar, GrammarError, ParseError};
use crate::history::HistoryEntry;

/// Errors raised synchronously by `register` and `set_grammar`
#[derive(Error, Debug)]
pub enum RegisterError {
    #[error(transparent)]
    Contract(#[from] ContractError),

    #[error(transparent)]
    Grammar(#[from] GrammarError),

    #[error("Alias already registered: {0}")]
    DuplicateAlias(String),

    #[error("Command {command:?} expects {operation} arguments but the grammar produces {grammar}")]
    StyleMismatch {
        command: String,
        operation: ArgumentStyle,
        grammar: ArgumentStyle,
    },
}

/// Result type for registry mutations
pub type RegisterResult<T> = Result<T, RegisterError>;

/// Structured errors returned by `handle_line`
///
/// All variants except `Operation` are detected before the operation runs.
/// `Operation` wraps a fault from inside the operation itself and passes it
/// through unmodified.
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Unknown command: {0:?}")]
    UnknownCommand(String),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Operation(#[from] anyhow::Error),
}

/// Result type for dispatch
pub type DispatchResult<T> = Result<T, DispatchError>;

/// One registry slot: alias set, contract, operation
#[derive(Debug)]
struct RegisteredCommand {
    names: Vec<String>,
    contract: Contract,
    operation: Operation,
}

impl RegisteredCommand {
    fn canonical_name(&self) -> &str {
        &self.names[0]
    }
}

/// Command registry, parsing grammar, and invocation history for one
/// interactive session
///
/// Commands are stored in registration order; aliases map onto them.
/// Unregistering an alias never moves a command, so the remaining aliases
/// of the same command stay valid.
#[derive(Debug, Default)]
pub struct Dispatcher {
    commands: Vec<RegisteredCommand>,
    aliases: IndexMap<String, usize>,
    grammar: Grammar,
    history: Vec<HistoryEntry>,
}

impl Dispatcher {
    /// Dispatcher with the default keyed grammar
    pub fn new() -> Self {
        Self::default()
    }

    /// Dispatcher with a caller-supplied grammar
    pub fn with_grammar(grammar: Grammar) -> RegisterResult<Self> {
        grammar.validate()?;
        Ok(Self {
            grammar,
            ..Self::default()
        })
    }

    /// Register a command under every one of its aliases
    ///
    /// Derives the contract from the declared parameter list, checks the
    /// operation's shape against the active grammar style, and rejects any
    /// alias that is already taken. On error nothing is inserted.
    pub fn register(&mut self, command: Command) -> RegisterResult<()> {
        let Command {
            names,
            params,
            operation,
        } = command;

        let contract = Contract::from_params(params)?;

        if operation.style() != self.grammar.style {
            return Err(RegisterError::StyleMismatch {
                command: names[0].clone(),
                operation: operation.style(),
                grammar: self.grammar.style,
            });
        }

        for (position, name) in names.iter().enumerate() {
            if names[..position].contains(name) || self.aliases.contains_key(name) {
                return Err(RegisterError::DuplicateAlias(name.clone()));
            }
        }

        debug!(
            command = %names[0],
            aliases = names.len() - 1,
            required = contract.min_args(),
            optional = contract.max_args() - contract.min_args(),
            "registered command"
        );

        let slot = self.commands.len();
        for name in &names {
            self.aliases.insert(name.clone(), slot);
        }
        self.commands.push(RegisteredCommand {
            names,
            contract,
            operation,
        });
        Ok(())
    }

    /// Remove one alias; other aliases of the same command remain valid
    ///
    /// Returns whether the alias was registered.
    pub fn unregister(&mut self, alias: &str) -> bool {
        let removed = self.aliases.shift_remove(alias).is_some();
        if removed {
            debug!(alias, "unregistered alias");
        }
        removed
    }

    /// Replace the active grammar
    ///
    /// The new grammar must validate and its style must match the shape of
    /// every registered operation; on error the old grammar stays active.
    pub fn set_grammar(&mut self, grammar: Grammar) -> RegisterResult<()> {
        grammar.validate()?;
        for command in &self.commands {
            if command.operation.style() != grammar.style {
                return Err(RegisterError::StyleMismatch {
                    command: command.canonical_name().to_string(),
                    operation: command.operation.style(),
                    grammar: grammar.style,
                });
            }
        }
        debug!(style = %grammar.style, "grammar reconfigured");
        self.grammar = grammar;
        Ok(())
    }

    /// Grammar currently in effect
    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    /// Whether an alias currently resolves to a command
    pub fn is_registered(&self, alias: &str) -> bool {
        self.aliases.contains_key(alias)
    }

    /// Canonical name behind an alias
    pub fn canonical_name(&self, alias: &str) -> Option<&str> {
        self.aliases
            .get(alias)
            .map(|&slot| self.commands[slot].canonical_name())
    }

    /// Contract behind an alias
    pub fn contract(&self, alias: &str) -> Option<&Contract> {
        self.aliases.get(alias).map(|&slot| &self.commands[slot].contract)
    }

    /// Parse, validate, invoke, record
    ///
    /// Runs to completion before returning; the operation runs only when
    /// every pre-invocation check passed. A history entry is appended
    /// exactly when the operation returned successfully.
    pub fn handle_line(&mut self, line: &str) -> DispatchResult<Value> {
        let (alias, argument_text) = self
            .grammar
            .split_line(line)
            .ok_or_else(|| DispatchError::UnknownCommand(String::new()))?;

        let slot = *self
            .aliases
            .get(alias)
            .ok_or_else(|| DispatchError::UnknownCommand(alias.to_string()))?;
        let command = &mut self.commands[slot];

        let arguments = match argument_text {
            Some(text) => self.grammar.parse_arguments(text)?,
            None => {
                // A command with required parameters cannot run on a bare
                // name; report the first one it is missing.
                if let Some(first_required) = command.contract.required().first() {
                    return Err(ValidationError::MissingArgument(first_required.clone()).into());
                }
                Arguments::empty(self.grammar.style)
            }
        };

        command.contract.validate(&arguments)?;

        trace!(
            command = %command.canonical_name(),
            alias,
            count = arguments.len(),
            "invoking operation"
        );
        let result = command.operation.invoke(&arguments)?;

        let canonical = command.canonical_name().to_string();
        let alias_used = (canonical != alias).then(|| alias.to_string());
        self.history.push(HistoryEntry {
            timestamp: Utc::now(),
            command: canonical,
            alias: alias_used,
            arguments,
            grammar: self.grammar.clone(),
            result: result.clone(),
        });

        Ok(result)
    }

    /// Invocation history, oldest first
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }
}
