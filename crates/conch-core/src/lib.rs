// crates/conch-core/src/lib.rs - Command dispatch engine
//
// This crate is the engine behind text-driven interactive interfaces:
// embedded CLIs, REPLs, chat-bot style command lines. The host program owns
// the surface (reading input, printing output); this crate owns everything
// between a raw line of text and an invoked operation.
//
// PIPELINE:
// ┌────────────┐   ┌───────────────┐   ┌────────────────┐   ┌──────────────┐
// │  raw line  │──▶│ grammar parse │──▶│ contract check │──▶│ invoke+record│
// │ "add|op1=3"│   │ (grammar.rs)  │   │ (contract.rs)  │   │(dispatcher.rs)│
// └────────────┘   └───────────────┘   └────────────────┘   └──────────────┘
//
// DESIGN PRINCIPLES:
// - The dispatcher is an explicitly constructed value owned by the caller;
//   there is no ambient global registry.
// - Every malformed-but-recognizable input comes back as a structured error
//   value; only faults from inside an operation propagate as faults.
// - Arguments stay textual. Coercion is the operation's own business.
// - Single-threaded and synchronous: one dispatcher per session, no locks.

//! Command dispatch for embedded CLIs, REPLs, and chat-style interfaces.
//!
//! Register operations under one or more aliases, then feed raw lines to
//! [`Dispatcher::handle_line`]. The dispatcher splits the line, parses the
//! argument text under the configured [`Grammar`], validates the result
//! against the command's parameter [`Contract`], invokes the operation, and
//! records the invocation in an append-only history.
//!
//! ```
//! use conch_core::{Command, Dispatcher};
//! use serde_json::json;
//!
//! let mut dispatcher = Dispatcher::new();
//! dispatcher.register(
//!     Command::new("add")
//!         .alias("plus")
//!         .required("op1")
//!         .required("op2")
//!         .keyed(|args| {
//!             let op1: i64 = args["op1"].parse()?;
//!             let op2: i64 = args["op2"].parse()?;
//!             Ok(json!(op1 + op2))
//!         }),
//! )?;
//!
//! assert_eq!(dispatcher.handle_line("add|op1=3 op2=4")?, json!(7));
//! assert_eq!(dispatcher.handle_line("plus|op1=1 op2=2")?, json!(3));
//! assert_eq!(dispatcher.history().len(), 2);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Validation failures never reach the operation:
//!
//! ```
//! # use conch_core::{Command, Dispatcher, DispatchError};
//! # use serde_json::Value;
//! # let mut dispatcher = Dispatcher::new();
//! # dispatcher.register(
//! #     Command::new("add").required("op1").required("op2").keyed(|_| Ok(Value::Null)),
//! # )?;
//! assert!(matches!(
//!     dispatcher.handle_line("add|op1=3"),
//!     Err(DispatchError::Validation(_))
//! ));
//! assert!(dispatcher.history().is_empty());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod command;
pub mod contract;
pub mod dispatcher;
pub mod grammar;
pub mod history;

pub use command::{Command, CommandBuilder, KeyedFn, Operation, PositionalFn};
pub use contract::{
    Contract, ContractBuilder, ContractError, ContractResult, Param, ValidationError,
};
pub use dispatcher::{DispatchError, DispatchResult, Dispatcher, RegisterError, RegisterResult};
pub use grammar::{
    ArgumentStyle, Arguments, Grammar, GrammarError, GrammarResult, ParseError, ParseResult,
};
pub use history::HistoryEntry;

/// Operation result type, re-exported for operation bodies
pub use serde_json::Value;
