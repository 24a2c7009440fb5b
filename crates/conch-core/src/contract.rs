// crates/conch-core/src/contract.rs - Parameter contracts and argument validation
//
// A contract is the required/optional parameter-name sets declared for one
// operation. It is derived once at registration time from the declared
// parameter list and never changes afterwards.
//
// Validation is orthogonal to the textual grammar: it sees only the parsed
// argument shape, so swapping delimiters never changes contract semantics.
//
// VALIDATION ORDER:
// 1. Too few arguments -> Arity
// 2. Keyed only: a required name is absent -> MissingArgument
// 3. Keyed only: an undeclared name is present -> ExtraneousArgument
// 4. Too many arguments -> Arity
//
// For keyed argument sets, checks 2 and 3 subsume the upper arity bound, so
// an over-count with an undeclared name reports the name rather than the
// count. Positional sets are only ever checked for arity; binding values to
// names is the operation's own responsibility.

use thiserror::Error;

use crate::grammar::Arguments;

/// Errors that can occur while deriving a contract from a declared
/// parameter list
///
/// These fire at registration time, never at dispatch. Each variant marks a
/// parameter list that no well-formed operation signature could declare.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ContractError {
    #[error("Empty parameter name")]
    EmptyParameterName,

    #[error("Duplicate parameter name: {0}")]
    DuplicateParameter(String),

    #[error("Required parameter {required:?} declared after optional parameter {optional:?}")]
    RequiredAfterOptional { required: String, optional: String },
}

/// Result type for contract derivation
pub type ContractResult<T> = Result<T, ContractError>;

/// Errors that can occur while validating parsed arguments against a contract
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Expected between {min} and {max} arguments, got {got}")]
    Arity { got: usize, min: usize, max: usize },

    #[error("Missing required argument: {0}")]
    MissingArgument(String),

    #[error("Extraneous argument: {0}")]
    ExtraneousArgument(String),
}

/// One declared parameter: a name plus whether it carries a default
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    name: String,
    required: bool,
}

impl Param {
    /// A parameter with no default value
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: true,
        }
    }

    /// A parameter with a default value, which the caller may omit
    pub fn optional(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_required(&self) -> bool {
        self.required
    }
}

/// Required/optional parameter-name sets for one operation, in declaration
/// order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contract {
    required: Vec<String>,
    optional: Vec<String>,
}

impl Contract {
    pub fn builder() -> ContractBuilder {
        ContractBuilder::default()
    }

    /// Derive a contract from a declared parameter list
    ///
    /// Declaration order is preserved within each set. Optional parameters
    /// must follow the required ones so that positional binding stays
    /// well-defined for every accepted argument count.
    pub fn from_params<I>(params: I) -> ContractResult<Self>
    where
        I: IntoIterator<Item = Param>,
    {
        let mut required = Vec::new();
        let mut optional: Vec<String> = Vec::new();

        for param in params {
            if param.name.is_empty() {
                return Err(ContractError::EmptyParameterName);
            }
            if required.contains(&param.name) || optional.contains(&param.name) {
                return Err(ContractError::DuplicateParameter(param.name));
            }

            if param.required {
                if let Some(preceding) = optional.last() {
                    return Err(ContractError::RequiredAfterOptional {
                        required: param.name,
                        optional: preceding.clone(),
                    });
                }
                required.push(param.name);
            } else {
                optional.push(param.name);
            }
        }

        Ok(Self { required, optional })
    }

    /// Parameter names with no default, in declaration order
    pub fn required(&self) -> &[String] {
        &self.required
    }

    /// Parameter names with a default, in declaration order
    pub fn optional(&self) -> &[String] {
        &self.optional
    }

    /// Smallest accepted argument count
    pub fn min_args(&self) -> usize {
        self.required.len()
    }

    /// Largest accepted argument count
    pub fn max_args(&self) -> usize {
        self.required.len() + self.optional.len()
    }

    /// All declared parameter names, required first
    pub fn parameters(&self) -> impl Iterator<Item = &str> {
        self.required
            .iter()
            .chain(self.optional.iter())
            .map(String::as_str)
    }

    fn is_declared(&self, name: &str) -> bool {
        self.required.iter().any(|p| p == name) || self.optional.iter().any(|p| p == name)
    }

    /// Check parsed arguments against this contract
    pub fn validate(&self, arguments: &Arguments) -> Result<(), ValidationError> {
        let got = arguments.len();
        let (min, max) = (self.min_args(), self.max_args());

        if got < min {
            return Err(ValidationError::Arity { got, min, max });
        }

        if let Arguments::Keyed(map) = arguments {
            for name in &self.required {
                if !map.contains_key(name) {
                    return Err(ValidationError::MissingArgument(name.clone()));
                }
            }
            for key in map.keys() {
                if !self.is_declared(key) {
                    return Err(ValidationError::ExtraneousArgument(key.clone()));
                }
            }
        }

        if got > max {
            return Err(ValidationError::Arity { got, min, max });
        }

        Ok(())
    }
}

/// Builder collecting a declared parameter list for [`Contract::from_params`]
#[derive(Debug, Clone, Default)]
pub struct ContractBuilder {
    params: Vec<Param>,
}

impl ContractBuilder {
    pub fn required(mut self, name: impl Into<String>) -> Self {
        self.params.push(Param::required(name));
        self
    }

    pub fn optional(mut self, name: impl Into<String>) -> Self {
        self.params.push(Param::optional(name));
        self
    }

    pub fn build(self) -> ContractResult<Contract> {
        Contract::from_params(self.params)
    }
}
