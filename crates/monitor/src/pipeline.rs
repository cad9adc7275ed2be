//! Argument validation pipeline wrapped around every command.
//!
//! A command declares an ordered parameter list and an ordered list of
//! gates. Gates run in declaration order against an environment built from
//! the declared defaults merged with the supplied arguments; the first
//! failing gate short-circuits with its operator message. Rule sets that
//! could let a check observe a value the command never receives are
//! rejected when the pipeline is built.

use std::collections::BTreeMap;

use crate::errors::{InternalFault, Rejected, RuleError};

/// Message returned when a non-variadic command receives surplus arguments.
pub const TOO_MANY_ARGUMENTS: &str = "E: too many arguments";

/// Argument value as seen by gates and handlers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    /// Converted integer.
    Int(i64),
    /// Raw or partially converted text.
    Text(String),
}

impl Value {
    /// Integer payload, if converted.
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            Self::Text(_) => None,
        }
    }

    /// Text payload, if not converted.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Int(_) => None,
        }
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

/// One declared parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSpec {
    /// Parameter name referenced by gates and handlers.
    pub name: &'static str,
    /// Value used when the argument is not supplied.
    pub default: Option<Value>,
}

impl ParamSpec {
    /// Parameter that must be supplied.
    #[must_use]
    pub const fn required(name: &'static str) -> Self {
        Self {
            name,
            default: None,
        }
    }

    /// Parameter with a default.
    #[must_use]
    pub fn optional(name: &'static str, default: impl Into<Value>) -> Self {
        Self {
            name,
            default: Some(default.into()),
        }
    }
}

/// Name-to-value map a handler receives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Env {
    values: BTreeMap<&'static str, Value>,
    supplied: Vec<&'static str>,
    rest: Vec<String>,
}

impl Env {
    /// Value bound to `name`, if any.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Integer bound to `name`, if any.
    #[must_use]
    pub fn int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_int)
    }

    /// Text bound to `name`, if any.
    #[must_use]
    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_text)
    }

    /// Whether the operator supplied `name` (rather than relying on a default).
    #[must_use]
    pub fn is_supplied(&self, name: &str) -> bool {
        self.supplied.contains(&name)
    }

    /// Surplus positional arguments of a variadic command.
    #[must_use]
    pub fn rest(&self) -> &[String] {
        &self.rest
    }

    /// Integer that validation guarantees to be present.
    ///
    /// # Errors
    ///
    /// [`InternalFault::MissingValue`] when the guarantee was broken.
    pub fn require_int(&self, name: &'static str) -> Result<i64, InternalFault> {
        self.int(name).ok_or(InternalFault::MissingValue(name))
    }

    /// Domain address that validation guarantees to be present.
    ///
    /// # Errors
    ///
    /// [`InternalFault::MissingValue`] when the value is absent or outside
    /// `[0, 0xFFFF]`.
    pub fn require_address(&self, name: &'static str) -> Result<u16, InternalFault> {
        self.int(name)
            .and_then(minicomp_core::to_domain)
            .ok_or(InternalFault::MissingValue(name))
    }

    /// Text that validation guarantees to be present.
    ///
    /// # Errors
    ///
    /// [`InternalFault::MissingValue`] when the guarantee was broken.
    pub fn require_text(&self, name: &'static str) -> Result<&str, InternalFault> {
        self.text(name).ok_or(InternalFault::MissingValue(name))
    }
}

type Transform<C> = Box<dyn Fn(&C, Value) -> Result<Value, Rejected>>;
type Check = Box<dyn Fn(&Env) -> bool>;

enum Gate<C> {
    Transform {
        param: &'static str,
        convert: Transform<C>,
        message: &'static str,
    },
    Predicate {
        param: &'static str,
        check: Check,
        message: &'static str,
    },
    RequiredCount {
        message: &'static str,
    },
    Invariant {
        param: &'static str,
        check: Check,
        message: &'static str,
    },
}

impl<C> Gate<C> {
    const fn param(&self) -> Option<&'static str> {
        match self {
            Self::Transform { param, .. }
            | Self::Predicate { param, .. }
            | Self::Invariant { param, .. } => Some(*param),
            Self::RequiredCount { .. } => None,
        }
    }
}

/// Result of running the gates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Every gate passed; the handler receives this environment.
    Proceed(Env),
    /// A gate failed; the operator sees this message.
    Reject(String),
}

/// Builder for a command's parameters and gates.
///
/// `C` is the context transforms may consult (for example to resolve the
/// program counter).
pub struct Rules<C> {
    params: Vec<ParamSpec>,
    gates: Vec<Gate<C>>,
    variadic: bool,
}

impl<C> Rules<C> {
    /// Starts a rule set over `params`, in positional order.
    #[must_use]
    pub const fn new(params: Vec<ParamSpec>) -> Self {
        Self {
            params,
            gates: Vec::new(),
            variadic: false,
        }
    }

    /// Accepts surplus positional arguments, exposed through [`Env::rest`].
    #[must_use]
    pub const fn variadic(mut self) -> Self {
        self.variadic = true;
        self
    }

    /// Fails with `message` when fewer arguments than the leading run of
    /// required parameters were supplied.
    #[must_use]
    pub fn require(mut self, message: &'static str) -> Self {
        self.gates.push(Gate::RequiredCount { message });
        self
    }

    /// Converts `param` when it was supplied.
    #[must_use]
    pub fn transform(
        mut self,
        param: &'static str,
        convert: impl Fn(&C, Value) -> Result<Value, Rejected> + 'static,
        message: &'static str,
    ) -> Self {
        self.gates.push(Gate::Transform {
            param,
            convert: Box::new(convert),
            message,
        });
        self
    }

    /// Fails with `message` when `check` is false.
    #[must_use]
    pub fn check(
        mut self,
        param: &'static str,
        check: impl Fn(&Env) -> bool + 'static,
        message: &'static str,
    ) -> Self {
        self.gates.push(Gate::Predicate {
            param,
            check: Box::new(check),
            message,
        });
        self
    }

    /// Raises [`InternalFault::Invariant`] when `check` is false.
    #[must_use]
    pub fn invariant(
        mut self,
        param: &'static str,
        check: impl Fn(&Env) -> bool + 'static,
        message: &'static str,
    ) -> Self {
        self.gates.push(Gate::Invariant {
            param,
            check: Box::new(check),
            message,
        });
        self
    }

    /// Validates the declaration and freezes it.
    ///
    /// # Errors
    ///
    /// A [`RuleError`] describing the first malformed declaration.
    pub fn build(self) -> Result<Pipeline<C>, RuleError> {
        let mut seen_optional = false;
        for (index, spec) in self.params.iter().enumerate() {
            if self.params[..index].iter().any(|p| p.name == spec.name) {
                return Err(RuleError::DuplicateParameter { param: spec.name });
            }
            match spec.default {
                Some(_) => seen_optional = true,
                None if seen_optional => {
                    return Err(RuleError::RequiredAfterOptional { param: spec.name });
                }
                None => {}
            }
        }

        for (index, gate) in self.gates.iter().enumerate() {
            let Some(param) = gate.param() else {
                continue;
            };
            if !self.params.iter().any(|p| p.name == param) {
                return Err(RuleError::UnknownParameter { param });
            }
            let is_check = matches!(gate, Gate::Predicate { .. } | Gate::Invariant { .. });
            let transformed_later = self.gates[index + 1..]
                .iter()
                .any(|later| matches!(later, Gate::Transform { param: p, .. } if *p == param));
            if is_check && transformed_later {
                return Err(RuleError::CheckBeforeTransform { param });
            }
        }

        Ok(Pipeline {
            params: self.params,
            gates: self.gates,
            variadic: self.variadic,
        })
    }
}

/// A validated rule set.
pub struct Pipeline<C> {
    params: Vec<ParamSpec>,
    gates: Vec<Gate<C>>,
    variadic: bool,
}

impl<C> Pipeline<C> {
    /// Declared parameters.
    #[must_use]
    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    /// Number of leading parameters without a default.
    #[must_use]
    pub fn required_count(&self) -> usize {
        self.params
            .iter()
            .take_while(|p| p.default.is_none())
            .count()
    }

    /// Runs every gate over `args`.
    ///
    /// # Errors
    ///
    /// [`InternalFault::Invariant`] when an invariant gate fails.
    pub fn evaluate(&self, context: &C, mut args: Vec<String>) -> Result<Verdict, InternalFault> {
        if !self.variadic && args.len() > self.params.len() {
            return Ok(Verdict::Reject(TOO_MANY_ARGUMENTS.to_owned()));
        }
        let supplied_count = args.len();
        let rest = args.split_off(supplied_count.min(self.params.len()));

        let mut env = Env {
            values: BTreeMap::new(),
            supplied: Vec::with_capacity(args.len()),
            rest,
        };
        for spec in &self.params {
            if let Some(default) = &spec.default {
                env.values.insert(spec.name, default.clone());
            }
        }
        for (spec, raw) in self.params.iter().zip(args) {
            env.values.insert(spec.name, Value::Text(raw));
            env.supplied.push(spec.name);
        }

        for gate in &self.gates {
            match gate {
                Gate::Transform {
                    param,
                    convert,
                    message,
                } => {
                    if !env.is_supplied(param) {
                        continue;
                    }
                    let Some(raw) = env.values.remove(param) else {
                        continue;
                    };
                    match convert(context, raw) {
                        Ok(converted) => {
                            env.values.insert(*param, converted);
                        }
                        Err(Rejected) => return Ok(Verdict::Reject((*message).to_owned())),
                    }
                }
                Gate::Predicate {
                    param,
                    check,
                    message,
                } => {
                    if env.get(param).is_some() && !check(&env) {
                        return Ok(Verdict::Reject((*message).to_owned()));
                    }
                }
                Gate::RequiredCount { message } => {
                    if supplied_count < self.required_count() {
                        return Ok(Verdict::Reject((*message).to_owned()));
                    }
                }
                Gate::Invariant {
                    param,
                    check,
                    message,
                } => {
                    if env.get(param).is_some() && !check(&env) {
                        return Err(InternalFault::Invariant {
                            param: *param,
                            message: *message,
                        });
                    }
                }
            }
        }

        Ok(Verdict::Proceed(env))
    }
}
