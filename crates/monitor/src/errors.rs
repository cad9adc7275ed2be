//! Error types of the command layer.
//!
//! Operator mistakes never appear here: they travel as `"E: ..."` text
//! replies. These types cover malformed command declarations and broken
//! invariants, which are reported upward with an `IE` marker.

use minicomp_core::MachineError;
use thiserror::Error;

/// A conversion refused its input; the gate supplies the operator message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[error("conversion rejected")]
pub struct Rejected;

/// Malformed validation rules, detected when a command is registered.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
pub enum RuleError {
    /// A predicate or invariant runs before a transform of the same parameter,
    /// so it would see a value the command never receives.
    #[error("check on `{param}` precedes a transform of the same parameter")]
    CheckBeforeTransform {
        /// Parameter both gates name.
        param: &'static str,
    },
    /// A gate names a parameter the command does not declare.
    #[error("gate names undeclared parameter `{param}`")]
    UnknownParameter {
        /// Offending name.
        param: &'static str,
    },
    /// A parameter without a default follows one with a default.
    #[error("required parameter `{param}` follows an optional one")]
    RequiredAfterOptional {
        /// Offending parameter.
        param: &'static str,
    },
    /// A parameter is declared twice.
    #[error("parameter `{param}` declared twice")]
    DuplicateParameter {
        /// Offending parameter.
        param: &'static str,
    },
    /// Two commands share a name.
    #[error("command `{name}` registered twice")]
    DuplicateCommand {
        /// Offending name.
        name: &'static str,
    },
}

/// Faults meant for the maintainer rather than the operator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InternalFault {
    /// An invariant gate evaluated to false; the message carries the marker.
    #[error("{message}")]
    Invariant {
        /// Parameter the gate names.
        param: &'static str,
        /// Configured message.
        message: &'static str,
    },
    /// A handler found a validated parameter missing or mistyped.
    #[error("IE: parameter `{0}` missing after validation")]
    MissingValue(&'static str),
    /// A command declaration was rejected.
    #[error("IE: malformed rule: {0}")]
    Rule(#[from] RuleError),
    /// The machine could not be rebuilt.
    #[error("IE: machine setup failed: {0}")]
    Machine(#[from] MachineError),
    /// A table view was requested with an impossible range.
    #[error("IE: {0}")]
    Render(#[from] RenderError),
}

/// Precondition failures of the memory renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum RenderError {
    /// Dump bounds are reversed.
    #[error("dump range {lo:#06x}..{hi:#06x} is inverted")]
    InvertedRange {
        /// Inclusive lower bound.
        lo: u16,
        /// Exclusive upper bound.
        hi: u16,
    },
}
