use gc::Gc;
use thiserror::Error;
use yy_core::ast::Program;
use yy_core::diagnostic::pretty_error;
use yy_core::parser::{ParseError, Parser};

use crate::environment::Environment;
use crate::evaluator::eval_program;
use crate::macros::{define_macros, expand_macros};
use crate::object::{EvaluationError, Object};

#[derive(Debug, PartialEq, Error)]
pub enum RunError {
    #[error("{} parse error(s)", .0.len())]
    Parse(Vec<ParseError>),
    #[error("runtime error: {0}")]
    Runtime(#[from] EvaluationError),
}

impl RunError {
    /// Parse errors point into `source`; runtime errors carry no offset.
    pub fn render(&self, source: &str) -> String {
        match self {
            RunError::Parse(errors) => errors
                .iter()
                .map(|error| pretty_error(source, Some(error.offset()), &error.to_string()))
                .collect::<Vec<_>>()
                .join("\n"),
            RunError::Runtime(_) => self.to_string(),
        }
    }
}

/// A root environment that lives across runs, so bindings and macros from
/// one input stay visible to the next.
pub struct Session {
    environment: Environment,
}

impl Session {
    pub fn new() -> Self {
        Self {
            environment: Environment::new(),
        }
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    /// Parses `source` and runs the macro passes over it.
    pub fn prepare(&self, source: &str) -> Result<Program, RunError> {
        let program = Parser::new(source)
            .parse_program()
            .map_err(RunError::Parse)?;
        log::debug!("parsed {} top-level expressions", program.expressions.len());
        self.expand(program)
    }

    /// Binds the macro definitions in `program`, then expands their calls.
    pub fn expand(&self, mut program: Program) -> Result<Program, RunError> {
        define_macros(&mut program, &self.environment);
        let program = expand_macros(program, &self.environment)?;
        log::debug!("macros expanded");
        log::trace!("expanded program:\n{}", program);
        Ok(program)
    }

    pub fn evaluate(&self, program: &Program) -> Result<Gc<Object>, RunError> {
        Ok(eval_program(program, &self.environment)?)
    }

    pub fn run(&self, source: &str) -> Result<Gc<Object>, RunError> {
        let program = self.prepare(source)?;
        self.evaluate(&program)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
