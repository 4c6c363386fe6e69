use gc::Gc;
use yy_core::ast::Program;
use yy_interpreter::object::Object;
use yy_interpreter::{RunError, Session};

pub trait Evaluator {
    type Object;

    fn evaluate(&mut self, program: Program) -> Self::Object;
}

pub struct InterpreterEvaluator {
    session: Session,
    debug: bool,
}

impl InterpreterEvaluator {
    pub fn new(debug: bool) -> Self {
        Self {
            session: Session::new(),
            debug,
        }
    }
}

impl Evaluator for InterpreterEvaluator {
    type Object = Result<Gc<Object>, RunError>;

    fn evaluate(&mut self, program: Program) -> Self::Object {
        let expanded = self.session.expand(program)?;
        if self.debug {
            println!("    {}", expanded);
        }
        self.session.evaluate(&expanded)
    }
}
