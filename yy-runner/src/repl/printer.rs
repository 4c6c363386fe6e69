use gc::Gc;
use yy_interpreter::object::Object;
use yy_interpreter::RunError;

pub trait Printer {
    type Object;

    fn print(&mut self, object: Self::Object);
}

pub struct InterpreterPrinter {}

impl Printer for InterpreterPrinter {
    type Object = Result<Gc<Object>, RunError>;

    fn print(&mut self, object: Self::Object) {
        match object {
            Ok(obj) => println!("{}", obj),
            // Parse errors never reach the evaluator.
            Err(err) => println!("{}", err),
        }
    }
}
