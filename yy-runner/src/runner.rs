use gc::Gc;
use yy_core::lexer::Lexer;
use yy_interpreter::object::Object;
use yy_interpreter::{RunError, Session};

#[derive(Clone, Copy, Default)]
pub struct Options {
    pub debug: bool,
    pub tokens: bool,
}

pub fn print_tokens(source: &str) {
    for token in Lexer::new(source) {
        println!("{:?}", token);
    }
}

pub fn execute(source: &str, options: &Options) -> Result<Gc<Object>, RunError> {
    if options.tokens {
        print_tokens(source);
    }

    let session = Session::new();
    let program = session.prepare(source)?;
    if options.debug {
        println!("after macro expansion:\n{}\n", program);
    }
    session.evaluate(&program)
}
