mod evaluator;
mod printer;
mod reader;

use rustyline::DefaultEditor;

use evaluator::{Evaluator, InterpreterEvaluator};
use printer::{InterpreterPrinter, Printer};
use reader::{ReadOutput, Reader};

use crate::runner::Options;

const GREETING: &str = concat!("YeetYoink v", env!("CARGO_PKG_VERSION"));

struct Repl<E: Evaluator, P: Printer> {
    reader: Reader,
    evaluator: E,
    printer: P,
}

impl<O, E: Evaluator<Object = O>, P: Printer<Object = O>> Repl<E, P> {
    fn run(mut self) {
        println!("{}", GREETING);
        loop {
            match self.reader.read() {
                ReadOutput::Exit => break,
                ReadOutput::Clear => continue,
                ReadOutput::Value(program) => {
                    let result = self.evaluator.evaluate(program);
                    self.printer.print(result)
                }
            }
        }
    }
}

pub fn start(options: Options) {
    let rl = match DefaultEditor::new() {
        Ok(rl) => rl,
        Err(err) => {
            eprintln!("error: could not start line editor: {}", err);
            return;
        }
    };

    Repl {
        reader: Reader::new(rl, options),
        evaluator: InterpreterEvaluator::new(options.debug),
        printer: InterpreterPrinter {},
    }
    .run();
}
