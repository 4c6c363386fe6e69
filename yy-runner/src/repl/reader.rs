use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;
use yy_core::ast::Program;
use yy_core::diagnostic::pretty_error;
use yy_core::parser::Parser;

use crate::runner::{print_tokens, Options};

const PROMPT: &str = "yy> ";
const PAD_LEFT: &str = "    ";

pub enum ReadOutput {
    Exit,
    Clear,
    Value(Program),
}

pub struct Reader {
    rl: Editor<(), DefaultHistory>,
    options: Options,
}

impl Reader {
    pub fn new(rl: Editor<(), DefaultHistory>, options: Options) -> Self {
        Self { rl, options }
    }

    pub fn read(&mut self) -> ReadOutput {
        let readline = self.rl.readline(PROMPT);

        let line = match readline {
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                return ReadOutput::Clear;
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                return ReadOutput::Exit;
            }
            Err(err) => {
                println!("Error: {:?}", err);
                return ReadOutput::Exit;
            }
            Ok(line) => {
                if let Err(err) = self.rl.add_history_entry(&line) {
                    log::warn!("could not add history entry: {}", err);
                }
                line
            }
        };

        if self.options.tokens {
            print_tokens(&line);
        }

        match Parser::new(&line).parse_program() {
            Ok(program) => {
                if self.options.debug {
                    println!("{}{}", PAD_LEFT, program);
                }
                ReadOutput::Value(program)
            }
            Err(errors) => {
                for error in errors {
                    println!("{}", pretty_error(&line, Some(error.offset()), &error.to_string()));
                }
                ReadOutput::Clear
            }
        }
    }
}
