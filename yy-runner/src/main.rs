mod repl;
mod runner;

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Print the program after macro expansion
    #[arg(short, long)]
    debug: bool,
    /// Print the token stream before parsing
    #[arg(short, long)]
    tokens: bool,
    path: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    let options = runner::Options {
        debug: cli.debug,
        tokens: cli.tokens,
    };

    match cli.path {
        None => {
            repl::start(options);
            ExitCode::SUCCESS
        }
        Some(path) => {
            let source = match std::fs::read_to_string(&path) {
                Ok(source) => source,
                Err(error) => {
                    eprintln!("error: couldn't read file {}: {}", path.display(), error);
                    return ExitCode::FAILURE;
                }
            };
            match runner::execute(&source, &options) {
                Ok(_) => ExitCode::SUCCESS,
                Err(error) => {
                    eprintln!("{}", error.render(&source));
                    ExitCode::FAILURE
                }
            }
        }
    }
}
