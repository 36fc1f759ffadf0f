use std::fs::File;
use std::io::prelude::*;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use clap::{App, Arg};

#[derive(Debug)]
enum IoErrorContext {
    ReadInput,
}

#[derive(Debug)]
enum Error {
    Lflc(lflc::Error, PathBuf),
    Io(std::io::Error, IoErrorContext, PathBuf),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(err, context, path) => write!(
                f,
                "{} file \"{}\" failed: {}",
                match context {
                    IoErrorContext::ReadInput => "reading",
                },
                path.display(),
                err
            ),
            // "path:line:column: message", the conventional Unix
            // compiler-error format (spec §6 "printed to stderr with
            // source location"). `lflc::Error`'s own `Display` already
            // renders "line:column: message" when it has a location.
            Error::Lflc(err, path) => {
                let sep = if err.location().is_some() { "" } else { " " };
                write!(f, "{}:{}{}", path.display(), sep, err)
            }
        }
    }
}

fn main() {
    env_logger::init();

    let matches = App::new("lflc")
        .about("Compiler for LFL, targeting the LFC stack machine.")
        .arg(
            Arg::with_name("INPUT")
                .help("Sets the .lfl source file to compile")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("assembly")
                .long("assembly")
                .help("Also prints the assembly listing before the blueprint"),
        )
        .get_matches();

    let input = matches.value_of("INPUT").unwrap();
    let print_assembly = matches.is_present("assembly");

    if let Err(err) = run(input, print_assembly) {
        eprintln!("{}", err);
        std::process::exit(1);
    }
}

fn run(input: &str, print_assembly: bool) -> Result<(), Error> {
    let input_path = Path::new(input);

    let file = File::open(input_path)
        .map_err(|err| Error::Io(err, IoErrorContext::ReadInput, input_path.to_owned()))?;
    let mut source = String::new();
    BufReader::new(file)
        .read_to_string(&mut source)
        .map_err(|err| Error::Io(err, IoErrorContext::ReadInput, input_path.to_owned()))?;

    let program = lflc::compile(&source)
        .map_err(|err| Error::Lflc(err, input_path.to_owned()))?;
    let blueprint = blueprint::encode(&program);

    if print_assembly {
        print!("{}", lflc::listing::render(&program));
        println!();
    }
    println!("{}", blueprint);

    Ok(())
}
