//! Punto de entrada ("driver").
//!
//! Este módulo orquesta las diferentes fases del proceso de
//! compilación y expone una CLI.

use anyhow::{self, bail, Context};
use clap::{crate_version, Arg, Command};
use hydro::{
    error::Diagnostics,
    lex,
    link::{Artifacts, LinkOptions, Linker},
    parse::{self, Ast},
    source::Source,
    target,
};

use log::LevelFilter;
use std::{
    fs::{self, File},
    io::{self, BufWriter, Write},
    path::Path,
    process,
    rc::Rc,
};

fn main() -> anyhow::Result<()> {
    // Parsing de CLI, todo error de uso termina con código 1
    let args = match cli().try_get_matches() {
        Ok(args) => args,
        Err(error) if !error.use_stderr() => error.exit(),
        Err(error) => {
            error.print()?;
            process::exit(1);
        }
    };

    let level = match args.occurrences_of("verbose") {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    // Se extraen argumentos necesarios
    let input = args.value_of("input").context("No input file")?;
    let output = args.value_of("output").unwrap_or("out");
    let asm = args.is_present("asm");

    let text = fs::read_to_string(input)
        .with_context(|| format!("Failed to read source file: {}", input))?;

    let source = Source::new(input, text);
    let ast = match frontend(&source) {
        Ok(Some(ast)) => ast,
        Ok(None) => bail!("No exit statement found in {}", input),
        Err(diagnostics) => {
            eprint!("{}", diagnostics);
            process::exit(1);
        }
    };

    match (asm, output) {
        // Salida a stdout sin enlazado
        (true, "-") => {
            let stdout = io::stdout();
            target::emit(&ast, &mut stdout.lock()).context("Failed to emit to stdout")?;
        }

        // Salida a archivo sin enlazado
        (true, path) => write_assembly(&ast, Path::new(path))?,

        // Salida a stdout con enlazado
        (false, "-") => bail!("Refusing to write executable to stdout"),

        // Salida a archivo con enlazado
        (false, path) => {
            let artifacts = Artifacts::for_output(path);
            write_assembly(&ast, &artifacts.assembly)?;

            let mut options = LinkOptions::empty();
            if args.is_present("strip") {
                options |= LinkOptions::STRIP;
            }

            Linker::new(options)
                .link(&artifacts)
                .with_context(|| format!("Failed to generate executable: {}", path))?;
        }
    };

    Ok(())
}

fn cli() -> Command<'static> {
    Command::new("hydro")
        .version(crate_version!())
        .about("Compiles hydro programs to x86-64 Linux executables")
        .arg(
            Arg::new("input")
                .value_name("INPUT")
                .required(true)
                .help("Source file"),
        )
        .arg(
            Arg::new("asm")
                .short('S')
                .help("Generate assembly instead of linking"),
        )
        .arg(Arg::new("strip").short('s').help("Strip executables"))
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .takes_value(true)
                .default_value("out")
                .value_name("FILE")
                .help("Output file ('-' along with -S for stdout)"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .multiple_occurrences(true)
                .help("Increase logging verbosity"),
        )
}

/// Análisis léxico y sintáctico. El primer error es fatal.
fn frontend(source: &Rc<Source>) -> Result<Option<Ast>, Diagnostics> {
    let tokens =
        lex::tokenize(source).map_err(|error| Diagnostics::from(error).kind("Lexical error"))?;

    parse::parse(&tokens).map_err(|error| Diagnostics::from(error).kind("Syntax error"))
}

fn write_assembly(ast: &Ast, path: &Path) -> anyhow::Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to open for writing: {}", path.display()))?;

    let mut writer = BufWriter::new(file);
    target::emit(ast, &mut writer)
        .and_then(|()| writer.flush())
        .with_context(|| format!("Failed to emit to file: {}", path.display()))
}
