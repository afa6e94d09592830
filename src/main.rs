//! Punto de entrada ("driver").
//!
//! Este módulo orquesta las diferentes fases del proceso de
//! compilación y expone una CLI. Un error de E/S se reporta como tal;
//! un diagnóstico de compilación se imprime con su contexto de código
//! fuente y el proceso termina con estado negativo.

use anyhow::Context;
use clap::{self, crate_version, Arg};
use mcc::{error::Diagnostics, lex::Lexer, names::NameGenerator, parse, source::Source};

use std::{
    fs,
    fs::File,
    io::{BufWriter, Write},
    process::exit,
};

fn main() -> anyhow::Result<()> {
    // Parsing de CLI
    let args = clap::App::new("mcc")
        .version(crate_version!())
        .about("A small C compiler for the Mentat computer")
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .takes_value(true)
                .required(true)
                .value_name("FILE")
                .about("The file to be compiled"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .takes_value(true)
                .required(true)
                .value_name("FILE")
                .about("The output asm file"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .about("Print each compiler pass"),
        )
        .get_matches();

    let input = args.value_of("input").unwrap();
    let output = args.value_of("output").unwrap();
    let verbose = args.is_present("verbose");

    let text = fs::read_to_string(input)
        .with_context(|| format!("Failed to read source file: {}", input))?;

    // El origen sobrevive a todas las fases para poder citar líneas
    // en los diagnósticos
    let source = Source::new(input, &text);

    let tokens = match Lexer::new(source.origin(), source.chars()).try_exhaustive() {
        Ok(tokens) => tokens,
        Err(error) => abort(Diagnostics::from(error).kind("syntax error")),
    };

    let mut program = match parse::parse(source.origin(), tokens.iter()) {
        Ok(program) => program,
        Err(error) => abort(Diagnostics::from(error).kind("syntax error")),
    };

    if verbose {
        println!("{:#?}", program);
        separator();
    }

    let mut names = NameGenerator::new();
    let analysis = program
        .resolve_identifiers(&mut names)
        .and_then(|()| program.label_loops(&mut names))
        .and_then(|()| program.check_types());

    if let Err(error) = analysis {
        abort(Diagnostics::from(error).kind("semantic error"));
    }

    if verbose {
        println!("{:#?}", program);
        separator();
    }

    let ir = program.lower(&mut names);
    if verbose {
        println!("{:#?}", ir);
        separator();
    }

    let mut assembly = ir.select(&mut names);
    if verbose {
        println!("{:#?}", assembly);
        separator();
    }

    assembly.legalize();
    if verbose {
        println!("{:#?}", assembly);
        separator();
    }

    let file = File::create(output)
        .with_context(|| format!("Failed to open for writing: {}", output))?;
    let mut file = BufWriter::new(file);

    assembly
        .emit(&mut file)
        .and_then(|()| file.flush())
        .with_context(|| format!("Failed to emit to file: {}", output))?;

    Ok(())
}

/// Imprime un diagnóstico y termina el proceso con estado negativo.
fn abort(diagnostics: Diagnostics) -> ! {
    eprint!("{}", diagnostics);
    exit(-1)
}

fn separator() {
    println!("---------------------------------------------------");
}
