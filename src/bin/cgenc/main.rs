//! # cgenc
//!
//! This binary is the driver for cgen. It reads one source file, runs it
//! through the parser, validator, analyzer, IR builder, and emitter, and
//! writes the resulting C11 translation unit.

mod cli;

use std::error::Error;
use std::fs;

use cli::*;
use log::{error, info};

fn main() -> Result<(), Box<dyn Error>> {
    let args = Cli::init();

    simple_logger::init_with_level((&args.verbosity).into()).unwrap();

    let Commands::Build(build_args) = args.command;

    let result = match cgen::pipeline::translate_file(&build_args.file) {
        Ok(result) => result,
        Err(diagnostics) => {
            for diagnostic in &diagnostics {
                error!("{diagnostic}");
            }
            std::process::exit(1);
        }
    };

    if build_args.dump_ast {
        info!("AST:\n{:#?}", result.module);
    }
    if build_args.dump_ir {
        info!("IR:\n{:#?}", result.ir);
    }

    let output = build_args
        .output
        .unwrap_or_else(|| build_args.file.with_extension("c"));
    fs::write(&output, &result.c_source)?;
    info!("wrote {}", output.display());

    Ok(())
}
