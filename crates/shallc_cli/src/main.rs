use crate::args::Args;
use clap::Parser;
use eyre::{eyre, WrapErr};
use owo_colors::{OwoColorize, Stream};
use shall_codegen::{Compiler, CompilerOptions};
use shall_jit::{Jit, JitConfig};
use shall_parsing::lexer::Lexer;
use std::process::ExitCode;
use tracing::metadata::LevelFilter;
use tracing::{debug, info, trace};
use tracing_error::ErrorLayer;
use tracing_subscriber::fmt::format;
use tracing_subscriber::prelude::*;
use tracing_subscriber::Registry;

mod args;

fn main() -> eyre::Result<ExitCode> {
    color_eyre::install()?;
    let args = Args::parse();
    init_logging(args.logging().log_level_filter())?;
    trace!("starting shallc with args: {args:?}");
    debug!("shallc version: {}", env!("CARGO_PKG_VERSION"));
    run(&args)
}

/// Compiles the source file named by `args`, running its entry unless told not to.
///
/// Syntax errors are all reported and fail with [ExitCode::FAILURE]. A lowering error is reported
/// with its location and returned.
fn run(args: &Args) -> eyre::Result<ExitCode> {
    let source = std::fs::read_to_string(&args.file)
        .wrap_err_with(|| format!("could not read {:?}", args.file))?;

    if args.dump_tokens {
        for token in Lexer::new(&source) {
            println!("{token}");
        }
    }

    let parsed = shall_parsing::parse(&source);
    if !parsed.errors.is_empty() {
        for error in &parsed.errors {
            eprint!(
                "{} {}",
                "syntax error:".if_supports_color(Stream::Stderr, |text| text.red()),
                error.with_source(&source)
            );
        }
        return Ok(ExitCode::FAILURE);
    }
    let program = parsed.program;
    if args.dump_ast {
        println!("{program:#?}");
    }

    let module_name = args
        .file
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "shall".to_string());
    let mut jit = Jit::new(JitConfig {
        opt_level: args.opt_level,
        verify: true,
    })?;
    let options = CompilerOptions::new()
        .entry_name(&args.entry)
        .module_name(module_name);
    let ir = match Compiler::with_options(jit.module_mut(), options).compile(&program) {
        Ok(ir) => ir,
        Err(error) => {
            eprint!(
                "{} {}",
                "error:".if_supports_color(Stream::Stderr, |text| text.red()),
                error.with_source(&source)
            );
            return Err(eyre!("could not compile {:?}", args.file));
        }
    };
    if args.dump_ir {
        println!("{ir}");
    }
    if args.no_run {
        return Ok(ExitCode::SUCCESS);
    }

    let loaded = jit.load(ir)?;
    info!("running {}", args.entry);
    println!("{}", loaded.run_entry());
    Ok(ExitCode::SUCCESS)
}

fn init_logging(level_filter: LevelFilter) -> eyre::Result<()> {
    let registry = Registry::default()
        .with(
            tracing_subscriber::fmt::layer()
                .event_format(format().with_target(true))
                .with_writer(std::io::stderr)
                .with_filter(level_filter),
        )
        .with(ErrorLayer::default());

    tracing::subscriber::set_global_default(registry)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;
    use tempfile::NamedTempFile;

    fn run_source(source: &str, flags: &[&str]) -> eyre::Result<ExitCode> {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "{}", source).expect("could not write");
        let path = temp_file.path().to_str().expect("temp path is not utf-8");
        let args = Args::try_parse_from(["shallc"].iter().chain(flags).chain([&path]))
            .expect("could not parse args");
        run(&args)
    }

    #[test]
    fn test_syntax_errors_fail() {
        let code = run_source("shall x : int = . shall y int = 2.", &[]).unwrap();
        assert_eq!(code, ExitCode::FAILURE);
    }

    #[test]
    fn test_lowering_error_is_returned() {
        let error = run_source("1 + 1,0.", &["--no-run"]).unwrap_err();
        assert!(error.to_string().contains("could not compile"));
    }

    #[test]
    fn test_valid_program_succeeds() {
        let code = run_source("shall a : int = 6. a * 7.", &["--dump-ir"]).unwrap();
        assert_eq!(code, ExitCode::SUCCESS);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let args = Args::try_parse_from(["shallc", "does/not/exist.shall"]).unwrap();
        assert!(run(&args).is_err());
    }
}
