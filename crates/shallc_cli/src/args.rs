//! the args for running shallc

use clap::{value_parser, ArgAction};
use shall_jit::OptLevel;
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;

/// The args struct
#[derive(Debug, clap::Parser)]
#[clap(author, version, about = "Compiles and runs a shall program")]
pub struct Args {
    #[command(flatten)]
    logging: LoggingArgs,

    /// The source file to compile
    #[clap(value_name = "source file", value_hint = clap::ValueHint::FilePath)]
    pub file: PathBuf,
    /// Print every token before parsing
    #[clap(long)]
    pub dump_tokens: bool,
    /// Print the parsed program
    #[clap(long)]
    pub dump_ast: bool,
    /// Print the generated ir
    #[clap(long)]
    pub dump_ir: bool,
    /// Stop after compiling, without running the entry
    #[clap(long)]
    pub no_run: bool,
    /// The name of the entry function
    #[clap(long, default_value = "main", env = "SHALLC_ENTRY")]
    pub entry: String,
    /// How much the backend should optimize: none, speed, or speed_and_size
    #[clap(long, default_value = "none")]
    pub opt_level: OptLevel,
}

impl Args {
    pub fn logging(&self) -> &LoggingArgs {
        &self.logging
    }
}

/// Sets the logging level with `-v[v]` or `-q[q]`
#[derive(Debug, Clone, Copy, clap::Args)]
pub struct LoggingArgs {
    #[clap(short = 'v', value_parser = value_parser!(u8).range(0..=2), action=ArgAction::Count, conflicts_with="quiet")]
    verbose: u8,
    #[clap(short = 'q', value_parser = value_parser!(u8).range(0..=2), action=ArgAction::Count, conflicts_with="verbose")]
    quiet: u8,
}

impl LoggingArgs {
    /// Gets the logging level based on whether `-v[v]` or `-q[q]` has been used
    pub fn log_level_filter(&self) -> LevelFilter {
        match self.verbose as i8 - self.quiet as i8 {
            -2 => LevelFilter::OFF,
            -1 => LevelFilter::ERROR,
            0 => LevelFilter::WARN,
            1 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::path::Path;

    #[test]
    fn test_args_parsing() {
        let test = "shallc file.shall";
        let args = Args::try_parse_from(test.split(' ')).expect("could not parse test string");
        assert_eq!(args.file, Path::new("file.shall"));
        assert_eq!(args.entry, "main");
        assert_eq!(args.opt_level, OptLevel::None);
        assert!(!args.dump_ast && !args.dump_ir && !args.dump_tokens && !args.no_run);
        assert_eq!(args.logging().log_level_filter(), LevelFilter::WARN);
    }

    #[test]
    fn test_dump_flags() {
        let test = "shallc -vv --dump-tokens --dump-ast --dump-ir --no-run --opt-level speed_and_size file.shall";
        let args = Args::try_parse_from(test.split(' ')).expect("could not parse test string");
        assert!(args.dump_tokens && args.dump_ast && args.dump_ir && args.no_run);
        assert_eq!(args.opt_level, OptLevel::SpeedAndSize);
        assert_eq!(args.logging().log_level_filter(), LevelFilter::TRACE);
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        let test = "shallc -v -q file.shall";
        assert!(Args::try_parse_from(test.split(' ')).is_err());
    }

    #[test]
    fn test_bad_opt_level() {
        let test = "shallc --opt-level fastest file.shall";
        assert!(Args::try_parse_from(test.split(' ')).is_err());
    }
}
