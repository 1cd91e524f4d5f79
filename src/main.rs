use clap::Parser;
use sigeval::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
