// src/main.rs

use clap::Parser;
use git_impact::cli::Args;
use git_impact::{analyzer, renderer, GitCli};
use std::io::{self, Write};
use std::time::Instant;

fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            // Usage errors exit 1; --help and --version exit 0.
            let _ = err.print();
            std::process::exit(if err.use_stderr() { 1 } else { 0 });
        }
    };

    let runner = GitCli::new(&args.repo);
    let start = Instant::now();

    match analyzer::analyze(&runner, &args.base, &args.branches) {
        Ok(result) => {
            eprintln!(
                "Analysis finished in {:.2?}. {} branches, {} commits, {} changes.",
                start.elapsed(),
                result.branches.len(),
                result.scoreboard.total_commits(),
                result.scoreboard.total_changes()
            );

            let stdout = io::stdout();
            let mut out = io::BufWriter::new(stdout.lock());
            let _ = renderer::render(&mut out, &result, args.verbose);
            let _ = out.flush();
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}
