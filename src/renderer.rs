// src/renderer.rs

use crate::analyzer::{AnalysisResult, BranchReport};
use crate::model::AuthorIdentity;
use std::io::{self, Write};

/// Writes the full console report: per-branch detail, the ranked summary,
/// and (verbose) the detail again after the summary.
pub fn render<W: Write>(out: &mut W, result: &AnalysisResult, verbose: bool) -> io::Result<()> {
    for branch in &result.branches {
        render_branch(out, branch)?;
    }

    let summary = result.scoreboard.finalize();

    writeln!(out)?;
    writeln!(out, "Summary")?;
    writeln!(out, "=============================")?;
    writeln!(out, "Total commits: {}", summary.total_commits)?;
    writeln!(out, "Total changes: {}", summary.total_changes)?;
    writeln!(out)?;
    for impact in &summary.impacts {
        writeln!(
            out,
            "\t{}: {:.1}% of {} changes",
            impact.label, impact.percentage, summary.total_changes
        )?;
    }

    if verbose {
        writeln!(out)?;
        writeln!(out, "=============================")?;
        writeln!(out, "Branch data:")?;
        for branch in &result.branches {
            render_branch(out, branch)?;
        }
    }

    writeln!(out)?;
    Ok(())
}

fn render_branch<W: Write>(out: &mut W, branch: &BranchReport) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "Branch: {}", branch.name)?;
    writeln!(out, "=============================")?;

    for file in &branch.files {
        writeln!(out, "File: {}", file.path)?;
        for commit in &file.commits {
            writeln!(out, "\t > Commit: {}", commit.id)?;
            for attribution in &commit.ranges {
                writeln!(out, "\t\tChanges on: {}:{}", file.path, attribution.range)?;
                writeln!(out, "\t\tAuthors: {}", join_owners(&attribution.owners))?;
            }
        }
    }

    Ok(())
}

fn join_owners(owners: &[AuthorIdentity]) -> String {
    owners
        .iter()
        .map(AuthorIdentity::label)
        .collect::<Vec<_>>()
        .join(" | ")
}
