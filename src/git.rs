// src/git.rs

use crate::error::AttributionError;
use crate::model::{IdentityPair, LineRange};
use std::collections::HashSet;
use std::path::PathBuf;
use std::process::Command;

/// Executes one historical-repository query and returns its raw text output.
///
/// The attribution engine issues every external query through this seam;
/// a non-zero completion is a fatal `Query` error carrying the raw
/// diagnostic, and the run aborts without retrying.
pub trait QueryRunner {
    fn run(&self, args: &[String]) -> Result<String, AttributionError>;
}

/// Runs queries against a real repository by shelling out to `git`.
pub struct GitCli {
    repo: PathBuf,
}

impl GitCli {
    pub fn new(repo: impl Into<PathBuf>) -> Self {
        Self { repo: repo.into() }
    }
}

impl QueryRunner for GitCli {
    fn run(&self, args: &[String]) -> Result<String, AttributionError> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.repo)
            .output()?;

        if !output.status.success() {
            return Err(AttributionError::query(
                String::from_utf8_lossy(&output.stderr).trim_end(),
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Files differing between `base` and `branch`, in comparison order.
pub fn changed_files<R: QueryRunner>(
    runner: &R,
    base: &str,
    branch: &str,
) -> Result<Vec<String>, AttributionError> {
    let out = runner.run(&[
        "diff".to_string(),
        "--name-only".to_string(),
        format!("{base}..{branch}"),
    ])?;
    Ok(lines_of(&out))
}

/// Commits reachable on `branch` but not `base` that modified `file`,
/// most-recent-first.
pub fn commits_touching<R: QueryRunner>(
    runner: &R,
    base: &str,
    branch: &str,
    file: &str,
) -> Result<Vec<String>, AttributionError> {
    let out = runner.run(&[
        "log".to_string(),
        "--pretty=%h".to_string(),
        format!("{base}..{branch}"),
        "--".to_string(),
        file.to_string(),
    ])?;
    Ok(lines_of(&out))
}

/// Line ranges `commit` rewrote in `file`, addressed in the file's
/// pre-commit state.
pub fn modified_ranges<R: QueryRunner>(
    runner: &R,
    commit: &str,
    file: &str,
) -> Result<Vec<LineRange>, AttributionError> {
    let patch = runner.run(&[
        "log".to_string(),
        "-1".to_string(),
        "--patch".to_string(),
        "--format=".to_string(),
        commit.to_string(),
        "--".to_string(),
        file.to_string(),
    ])?;
    parse_hunk_ranges(&patch)
}

/// Distinct commits that last owned `range` just before `commit`
/// overwrote it, in order of first appearance.
pub fn prior_owners<R: QueryRunner>(
    runner: &R,
    commit: &str,
    range: LineRange,
    file: &str,
) -> Result<Vec<String>, AttributionError> {
    let out = runner.run(&[
        "blame".to_string(),
        format!("{commit}^"),
        "-L".to_string(),
        format!("{},+{}", range.start, range.count),
        "--".to_string(),
        file.to_string(),
    ])?;
    parse_blame_commits(&out)
}

/// The committer/author email pair recorded on `commit`.
pub fn commit_identity<R: QueryRunner>(
    runner: &R,
    commit: &str,
) -> Result<IdentityPair, AttributionError> {
    let out = runner.run(&[
        "log".to_string(),
        "-1".to_string(),
        "--pretty=%ce|%ae".to_string(),
        commit.to_string(),
    ])?;
    parse_identity(&out)
}

fn lines_of(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

/// Recovers the old-file side of every hunk header in a patch.
///
/// A header reads `@@ -start[,count] +start[,count] @@`; only the old side
/// matters here, since ownership resolution targets the state prior to the
/// commit. An omitted count means 1; a count of 0 is a pure insertion with
/// no prior lines to own and is skipped. A patch with no headers at all
/// (binary file, file creation) legitimately yields no ranges, but a
/// header that fails to parse is a hard error.
fn parse_hunk_ranges(patch: &str) -> Result<Vec<LineRange>, AttributionError> {
    let mut ranges = Vec::new();

    // Body lines open with ' ', '+' or '-', so "@@ " only ever starts a
    // plain hunk header; combined-diff "@@@" markers fall through too.
    for line in patch.lines().filter(|l| l.starts_with("@@ ")) {
        let old_side = line
            .split_whitespace()
            .nth(1)
            .and_then(|spec| spec.strip_prefix('-'))
            .ok_or_else(|| AttributionError::parse("hunk header", line))?;

        let (start, count) = match old_side.split_once(',') {
            Some((start, count)) => (parse_line_no(start, line)?, parse_line_no(count, line)?),
            None => (parse_line_no(old_side, line)?, 1),
        };

        if count == 0 {
            continue;
        }
        if start == 0 {
            return Err(AttributionError::parse("hunk header", line));
        }
        ranges.push(LineRange { start, count });
    }

    Ok(ranges)
}

fn parse_line_no(field: &str, header: &str) -> Result<u32, AttributionError> {
    field
        .parse::<u32>()
        .map_err(|_| AttributionError::parse("hunk header", header))
}

/// Collapses per-line ownership output to the distinct owning commits.
///
/// Each blame line leads with the owning commit's abbreviated hash; a `^`
/// prefix marks a boundary (ancestor-less) owner and is stripped, the
/// owner itself still counts.
fn parse_blame_commits(blame: &str) -> Result<Vec<String>, AttributionError> {
    let mut seen = HashSet::new();
    let mut commits = Vec::new();

    for line in blame.lines().filter(|l| !l.trim().is_empty()) {
        let token = line
            .split_whitespace()
            .next()
            .ok_or_else(|| AttributionError::parse("blame line", line))?;
        let id = token.trim_start_matches('^');

        if id.is_empty() || !id.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(AttributionError::parse("blame line", line));
        }
        if seen.insert(id.to_string()) {
            commits.push(id.to_string());
        }
    }

    Ok(commits)
}

fn parse_identity(text: &str) -> Result<IdentityPair, AttributionError> {
    let raw = text.trim();
    let (committer, author) = raw
        .split_once('|')
        .ok_or_else(|| AttributionError::parse("identity pair", raw))?;

    Ok(IdentityPair {
        committer: committer.to_string(),
        author: author.to_string(),
    })
}
