// src/analyzer.rs

use crate::error::AttributionError;
use crate::git::{self, QueryRunner};
use crate::model::{collapse_pairs, AuthorIdentity, LineRange, Scoreboard};
use indicatif::{ParallelProgressIterator, ProgressBar};
use rayon::prelude::*;

/// One resolved range: the span a commit rewrote and its prior owners
#[derive(Debug, Clone)]
pub struct RangeAttribution {
    pub range: LineRange,
    pub owners: Vec<AuthorIdentity>,
}

/// All attributed ranges of one commit
#[derive(Debug, Clone)]
pub struct CommitReport {
    pub id: String,
    pub ranges: Vec<RangeAttribution>,
}

/// All contributing commits of one changed file
#[derive(Debug, Clone)]
pub struct FileReport {
    pub path: String,
    pub commits: Vec<CommitReport>,
}

/// Per-branch detail, in branch-submission order
#[derive(Debug, Clone)]
pub struct BranchReport {
    pub name: String,
    pub files: Vec<FileReport>,
}

/// The complete results of an attribution run
#[derive(Debug)]
pub struct AnalysisResult {
    pub branches: Vec<BranchReport>,
    pub scoreboard: Scoreboard,
}

/// Attributes every branch against `base` and folds the scores.
///
/// Branches run sequentially (their order is the report contract); the
/// files within a branch fan out in parallel, each job filling a private
/// scoreboard that is merged back in discovery order. Any query failure
/// aborts the whole run.
pub fn analyze<R: QueryRunner + Sync>(
    runner: &R,
    base: &str,
    branches: &[String],
) -> Result<AnalysisResult, AttributionError> {
    let mut scoreboard = Scoreboard::default();
    let mut reports = Vec::with_capacity(branches.len());

    for branch in branches {
        // 1. Which files did this branch touch at all?
        let files = git::changed_files(runner, base, branch)?;

        let bar = ProgressBar::new(files.len() as u64);
        bar.set_message(branch.clone());

        // 2. Resolve each file independently. Every query for a single
        //    (commit, range, file) triple stays on one worker.
        let resolved: Vec<(FileReport, Scoreboard)> = files
            .par_iter()
            .progress_with(bar)
            .map(|path| analyze_file(runner, base, branch, path))
            .collect::<Result<_, _>>()?;

        // 3. Fold the partial scores back in discovery order.
        let mut file_reports = Vec::new();
        for (report, board) in resolved {
            scoreboard.merge(board);
            if !report.commits.is_empty() {
                file_reports.push(report);
            }
        }

        reports.push(BranchReport {
            name: branch.clone(),
            files: file_reports,
        });
    }

    Ok(AnalysisResult {
        branches: reports,
        scoreboard,
    })
}

fn analyze_file<R: QueryRunner>(
    runner: &R,
    base: &str,
    branch: &str,
    path: &str,
) -> Result<(FileReport, Scoreboard), AttributionError> {
    let mut board = Scoreboard::default();
    let commits = git::commits_touching(runner, base, branch, path)?;
    let mut commit_reports = Vec::with_capacity(commits.len());

    for id in commits {
        // A commit counts even when its patch yields no resolvable ranges.
        board.record_commit();

        let ranges = git::modified_ranges(runner, &id, path)?;
        let mut attributions = Vec::with_capacity(ranges.len());
        for range in ranges {
            let owners = owners_of(runner, &id, range, path)?;
            board.record(&owners);
            attributions.push(RangeAttribution { range, owners });
        }

        commit_reports.push(CommitReport {
            id,
            ranges: attributions,
        });
    }

    Ok((
        FileReport {
            path: path.to_string(),
            commits: commit_reports,
        },
        board,
    ))
}

/// Contributors who last owned `range` just before `commit` overwrote it.
///
/// Stage one blames the commit's parent state for the span and keeps the
/// distinct owning commits; stage two resolves each to its email pair and
/// collapses pairs sharing either slot. Zero owners is valid (the span had
/// no tracked predecessor) and yields an empty attribution.
fn owners_of<R: QueryRunner>(
    runner: &R,
    commit: &str,
    range: LineRange,
    path: &str,
) -> Result<Vec<AuthorIdentity>, AttributionError> {
    let prior = git::prior_owners(runner, commit, range, path)?;

    let mut pairs = Vec::with_capacity(prior.len());
    for owner in &prior {
        pairs.push(git::commit_identity(runner, owner)?);
    }

    Ok(collapse_pairs(&pairs))
}
