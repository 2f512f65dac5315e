// src/model.rs

use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// A contiguous span of lines in a file's state *before* a commit rewrote it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRange {
    /// First line of the span, 1-indexed
    pub start: u32,
    /// Number of lines in the span, always >= 1 once extracted
    pub count: u32,
}

impl fmt::Display for LineRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.start, self.count)
    }
}

/// The raw committer/author email pair recorded on a single commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityPair {
    pub committer: String,
    pub author: String,
}

/// A deduplicated contributor, known by one or more equivalent emails
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorIdentity {
    aliases: BTreeSet<String>,
}

impl AuthorIdentity {
    fn from_pair(pair: &IdentityPair) -> Self {
        let mut aliases = BTreeSet::new();
        aliases.insert(pair.committer.clone());
        aliases.insert(pair.author.clone());
        Self { aliases }
    }

    fn shares_alias(&self, other: &AuthorIdentity) -> bool {
        self.aliases.intersection(&other.aliases).next().is_some()
    }

    fn absorb(&mut self, other: AuthorIdentity) {
        self.aliases.extend(other.aliases);
    }

    /// Stable display form: sorted aliases, comma-joined.
    pub fn label(&self) -> String {
        self.aliases.iter().cloned().collect::<Vec<_>>().join(", ")
    }

    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.aliases.iter().map(String::as_str)
    }
}

/// Collapses raw email pairs into distinct identities.
///
/// Two pairs belong to the same identity when either email slot matches,
/// transitively. First-appearance order is kept so report output follows
/// the ownership query's order.
pub fn collapse_pairs(pairs: &[IdentityPair]) -> Vec<AuthorIdentity> {
    let mut identities: Vec<AuthorIdentity> = Vec::new();

    for pair in pairs {
        let mut merged = AuthorIdentity::from_pair(pair);
        let mut insert_at = identities.len();

        // Absorb every existing identity that shares an alias; a new pair
        // can bridge two previously separate identities.
        let mut i = 0;
        while i < identities.len() {
            if identities[i].shares_alias(&merged) {
                insert_at = insert_at.min(i);
                merged.absorb(identities.remove(i));
            } else {
                i += 1;
            }
        }

        let at = insert_at.min(identities.len());
        identities.insert(at, merged);
    }

    identities
}

/// One contributor's share of the final score
#[derive(Debug, Clone, PartialEq)]
pub struct Impact {
    pub label: String,
    pub hits: u64,
    /// `100 * hits / total_changes`, rounded to one decimal place
    pub percentage: f64,
}

/// The finalized, ranked result of a run
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub total_commits: u64,
    pub total_changes: u64,
    /// Descending by hits, then by label; empty when nothing was attributed
    pub impacts: Vec<Impact>,
}

#[derive(Debug)]
struct Bucket {
    aliases: BTreeSet<String>,
    hits: u64,
}

/// Running attribution state: per-contributor hit buckets plus totals.
///
/// Buckets are keyed by email alias; recording an identity whose aliases
/// bridge two buckets unions them (alias sets merge, hits sum, every
/// absorbed alias is repointed). The resulting partition depends only on
/// the data, never on arrival order.
#[derive(Debug, Default)]
pub struct Scoreboard {
    // Tombstoned vec keeps bucket ids stable across merges.
    buckets: Vec<Option<Bucket>>,
    by_alias: HashMap<String, usize>,
    total_changes: u64,
    total_commits: u64,
}

impl Scoreboard {
    /// Counts one discovered commit, whether or not it yields any ranges.
    pub fn record_commit(&mut self) {
        self.total_commits += 1;
    }

    /// Scores one resolved range: every co-owner's bucket gains exactly 1.
    pub fn record(&mut self, owners: &[AuthorIdentity]) {
        for identity in owners {
            let id = self.bucket_for(identity);
            if let Some(bucket) = &mut self.buckets[id] {
                bucket.hits += 1;
            }
            self.total_changes += 1;
        }
    }

    /// Folds another scoreboard into this one.
    ///
    /// Alias-set union is commutative and associative, so merging partial
    /// boards in any grouping yields the same final partition and totals.
    pub fn merge(&mut self, other: Scoreboard) {
        self.total_commits += other.total_commits;
        self.total_changes += other.total_changes;

        for bucket in other.buckets.into_iter().flatten() {
            let identity = AuthorIdentity {
                aliases: bucket.aliases,
            };
            let id = self.bucket_for(&identity);
            if let Some(target) = &mut self.buckets[id] {
                target.hits += bucket.hits;
            }
        }
    }

    pub fn total_changes(&self) -> u64 {
        self.total_changes
    }

    pub fn total_commits(&self) -> u64 {
        self.total_commits
    }

    /// Ranks contributors by impact. A zero-change run reports zero
    /// contributors instead of dividing by zero.
    pub fn finalize(&self) -> Summary {
        let mut impacts = Vec::new();

        if self.total_changes > 0 {
            for bucket in self.buckets.iter().flatten() {
                let percentage =
                    (bucket.hits as f64 * 1000.0 / self.total_changes as f64).round() / 10.0;
                impacts.push(Impact {
                    label: bucket.aliases.iter().cloned().collect::<Vec<_>>().join(", "),
                    hits: bucket.hits,
                    percentage,
                });
            }
            impacts.sort_by(|a, b| b.hits.cmp(&a.hits).then_with(|| a.label.cmp(&b.label)));
        }

        Summary {
            total_commits: self.total_commits,
            total_changes: self.total_changes,
            impacts,
        }
    }

    // Finds the bucket an identity belongs to, creating or unioning as needed.
    fn bucket_for(&mut self, identity: &AuthorIdentity) -> usize {
        let mut touched: Vec<usize> = identity
            .aliases
            .iter()
            .filter_map(|alias| self.by_alias.get(alias).copied())
            .collect();
        touched.sort_unstable();
        touched.dedup();

        let target = match touched.first() {
            Some(&id) => id,
            None => {
                self.buckets.push(Some(Bucket {
                    aliases: BTreeSet::new(),
                    hits: 0,
                }));
                self.buckets.len() - 1
            }
        };

        // Union any further buckets this identity bridges into the target.
        for &other in touched.iter().skip(1) {
            if let Some(absorbed) = self.buckets[other].take() {
                for alias in &absorbed.aliases {
                    self.by_alias.insert(alias.clone(), target);
                }
                if let Some(bucket) = &mut self.buckets[target] {
                    bucket.aliases.extend(absorbed.aliases);
                    bucket.hits += absorbed.hits;
                }
            }
        }

        if let Some(bucket) = &mut self.buckets[target] {
            for alias in identity.aliases.iter() {
                if bucket.aliases.insert(alias.clone()) {
                    self.by_alias.insert(alias.clone(), target);
                }
            }
        }

        target
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(committer: &str, author: &str) -> IdentityPair {
        IdentityPair {
            committer: committer.to_string(),
            author: author.to_string(),
        }
    }

    fn identity(emails: &[&str]) -> AuthorIdentity {
        AuthorIdentity {
            aliases: emails.iter().map(|e| e.to_string()).collect(),
        }
    }

    #[test]
    fn collapse_keeps_distinct_pairs_apart() {
        let ids = collapse_pairs(&[pair("a@x.com", "a@x.com"), pair("b@x.com", "b@x.com")]);
        assert_eq!(ids.len(), 2);
        assert_eq!(ids[0].label(), "a@x.com");
        assert_eq!(ids[1].label(), "b@x.com");
    }

    #[test]
    fn collapse_unions_pairs_sharing_a_slot() {
        let ids = collapse_pairs(&[pair("c@x.com", "a@x.com"), pair("c@x.com", "c@x.com")]);
        assert_eq!(ids.len(), 1);
        assert_eq!(ids[0].label(), "a@x.com, c@x.com");
    }

    #[test]
    fn collapse_bridges_transitively() {
        // Third pair links the first two into a single contributor.
        let ids = collapse_pairs(&[
            pair("a@x.com", "a@x.com"),
            pair("b@x.com", "b@x.com"),
            pair("a@x.com", "b@x.com"),
        ]);
        assert_eq!(ids.len(), 1);
        assert_eq!(ids[0].label(), "a@x.com, b@x.com");
    }

    #[test]
    fn collapse_partition_is_order_independent() {
        let forward = collapse_pairs(&[
            pair("a@x.com", "b@x.com"),
            pair("c@x.com", "c@x.com"),
            pair("b@x.com", "b@x.com"),
        ]);
        let backward = collapse_pairs(&[
            pair("b@x.com", "b@x.com"),
            pair("c@x.com", "c@x.com"),
            pair("a@x.com", "b@x.com"),
        ]);

        let mut forward: Vec<String> = forward.iter().map(AuthorIdentity::label).collect();
        let mut backward: Vec<String> = backward.iter().map(AuthorIdentity::label).collect();
        forward.sort();
        backward.sort();
        assert_eq!(forward, backward);
    }

    #[test]
    fn record_scores_each_co_owner_once_per_range() {
        let mut board = Scoreboard::default();
        board.record_commit();
        board.record(&[identity(&["a@x.com"]), identity(&["b@x.com"])]);

        let summary = board.finalize();
        assert_eq!(summary.total_commits, 1);
        assert_eq!(summary.total_changes, 2);
        assert_eq!(summary.impacts.len(), 2);
        assert_eq!(summary.impacts[0].hits, 1);
        assert!((summary.impacts[0].percentage - 50.0).abs() < 1e-9);
        assert!((summary.impacts[1].percentage - 50.0).abs() < 1e-9);
    }

    #[test]
    fn duplicate_attributions_keep_their_event_count() {
        // Dedup applies to identity, not to how often it is recorded.
        let mut board = Scoreboard::default();
        board.record(&[identity(&["a@x.com"])]);
        board.record(&[identity(&["a@x.com"])]);

        let summary = board.finalize();
        assert_eq!(summary.total_changes, 2);
        assert_eq!(summary.impacts.len(), 1);
        assert_eq!(summary.impacts[0].hits, 2);
        assert!((summary.impacts[0].percentage - 100.0).abs() < 1e-9);
    }

    #[test]
    fn bridging_identity_unions_existing_buckets() {
        let mut board = Scoreboard::default();
        board.record(&[identity(&["a@x.com"])]);
        board.record(&[identity(&["b@x.com"])]);
        board.record(&[identity(&["a@x.com", "b@x.com"])]);

        let summary = board.finalize();
        assert_eq!(summary.total_changes, 3);
        assert_eq!(summary.impacts.len(), 1);
        assert_eq!(summary.impacts[0].label, "a@x.com, b@x.com");
        assert_eq!(summary.impacts[0].hits, 3);
    }

    #[test]
    fn empty_owner_set_contributes_nothing() {
        let mut board = Scoreboard::default();
        board.record_commit();
        board.record(&[]);

        let summary = board.finalize();
        assert_eq!(summary.total_commits, 1);
        assert_eq!(summary.total_changes, 0);
        assert!(summary.impacts.is_empty());
    }

    #[test]
    fn hits_always_sum_to_total_changes() {
        let mut board = Scoreboard::default();
        board.record(&[identity(&["a@x.com"]), identity(&["b@x.com"])]);
        board.record(&[identity(&["b@x.com"])]);
        board.record(&[identity(&["c@x.com", "d@x.com"])]);

        let summary = board.finalize();
        let hit_sum: u64 = summary.impacts.iter().map(|i| i.hits).sum();
        assert_eq!(hit_sum, summary.total_changes);
        assert_eq!(summary.total_changes, 4);
    }

    #[test]
    fn percentages_round_to_one_decimal() {
        let mut board = Scoreboard::default();
        board.record(&[identity(&["a@x.com"])]);
        board.record(&[identity(&["b@x.com"])]);
        board.record(&[identity(&["b@x.com"])]);

        let summary = board.finalize();
        assert_eq!(summary.impacts[0].label, "b@x.com");
        assert!((summary.impacts[0].percentage - 66.7).abs() < 1e-9);
        assert!((summary.impacts[1].percentage - 33.3).abs() < 1e-9);
    }

    #[test]
    fn merge_sums_totals_and_unions_buckets() {
        let mut left = Scoreboard::default();
        left.record_commit();
        left.record(&[identity(&["a@x.com"])]);

        let mut right = Scoreboard::default();
        right.record_commit();
        right.record_commit();
        right.record(&[identity(&["a@x.com"]), identity(&["b@x.com"])]);

        left.merge(right);
        let summary = left.finalize();
        assert_eq!(summary.total_commits, 3);
        assert_eq!(summary.total_changes, 3);
        assert_eq!(summary.impacts.len(), 2);
        assert_eq!(summary.impacts[0].label, "a@x.com");
        assert_eq!(summary.impacts[0].hits, 2);
    }

    #[test]
    fn merge_grouping_does_not_change_the_partition() {
        // (a|b) recorded in one partial board, (b) and (c) in another;
        // merging either way ends with the same buckets and counts.
        let mut one = Scoreboard::default();
        one.record(&[identity(&["a@x.com", "b@x.com"])]);
        let mut two = Scoreboard::default();
        two.record(&[identity(&["b@x.com"])]);
        two.record(&[identity(&["c@x.com"])]);

        let mut forward = Scoreboard::default();
        forward.merge(one);
        forward.merge(two);

        let mut one = Scoreboard::default();
        one.record(&[identity(&["a@x.com", "b@x.com"])]);
        let mut two = Scoreboard::default();
        two.record(&[identity(&["b@x.com"])]);
        two.record(&[identity(&["c@x.com"])]);

        let mut backward = Scoreboard::default();
        backward.merge(two);
        backward.merge(one);

        assert_eq!(forward.finalize(), backward.finalize());
    }

    #[test]
    fn ranking_is_deterministic_on_ties() {
        let mut board = Scoreboard::default();
        board.record(&[identity(&["b@x.com"]), identity(&["a@x.com"])]);

        let summary = board.finalize();
        let labels: Vec<&str> = summary.impacts.iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, vec!["a@x.com", "b@x.com"]);
    }

    #[test]
    fn line_range_displays_as_start_comma_count() {
        let range = LineRange { start: 120, count: 3 };
        assert_eq!(range.to_string(), "120,3");
    }
}
