//! Ordered score index backing the rank cache.
//!
//! [`ScoreIndex`] is an order-statistics treap over `(score, user)` keys:
//! expected O(log N) upsert/remove/rank-of and O(log N + K) top-K, which is
//! what lets the leaderboard stay queryable while pipeline workers write to
//! it. Entries order by descending score; ties break by ascending user id so
//! every query is deterministic.

use std::cmp::Ordering;
use std::collections::HashMap;

use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};

use super::ids::UserId;

/// One leaderboard row: a user and the score the index currently holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankEntry {
    /// Ranked user.
    pub user_id: UserId,
    /// Score recorded for the user (the ledger total at write time).
    pub score: u64,
}

/// Tree key. "Less" means better ranked: higher score first, then smaller
/// user id.
#[derive(Debug, Clone, PartialEq, Eq)]
struct EntryKey {
    score: u64,
    user_id: UserId,
}

impl Ord for EntryKey {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .cmp(&self.score)
            .then_with(|| self.user_id.cmp(&other.user_id))
    }
}

impl PartialOrd for EntryKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Clone)]
struct Node {
    key: EntryKey,
    priority: u64,
    left: Option<usize>,
    right: Option<usize>,
    size: usize,
}

/// Order-statistics treap over user scores.
///
/// Nodes live in an arena (`Vec<Node>`) addressed by index; removed slots are
/// recycled through a free list. A side map from user to current score makes
/// upserts overwrite (never increment) and keeps `score_of` O(1).
pub struct ScoreIndex {
    nodes: Vec<Node>,
    free: Vec<usize>,
    root: Option<usize>,
    scores: HashMap<UserId, u64>,
    rng: SmallRng,
}

impl ScoreIndex {
    /// Build an empty index with entropy-seeded treap priorities.
    pub fn new() -> Self {
        Self::from_rng(SmallRng::from_entropy())
    }

    /// Build an empty index with a fixed priority seed.
    ///
    /// Deterministic tree shapes make structural tests reproducible; query
    /// results are identical for every seed.
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(SmallRng::seed_from_u64(seed))
    }

    fn from_rng(rng: SmallRng) -> Self {
        Self {
            nodes: Vec::new(),
            free: Vec::new(),
            root: None,
            scores: HashMap::new(),
            rng,
        }
    }

    /// Number of ranked users.
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    /// True when no user is ranked.
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Insert or overwrite the score for `user_id`.
    ///
    /// Overwrite semantics make redelivered updates naturally idempotent:
    /// writing the same score twice leaves the index unchanged.
    pub fn upsert(&mut self, user_id: UserId, score: u64) {
        let existing = self.scores.get(&user_id).copied();
        if let Some(existing) = existing {
            if existing == score {
                return;
            }
            self.remove_key(&EntryKey {
                score: existing,
                user_id: user_id.clone(),
            });
        }
        self.insert_key(EntryKey {
            score,
            user_id: user_id.clone(),
        });
        self.scores.insert(user_id, score);
    }

    /// Drop the entry for `user_id`, if present.
    pub fn remove(&mut self, user_id: &UserId) -> bool {
        let Some(score) = self.scores.remove(user_id) else {
            return false;
        };
        self.remove_key(&EntryKey {
            score,
            user_id: user_id.clone(),
        });
        true
    }

    /// Score currently held for `user_id`.
    pub fn score_of(&self, user_id: &UserId) -> Option<u64> {
        self.scores.get(user_id).copied()
    }

    /// 1-based rank of `user_id` in descending score order.
    pub fn rank_of(&self, user_id: &UserId) -> Option<u64> {
        let score = self.score_of(user_id)?;
        let target = EntryKey {
            score,
            user_id: user_id.clone(),
        };
        let mut preceding: u64 = 0;
        let mut cursor = self.root;
        while let Some(idx) = cursor {
            let node = &self.nodes[idx];
            match target.cmp(&node.key) {
                Ordering::Less => cursor = node.left,
                Ordering::Equal => {
                    preceding += self.subtree_size(node.left) as u64;
                    return Some(preceding + 1);
                }
                Ordering::Greater => {
                    preceding += self.subtree_size(node.left) as u64 + 1;
                    cursor = node.right;
                }
            }
        }
        // The side map said the user exists, so the walk must find the key.
        None
    }

    /// Up to `k` best-ranked entries in descending score order.
    pub fn top(&self, k: usize) -> Vec<RankEntry> {
        let mut out = Vec::with_capacity(k.min(self.len()));
        let mut stack: Vec<usize> = Vec::new();
        let mut cursor = self.root;
        while (cursor.is_some() || !stack.is_empty()) && out.len() < k {
            while let Some(idx) = cursor {
                stack.push(idx);
                cursor = self.nodes[idx].left;
            }
            if let Some(idx) = stack.pop() {
                let node = &self.nodes[idx];
                out.push(RankEntry {
                    user_id: node.key.user_id.clone(),
                    score: node.key.score,
                });
                cursor = node.right;
            }
        }
        out
    }

    fn insert_key(&mut self, key: EntryKey) {
        let priority = self.rng.next_u64();
        let slot = self.alloc(Node {
            key: key.clone(),
            priority,
            left: None,
            right: None,
            size: 1,
        });
        let (left, right) = self.split(self.root, &key);
        let with_node = self.merge(left, Some(slot));
        self.root = self.merge(with_node, right);
    }

    fn remove_key(&mut self, key: &EntryKey) {
        self.root = self.remove_rec(self.root, key);
    }

    fn remove_rec(&mut self, tree: Option<usize>, key: &EntryKey) -> Option<usize> {
        let idx = tree?;
        match key.cmp(&self.nodes[idx].key) {
            Ordering::Less => {
                let child = self.remove_rec(self.nodes[idx].left, key);
                self.nodes[idx].left = child;
                self.refresh_size(idx);
                Some(idx)
            }
            Ordering::Greater => {
                let child = self.remove_rec(self.nodes[idx].right, key);
                self.nodes[idx].right = child;
                self.refresh_size(idx);
                Some(idx)
            }
            Ordering::Equal => {
                let merged = self.merge(self.nodes[idx].left, self.nodes[idx].right);
                self.free.push(idx);
                merged
            }
        }
    }

    /// Split `tree` into (keys < `key`, keys >= `key`).
    fn split(&mut self, tree: Option<usize>, key: &EntryKey) -> (Option<usize>, Option<usize>) {
        let Some(idx) = tree else {
            return (None, None);
        };
        if self.nodes[idx].key < *key {
            let right = self.nodes[idx].right;
            let (mid, high) = self.split(right, key);
            self.nodes[idx].right = mid;
            self.refresh_size(idx);
            (Some(idx), high)
        } else {
            let left = self.nodes[idx].left;
            let (low, mid) = self.split(left, key);
            self.nodes[idx].left = mid;
            self.refresh_size(idx);
            (low, Some(idx))
        }
    }

    /// Merge two treaps where every key in `a` precedes every key in `b`.
    fn merge(&mut self, a: Option<usize>, b: Option<usize>) -> Option<usize> {
        match (a, b) {
            (None, tree) | (tree, None) => tree,
            (Some(x), Some(y)) => {
                if self.nodes[x].priority >= self.nodes[y].priority {
                    let lower = self.nodes[x].right;
                    let merged = self.merge(lower, Some(y));
                    self.nodes[x].right = merged;
                    self.refresh_size(x);
                    Some(x)
                } else {
                    let upper = self.nodes[y].left;
                    let merged = self.merge(Some(x), upper);
                    self.nodes[y].left = merged;
                    self.refresh_size(y);
                    Some(y)
                }
            }
        }
    }

    fn alloc(&mut self, node: Node) -> usize {
        if let Some(slot) = self.free.pop() {
            self.nodes[slot] = node;
            slot
        } else {
            self.nodes.push(node);
            self.nodes.len() - 1
        }
    }

    fn refresh_size(&mut self, idx: usize) {
        let size = 1
            + self.subtree_size(self.nodes[idx].left)
            + self.subtree_size(self.nodes[idx].right);
        self.nodes[idx].size = size;
    }

    fn subtree_size(&self, tree: Option<usize>) -> usize {
        tree.map_or(0, |idx| self.nodes[idx].size)
    }
}

impl Default for ScoreIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ScoreIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoreIndex")
            .field("len", &self.len())
            .finish()
    }
}
