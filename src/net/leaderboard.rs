//! Arena leaderboard keyed by player id

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Entries sent to clients with each state update
pub const MAX_SHOWN: usize = 10;

/// One arena participant's standing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderEntry {
    pub id: u32,
    pub name: String,
    pub score: u64,
    pub alive: bool,
    #[serde(rename = "isBot", default)]
    pub is_bot: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Leaderboard {
    entries: HashMap<u32, LeaderEntry>,
}

impl Leaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: u32) -> Option<&LeaderEntry> {
        self.entries.get(&id)
    }

    /// Insert or replace the entry for `entry.id`
    pub fn upsert(&mut self, entry: LeaderEntry) {
        self.entries.insert(entry.id, entry);
    }

    /// Add to a player's score; unknown ids are ignored
    pub fn add_score(&mut self, id: u32, points: u64) -> Option<u64> {
        let entry = self.entries.get_mut(&id)?;
        entry.score += points;
        Some(entry.score)
    }

    pub fn set_alive(&mut self, id: u32, alive: bool) {
        if let Some(entry) = self.entries.get_mut(&id) {
            entry.alive = alive;
        }
    }

    pub fn remove(&mut self, id: u32) -> Option<LeaderEntry> {
        self.entries.remove(&id)
    }

    /// Every entry, highest score first; ties broken by id
    pub fn ranked(&self) -> Vec<&LeaderEntry> {
        let mut ranked: Vec<&LeaderEntry> = self.entries.values().collect();
        ranked.sort_by(|a, b| b.score.cmp(&a.score).then(a.id.cmp(&b.id)));
        ranked
    }

    /// 1-indexed rank of a player
    pub fn rank_of(&self, id: u32) -> Option<usize> {
        self.ranked().iter().position(|e| e.id == id).map(|i| i + 1)
    }

    /// The slice of the board shown to clients
    pub fn top(&self) -> Vec<LeaderEntry> {
        self.ranked()
            .into_iter()
            .take(MAX_SHOWN)
            .cloned()
            .collect()
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.values().map(|e| e.score).max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: u32, score: u64) -> LeaderEntry {
        LeaderEntry {
            id,
            name: format!("p{id}"),
            score,
            alive: true,
            is_bot: false,
        }
    }

    #[test]
    fn test_ranking_order() {
        let mut board = Leaderboard::new();
        board.upsert(entry(3, 50));
        board.upsert(entry(1, 200));
        board.upsert(entry(2, 50));

        let ids: Vec<u32> = board.ranked().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(board.rank_of(3), Some(3));
        assert_eq!(board.rank_of(99), None);
        assert_eq!(board.top_score(), Some(200));
    }

    #[test]
    fn test_upsert_replaces_by_id() {
        let mut board = Leaderboard::new();
        board.upsert(entry(7, 10));
        board.upsert(entry(7, 40));
        assert_eq!(board.len(), 1);
        assert_eq!(board.add_score(7, 5), Some(45));
        assert_eq!(board.add_score(8, 5), None);

        board.set_alive(7, false);
        assert_eq!(board.get(7).map(|e| e.alive), Some(false));
        assert!(board.remove(7).is_some());
        assert!(board.is_empty());
    }

    #[test]
    fn test_top_is_capped() {
        let mut board = Leaderboard::new();
        for id in 0..25 {
            board.upsert(entry(id, id as u64));
        }
        let top = board.top();
        assert_eq!(top.len(), MAX_SHOWN);
        assert_eq!(top[0].id, 24);
    }

    #[test]
    fn test_empty_board() {
        let board = Leaderboard::new();
        assert!(board.is_empty());
        assert_eq!(board.top_score(), None);
        assert!(board.top().is_empty());
    }
}
