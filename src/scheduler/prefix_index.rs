//! Prefix trie over normalized card text
//!
//! Every node, the root included, keeps the set of card ids whose text passes
//! through it. A prefix lookup is therefore a walk of `|prefix|` characters
//! and the empty prefix matches every indexed card.

use std::collections::{HashMap, HashSet};

use uuid::Uuid;

/// A node in the prefix trie
#[derive(Debug, Default)]
struct TrieNode {
    children: HashMap<char, TrieNode>,
    card_ids: HashSet<Uuid>,
}

impl TrieNode {
    fn count_nodes(&self) -> usize {
        1 + self
            .children
            .values()
            .map(|c| c.count_nodes())
            .sum::<usize>()
    }
}

#[derive(Debug, Default)]
pub struct PrefixIndex {
    root: TrieNode,
}

impl PrefixIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `card_id` to every node along `text`
    pub fn insert(&mut self, text: &str, card_id: Uuid) {
        let mut node = &mut self.root;
        node.card_ids.insert(card_id);

        for ch in text.chars() {
            node = node.children.entry(ch).or_default();
            node.card_ids.insert(card_id);
        }
    }

    /// Ids of all cards whose text starts with `prefix`
    pub fn search(&self, prefix: &str) -> HashSet<Uuid> {
        self.matches(prefix).cloned().unwrap_or_default()
    }

    /// Borrowed form of [`search`](Self::search); `None` when nothing matches
    pub fn matches(&self, prefix: &str) -> Option<&HashSet<Uuid>> {
        let mut node = &self.root;
        for ch in prefix.chars() {
            node = node.children.get(&ch)?;
        }
        Some(&node.card_ids).filter(|ids| !ids.is_empty())
    }

    /// Remove `card_id` from every node along `text`, pruning emptied nodes.
    /// Returns false if the card was not indexed.
    pub fn remove(&mut self, text: &str, card_id: &Uuid) -> bool {
        let path: Vec<char> = text.chars().collect();
        Self::remove_along(&mut self.root, &path, card_id)
    }

    fn remove_along(node: &mut TrieNode, path: &[char], card_id: &Uuid) -> bool {
        if !node.card_ids.remove(card_id) {
            return false;
        }

        if let Some((first, rest)) = path.split_first() {
            if let Some(child) = node.children.get_mut(first) {
                Self::remove_along(child, rest, card_id);
                // Descendant sets are subsets, so an empty child has an empty subtree
                if child.card_ids.is_empty() {
                    node.children.remove(first);
                }
            }
        }

        true
    }

    /// Number of indexed cards
    pub fn len(&self) -> usize {
        self.root.card_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.card_ids.is_empty()
    }

    /// Total nodes, root included
    pub fn node_count(&self) -> usize {
        self.root.count_nodes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index_with(words: &[&str]) -> (PrefixIndex, Vec<Uuid>) {
        let mut index = PrefixIndex::new();
        let ids: Vec<Uuid> = words.iter().map(|_| Uuid::new_v4()).collect();
        for (word, id) in words.iter().zip(&ids) {
            index.insert(word, *id);
        }
        (index, ids)
    }

    #[test]
    fn test_prefix_search_at_any_depth() {
        let (index, ids) = index_with(&["casa", "cama", "perro"]);

        assert_eq!(index.search("ca"), HashSet::from([ids[0], ids[1]]));
        assert_eq!(index.search("cas"), HashSet::from([ids[0]]));
        assert_eq!(index.search("casa"), HashSet::from([ids[0]]));
        assert_eq!(index.search("p"), HashSet::from([ids[2]]));
    }

    #[test]
    fn test_missing_prefix_is_empty() {
        let (index, _) = index_with(&["casa"]);

        assert!(index.search("casas").is_empty());
        assert!(index.search("x").is_empty());
        assert!(index.matches("x").is_none());
    }

    #[test]
    fn test_empty_prefix_matches_everything() {
        let (index, ids) = index_with(&["casa", "cama", "perro"]);

        let all: HashSet<Uuid> = ids.into_iter().collect();
        assert_eq!(index.search(""), all);
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn test_empty_index() {
        let index = PrefixIndex::new();
        assert!(index.search("").is_empty());
        assert!(index.is_empty());
    }

    #[test]
    fn test_multibyte_characters() {
        let (index, ids) = index_with(&["ñandú", "über"]);

        assert_eq!(index.search("ñ"), HashSet::from([ids[0]]));
        assert_eq!(index.search("üb"), HashSet::from([ids[1]]));
    }

    #[test]
    fn test_shared_text() {
        let (index, ids) = index_with(&["gato", "gato"]);
        assert_eq!(index.search("gato").len(), 2);
        assert!(index.search("gato").contains(&ids[1]));
    }

    #[test]
    fn test_remove_prunes_empty_nodes() {
        let (mut index, ids) = index_with(&["casa", "cama"]);
        // root + c + a + (s, a) + (m, a)
        assert_eq!(index.node_count(), 7);

        assert!(index.remove("casa", &ids[0]));
        assert_eq!(index.node_count(), 5);
        assert!(index.search("cas").is_empty());
        assert_eq!(index.search("ca"), HashSet::from([ids[1]]));

        assert!(!index.remove("casa", &ids[0]));

        assert!(index.remove("cama", &ids[1]));
        assert_eq!(index.node_count(), 1);
        assert!(index.is_empty());
    }
}
