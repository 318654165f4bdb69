//! Up-next episode queue
//!
//! An ordered list of episodes with a cursor on the current one. The queue
//! never advances on its own: moving the cursor is always an explicit intent.
//!
//! ```text
//! episodes: [A] [B] [C] [D]
//!                ^
//!              index (current = B)
//! ```
//!
//! An empty cursor means nothing from the queue is current yet; advancing
//! from there moves to the first episode.

use podcue_core::EpisodeDescriptor;
use rand::seq::SliceRandom;
use rand::thread_rng;
use std::sync::Arc;

/// Ordered episodes plus a cursor
#[derive(Debug, Clone, Default)]
pub struct EpisodeQueue {
    episodes: Vec<Arc<EpisodeDescriptor>>,
    index: Option<usize>,
}

impl EpisodeQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the queue with a single episode and make it current
    pub fn play_now(&mut self, episode: Arc<EpisodeDescriptor>) {
        self.episodes = vec![episode];
        self.index = Some(0);
    }

    /// Replace the queue with `episodes`, the first one current
    pub fn play_all(&mut self, episodes: Vec<Arc<EpisodeDescriptor>>) {
        self.index = if episodes.is_empty() { None } else { Some(0) };
        self.episodes = episodes;
    }

    /// Replace the queue with `episodes` in random order
    pub fn shuffle_all(&mut self, mut episodes: Vec<Arc<EpisodeDescriptor>>) {
        episodes.shuffle(&mut thread_rng());
        self.play_all(episodes);
    }

    /// Insert right after the current episode
    pub fn add_next(&mut self, episode: Arc<EpisodeDescriptor>) {
        let at = self.insertion_point();
        self.episodes.insert(at, episode);
    }

    /// Append to the end
    pub fn add_later(&mut self, episode: Arc<EpisodeDescriptor>) {
        self.episodes.push(episode);
    }

    /// Insert several episodes right after the current one, keeping their order
    pub fn add_all_next(&mut self, episodes: Vec<Arc<EpisodeDescriptor>>) {
        let at = self.insertion_point();
        self.episodes.splice(at..at, episodes);
    }

    /// Append several episodes
    pub fn add_all_later(&mut self, episodes: Vec<Arc<EpisodeDescriptor>>) {
        self.episodes.extend(episodes);
    }

    /// Move to the next episode, if there is one
    pub fn advance(&mut self) -> Option<Arc<EpisodeDescriptor>> {
        let next = self.index.map_or(0, |index| index + 1);
        if next >= self.episodes.len() {
            return None;
        }
        self.index = Some(next);
        self.current()
    }

    /// Move to the previous episode, if there is one
    pub fn retreat(&mut self) -> Option<Arc<EpisodeDescriptor>> {
        match self.index {
            Some(index) if index > 0 => {
                self.index = Some(index - 1);
                self.current()
            }
            _ => None,
        }
    }

    /// Make the episode at `index` current
    pub fn jump_to(&mut self, index: usize) -> Option<Arc<EpisodeDescriptor>> {
        if index >= self.episodes.len() {
            return None;
        }
        self.index = Some(index);
        self.current()
    }

    /// Remove the episode at `index`
    ///
    /// Removing an episode before the cursor shifts the cursor with it; a
    /// cursor past the new end is clamped to the last episode.
    pub fn remove(&mut self, index: usize) -> Option<Arc<EpisodeDescriptor>> {
        if index >= self.episodes.len() {
            return None;
        }
        let removed = self.episodes.remove(index);

        self.index = match self.index {
            _ if self.episodes.is_empty() => None,
            Some(current) if index < current => Some(current - 1),
            Some(current) => Some(current.min(self.episodes.len() - 1)),
            None => None,
        };

        Some(removed)
    }

    /// Current episode
    pub fn current(&self) -> Option<Arc<EpisodeDescriptor>> {
        self.index
            .and_then(|index| self.episodes.get(index))
            .map(Arc::clone)
    }

    /// Cursor position
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    /// All queued episodes in play order
    pub fn episodes(&self) -> &[Arc<EpisodeDescriptor>] {
        &self.episodes
    }

    /// Episodes after the current one
    pub fn upcoming(&self) -> &[Arc<EpisodeDescriptor>] {
        &self.episodes[self.insertion_point()..]
    }

    /// Number of queued episodes
    pub fn len(&self) -> usize {
        self.episodes.len()
    }

    /// Whether the queue is empty
    pub fn is_empty(&self) -> bool {
        self.episodes.is_empty()
    }

    /// Clear queue
    pub fn clear(&mut self) {
        self.episodes.clear();
        self.index = None;
    }

    fn insertion_point(&self) -> usize {
        self.index.map_or(0, |index| index + 1).min(self.episodes.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn episode(id: &str) -> Arc<EpisodeDescriptor> {
        Arc::new(EpisodeDescriptor::new(id, "pod", id, format!("{id}.mp3")))
    }

    fn ids(queue: &EpisodeQueue) -> Vec<&str> {
        queue.episodes().iter().map(|e| e.id.as_str()).collect()
    }

    fn current_id(queue: &EpisodeQueue) -> Option<String> {
        queue.current().map(|e| e.id.to_string())
    }

    #[test]
    fn play_now_replaces_queue() {
        let mut queue = EpisodeQueue::new();
        queue.play_all(vec![episode("a"), episode("b")]);
        queue.play_now(episode("c"));

        assert_eq!(ids(&queue), vec!["c"]);
        assert_eq!(current_id(&queue).as_deref(), Some("c"));
    }

    #[test]
    fn add_next_inserts_after_current() {
        let mut queue = EpisodeQueue::new();
        queue.play_all(vec![episode("a"), episode("b"), episode("c")]);
        queue.advance();
        queue.add_next(episode("x"));
        queue.add_later(episode("z"));

        assert_eq!(ids(&queue), vec!["a", "b", "x", "c", "z"]);
        assert_eq!(current_id(&queue).as_deref(), Some("b"));
    }

    #[test]
    fn add_all_next_keeps_order() {
        let mut queue = EpisodeQueue::new();
        queue.play_now(episode("a"));
        queue.add_later(episode("b"));
        queue.add_all_next(vec![episode("x"), episode("y")]);
        queue.add_all_later(vec![episode("z")]);

        assert_eq!(ids(&queue), vec!["a", "x", "y", "b", "z"]);
    }

    #[test]
    fn empty_cursor_advances_to_first() {
        let mut queue = EpisodeQueue::new();
        queue.add_next(episode("a"));
        queue.add_later(episode("b"));
        assert!(queue.current().is_none());

        assert_eq!(queue.advance().map(|e| e.id.to_string()).as_deref(), Some("a"));
        assert_eq!(queue.upcoming().len(), 1);
    }

    #[test]
    fn advance_and_retreat_stop_at_edges() {
        let mut queue = EpisodeQueue::new();
        queue.play_all(vec![episode("a"), episode("b")]);

        assert!(queue.retreat().is_none());
        assert!(queue.advance().is_some());
        assert!(queue.advance().is_none());
        assert_eq!(current_id(&queue).as_deref(), Some("b"));
        assert!(queue.retreat().is_some());
        assert_eq!(queue.index(), Some(0));
    }

    #[test]
    fn jump_to_rejects_out_of_range() {
        let mut queue = EpisodeQueue::new();
        queue.play_all(vec![episode("a"), episode("b")]);

        assert!(queue.jump_to(5).is_none());
        assert_eq!(queue.index(), Some(0));
        assert!(queue.jump_to(1).is_some());
        assert_eq!(queue.index(), Some(1));
    }

    #[test]
    fn remove_adjusts_cursor() {
        let mut queue = EpisodeQueue::new();
        queue.play_all(vec![episode("a"), episode("b"), episode("c")]);
        queue.jump_to(2);

        queue.remove(0);
        assert_eq!(current_id(&queue).as_deref(), Some("c"));
        assert_eq!(queue.index(), Some(1));

        queue.remove(1);
        assert_eq!(current_id(&queue).as_deref(), Some("b"));

        queue.remove(0);
        assert!(queue.current().is_none());
        assert!(queue.is_empty());
        assert!(queue.remove(0).is_none());
    }

    #[test]
    fn shuffle_keeps_every_episode() {
        let mut queue = EpisodeQueue::new();
        let episodes: Vec<_> = (0..20).map(|i| episode(&format!("e{i}"))).collect();
        queue.shuffle_all(episodes);

        let mut shuffled: Vec<_> = ids(&queue).into_iter().map(str::to_string).collect();
        shuffled.sort();
        let mut expected: Vec<_> = (0..20).map(|i| format!("e{i}")).collect();
        expected.sort();

        assert_eq!(shuffled, expected);
        assert_eq!(queue.index(), Some(0));
    }
}
