use std::collections::VecDeque;

use crate::ui::render::{FeedEntryView, PanelView};

/// Client-side model of one feed panel: newest entry first, trimmed to
/// a fixed number of visible entries.
#[derive(Debug, Clone)]
pub struct FeedPanel {
    entries: VecDeque<FeedEntryView>,
    limit: usize,
    placeholder: String,
}

impl FeedPanel {
    pub fn new(limit: usize, placeholder: &str) -> Self {
        Self {
            entries: VecDeque::new(),
            limit,
            placeholder: placeholder.to_string(),
        }
    }

    /// Prepend a new entry and trim to the visible limit.
    pub fn prepend(&mut self, entry: FeedEntryView) {
        self.entries.push_front(entry);
        while self.entries.len() > self.limit {
            self.entries.pop_back();
        }
    }

    /// Reset to the empty placeholder state.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render the panel content.
    pub fn render(&self) -> PanelView {
        if self.entries.is_empty() {
            PanelView::Placeholder(self.placeholder.clone())
        } else {
            PanelView::Feed(self.entries.iter().cloned().collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(n: usize) -> FeedEntryView {
        FeedEntryView {
            tag: "info".to_string(),
            message: format!("entry {}", n),
            time: "00:00:00".to_string(),
        }
    }

    #[test]
    fn renders_placeholder_when_empty() {
        let panel = FeedPanel::new(10, "Waiting for real-time updates...");
        assert_eq!(
            panel.render(),
            PanelView::Placeholder("Waiting for real-time updates...".to_string())
        );
    }

    #[test]
    fn trims_to_limit_newest_first() {
        let mut panel = FeedPanel::new(3, "empty");
        for n in 0..5 {
            panel.prepend(entry(n));
        }
        match panel.render() {
            PanelView::Feed(entries) => {
                assert_eq!(entries.len(), 3);
                assert_eq!(entries[0].message, "entry 4");
                assert_eq!(entries[2].message, "entry 2");
            }
            other => panic!("expected feed, got {:?}", other),
        }
    }

    #[test]
    fn clear_returns_to_placeholder() {
        let mut panel = FeedPanel::new(3, "empty");
        panel.prepend(entry(0));
        panel.clear();
        assert!(panel.render().is_placeholder());
    }
}
