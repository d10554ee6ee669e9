/// Item budget for a top-level traversal
///
/// The budget counts items the traversal has accumulated into its result
/// buffer. Items that only pass through the sink are not counted, which is
/// what lets a reply-draining walk run past `max_items`.
#[derive(Debug, Clone, Copy)]
pub struct CrawlBudget {
    max_items: usize,
    collected: usize,
}

impl CrawlBudget {
    /// Creates a budget capped at `max_items`
    pub fn new(max_items: usize) -> Self {
        Self {
            max_items,
            collected: 0,
        }
    }

    /// Returns how many more items fit under the cap
    pub fn remaining(&self) -> usize {
        self.max_items.saturating_sub(self.collected)
    }

    /// Returns true once the cap is reached
    pub fn is_exhausted(&self) -> bool {
        self.collected >= self.max_items
    }

    /// Records `count` accumulated items
    pub fn record(&mut self, count: usize) {
        self.collected += count;
    }

    /// Truncates `page` so that accumulating it cannot exceed the cap
    pub fn clamp_page<T>(&self, page: &mut Vec<T>) {
        let remaining = self.remaining();
        if page.len() > remaining {
            page.truncate(remaining);
        }
    }

    pub fn collected(&self) -> usize {
        self.collected
    }

    pub fn max_items(&self) -> usize {
        self.max_items
    }
}
