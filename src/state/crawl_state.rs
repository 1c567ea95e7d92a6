/// Crawl loop state definitions
///
/// The loop runs `Idle -> Running`, then for each frontier item
/// `Running -> ItemFetched -> ItemRouted -> ItemFinalized -> Running`, and
/// ends in `Drained` when the frontier is empty. A failed fetch skips
/// straight from `Running` to `ItemFinalized`. `Aborted` is reachable from
/// every non-terminal state.
use std::fmt;

/// Represents the current state of the crawl loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlState {
    /// Created, nothing enqueued or fetched yet
    Idle,

    /// Between items: about to look at the frontier
    Running,

    /// The current item's resource has been fetched and recorded in history
    ItemFetched,

    /// The resource has been classified and handled as media or page
    ItemRouted,

    /// The current item has been removed from the frontier
    ItemFinalized,

    /// The frontier is empty (terminal, success)
    Drained,

    /// Stopped by an interrupt or a fatal error (terminal)
    Aborted,
}

impl CrawlState {
    /// Returns true if no further transitions are possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Drained | Self::Aborted)
    }

    /// Returns true while an item is held by the loop
    pub fn is_processing_item(&self) -> bool {
        matches!(self, Self::ItemFetched | Self::ItemRouted)
    }

    /// Checks whether moving to `next` is allowed
    pub fn can_transition_to(&self, next: CrawlState) -> bool {
        use CrawlState::*;

        if next == Aborted {
            return !self.is_terminal();
        }

        matches!(
            (self, next),
            (Idle, Running)
                | (Running, ItemFetched)
                | (Running, ItemFinalized)
                | (Running, Drained)
                | (ItemFetched, ItemRouted)
                | (ItemRouted, ItemFinalized)
                | (ItemFinalized, Running)
        )
    }

    /// Short lowercase name used in log lines
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::ItemFetched => "item_fetched",
            Self::ItemRouted => "item_routed",
            Self::ItemFinalized => "item_finalized",
            Self::Drained => "drained",
            Self::Aborted => "aborted",
        }
    }

    /// Returns all possible crawl states
    pub fn all_states() -> Vec<Self> {
        vec![
            Self::Idle,
            Self::Running,
            Self::ItemFetched,
            Self::ItemRouted,
            Self::ItemFinalized,
            Self::Drained,
            Self::Aborted,
        ]
    }
}

impl fmt::Display for CrawlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
