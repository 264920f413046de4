use std::sync::Arc;

/// What a view shows for a fetch: exactly one of these at a time.
///
/// `Pending` and `Failed` supersede any data; there is no partially
/// loaded state.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState<T> {
    /// Request outstanding (or never started)
    Pending,
    /// Data loaded and non-empty
    Ready(Arc<T>),
    /// Request succeeded but returned nothing to show
    Empty,
    /// Request failed; carries the user-facing message
    Failed(String),
}

impl<T> LoadState<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, LoadState::Pending)
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            LoadState::Ready(data) => Some(data.as_ref()),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            LoadState::Failed(msg) => Some(msg),
            _ => None,
        }
    }
}

impl<T> Default for LoadState<T> {
    fn default() -> Self {
        LoadState::Pending
    }
}

/// Issued when a fetch starts; only the latest ticket may complete it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    pub(crate) generation: u64,
}

/// Decides whether a finished fetch may still write into its view.
///
/// A result is accepted only while the view is mounted and only for the
/// most recent ticket; anything else arrived too late and is dropped.
#[derive(Debug, Clone)]
pub struct RefreshGuard {
    generation: u64,
    mounted: bool,
}

impl RefreshGuard {
    pub fn new() -> Self {
        Self {
            generation: 0,
            mounted: true,
        }
    }

    /// Start a new fetch, invalidating every earlier ticket.
    pub fn begin(&mut self) -> LoadTicket {
        self.generation += 1;
        LoadTicket {
            generation: self.generation,
        }
    }

    pub fn accepts(&self, ticket: LoadTicket) -> bool {
        self.mounted && ticket.generation == self.generation
    }

    pub fn unmount(&mut self) {
        self.mounted = false;
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }
}

impl Default for RefreshGuard {
    fn default() -> Self {
        Self::new()
    }
}
