/// Fetch state of a recorded page
///
/// A page is created `Pending` and moves to `Fetched` exactly once, when the
/// persistence stage stores the result of fetching it.
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchState {
    /// Known to the graph; outbound links not yet resolved
    Pending,

    /// Outbound links resolved and stored (possibly none, if the fetch failed)
    Fetched,
}

impl FetchState {
    /// Returns true if the page still needs fetching
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Converts the fetch state to its database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Fetched => "fetched",
        }
    }

    /// Parses a fetch state from its database string representation
    ///
    /// Returns None if the string doesn't match any known state.
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "fetched" => Some(Self::Fetched),
            _ => None,
        }
    }
}

impl fmt::Display for FetchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}
