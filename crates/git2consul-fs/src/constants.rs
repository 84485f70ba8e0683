//! Names with special meaning inside a synchronized tree.

/// Entries whose name starts with this marker are hidden and never synced,
/// together with everything beneath them.
pub const HIDDEN_MARKER: char = '.';

/// File name that is deliberately left out of the key space.
pub const SENTINEL_FILE: &str = "README.md";

/// Returns true if `name` is a hidden entry (`.git`, `.env`, ...).
pub fn is_hidden(name: &str) -> bool {
    name.starts_with(HIDDEN_MARKER)
}
