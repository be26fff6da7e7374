//! Sequential username allocation.
//!
//! Generated usernames follow the `d<number>` pattern. The allocator reads
//! the current usernames and suggests the next number; it does not reserve
//! anything. Uniqueness is enforced by the database constraint on
//! `users.username`, and the approval workflow retries on conflict.

use model::entities::user;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QuerySelect};
use tracing::{debug, instrument};

use crate::error::Result;

/// Prefix of generated usernames.
pub const USERNAME_PREFIX: &str = "d";

/// Numbering starts above this, so the first generated username is `d101`.
pub const USERNAME_BASELINE: u64 = 100;

/// Parse the numeric suffix of a generated username.
///
/// Returns `None` for anything that is not the prefix followed by digits
/// only, so legacy usernames ("shanto") and accidental `d`-prefixed names
/// ("design", "d-temp") are skipped rather than treated as errors. A
/// zero-padded suffix parses by numeric value: `d007` is 7.
fn numeric_suffix(username: &str) -> Option<u64> {
    let suffix = username.strip_prefix(USERNAME_PREFIX)?;
    if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    suffix.parse().ok()
}

/// Compute the next username from a snapshot of existing names.
pub fn next_from<'a>(usernames: impl IntoIterator<Item = &'a str>) -> String {
    let highest = usernames
        .into_iter()
        .filter_map(numeric_suffix)
        .max()
        .unwrap_or(USERNAME_BASELINE);

    format!("{}{}", USERNAME_PREFIX, highest + 1)
}

/// Suggest the next sequential username based on the current user table.
///
/// The result is a suggestion at read time: two concurrent callers can
/// receive the same name. Callers must treat an insert-time uniqueness
/// violation as the authoritative signal, not this read.
#[instrument(skip(db))]
pub async fn next_username<C: ConnectionTrait>(db: &C) -> Result<String> {
    let usernames: Vec<String> = user::Entity::find()
        .select_only()
        .column(user::Column::Username)
        .filter(user::Column::Username.starts_with(USERNAME_PREFIX))
        .into_tuple()
        .all(db)
        .await?;

    let next = next_from(usernames.iter().map(String::as_str));
    debug!(candidates = usernames.len(), next, "allocated candidate username");
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_allocation_starts_at_101() {
        assert_eq!(next_from([]), "d101");
    }

    #[test]
    fn ignores_non_numeric_usernames() {
        assert_eq!(next_from(["d101", "d105", "shanto"]), "d106");
    }

    #[test]
    fn ignores_d_prefixed_non_allocations() {
        assert_eq!(next_from(["design", "d-temp", "dABC"]), "d101");
    }

    #[test]
    fn zero_padding_is_not_preserved() {
        // d007 parses to 7, and the next name is numeric, not fixed-width.
        assert_eq!(next_from(["d007"]), "d8");
    }

    #[test]
    fn bare_prefix_is_ignored() {
        assert_eq!(next_from(["d"]), "d101");
    }

    #[test]
    fn suffix_parsing() {
        assert_eq!(numeric_suffix("d101"), Some(101));
        assert_eq!(numeric_suffix("d007"), Some(7));
        assert_eq!(numeric_suffix("d"), None);
        assert_eq!(numeric_suffix("design"), None);
        assert_eq!(numeric_suffix("d-temp"), None);
        assert_eq!(numeric_suffix("shanto"), None);
        assert_eq!(numeric_suffix("d12x"), None);
    }
}
