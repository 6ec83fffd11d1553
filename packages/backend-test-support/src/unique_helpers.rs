//! Test helpers for generating unique test data
//!
//! Participant identities are derived from ULIDs so concurrently running
//! tests never share a user and trip the "already in a match" guard.

use ulid::Ulid;

/// Generate a unique string with the given prefix
///
/// # Examples
/// ```
/// use backend_test_support::unique_helpers::unique_str;
///
/// let id1 = unique_str("match");
/// let id2 = unique_str("match");
/// assert_ne!(id1, id2);
/// assert!(id1.starts_with("match-"));
/// ```
pub fn unique_str(prefix: &str) -> String {
    format!("{}-{}", prefix, Ulid::new())
}

/// Generate a unique, strictly positive user id.
///
/// # Examples
/// ```
/// use backend_test_support::unique_helpers::unique_user_id;
///
/// let a = unique_user_id();
/// let b = unique_user_id();
/// assert_ne!(a, b);
/// assert!(a > 0);
/// ```
pub fn unique_user_id() -> i64 {
    let raw = (Ulid::new().random() as u64) & (i64::MAX as u64);
    (raw as i64).max(1)
}

/// Generate a pair of distinct user ids for a two-player match.
pub fn unique_pair() -> (i64, i64) {
    let first = unique_user_id();
    let mut second = unique_user_id();
    while second == first {
        second = unique_user_id();
    }
    (first, second)
}
