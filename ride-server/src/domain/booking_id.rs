//! Booking identifier type.

use std::fmt;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

const BASE36: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Length of the random suffix appended to generated identifiers.
const SUFFIX_LEN: usize = 4;

/// A booking identifier.
///
/// Generated identifiers are the base-36 millisecond timestamp followed by
/// a random base-36 suffix, e.g. `MBX1Q2ZK-7F3X`. They are short and sort
/// roughly by creation time, but are only probably unique: the store
/// enforces uniqueness on insert.
///
/// # Examples
///
/// ```
/// use ride_server::domain::BookingId;
///
/// let id = BookingId::new("MBX1Q2ZK-7F3X");
/// assert_eq!(id.as_str(), "MBX1Q2ZK-7F3X");
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookingId(String);

impl BookingId {
    /// Wrap an existing identifier (e.g. one taken from a URL).
    pub fn new(s: impl Into<String>) -> Self {
        BookingId(s.into())
    }

    /// Generate a fresh identifier for a booking created at `now`.
    pub fn generate<R: Rng>(now: DateTime<Utc>, rng: &mut R) -> Self {
        let millis = u64::try_from(now.timestamp_millis()).unwrap_or(0);

        let mut id = to_base36(millis);
        id.push('-');
        for _ in 0..SUFFIX_LEN {
            id.push(BASE36[rng.gen_range(0..BASE36.len())] as char);
        }
        BookingId(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn to_base36(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(BASE36[(n % 36) as usize]);
        n /= 36;
    }
    digits.reverse();
    // Only ASCII digits and uppercase letters are pushed.
    String::from_utf8(digits).unwrap_or_default()
}

impl fmt::Debug for BookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BookingId({})", self.0)
    }
}

impl fmt::Display for BookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
