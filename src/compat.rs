/// Type token that matches any other type.
pub const WILDCARD: &str = "*";

/// Whether an output of `producer` type may feed an input of `consumer` type.
///
/// Absent types are accepted, as is the wildcard on either side. Otherwise the type
/// names must match case-insensitively; there are no other coercions.
pub fn is_compatible(producer: Option<&str>, consumer: Option<&str>) -> bool {
    match (producer, consumer) {
        (None, _) | (_, None) => true,
        (Some(p), Some(c)) => p == WILDCARD || c == WILDCARD || p.eq_ignore_ascii_case(c),
    }
}
