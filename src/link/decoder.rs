/// Inbound frame classifier.
///
/// Rules, first match wins:
///   1. exact `"green tower"`          → `ScoreBonus { amount: 50 }`
///   2. prefix `"route_index:"`        → `RouteStep` or `Malformed`
///   3. anything else                  → `Opaque`
///
/// Route frames are `route_index:<index>:<action>`. Fields past the
/// action are ignored. Decoding never fails hard: bad route frames come
/// back as `Malformed` for the channel to log.

use crate::error::DecodeError;

pub const BONUS_SENTINEL: &str = "green tower";
pub const BONUS_AMOUNT: i64 = 50;
pub const ROUTE_PREFIX: &str = "route_index:";
const SEPARATOR: char = ':';

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Inbound {
    ScoreBonus { amount: i64 },
    RouteStep { index: i64, action: String },
    Malformed(DecodeError),
    Opaque { text: String },
}

pub fn decode(text: &str) -> Inbound {
    if text == BONUS_SENTINEL {
        return Inbound::ScoreBonus { amount: BONUS_AMOUNT };
    }

    if text.starts_with(ROUTE_PREFIX) {
        let parts: Vec<&str> = text.split(SEPARATOR).collect();
        if parts.len() < 3 {
            return Inbound::Malformed(DecodeError::MalformedRoute(text.to_string()));
        }
        return match parse_index(parts[1]) {
            Some(index) => Inbound::RouteStep { index, action: parts[2].to_string() },
            None => Inbound::Malformed(DecodeError::InvalidIndex(parts[1].to_string())),
        };
    }

    Inbound::Opaque { text: text.to_string() }
}

/// Lenient decimal parse: leading whitespace, optional sign, then the
/// longest run of digits. Trailing text is ignored (`"12ab"` → 12).
/// No digits, or overflow, is a failure.
fn parse_index(field: &str) -> Option<i64> {
    let s = field.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
    if end == 0 {
        return None;
    }
    let magnitude: i64 = rest[..end].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}
