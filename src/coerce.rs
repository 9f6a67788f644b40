//! Conversions from raw annotation strings into typed values.
//!
//! Every helper takes the full key so the [`DirectiveError::InvalidFormat`]
//! it returns names the annotation that carried the value.

use std::{
    net::{IpAddr, Ipv4Addr, Ipv6Addr},
    sync::LazyLock,
    time::Duration,
};

use regex::Regex;

use crate::{
    annotations::AnnotationKey,
    err::{DirectiveError, DirectiveResult},
    resolver::ObjectName,
};

/// Spellings accepted as `true`. Matching is exact, no trimming or case folding.
pub const TRUTHY: &[&str] = &["1", "t", "T", "TRUE", "true", "True"];
/// Spellings accepted as `false`.
pub const FALSY: &[&str] = &["0", "f", "F", "FALSE", "false", "False"];

static DURATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[0-9]+(?:ms|s|m|h|d|w))+$").unwrap());
static DURATION_PART_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]+)(ms|s|m|h|d|w)").unwrap());
static SIZE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]+)([kKmMgG]?)$").unwrap());
static DNS_LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]([-a-z0-9]{0,61}[a-z0-9])?$").unwrap());

pub fn boolean(key: &AnnotationKey, raw: &str) -> DirectiveResult<bool> {
    if TRUTHY.contains(&raw) {
        return Ok(true);
    }
    if FALSY.contains(&raw) {
        return Ok(false);
    }
    Err(DirectiveError::invalid_format(
        key,
        raw,
        "expected one of 1, t, T, TRUE, true, True, 0, f, F, FALSE, false, False",
    ))
}

pub fn integer(key: &AnnotationKey, raw: &str) -> DirectiveResult<i64> {
    raw.parse::<i64>()
        .map_err(|err| DirectiveError::invalid_format(key, raw, err.to_string()))
}

/// Bare integers are seconds. Otherwise a sequence of `<n><unit>` parts
/// such as `1m30s`, with units `ms`, `s`, `m`, `h`, `d` and `w`.
pub fn duration(key: &AnnotationKey, raw: &str) -> DirectiveResult<Duration> {
    if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
        return raw
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|err| DirectiveError::invalid_format(key, raw, err.to_string()));
    }
    if !DURATION_RE.is_match(raw) {
        return Err(DirectiveError::invalid_format(
            key,
            raw,
            "expected seconds or a duration like 500ms, 30s, 1m30s",
        ));
    }
    let mut total_ms: u64 = 0;
    for part in DURATION_PART_RE.captures_iter(raw) {
        let amount = part[1]
            .parse::<u64>()
            .map_err(|err| DirectiveError::invalid_format(key, raw, err.to_string()))?;
        let unit_ms: u64 = match &part[2] {
            "ms" => 1,
            "s" => 1_000,
            "m" => 60_000,
            "h" => 3_600_000,
            "d" => 86_400_000,
            _ => 604_800_000,
        };
        total_ms = amount
            .checked_mul(unit_ms)
            .and_then(|part_ms| total_ms.checked_add(part_ms))
            .ok_or_else(|| DirectiveError::invalid_format(key, raw, "duration overflow"))?;
    }
    Ok(Duration::from_millis(total_ms))
}

/// Nginx size syntax: bytes, or a `k`/`m`/`g` suffix in binary multiples.
pub fn size(key: &AnnotationKey, raw: &str) -> DirectiveResult<u64> {
    let Some(captures) = SIZE_RE.captures(raw) else {
        return Err(DirectiveError::invalid_format(
            key,
            raw,
            "expected a size like 512, 8k, 1m or 1g",
        ));
    };
    let amount = captures[1]
        .parse::<u64>()
        .map_err(|err| DirectiveError::invalid_format(key, raw, err.to_string()))?;
    let multiplier: u64 = match captures[2].to_ascii_lowercase().as_str() {
        "k" => 1 << 10,
        "m" => 1 << 20,
        "g" => 1 << 30,
        _ => 1,
    };
    amount
        .checked_mul(multiplier)
        .ok_or_else(|| DirectiveError::invalid_format(key, raw, "size overflow"))
}

/// Comma separated values, trimmed, with empty elements dropped.
pub fn list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn one_of<'a>(key: &AnnotationKey, raw: &str, allowed: &[&'a str]) -> DirectiveResult<&'a str> {
    allowed
        .iter()
        .find(|candidate| **candidate == raw)
        .copied()
        .ok_or_else(|| {
            DirectiveError::invalid_format(
                key,
                raw,
                format!("expected one of {}", allowed.join(", ")),
            )
        })
}

/// `name` or `namespace/name`; a bare name is placed in `default_namespace`.
pub fn object_name(
    key: &AnnotationKey,
    raw: &str,
    default_namespace: &str,
) -> DirectiveResult<ObjectName> {
    let (namespace, name) = match raw.split_once('/') {
        Some((namespace, name)) => (namespace, name),
        None => (default_namespace, raw),
    };
    for part in [namespace, name] {
        if !DNS_LABEL_RE.is_match(part) {
            return Err(DirectiveError::invalid_format(
                key,
                raw,
                format!("'{part}' is not a valid object name"),
            ));
        }
    }
    Ok(ObjectName {
        namespace: namespace.to_string(),
        name: name.to_string(),
    })
}

/// Address with an optional prefix length. Host bits are cleared, so the
/// result is the `network/len` form of the range.
pub fn cidr(key: &AnnotationKey, raw: &str) -> DirectiveResult<String> {
    let (addr, prefix) = match raw.split_once('/') {
        Some((addr, prefix)) => (addr, Some(prefix)),
        None => (raw, None),
    };
    let addr = addr
        .parse::<IpAddr>()
        .map_err(|err| DirectiveError::invalid_format(key, raw, err.to_string()))?;
    let max: u32 = if addr.is_ipv4() { 32 } else { 128 };
    let prefix = match prefix {
        Some(prefix) => Some(prefix)
            .filter(|prefix| !prefix.is_empty() && prefix.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|prefix| prefix.parse::<u32>().ok())
            .filter(|len| *len <= max)
            .ok_or_else(|| {
                DirectiveError::invalid_format(key, raw, format!("prefix length must be 0-{max}"))
            })?,
        None => max,
    };
    let network = match addr {
        IpAddr::V4(v4) => {
            let mask = u32::MAX.checked_shl(max - prefix).unwrap_or(0);
            IpAddr::V4(Ipv4Addr::from(u32::from(v4) & mask))
        }
        IpAddr::V6(v6) => {
            let mask = u128::MAX.checked_shl(max - prefix).unwrap_or(0);
            IpAddr::V6(Ipv6Addr::from(u128::from(v6) & mask))
        }
    };
    Ok(format!("{network}/{prefix}"))
}
