//! Address normalization utilities.
//!
//! This module is the canonical source for address normalization in the workspace.
//! Other crates should import from here rather than defining their own logic.
//!
//! EVM addresses are 20-byte values, but callers hand them over in several forms:
//! - Checksummed: "0x5FbDB2315678afecb367f032d93F642f64180aa3"
//! - Lowercase, with or without prefix
//! - Short form from tests and fixtures: "0x1234"
//!
//! - Full storage words whose upper 12 bytes are zero
//!
//! Everything here maps those onto one lowercase, `0x`-prefixed, 40-digit form.
//! Longer input is never truncated: it does not name an address.

use alloy_primitives::Address;

/// Normalize an address to lowercase with 0x prefix and full 40 hex characters.
///
/// A 64-digit word keeps its low 20 bytes only when the upper 12 are zero.
/// Any other input longer than 40 digits comes back unshortened, so
/// [`parse_address`] rejects it.
///
/// # Examples
///
/// ```
/// use upgrades_types::address::normalize_address;
///
/// assert_eq!(
///     normalize_address("0x1234"),
///     "0x0000000000000000000000000000000000001234"
/// );
/// assert_eq!(
///     normalize_address("5FbDB2315678afecb367f032d93F642f64180aa3"),
///     "0x5fbdb2315678afecb367f032d93f642f64180aa3"
/// );
/// ```
pub fn normalize_address(addr: &str) -> String {
    let addr = addr.trim();
    let hex = addr
        .strip_prefix("0x")
        .or_else(|| addr.strip_prefix("0X"))
        .unwrap_or(addr)
        .to_lowercase();
    if hex.len() <= 40 {
        format!("0x{:0>40}", hex)
    } else if hex.len() == 64 && hex.as_bytes()[..24].iter().all(|b| *b == b'0') {
        format!("0x{}", &hex[24..])
    } else {
        format!("0x{}", hex)
    }
}

/// Parse a string address into an [`Address`].
///
/// Accepts short and full forms in any case; checksums are not enforced.
/// Returns `None` for empty input, anything that is not hex, and anything
/// wider than 20 bytes.
///
/// # Examples
///
/// ```
/// use upgrades_types::address::parse_address;
///
/// assert!(parse_address("0xabc").is_some());
/// assert!(parse_address("not-hex").is_none());
/// assert!(parse_address("0xff00000000000000000000000000000000000000ab").is_none());
/// ```
pub fn parse_address(addr: &str) -> Option<Address> {
    let trimmed = addr.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("0x") {
        return None;
    }
    let normalized = normalize_address(trimmed);
    if normalized.len() != 42 {
        return None;
    }
    let bytes = hex::decode(&normalized[2..]).ok()?;
    Some(Address::from_slice(&bytes))
}

/// Convert an [`Address`] to its normalized lowercase string.
pub fn address_to_string(addr: &Address) -> String {
    format!("0x{}", hex::encode(addr.as_slice()))
}

/// True for the zero address, which storage slots return when unset.
pub fn is_zero_address(addr: &Address) -> bool {
    *addr == Address::ZERO
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_address() {
        assert_eq!(
            normalize_address("0xABC"),
            "0x0000000000000000000000000000000000000abc"
        );
        assert_eq!(
            normalize_address("  0XABC  "),
            "0x0000000000000000000000000000000000000abc"
        );
        // Full-width words keep the low 20 bytes
        assert_eq!(
            normalize_address("0x000000000000000000000000aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"),
            "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"
        );
        // Anything else that is too wide stays too wide
        assert_eq!(
            normalize_address("0xFF00000000000000000000000000000000000000AB"),
            "0xff00000000000000000000000000000000000000ab"
        );
    }

    #[test]
    fn test_parse_address() {
        let addr = parse_address("0x5FbDB2315678afecb367f032d93F642f64180aa3").unwrap();
        assert_eq!(
            address_to_string(&addr),
            "0x5fbdb2315678afecb367f032d93f642f64180aa3"
        );
        assert!(parse_address("0xGGG").is_none());
    }

    #[test]
    fn test_parse_address_rejects_overlong_input() {
        assert!(parse_address("0xff00000000000000000000000000000000000000ab").is_none());
        assert!(parse_address(
            "0x000000000000000000000001aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"
        )
        .is_none());
        assert_eq!(
            parse_address("0x000000000000000000000000aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"),
            Some(Address::repeat_byte(0xaa))
        );
        assert!(parse_address("").is_none());
        assert!(parse_address("0x").is_none());
    }

    #[test]
    fn test_is_zero_address() {
        assert!(is_zero_address(&Address::ZERO));
        assert!(!is_zero_address(&parse_address("0x1").unwrap()));
    }
}
