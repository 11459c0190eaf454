//! Hardware address normalization.
//!
//! Radio drivers and tools disagree on MAC formatting (`AA-BB-CC-...`,
//! `aa:bb:c:...`). Every map key and every identity field in this crate uses
//! the normalized form produced here: lowercase, colon separated, two hex
//! digits per octet.

/// Canonicalize a MAC address string.
///
/// The input is split on `-` if it contains one, otherwise on `:`.
/// Single-character octets are left-padded with `0`. The function is total:
/// malformed input is normalized on a best-effort basis rather than rejected.
pub fn normalize_mac(mac: &str) -> String {
    let separator = if mac.contains('-') { '-' } else { ':' };
    let mut out = String::with_capacity(17);
    for (i, part) in mac.split(separator).enumerate() {
        if i > 0 {
            out.push(':');
        }
        if part.chars().count() < 2 {
            out.push('0');
        }
        out.push_str(part);
    }
    out.make_ascii_lowercase();
    out
}
