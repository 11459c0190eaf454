//! ESSID sanitizing.
//!
//! Some monitor-mode radio stacks deliver beacons with broken error
//! correction, which shows up as control bytes or invisible characters in the
//! network name. Such a name must never replace one that was received intact.

/// Returns `true` if `essid` contains any non-printable character.
///
/// Printable means a visible glyph or the ASCII space. Control characters,
/// other whitespace (tabs, newlines, non-breaking spaces) and invisible
/// format characters are all treated as corruption.
pub fn is_bogus_essid(essid: &str) -> bool {
    essid.chars().any(|c| !is_printable(c))
}

fn is_printable(c: char) -> bool {
    if c == ' ' {
        return true;
    }
    if c.is_control() || c.is_whitespace() {
        return false;
    }
    !matches!(
        c,
        // soft hyphen, zero-width and bidi controls, BOM
        '\u{00AD}'
            | '\u{200B}'..='\u{200F}'
            | '\u{2028}'..='\u{202E}'
            | '\u{2060}'..='\u{206F}'
            | '\u{FEFF}'
            // private use area
            | '\u{E000}'..='\u{F8FF}'
            // noncharacters and specials
            | '\u{FFF0}'..='\u{FFFB}'
            | '\u{FFFE}'..='\u{FFFF}'
    )
}
