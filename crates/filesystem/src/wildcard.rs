//! Minimal fnmatch-style wildcard matching (`*` and `?`) used by directory scans.
//!
//! The catalogue's wildcards are never anchored to path separators the way shell
//! globs are; a pattern like `*.nw` matches any basename ending in `.nw` regardless
//! of depth, matching the original `CString::match()` behavior this replaces.

pub fn matches(pattern: &str, name: &str) -> bool {
    if pattern == "*" {
        return true;
    }
    matches_bytes(pattern.as_bytes(), name.as_bytes())
}

fn matches_bytes(pattern: &[u8], name: &[u8]) -> bool {
    match pattern.first() {
        None => name.is_empty(),
        Some(b'*') => {
            matches_bytes(&pattern[1..], name)
                || (!name.is_empty() && matches_bytes(pattern, &name[1..]))
        }
        Some(b'?') => !name.is_empty() && matches_bytes(&pattern[1..], &name[1..]),
        Some(&c) => {
            !name.is_empty() && name[0] == c && matches_bytes(&pattern[1..], &name[1..])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn star_matches_anything() {
        assert!(matches("*", "anything.nw"));
        assert!(matches("*.nw", "level1.nw"));
        assert!(!matches("*.nw", "level1.gmap"));
    }

    #[test]
    fn question_mark_matches_single_char() {
        assert!(matches("level?.nw", "level1.nw"));
        assert!(!matches("level?.nw", "level12.nw"));
    }

    #[test]
    fn exact_match_with_no_wildcards() {
        assert!(matches("serveroptions.txt", "serveroptions.txt"));
        assert!(!matches("serveroptions.txt", "serveroptions2.txt"));
    }

    #[test]
    fn leading_and_trailing_star() {
        assert!(matches("*npc*", "mynpcdata"));
        assert!(!matches("*npc*", "levels"));
    }
}
