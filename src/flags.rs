//! The three recognized matching flags: `i`, `m`, `s`.

use bon::bon;

/// Parsed form of the flags string accepted by every public entry point.
/// Unknown letters are silently ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flags {
    /// `i` — fold case at comparison time.
    pub ignore_case: bool,
    /// `m` — `^`/`$` also match at `\n` boundaries.
    pub multiline: bool,
    /// `s` — `.` also matches `\n`.
    pub dotall: bool,
}

#[bon]
impl Flags {
    #[builder]
    pub fn new(
        #[builder(default = false)] ignore_case: bool,
        #[builder(default = false)] multiline: bool,
        #[builder(default = false)] dotall: bool,
    ) -> Self {
        Flags {
            ignore_case,
            multiline,
            dotall,
        }
    }

    pub fn parse(s: &str) -> Self {
        let mut flags = Flags::default();
        for c in s.chars() {
            match c {
                'i' => flags.ignore_case = true,
                'm' => flags.multiline = true,
                's' => flags.dotall = true,
                _ => {}
            }
        }
        flags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_letters() {
        let f = Flags::parse("ims");
        assert!(f.ignore_case && f.multiline && f.dotall);
    }

    #[test]
    fn ignores_unknown_letters() {
        let f = Flags::parse("ix");
        assert!(f.ignore_case);
        assert!(!f.multiline);
    }

    #[test]
    fn empty_string_is_all_false() {
        assert_eq!(Flags::parse(""), Flags::default());
    }

    #[test]
    fn builder_matches_parse() {
        let built = Flags::builder().ignore_case(true).multiline(true).build();
        assert_eq!(built, Flags::parse("im"));
    }
}
