/*!
A small regular expression engine built from scratch: a hand-written
lexer and recursive-descent parser feed a Thompson-construction NFA
compiler, and matching is a backtracking-free set simulation over that
NFA — no linked-list backtracking, no catastrophic blowup on adversarial
patterns.

## Supported syntax
Literals, `.`, `^`/`$` anchors, `\d \D \w \W \s \S` shorthands, character
classes (`[abc]`, `[^a-z]`, `[a-z0-9_]`), groups `(...)`, alternation
`|`, and the quantifiers `*`, `+`, `?`, `{m}`, `{m,}`, `{m,n}`. A lazy
suffix (`a*?`) is accepted for compatibility but matched greedily, since
this engine does not backtrack.

## Usage
```
use thompson_regex::Regex;

let re = Regex::new(r"(\w+)@(\w+)").unwrap();
assert!(re.is_match("contact admin@host now"));

let caps = re.captures("contact admin@host now").unwrap();
assert_eq!(caps.get(1).unwrap().as_str(), "admin");
assert_eq!(caps.get(2).unwrap().as_str(), "host");

let (rewritten, count) = re.replace("a@b and c@d", "<redacted>");
assert_eq!(rewritten, "<redacted> and <redacted>");
assert_eq!(count, 2);
```

## Crate features
- `std` (default): enables `std::error::Error` impls via `thiserror`'s
  `std` feature.
- `serde`: derives `Serialize`/`Deserialize` on the NFA descriptor types
  in [`nfa`], for embedding callers that need to ship a compiled pattern
  across a process boundary.
*/
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod ast;
pub mod compiler;
pub mod error;
pub mod flags;
pub mod lexer;
pub mod matcher;
pub mod nfa;
pub mod parser;
mod regex;
pub mod token;

pub use error::{Error, Result};
pub use flags::Flags;
pub use nfa::Nfa;
pub use regex::{
    compile, find_all, replace, split, CaptureMatches, Captures, FindMatches, Match, Regex,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn end_to_end_find_replace_split() {
        let re = Regex::new(r"\d+").unwrap();
        assert!(re.is_match("room 42"));
        assert_eq!(re.find("room 42").unwrap().as_str(), "42");

        let (out, n) = re.replace("a1 b22 c333", "#");
        assert_eq!(out, "a# b# c#");
        assert_eq!(n, 3);

        assert_eq!(re.split("a1b22c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn syntax_error_reports_position() {
        let err = Regex::new("a(b").unwrap_err();
        assert_eq!(err.position(), Some(1));
    }

    #[test]
    fn free_functions_mirror_the_regex_methods() {
        assert!(find_all(r"\d", "", "a1b2").unwrap().len() == 2);
        let (out, n) = replace(r"\s+", "", "a   b", "_").unwrap();
        assert_eq!((out.as_str(), n), ("a_b", 1));
        assert_eq!(split(r",", "", "a,b,c").unwrap(), vec!["a", "b", "c"]);
        assert_eq!(compile("a", "").unwrap().group_count, 0);
    }
}
