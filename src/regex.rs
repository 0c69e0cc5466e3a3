//! The ergonomic façade over the four pure operations: compile, find,
//! replace, split. A [`Regex`] holds a compiled [`Nfa`] plus its flags so
//! callers who run the same pattern repeatedly don't pay parse/compile cost
//! per call; the free functions at the bottom of this module compile and
//! run in one step for one-shot callers.

use std::ops::Range;

use crate::{
    compiler,
    error::Result,
    flags::Flags,
    matcher::{self, RawMatch},
    nfa::Nfa,
    parser,
};

/// A single match against a subject string, in `char` offsets (see the
/// crate-level documentation's note on text indexing).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    start: usize,
    end: usize,
    text: String,
}

impl Match {
    fn from_raw(chars: &[char], start: usize, end: usize) -> Self {
        Match {
            start,
            end,
            text: chars[start..end].iter().collect(),
        }
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn span(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

/// The groups captured by one match. Group `0` is always the whole match,
/// mirroring the wider Rust regex ecosystem's convention; groups `1..` are
/// this crate's own capturing groups, `None` where a group never fired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Captures {
    groups: Vec<Option<Match>>,
}

impl Captures {
    fn from_raw(chars: &[char], raw: &RawMatch) -> Self {
        let mut groups = Vec::with_capacity(raw.groups.len() + 1);
        groups.push(Some(Match::from_raw(chars, raw.start, raw.end)));
        for g in &raw.groups {
            groups.push(g.map(|(s, e)| Match::from_raw(chars, s, e)));
        }
        Captures { groups }
    }

    pub fn get(&self, i: usize) -> Option<&Match> {
        self.groups.get(i).and_then(|m| m.as_ref())
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// A compiled pattern, ready to run against any number of subjects.
#[derive(Debug, Clone)]
pub struct Regex {
    nfa: Nfa,
    flags: Flags,
}

impl Regex {
    pub fn new(pattern: &str) -> Result<Regex> {
        Regex::with_flags(pattern, "")
    }

    pub fn with_flags(pattern: &str, flags: &str) -> Result<Regex> {
        let parsed = parser::parse(pattern)?;
        let nfa = compiler::compile(&parsed.expr, parsed.group_count)?;
        Ok(Regex {
            nfa,
            flags: Flags::parse(flags),
        })
    }

    fn raw_matches(&self, subject: &str) -> (Vec<char>, Vec<RawMatch>) {
        let chars: Vec<char> = subject.chars().collect();
        let raw = matcher::find_all(&self.nfa, &chars, self.flags);
        (chars, raw)
    }

    pub fn is_match(&self, subject: &str) -> bool {
        let chars: Vec<char> = subject.chars().collect();
        !matcher::find_all(&self.nfa, &chars, self.flags).is_empty()
    }

    pub fn find(&self, subject: &str) -> Option<Match> {
        let (chars, raw) = self.raw_matches(subject);
        raw.into_iter()
            .next()
            .map(|m| Match::from_raw(&chars, m.start, m.end))
    }

    pub fn find_iter<'s>(&self, subject: &'s str) -> FindMatches<'s> {
        let (chars, raw) = self.raw_matches(subject);
        FindMatches {
            chars,
            raw: raw.into_iter(),
            _marker: std::marker::PhantomData,
        }
    }

    pub fn captures(&self, subject: &str) -> Option<Captures> {
        let (chars, raw) = self.raw_matches(subject);
        raw.first().map(|m| Captures::from_raw(&chars, m))
    }

    pub fn captures_iter<'s>(&self, subject: &'s str) -> CaptureMatches<'s> {
        let (chars, raw) = self.raw_matches(subject);
        CaptureMatches {
            chars,
            raw: raw.into_iter(),
            _marker: std::marker::PhantomData,
        }
    }

    /// Replaces every match with `repl`, returning the rewritten string and
    /// the number of replacements made. `repl` is never parsed for
    /// backreferences: it is spliced in verbatim at each match span.
    pub fn replace(&self, subject: &str, repl: &str) -> (String, usize) {
        let (chars, raw) = self.raw_matches(subject);
        if raw.is_empty() {
            return (subject.to_string(), 0);
        }
        let mut out = String::new();
        let mut cursor = 0;
        for m in &raw {
            out.extend(&chars[cursor..m.start]);
            out.push_str(repl);
            cursor = m.end;
        }
        out.extend(&chars[cursor..]);
        (out, raw.len())
    }

    /// Splits `subject` on every match, discarding the matched text.
    pub fn split(&self, subject: &str) -> Vec<String> {
        let (chars, raw) = self.raw_matches(subject);
        let mut out = Vec::with_capacity(raw.len() + 1);
        let mut cursor = 0;
        for m in &raw {
            out.push(chars[cursor..m.start].iter().collect());
            cursor = m.end;
        }
        out.push(chars[cursor..].iter().collect());
        out
    }

    /// The compiled automaton, exposed for callers that want the NFA
    /// descriptor itself (for example to serialize it across a process
    /// boundary under the `serde` feature).
    pub fn compile_descriptor(&self) -> &Nfa {
        &self.nfa
    }
}

/// Iterator over nonoverlapping matches, produced by [`Regex::find_iter`].
pub struct FindMatches<'s> {
    chars: Vec<char>,
    raw: std::vec::IntoIter<RawMatch>,
    _marker: std::marker::PhantomData<&'s str>,
}

impl<'s> Iterator for FindMatches<'s> {
    type Item = Match;

    fn next(&mut self) -> Option<Match> {
        self.raw
            .next()
            .map(|m| Match::from_raw(&self.chars, m.start, m.end))
    }
}

/// Iterator over per-match captures, produced by [`Regex::captures_iter`].
pub struct CaptureMatches<'s> {
    chars: Vec<char>,
    raw: std::vec::IntoIter<RawMatch>,
    _marker: std::marker::PhantomData<&'s str>,
}

impl<'s> Iterator for CaptureMatches<'s> {
    type Item = Captures;

    fn next(&mut self) -> Option<Captures> {
        self.raw.next().map(|m| Captures::from_raw(&self.chars, &m))
    }
}

/// Compiles `pattern` with `flags` and returns every nonoverlapping match
/// against `subject`, in one call.
pub fn find_all(pattern: &str, flags: &str, subject: &str) -> Result<Vec<Match>> {
    let regex = Regex::with_flags(pattern, flags)?;
    Ok(regex.find_iter(subject).collect())
}

/// Compiles `pattern` with `flags` and replaces every match against
/// `subject` with `repl`, in one call.
pub fn replace(pattern: &str, flags: &str, subject: &str, repl: &str) -> Result<(String, usize)> {
    let regex = Regex::with_flags(pattern, flags)?;
    Ok(regex.replace(subject, repl))
}

/// Compiles `pattern` with `flags` and splits `subject` on every match, in
/// one call.
pub fn split(pattern: &str, flags: &str, subject: &str) -> Result<Vec<String>> {
    let regex = Regex::with_flags(pattern, flags)?;
    Ok(regex.split(subject))
}

/// Compiles `pattern` with `flags` and returns the resulting NFA descriptor,
/// without running it against any subject.
pub fn compile(pattern: &str, flags: &str) -> Result<Nfa> {
    let regex = Regex::with_flags(pattern, flags)?;
    Ok(regex.nfa)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_and_captures() {
        let re = Regex::new(r"(\w+)@(\w+)").unwrap();
        let caps = re.captures("contact admin@host now").unwrap();
        assert_eq!(caps.get(0).unwrap().as_str(), "admin@host");
        assert_eq!(caps.get(1).unwrap().as_str(), "admin");
        assert_eq!(caps.get(2).unwrap().as_str(), "host");
    }

    #[test]
    fn find_iter_collects_all_matches() {
        let re = Regex::new(r"\d+").unwrap();
        let texts: Vec<String> = re.find_iter("a1 b22 c333").map(|m| m.as_str().to_string()).collect();
        assert_eq!(texts, vec!["1", "22", "333"]);
    }

    #[test]
    fn replace_counts_and_splices_verbatim() {
        let re = Regex::new(r"\d+").unwrap();
        let (out, n) = re.replace("a1 b22 c333", "#");
        assert_eq!(out, "a# b# c#");
        assert_eq!(n, 3);
    }

    #[test]
    fn replace_repl_is_never_parsed_for_backreferences() {
        let re = Regex::new(r"a").unwrap();
        let (out, n) = re.replace("a", "$1");
        assert_eq!(out, "$1");
        assert_eq!(n, 1);
    }

    #[test]
    fn split_on_matches() {
        let re = Regex::new(r",\s*").unwrap();
        assert_eq!(re.split("a, b,c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn is_match_true_and_false() {
        let re = Regex::new(r"^\d+$").unwrap();
        assert!(re.is_match("12345"));
        assert!(!re.is_match("12a45"));
    }

    #[test]
    fn compile_descriptor_exposes_group_count() {
        let re = Regex::new(r"(a)(b)?").unwrap();
        assert_eq!(re.compile_descriptor().group_count, 2);
    }

    #[test]
    fn free_functions_match_inherent_methods() {
        let (out, n) = replace(r"\d+", "", "a1 b2", "X").unwrap();
        assert_eq!(out, "aX bX");
        assert_eq!(n, 2);
        assert_eq!(split(r"\s+", "", "a b  c").unwrap(), vec!["a", "b", "c"]);
        assert_eq!(find_all(r"\d", "", "a1b2").unwrap().len(), 2);
        assert_eq!(compile(r"a", "").unwrap().group_count, 0);
    }
}
