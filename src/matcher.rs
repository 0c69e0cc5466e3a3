//! NFA + subject + flags → match list.
//!
//! Simulation is entirely set-based: at every text position the matcher
//! tracks the set of currently-active states and advances it one character
//! at a time. There is no backtracking and no per-path branching, which is
//! what makes capture-group tracking "best-effort, last-writer-wins" (see
//! [`find_all`]) rather than exact per-alternative bookkeeping.

use std::collections::{BTreeSet, HashMap};

use itertools::Itertools;

use crate::{
    flags::Flags,
    nfa::{EdgeKind, Nfa},
};

/// One match: a span plus a dense, zero-based list of group spans (index 0
/// is group 1, and so on — `None` means that group did not participate).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMatch {
    pub start: usize,
    pub end: usize,
    pub groups: Vec<Option<(usize, usize)>>,
}

fn at_bol(subject: &[char], pos: usize, flags: Flags) -> bool {
    pos == 0 || (flags.multiline && pos > 0 && subject[pos - 1] == '\n')
}

fn at_eol(subject: &[char], pos: usize, flags: Flags) -> bool {
    pos == subject.len() || (flags.multiline && pos < subject.len() && subject[pos] == '\n')
}

fn passes_gate(nfa: &Nfa, state: usize, pos: usize, subject: &[char], flags: Flags) -> bool {
    let s = &nfa.states[state];
    (!s.require_bol || at_bol(subject, pos, flags)) && (!s.require_eol || at_eol(subject, pos, flags))
}

fn apply_group_hooks(
    nfa: &Nfa,
    state: usize,
    pos: usize,
    group_starts: &mut HashMap<u32, usize>,
    group_spans: &mut HashMap<u32, (usize, usize)>,
) {
    let s = &nfa.states[state];
    for &g in &s.enter_groups {
        group_starts.insert(g, pos);
    }
    for &g in &s.exit_groups {
        if let Some(&start) = group_starts.get(&g) {
            group_spans.insert(g, (start, pos));
        }
    }
}

/// Position-aware epsilon closure. An anchor-gated state that fails
/// its check at `pos` is skipped without halting the rest of the closure —
/// that is what lets `^a|b` match `b` in the middle of a subject, since the
/// anchor lives on the `a`-branch's own start state, not on a shared edge.
fn closure_at(
    nfa: &Nfa,
    subject: &[char],
    seeds: &[usize],
    pos: usize,
    flags: Flags,
    group_starts: &mut HashMap<u32, usize>,
    group_spans: &mut HashMap<u32, (usize, usize)>,
) -> BTreeSet<usize> {
    let mut closure = BTreeSet::new();
    let mut stack = Vec::new();

    for &s in seeds {
        if passes_gate(nfa, s, pos, subject, flags) && closure.insert(s) {
            apply_group_hooks(nfa, s, pos, group_starts, group_spans);
            stack.push(s);
        }
    }
    while let Some(u) = stack.pop() {
        for &v in &nfa.states[u].epsilon_transitions {
            if closure.contains(&v) {
                continue;
            }
            if passes_gate(nfa, v, pos, subject, flags) {
                closure.insert(v);
                apply_group_hooks(nfa, v, pos, group_starts, group_spans);
                stack.push(v);
            }
        }
    }
    closure
}

fn fold(c: char, ignore_case: bool) -> char {
    if ignore_case {
        c.to_ascii_lowercase()
    } else {
        c
    }
}

fn swap_ascii_case(c: char) -> char {
    if c.is_ascii_uppercase() {
        c.to_ascii_lowercase()
    } else if c.is_ascii_lowercase() {
        c.to_ascii_uppercase()
    } else {
        c
    }
}

fn pred_matches(selector: char, c: char) -> bool {
    match selector {
        'd' => c.is_ascii_digit(),
        'D' => !c.is_ascii_digit(),
        'w' => c.is_ascii_alphanumeric() || c == '_',
        'W' => !(c.is_ascii_alphanumeric() || c == '_'),
        's' => matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0b' | '\x0c'),
        'S' => !matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0b' | '\x0c'),
        _ => false,
    }
}

fn edge_matches(kind: &EdgeKind, c: char, flags: Flags) -> bool {
    match kind {
        EdgeKind::Char(lit) => fold(*lit, flags.ignore_case) == fold(c, flags.ignore_case),
        EdgeKind::Dot => c != '\n' || flags.dotall,
        EdgeKind::Pred(sel) => pred_matches(*sel, c),
        EdgeKind::Class {
            negated,
            literals,
            ranges,
            shorthands,
        } => {
            let ic = flags.ignore_case;
            let cf = fold(c, ic);
            let in_literals = literals.iter().any(|&l| fold(l, ic) == cf);
            let in_ranges = ranges.iter().any(|&(lo, hi)| {
                (lo..=hi).contains(&c) || (ic && (lo..=hi).contains(&swap_ascii_case(c)))
            });
            let in_shorthands = shorthands.iter().any(|&s| pred_matches(s, c));
            let member = in_literals || in_ranges || in_shorthands;
            if *negated {
                !member
            } else {
                member
            }
        }
    }
}

/// One consuming step: states reachable from `closure` by exactly
/// one edge whose kind matches `c`.
fn step(nfa: &Nfa, closure: &BTreeSet<usize>, c: char, flags: Flags) -> BTreeSet<usize> {
    let mut next = BTreeSet::new();
    for &u in closure {
        for edge in &nfa.states[u].edges {
            if edge_matches(&edge.kind, c, flags) {
                next.insert(edge.target);
            }
        }
    }
    next
}

fn has_accepting(nfa: &Nfa, states: &BTreeSet<usize>) -> bool {
    // An accepting state whose own end-of-line requirement fails at this
    // position never makes it into `states`, since `closure_at` already
    // excludes it — so a plain existence check is enough here.
    states.iter().any(|&s| nfa.is_accepting(s))
}

fn normalize_groups(
    group_spans: &HashMap<u32, (usize, usize)>,
    group_count: u32,
) -> Vec<Option<(usize, usize)>> {
    (1..=group_count)
        .map(|g| group_spans.get(&g).copied())
        .collect()
}

/// Runs the full left-to-right scan and returns every nonoverlapping match,
/// preferring the longest match at each start position.
pub fn find_all(nfa: &Nfa, subject: &[char], flags: Flags) -> Vec<RawMatch> {
    let len = subject.len();
    let mut matches = Vec::new();
    let mut i = 0;

    while i <= len {
        let mut group_starts = HashMap::new();
        let mut group_spans = HashMap::new();
        let mut closure = closure_at(
            nfa,
            subject,
            &[nfa.start],
            i,
            flags,
            &mut group_starts,
            &mut group_spans,
        );

        let mut best_end = None;
        let mut best_groups = None;
        if has_accepting(nfa, &closure) {
            best_end = Some(i);
            best_groups = Some(group_spans.clone());
        }

        let mut j = i;
        while j < len {
            let stepped = step(nfa, &closure, subject[j], flags);
            if stepped.is_empty() {
                break;
            }
            j += 1;
            let seeds = stepped.into_iter().collect_vec();
            closure = closure_at(
                nfa,
                subject,
                &seeds,
                j,
                flags,
                &mut group_starts,
                &mut group_spans,
            );
            if has_accepting(nfa, &closure) {
                best_end = Some(j);
                best_groups = Some(group_spans.clone());
            }
        }

        if let Some(end) = best_end {
            let groups = normalize_groups(&best_groups.unwrap_or_default(), nfa.group_count);
            matches.push(RawMatch { start: i, end, groups });
            i = if end > i { end } else { i + 1 };
        } else {
            i += 1;
        }
    }
    matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{compiler, parser};

    fn run(pattern: &str, flags: &str, subject: &str) -> Vec<RawMatch> {
        let parsed = parser::parse(pattern).unwrap();
        let nfa = compiler::compile(&parsed.expr, parsed.group_count).unwrap();
        let chars: Vec<char> = subject.chars().collect();
        find_all(&nfa, &chars, Flags::parse(flags))
    }

    fn spans(matches: &[RawMatch]) -> Vec<(usize, usize)> {
        matches.iter().map(|m| (m.start, m.end)).collect()
    }

    #[test]
    fn digits() {
        let m = run(r"\d+", "", "abc 123 xyz 456");
        assert_eq!(spans(&m), vec![(4, 7), (12, 15)]);
    }

    #[test]
    fn alternation_with_groups() {
        let m = run("(ab|cd)e", "", "xxabe--cdeyy");
        assert_eq!(spans(&m), vec![(2, 5), (7, 10)]);
        assert_eq!(m[0].groups, vec![Some((2, 4))]);
        assert_eq!(m[1].groups, vec![Some((7, 9))]);
    }

    #[test]
    fn star_matches_empty_string_everywhere() {
        let m = run("a*", "", "b");
        assert_eq!(spans(&m), vec![(0, 0), (1, 1)]);
    }

    #[test]
    fn anchor_start_with_multiline() {
        let m = run("^ab", "m", "xab\nab");
        assert_eq!(spans(&m), vec![(4, 6)]);
    }

    #[test]
    fn dot_excludes_newline_unless_dotall() {
        assert_eq!(spans(&run("a.c", "", "a\nc")), vec![]);
        assert_eq!(spans(&run("a.c", "s", "a\nc")), vec![(0, 3)]);
    }

    #[test]
    fn ignore_case_flag() {
        let m = run("AbC", "i", "xxabcYY");
        assert_eq!(spans(&m), vec![(2, 5)]);
    }

    #[test]
    fn anchor_in_alternation_only_binds_its_own_branch() {
        // `^a` only matches at the start, but `b` must still match anywhere
        // in the subject — the anchor gate lives on `a`'s own branch. Here
        // the only `b` in the subject sits at index 1, and the `a` at index
        // 2 is not at the start, so exactly one match comes out.
        let m = run("^a|b", "", "xba");
        assert_eq!(spans(&m), vec![(1, 2)]);
    }

    #[test]
    fn nonoverlap_after_nonempty_match() {
        let m = run("aa", "", "aaaa");
        assert_eq!(spans(&m), vec![(0, 2), (2, 4)]);
    }

    #[test]
    fn group_absent_in_one_branch_is_none() {
        let m = run("(a)|(b)", "", "b");
        assert_eq!(m[0].groups, vec![None, Some((0, 1))]);
    }

    #[test]
    fn trailing_optional_group_that_never_fires_is_still_sized() {
        let m = run("(a)(b)?", "", "a");
        assert_eq!(m[0].groups, vec![Some((0, 1)), None]);
    }

    #[test]
    fn negated_class() {
        assert_eq!(spans(&run("[^0-9]+", "", "ab12cd")), vec![(0, 2), (4, 6)]);
    }

    #[test]
    fn ignore_case_range() {
        assert_eq!(spans(&run("[a-z]+", "i", "ABcd12")), vec![(0, 4)]);
    }
}
