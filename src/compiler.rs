//! Syntax tree → NFA, by Thompson construction over a single shared state
//! pool.
//!
//! Every recursive build returns a [`Fragment`]: a `(start, accept)` index
//! pair whose accept state is, at the moment of return, marked accepting.
//! Composing two fragments always clears the upstream accept flag before
//! linking, so only one state in any fragment is ever accepting at once.

use std::collections::{HashMap, HashSet, VecDeque};

use itertools::Itertools;

use crate::{
    ast::{ClassItem, Expr},
    error::{CompileError, Error},
    nfa::{Edge, EdgeKind, Nfa, State},
};

/// Quantifier expansion is capped to guard against adversarial blowup from
/// patterns like `a{999999999}`.
const MAX_QUANTIFIER_EXPANSION: u32 = 1000;

#[derive(Clone, Copy)]
struct Fragment {
    start: usize,
    accept: usize,
}

struct Compiler {
    states: Vec<State>,
}

pub fn compile(expr: &Expr, group_count: u32) -> Result<Nfa, Error> {
    let mut c = Compiler { states: Vec::new() };
    let frag = c.build(expr)?;
    debug_assert!(c.states[frag.accept].accept);
    Ok(c.finish(frag.start, group_count))
}

impl Compiler {
    fn new_state(&mut self) -> usize {
        let idx = self.states.len();
        self.states.push(State::new(idx));
        idx
    }

    fn link_eps(&mut self, from: usize, to: usize) {
        self.states[from].epsilon_transitions.push(to);
    }

    /// Quantifier expansion always clones a fresh copy of its template
    /// rather than reusing it directly (see [`Compiler::clone_fragment`]),
    /// which leaves the template's own states permanently unreachable from
    /// the fragment's start. `finish` compacts the pool down to exactly the
    /// states reachable from `start`, so the descriptor handed back by
    /// `compile` never reports dead template remnants as real states (or,
    /// worse, as spuriously "accepting" ones).
    fn finish(self, start: usize, group_count: u32) -> Nfa {
        let mut remap = HashMap::new();
        let mut order = Vec::new();
        let mut queue = VecDeque::new();
        remap.insert(start, 0usize);
        order.push(start);
        queue.push_back(start);
        while let Some(old) = queue.pop_front() {
            let state = &self.states[old];
            let mut neighbors = state.edges.iter().map(|e| e.target).collect_vec();
            neighbors.extend(state.epsilon_transitions.iter().copied());
            for n in neighbors {
                if !remap.contains_key(&n) {
                    remap.insert(n, order.len());
                    order.push(n);
                    queue.push_back(n);
                }
            }
        }

        let states: Vec<State> = order
            .iter()
            .enumerate()
            .map(|(new_idx, &old)| {
                let old_state = &self.states[old];
                State {
                    index: new_idx,
                    accept: old_state.accept,
                    edges: old_state
                        .edges
                        .iter()
                        .map(|e| Edge {
                            kind: e.kind.clone(),
                            target: remap[&e.target],
                        })
                        .collect(),
                    epsilon_transitions: old_state
                        .epsilon_transitions
                        .iter()
                        .map(|t| remap[t])
                        .collect(),
                    require_bol: old_state.require_bol,
                    require_eol: old_state.require_eol,
                    enter_groups: old_state.enter_groups.clone(),
                    exit_groups: old_state.exit_groups.clone(),
                }
            })
            .collect();
        let accepts = states.iter().filter(|s| s.accept).map(|s| s.index).collect();
        Nfa {
            start: 0,
            accepts,
            state_count: states.len(),
            states,
            group_count,
        }
    }

    fn two_state_edge(&mut self, kind: EdgeKind) -> Fragment {
        let start = self.new_state();
        let accept = self.new_state();
        self.states[start].edges.push(Edge { kind, target: accept });
        self.states[accept].accept = true;
        Fragment { start, accept }
    }

    fn build(&mut self, expr: &Expr) -> Result<Fragment, Error> {
        match expr {
            Expr::Empty => {
                let start = self.new_state();
                let accept = self.new_state();
                self.link_eps(start, accept);
                self.states[accept].accept = true;
                Ok(Fragment { start, accept })
            }
            Expr::Literal(c) => Ok(self.two_state_edge(EdgeKind::Char(*c))),
            Expr::Dot => Ok(self.two_state_edge(EdgeKind::Dot)),
            Expr::Shorthand(sel) => Ok(self.two_state_edge(EdgeKind::Pred(*sel))),
            Expr::CharClass { items, negated } => {
                let mut literals = Vec::new();
                let mut ranges = Vec::new();
                let mut shorthands = Vec::new();
                for item in items {
                    match item {
                        ClassItem::Literal(c) => literals.push(*c),
                        ClassItem::Range(lo, hi) => ranges.push((*lo, *hi)),
                        ClassItem::Shorthand(sel) => shorthands.push(*sel),
                    }
                }
                Ok(self.two_state_edge(EdgeKind::Class {
                    negated: *negated,
                    literals,
                    ranges,
                    shorthands,
                }))
            }
            Expr::AnchorStart => {
                let frag = self.two_state_edge_epsilon();
                self.states[frag.start].require_bol = true;
                Ok(frag)
            }
            Expr::AnchorEnd => {
                let frag = self.two_state_edge_epsilon();
                self.states[frag.start].require_eol = true;
                Ok(frag)
            }
            Expr::Group { expr, index } => {
                let inner = self.build(expr)?;
                self.states[inner.start].enter_groups.push(*index);
                self.states[inner.accept].exit_groups.push(*index);
                Ok(inner)
            }
            Expr::Concat(parts) => {
                let mut iter = parts.iter();
                let Some(first) = iter.next() else {
                    return Err(Error::Internal(
                        "Concat is never produced with fewer than 2 parts".into(),
                    ));
                };
                let mut current = self.build(first)?;
                for part in iter {
                    let next = self.build(part)?;
                    self.states[current.accept].accept = false;
                    self.link_eps(current.accept, next.start);
                    current.accept = next.accept;
                }
                Ok(current)
            }
            Expr::Alt(options) => {
                let start = self.new_state();
                let accept = self.new_state();
                for option in options {
                    let frag = self.build(option)?;
                    self.link_eps(start, frag.start);
                    self.states[frag.accept].accept = false;
                    self.link_eps(frag.accept, accept);
                }
                self.states[accept].accept = true;
                Ok(Fragment { start, accept })
            }
            Expr::Repeat { expr, range } => self.build_repeat(expr, range.m, range.n),
        }
    }

    fn two_state_edge_epsilon(&mut self) -> Fragment {
        let start = self.new_state();
        let accept = self.new_state();
        self.link_eps(start, accept);
        self.states[accept].accept = true;
        Fragment { start, accept }
    }

    /// Deep-clones a fragment: walks every state reachable from `frag.start`
    /// over both consuming edges and epsilon transitions, allocates fresh
    /// states, and rewrites every edge/epsilon target through an old→new
    /// index map. Never share state across clones — that creates spurious
    /// paths between otherwise-independent repetitions of the same
    /// subexpression.
    fn clone_fragment(&mut self, frag: &Fragment) -> Fragment {
        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();
        visited.insert(frag.start);
        queue.push_back(frag.start);
        while let Some(s) = queue.pop_front() {
            let state = &self.states[s];
            let mut neighbors = state.edges.iter().map(|e| e.target).collect_vec();
            neighbors.extend(state.epsilon_transitions.iter().copied());
            for n in neighbors {
                if visited.insert(n) {
                    queue.push_back(n);
                }
            }
        }

        let mut remap = std::collections::HashMap::with_capacity(visited.len());
        for &old in &visited {
            remap.insert(old, self.new_state());
        }
        for &old in &visited {
            let old_state = self.states[old].clone();
            let new_idx = remap[&old];
            let new_state = &mut self.states[new_idx];
            new_state.accept = old_state.accept;
            new_state.require_bol = old_state.require_bol;
            new_state.require_eol = old_state.require_eol;
            new_state.enter_groups = old_state.enter_groups.clone();
            new_state.exit_groups = old_state.exit_groups.clone();
            new_state.edges = old_state
                .edges
                .iter()
                .map(|e| Edge {
                    kind: e.kind.clone(),
                    target: remap[&e.target],
                })
                .collect();
            new_state.epsilon_transitions = old_state
                .epsilon_transitions
                .iter()
                .map(|t| remap[t])
                .collect();
        }

        Fragment {
            start: remap[&frag.start],
            accept: remap[&frag.accept],
        }
    }

    fn build_repeat(
        &mut self,
        inner: &Expr,
        m: u32,
        n: Option<u32>,
    ) -> Result<Fragment, Error> {
        if let Some(n) = n {
            if n < m {
                return Err(CompileError::new("invalid quantifier range: n < m", None).into());
            }
            if n > MAX_QUANTIFIER_EXPANSION {
                return Err(
                    CompileError::new("quantifier expansion exceeds cap", None).into(),
                );
            }
        } else if m > MAX_QUANTIFIER_EXPANSION {
            return Err(CompileError::new("quantifier expansion exceeds cap", None).into());
        }

        if m == 0 && n == Some(0) {
            return Ok(self.two_state_edge_epsilon());
        }

        // Build the inner fragment's template exactly once. Every instance
        // wired into the graph below is a clone of it, never the template
        // itself, so that wiring one instance can never mutate the states a
        // later clone is about to copy.
        let template = self.build(inner)?;

        let mut mandatory: Option<Fragment> = None;
        for _ in 0..m {
            let clone = self.clone_fragment(&template);
            mandatory = Some(match mandatory {
                None => clone,
                Some(prev) => {
                    self.states[prev.accept].accept = false;
                    self.link_eps(prev.accept, clone.start);
                    Fragment {
                        start: prev.start,
                        accept: clone.accept,
                    }
                }
            });
        }

        match n {
            None => {
                // Unbounded: a single trailing loop state, itself accepting
                // so the loop may be exited after any iteration >= m.
                let loop_clone = self.clone_fragment(&template);
                let loop_state = self.new_state();
                self.states[loop_state].accept = true;
                self.link_eps(loop_state, loop_clone.start);
                self.states[loop_clone.accept].accept = false;
                self.link_eps(loop_clone.accept, loop_state);

                let start = match mandatory {
                    Some(frag) => {
                        self.states[frag.accept].accept = false;
                        self.link_eps(frag.accept, loop_state);
                        frag.start
                    }
                    None => loop_state,
                };
                Ok(Fragment {
                    start,
                    accept: loop_state,
                })
            }
            Some(n) if n == m => match mandatory {
                Some(frag) => {
                    self.states[frag.accept].accept = true;
                    Ok(frag)
                }
                None => Err(Error::Internal(
                    "m == 0 && n == Some(0) should have been handled above".into(),
                )),
            },
            Some(n) => {
                // n - m optional clones, each individually bypassable to a
                // single shared join state.
                let join = self.new_state();
                self.states[join].accept = true;

                let (start, mut prev_accept) = match mandatory {
                    Some(frag) => {
                        self.states[frag.accept].accept = false;
                        (frag.start, frag.accept)
                    }
                    None => (join, join),
                };

                for _ in 0..(n - m) {
                    let clone = self.clone_fragment(&template);
                    self.link_eps(prev_accept, clone.start);
                    self.link_eps(prev_accept, join);
                    self.states[clone.accept].accept = false;
                    self.link_eps(clone.accept, join);
                    prev_accept = clone.accept;
                }

                Ok(Fragment { start, accept: join })
            }
        }
    }
}
