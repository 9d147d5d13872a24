//! SLR(1) parse table
//!
//! [`ParseTable::build`] turns a [`Grammar`] into action and goto tables:
//!
//! 1. nullable nonterminals, then FIRST and FOLLOW sets by fixed-point iteration
//! 2. the canonical collection of LR(0) item sets
//! 3. shifts from terminal transitions, gotos from nonterminal transitions, and a
//!    reduce on every FOLLOW terminal of each completed item
//!
//! Two entries for the same state and terminal are a conflict and fail the build.
//! The state holding the completed start rule accepts without looking further.
//!
//! Built tables are cached per process by name ([`load`]).

use crate::troff::error::TableError;
use crate::troff::lexer::TokenKind;
use crate::troff::parser::grammar::{Grammar, Symbol};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseAction {
    /// Push the lookahead and move to the state.
    Shift(usize),
    /// Reduce by the production.
    Reduce(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductionInfo {
    pub lhs: usize,
    pub len: usize,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseTable {
    name: String,
    signature: String,
    productions: Vec<ProductionInfo>,
    actions: Vec<BTreeMap<TokenKind, ParseAction>>,
    gotos: Vec<BTreeMap<usize, usize>>,
    accept: BTreeSet<usize>,
}

/// LR(0) item: production index and dot position.
type Item = (usize, usize);

struct Sets {
    nullable: Vec<bool>,
    first: Vec<BTreeSet<TokenKind>>,
    follow: Vec<BTreeSet<TokenKind>>,
}

impl Sets {
    fn compute(grammar: &Grammar) -> Self {
        let count = grammar.nonterminals().len();
        let productions = grammar.productions();

        let mut nullable = vec![false; count];
        let mut changed = true;
        while changed {
            changed = false;
            for production in productions {
                if !nullable[production.lhs]
                    && production.rhs.iter().all(|symbol| match symbol {
                        Symbol::Terminal(_) => false,
                        Symbol::NonTerminal(nt) => nullable[*nt],
                    })
                {
                    nullable[production.lhs] = true;
                    changed = true;
                }
            }
        }

        let mut sets = Self {
            nullable,
            first: vec![BTreeSet::new(); count],
            follow: vec![BTreeSet::new(); count],
        };

        changed = true;
        while changed {
            changed = false;
            for production in productions {
                let (first, _) = sets.first_of(&production.rhs);
                let target = &mut sets.first[production.lhs];
                let before = target.len();
                target.extend(first);
                changed |= target.len() != before;
            }
        }

        changed = true;
        while changed {
            changed = false;
            for production in productions {
                for (index, symbol) in production.rhs.iter().enumerate() {
                    let Symbol::NonTerminal(nt) = *symbol else {
                        continue;
                    };
                    let (mut add, rest_nullable) = sets.first_of(&production.rhs[index + 1..]);
                    if rest_nullable {
                        add.extend(sets.follow[production.lhs].iter().copied());
                    }
                    let target = &mut sets.follow[nt];
                    let before = target.len();
                    target.extend(add);
                    changed |= target.len() != before;
                }
            }
        }

        sets
    }

    /// FIRST of a symbol string, and whether the whole string is nullable.
    fn first_of(&self, symbols: &[Symbol]) -> (BTreeSet<TokenKind>, bool) {
        let mut out = BTreeSet::new();
        for symbol in symbols {
            match *symbol {
                Symbol::Terminal(kind) => {
                    out.insert(kind);
                    return (out, false);
                }
                Symbol::NonTerminal(nt) => {
                    out.extend(self.first[nt].iter().copied());
                    if !self.nullable[nt] {
                        return (out, false);
                    }
                }
            }
        }
        (out, true)
    }
}

fn closure(grammar: &Grammar, kernel: BTreeSet<Item>) -> BTreeSet<Item> {
    let mut items = kernel;
    let mut work: Vec<Item> = items.iter().copied().collect();
    while let Some((production, dot)) = work.pop() {
        let Some(Symbol::NonTerminal(nt)) = grammar.productions()[production].rhs.get(dot) else {
            continue;
        };
        for (index, candidate) in grammar.productions().iter().enumerate() {
            if candidate.lhs == *nt && items.insert((index, 0)) {
                work.push((index, 0));
            }
        }
    }
    items
}

impl ParseTable {
    /// Build the SLR(1) table for `grammar`. `name` only labels the result.
    pub fn build(grammar: &Grammar, name: &str, debug: bool) -> Result<Self, TableError> {
        let sets = Sets::compute(grammar);
        let productions = grammar.productions();

        if debug {
            for (nt, follow) in sets.follow.iter().enumerate() {
                tracing::debug!(
                    nonterminal = grammar.nonterminal_name(nt),
                    nullable = sets.nullable[nt],
                    first = ?sets.first[nt],
                    follow = ?follow,
                    "grammar sets"
                );
            }
        }

        let mut states: Vec<BTreeSet<Item>> = vec![closure(grammar, BTreeSet::from([(0, 0)]))];
        let mut index_of: HashMap<BTreeSet<Item>, usize> = HashMap::new();
        index_of.insert(states[0].clone(), 0);
        let mut transitions: Vec<BTreeMap<Symbol, usize>> = Vec::new();

        let mut current = 0;
        while current < states.len() {
            let mut kernels: BTreeMap<Symbol, BTreeSet<Item>> = BTreeMap::new();
            for &(production, dot) in &states[current] {
                if let Some(symbol) = productions[production].rhs.get(dot) {
                    kernels
                        .entry(*symbol)
                        .or_default()
                        .insert((production, dot + 1));
                }
            }

            let mut edges = BTreeMap::new();
            for (symbol, kernel) in kernels {
                let items = closure(grammar, kernel);
                let target = match index_of.get(&items).copied() {
                    Some(existing) => existing,
                    None => {
                        states.push(items.clone());
                        index_of.insert(items, states.len() - 1);
                        states.len() - 1
                    }
                };
                edges.insert(symbol, target);
            }
            transitions.push(edges);
            current += 1;
        }

        let mut actions = vec![BTreeMap::new(); states.len()];
        let mut gotos = vec![BTreeMap::new(); states.len()];
        let mut accept = BTreeSet::new();

        for (state, edges) in transitions.iter().enumerate() {
            for (symbol, &target) in edges {
                match *symbol {
                    Symbol::Terminal(kind) => {
                        actions[state].insert(kind, ParseAction::Shift(target));
                    }
                    Symbol::NonTerminal(nt) => {
                        gotos[state].insert(nt, target);
                    }
                }
            }
        }

        for (state, items) in states.iter().enumerate() {
            for &(production, dot) in items {
                let rule = &productions[production];
                if dot < rule.rhs.len() {
                    continue;
                }
                if production == 0 {
                    accept.insert(state);
                    continue;
                }
                for &kind in &sets.follow[rule.lhs] {
                    let reduce = ParseAction::Reduce(production);
                    match actions[state].get(&kind).copied() {
                        None => {
                            actions[state].insert(kind, reduce);
                        }
                        Some(existing) if existing == reduce => {}
                        Some(existing) => {
                            return Err(conflict(grammar, state, kind, existing, production));
                        }
                    }
                }
            }
        }

        if debug {
            tracing::debug!(
                table = name,
                states = states.len(),
                productions = productions.len(),
                "built parse table"
            );
        }

        Ok(Self {
            name: name.to_string(),
            signature: grammar.signature(),
            productions: productions
                .iter()
                .map(|production| ProductionInfo {
                    lhs: production.lhs,
                    len: production.rhs.len(),
                    text: production.text().to_string(),
                })
                .collect(),
            actions,
            gotos,
            accept,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn signature(&self) -> &str {
        &self.signature
    }

    pub fn state_count(&self) -> usize {
        self.actions.len()
    }

    pub fn productions(&self) -> &[ProductionInfo] {
        &self.productions
    }

    pub fn action(&self, state: usize, kind: TokenKind) -> Option<ParseAction> {
        self.actions.get(state)?.get(&kind).copied()
    }

    pub fn goto(&self, state: usize, nonterminal: usize) -> Option<usize> {
        self.gotos.get(state)?.get(&nonterminal).copied()
    }

    /// Terminals with an action in `state`.
    pub fn expected(&self, state: usize) -> Vec<TokenKind> {
        self.actions
            .get(state)
            .map(|row| row.keys().copied().collect())
            .unwrap_or_default()
    }

    pub fn is_accept(&self, state: usize) -> bool {
        self.accept.contains(&state)
    }

    pub fn to_json(&self) -> Result<String, TableError> {
        serde_json::to_string_pretty(self).map_err(|err| TableError::Serialize(err.to_string()))
    }
}

fn conflict(
    grammar: &Grammar,
    state: usize,
    kind: TokenKind,
    existing: ParseAction,
    production: usize,
) -> TableError {
    let text = |index: usize| grammar.production(index).map_or("?", |p| p.text()).to_string();
    match existing {
        ParseAction::Shift(target) => TableError::Conflict {
            kind: "shift/reduce",
            state,
            symbol: kind.name().to_string(),
            detail: format!("shift to {} or reduce {}", target, text(production)),
        },
        ParseAction::Reduce(other) => TableError::Conflict {
            kind: "reduce/reduce",
            state,
            symbol: kind.name().to_string(),
            detail: format!("reduce {} or reduce {}", text(other), text(production)),
        },
    }
}

static TABLES: Lazy<Mutex<HashMap<String, Arc<ParseTable>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Table for `grammar`: the cached copy under `name` when `optimize` is set and the
/// cached signature matches, otherwise a fresh build (which then replaces the cache
/// entry when optimizing).
pub fn load(
    grammar: &Grammar,
    optimize: bool,
    name: &str,
    debug: bool,
) -> Result<Arc<ParseTable>, TableError> {
    if optimize {
        if let Some(table) = TABLES.lock().get(name) {
            if table.signature == grammar.signature() {
                return Ok(Arc::clone(table));
            }
            tracing::debug!(table = name, "cached parse table is stale, rebuilding");
        }
    }

    let table = Arc::new(ParseTable::build(grammar, name, debug)?);
    if optimize {
        TABLES.lock().insert(name.to_string(), Arc::clone(&table));
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::troff::parser::grammar::{Action, Value};

    fn noop(_: Vec<Value>) -> Option<Value> {
        None
    }

    fn man_page() -> ParseTable {
        ParseTable::build(&Grammar::man_page().unwrap(), "test", false).unwrap()
    }

    #[test]
    fn test_man_page_grammar_has_no_conflicts() {
        let table = man_page();
        assert!(table.state_count() > 10);
        assert_eq!(table.accept.len(), 1);
    }

    #[test]
    fn test_initial_state_expectations() {
        let table = man_page();
        let expected = table.expected(0);
        // blocks -> ε is reduced on everything a document can start with
        assert!(expected.contains(&TokenKind::EndMarker));
        assert!(expected.contains(&TokenKind::Title));
        assert!(expected.contains(&TokenKind::Section));
        assert!(expected.contains(&TokenKind::Word));
        assert!(table
            .expected(0)
            .iter()
            .all(|kind| matches!(table.action(0, *kind), Some(ParseAction::Reduce(8)))));
    }

    #[test]
    fn test_ambiguous_grammar_is_rejected() {
        let rules: &[(&str, Action)] = &[
            ("start : expr ENDMARKER", noop),
            ("expr : expr WORD expr", noop),
            ("expr : SPACE", noop),
        ];
        let grammar = Grammar::from_rules(rules).unwrap();
        match ParseTable::build(&grammar, "ambiguous", false) {
            Err(TableError::Conflict { kind, symbol, .. }) => {
                assert_eq!(kind, "shift/reduce");
                assert_eq!(symbol, "WORD");
            }
            other => panic!("expected a conflict, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_reduce_reduce_conflict() {
        let rules: &[(&str, Action)] = &[
            ("start : a ENDMARKER", noop),
            ("a : b", noop),
            ("a : c", noop),
            ("b : WORD", noop),
            ("c : WORD", noop),
        ];
        let grammar = Grammar::from_rules(rules).unwrap();
        assert!(matches!(
            ParseTable::build(&grammar, "rr", false),
            Err(TableError::Conflict {
                kind: "reduce/reduce",
                ..
            })
        ));
    }

    #[test]
    fn test_cache_reuses_and_fresh_builds_match() {
        let grammar = Grammar::man_page().unwrap();
        let a = load(&grammar, true, "table_cache_test", false).unwrap();
        let b = load(&grammar, true, "table_cache_test", false).unwrap();
        assert!(Arc::ptr_eq(&a, &b));

        let fresh = load(&grammar, false, "table_cache_test", true).unwrap();
        assert!(!Arc::ptr_eq(&a, &fresh));
        assert_eq!(*a, *fresh);
    }

    #[test]
    fn test_stale_cache_entry_is_rebuilt() {
        let rules: &[(&str, Action)] = &[("start : WORD ENDMARKER", noop)];
        let small = Grammar::from_rules(rules).unwrap();
        let stale = load(&small, true, "table_stale_test", false).unwrap();

        let grammar = Grammar::man_page().unwrap();
        let table = load(&grammar, true, "table_stale_test", false).unwrap();
        assert_ne!(stale.signature(), table.signature());
        assert_eq!(table.signature(), grammar.signature());
    }

    #[test]
    fn test_json_names_token_kinds() {
        let json = man_page().to_json().unwrap();
        assert!(json.contains("\"ENDMARKER\""));
        assert!(json.contains("\"shift\""));
        assert!(json.contains("start -> document ENDMARKER"));
    }
}
