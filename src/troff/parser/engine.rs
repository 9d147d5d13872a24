//! Shift/reduce automaton
//!
//! Drives a [`ParseTable`] over a token source. Tokens are pulled one at a time and
//! only when the current state needs a lookahead, so the token that completes the
//! start rule is the last one fetched.

use crate::troff::lexer::{Token, TokenKind};
use crate::troff::parser::grammar::{Grammar, Value};
use crate::troff::parser::table::{ParseAction, ParseTable};

#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    /// No action for the lookahead in the current state. `token` is `None` when the
    /// source ran dry before the start rule completed.
    Unexpected {
        token: Option<Token>,
        expected: Vec<TokenKind>,
    },
    /// A production action rejected its values, or the table has no goto for it.
    Action {
        production: usize,
        token: Option<Token>,
    },
}

pub struct Automaton<'a> {
    grammar: &'a Grammar,
    table: &'a ParseTable,
}

impl<'a> Automaton<'a> {
    pub fn new(grammar: &'a Grammar, table: &'a ParseTable) -> Self {
        Self { grammar, table }
    }

    /// Run to acceptance and return the start rule's value.
    ///
    /// With `debug_level` above 0 every step is traced; above 1 the state stack is
    /// traced too.
    pub fn run(
        &self,
        mut next: impl FnMut() -> Option<Token>,
        debug_level: u32,
    ) -> Result<Value, EngineError> {
        let mut states: Vec<usize> = vec![0];
        let mut values: Vec<Value> = Vec::new();
        let mut lookahead: Option<Token> = None;

        loop {
            let state = states.last().copied().unwrap_or(0);

            if self.table.is_accept(state) {
                let value = self.reduce(0, &mut states, &mut values, None)?;
                if debug_level > 0 {
                    tracing::debug!(state, "accept");
                }
                return Ok(value);
            }

            let token = match lookahead.take().or_else(&mut next) {
                Some(token) => token,
                None => {
                    return Err(EngineError::Unexpected {
                        token: None,
                        expected: self.table.expected(state),
                    })
                }
            };

            let action = self.table.action(state, token.kind);
            if debug_level > 0 {
                tracing::debug!(state, token = %token, action = ?action, "step");
            }
            if debug_level > 1 {
                tracing::debug!(stack = ?states, "states");
            }

            match action {
                Some(ParseAction::Shift(target)) => {
                    states.push(target);
                    values.push(Value::Token(token));
                }
                Some(ParseAction::Reduce(production)) => {
                    let value =
                        self.reduce(production, &mut states, &mut values, Some(&token))?;
                    let lhs = self.table.productions()[production].lhs;
                    let top = states.last().copied().unwrap_or(0);
                    let target = self.table.goto(top, lhs).ok_or_else(|| EngineError::Action {
                        production,
                        token: Some(token.clone()),
                    })?;
                    states.push(target);
                    values.push(value);
                    lookahead = Some(token);
                }
                None => {
                    return Err(EngineError::Unexpected {
                        token: Some(token),
                        expected: self.table.expected(state),
                    })
                }
            }
        }
    }

    /// Pop the right-hand side of `production` and run its action.
    fn reduce(
        &self,
        production: usize,
        states: &mut Vec<usize>,
        values: &mut Vec<Value>,
        token: Option<&Token>,
    ) -> Result<Value, EngineError> {
        let failed = || EngineError::Action {
            production,
            token: token.cloned(),
        };
        let rule = self.grammar.production(production).ok_or_else(failed)?;
        let len = rule.rhs.len();
        if values.len() < len || states.len() <= len {
            return Err(failed());
        }

        let rhs = values.split_off(values.len() - len);
        states.truncate(states.len() - len);
        (rule.action)(rhs).ok_or_else(failed)
    }
}
