use std::collections::HashMap;

use rust_decimal::Decimal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertDecision {
    NoAction,
    Fire,
}

#[derive(Debug, Clone, Copy)]
struct Armed {
    fired: bool,
    target: Decimal,
}

/// Edge-triggered "target hit" detection, one flag per symbol.
///
/// `fired` stays set while the observed price is at or above target and clears
/// on the first observation below it. Changing a symbol's target re-arms it.
#[derive(Debug, Default)]
pub struct AlertStateTracker {
    states: HashMap<String, Armed>,
}

impl AlertStateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn evaluate(&mut self, symbol: &str, price: Decimal, target: Decimal) -> AlertDecision {
        let state = self.states.entry(symbol.to_string()).or_insert(Armed {
            fired: false,
            target,
        });

        if state.target != target {
            state.target = target;
            state.fired = false;
        }

        if price < target {
            state.fired = false;
            return AlertDecision::NoAction;
        }

        if state.fired {
            return AlertDecision::NoAction;
        }

        state.fired = true;
        AlertDecision::Fire
    }

    pub fn is_fired(&self, symbol: &str) -> bool {
        self.states.get(symbol).map(|s| s.fired).unwrap_or(false)
    }

    /// Drops state for symbols no longer being watched.
    pub fn retain_symbols<'a, I>(&mut self, symbols: I)
    where
        I: IntoIterator<Item = &'a String>,
    {
        let keep: std::collections::HashSet<&String> = symbols.into_iter().collect();
        self.states.retain(|s, _| keep.contains(s));
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}
