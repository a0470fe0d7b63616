// Converting grammars to relaxed Chomsky Normal Form
//
// Only long rules are touched: A -> X1 X2 ... Xk (k > 2) becomes
//   A   -> X1 E1
//   E1  -> X2 E2
//   ...
//   Ek-2 -> Xk-1 Xk
// Every Ei is marked synthetic with A -> X1 ... Xk as its origin.

use crate::grammars::{Grammar, GrammarRule};
use crate::symbols::{Symbol, NON_TERMINAL_MARKER};
use log::debug;

impl Grammar {
    /// Binarize every rule longer than two symbols, in place.
    ///
    /// Returns how many rules were split. Rules of length one or two are kept
    /// as they are, so running this again on its own output changes nothing.
    pub fn to_relaxed_cnf(&mut self) -> usize {
        if self.rules().iter().all(|r| r.rhs.len() <= 2) {
            return 0;
        }

        let old_rules = self.rules().to_vec();
        let mut new_rules = Vec::with_capacity(old_rules.len());
        let mut split = 0;

        for rule in old_rules {
            if rule.rhs.len() <= 2 {
                new_rules.push(rule);
                continue;
            }

            let chain = self.decompose_rule(&rule);
            debug!(
                "split '{}' into {} binary rules",
                rule.to_string_with(self.symbols()),
                chain.len()
            );
            new_rules.extend(chain);
            split += 1;
        }

        self.replace_rules(new_rules);
        split
    }

    /// Turn one long rule into its chain of binary rules
    fn decompose_rule(&mut self, rule: &GrammarRule) -> Vec<GrammarRule> {
        let last = rule.rhs.len() - 1;
        let mut chain = Vec::with_capacity(last);
        let mut lhs = rule.lhs;

        for (i, &symbol) in rule.rhs[..last].iter().enumerate() {
            let rest = if i + 1 == last {
                rule.rhs[last]
            } else {
                self.mint_synthetic(rule)
            };
            chain.push(GrammarRule::new(lhs, vec![symbol, rest]));
            lhs = rest;
        }

        chain
    }

    /// Create a fresh `$E<n>` non-terminal standing for the tail of `origin`.
    ///
    /// Numbers already taken by other symbols are skipped.
    fn mint_synthetic(&mut self, origin: &GrammarRule) -> Symbol {
        loop {
            self.synthetic_counter += 1;
            let name = format!("E{}", self.synthetic_counter);
            if self.symbols().non_terminal(&name).is_some() {
                continue;
            }

            let symbols = self.symbols_mut();
            let symbol = symbols.intern(&format!("{}{}", NON_TERMINAL_MARKER, name));
            symbols.mark_synthetic(symbol, origin.clone());
            return symbol;
        }
    }
}
