// Grammars module - rule storage, the right-hand-side index and JSON grammar loading

use crate::error::{GrammarError, LoadError};
use crate::symbols::{classify, Symbol, SymbolTable};
use indexmap::IndexMap;
use log::debug;
use rustc_hash::FxHashMap;
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::Path;

/// Index of a rule in its grammar's insertion order
pub type RuleId = usize;

// ============================================================================
// Rules
// ============================================================================

/// A single production `lhs -> rhs[0] rhs[1] ...`.
///
/// Alternatives are separate rules sharing the same `lhs`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GrammarRule {
    pub lhs: Symbol,
    pub rhs: Vec<Symbol>,
}

impl GrammarRule {
    pub fn new(lhs: Symbol, rhs: Vec<Symbol>) -> Self {
        GrammarRule { lhs, rhs }
    }

    /// `A -> a`
    pub fn is_terminal_rule(&self) -> bool {
        self.rhs.len() == 1 && self.rhs[0].is_terminal()
    }

    /// `A -> X Y` for any mix of terminals and non-terminals
    pub fn is_binary(&self) -> bool {
        self.rhs.len() == 2
    }

    /// Render the rule with surface names, e.g. `$S -> $NP $VP`
    pub fn to_string_with(&self, symbols: &SymbolTable) -> String {
        let rhs: Vec<String> = self.rhs.iter().map(|&s| symbols.surface_name(s)).collect();
        format!("{} -> {}", symbols.surface_name(self.lhs), rhs.join(" "))
    }
}

// ============================================================================
// Grammar
// ============================================================================

#[derive(Debug, Clone)]
pub struct Grammar {
    pub name: String,
    /// Sample sentences shipped with a grammar file
    pub tests: Vec<String>,
    symbols: SymbolTable,
    start: Symbol,
    /// Insertion order is the tie-break order between ambiguous derivations
    rules: Vec<GrammarRule>,
    rule_map: FxHashMap<Vec<Symbol>, Vec<RuleId>>,
    /// Last number handed out to a synthetic symbol
    pub(crate) synthetic_counter: u32,
}

impl Grammar {
    /// Create an empty grammar with the given start symbol
    pub fn new(name: &str, start: &str) -> Result<Self, GrammarError> {
        let mut symbols = SymbolTable::new();
        let start = symbols.intern(start);
        if start.is_terminal() {
            return Err(GrammarError::TerminalStart {
                symbol: symbols.surface_name(start),
            });
        }

        Ok(Grammar {
            name: name.to_string(),
            tests: Vec::new(),
            symbols,
            start,
            rules: Vec::new(),
            rule_map: FxHashMap::default(),
            synthetic_counter: 0,
        })
    }

    /// Build and validate a grammar from `(lhs, rhs)` name lists
    pub fn from_rules<I, L, R, S>(name: &str, start: &str, rules: I) -> Result<Self, GrammarError>
    where
        I: IntoIterator<Item = (L, R)>,
        L: AsRef<str>,
        R: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut grammar = Grammar::new(name, start)?;
        for (lhs, rhs) in rules {
            grammar.add_rule(lhs.as_ref(), rhs)?;
        }
        grammar.validate()?;
        Ok(grammar)
    }

    /// Append `lhs -> rhs` and index it
    pub fn add_rule<R, S>(&mut self, lhs: &str, rhs: R) -> Result<RuleId, GrammarError>
    where
        R: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let rhs: Vec<S> = rhs.into_iter().collect();
        if classify(lhs).1 {
            return Err(GrammarError::TerminalLhs {
                symbol: lhs.to_string(),
            });
        }
        if rhs.is_empty() {
            return Err(GrammarError::EmptyRhs {
                lhs: lhs.to_string(),
            });
        }

        // names minted by normalization belong to its chains only
        let names = std::iter::once(lhs).chain(rhs.iter().map(AsRef::<str>::as_ref));
        for name in names {
            if let Some(symbol) = self.symbols.get(name) {
                if self.symbols.is_synthetic(symbol) {
                    return Err(GrammarError::SyntheticSymbol {
                        symbol: name.to_string(),
                    });
                }
            }
        }

        let lhs = self.symbols.intern(lhs);
        let rhs = rhs.iter().map(|s| self.symbols.intern(s.as_ref())).collect();
        Ok(self.push_rule(GrammarRule::new(lhs, rhs)))
    }

    pub(crate) fn push_rule(&mut self, rule: GrammarRule) -> RuleId {
        let id = self.rules.len();
        self.rule_map.entry(rule.rhs.clone()).or_default().push(id);
        self.rules.push(rule);
        id
    }

    /// Swap in a whole new rule list and reindex it
    pub(crate) fn replace_rules(&mut self, rules: Vec<GrammarRule>) {
        self.rules = rules;
        self.rebuild_rule_map();
    }

    fn rebuild_rule_map(&mut self) {
        self.rule_map.clear();
        for (id, rule) in self.rules.iter().enumerate() {
            self.rule_map.entry(rule.rhs.clone()).or_default().push(id);
        }
        debug!(
            "grammar '{}': indexed {} rules under {} right-hand sides",
            self.name,
            self.rules.len(),
            self.rule_map.len()
        );
    }

    /// Rules producing exactly `rhs`, in insertion order
    pub fn rules_by_rhs(&self, rhs: &[Symbol]) -> &[RuleId] {
        self.rule_map.get(rhs).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Check the invariants that cannot be enforced rule by rule
    pub fn validate(&self) -> Result<(), GrammarError> {
        if self.start.is_terminal() {
            return Err(GrammarError::TerminalStart {
                symbol: self.symbols.surface_name(self.start),
            });
        }
        if !self.rules.iter().any(|r| r.lhs == self.start) {
            return Err(GrammarError::UndefinedStart {
                symbol: self.symbols.surface_name(self.start),
            });
        }
        Ok(())
    }

    /// True iff every rule is `A -> a` or `A -> X Y`
    pub fn is_relaxed_cnf(&self) -> bool {
        self.start.is_non_terminal() && self.first_cnf_violation().is_none()
    }

    /// True iff every rule is `A -> a` or `A -> B C` with `B` and `C` non-terminals
    pub fn is_strict_cnf(&self) -> bool {
        self.start.is_non_terminal()
            && self.rules.iter().all(|r| {
                r.is_terminal_rule()
                    || (r.is_binary() && r.rhs.iter().all(|s| s.is_non_terminal()))
            })
    }

    /// First rule breaking relaxed CNF, if any
    pub fn first_cnf_violation(&self) -> Option<RuleId> {
        self.rules
            .iter()
            .position(|r| !(r.is_terminal_rule() || r.is_binary()))
    }

    pub fn start(&self) -> Symbol {
        self.start
    }

    pub fn start_str(&self) -> String {
        self.symbols.surface_name(self.start)
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub(crate) fn symbols_mut(&mut self) -> &mut SymbolTable {
        &mut self.symbols
    }

    pub fn rule(&self, id: RuleId) -> &GrammarRule {
        &self.rules[id]
    }

    pub fn rules(&self) -> &[GrammarRule] {
        &self.rules
    }

    pub fn rule_str(&self, id: RuleId) -> String {
        self.rules[id].to_string_with(&self.symbols)
    }

    pub fn production_count(&self) -> usize {
        self.rules.len()
    }

    pub fn num_terminals(&self) -> usize {
        self.symbols.num_terminals()
    }

    pub fn num_non_terminals(&self) -> usize {
        self.symbols.num_non_terminals()
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "grammar {} (start {})", self.name, self.start_str())?;
        for rule in &self.rules {
            writeln!(f, "  {}", rule.to_string_with(&self.symbols))?;
        }
        Ok(())
    }
}

// ============================================================================
// Grammar Loading
// ============================================================================

/// JSON structure for grammar files
///
/// ```json
/// { "name": "ab", "start": "$S", "rules": { "$S": [["a", "$B"]], "$B": [["b"]] } }
/// ```
#[derive(Debug, Deserialize)]
struct GrammarJson {
    name: String,
    start: String,
    rules: IndexMap<String, Vec<Vec<String>>>,
    #[serde(default)]
    tests: Vec<String>,
}

/// Load a grammar from a JSON file
pub fn load_grammar_from_file<P: AsRef<Path>>(path: P) -> Result<Grammar, LoadError> {
    let content = fs::read_to_string(&path)?;
    load_grammar_from_str(&content)
}

/// Load a grammar from a JSON string; rules keep the order they are written in
pub fn load_grammar_from_str(json: &str) -> Result<Grammar, LoadError> {
    let parsed: GrammarJson = serde_json::from_str(json)?;

    let mut grammar = Grammar::new(&parsed.name, &parsed.start)?;
    for (lhs, alternatives) in &parsed.rules {
        for rhs in alternatives {
            grammar.add_rule(lhs, rhs)?;
        }
    }
    grammar.validate()?;
    grammar.tests = parsed.tests;

    debug!(
        "loaded grammar '{}': {} rules, {} terminals, {} non-terminals",
        grammar.name,
        grammar.production_count(),
        grammar.num_terminals(),
        grammar.num_non_terminals()
    );
    Ok(grammar)
}

#[cfg(test)]
#[path = "grammars_tests.rs"]
mod tests;
