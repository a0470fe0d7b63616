// CYK parser - fills a triangular chart bottom-up over a grammar in relaxed CNF
// and keeps every derivation it finds

use crate::error::GrammarError;
use crate::grammars::Grammar;
use crate::parse_tree::{ParseNode, ParseTree};
use crate::symbols::Symbol;
use indexmap::IndexSet;
use log::{debug, trace};
use rustc_hash::FxHasher;
use std::borrow::Cow;
use std::hash::BuildHasherDefault;
use std::rc::Rc;

/// Symbols deriving one span, in the order they were first found
pub type SymbolSet = IndexSet<Symbol, BuildHasherDefault<FxHasher>>;

/// Every derivation found for one span
pub type Derivations = Vec<Rc<ParseNode>>;

/// Triangular table over inclusive spans `(start, end)` with `start <= end < len`,
/// stored row by row in one flat vector.
#[derive(Debug, Clone)]
pub struct Triangle<T> {
    len: usize,
    cells: Vec<T>,
}

impl<T: Clone + Default> Triangle<T> {
    fn new(len: usize) -> Self {
        Triangle {
            len,
            cells: vec![T::default(); len * (len + 1) / 2],
        }
    }
}

impl<T> Triangle<T> {
    fn index(&self, start: usize, end: usize) -> usize {
        assert!(
            start <= end && end < self.len,
            "span ({}, {}) outside a chart of length {}",
            start,
            end,
            self.len
        );
        // rows 0..start hold len, len-1, ... cells
        start * (2 * self.len - start + 1) / 2 + (end - start)
    }

    pub fn get(&self, start: usize, end: usize) -> &T {
        &self.cells[self.index(start, end)]
    }

    fn set(&mut self, start: usize, end: usize, value: T) {
        let i = self.index(start, end);
        self.cells[i] = value;
    }

    fn get_mut(&mut self, start: usize, end: usize) -> &mut T {
        let i = self.index(start, end);
        &mut self.cells[i]
    }
}

/// Result of running the parser over one sentence
#[derive(Debug, Clone)]
pub struct Chart {
    start_symbol: Symbol,
    table: Triangle<SymbolSet>,
    /// Absent when only recognizing
    forest: Option<Triangle<Derivations>>,
}

impl Chart {
    /// Number of input tokens
    pub fn len(&self) -> usize {
        self.table.len
    }

    pub fn is_empty(&self) -> bool {
        self.table.len == 0
    }

    /// Symbols deriving tokens `start..=end`. Panics if the span is out of range.
    pub fn symbols_at(&self, start: usize, end: usize) -> &SymbolSet {
        self.table.get(start, end)
    }

    /// Forest entries for tokens `start..=end`; empty if the forest was not built
    pub fn derivations_at(&self, start: usize, end: usize) -> &[Rc<ParseNode>] {
        match &self.forest {
            Some(forest) => forest.get(start, end).as_slice(),
            None => &[],
        }
    }

    /// Whether the whole input derives from the start symbol
    pub fn accepts(&self) -> bool {
        !self.is_empty() && self.table.get(0, self.len() - 1).contains(&self.start_symbol)
    }

    /// Derivations of the whole input rooted at the start symbol
    pub fn roots(&self) -> Vec<Rc<ParseNode>> {
        if !self.accepts() {
            return Vec::new();
        }
        self.derivations_at(0, self.len() - 1)
            .iter()
            .filter(|node| node.symbol() == self.start_symbol)
            .cloned()
            .collect()
    }
}

pub struct CykParser<'g> {
    grammar: &'g Grammar,
}

impl<'g> CykParser<'g> {
    /// Wrap a grammar that is already in relaxed CNF
    pub fn new(grammar: &'g Grammar) -> Result<Self, GrammarError> {
        grammar.validate()?;
        if let Some(id) = grammar.first_cnf_violation() {
            return Err(GrammarError::NotRelaxedCnf {
                rule: grammar.rule_str(id),
            });
        }
        Ok(CykParser { grammar })
    }

    pub fn grammar(&self) -> &Grammar {
        self.grammar
    }

    /// Fill the chart for `tokens`; the forest is only built when asked for
    pub fn fill<T: AsRef<str>>(&self, tokens: &[T], build_forest: bool) -> Chart {
        let length = tokens.len();
        let mut table = Triangle::new(length);
        let mut forest = build_forest.then(|| Triangle::new(length));

        self.parse_1(tokens, &mut table, forest.as_mut());
        for n in 2..=length {
            self.parse_n(n, &mut table, forest.as_mut());
        }

        let chart = Chart {
            start_symbol: self.grammar.start(),
            table,
            forest,
        };
        debug!(
            "grammar '{}': {} tokens, accepted: {}",
            self.grammar.name,
            length,
            chart.accepts()
        );
        chart
    }

    /// Spans of length 1: the token itself plus every `A -> token`
    fn parse_1<T: AsRef<str>>(
        &self,
        tokens: &[T],
        table: &mut Triangle<SymbolSet>,
        mut forest: Option<&mut Triangle<Derivations>>,
    ) {
        let symbols = self.grammar.symbols();

        for (w, token) in tokens.iter().enumerate() {
            let token: &str = token.as_ref();
            let terminal = match symbols.terminal(token) {
                Some(t) => t,
                None => {
                    trace!("token {:?} at {} matches no terminal", token, w);
                    continue;
                }
            };

            let cell = table.get_mut(w, w);
            cell.insert(terminal);
            let leaf = ParseNode::terminal(terminal);
            if let Some(forest) = forest.as_deref_mut() {
                forest.get_mut(w, w).push(leaf.clone());
            }

            for &id in self.grammar.rules_by_rhs(&[terminal]) {
                let lhs = self.grammar.rule(id).lhs;
                cell.insert(lhs);
                if let Some(forest) = forest.as_deref_mut() {
                    forest
                        .get_mut(w, w)
                        .push(ParseNode::derived(lhs, vec![leaf.clone()]));
                }
            }
        }
    }

    /// Spans of length `n`, built only from the strictly shorter spans below them
    fn parse_n(
        &self,
        n: usize,
        table: &mut Triangle<SymbolSet>,
        mut forest: Option<&mut Triangle<Derivations>>,
    ) {
        let length = table.len;
        let mut filled = 0;

        for start in 0..=length - n {
            let end = start + n - 1;
            let mut cell = SymbolSet::default();
            let mut derivations = Derivations::new();

            for k in start..end {
                for &left in table.get(start, k) {
                    for &right in table.get(k + 1, end) {
                        for &id in self.grammar.rules_by_rhs(&[left, right]) {
                            let lhs = self.grammar.rule(id).lhs;
                            cell.insert(lhs);

                            if let Some(forest) = forest.as_deref() {
                                combine(
                                    lhs,
                                    forest.get(start, k),
                                    left,
                                    forest.get(k + 1, end),
                                    right,
                                    &mut derivations,
                                );
                            }
                        }
                    }
                }
            }

            if !cell.is_empty() {
                filled += 1;
            }
            table.set(start, end, cell);
            if let Some(forest) = forest.as_deref_mut() {
                forest.set(start, end, derivations);
            }
        }

        trace!("span length {}: {} of {} cells filled", n, filled, length - n + 1);
    }

    /// Membership only; skips building the forest
    pub fn recognize<T: AsRef<str>>(&self, tokens: &[T]) -> bool {
        self.fill(tokens, false).accepts()
    }

    /// All derivations of the input rooted at the start symbol, still in CNF shape
    pub fn parse_forest<T: AsRef<str>>(&self, tokens: &[T]) -> Vec<Rc<ParseNode>> {
        self.fill(tokens, true).roots()
    }

    /// All parse trees of the input with the normalization symbols collapsed away
    pub fn parse<T: AsRef<str>>(&self, tokens: &[T]) -> Vec<ParseTree> {
        let symbols = self.grammar.symbols();
        self.parse_forest(tokens)
            .iter()
            .map(|root| root.to_tree().collapse_synthetic(symbols))
            .collect()
    }
}

/// Append an `lhs` node for every pairing of a `left` and a `right` derivation
fn combine(
    lhs: Symbol,
    left_cell: &[Rc<ParseNode>],
    left: Symbol,
    right_cell: &[Rc<ParseNode>],
    right: Symbol,
    out: &mut Derivations,
) {
    for l in left_cell.iter().filter(|node| node.symbol() == left) {
        for r in right_cell.iter().filter(|node| node.symbol() == right) {
            out.push(ParseNode::derived(lhs, vec![l.clone(), r.clone()]));
        }
    }
}

/// Borrow the grammar if it is already in relaxed CNF, otherwise normalize a copy
fn normalized(grammar: &Grammar) -> Cow<'_, Grammar> {
    if grammar.is_relaxed_cnf() {
        Cow::Borrowed(grammar)
    } else {
        let mut cnf = grammar.clone();
        cnf.to_relaxed_cnf();
        Cow::Owned(cnf)
    }
}

/// Parse input using CYK algorithm (recognizer only)
/// Returns true if the input is accepted by the grammar
pub fn recognize<T: AsRef<str>>(grammar: &Grammar, tokens: &[T]) -> Result<bool, GrammarError> {
    let cnf = normalized(grammar);
    let parser = CykParser::new(&cnf)?;
    Ok(parser.recognize(tokens))
}

/// Parse input using CYK algorithm
/// Returns every parse tree, in the shape of the grammar's own rules.
///
/// Normalization only ever adds symbols, so the returned trees can be read
/// with `grammar.symbols()` even when a normalized copy did the parsing.
pub fn parse<T: AsRef<str>>(grammar: &Grammar, tokens: &[T]) -> Result<Vec<ParseTree>, GrammarError> {
    let cnf = normalized(grammar);
    let parser = CykParser::new(&cnf)?;
    Ok(parser.parse(tokens))
}
