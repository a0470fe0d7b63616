// Symbol table - interns grammar symbols and remembers which ones normalization made up

use crate::grammars::GrammarRule;
use rustc_hash::FxHashMap;

/// Prefix that marks a name as a non-terminal (`$NP`); everything else is a terminal.
pub const NON_TERMINAL_MARKER: char = '$';

/// Handle to an interned symbol.
///
/// Handles are only ever issued by [`SymbolTable::intern`], so two handles are
/// equal exactly when their names and terminal flags are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Symbol {
    id: u32,
    terminal: bool,
}

impl Symbol {
    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    pub fn is_non_terminal(&self) -> bool {
        !self.terminal
    }
}

#[derive(Debug, Clone)]
struct SymbolEntry {
    name: String,
    terminal: bool,
    /// Rule this symbol was split out of, for symbols minted by normalization
    origin: Option<GrammarRule>,
}

/// Split a surface name into its bare name and terminal flag.
///
/// A lone `$` has nothing after the marker and is read as a terminal.
pub fn classify(surface: &str) -> (&str, bool) {
    match surface.strip_prefix(NON_TERMINAL_MARKER) {
        Some(name) if !name.is_empty() => (name, false),
        _ => (surface, true),
    }
}

/// Bidirectional mapping between symbol names and [`Symbol`] handles
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    terminals: FxHashMap<String, u32>,
    non_terminals: FxHashMap<String, u32>,
    entries: Vec<SymbolEntry>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create the symbol for a surface name such as `$NP` or `duck`
    pub fn intern(&mut self, surface: &str) -> Symbol {
        let (name, terminal) = classify(surface);
        let index = if terminal {
            &mut self.terminals
        } else {
            &mut self.non_terminals
        };

        if let Some(&id) = index.get(name) {
            return Symbol { id, terminal };
        }

        let id = self.entries.len() as u32;
        index.insert(name.to_string(), id);
        self.entries.push(SymbolEntry {
            name: name.to_string(),
            terminal,
            origin: None,
        });
        Symbol { id, terminal }
    }

    /// Look up a surface name without creating it
    pub fn get(&self, surface: &str) -> Option<Symbol> {
        let (name, terminal) = classify(surface);
        if terminal {
            self.terminal(name)
        } else {
            self.non_terminal(name)
        }
    }

    /// Look up an input token; tokens always denote terminals
    pub fn terminal(&self, token: &str) -> Option<Symbol> {
        self.terminals
            .get(token)
            .map(|&id| Symbol { id, terminal: true })
    }

    /// Look up a non-terminal by its bare name (without the `$`)
    pub fn non_terminal(&self, name: &str) -> Option<Symbol> {
        self.non_terminals
            .get(name)
            .map(|&id| Symbol { id, terminal: false })
    }

    /// Tag a non-terminal as introduced by normalization and remember the rule
    /// it was split from.
    pub fn mark_synthetic(&mut self, symbol: Symbol, origin: GrammarRule) {
        debug_assert!(
            symbol.is_non_terminal(),
            "only non-terminals can be synthetic"
        );
        self.entries[symbol.id as usize].origin = Some(origin);
    }

    pub fn is_synthetic(&self, symbol: Symbol) -> bool {
        self.entries[symbol.id as usize].origin.is_some()
    }

    /// The original rule a synthetic symbol was split from
    pub fn origin(&self, symbol: Symbol) -> Option<&GrammarRule> {
        self.entries[symbol.id as usize].origin.as_ref()
    }

    /// Bare name of a symbol (`NP` for `$NP`)
    pub fn name(&self, symbol: Symbol) -> &str {
        &self.entries[symbol.id as usize].name
    }

    /// Name as written in a grammar, with the marker restored for non-terminals
    pub fn surface_name(&self, symbol: Symbol) -> String {
        let entry = &self.entries[symbol.id as usize];
        if entry.terminal {
            entry.name.clone()
        } else {
            format!("{}{}", NON_TERMINAL_MARKER, entry.name)
        }
    }

    pub fn num_terminals(&self) -> usize {
        self.terminals.len()
    }

    pub fn num_non_terminals(&self) -> usize {
        self.non_terminals.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
