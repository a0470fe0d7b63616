// Error types shared by the grammar model, the tree builders and the loader

use crate::symbols::Symbol;
use thiserror::Error;

/// A grammar that breaks one of the model's invariants.
///
/// These are raised when a grammar is built or handed to the parser, never
/// while a sentence is being parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    #[error("rule for '{lhs}' has an empty right-hand side")]
    EmptyRhs { lhs: String },

    #[error("left-hand side '{symbol}' is a terminal")]
    TerminalLhs { symbol: String },

    #[error("start symbol '{symbol}' is a terminal")]
    TerminalStart { symbol: String },

    #[error("start symbol '{symbol}' has no rule")]
    UndefinedStart { symbol: String },

    #[error("'{symbol}' was introduced by normalization and cannot appear in a new rule")]
    SyntheticSymbol { symbol: String },

    #[error("rule '{rule}' is not in relaxed Chomsky Normal Form")]
    NotRelaxedCnf { rule: String },
}

/// A node whose children contradict its symbol's kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeShapeError {
    #[error("terminal {symbol:?} cannot have {children} children")]
    TerminalWithChildren { symbol: Symbol, children: usize },

    #[error("non-terminal {symbol:?} needs at least one child")]
    EmptyNonTerminal { symbol: Symbol },
}

/// Failure to turn a grammar file into a [`crate::Grammar`].
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read grammar file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse grammar JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid grammar: {0}")]
    Grammar(#[from] GrammarError),
}
