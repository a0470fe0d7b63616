//! CYK chart parsing over context-free grammars.
//!
//! A [`grammars::Grammar`] is built from plain rules, normalized to relaxed
//! Chomsky Normal Form with [`grammars::Grammar::to_relaxed_cnf`], and handed to
//! the [`parsers::cyk`] engine, which returns every derivation of the input.

pub mod cnf;
pub mod error;
pub mod grammars;
pub mod parse_tree;
pub mod parsers;
pub mod render;
pub mod symbols;

pub use error::{GrammarError, LoadError, TreeShapeError};
pub use grammars::{Grammar, GrammarRule, RuleId};
pub use parse_tree::{ParseNode, ParseTree};
pub use symbols::{Symbol, SymbolTable};
