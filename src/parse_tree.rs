use crate::error::TreeShapeError;
use crate::symbols::{Symbol, SymbolTable};
use std::rc::Rc;

fn check_shape(symbol: Symbol, children: usize) -> Result<(), TreeShapeError> {
    match (symbol.is_terminal(), children) {
        (true, 0) => Ok(()),
        (true, children) => Err(TreeShapeError::TerminalWithChildren { symbol, children }),
        (false, 0) => Err(TreeShapeError::EmptyNonTerminal { symbol }),
        (false, _) => Ok(()),
    }
}

// ============================================================================
// Forest nodes
// ============================================================================

/// A node of the parse forest.
///
/// Children are reference counted so that every derivation built on top of a
/// sub-derivation shares it instead of copying it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseNode {
    symbol: Symbol,
    children: Vec<Rc<ParseNode>>,
}

impl ParseNode {
    /// Create a node; terminals must be leaves and non-terminals must not be
    pub fn new(symbol: Symbol, children: Vec<Rc<ParseNode>>) -> Result<Self, TreeShapeError> {
        check_shape(symbol, children.len())?;
        Ok(ParseNode { symbol, children })
    }

    /// Leaf for a matched terminal
    pub(crate) fn terminal(symbol: Symbol) -> Rc<Self> {
        debug_assert!(symbol.is_terminal());
        Rc::new(ParseNode {
            symbol,
            children: Vec::new(),
        })
    }

    /// Node for a non-terminal derived from the given children
    pub(crate) fn derived(symbol: Symbol, children: Vec<Rc<ParseNode>>) -> Rc<Self> {
        debug_assert!(check_shape(symbol, children.len()).is_ok());
        Rc::new(ParseNode { symbol, children })
    }

    pub fn symbol(&self) -> Symbol {
        self.symbol
    }

    pub fn children(&self) -> &[Rc<ParseNode>] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Unfold this derivation into an owned tree
    pub fn to_tree(&self) -> ParseTree {
        ParseTree {
            symbol: self.symbol,
            children: self.children.iter().map(|c| c.to_tree()).collect(),
        }
    }
}

// ============================================================================
// Parse trees
// ============================================================================

/// A single owned derivation: `(symbol, children)`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParseTree {
    symbol: Symbol,
    children: Vec<ParseTree>,
}

impl ParseTree {
    /// Create a parse tree node
    pub fn new(symbol: Symbol, children: Vec<ParseTree>) -> Result<Self, TreeShapeError> {
        check_shape(symbol, children.len())?;
        Ok(ParseTree { symbol, children })
    }

    /// Create a leaf node (no children)
    pub fn leaf(symbol: Symbol) -> Result<Self, TreeShapeError> {
        Self::new(symbol, Vec::new())
    }

    pub fn symbol(&self) -> Symbol {
        self.symbol
    }

    pub fn children(&self) -> &[ParseTree] {
        &self.children
    }

    /// Check if this is a leaf node
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Get the number of children
    pub fn num_children(&self) -> usize {
        self.children.len()
    }

    /// Number of nodes in the tree, this one included
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(|c| c.node_count()).sum::<usize>()
    }

    /// Length of the longest root-to-leaf path, counted in nodes
    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(|c| c.depth()).max().unwrap_or(0)
    }

    /// Terminal leaves from left to right
    pub fn leaves(&self) -> Vec<Symbol> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves(&self, out: &mut Vec<Symbol>) {
        if self.is_leaf() {
            out.push(self.symbol);
        }
        for child in &self.children {
            child.collect_leaves(out);
        }
    }

    /// The sentence this tree derives
    pub fn yield_tokens<'a>(&self, symbols: &'a SymbolTable) -> Vec<&'a str> {
        self.leaves().into_iter().map(|s| symbols.name(s)).collect()
    }

    /// Whether any node is labelled with a symbol minted by normalization
    pub fn contains_synthetic(&self, symbols: &SymbolTable) -> bool {
        symbols.is_synthetic(self.symbol)
            || self.children.iter().any(|c| c.contains_synthetic(symbols))
    }

    /// Undo binarization: splice the children of every synthetic node into its
    /// parent, so a rule `A -> X1 ... Xk` shows up as one node with k children.
    ///
    /// Only synthetic nodes disappear; everything else keeps its parent and
    /// its position among its siblings.
    pub fn collapse_synthetic(self, symbols: &SymbolTable) -> ParseTree {
        let mut children = Vec::with_capacity(self.children.len());
        for child in self.children {
            let child = child.collapse_synthetic(symbols);
            if symbols.is_synthetic(child.symbol) {
                // already collapsed, so its children are all non-synthetic
                children.extend(child.children);
            } else {
                children.push(child);
            }
        }
        ParseTree {
            symbol: self.symbol,
            children,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammars::GrammarRule;

    struct Fixture {
        symbols: SymbolTable,
    }

    impl Fixture {
        fn new() -> Self {
            Fixture {
                symbols: SymbolTable::new(),
            }
        }

        fn leaf(&mut self, name: &str) -> ParseTree {
            ParseTree::leaf(self.symbols.intern(name)).expect("leaf should be valid")
        }

        fn node(&mut self, name: &str, children: Vec<ParseTree>) -> ParseTree {
            ParseTree::new(self.symbols.intern(name), children).expect("node should be valid")
        }

        fn synthetic(&mut self, name: &str) {
            let symbol = self.symbols.intern(name);
            let origin = GrammarRule::new(symbol, vec![symbol]);
            self.symbols.mark_synthetic(symbol, origin);
        }
    }

    #[test]
    fn test_shape_invariant() {
        let mut table = SymbolTable::new();
        let a = table.intern("a");
        let s = table.intern("$S");

        let leaf = ParseTree::leaf(a).expect("terminal leaf is valid");
        assert!(leaf.is_leaf());

        assert_eq!(
            ParseTree::leaf(s),
            Err(TreeShapeError::EmptyNonTerminal { symbol: s })
        );
        assert_eq!(
            ParseTree::new(a, vec![leaf.clone()]),
            Err(TreeShapeError::TerminalWithChildren {
                symbol: a,
                children: 1
            })
        );
        assert!(ParseNode::new(s, Vec::new()).is_err());
        assert!(ParseNode::new(a, Vec::new()).is_ok());
    }

    #[test]
    fn test_forest_node_unfolds_shared_children() {
        let mut table = SymbolTable::new();
        let a = table.intern("a");
        let x = table.intern("$X");
        let s = table.intern("$S");

        let shared = ParseNode::derived(x, vec![ParseNode::terminal(a)]);
        let root = ParseNode::derived(s, vec![shared.clone(), shared]);
        let tree = root.to_tree();

        assert_eq!(tree.num_children(), 2);
        assert_eq!(tree.children()[0], tree.children()[1]);
        assert_eq!(tree.yield_tokens(&table), vec!["a", "a"]);
        assert_eq!(tree.node_count(), 5);
        assert_eq!(tree.depth(), 3);
    }

    #[test]
    fn test_collapse_restores_long_rule() {
        // $S -> $A $E1, $E1 -> $B $E2, $E2 -> $C $D  ==>  $S -> $A $B $C $D
        let mut f = Fixture::new();
        f.synthetic("$E1");
        f.synthetic("$E2");

        let a = f.leaf("a");
        let b = f.leaf("b");
        let c = f.leaf("c");
        let d = f.leaf("d");
        let na = f.node("$A", vec![a]);
        let nb = f.node("$B", vec![b]);
        let nc = f.node("$C", vec![c]);
        let nd = f.node("$D", vec![d]);
        let e2 = f.node("$E2", vec![nc, nd]);
        let e1 = f.node("$E1", vec![nb, e2]);
        let tree = f.node("$S", vec![na, e1]);
        assert!(tree.contains_synthetic(&f.symbols));

        let collapsed = tree.collapse_synthetic(&f.symbols);
        assert!(!collapsed.contains_synthetic(&f.symbols));
        let names: Vec<String> = collapsed
            .children()
            .iter()
            .map(|c| f.symbols.surface_name(c.symbol()))
            .collect();
        assert_eq!(names, vec!["$A", "$B", "$C", "$D"]);
        assert_eq!(collapsed.yield_tokens(&f.symbols), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_collapse_keeps_nested_real_nodes() {
        // $S -> x $E1, $E1 -> $S y where the inner $S is a real node
        let mut f = Fixture::new();
        f.synthetic("$E1");

        let z = f.leaf("z");
        let inner = f.node("$S", vec![z]);
        let y = f.leaf("y");
        let e1 = f.node("$E1", vec![inner, y]);
        let x = f.leaf("x");
        let tree = f.node("$S", vec![x, e1]);

        let collapsed = tree.collapse_synthetic(&f.symbols);
        assert_eq!(collapsed.num_children(), 3);
        assert_eq!(collapsed.children()[1].num_children(), 1);
        assert_eq!(collapsed.yield_tokens(&f.symbols), vec!["x", "z", "y"]);
    }

    #[test]
    fn test_collapse_without_synthetic_is_identity() {
        let mut f = Fixture::new();
        let a = f.leaf("a");
        let na = f.node("$A", vec![a]);
        let tree = f.node("$S", vec![na]);

        let collapsed = tree.clone().collapse_synthetic(&f.symbols);
        assert_eq!(collapsed, tree);
    }
}
