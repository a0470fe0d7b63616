// Renderers for finished parse trees. The parser itself only hands out
// `ParseTree` values; these turn them into text for the command line.

use crate::parse_tree::ParseTree;
use crate::symbols::SymbolTable;
use serde::Serialize;

/// Bracket notation: `$S[$NP[I], $VP[$V[saw], ...]]`
pub fn bracketed(tree: &ParseTree, symbols: &SymbolTable) -> String {
    let name = symbols.surface_name(tree.symbol());
    if tree.is_leaf() {
        return name;
    }
    let children: Vec<String> = tree
        .children()
        .iter()
        .map(|c| bracketed(c, symbols))
        .collect();
    format!("{}[{}]", name, children.join(", "))
}

/// Display tree as ASCII art with box-drawing characters
/// Output format:
///
/// ```text
/// $S
/// ├─ $NP
/// │   └─ I
/// └─ $VP
///     └─ ...
/// ```
pub fn display(tree: &ParseTree, symbols: &SymbolTable) -> String {
    let mut out = symbols.surface_name(tree.symbol());
    let mut pending = Vec::new();
    push_children(&mut pending, tree, "");

    while let Some((node, prefix, last)) = pending.pop() {
        let (branch, indent) = if last {
            ("└─ ", "    ")
        } else {
            ("├─ ", "│   ")
        };
        out.push('\n');
        out.push_str(&prefix);
        out.push_str(branch);
        out.push_str(&symbols.surface_name(node.symbol()));
        push_children(&mut pending, node, &format!("{}{}", prefix, indent));
    }
    out
}

/// Queue the children of `node` so the first one is popped first
fn push_children<'t>(
    pending: &mut Vec<(&'t ParseTree, String, bool)>,
    node: &'t ParseTree,
    prefix: &str,
) {
    let last = node.num_children().saturating_sub(1);
    for (i, child) in node.children().iter().enumerate().rev() {
        pending.push((child, prefix.to_string(), i == last));
    }
}

/// Graphviz `digraph` for one tree.
///
/// Nodes are numbered in pre-order. The terminals sit in a subgraph of their
/// own, chained by invisible edges on a single rank, so the sentence reads left
/// to right along the bottom of the picture.
pub fn to_dot(tree: &ParseTree, symbols: &SymbolTable) -> String {
    let mut leaves = Vec::new();
    let mut edges = String::new();
    let mut next_id = 0;
    dot_node(tree, symbols, &mut next_id, &mut leaves, &mut edges);

    let mut out = String::from("digraph parsetree {\n");
    out.push_str("{\nrankdir=\"LR\";\nnode [shape=\"box\"];\nedge [style=\"invis\"];\nrank=\"same\";\n");
    for (id, label) in &leaves {
        out.push_str(&format!("{} [label=\"{}\"];\n", id, label));
    }
    let chain: Vec<String> = leaves.iter().map(|(id, _)| id.to_string()).collect();
    out.push_str(&chain.join(" -> "));
    out.push_str(";\n}\n");
    out.push_str("rankdir=\"TB\";\n0;\nnode [shape=\"none\"]\nedge [style=\"solid\"];\n");
    out.push_str(&edges);
    out.push('}');
    out
}

/// Number `tree` and its subtree, collecting leaves and the labelled edges
fn dot_node(
    tree: &ParseTree,
    symbols: &SymbolTable,
    next_id: &mut usize,
    leaves: &mut Vec<(usize, String)>,
    edges: &mut String,
) -> usize {
    let id = *next_id;
    *next_id += 1;
    let label = dot_label(symbols.name(tree.symbol()));
    if tree.is_leaf() {
        leaves.push((id, label));
        return id;
    }

    edges.push_str(&format!("{} [label=\"{}\"];\n", id, label));
    for child in tree.children() {
        let child_id = dot_node(child, symbols, next_id, leaves, edges);
        edges.push_str(&format!("{} -> {};\n", id, child_id));
    }
    id
}

fn dot_label(name: &str) -> String {
    name.replace('\\', "\\\\").replace('"', "\\\"")
}

#[derive(Debug, Serialize)]
struct JsonNode {
    symbol: String,
    terminal: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<JsonNode>,
}

fn json_node(tree: &ParseTree, symbols: &SymbolTable) -> JsonNode {
    JsonNode {
        symbol: symbols.name(tree.symbol()).to_string(),
        terminal: tree.symbol().is_terminal(),
        children: tree
            .children()
            .iter()
            .map(|c| json_node(c, symbols))
            .collect(),
    }
}

/// Nested `{ "symbol", "terminal", "children" }` objects, for external renderers
pub fn to_json(tree: &ParseTree, symbols: &SymbolTable) -> serde_json::Value {
    serde_json::json!(json_node(tree, symbols))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammars::Grammar;
    use crate::parsers::cyk;

    fn sample() -> (Grammar, ParseTree) {
        let grammar = Grammar::from_rules(
            "sample",
            "$S",
            vec![("$S", vec!["$A", "b", "$A"]), ("$A", vec!["a"])],
        )
        .expect("Failed to build grammar");
        let mut trees = cyk::parse(&grammar, &["a", "b", "a"]).expect("grammar is valid");
        assert_eq!(trees.len(), 1);
        let tree = trees.remove(0);
        (grammar, tree)
    }

    #[test]
    fn test_bracketed() {
        let (grammar, tree) = sample();
        assert_eq!(
            bracketed(&tree, grammar.symbols()),
            "$S[$A[a], b, $A[a]]"
        );
    }

    #[test]
    fn test_display() {
        let (grammar, tree) = sample();
        let expected = ["$S", "├─ $A", "│   └─ a", "├─ b", "└─ $A", "    └─ a"].join("\n");
        assert_eq!(display(&tree, grammar.symbols()), expected);
    }

    #[test]
    fn test_display_deep_nesting() {
        let mut symbols = SymbolTable::new();
        let s = symbols.intern("$S");
        let x = symbols.intern("$X");
        let a = symbols.intern("a");
        let b = symbols.intern("b");
        let leaves = vec![ParseTree::leaf(a).unwrap(), ParseTree::leaf(b).unwrap()];
        let inner = ParseTree::new(x, leaves).unwrap();
        let tree = ParseTree::new(s, vec![inner, ParseTree::leaf(b).unwrap()]).unwrap();
        let expected = [
            "$S",
            "├─ $X",
            "│   ├─ a",
            "│   └─ b",
            "└─ b",
        ]
        .join("\n");
        assert_eq!(display(&tree, &symbols), expected);
    }

    #[test]
    fn test_to_dot() {
        let mut symbols = SymbolTable::new();
        let s = symbols.intern("$S");
        let na = symbols.intern("$A");
        let a = symbols.intern("a");
        let b = symbols.intern("b");
        let tree = ParseTree::new(
            s,
            vec![
                ParseTree::new(na, vec![ParseTree::leaf(a).unwrap()]).unwrap(),
                ParseTree::leaf(b).unwrap(),
            ],
        )
        .unwrap();

        let expected = [
            "digraph parsetree {",
            "{",
            "rankdir=\"LR\";",
            "node [shape=\"box\"];",
            "edge [style=\"invis\"];",
            "rank=\"same\";",
            "2 [label=\"a\"];",
            "3 [label=\"b\"];",
            "2 -> 3;",
            "}",
            "rankdir=\"TB\";",
            "0;",
            "node [shape=\"none\"]",
            "edge [style=\"solid\"];",
            "0 [label=\"S\"];",
            "1 [label=\"A\"];",
            "1 -> 2;",
            "0 -> 1;",
            "0 -> 3;",
            "}",
        ]
        .join("\n");
        assert_eq!(to_dot(&tree, &symbols), expected);
    }

    #[test]
    fn test_to_dot_escapes_quotes() {
        let (grammar, tree) = sample();
        let dot = to_dot(&tree, grammar.symbols());
        assert!(dot.starts_with("digraph parsetree {\n"));
        assert!(dot.contains("1 [label=\"A\"];\n1 -> 2;\n0 -> 1;\n"));
        assert!(dot.contains("2 -> 3 -> 5;\n"));

        let mut symbols = SymbolTable::new();
        let quote = symbols.intern("\"");
        let leaf = ParseTree::leaf(quote).unwrap();
        assert!(to_dot(&leaf, &symbols).contains("0 [label=\"\\\"\"];"));
    }

    #[test]
    fn test_to_json() {
        let (grammar, tree) = sample();
        let value = to_json(&tree, grammar.symbols());
        assert_eq!(value["symbol"], "S");
        assert_eq!(value["terminal"], false);
        assert_eq!(value["children"][1]["symbol"], "b");
        assert_eq!(value["children"][1]["terminal"], true);
        assert!(value["children"][1].get("children").is_none());
        assert_eq!(value["children"][2]["children"][0]["symbol"], "a");
    }
}
