use chart_parser::grammars::{self, Grammar};
use chart_parser::parsers::cyk::CykParser;
use chart_parser::render;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    /// Box-drawing tree
    Tree,
    /// One line per tree: $S[$NP[I], ...]
    Bracket,
    /// Nested JSON objects
    Json,
    /// Graphviz digraph, terminals kept on one rank
    Dot,
}

/// Parse sentences with a context-free grammar and print every parse tree
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Grammar file in JSON format
    #[arg(short, long)]
    grammar: PathBuf,

    /// How to print the trees
    #[arg(short, long, value_enum, default_value_t = Format::Tree)]
    format: Format,

    /// Only report whether each sentence is in the language
    #[arg(short, long)]
    recognize_only: bool,

    /// Print the grammar after normalization
    #[arg(long)]
    show_grammar: bool,

    /// Sentence to parse, split on whitespace. Defaults to the grammar's own tests.
    sentence: Vec<String>,
}

/// Parse one sentence and print the results
fn run_sentence(parser: &CykParser<'_>, cli: &Cli, sentence: &str) {
    let tokens: Vec<&str> = sentence.split_whitespace().collect();
    let symbols = parser.grammar().symbols();

    let start = Instant::now();
    if cli.recognize_only {
        let accepted = parser.recognize(&tokens);
        println!(
            "[{}] {} ({}us)",
            if accepted { "✓" } else { "✗" },
            sentence,
            start.elapsed().as_micros()
        );
        return;
    }

    let trees = parser.parse(&tokens);
    println!(
        "[{}] {} - {} parse(s) in {}us",
        if trees.is_empty() { "✗" } else { "✓" },
        sentence,
        trees.len(),
        start.elapsed().as_micros()
    );

    for (i, tree) in trees.iter().enumerate() {
        match cli.format {
            Format::Tree => println!(
                "\nParse #{} ({} nodes, depth {}):\n{}",
                i + 1,
                tree.node_count(),
                tree.depth(),
                render::display(tree, symbols)
            ),
            Format::Bracket => println!("{}", render::bracketed(tree, symbols)),
            Format::Json => println!("{}", render::to_json(tree, symbols)),
            Format::Dot => println!("{}", render::to_dot(tree, symbols)),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut grammar: Grammar = match grammars::load_grammar_from_file(&cli.grammar) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("Error loading grammar {}: {}", cli.grammar.display(), e);
            return ExitCode::FAILURE;
        }
    };

    println!("Loaded grammar: {}", grammar.name);
    println!("  Start symbol: {}", grammar.start_str());
    println!("  Non-terminals: {}", grammar.num_non_terminals());
    println!("  Terminals: {}", grammar.num_terminals());
    println!("  Productions: {}", grammar.production_count());

    let split = grammar.to_relaxed_cnf();
    println!("  Rules split for CNF: {}", split);
    if cli.show_grammar {
        println!("\n{}", grammar);
    }

    let parser = match CykParser::new(&grammar) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let sentences = if cli.sentence.is_empty() {
        grammar.tests.clone()
    } else {
        vec![cli.sentence.join(" ")]
    };
    if sentences.is_empty() {
        eprintln!("Nothing to parse: give a sentence or add \"tests\" to the grammar file");
        return ExitCode::FAILURE;
    }

    println!();
    for sentence in &sentences {
        run_sentence(&parser, &cli, sentence);
    }

    ExitCode::SUCCESS
}
