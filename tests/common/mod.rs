// Shared helpers for indentation tests

use fresh_indent::config::IndentConfig;
use fresh_indent::indent::{IndentCalculator, IndentResult};
use fresh_indent::model::document::{Document, LineSource};
use fresh_indent::primitives::grammar_registry::GrammarRegistry;
use fresh_indent::primitives::syntax_forest::SyntaxForest;

/// Indent of every line of `source` using the built-in grammars and default config
pub fn indents(language: &str, source: &str) -> Vec<IndentResult> {
    let registry = GrammarRegistry::builtin();
    let doc = Document::new(source);
    let forest = SyntaxForest::parse(&registry, language, source).unwrap();
    let mut calc = IndentCalculator::new(registry, IndentConfig::default());
    calc.reindent_lines(&doc, &forest, 1..=doc.line_count())
        .into_iter()
        .map(|(_, result)| result)
        .collect()
}

/// `line: indent |text` listing, one row per line, for snapshots
pub fn indent_listing(language: &str, source: &str) -> String {
    let doc = Document::new(source);
    indents(language, source)
        .into_iter()
        .enumerate()
        .map(|(idx, result)| {
            let line = idx + 1;
            format!("{}: {} |{}", line, result, doc.line(line).unwrap_or_default())
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Reindent `doc` top to bottom, reparsing after every changed line
pub fn reindent_in_place(
    calc: &mut IndentCalculator,
    doc: &mut Document,
    forest: &mut SyntaxForest,
) {
    for line in 1..=doc.line_count() {
        if let IndentResult::Column(col) = calc.compute_indent(&*doc, &*forest, line) {
            if doc.line_indent(line, calc.config().tab_size) != col {
                doc.set_line_indent(line, col);
                forest.reparse(calc.registry(), doc.text()).unwrap();
            }
        }
    }
}
