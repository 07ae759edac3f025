//! Tree-sitter driven indentation
//!
//! # Architecture Overview
//!
//! Indentation is computed for one line at a time from the syntax trees the
//! host already keeps for the buffer:
//!
//! 1. [`selector`] picks the most specific language tree covering the line
//!    (injected languages win over their host).
//! 2. [`captures`] runs that language's `indents.scm` query over the tree and
//!    buckets the captured nodes by role. Results are kept in [`cache`], keyed
//!    by buffer, tree generation, root and language.
//! 3. [`locator`] finds the anchor node for the line.
//! 4. [`engine`] walks from the anchor up to the root, applying the capture
//!    rules, with [`delimiter`] resolving the delimiters of aligned nodes.
//!
//! The result is a column, or [`IndentResult::Auto`] when the line should be
//! left to the editor's generic, language-unaware indentation.
//!
//! # Query Captures
//! - `@indent.begin`: lines inside the node are indented one level
//! - `@indent.end`: a blank line after the node is not indented by it
//! - `@indent.branch`: a line starting with the node is dedented (`}`, `else`)
//! - `@indent.dedent`: lines inside the node after its first are dedented
//! - `@indent.align`: lines inside the node align to its open delimiter
//! - `@indent.zero`, `@indent.ignore`, `@indent.auto`: column 0, untouched
//!   region, defer to generic indent

pub mod cache;
pub mod captures;
pub mod delimiter;
pub mod engine;
pub mod hook;
pub mod locator;
pub mod selector;

use crate::config::IndentConfig;
use crate::indent::cache::{CacheKey, CacheStats, CaptureCache};
use crate::indent::captures::CaptureMap;
use crate::indent::engine::WalkContext;
use crate::model::document::{BufferId, LineSource};
use crate::primitives::grammar_registry::GrammarRegistry;
use crate::primitives::syntax_forest::SyntaxForest;
use std::fmt;
use std::ops::RangeInclusive;

/// Indent computed for a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndentResult {
    /// Indent the line to this column
    Column(usize),
    /// Defer to the editor's generic auto-indent
    Auto,
}

impl IndentResult {
    /// Integer form used by editor hooks: the column, or -1 for [`IndentResult::Auto`]
    pub fn to_raw(self) -> i32 {
        match self {
            IndentResult::Column(col) => i32::try_from(col).unwrap_or(i32::MAX),
            IndentResult::Auto => -1,
        }
    }

    pub fn column(self) -> Option<usize> {
        match self {
            IndentResult::Column(col) => Some(col),
            IndentResult::Auto => None,
        }
    }
}

impl fmt::Display for IndentResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndentResult::Column(col) => write!(f, "{}", col),
            IndentResult::Auto => write!(f, "auto"),
        }
    }
}

/// Computes indentation from `indents.scm` captures
pub struct IndentCalculator {
    registry: GrammarRegistry,
    config: IndentConfig,
    cache: CaptureCache,
}

impl IndentCalculator {
    pub fn new(registry: GrammarRegistry, config: IndentConfig) -> Self {
        let cache = CaptureCache::new(config.capture_cache_size);
        Self {
            registry,
            config,
            cache,
        }
    }

    pub fn registry(&self) -> &GrammarRegistry {
        &self.registry
    }

    pub fn config(&self) -> &IndentConfig {
        &self.config
    }

    /// Compute the indent of a 1-indexed line.
    ///
    /// `forest` must have been parsed from `buffer`'s current text. Lines no
    /// tree covers get column 0; languages disabled in the config get
    /// [`IndentResult::Auto`].
    pub fn compute_indent(
        &mut self,
        buffer: &dyn LineSource,
        forest: &SyntaxForest,
        line: usize,
    ) -> IndentResult {
        let Some(tree) = selector::select_tree(forest, line) else {
            tracing::debug!("No syntax tree covers line {}", line);
            return IndentResult::Column(0);
        };
        let language = tree.language();

        if !self.config.is_enabled(language) {
            tracing::debug!("Tree-sitter indent disabled for {}", language);
            return IndentResult::Auto;
        }

        let root = tree.root();
        let key = CacheKey {
            buffer: buffer.buffer_id(),
            generation: forest.generation(),
            root: root.id(),
            language: language.to_string(),
        };
        let registry = &self.registry;
        let captures = self.cache.get_or_build(key, || {
            match registry.get(language).and_then(|entry| entry.indents()) {
                Some(query) => CaptureMap::build(query, root, buffer.text().as_bytes()),
                None => {
                    tracing::debug!("No indents query for {}", language);
                    CaptureMap::empty()
                }
            }
        });

        let ctx = WalkContext {
            root,
            injected: tree.is_injected(),
            captures: &captures,
            buffer,
            shift_width: self.config.effective_shift_width(language),
            tab_size: self.config.tab_size,
        };
        let result = ctx.compute(line);
        tracing::debug!("Indent for line {} ({}): {}", line, language, result);
        result
    }

    /// Compute the indent of every line in `lines`, skipping lines past the end
    pub fn reindent_lines(
        &mut self,
        buffer: &dyn LineSource,
        forest: &SyntaxForest,
        lines: RangeInclusive<usize>,
    ) -> Vec<(usize, IndentResult)> {
        let last = buffer.line_count();
        lines
            .filter(|&line| line >= 1 && line <= last)
            .map(|line| (line, self.compute_indent(buffer, forest, line)))
            .collect()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Drop cached capture maps of a closed buffer
    pub fn forget_buffer(&mut self, buffer: BufferId) {
        self.cache.invalidate_buffer(buffer);
    }
}

impl Default for IndentCalculator {
    fn default() -> Self {
        Self::new(GrammarRegistry::builtin(), IndentConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::document::Document;

    #[test]
    fn test_indent_result_raw() {
        assert_eq!(IndentResult::Column(8).to_raw(), 8);
        assert_eq!(IndentResult::Auto.to_raw(), -1);
        assert_eq!(IndentResult::Auto.to_string(), "auto");
        assert_eq!(IndentResult::Column(3).to_string(), "3");
        assert_eq!(IndentResult::Auto.column(), None);
    }

    #[test]
    fn test_compute_uses_cache() {
        let registry = GrammarRegistry::builtin();
        let source = "int main() {\n    return 0;\n}\n";
        let doc = Document::new(source);
        let forest = SyntaxForest::parse(&registry, "c", source).unwrap();
        let mut calc = IndentCalculator::new(registry, IndentConfig::default());

        assert_eq!(calc.compute_indent(&doc, &forest, 2), IndentResult::Column(4));
        assert_eq!(calc.compute_indent(&doc, &forest, 3), IndentResult::Column(0));
        assert_eq!(calc.cache_stats(), CacheStats { hits: 1, misses: 1 });

        calc.forget_buffer(doc.buffer_id());
        calc.compute_indent(&doc, &forest, 2);
        assert_eq!(calc.cache_stats().misses, 2);
    }

    #[test]
    fn test_disabled_language_defers() {
        let registry = GrammarRegistry::builtin();
        let source = "int main() {\n    return 0;\n}\n";
        let doc = Document::new(source);
        let forest = SyntaxForest::parse(&registry, "c", source).unwrap();
        let mut config = IndentConfig::default();
        config.languages.insert(
            "c".to_string(),
            crate::config::LanguageIndentConfig {
                shift_width: None,
                enabled: false,
            },
        );
        let mut calc = IndentCalculator::new(registry, config);

        assert_eq!(calc.compute_indent(&doc, &forest, 2), IndentResult::Auto);
    }

    #[test]
    fn test_language_shift_width_override() {
        let registry = GrammarRegistry::builtin();
        let source = "int main() {\nreturn 0;\n}\n";
        let doc = Document::new(source);
        let forest = SyntaxForest::parse(&registry, "c", source).unwrap();
        let mut config = IndentConfig::default();
        config.languages.insert(
            "c".to_string(),
            crate::config::LanguageIndentConfig {
                shift_width: Some(2),
                enabled: true,
            },
        );
        let mut calc = IndentCalculator::new(registry, config);

        assert_eq!(calc.compute_indent(&doc, &forest, 2), IndentResult::Column(2));
    }

    #[test]
    fn test_missing_query_contributes_nothing() {
        let mut registry = GrammarRegistry::empty();
        registry
            .register("c", tree_sitter_c::LANGUAGE.into(), None, false)
            .unwrap();
        let source = "int main() {\n    return 0;\n}\n";
        let doc = Document::new(source);
        let forest = SyntaxForest::parse(&registry, "c", source).unwrap();
        let mut calc = IndentCalculator::new(registry, IndentConfig::default());

        assert_eq!(calc.compute_indent(&doc, &forest, 2), IndentResult::Column(0));
    }

    #[test]
    fn test_reindent_lines_clamps_range() {
        let registry = GrammarRegistry::builtin();
        let source = "[\n1\n]";
        let doc = Document::new(source);
        let forest = SyntaxForest::parse(&registry, "json", source).unwrap();
        let mut calc = IndentCalculator::new(registry, IndentConfig::default());

        let result = calc.reindent_lines(&doc, &forest, 0..=10);
        assert_eq!(
            result,
            vec![
                (1, IndentResult::Column(0)),
                (2, IndentResult::Column(4)),
                (3, IndentResult::Column(0)),
            ]
        );
    }
}
