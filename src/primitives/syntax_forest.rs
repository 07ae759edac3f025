//! Parsed syntax trees for a buffer
//!
//! A buffer is covered by one host tree plus any number of injected trees
//! (a sublanguage parsed over byte ranges of the host text). Each tree keeps
//! the name of the grammar it was parsed with.
//!
//! Every (re)parse takes a fresh generation from a process-wide counter. The
//! capture cache is keyed by generation, so a new parse is always a new cache
//! key, even for a forest rebuilt from scratch for the same buffer.

use crate::error::{IndentError, Result};
use crate::primitives::grammar_registry::GrammarRegistry;
use std::sync::atomic::{AtomicU64, Ordering};
use tree_sitter::{Node, Parser, Point, Range, Tree};

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

fn next_generation() -> u64 {
    NEXT_GENERATION.fetch_add(1, Ordering::Relaxed)
}

/// A syntax tree plus the grammar it was parsed with
pub struct LanguageTree {
    language: String,
    tree: Tree,
    comment_only: bool,
    /// Parsed over included ranges of a host tree
    injected: bool,
}

impl LanguageTree {
    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    pub fn is_comment_only(&self) -> bool {
        self.comment_only
    }

    pub fn is_injected(&self) -> bool {
        self.injected
    }

    /// Byte span of the root node
    pub fn byte_span(&self) -> usize {
        let root = self.root();
        root.end_byte() - root.start_byte()
    }
}

/// All trees covering one buffer, host first
pub struct SyntaxForest {
    trees: Vec<LanguageTree>,
    generation: u64,
}

impl SyntaxForest {
    /// Parse `source` as the host language
    pub fn parse(registry: &GrammarRegistry, language: &str, source: &str) -> Result<Self> {
        let host = Self::parse_tree(registry, language, source, None)?;
        Ok(Self {
            trees: vec![host],
            generation: next_generation(),
        })
    }

    /// Parse an injected layer restricted to byte ranges of `source`
    pub fn inject(
        &mut self,
        registry: &GrammarRegistry,
        language: &str,
        source: &str,
        byte_ranges: &[std::ops::Range<usize>],
    ) -> Result<()> {
        let ranges: Vec<Range> = byte_ranges
            .iter()
            .map(|range| Range {
                start_byte: range.start,
                end_byte: range.end,
                start_point: point_at(source, range.start),
                end_point: point_at(source, range.end),
            })
            .collect();

        let tree = Self::parse_tree(registry, language, source, Some(&ranges))?;
        self.trees.push(tree);
        self.generation = next_generation();
        Ok(())
    }

    /// Re-parse the host layer after an edit, dropping injected layers
    pub fn reparse(&mut self, registry: &GrammarRegistry, source: &str) -> Result<()> {
        let language = self
            .trees
            .first()
            .map(|tree| tree.language.clone())
            .ok_or_else(|| IndentError::UnknownLanguage(String::new()))?;
        let host = Self::parse_tree(registry, &language, source, None)?;
        self.trees = vec![host];
        self.generation = next_generation();
        Ok(())
    }

    fn parse_tree(
        registry: &GrammarRegistry,
        language: &str,
        source: &str,
        ranges: Option<&[Range]>,
    ) -> Result<LanguageTree> {
        let entry = registry
            .get(language)
            .ok_or_else(|| IndentError::UnknownLanguage(language.to_string()))?;

        let mut parser = Parser::new();
        parser
            .set_language(entry.language())
            .map_err(|e| IndentError::Language {
                language: language.to_string(),
                message: format!("{e:?}"),
            })?;

        if let Some(ranges) = ranges {
            parser
                .set_included_ranges(ranges)
                .map_err(|e| IndentError::Language {
                    language: language.to_string(),
                    message: format!("invalid included ranges: {e:?}"),
                })?;
        }

        let tree = parser
            .parse(source, None)
            .ok_or_else(|| IndentError::Parse {
                language: language.to_string(),
            })?;

        tracing::debug!(
            "Parsed {} tree ({} bytes, has_error={})",
            language,
            source.len(),
            tree.root_node().has_error()
        );

        Ok(LanguageTree {
            language: language.to_string(),
            tree,
            comment_only: entry.is_comment_only(),
            injected: ranges.is_some(),
        })
    }

    pub fn trees(&self) -> &[LanguageTree] {
        &self.trees
    }

    /// Process-unique generation of the current parse
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Grammar of the host layer
    pub fn host_language(&self) -> Option<&str> {
        self.trees.first().map(LanguageTree::language)
    }
}

/// Row/column (byte) point of a byte offset
pub fn point_at(source: &str, byte: usize) -> Point {
    let byte = byte.min(source.len());
    let before = &source.as_bytes()[..byte];
    let row = before.iter().filter(|&&b| b == b'\n').count();
    let column = before
        .iter()
        .rposition(|&b| b == b'\n')
        .map(|nl| byte - nl - 1)
        .unwrap_or(byte);
    Point { row, column }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_at() {
        let source = "ab\ncd\n";
        assert_eq!(point_at(source, 0), Point { row: 0, column: 0 });
        assert_eq!(point_at(source, 4), Point { row: 1, column: 1 });
        assert_eq!(point_at(source, 6), Point { row: 2, column: 0 });
        assert_eq!(point_at(source, 99), Point { row: 2, column: 0 });
    }

    #[test]
    fn test_parse_and_generation() {
        let registry = GrammarRegistry::builtin();
        let mut forest = SyntaxForest::parse(&registry, "c", "int x;\n").unwrap();
        let first = forest.generation();
        assert_eq!(forest.host_language(), Some("c"));
        assert_eq!(forest.trees()[0].root().kind(), "translation_unit");

        forest.reparse(&registry, "int y;\n").unwrap();
        assert!(forest.generation() > first);
        assert_eq!(forest.trees().len(), 1);
    }

    #[test]
    fn test_rebuilt_forest_gets_new_generation() {
        let registry = GrammarRegistry::builtin();
        let first = SyntaxForest::parse(&registry, "c", "int x;\n").unwrap();
        let second = SyntaxForest::parse(&registry, "c", "int x;\n").unwrap();
        assert_ne!(first.generation(), second.generation());
    }

    #[test]
    fn test_unknown_language() {
        let registry = GrammarRegistry::builtin();
        assert!(matches!(
            SyntaxForest::parse(&registry, "cobol", ""),
            Err(IndentError::UnknownLanguage(_))
        ));
    }

    #[test]
    fn test_injected_layer() {
        let registry = GrammarRegistry::builtin();
        let source = "x = \"\"\"\n[1, 2]\n\"\"\"\n";
        let mut forest = SyntaxForest::parse(&registry, "python", source).unwrap();
        let host_generation = forest.generation();
        let start = source.find('[').unwrap();
        let end = source.find(']').unwrap() + 1;
        forest.inject(&registry, "json", source, &[start..end]).unwrap();

        assert_eq!(forest.trees().len(), 2);
        assert_ne!(forest.generation(), host_generation);
        let json = &forest.trees()[1];
        assert_eq!(json.language(), "json");
        assert!(json.is_injected());
        assert!(!forest.trees()[0].is_injected());
        assert!(json.byte_span() < forest.trees()[0].byte_span());
    }
}
