//! Grammar registry for tree-sitter indentation
//!
//! This module maps grammar names to their tree-sitter language and compiled
//! `indents` query. Queries come from:
//! 1. Built-in grammars with bundled `queries/<lang>/indents.scm`
//! 2. User overrides in `~/.config/fresh/queries/<lang>/indents.scm`
//!
//! A grammar without an `indents` query is still registered: every capture
//! bucket is then empty and indentation degrades gracefully.

use crate::config_io::DirectoryContext;
use crate::error::{IndentError, Result};
use std::collections::HashMap;
use std::path::Path;
use tree_sitter::{Language, Query};

/// One registered grammar
pub struct GrammarEntry {
    name: String,
    language: Language,
    indents: Option<Query>,
    /// Documentation/comment sublanguages never drive code indentation
    comment_only: bool,
}

impl GrammarEntry {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn language(&self) -> &Language {
        &self.language
    }

    /// The compiled `indents` query, if the grammar has one
    pub fn indents(&self) -> Option<&Query> {
        self.indents.as_ref()
    }

    pub fn is_comment_only(&self) -> bool {
        self.comment_only
    }
}

/// Registry of all grammars known to the indent calculator
pub struct GrammarRegistry {
    grammars: HashMap<String, GrammarEntry>,
    /// File extension -> grammar name
    extensions: HashMap<String, String>,
}

struct BuiltinGrammar {
    name: &'static str,
    language: Language,
    indents: &'static str,
    extensions: &'static [&'static str],
}

fn builtin_grammars() -> Vec<BuiltinGrammar> {
    vec![
        BuiltinGrammar {
            name: "c",
            language: tree_sitter_c::LANGUAGE.into(),
            indents: include_str!("../../queries/c/indents.scm"),
            extensions: &["c", "h"],
        },
        BuiltinGrammar {
            name: "rust",
            language: tree_sitter_rust::LANGUAGE.into(),
            indents: include_str!("../../queries/rust/indents.scm"),
            extensions: &["rs"],
        },
        BuiltinGrammar {
            name: "python",
            language: tree_sitter_python::LANGUAGE.into(),
            indents: include_str!("../../queries/python/indents.scm"),
            extensions: &["py", "pyi"],
        },
        BuiltinGrammar {
            name: "javascript",
            language: tree_sitter_javascript::LANGUAGE.into(),
            indents: include_str!("../../queries/javascript/indents.scm"),
            extensions: &["js", "mjs", "cjs", "jsx"],
        },
        BuiltinGrammar {
            name: "json",
            language: tree_sitter_json::LANGUAGE.into(),
            indents: include_str!("../../queries/json/indents.scm"),
            extensions: &["json"],
        },
    ]
}

impl GrammarRegistry {
    /// Registry with no grammars (hosts and tests register their own)
    pub fn empty() -> Self {
        Self {
            grammars: HashMap::new(),
            extensions: HashMap::new(),
        }
    }

    /// Registry with the built-in grammars and their bundled queries
    pub fn builtin() -> Self {
        Self::load(None)
    }

    /// Load built-in grammars, applying user query overrides when a directory context is given
    pub fn load(dirs: Option<&DirectoryContext>) -> Self {
        let mut registry = Self::empty();

        for grammar in builtin_grammars() {
            let user_query = dirs.and_then(|dirs| {
                Self::load_user_query(&dirs.queries_dir(), grammar.name, &grammar.language)
            });

            let indents = match user_query {
                Some(query) => Some(query),
                None => match Query::new(&grammar.language, grammar.indents) {
                    Ok(query) => Some(query),
                    Err(e) => {
                        tracing::error!(
                            "Failed to create bundled indents query for {}: {:?}",
                            grammar.name,
                            e
                        );
                        None
                    }
                },
            };

            for ext in grammar.extensions {
                registry
                    .extensions
                    .insert((*ext).to_string(), grammar.name.to_string());
            }

            registry.grammars.insert(
                grammar.name.to_string(),
                GrammarEntry {
                    name: grammar.name.to_string(),
                    language: grammar.language,
                    indents,
                    comment_only: false,
                },
            );
        }

        tracing::info!("Loaded {} indent grammars", registry.grammars.len());
        registry
    }

    /// Load `<queries_dir>/<name>/indents.scm` if present and valid
    fn load_user_query(queries_dir: &Path, name: &str, language: &Language) -> Option<Query> {
        let path = queries_dir.join(name).join("indents.scm");
        if !path.exists() {
            return None;
        }

        let source = match std::fs::read_to_string(&path) {
            Ok(source) => source,
            Err(e) => {
                tracing::warn!("Failed to read {:?}: {}", path, e);
                return None;
            }
        };

        match Query::new(language, &source) {
            Ok(query) => {
                tracing::info!("Loaded user indents query for {} from {:?}", name, path);
                Some(query)
            }
            Err(e) => {
                tracing::warn!(
                    "Invalid user indents query {:?}: {:?}, keeping bundled query",
                    path,
                    e
                );
                None
            }
        }
    }

    /// Register (or replace) a grammar.
    ///
    /// `indents` is the source of the grammar's `indents` query; `None` registers
    /// the grammar without one.
    pub fn register(
        &mut self,
        name: &str,
        language: Language,
        indents: Option<&str>,
        comment_only: bool,
    ) -> Result<()> {
        let indents = indents
            .map(|source| {
                Query::new(&language, source).map_err(|e| IndentError::Query {
                    language: name.to_string(),
                    message: e.to_string(),
                })
            })
            .transpose()?;

        self.grammars.insert(
            name.to_string(),
            GrammarEntry {
                name: name.to_string(),
                language,
                indents,
                comment_only,
            },
        );
        Ok(())
    }

    /// Map a file extension to a registered grammar
    pub fn add_extension(&mut self, ext: &str, name: &str) {
        self.extensions.insert(ext.to_string(), name.to_string());
    }

    pub fn get(&self, name: &str) -> Option<&GrammarEntry> {
        self.grammars.get(name)
    }

    /// Grammar name for a file path, by extension
    pub fn detect(&self, path: &Path) -> Option<&str> {
        let ext = path.extension()?.to_str()?;
        self.extensions.get(ext).map(String::as_str)
    }

    /// Names of all registered grammars, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.grammars.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for GrammarRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_queries_compile() {
        let registry = GrammarRegistry::builtin();
        assert_eq!(
            registry.names(),
            vec!["c", "javascript", "json", "python", "rust"]
        );
        for name in registry.names() {
            let entry = registry.get(name).unwrap();
            assert!(entry.indents().is_some(), "{name} indents query should compile");
            assert!(!entry.is_comment_only());
        }
    }

    #[test]
    fn test_detect_by_extension() {
        let registry = GrammarRegistry::builtin();
        assert_eq!(registry.detect(Path::new("src/main.rs")), Some("rust"));
        assert_eq!(registry.detect(Path::new("a/b.h")), Some("c"));
        assert_eq!(registry.detect(Path::new("README")), None);
        assert_eq!(registry.detect(Path::new("notes.txt")), None);
    }

    #[test]
    fn test_register_rejects_invalid_query() {
        let mut registry = GrammarRegistry::empty();
        let result = registry.register(
            "c",
            tree_sitter_c::LANGUAGE.into(),
            Some("(no_such_node) @indent.begin"),
            false,
        );
        assert!(matches!(result, Err(IndentError::Query { .. })));
        assert!(registry.get("c").is_none());
    }

    #[test]
    fn test_register_without_query() {
        let mut registry = GrammarRegistry::empty();
        registry
            .register("doc", tree_sitter_json::LANGUAGE.into(), None, true)
            .unwrap();
        let entry = registry.get("doc").unwrap();
        assert!(entry.indents().is_none());
        assert!(entry.is_comment_only());
    }

    #[test]
    fn test_user_query_override() {
        let temp_dir = tempfile::tempdir().unwrap();
        let dirs = DirectoryContext::for_testing(temp_dir.path());
        let json_dir = dirs.queries_dir().join("json");
        std::fs::create_dir_all(&json_dir).unwrap();
        std::fs::write(json_dir.join("indents.scm"), "(array) @indent.begin").unwrap();

        let python_dir = dirs.queries_dir().join("python");
        std::fs::create_dir_all(&python_dir).unwrap();
        std::fs::write(python_dir.join("indents.scm"), "(((( broken").unwrap();

        let registry = GrammarRegistry::load(Some(&dirs));
        let json = registry.get("json").unwrap().indents().unwrap();
        assert_eq!(json.pattern_count(), 1);

        // Broken override falls back to the bundled query
        let python = registry.get("python").unwrap().indents().unwrap();
        assert!(python.pattern_count() > 1);
    }
}
