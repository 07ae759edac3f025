pub mod grammar_registry;
pub mod line_text;
pub mod syntax_forest;
