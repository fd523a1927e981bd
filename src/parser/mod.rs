//! Parser for fact and formula files.

mod ast;
mod lexer;
mod parser;

pub use ast::Fact;
pub use parser::{load_domain, parse_facts, parse_formulas, parse_region, parse_sentence, ParseError};
