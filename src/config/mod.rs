//! `.stowconfig` parsing and the rule data model.
//!
//! A config file is an ordered rule program: an implicit leading ignore
//! section, an optional `[redirect]` section, and conditional blocks guarded
//! by package/profile predicates. Order is semantically significant and is
//! preserved verbatim by the parser; nothing here evaluates predicates or
//! touches the filesystem beyond reading the file.

pub mod parser;
pub mod rules;

pub use parser::{CONFIG_FILE_NAME, Parsed, parse_file, parse_str};
pub use rules::{
    BlockKind, BodyEntry, ConditionalBlock, IgnoreEntry, RedirectEntry, RuleEntry, RuleSet, Section,
};
