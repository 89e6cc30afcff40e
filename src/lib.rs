//! # Rulog
//!
//! A miniature logic-programming engine in Rust.
//!
//! ## Features
//!
//! - Ground facts and nullary facts, with nested compound arguments
//! - Rules made of clauses, written as closures or as declarative templates
//! - Brute-force matching over the domain of known constants (and facts)
//! - Depth-bounded resolution with an optional memo of rule matches
//! - A small text syntax for programs (`parsing` feature)
//!
//! ## Example
//!
//! ```rust
//! use rulog::{arguments, KnowledgeBase};
//!
//! let mut kb = KnowledgeBase::new();
//! kb.insert(kb.atom("mother", ["alice", "lea"]));
//! kb.insert(kb.atom("mother", ["lea", "alberta"]));
//!
//! kb.learn("grandmother", |kb, args| {
//!     let [x, y] = arguments::<2>("grandmother", args)?;
//!     let z = kb.term("_z");
//!     Ok(vec![kb.check("mother", [x, &z])?, kb.check("mother", [&z, y])?])
//! });
//!
//! let found = kb.match_rule("grandmother", &[kb.term("alice"), kb.term("_who")]).unwrap();
//! assert_eq!(found.to_string(), "[{who: alberta}]");
//! ```

pub mod clause;
pub mod config;
/// Rule resolution.
pub mod engine;
pub mod error;
pub mod knowledge;
pub mod matcher;
#[cfg(feature = "parsing")]
pub mod parser;
pub mod resolve;
pub mod solutions;
/// Name interning.
pub mod symbol;
pub mod term;

pub use clause::{ClauseBuilder, ClauseTemplate, Literal, Pattern};
pub use config::EngineConfig;
pub use engine::{arguments, Clause, OpenQuery, Rule, Subgoal};
pub use error::{Error, Result};
pub use knowledge::KnowledgeBase;
pub use matcher::Odometer;
#[cfg(feature = "parsing")]
pub use parser::{parse_program, QueryAnswer, Statement};
pub use resolve::{IntoTerm, Resolved};
pub use solutions::{Binding, Solutions};
pub use symbol::{Symbol, SymbolTable};
pub use term::{Atom, Constant, Fact, Relation, Term, Variable};
