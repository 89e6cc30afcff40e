//! Load a program written in the text syntax and print its answers.
//!
//! Usage: `cargo run --example consult --features parsing -- [file]`.
//! Without a file, a built-in program about philosophers is used.

use anyhow::{Context, Result};
use env_logger::Env;
use rulog::KnowledgeBase;

const PHILOSOPHERS: &str = "
% who taught whom
teacher(socrates, plato).
teacher(cratylus, plato).
teacher(plato, aristotle).
teacher(aristotle, alexander).

disciple(x, y) :- teacher(y, x).
follower(x, y) :- disciple(x, y).
follower(x, y) :- disciple(x, _z), follower(_z, y).

follower(_who, socrates)?
follower(aristotle, _who)?
follower(aristotle, socrates)?
follower(cratylus, aristotle)?
";

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let source = match std::env::args().nth(1) {
        Some(path) => std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?,
        None => PHILOSOPHERS.to_string(),
    };

    let mut kb = KnowledgeBase::new();
    for answer in kb.consult(&source)? {
        println!("{answer}");
        #[cfg(feature = "serde")]
        println!("  json: {}", answer.solutions.to_json());
    }
    Ok(())
}
