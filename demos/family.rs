//! Family relations: facts, two-clause rules and a join through a shared
//! variable.
//!
//! Run with `cargo run --example family`; set `RUST_LOG=debug` to watch the
//! resolver.

use anyhow::Result;
use env_logger::Env;
use rulog::{arguments, KnowledgeBase};

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let mut kb = KnowledgeBase::new();
    for (mother, child) in [("alice", "lea"), ("john", "julia"), ("lea", "alberta")] {
        kb.insert(kb.atom("mother", [mother, child]));
    }
    for (father, child) in [("james", "alfred"), ("lea", "john")] {
        kb.insert(kb.atom("father", [father, child]));
    }

    kb.clause("parent", ["x", "y"]).when("mother", ["x", "y"]).learn();
    kb.clause("parent", ["x", "y"]).when("father", ["x", "y"]).learn();
    kb.learn("grandparent", |kb, args| {
        let [x, y] = arguments::<2>("grandparent", args)?;
        let z = kb.term("_z");
        Ok(vec![kb.check("parent", [x, &z])?, kb.check("parent", [&z, y])?])
    });

    let grandchildren = kb.ask("grandparent", ["alice", "_who"])?;
    println!("grandparent(alice, _who) = {grandchildren}");

    let direct = kb.ask("grandparent", ["alice", "john"])?;
    println!("grandparent(alice, john) = {direct}");

    for binding in grandchildren.bindings() {
        if let Some(who) = binding.value("who") {
            println!("alice is a grandparent of {who}");
        }
    }
    Ok(())
}
