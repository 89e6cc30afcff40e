//! Towers of Hanoi, solved by a rule whose clauses call back into the
//! engine and emit each move.
//!
//! Usage: `cargo run --example hanoi -- [disks] [--memo]`. With `--memo` the
//! memo answers repeated single-disk moves, so they are printed once.

use anyhow::{bail, Context, Result};
use env_logger::Env;
use rulog::{arguments, EngineConfig, Error, KnowledgeBase, Term};

fn towers(config: EngineConfig) -> KnowledgeBase {
    let mut kb = KnowledgeBase::with_config(config);
    kb.learn("move_one", |kb, args| {
        let [from, to] = arguments::<2>("move_one", args)?;
        Ok(vec![kb.emit(format!("Move top disk from {from} to {to}."))])
    });
    kb.learn("move", |kb, args| {
        let [n, from, to, via] = arguments::<4>("move", args)?;
        let n = n
            .as_integer()
            .ok_or_else(|| Error::Clause(format!("move expects a disk count, got {n}")))?;
        if n <= 1 {
            return Ok(vec![kb.match_rule("move_one", &[from.clone(), to.clone()])?.into()]);
        }
        let rest = Term::Integer(n - 1);
        Ok(vec![
            kb.match_rule("move", &[rest.clone(), from.clone(), via.clone(), to.clone()])?.into(),
            kb.match_rule("move_one", &[from.clone(), to.clone()])?.into(),
            kb.match_rule("move", &[rest, via.clone(), to.clone(), from.clone()])?.into(),
        ])
    });
    for peg in ["left", "center", "right"] {
        kb.insert(kb.atom("peg", [peg]));
    }
    kb
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let mut disks = 3;
    let mut memoize = false;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--memo" => memoize = true,
            count => disks = count.parse().with_context(|| format!("invalid disk count `{count}`"))?,
        }
    }
    if disks < 1 {
        bail!("need at least one disk");
    }

    let mut kb = towers(EngineConfig::default().with_memoize(memoize));
    kb.set_emitter(|message| println!("{message}"));
    let args = [Term::Integer(disks), kb.term("left"), kb.term("center"), kb.term("right")];
    let solved = kb.rule_applies("move", &args)?;
    println!("move({disks}, left, center, right) = {solved} in {} moves", kb.messages().len());
    Ok(())
}
