//! A small text syntax for programs.
//!
//! ```text
//! % comments run to the end of the line
//! mother(alice, lea).
//! sunny.
//! parent(x, y) :- mother(x, y).
//! grandparent(x, y) :- parent(x, _z), parent(_z, y).
//! lonely(x) :- person(x), not friend(x, _y), x != bob.
//! grandparent(alice, _who)?
//! ```
//!
//! In a rule, names listed in the head are the rule's parameters. Every
//! other name is read like [`KnowledgeBase::term`] reads it.

use log::debug;
use nom::branch::alt;
use nom::bytes::complete::{tag, take_till, take_while, take_while1};
use nom::character::complete::{char as pchar, digit1, multispace1};
use nom::combinator::{all_consuming, map, map_res, opt, recognize, value, verify};
use nom::multi::{many0, many0_count, separated_list1};
use nom::sequence::{delimited, pair, preceded, terminated, tuple};
use nom::{Finish, IResult};
use std::fmt;

use crate::clause::{ClauseTemplate, Literal, Pattern};
use crate::error::{Error, Result};
use crate::knowledge::KnowledgeBase;
use crate::solutions::Solutions;
use crate::term::{Atom, Fact, Term};

/// A term as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TermSyntax {
    /// A bare name
    Name(String),
    /// `_name`
    Variable(String),
    /// An integer literal
    Integer(i64),
    /// `name(args...)`
    Compound(AtomSyntax),
}

/// `predicate(args...)`, or a bare predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtomSyntax {
    /// The predicate name
    pub predicate: String,
    /// The arguments; empty for a bare predicate
    pub args: Vec<TermSyntax>,
}

/// A condition in a rule body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiteralSyntax {
    /// `p(...)`
    Holds(AtomSyntax),
    /// `not p(...)`
    Fails(AtomSyntax),
    /// `a != b`
    Distinct(TermSyntax, TermSyntax),
}

/// A top-level statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// `p(a, b).`
    Fact(AtomSyntax),
    /// `head :- body.`
    Rule {
        /// The rule name and parameters
        head: AtomSyntax,
        /// The conditions
        body: Vec<LiteralSyntax>,
    },
    /// `p(a, _x)?`
    Query(AtomSyntax),
}

impl fmt::Display for TermSyntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TermSyntax::Name(name) => f.write_str(name),
            TermSyntax::Variable(name) => write!(f, "_{name}"),
            TermSyntax::Integer(value) => write!(f, "{value}"),
            TermSyntax::Compound(atom) => write!(f, "{atom}"),
        }
    }
}

impl fmt::Display for AtomSyntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.predicate)?;
        if self.args.is_empty() {
            return Ok(());
        }
        f.write_str("(")?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{arg}")?;
        }
        f.write_str(")")
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

// whitespace and `%` line comments
fn skip(input: &str) -> IResult<&str, ()> {
    value(
        (),
        many0_count(alt((
            multispace1,
            recognize(pair(pchar('%'), take_till(|c: char| c == '\n'))),
        ))),
    )(input)
}

fn ws<'a, F, O>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(skip, inner, skip)
}

fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(tuple((
        take_while1(is_ident_start),
        take_while(is_ident_continue),
    )))(input)
}

fn integer(input: &str) -> IResult<&str, i64> {
    map_res(recognize(pair(opt(pchar('-')), digit1)), |s: &str| {
        s.parse::<i64>()
    })(input)
}

fn arguments(input: &str) -> IResult<&str, Vec<TermSyntax>> {
    delimited(
        ws(pchar('(')),
        separated_list1(pchar(','), ws(term)),
        pchar(')'),
    )(input)
}

fn term(input: &str) -> IResult<&str, TermSyntax> {
    alt((
        map(integer, TermSyntax::Integer),
        map(pair(identifier, opt(arguments)), |(name, args)| match args {
            Some(args) => TermSyntax::Compound(AtomSyntax {
                predicate: name.to_string(),
                args,
            }),
            None => match name.strip_prefix('_') {
                Some(var) => TermSyntax::Variable(var.to_string()),
                None => TermSyntax::Name(name.to_string()),
            },
        }),
    ))(input)
}

fn atom(input: &str) -> IResult<&str, AtomSyntax> {
    map(
        pair(
            verify(identifier, |name: &str| !name.starts_with('_')),
            opt(arguments),
        ),
        |(name, args)| AtomSyntax {
            predicate: name.to_string(),
            args: args.unwrap_or_default(),
        },
    )(input)
}

fn literal(input: &str) -> IResult<&str, LiteralSyntax> {
    alt((
        map(
            preceded(terminated(tag("not"), multispace1), atom),
            LiteralSyntax::Fails,
        ),
        map(tuple((term, ws(tag("!=")), term)), |(left, _, right)| {
            LiteralSyntax::Distinct(left, right)
        }),
        map(atom, LiteralSyntax::Holds),
    ))(input)
}

fn statement(input: &str) -> IResult<&str, Statement> {
    let (input, head) = terminated(atom, skip)(input)?;
    let parsed = alt((
        map(
            delimited(tag(":-"), separated_list1(pchar(','), ws(literal)), pchar('.')),
            |body| Statement::Rule {
                head: head.clone(),
                body,
            },
        ),
        map(pchar('.'), |_| Statement::Fact(head.clone())),
        map(pchar('?'), |_| Statement::Query(head.clone())),
    ))(input);
    parsed
}

/// Parse a whole program.
///
/// # Errors
///
/// [`Error::Parse`] at the first statement that does not parse.
pub fn parse_program(source: &str) -> Result<Vec<Statement>> {
    all_consuming(preceded(skip, many0(terminated(statement, skip))))(source)
        .finish()
        .map(|(_, statements)| statements)
        .map_err(|err| {
            let near: String = err.input.chars().take(24).collect();
            Error::Parse {
                offset: source.len() - err.input.len(),
                message: format!("unexpected input near `{near}`"),
            }
        })
}

/// The answer to one `?` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryAnswer {
    /// The query as written, e.g. `grandparent(alice, _who)`
    pub query: String,
    /// What the knowledge base answered
    pub solutions: Solutions,
}

impl fmt::Display for QueryAnswer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}? {}", self.query, self.solutions)
    }
}

impl KnowledgeBase {
    /// Load a program: store its facts, learn its rules, and answer its
    /// queries in order.
    ///
    /// # Errors
    ///
    /// Parse errors (nothing is loaded), facts with variables, rule heads
    /// whose arguments are not plain names, and errors raised while
    /// answering queries. Statements before a failing one stay loaded.
    pub fn consult(&mut self, source: &str) -> Result<Vec<QueryAnswer>> {
        let mut answers = Vec::new();
        for statement in parse_program(source)? {
            match statement {
                Statement::Fact(atom) => {
                    let fact = self.lower_fact(&atom)?;
                    self.insert(fact);
                }
                Statement::Rule { head, body } => {
                    let template = self.lower_rule(&head, &body)?;
                    self.learn_clause(&head.predicate, template);
                }
                Statement::Query(atom) => {
                    let args = atom
                        .args
                        .iter()
                        .map(|arg| self.lower_term(arg))
                        .collect::<Vec<_>>();
                    let solutions = self.ask(&atom.predicate, args)?;
                    debug!("{atom}? {solutions}");
                    answers.push(QueryAnswer {
                        query: atom.to_string(),
                        solutions,
                    });
                }
            }
        }
        Ok(answers)
    }

    fn lower_term(&self, term: &TermSyntax) -> Term {
        match term {
            TermSyntax::Name(name) => Term::Constant(self.constant(name)),
            TermSyntax::Variable(name) => Term::Variable(self.variable(name)),
            TermSyntax::Integer(value) => Term::Integer(*value),
            TermSyntax::Compound(atom) => Term::from(Atom::new(
                self.relation(&atom.predicate),
                atom.args.iter().map(|arg| self.lower_term(arg)),
            )),
        }
    }

    fn lower_fact(&self, atom: &AtomSyntax) -> Result<Fact> {
        if atom.args.is_empty() {
            return Ok(Fact::Nullary(self.relation(&atom.predicate)));
        }
        let lowered = Atom::new(
            self.relation(&atom.predicate),
            atom.args.iter().map(|arg| self.lower_term(arg)),
        );
        if !lowered.is_ground() {
            return Err(Error::NonGroundFact(atom.to_string()));
        }
        Ok(Fact::from(lowered))
    }

    fn lower_pattern(&self, term: &TermSyntax, params: &[&str]) -> Pattern {
        match term {
            TermSyntax::Name(name) => match params.iter().position(|param| *param == name.as_str()) {
                Some(index) => Pattern::Param(index),
                None => Pattern::Term(Term::Constant(self.constant(name))),
            },
            TermSyntax::Compound(atom) => {
                let parts: Vec<Pattern> = atom
                    .args
                    .iter()
                    .map(|arg| self.lower_pattern(arg, params))
                    .collect();
                if parts.iter().all(|part| matches!(part, Pattern::Term(_))) {
                    Pattern::Term(self.lower_term(term))
                } else {
                    Pattern::Compound(self.relation(&atom.predicate), parts)
                }
            }
            TermSyntax::Variable(_) | TermSyntax::Integer(_) => Pattern::Term(self.lower_term(term)),
        }
    }

    fn lower_patterns(&self, atom: &AtomSyntax, params: &[&str]) -> Vec<Pattern> {
        atom.args
            .iter()
            .map(|arg| self.lower_pattern(arg, params))
            .collect()
    }

    fn lower_rule(&self, head: &AtomSyntax, body: &[LiteralSyntax]) -> Result<ClauseTemplate> {
        let params = head
            .args
            .iter()
            .map(|arg| match arg {
                TermSyntax::Name(name) => Ok(name.as_str()),
                other => Err(Error::InvalidRuleHead(format!(
                    "{head}: `{other}` is not a parameter name"
                ))),
            })
            .collect::<Result<Vec<_>>>()?;

        let literals = body
            .iter()
            .map(|literal| match literal {
                LiteralSyntax::Holds(atom) => Literal::Holds(
                    self.relation(&atom.predicate),
                    self.lower_patterns(atom, &params),
                ),
                LiteralSyntax::Fails(atom) => Literal::Fails(
                    self.relation(&atom.predicate),
                    self.lower_patterns(atom, &params),
                ),
                LiteralSyntax::Distinct(left, right) => Literal::Distinct(
                    self.lower_pattern(left, &params),
                    self.lower_pattern(right, &params),
                ),
            })
            .collect();

        Ok(ClauseTemplate::new(
            self.relation(&head.predicate),
            params.len(),
            literals,
        ))
    }
}
