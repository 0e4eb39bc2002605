//! Target commands and the fixed operator vocabularies of the scoreboard machine.
use core::fmt;

use crate::ast::{Comparator, Operator};

use super::TranslateError;

/// `scoreboard players <verb> ...` with an immediate value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditVerb {
    Add,
    Remove,
    Set,
}

impl EditVerb {
    pub fn from_operator(operator: Operator) -> Result<Self, TranslateError> {
        match operator {
            Operator::Add => Ok(Self::Add),
            Operator::Sub => Ok(Self::Remove),
            Operator::Set => Ok(Self::Set),
            Operator::Mod | Operator::Mul | Operator::Div => {
                Err(TranslateError::InvalidOperator {
                    operator,
                    form: "an immediate edit",
                })
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Remove => "remove",
            Self::Set => "set",
        }
    }
}

/// Operator of `scoreboard players operation`.
pub fn operation_symbol(operator: Operator) -> &'static str {
    match operator {
        Operator::Add => "+=",
        Operator::Sub => "-=",
        Operator::Set => "=",
        Operator::Mod => "%=",
        Operator::Mul => "*=",
        Operator::Div => "/=",
    }
}

/// Comparison inside `if score`.
pub fn comparison_symbol(comparator: Comparator) -> &'static str {
    match comparator {
        Comparator::Eq => "=",
        Comparator::Neq => "!=",
        Comparator::Gt => ">",
        Comparator::Gte => ">=",
        Comparator::Lt => "<",
        Comparator::Lte => "<=",
    }
}

/// One entry of one store, already in target names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score<'a> {
    pub entry: &'a str,
    pub store: &'a str,
}

impl fmt::Display for Score<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.entry, self.store)
    }
}

/// The `if score`/`unless score` fragment comparing two scores.
pub fn condition(negate: bool, first: Score, comparator: Comparator, second: Score) -> Box<str> {
    let keyword = if negate { "unless" } else { "if" };
    let symbol = comparison_symbol(comparator);
    format!("{keyword} score {first} {symbol} {second}").into_boxed_str()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CommandKind {
    /// Store declarations run unconditionally.
    Declaration,
    Instruction,
}

/// A single target command.
///
/// Each prefix is an `execute` subcommand (`as @a`, `if score ...`). They are kept
/// outermost first and rendered as `execute <prefix> run ` in front of the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    kind: CommandKind,
    prefixes: Vec<Box<str>>,
    body: Box<str>,
}

impl Command {
    /// A command line passed through as written.
    pub fn raw(body: impl Into<Box<str>>) -> Self {
        Self {
            kind: CommandKind::Instruction,
            prefixes: vec![],
            body: body.into(),
        }
    }

    pub fn declare_store(store: &str) -> Self {
        Self {
            kind: CommandKind::Declaration,
            prefixes: vec![],
            body: format!("scoreboard objectives add {store} dummy").into_boxed_str(),
        }
    }

    /// Immediate edit of `target`.
    ///
    /// `add` and `remove` only take amounts in `0..=i32::MAX`, so negative
    /// amounts flip the verb. `i32::MIN` has no positive counterpart and is
    /// applied in two steps.
    pub fn edit(verb: EditVerb, target: Score, value: i32) -> Vec<Self> {
        let edit = |verb: EditVerb, value: i32| {
            Self::raw(format!("scoreboard players {} {target} {value}", verb.as_str()))
        };
        let flipped = match verb {
            EditVerb::Add => EditVerb::Remove,
            EditVerb::Remove => EditVerb::Add,
            EditVerb::Set => return vec![edit(verb, value)],
        };
        match value.checked_neg() {
            _ if value >= 0 => vec![edit(verb, value)],
            Some(negated) => vec![edit(flipped, negated)],
            None => vec![edit(flipped, i32::MAX), edit(flipped, 1)],
        }
    }

    /// Number of commands [`Self::edit`] produces.
    pub fn edit_len(verb: EditVerb, value: i32) -> usize {
        if verb != EditVerb::Set && value == i32::MIN {
            2
        } else {
            1
        }
    }

    pub fn operation(target: Score, operator: Operator, source: Score) -> Self {
        let symbol = operation_symbol(operator);
        Self::raw(format!(
            "scoreboard players operation {target} {symbol} {source}"
        ))
    }

    /// Run `command` and store its numeric result in `target`.
    pub fn store_result(target: Score, command: &str) -> Self {
        Self::raw(command).prefixed(format!("store result score {target}").into_boxed_str())
    }

    /// Wrap the command in one more `execute` subcommand, outside the existing ones.
    pub fn prefixed(mut self, prefix: Box<str>) -> Self {
        if self.kind == CommandKind::Instruction {
            self.prefixes.insert(0, prefix);
        }
        self
    }

    pub fn is_declaration(&self) -> bool {
        self.kind == CommandKind::Declaration
    }

    pub fn prefixes(&self) -> impl Iterator<Item = &str> {
        self.prefixes.iter().map(AsRef::as_ref)
    }

    pub fn body(&self) -> &str {
        &self.body
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for prefix in &self.prefixes {
            write!(f, "execute {prefix} run ")?;
        }
        f.write_str(&self.body)
    }
}
