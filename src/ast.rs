//! The syntax tree handed from the parser to the translator.
//!
//! Every node is a variant of [`Node`], so adding a construct forces the
//! translator (and its tests) to decide how it lowers.
use core::fmt;

use arbitrary::Arbitrary;

/// Arithmetic and assignment operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Arbitrary)]
pub enum Operator {
    Add,
    Sub,
    Set,
    Mod,
    Mul,
    Div,
}

impl Operator {
    /// Binding strength inside calculations, higher binds tighter.
    pub fn precedence(self) -> u8 {
        match self {
            Self::Set => 0,
            Self::Add | Self::Sub => 1,
            Self::Mod | Self::Mul | Self::Div => 2,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Set => "=",
            Self::Mod => "%",
            Self::Mul => "*",
            Self::Div => "/",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Arbitrary)]
pub enum Comparator {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Eq => "==",
            Self::Neq => "!=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Block(Block),
    Int(i32),
    /// Parsed, but never lowered: the target only knows integers.
    Float(f64),
    /// As a statement this is a raw command line.
    String(Box<str>),
    StoreAccess(StoreAccess),
    StoreAssign(StoreAssign),
    Calculation(Calculation),
    If(If),
    As(As),
    CreateStore(Box<str>),
    Call(Call),
}

impl Node {
    /// Short human readable name of the variant, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Block(_) => "block",
            Self::Int(_) => "integer literal",
            Self::Float(_) => "float literal",
            Self::String(_) => "string literal",
            Self::StoreAccess(_) => "store access",
            Self::StoreAssign(_) => "store assignment",
            Self::Calculation(_) => "calculation",
            Self::If(_) => "if statement",
            Self::As(_) => "as statement",
            Self::CreateStore(_) => "store creation",
            Self::Call(_) => "function call",
        }
    }
}

/// An ordered sequence of statements.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block {
    pub body: Vec<Node>,
}

impl Block {
    pub fn new(body: Vec<Node>) -> Self {
        Self { body }
    }
}

/// Names an entry inside a store.
///
/// Variables go through the translator's name table, literals are used as the
/// target name unchanged (selectors like `@s`, or internal registers).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Index {
    pub identifier: Box<str>,
    pub is_variable: bool,
}

impl Index {
    pub fn variable(identifier: impl Into<Box<str>>) -> Self {
        Self {
            identifier: identifier.into(),
            is_variable: true,
        }
    }

    pub fn literal(identifier: impl Into<Box<str>>) -> Self {
        Self {
            identifier: identifier.into(),
            is_variable: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoreAccess {
    pub identifier: Index,
    pub store: Box<str>,
}

impl StoreAccess {
    pub fn new(identifier: Index, store: impl Into<Box<str>>) -> Self {
        Self {
            identifier,
            store: store.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoreAssign {
    pub identifier: Index,
    pub store: Box<str>,
    pub operation: Operator,
    pub value: Box<Node>,
}

impl StoreAssign {
    pub fn new(
        identifier: Index,
        store: impl Into<Box<str>>,
        operation: Operator,
        value: Node,
    ) -> Self {
        Self {
            identifier,
            store: store.into(),
            operation,
            value: Box::new(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Calculation {
    pub first: Box<Node>,
    pub operator: Operator,
    pub second: Box<Node>,
}

impl Calculation {
    pub fn new(first: Node, operator: Operator, second: Node) -> Self {
        Self {
            first: Box::new(first),
            operator,
            second: Box::new(second),
        }
    }
}

/// `if [not] first <comparator> second { body }`
#[derive(Debug, Clone, PartialEq)]
pub struct If {
    pub first: Box<Node>,
    pub comparator: Comparator,
    pub second: Box<Node>,
    /// Turns the condition into `unless`.
    pub negate: bool,
    pub body: Block,
}

/// `as '<selector>' { body }`
#[derive(Debug, Clone, PartialEq)]
pub struct As {
    pub selector: Box<str>,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub identifier: Box<str>,
    pub args: Vec<Node>,
}
