//! Lower the syntax tree onto scoreboard commands.
//!
//! The target has no registers, no expressions and no blocks. Expressions are
//! split into two-operand steps through scratch entries in a dedicated store,
//! and conditions become `execute if score ... run` prefixes on every command
//! of the guarded body.
//!
//! For example
//!
//! create store a
//! create store c
//! a[b] = c[d] + 3
//!
//! becomes
//!
//! scoreboard objectives add a dummy
//! scoreboard objectives add b dummy
//! scoreboard objectives add c dummy          ; scratch store
//! scoreboard players operation d c = f b     ; d := c[d]
//! scoreboard players set e c 3               ; e := 3
//! scoreboard players operation d c += e c
//! scoreboard players operation g a = d c     ; a[b] := d

use std::collections::HashSet;

use crate::ast::{As, Block, Calculation, If, Index, Node, Operator, StoreAccess};

pub mod command;
pub mod names;
pub mod registers;

use command::{condition, Command, EditVerb, Score};
use names::{NameGenerator, NameTable};
use registers::Registers;

/// Source name of the scratch store. `$` cannot start an identifier, so no
/// program can refer to it.
pub const TEMP_STORE: &str = "$tmp";

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum TranslateError {
    #[error("store `{0}` was never created")]
    UnknownStore(Box<str>),
    #[error("operator `{operator}` cannot be used as {form}")]
    InvalidOperator {
        operator: Operator,
        form: &'static str,
    },
    #[error("{found} cannot be assigned to a store entry")]
    InvalidAssignment { found: &'static str },
    #[error("{found} cannot be used as a statement")]
    Unsupported { found: &'static str },
}

type Result<T, E = TranslateError> = std::result::Result<T, E>;

/// Owns all naming state for one compilation.
///
/// A failed [`Translator::translate`] keeps the names it handed out, but stores
/// it declared count as undeclared again, since their declarations were never
/// returned.
#[derive(Debug, Default)]
pub struct Translator {
    variables: NameTable,
    stores: NameTable,
    /// Stores whose declaration has been returned to the caller.
    declared: HashSet<Box<str>>,
    /// Stores declared by the translation in progress.
    journal: Vec<Box<str>>,
    registers: Registers,
    names: NameGenerator,
}

impl Translator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn translate(&mut self, node: &Node) -> Result<Vec<Command>> {
        self.transaction(|this| this.lower(node))
    }

    pub fn translate_block(&mut self, block: &Block) -> Result<Vec<Command>> {
        self.transaction(|this| this.lower_block(block))
    }

    fn transaction(
        &mut self,
        lower: impl FnOnce(&mut Self) -> Result<Vec<Command>>,
    ) -> Result<Vec<Command>> {
        self.journal.clear();
        let result = lower(self);
        for store in self.journal.drain(..) {
            if result.is_err() {
                self.declared.remove(&store);
            }
        }
        result
    }

    fn lower(&mut self, node: &Node) -> Result<Vec<Command>> {
        match node {
            Node::Block(block) => self.lower_block(block),
            Node::CreateStore(identifier) => Ok(self.create_store(identifier).into_iter().collect()),
            Node::StoreAssign(assign) => self.assign(
                &assign.identifier,
                &assign.store,
                assign.operation,
                &assign.value,
            ),
            Node::Calculation(calculation) => {
                let (commands, _) = self.calculation(calculation)?;
                Ok(commands)
            }
            Node::If(conditional) => self.conditional(conditional),
            Node::As(scope) => self.execute_as(scope),
            Node::String(raw) => Ok(vec![Command::raw(raw.as_ref())]),
            Node::Int(_) | Node::Float(_) | Node::StoreAccess(_) | Node::Call(_) => {
                Err(TranslateError::Unsupported { found: node.kind() })
            }
        }
    }

    fn lower_block(&mut self, block: &Block) -> Result<Vec<Command>> {
        let mut commands = vec![];
        for node in &block.body {
            commands.extend(self.lower(node)?);
        }
        Ok(commands)
    }

    pub fn registers(&self) -> &Registers {
        &self.registers
    }

    /// Target name given to a source variable, if it was ever used.
    pub fn variable_name(&self, name: &str) -> Option<&str> {
        self.variables.lookup(name)
    }

    /// Target name given to a store, if it was created.
    pub fn store_name(&self, name: &str) -> Option<&str> {
        self.stores
            .lookup(name)
            .filter(|_| self.declared.contains(name))
    }

    /// Declares the store, or returns `None` if it already was.
    ///
    /// A store keeps its name when a failed translation rolls its declaration
    /// back, so declaring it again reuses the name.
    fn create_store(&mut self, identifier: &str) -> Option<Command> {
        if self.declared.contains(identifier) {
            return None;
        }
        let declaration = Command::declare_store(self.stores.resolve(identifier, &mut self.names));
        self.declared.insert(Box::from(identifier));
        self.journal.push(Box::from(identifier));
        Some(declaration)
    }

    fn store(&self, identifier: &str) -> Result<Box<str>> {
        self.store_name(identifier)
            .map(Box::from)
            .ok_or_else(|| TranslateError::UnknownStore(Box::from(identifier)))
    }

    fn entry(&mut self, index: &Index) -> Box<str> {
        if index.is_variable {
            Box::from(self.variables.resolve(&index.identifier, &mut self.names))
        } else {
            index.identifier.clone()
        }
    }

    fn assign(
        &mut self,
        identifier: &Index,
        store: &str,
        operation: Operator,
        value: &Node,
    ) -> Result<Vec<Command>> {
        match value {
            Node::Int(value) => {
                let verb = EditVerb::from_operator(operation)?;
                let store = self.store(store)?;
                let entry = self.entry(identifier);
                let target = Score {
                    entry: &entry,
                    store: &store,
                };
                Ok(Command::edit(verb, target, *value))
            }
            Node::StoreAccess(source) => {
                let store = self.store(store)?;
                let entry = self.entry(identifier);
                let source_store = self.store(&source.store)?;
                let source_entry = self.entry(&source.identifier);
                Ok(vec![Command::operation(
                    Score {
                        entry: &entry,
                        store: &store,
                    },
                    operation,
                    Score {
                        entry: &source_entry,
                        store: &source_store,
                    },
                )])
            }
            Node::Calculation(calculation) => {
                self.store(store)?;
                let (mut commands, result) = self.calculation(calculation)?;
                commands.extend(self.assign(
                    identifier,
                    store,
                    operation,
                    &Node::StoreAccess(result),
                )?);
                Ok(commands)
            }
            Node::String(command) if operation == Operator::Set => {
                let store = self.store(store)?;
                let entry = self.entry(identifier);
                let target = Score {
                    entry: &entry,
                    store: &store,
                };
                Ok(vec![Command::store_result(target, command)])
            }
            Node::String(_) => {
                // capture into a register first, then combine like any other score
                self.store(store)?;
                let mut commands: Vec<Command> = self.create_store(TEMP_STORE).into_iter().collect();
                let register = self.registers.claim(&mut self.names);
                let result = self
                    .assign(&Index::literal(register.clone()), TEMP_STORE, Operator::Set, value)
                    .and_then(|captured| {
                        commands.extend(captured);
                        let source = StoreAccess::new(Index::literal(register.clone()), TEMP_STORE);
                        self.assign(identifier, store, operation, &Node::StoreAccess(source))
                    });
                self.registers.free(register);
                commands.extend(result?);
                Ok(commands)
            }
            other => Err(TranslateError::InvalidAssignment {
                found: other.kind(),
            }),
        }
    }

    /// Claims two registers for the duration of `lower`, then frees them.
    fn with_registers<T>(
        &mut self,
        lower: impl FnOnce(&mut Self, &str, &str) -> Result<T>,
    ) -> Result<T> {
        let first = self.registers.claim(&mut self.names);
        let second = self.registers.claim(&mut self.names);
        let result = lower(self, &first, &second);
        self.registers.free(second);
        self.registers.free(first);
        result
    }

    /// Lowers `first` and `second` into the two registers.
    fn load_operands(
        &mut self,
        registers: (&str, &str),
        first: &Node,
        second: &Node,
    ) -> Result<Vec<Command>> {
        let mut commands =
            self.assign(&Index::literal(registers.0), TEMP_STORE, Operator::Set, first)?;
        commands.extend(self.assign(
            &Index::literal(registers.1),
            TEMP_STORE,
            Operator::Set,
            second,
        )?);
        Ok(commands)
    }

    /// Lowers a calculation into the scratch store.
    ///
    /// The returned access names a register that has already been freed again:
    /// it stays valid only until the next claim.
    fn calculation(&mut self, calculation: &Calculation) -> Result<(Vec<Command>, StoreAccess)> {
        for operand in [&calculation.first, &calculation.second] {
            if !matches!(
                operand.as_ref(),
                Node::Int(_) | Node::StoreAccess(_) | Node::Calculation(_)
            ) {
                return Err(TranslateError::InvalidAssignment {
                    found: operand.kind(),
                });
            }
        }

        let mut commands: Vec<Command> = self.create_store(TEMP_STORE).into_iter().collect();
        let result = self.with_registers(|this, first, second| {
            let mut commands =
                this.load_operands((first, second), &calculation.first, &calculation.second)?;
            let temp = this.store(TEMP_STORE)?;
            commands.push(Command::operation(
                Score {
                    entry: first,
                    store: &temp,
                },
                calculation.operator,
                Score {
                    entry: second,
                    store: &temp,
                },
            ));
            Ok((commands, StoreAccess::new(Index::literal(first), TEMP_STORE)))
        })?;
        commands.extend(result.0);
        Ok((commands, result.1))
    }

    fn conditional(&mut self, conditional: &If) -> Result<Vec<Command>> {
        if let Some((first, second, statement)) = direct_comparison(conditional) {
            let first_store = self.store(&first.store)?;
            let first_entry = self.entry(&first.identifier);
            let second_store = self.store(&second.store)?;
            let second_entry = self.entry(&second.identifier);
            let prefix = condition(
                conditional.negate,
                Score {
                    entry: &first_entry,
                    store: &first_store,
                },
                conditional.comparator,
                Score {
                    entry: &second_entry,
                    store: &second_store,
                },
            );
            return Ok(self
                .lower(statement)?
                .into_iter()
                .map(|command| command.prefixed(prefix.clone()))
                .collect());
        }

        let mut commands: Vec<Command> = self.create_store(TEMP_STORE).into_iter().collect();
        let guarded = self.with_registers(|this, first, second| {
            let mut commands =
                this.load_operands((first, second), &conditional.first, &conditional.second)?;
            let temp = this.store(TEMP_STORE)?;
            let prefix = condition(
                conditional.negate,
                Score {
                    entry: first,
                    store: &temp,
                },
                conditional.comparator,
                Score {
                    entry: second,
                    store: &temp,
                },
            );
            for statement in &conditional.body.body {
                commands.extend(
                    this.lower(statement)?
                        .into_iter()
                        .map(|command| command.prefixed(prefix.clone())),
                );
            }
            Ok(commands)
        })?;
        commands.extend(guarded);
        Ok(commands)
    }

    fn execute_as(&mut self, scope: &As) -> Result<Vec<Command>> {
        let prefix = format!("as {}", scope.selector).into_boxed_str();
        Ok(self
            .lower_block(&scope.body)?
            .into_iter()
            .map(|command| command.prefixed(prefix.clone()))
            .collect())
    }
}

/// Operands and statement of an `if` that can compare the two scores in place.
///
/// Both sides have to be plain store accesses and the body a single statement
/// that lowers to exactly one command, so the condition is checked once.
fn direct_comparison(conditional: &If) -> Option<(&StoreAccess, &StoreAccess, &Node)> {
    match (
        conditional.first.as_ref(),
        conditional.second.as_ref(),
        conditional.body.body.as_slice(),
    ) {
        (Node::StoreAccess(first), Node::StoreAccess(second), [statement])
            if lowers_to_single_command(statement) =>
        {
            Some((first, second, statement))
        }
        _ => None,
    }
}

fn lowers_to_single_command(node: &Node) -> bool {
    match node {
        Node::String(_) | Node::CreateStore(_) => true,
        Node::StoreAssign(assign) => match assign.value.as_ref() {
            Node::Int(value) => EditVerb::from_operator(assign.operation)
                .map_or(true, |verb| Command::edit_len(verb, *value) == 1),
            Node::StoreAccess(_) => true,
            Node::String(_) => assign.operation == Operator::Set,
            _ => false,
        },
        Node::Block(block) | Node::As(As { body: block, .. }) => {
            matches!(block.body.as_slice(), [statement] if lowers_to_single_command(statement))
        }
        Node::If(conditional) => direct_comparison(conditional).is_some(),
        _ => false,
    }
}
