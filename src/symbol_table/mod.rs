pub mod entry;

use entry::{EntryId, GroupId, Role, SymbolEntry, Value};
use ordermap::OrderMap;
use thiserror::Error;

pub type ScopeFrame = OrderMap<String, EntryId>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SemanticError {
    #[error("identifier `{0}` already declared in this block")]
    DuplicateDeclaration(String),

    #[error("undeclared identifier `{0}`")]
    UndeclaredIdentifier(String),

    #[error("{0} expected")]
    RoleMismatch(&'static str),

    #[error("division by zero in constant expression")]
    DivisionByZero,

    #[error("integer overflow in constant expression")]
    ConstantOverflow,

    #[error("no open scope to declare `{0}` in")]
    NoOpenScope(String),
}

/// Stack of scope frames over an arena of entries. Entry and group handles
/// stay valid after their frame is popped, but the names are no longer
/// reachable through [`SymbolTable::lookup`].
#[derive(Debug, Default)]
pub struct SymbolTable {
    entries: Vec<SymbolEntry>,
    groups: Vec<Vec<EntryId>>,
    scopes: Vec<ScopeFrame>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Outermost scope with the predefined types and boolean constants.
    pub fn with_builtins() -> Self {
        let mut table = Self::new();
        table.enter_scope();
        for name in ["boolean", "char", "integer"] {
            let _ = table.declare(name, Role::Type);
        }
        for (name, value) in [("true", true), ("false", false)] {
            if let Ok(id) = table.declare(name, Role::Const) {
                table.set_value(table.group_of(id), Some(Value::Boolean(value)));
            }
        }
        table
    }

    /// Current nesting depth; the outermost scope is level 0, an empty stack
    /// is level -1.
    pub fn level(&self) -> isize {
        self.scopes.len() as isize - 1
    }

    pub fn enter_scope(&mut self) {
        self.scopes.push(ScopeFrame::new());
        log::debug!("entered scope level {}", self.level());
    }

    pub fn exit_scope(&mut self) -> Option<ScopeFrame> {
        let level = self.level();
        let frame = self.scopes.pop()?;
        if log::log_enabled!(log::Level::Trace) {
            log::trace!("symbol table for level {}", level);
            for &id in frame.values() {
                log::trace!("  {}", self.entries[id]);
            }
        }
        log::debug!("exited scope level {}", level);
        Some(frame)
    }

    pub fn declare(&mut self, name: &str, role: Role) -> Result<EntryId, SemanticError> {
        let group = self.groups.len();
        let id = self.insert(name, role, None, group)?;
        self.groups.push(vec![id]);
        Ok(id)
    }

    /// Declares `name` as one more member of an existing declaration group.
    /// The new entry starts out with the group's role and value.
    pub fn declare_in(&mut self, name: &str, group: GroupId) -> Result<EntryId, SemanticError> {
        let first = &self.entries[self.groups[group][0]];
        let (role, value) = (first.role, first.value);
        let id = self.insert(name, role, value, group)?;
        self.groups[group].push(id);
        Ok(id)
    }

    fn insert(
        &mut self,
        name: &str,
        role: Role,
        value: Option<Value>,
        group: GroupId,
    ) -> Result<EntryId, SemanticError> {
        let id = self.entries.len();
        let Some(frame) = self.scopes.last_mut() else {
            return Err(SemanticError::NoOpenScope(name.to_string()));
        };
        if frame.contains_key(name) {
            return Err(SemanticError::DuplicateDeclaration(name.to_string()));
        }
        frame.insert(name.to_string(), id);

        self.entries.push(SymbolEntry {
            name: name.to_string(),
            role,
            value,
            group,
        });
        Ok(id)
    }

    pub fn lookup(&self, name: &str) -> Result<EntryId, SemanticError> {
        self.scopes
            .iter()
            .rev()
            .find_map(|frame| frame.get(name).copied())
            .ok_or_else(|| SemanticError::UndeclaredIdentifier(name.to_string()))
    }

    pub fn group_of(&self, id: EntryId) -> GroupId {
        self.entries[id].group
    }

    pub fn members(&self, group: GroupId) -> &[EntryId] {
        &self.groups[group]
    }

    pub fn set_role(&mut self, group: GroupId, role: Role) {
        for &id in &self.groups[group] {
            self.entries[id].role = role;
        }
    }

    pub fn set_value(&mut self, group: GroupId, value: Option<Value>) {
        for &id in &self.groups[group] {
            self.entries[id].value = value;
        }
    }

    pub fn entry(&self, id: EntryId) -> &SymbolEntry {
        &self.entries[id]
    }
}
