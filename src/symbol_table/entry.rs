use std::fmt::Display;

pub type EntryId = usize;
pub type GroupId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Const,
    Var,
    Type,
    Proc,
    Param,
    Unset,
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let role = match self {
            Role::Const => "Constant",
            Role::Var => "Variable",
            Role::Type => "Type",
            Role::Proc => "Procedure",
            Role::Param => "Parameter",
            Role::Unset => "None",
        };
        write!(f, "{}", role)
    }
}

/// Compile-time value attached to a constant or to a variable whose last
/// assignment folded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value {
    Integer(i64),
    Boolean(bool),
}

impl Value {
    pub fn as_integer(self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(i),
            Value::Boolean(_) => None,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Integer(i) => write!(f, "{}", i),
            Value::Boolean(b) => write!(f, "{}", b),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SymbolEntry {
    pub name: String,
    pub role: Role,
    pub value: Option<Value>,
    pub group: GroupId,
}

impl Display for SymbolEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let value = self
            .value
            .map(|v| v.to_string())
            .unwrap_or_else(|| String::from("None"));
        write!(
            f,
            "Name:{:<16} | Role:{:<9} | Value: {}",
            self.name,
            self.role.to_string(),
            value
        )
    }
}
