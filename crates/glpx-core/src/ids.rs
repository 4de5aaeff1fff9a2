//! Handles for rows and columns of a model.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

static NEXT_MODEL_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a [`Model`](crate::Model).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[repr(transparent)]
pub struct ModelId(u64);

impl ModelId {
    pub(crate) fn next() -> Self {
        Self(NEXT_MODEL_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn inner(self) -> u64 {
        self.0
    }
}

macro_rules! define_handle {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        pub struct $name {
            model: ModelId,
            index: u32,
        }

        impl $name {
            pub(crate) fn new(model: ModelId, index: u32) -> Self {
                Self { model, index }
            }

            /// Model the handle belongs to.
            pub fn model(self) -> ModelId {
                self.model
            }

            /// 1-based engine index.
            pub fn index(self) -> u32 {
                self.index
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{} {}", $label, self.index)
            }
        }
    };
}

define_handle!(
    /// A column of a model.
    Variable,
    "variable"
);
define_handle!(
    /// A row of a model.
    Constraint,
    "constraint"
);

/// Either kind of model entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Entity {
    Variable(Variable),
    Constraint(Constraint),
}

impl Entity {
    pub fn model(self) -> ModelId {
        match self {
            Entity::Variable(v) => v.model(),
            Entity::Constraint(c) => c.model(),
        }
    }

    pub fn index(self) -> u32 {
        match self {
            Entity::Variable(v) => v.index(),
            Entity::Constraint(c) => c.index(),
        }
    }

    pub fn as_variable(self) -> Option<Variable> {
        match self {
            Entity::Variable(v) => Some(v),
            Entity::Constraint(_) => None,
        }
    }

    pub fn as_constraint(self) -> Option<Constraint> {
        match self {
            Entity::Constraint(c) => Some(c),
            Entity::Variable(_) => None,
        }
    }

    pub fn is_variable(self) -> bool {
        matches!(self, Entity::Variable(_))
    }
}

impl From<Variable> for Entity {
    fn from(value: Variable) -> Self {
        Entity::Variable(value)
    }
}

impl From<Constraint> for Entity {
    fn from(value: Constraint) -> Self {
        Entity::Constraint(value)
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Entity::Variable(v) => v.fmt(f),
            Entity::Constraint(c) => c.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_ids_are_unique() {
        let a = ModelId::next();
        let b = ModelId::next();
        assert_ne!(a, b);
        assert!(b.inner() > a.inner());
    }

    #[test]
    fn entity_roundtrip() {
        let model = ModelId::next();
        let x = Variable::new(model, 3);
        let entity = Entity::from(x);
        assert_eq!(entity.as_variable(), Some(x));
        assert_eq!(entity.as_constraint(), None);
        assert_eq!(entity.index(), 3);
        assert_eq!(entity.to_string(), "variable 3");
        assert_eq!(Entity::from(Constraint::new(model, 1)).to_string(), "constraint 1");
    }
}
