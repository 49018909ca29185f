pub mod user;

/// Surrogate key assigned by the store.
pub type UserId = i64;

pub trait Entity {
    type Id: Copy + PartialEq;

    /// Identity assigned by the store, `None` until the entity is first saved.
    fn ident(&self) -> Option<Self::Id>;

    /// Entities are the same only when both carry an assigned identity and it matches.
    fn same_identity(&self, other: &Self) -> bool {
        matches!((self.ident(), other.ident()), (Some(a), Some(b)) if a == b)
    }
}

macro_rules! state_ref {
    ($prop:ident, $rtrn:ty) => {
        pub fn $prop(&self) -> &$rtrn {
            &self.state.$prop
        }
    };

    ($prop:ident, $rtrn:ty, $trans:block) => {
        pub fn $prop(&self) -> &$rtrn $trans
    };
}

/// Derive a copy of the entity with a single state field replaced.
macro_rules! state_with {
    ($name:ident, $prop:ident, $ty:ty) => {
        pub fn $name(&self, $prop: $ty) -> Self {
            let mut state = self.state.clone();
            state.$prop = $prop;
            Self { id: self.id, state }
        }
    };
}

pub(self) use state_ref;
pub(self) use state_with;
