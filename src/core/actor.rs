use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Permission {
    /// Reveal and flag cells
    Interact,
    /// Be told a board's game number when poking at it
    Lookup,
    /// Start a new game on an existing board
    Reset,
    /// Create and delete boards
    Manage,
}

impl Permission {
    pub const ALL: [Permission; 4] = [
        Permission::Interact,
        Permission::Lookup,
        Permission::Reset,
        Permission::Manage,
    ];
}

/// Whoever triggered an action, with the permissions the host granted them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub name: String,
    permissions: BTreeSet<Permission>,
}

impl Actor {
    /// An actor with no permissions at all
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            permissions: BTreeSet::new(),
        }
    }

    /// A regular player: may play boards, nothing else
    pub fn player(name: impl Into<String>) -> Self {
        Self::new(name).with(Permission::Interact)
    }

    /// Holds every permission
    pub fn operator(name: impl Into<String>) -> Self {
        Permission::ALL
            .into_iter()
            .fold(Self::new(name), |actor, p| actor.with(p))
    }

    pub fn with(mut self, permission: Permission) -> Self {
        self.permissions.insert(permission);
        self
    }

    pub fn can(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }
}
