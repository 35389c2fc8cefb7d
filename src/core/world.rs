use std::collections::HashMap;
use std::fmt;

use uuid::Uuid;

/// Integer block position inside a world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Handle to a spatial partition. Two handles are the same world iff their uids match.
#[derive(Debug, Clone, Eq)]
pub struct World {
    pub uid: Uuid,
    pub name: String,
}

impl World {
    pub fn new(uid: Uuid, name: impl Into<String>) -> Self {
        Self { uid, name: name.into() }
    }
}

impl PartialEq for World {
    fn eq(&self, other: &Self) -> bool {
        self.uid == other.uid
    }
}

/// How a persisted board names its world
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorldRef {
    Id(Uuid),
    /// Legacy saves store the world's name instead of its uid
    Name(String),
}

impl WorldRef {
    /// A string that parses as a uuid is an id; anything else is taken as a name.
    pub fn parse(raw: &str) -> Self {
        match Uuid::parse_str(raw) {
            Ok(uid) => WorldRef::Id(uid),
            Err(_) => WorldRef::Name(raw.to_string()),
        }
    }
}

impl fmt::Display for WorldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorldRef::Id(uid) => write!(f, "{}", uid),
            WorldRef::Name(name) => f.write_str(name),
        }
    }
}

impl From<&World> for WorldRef {
    fn from(world: &World) -> Self {
        WorldRef::Id(world.uid)
    }
}

/// Host-side world lookup
pub trait WorldLookup {
    fn by_uid(&self, uid: Uuid) -> Option<World>;
    fn by_name(&self, name: &str) -> Option<World>;

    /// Resolve a persisted reference. An id that no longer exists is retried as a
    /// name, since some hosts name worlds after their uid.
    fn resolve(&self, reference: &WorldRef) -> Option<World> {
        match reference {
            WorldRef::Id(uid) => self
                .by_uid(*uid)
                .or_else(|| self.by_name(&uid.to_string())),
            WorldRef::Name(name) => self.by_name(name),
        }
    }
}

/// Fixed set of worlds known up front, e.g. from the config file
#[derive(Debug, Clone, Default)]
pub struct WorldDirectory {
    worlds: HashMap<Uuid, World>,
}

impl WorldDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, world: World) {
        self.worlds.insert(world.uid, world);
    }

    pub fn with(mut self, world: World) -> Self {
        self.insert(world);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &World> {
        self.worlds.values()
    }

    pub fn len(&self) -> usize {
        self.worlds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.worlds.is_empty()
    }
}

impl WorldLookup for WorldDirectory {
    fn by_uid(&self, uid: Uuid) -> Option<World> {
        self.worlds.get(&uid).cloned()
    }

    fn by_name(&self, name: &str) -> Option<World> {
        self.worlds.values().find(|w| w.name == name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overworld() -> World {
        World::new(Uuid::from_u128(1), "world")
    }

    #[test]
    fn parse_prefers_uuid_form() {
        let uid = Uuid::from_u128(42);
        assert_eq!(WorldRef::parse(&uid.to_string()), WorldRef::Id(uid));
        assert_eq!(WorldRef::parse("world_nether"), WorldRef::Name("world_nether".into()));
    }

    #[test]
    fn resolves_by_id_then_name() {
        let dir = WorldDirectory::new().with(overworld());
        assert_eq!(dir.resolve(&WorldRef::Id(Uuid::from_u128(1))), Some(overworld()));
        assert_eq!(dir.resolve(&WorldRef::Name("world".into())), Some(overworld()));
        assert_eq!(dir.resolve(&WorldRef::Name("missing".into())), None);
        assert_eq!(dir.resolve(&WorldRef::Id(Uuid::from_u128(9))), None);
    }

    #[test]
    fn worlds_compare_by_uid_only() {
        let renamed = World::new(Uuid::from_u128(1), "renamed");
        assert_eq!(overworld(), renamed);
        assert_ne!(overworld(), World::new(Uuid::from_u128(2), "world"));
    }
}
