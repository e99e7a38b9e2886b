use std::fmt;

/// An identifier for one logical interpreter state.
///
/// Ids pack a 64-bit value where:
/// - The high 32 bits (bits 32-63) hold the generation counter of the slot
/// - The low 32 bits (bits 0-31) hold the slot index within the owning table
///
/// The generation is bumped every time a slot is closed, so an id held past its
/// state's close no longer matches the slot and is rejected as stale instead of
/// silently aliasing whatever state reuses the index later.
///
/// `StateId` is `Copy` and entirely opaque to hook implementations: they may use it
/// as a map key or stash it for diagnostics, but none of its bits refer to engine
/// internals.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StateId(u64);

impl StateId {
    /// Creates an id from a slot index and its generation counter
    #[must_use]
    pub(crate) fn new(index: u32, generation: u32) -> Self {
        StateId((u64::from(generation) << 32) | u64::from(index))
    }

    /// Returns the raw packed value
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }

    /// Extracts the slot index from the id (low 32 bits)
    #[must_use]
    pub fn index(&self) -> u32 {
        self.0 as u32
    }

    /// Extracts the generation counter from the id (high 32 bits)
    #[must_use]
    pub fn generation(&self) -> u32 {
        (self.0 >> 32) as u32
    }
}

impl fmt::Debug for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "StateId(0x{:016x}, slot: {}, generation: {})",
            self.0,
            self.index(),
            self.generation()
        )
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:016x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_id_new() {
        let id = StateId::new(7, 3);
        assert_eq!(id.value(), 0x0000_0003_0000_0007);
    }

    #[test]
    fn test_id_index() {
        let id = StateId::new(42, 0);
        assert_eq!(id.index(), 42);

        let id2 = StateId::new(u32::MAX, 1);
        assert_eq!(id2.index(), u32::MAX);
    }

    #[test]
    fn test_id_generation() {
        let id = StateId::new(0, 0);
        assert_eq!(id.generation(), 0);

        let id2 = StateId::new(0, 99);
        assert_eq!(id2.generation(), 99);

        let id3 = StateId::new(5, u32::MAX);
        assert_eq!(id3.generation(), u32::MAX);
    }

    #[test]
    fn test_id_same_index_different_generation() {
        let before = StateId::new(3, 0);
        let after = StateId::new(3, 1);
        assert_eq!(before.index(), after.index());
        assert_ne!(before, after);
    }

    #[test]
    fn test_id_display() {
        let id = StateId::new(1, 2);
        assert_eq!(format!("{}", id), "0x0000000200000001");
    }

    #[test]
    fn test_id_debug() {
        let id = StateId::new(1, 2);
        let debug_str = format!("{:?}", id);
        assert!(debug_str.contains("StateId(0x0000000200000001"));
        assert!(debug_str.contains("slot: 1"));
        assert!(debug_str.contains("generation: 2"));
    }

    #[test]
    fn test_id_as_map_key() {
        let mut map = HashMap::new();
        map.insert(StateId::new(0, 0), "first");
        map.insert(StateId::new(0, 1), "second");

        assert_eq!(map.len(), 2);
        assert_eq!(map.get(&StateId::new(0, 0)), Some(&"first"));
        assert_eq!(map.get(&StateId::new(0, 1)), Some(&"second"));
    }

    #[test]
    fn test_id_ordering() {
        let a = StateId::new(1, 0);
        let b = StateId::new(2, 0);
        let c = StateId::new(0, 1);
        assert!(a < b);
        assert!(b < c);
    }
}
