// Packed object-flag set replacing the dump's eight discrete booleans.

/// Bit set over the eight per-object flags carried by a dump record:
/// five top-level booleans plus the three members of the nested GC
/// `flags` object. Queries are pure bit tests; the set is immutable
/// once the owning object is built.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct FlagSet(u64);

impl FlagSet {
    pub const FROZEN: FlagSet = FlagSet(1 << 0);
    pub const BROKEN: FlagSet = FlagSet(1 << 1);
    pub const FSTRING: FlagSet = FlagSet(1 << 2);
    pub const GC_MARKED: FlagSet = FlagSet(1 << 3);
    pub const GC_OLD: FlagSet = FlagSet(1 << 4);
    pub const GC_WB_PROTECTED: FlagSet = FlagSet(1 << 5);
    pub const SHARED: FlagSet = FlagSet(1 << 6);
    pub const EMBEDDED: FlagSet = FlagSet(1 << 7);

    pub fn empty() -> Self {
        FlagSet(0)
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn contains(self, other: FlagSet) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: FlagSet) {
        self.0 |= other.0;
    }

    /// Insert `flag` only when `set` holds; keeps packing call sites flat.
    pub fn set(&mut self, flag: FlagSet, set: bool) {
        if set {
            self.insert(flag);
        }
    }

    pub fn frozen(self) -> bool {
        self.contains(Self::FROZEN)
    }

    pub fn broken(self) -> bool {
        self.contains(Self::BROKEN)
    }

    pub fn fstring(self) -> bool {
        self.contains(Self::FSTRING)
    }

    pub fn gc_marked(self) -> bool {
        self.contains(Self::GC_MARKED)
    }

    pub fn gc_old(self) -> bool {
        self.contains(Self::GC_OLD)
    }

    pub fn gc_wb_protected(self) -> bool {
        self.contains(Self::GC_WB_PROTECTED)
    }

    pub fn shared(self) -> bool {
        self.contains(Self::SHARED)
    }

    pub fn embedded(self) -> bool {
        self.contains(Self::EMBEDDED)
    }
}

#[cfg(test)]
mod tests {
    use super::FlagSet;

    const ALL: [FlagSet; 8] = [
        FlagSet::FROZEN,
        FlagSet::BROKEN,
        FlagSet::FSTRING,
        FlagSet::GC_MARKED,
        FlagSet::GC_OLD,
        FlagSet::GC_WB_PROTECTED,
        FlagSet::SHARED,
        FlagSet::EMBEDDED,
    ];

    #[test]
    fn bits_do_not_overlap() {
        for (i, a) in ALL.iter().enumerate() {
            for b in &ALL[i + 1..] {
                assert!(!a.contains(*b), "{a:?} overlaps {b:?}");
            }
        }
    }

    #[test]
    fn every_combination_round_trips() {
        for pattern in 0u32..256 {
            let mut flags = FlagSet::empty();
            for (bit, flag) in ALL.iter().enumerate() {
                flags.set(*flag, pattern & (1 << bit) != 0);
            }
            for (bit, flag) in ALL.iter().enumerate() {
                assert_eq!(
                    flags.contains(*flag),
                    pattern & (1 << bit) != 0,
                    "pattern {pattern:#010b} bit {bit}"
                );
            }
        }
    }

    #[test]
    fn query_methods_match_their_bits() {
        let mut flags = FlagSet::empty();
        flags.insert(FlagSet::FROZEN);
        flags.insert(FlagSet::GC_OLD);
        assert!(flags.frozen());
        assert!(flags.gc_old());
        assert!(!flags.broken());
        assert!(!flags.fstring());
        assert!(!flags.gc_marked());
        assert!(!flags.gc_wb_protected());
        assert!(!flags.shared());
        assert!(!flags.embedded());
    }
}
