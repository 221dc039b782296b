use crate::SyntaxKind;

const WORDS: usize = SyntaxKind::ALL.len().div_ceil(u64::BITS as usize);

/// Constant bitset of kinds, used for first sets and recovery sets in the grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyntaxSet {
    bits: [u64; WORDS],
}

impl SyntaxSet {
    pub const EMPTY: Self = Self { bits: [0; WORDS] };

    const fn slot(kind: SyntaxKind) -> (usize, u64) {
        let kind = kind as usize;
        (kind / u64::BITS as usize, 1 << (kind % u64::BITS as usize))
    }

    pub const fn new<const N: usize>(kinds: [SyntaxKind; N]) -> Self {
        let mut set = Self::EMPTY;

        let mut i = 0;
        while i < N {
            set = set.with(kinds[i]);
            i += 1;
        }

        set
    }

    pub const fn with(mut self, kind: SyntaxKind) -> Self {
        let (slot, mask) = Self::slot(kind);
        self.bits[slot] |= mask;
        self
    }

    pub const fn union(mut self, other: Self) -> Self {
        let mut i = 0;

        while i < WORDS {
            self.bits[i] |= other.bits[i];
            i += 1;
        }

        self
    }

    pub const fn contains(&self, kind: SyntaxKind) -> bool {
        let (slot, mask) = Self::slot(kind);
        self.bits[slot] & mask != 0
    }
}
