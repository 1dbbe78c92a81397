//! Declaration modifier flags.

use std::{
    fmt,
    ops::{BitOr, BitOrAssign},
};

/// Bitset of declaration modifiers (`public`, `static`, `final`, ...).
///
/// Flags are copied verbatim between the AST and the declaration model, so a
/// constant parsed without a visibility keeps an empty visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers(u8);

impl Modifiers {
    pub const NONE: Self = Self(0);
    pub const PUBLIC: Self = Self(1);
    pub const PROTECTED: Self = Self(1 << 1);
    pub const PRIVATE: Self = Self(1 << 2);
    pub const STATIC: Self = Self(1 << 3);
    pub const ABSTRACT: Self = Self(1 << 4);
    pub const FINAL: Self = Self(1 << 5);
    pub const READONLY: Self = Self(1 << 6);

    const VISIBILITY_MASK: u8 = 0b0000_0111;

    /// Raw bit representation.
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Build from raw bits, dropping unknown bits.
    pub const fn from_bits_truncate(bits: u8) -> Self {
        Self(bits & 0b0111_1111)
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }

    /// Set or clear `flag` depending on `enabled`.
    pub fn set(&mut self, flag: Self, enabled: bool) {
        if enabled {
            self.insert(flag);
        } else {
            self.remove(flag);
        }
    }

    /// Only the visibility bits.
    pub const fn visibility(self) -> Self {
        Self(self.0 & Self::VISIBILITY_MASK)
    }

    /// Replace the visibility bits, keeping the other flags.
    pub const fn with_visibility(self, visibility: Self) -> Self {
        Self((self.0 & !Self::VISIBILITY_MASK) | (visibility.0 & Self::VISIBILITY_MASK))
    }

    pub const fn is_public(self) -> bool {
        self.contains(Self::PUBLIC)
    }

    pub const fn is_static(self) -> bool {
        self.contains(Self::STATIC)
    }

    pub const fn is_abstract(self) -> bool {
        self.contains(Self::ABSTRACT)
    }

    pub const fn is_final(self) -> bool {
        self.contains(Self::FINAL)
    }

    /// Map a (case-insensitive) PHP keyword to its modifier flag.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.to_ascii_lowercase().as_str() {
            "public" => Some(Self::PUBLIC),
            "protected" => Some(Self::PROTECTED),
            "private" => Some(Self::PRIVATE),
            "static" => Some(Self::STATIC),
            "abstract" => Some(Self::ABSTRACT),
            "final" => Some(Self::FINAL),
            "readonly" => Some(Self::READONLY),
            _ => None,
        }
    }

    /// Keywords in canonical PSR-12 order.
    pub fn keywords(self) -> Vec<&'static str> {
        let ordered = [
            (Self::ABSTRACT, "abstract"),
            (Self::FINAL, "final"),
            (Self::PUBLIC, "public"),
            (Self::PROTECTED, "protected"),
            (Self::PRIVATE, "private"),
            (Self::STATIC, "static"),
            (Self::READONLY, "readonly"),
        ];
        ordered
            .into_iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, keyword)| keyword)
            .collect()
    }
}

impl BitOr for Modifiers {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for Modifiers {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.keywords().join(" "))
    }
}
