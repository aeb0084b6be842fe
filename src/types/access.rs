use std::fmt::{Debug, Formatter};
use std::ops::{BitAnd, BitOr};

/// Class access and property flags (JVMS §4.1, Table 4.1-B, plus the nested
/// class flags of Table 4.7.6-A).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AccessFlags(u16);

impl AccessFlags {
    pub const PUBLIC: Self = Self(0x0001);
    pub const PRIVATE: Self = Self(0x0002);
    pub const PROTECTED: Self = Self(0x0004);
    pub const STATIC: Self = Self(0x0008);
    pub const FINAL: Self = Self(0x0010);
    pub const SUPER: Self = Self(0x0020);
    pub const INTERFACE: Self = Self(0x0200);
    pub const ABSTRACT: Self = Self(0x0400);
    pub const SYNTHETIC: Self = Self(0x1000);
    pub const ANNOTATION: Self = Self(0x2000);
    pub const ENUM: Self = Self(0x4000);

    pub const VISIBILITY: Self = Self(0x0001 | 0x0002 | 0x0004);

    pub const fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u16 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    #[must_use]
    pub const fn without(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    /// The value `Class.getModifiers()` reports: `ACC_SUPER` only has meaning
    /// to `invokespecial` and shares its bit with `synchronized`.
    pub const fn modifiers(self) -> i32 {
        self.without(Self::SUPER).0 as i32
    }
}

impl BitOr for AccessFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitAnd for AccessFlags {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl Debug for AccessFlags {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        const NAMES: [(AccessFlags, &str); 11] = [
            (AccessFlags::PUBLIC, "public"),
            (AccessFlags::PRIVATE, "private"),
            (AccessFlags::PROTECTED, "protected"),
            (AccessFlags::STATIC, "static"),
            (AccessFlags::FINAL, "final"),
            (AccessFlags::SUPER, "super"),
            (AccessFlags::INTERFACE, "interface"),
            (AccessFlags::ABSTRACT, "abstract"),
            (AccessFlags::SYNTHETIC, "synthetic"),
            (AccessFlags::ANNOTATION, "annotation"),
            (AccessFlags::ENUM, "enum"),
        ];
        let mut list = f.debug_list();
        for (flag, name) in NAMES {
            if self.contains(flag) {
                list.entry(&format_args!("{name}"));
            }
        }
        list.finish()
    }
}
