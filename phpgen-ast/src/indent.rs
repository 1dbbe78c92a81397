//! Indentation unit of printed PHP.

const SPACES: &str = "        ";

/// One indentation level: a run of spaces or a tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indent {
    /// Width in spaces, at most 8.
    Spaces(u8),
    Tab,
}

impl Indent {
    /// Four spaces, as PSR-12 asks.
    pub const PSR12: Self = Self::Spaces(4);

    /// Width as written in `phpgen.toml`; `0` selects tabs.
    pub fn from_width(width: u8) -> Self {
        match width {
            0 => Self::Tab,
            n => Self::Spaces(n),
        }
    }

    /// Text of one level. Widths above 8 are clamped.
    pub fn unit(&self) -> &'static str {
        match self {
            Self::Spaces(width) => &SPACES[..usize::from(*width).min(SPACES.len())],
            Self::Tab => "\t",
        }
    }
}

impl Default for Indent {
    fn default() -> Self {
        Self::PSR12
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit() {
        assert_eq!(Indent::Spaces(2).unit(), "  ");
        assert_eq!(Indent::PSR12.unit(), "    ");
        assert_eq!(Indent::Spaces(12).unit().len(), 8);
        assert_eq!(Indent::Tab.unit(), "\t");
    }

    #[test]
    fn test_from_width() {
        assert_eq!(Indent::from_width(0), Indent::Tab);
        assert_eq!(Indent::from_width(2), Indent::Spaces(2));
        assert_eq!(Indent::default(), Indent::PSR12);
    }
}
