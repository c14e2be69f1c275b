//! Display colors for prompts and completion lists

use core::fmt::Write;

use num_enum::IntoPrimitive;

#[derive(Debug, Eq, PartialEq, Copy, Clone, IntoPrimitive)]
#[repr(u8)]
pub enum BaseColor {
    Black = 0,
    Red = 1,
    Green = 2,
    Yellow = 3,
    Blue = 4,
    Magenta = 5,
    Cyan = 6,
    White = 7,
}

/// Text attributes, `Color::default()` is the terminal default
///
/// ```
/// use crossline::color::{BaseColor, Color};
///
/// let color = Color::fg(BaseColor::Green).bright();
/// assert_eq!(color.to_sgr(), "\x1b[0;1;32m");
/// ```
#[derive(Debug, Default, Eq, PartialEq, Copy, Clone)]
pub struct Color {
    pub foreground: Option<BaseColor>,
    pub background: Option<BaseColor>,
    pub bright: bool,
    pub underline: bool,
}

impl Color {
    pub const DEFAULT: Color = Color {
        foreground: None,
        background: None,
        bright: false,
        underline: false,
    };

    pub const fn fg(color: BaseColor) -> Self {
        Self {
            foreground: Some(color),
            ..Self::DEFAULT
        }
    }

    pub const fn bg(self, color: BaseColor) -> Self {
        Self {
            background: Some(color),
            ..self
        }
    }

    pub const fn bright(self) -> Self {
        Self {
            bright: true,
            ..self
        }
    }

    pub const fn underline(self) -> Self {
        Self {
            underline: true,
            ..self
        }
    }

    pub fn is_default(&self) -> bool {
        *self == Self::DEFAULT
    }

    /// ANSI select graphic rendition sequence for this color
    pub fn to_sgr(&self) -> String {
        let mut sgr = String::from("\x1b[0");

        if self.bright {
            sgr.push_str(";1");
        }

        if self.underline {
            sgr.push_str(";4");
        }

        if let Some(fg) = self.foreground {
            let _ = write!(sgr, ";3{}", u8::from(fg));
        }

        if let Some(bg) = self.background {
            let _ = write!(sgr, ";4{}", u8::from(bg));
        }

        sgr.push('m');
        sgr
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sgr() {
        assert_eq!(Color::DEFAULT.to_sgr(), "\x1b[0m");
        assert_eq!(Color::fg(BaseColor::Red).to_sgr(), "\x1b[0;31m");
        assert_eq!(
            Color::fg(BaseColor::Yellow)
                .bright()
                .bg(BaseColor::Blue)
                .underline()
                .to_sgr(),
            "\x1b[0;1;4;33;44m"
        );
    }

    #[test]
    fn default() {
        assert!(Color::default().is_default());
        assert!(!Color::fg(BaseColor::Black).is_default());
    }
}
