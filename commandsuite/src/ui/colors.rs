/// Highlight palette for console output.
/// Pastel RGB values so the menu reads on both light and dark backgrounds.
use crate::token::TokenClass;
use crossterm::style::{Color, ResetColor, SetForegroundColor};

pub struct Palette;

impl Palette {
    /// RGB(255, 229, 180) - Peach
    pub const STRING: Color = Color::Rgb { r: 255, g: 229, b: 180 };

    /// RGB(182, 255, 182) - Mint Green
    pub const NUMBER: Color = Color::Rgb { r: 182, g: 255, b: 182 };

    /// RGB(169, 169, 169) - Dark Gray
    pub const PARAMETER: Color = Color::Rgb { r: 169, g: 169, b: 169 };

    /// RGB(152, 245, 225) - Aquamarine
    pub const VARIABLE: Color = Color::Rgb { r: 152, g: 245, b: 225 };

    /// RGB(255, 255, 160) - Pale Yellow
    pub const COMMAND: Color = Color::Rgb { r: 255, g: 255, b: 160 };

    pub const OPERATOR: Color = Color::Rgb { r: 200, g: 200, b: 200 };

    pub const MEMBER: Color = Color::Rgb { r: 230, g: 230, b: 250 };

    /// RGB(135, 206, 250) - Light Sky Blue
    pub const TYPE: Color = Color::Rgb { r: 135, g: 206, b: 250 };

    /// RGB(216, 191, 216) - Thistle
    pub const KEYWORD: Color = Color::Rgb { r: 216, g: 191, b: 216 };

    pub const DEFAULT: Color = Color::Rgb { r: 240, g: 240, b: 240 };

    /// RGB(255, 182, 193) - Light Pink
    pub const ERROR: Color = Color::Rgb { r: 255, g: 182, b: 193 };

    pub const WARNING: Color = Color::Rgb { r: 255, g: 229, b: 180 };

    pub const INFORMATION: Color = Color::Rgb { r: 135, g: 206, b: 250 };

    /// Highlight bar for the selected menu item
    pub const SELECTION: Color = Color::Rgb { r: 152, g: 245, b: 225 };

    pub fn for_class(class: TokenClass) -> Color {
        match class {
            TokenClass::String => Self::STRING,
            TokenClass::Number => Self::NUMBER,
            TokenClass::Parameter => Self::PARAMETER,
            TokenClass::Variable => Self::VARIABLE,
            TokenClass::Command => Self::COMMAND,
            TokenClass::Operator => Self::OPERATOR,
            TokenClass::Member => Self::MEMBER,
            TokenClass::Type => Self::TYPE,
            TokenClass::Keyword => Self::KEYWORD,
            TokenClass::Identifier | TokenClass::Default => Self::DEFAULT,
        }
    }
}

/// Escape sequence switching the foreground to `color`
pub fn fg(color: Color) -> String {
    SetForegroundColor(color).to_string()
}

pub fn reset() -> String {
    ResetColor.to_string()
}
