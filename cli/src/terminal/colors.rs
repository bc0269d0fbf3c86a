use colored::Color;

pub const PRIMARY: Color = Color::TrueColor { r: 120, g: 200, b: 255 };
pub const ACCENT: Color = Color::TrueColor { r: 255, g: 170, b: 60 };
pub const SEPARATOR: Color = Color::TrueColor { r: 110, g: 110, b: 110 };
pub const TEXT_DEFAULT: Color = Color::TrueColor { r: 220, g: 220, b: 220 };
pub const IPV4_ADDR: Color = Color::TrueColor { r: 130, g: 230, b: 150 };
pub const SUCCESS: Color = Color::TrueColor { r: 80, g: 220, b: 100 };
pub const FAILURE: Color = Color::TrueColor { r: 240, g: 80, b: 80 };
