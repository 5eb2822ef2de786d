use ratatui::style::Color;

pub struct Theme {
    pub bg: Color,
    pub fg: Color,
    pub primary: Color,   // Blue
    pub secondary: Color, // Orange
    pub comment: Color,   // Grey
    pub success: Color,   // Green
    pub error: Color,     // Red
    pub border_focused: Color,
    pub border_normal: Color,
    pub current_line_bg: Color,
    pub function: Color,
    pub type_name: Color,    // Cyan for type names
    pub return_value: Color, // Special color for return values
    pub frame_bg: Color,
    pub return_bg: Color,
    pub value_bg: Color,
    pub value_fg: Color,
    pub object_bg: Color,
    pub arrow: Color,
}

pub const DEFAULT_THEME: Theme = Theme {
    bg: Color::Rgb(30, 30, 46),
    fg: Color::Rgb(205, 214, 244),
    primary: Color::Rgb(137, 180, 250),   // Blue
    secondary: Color::Rgb(250, 179, 135), // Orange
    comment: Color::Rgb(108, 112, 134),
    success: Color::Rgb(166, 227, 161),
    error: Color::Rgb(243, 139, 168),
    border_focused: Color::Rgb(249, 226, 175), // Yellow border for the active frame
    border_normal: Color::Rgb(108, 112, 134),  // Grey border for everything else
    current_line_bg: Color::Rgb(50, 50, 70),   // Slightly lighter BG for the status bar
    function: Color::Rgb(249, 226, 175),       // Yellow for frame signatures
    type_name: Color::Rgb(148, 226, 213),      // Cyan/teal for object titles
    return_value: Color::Rgb(245, 194, 231),   // Pink for return values
    frame_bg: Color::Rgb(40, 40, 58),
    return_bg: Color::Rgb(69, 71, 90),    // Greyed out, the box is transient
    value_bg: Color::Rgb(24, 24, 37),     // Sunken value cells
    value_fg: Color::Rgb(166, 227, 161),  // Green for literal values
    object_bg: Color::Rgb(72, 48, 62),    // Muted rose heap boxes
    arrow: Color::Rgb(137, 180, 250),
};
