//! Color palette for the classroom preview.

use ratatui::style::Color;

/// Frame and panel borders (#3a4252)
pub const BORDER: Color = Color::Rgb(58, 66, 82);

/// Primary text - names and values (#e2e8f0)
pub const TEXT_PRIMARY: Color = Color::Rgb(226, 232, 240);

/// Secondary text - section headers (#94a3b8)
pub const TEXT_SECONDARY: Color = Color::Rgb(148, 163, 184);

/// Muted text - hints and accounts without a group (#64748b)
pub const TEXT_MUTED: Color = Color::Rgb(100, 116, 139);

/// Group tint palette. An account takes the color at its group's index in
/// the configuration, modulo the palette size.
pub const GROUP_COLORS: &[Color] = &[
    Color::Rgb(0, 212, 170),   // teal
    Color::Rgb(96, 165, 250),  // blue
    Color::Rgb(251, 191, 36),  // amber
    Color::Rgb(244, 114, 182), // pink
    Color::Rgb(167, 139, 250), // violet
    Color::Rgb(74, 222, 128),  // green
];

/// Resolve the tint for an account's group, falling back to muted text for
/// accounts without a recognized group.
pub fn group_color(groups: &[String], group: Option<&str>) -> Color {
    group
        .and_then(|name| groups.iter().position(|g| g == name))
        .map(|idx| GROUP_COLORS[idx % GROUP_COLORS.len()])
        .unwrap_or(TEXT_MUTED)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn groups(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn color_follows_group_index() {
        let groups = groups(&["Red", "Blue"]);
        assert_eq!(group_color(&groups, Some("Red")), GROUP_COLORS[0]);
        assert_eq!(group_color(&groups, Some("Blue")), GROUP_COLORS[1]);
    }

    #[test]
    fn index_wraps_around_the_palette() {
        let many: Vec<String> = (0..GROUP_COLORS.len() + 2).map(|i| format!("g{i}")).collect();
        let last = many.last().unwrap().clone();
        assert_eq!(group_color(&many, Some(&last)), GROUP_COLORS[1]);
    }

    #[test]
    fn unknown_or_missing_group_is_muted() {
        let groups = groups(&["Red"]);
        assert_eq!(group_color(&groups, Some("Green")), TEXT_MUTED);
        assert_eq!(group_color(&groups, None), TEXT_MUTED);
    }
}
