//! Reusable UI components

pub mod help_overlay;
pub mod keybindings;

use ratatui::layout::Rect;

/// A rectangle `percent_x` wide and `height` tall, centered in `area`.
///
/// Width is clamped to the dialog limits from the theme and never exceeds
/// `area`.
pub fn centered_rect(percent_x: u16, height: u16, area: Rect) -> Rect {
    use crate::theme::UiConstants;

    let scaled = u32::from(area.width) * u32::from(percent_x) / 100;
    let width = u16::try_from(scaled)
        .unwrap_or(u16::MAX)
        .clamp(UiConstants::DIALOG_MIN_WIDTH, UiConstants::DIALOG_MAX_WIDTH)
        .min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}
