use ratatui::layout::{Margin, Rect};

use crate::config::FieldConfig;

pub fn centered_rect_with_percentage(percent_x: u16, percent_y: u16, cols: u16, rows: u16) -> Rect {
    let width = cols * percent_x / 100;
    let height = std::cmp::min(std::cmp::max(rows * percent_y / 100, 5), rows);
    Rect::new((cols - width) / 2, (rows - height) / 2, width, height)
}

/// A `width`×`height` rect centred in `area`, shrunk to fit.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let actual_width = width.min(area.width);
    let actual_height = height.min(area.height);
    Rect::new(
        area.x + (area.width - actual_width) / 2,
        area.y + (area.height - actual_height) / 2,
        actual_width,
        actual_height,
    )
}

/// Largest rect inside `area` showing a field of `field_w`×`field_h` without
/// distortion. Terminal cells are about twice as tall as they are wide.
pub fn field_rect(area: Rect, field_w: f32, field_h: f32) -> Rect {
    let wide = field_w * 2.0;
    let by_width = (area.width as f32 * field_h / wide).floor() as u16;
    if by_width <= area.height {
        centered_rect(area.width, by_width.max(1), area)
    } else {
        let width = (area.height as f32 * wide / field_h).floor() as u16;
        centered_rect(width.max(1), area.height, area)
    }
}

/// The field plus a one-cell border, as large as fits in `area`.
pub fn framed_field(area: Rect, field: &FieldConfig) -> Rect {
    let inner = field_rect(area.inner(Margin::new(1, 1)), field.width, field.height);
    Rect::new(
        inner.x.saturating_sub(1),
        inner.y.saturating_sub(1),
        inner.width + 2,
        inner.height + 2,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centred_rect_never_exceeds_the_area() {
        let area = Rect::new(2, 1, 40, 10);
        assert_eq!(centered_rect(20, 4, area), Rect::new(12, 4, 20, 4));
        assert_eq!(centered_rect(100, 100, area), area);
    }

    #[test]
    fn field_keeps_its_shape() {
        let rect = field_rect(Rect::new(0, 0, 160, 80), 800.0, 500.0);
        assert_eq!(rect.width, 160);
        assert_eq!(rect.height, 50);
        let rect = field_rect(Rect::new(0, 0, 300, 40), 800.0, 500.0);
        assert_eq!(rect.height, 40);
        assert_eq!(rect.width, 128);
    }
}
