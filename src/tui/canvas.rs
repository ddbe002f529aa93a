//! Rasterises a recorded [`Scene`] onto a ratatui canvas.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols::Marker,
    text::Span,
    widgets::{
        canvas::{Canvas, Context, Line},
        Block,
    },
    Frame,
};

use super::theme::ThemeColors;
use crate::config::FieldConfig;
use crate::render::{Align, Primitive, Scene};

/// Canvas y grows upwards, the field's downwards.
fn flip(field: &FieldConfig, y: f32) -> f64 {
    (field.height - y) as f64
}

struct Raster<'a> {
    field: &'a FieldConfig,
    colors: &'a ThemeColors,
    /// Field units per braille dot row
    dot: f64,
    /// Field units per terminal column
    column: f64,
}

impl Raster<'_> {
    fn hline(&self, ctx: &mut Context<'_>, x1: f64, x2: f64, y: f64, color: Color) {
        ctx.draw(&Line {
            x1,
            y1: y,
            x2,
            y2: y,
            color,
        });
    }

    fn paint(&self, ctx: &mut Context<'_>, primitive: &Primitive) {
        match primitive {
            Primitive::Rect { min, size, ink } => {
                let color = self.colors.ink(*ink);
                let (x1, x2) = (min.x as f64, (min.x + size.x) as f64);
                let mut y = min.y as f64;
                while y <= (min.y + size.y) as f64 {
                    self.hline(ctx, x1, x2, flip(self.field, y as f32), color);
                    y += self.dot;
                }
            }
            Primitive::Ellipse { centre, radii, ink } => {
                let color = self.colors.ink(*ink);
                let (rx, ry) = (radii.x as f64, radii.y as f64);
                let mut dy = -ry;
                while dy <= ry {
                    let half = rx * (1.0 - (dy / ry).powi(2)).max(0.0).sqrt();
                    let y = flip(self.field, centre.y + dy as f32);
                    self.hline(ctx, centre.x as f64 - half, centre.x as f64 + half, y, color);
                    dy += self.dot;
                }
                self.hline(
                    ctx,
                    centre.x as f64 - rx,
                    centre.x as f64 + rx,
                    flip(self.field, centre.y),
                    color,
                );
            }
            Primitive::Line { from, to, ink } => ctx.draw(&Line {
                x1: from.x as f64,
                y1: flip(self.field, from.y),
                x2: to.x as f64,
                y2: flip(self.field, to.y),
                color: self.colors.ink(*ink),
            }),
            Primitive::Text {
                at,
                text,
                align,
                ink,
            } => {
                let width = text.chars().count() as f64 * self.column;
                let x = match align {
                    Align::Left => at.x as f64,
                    Align::Centre => at.x as f64 - width / 2.0,
                    Align::Right => at.x as f64 - width,
                };
                ctx.print(
                    x.max(0.0),
                    flip(self.field, at.y),
                    Span::styled(text.clone(), Style::default().fg(self.colors.ink(*ink))),
                );
            }
        }
    }
}

pub fn render_scene(
    frame: &mut Frame,
    area: Rect,
    block: Block<'_>,
    scene: &Scene,
    field: &FieldConfig,
    colors: &ThemeColors,
) {
    let inner = block.inner(area);
    let raster = Raster {
        field,
        colors,
        dot: field.height as f64 / (inner.height.max(1) as f64 * 4.0),
        column: field.width as f64 / inner.width.max(1) as f64,
    };
    let canvas = Canvas::default()
        .block(block)
        .marker(Marker::Braille)
        .background_color(colors.background)
        .x_bounds([0.0, field.width as f64])
        .y_bounds([0.0, field.height as f64])
        .paint(|ctx| {
            for primitive in scene.primitives() {
                raster.paint(ctx, primitive);
            }
        });
    frame.render_widget(canvas, area);
}
