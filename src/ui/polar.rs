use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::Span,
    widgets::{
        canvas::{Canvas, Circle, Context, Line as CanvasLine, Points},
        Block, Borders, Widget,
    },
};

use rhophi::{
    celebration::CELEBRATION_MESSAGE,
    series::Sample,
    target::{PLANE_HEIGHT, PLANE_WIDTH, REACH_THRESHOLD},
    Mode, Trainer,
};

use super::charting::{grid_radius, plane_bounds, ring_radii, spoke_angles};

const GRID_COLOR: Color = Color::DarkGray;
const REFERENCE_COLOR: Color = Color::Rgb(255, 165, 0);
const TRACE_COLOR: Color = Color::Cyan;
const POINT_COLOR: Color = Color::White;
const TARGET_COLOR: Color = Color::Red;

/// The polar plane: grid, current point, and the per-mode overlays
pub struct PolarView<'a> {
    trainer: &'a Trainer,
}

impl<'a> PolarView<'a> {
    pub fn new(trainer: &'a Trainer) -> Self {
        Self { trainer }
    }

    /// Outer grid ring for what is on screen right now
    fn grid_radius(&self) -> f64 {
        let t = self.trainer;
        let trace_peak = t.series().max_abs_radius();
        let reference_peak = if t.show_reference() {
            t.reference()
                .iter()
                .map(|s| s.radius.abs())
                .filter(|r| r.is_finite())
                .fold(None, |acc: Option<f64>, r| Some(acc.map_or(r, |m| m.max(r))))
        } else {
            None
        };
        let point_peak = Some(t.point().radius.abs());

        let peak = [trace_peak, reference_peak, point_peak]
            .into_iter()
            .flatten()
            .fold(None, |acc: Option<f64>, r| Some(acc.map_or(r, |m| m.max(r))));
        grid_radius(peak)
    }

    /// Half extents of the visible plane
    fn extents(&self, grid: f64) -> (f64, f64) {
        let margin = grid * 0.1;
        match self.trainer.mode() {
            Mode::Target => (
                (PLANE_WIDTH / 2.0).max(grid + margin),
                (PLANE_HEIGHT / 2.0).max(grid + margin),
            ),
            Mode::Exercise => (grid + margin, grid + margin),
        }
    }
}

fn draw_grid(ctx: &mut Context, outer: f64) {
    for r in ring_radii(outer) {
        ctx.draw(&Circle {
            x: 0.0,
            y: 0.0,
            radius: r,
            color: GRID_COLOR,
        });
    }
    for deg in spoke_angles() {
        let (s, c) = deg.to_radians().sin_cos();
        ctx.draw(&CanvasLine {
            x1: 0.0,
            y1: 0.0,
            x2: outer * c,
            y2: outer * s,
            color: GRID_COLOR,
        });
        ctx.print(
            outer * 1.04 * c,
            outer * 1.04 * s,
            Span::styled(format!("{deg:.0}°"), Style::default().fg(GRID_COLOR)),
        );
    }
}

fn cartesian(samples: &[Sample]) -> Vec<(f64, f64)> {
    samples
        .iter()
        .map(|s| s.to_cartesian())
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .collect()
}

fn draw_trace(ctx: &mut Context, coords: &[(f64, f64)], color: Color) {
    for pair in coords.windows(2) {
        ctx.draw(&CanvasLine {
            x1: pair[0].0,
            y1: pair[0].1,
            x2: pair[1].0,
            y2: pair[1].1,
            color,
        });
    }
    if coords.len() == 1 {
        ctx.draw(&Points { coords, color });
    }
}

fn spark_color(alpha: f64) -> Color {
    let a = alpha.clamp(0.0, 255.0) / 255.0;
    Color::Rgb((255.0 * a) as u8, (215.0 * a) as u8, 0)
}

impl Widget for PolarView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let t = self.trainer;
        let grid = self.grid_radius();
        let (half_w, half_h) = self.extents(grid);

        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" ρ(φ) · {} ", t.mode()));
        let inner = block.inner(area);
        let (x_bounds, y_bounds) = plane_bounds(inner, half_w, half_h);

        let reference = if t.mode() == Mode::Exercise && t.show_reference() {
            cartesian(t.revealed_reference())
        } else {
            Vec::new()
        };
        let trace = if t.mode() == Mode::Exercise {
            cartesian(t.user_pts())
        } else {
            Vec::new()
        };
        let point = t.point().to_cartesian();
        let point_visible = point.0.is_finite() && point.1.is_finite();

        Canvas::default()
            .block(block)
            .marker(Marker::Braille)
            .x_bounds(x_bounds)
            .y_bounds(y_bounds)
            .paint(|ctx| {
                draw_grid(ctx, grid);
                ctx.layer();

                draw_trace(ctx, &reference, REFERENCE_COLOR);
                draw_trace(ctx, &trace, TRACE_COLOR);

                if t.mode() == Mode::Target {
                    let (tx, ty) = t.target();
                    ctx.draw(&Circle {
                        x: tx,
                        y: ty,
                        radius: REACH_THRESHOLD,
                        color: TARGET_COLOR,
                    });
                    let fw = t.fireworks();
                    if fw.is_active && !fw.is_faded() {
                        let color = spark_color(fw.alpha());
                        for spark in &fw.sparks {
                            ctx.draw(&Circle {
                                x: spark.x,
                                y: spark.y,
                                radius: spark.size,
                                color,
                            });
                        }
                    }
                    if fw.is_active {
                        ctx.print(
                            tx,
                            ty + 60.0,
                            Span::styled(
                                CELEBRATION_MESSAGE,
                                Style::default()
                                    .fg(Color::Yellow)
                                    .add_modifier(Modifier::BOLD),
                            ),
                        );
                    }
                }
                ctx.layer();

                if point_visible {
                    ctx.draw(&CanvasLine {
                        x1: 0.0,
                        y1: 0.0,
                        x2: point.0,
                        y2: point.1,
                        color: POINT_COLOR,
                    });
                    ctx.draw(&Circle {
                        x: point.0,
                        y: point.1,
                        radius: 5.0,
                        color: POINT_COLOR,
                    });
                }
            })
            .render(area, buf);
    }
}
