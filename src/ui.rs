pub mod charting;
pub mod polar;
pub mod screen;

use std::error::Error as _;
use std::time::Instant;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Clear, Dataset, GraphType, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthChar;

use rhophi::{form::InputForm, series::Sample, Mode, SessionPhase, Trainer};

use crate::App;
use charting::{format_label, strip_x_bounds, StripScale};
use polar::PolarView;
use screen::current_screen;

const SIDE_PANEL_WIDTH: u16 = 30;
const STRIP_HEIGHT: u16 = 9;
const FIELD_MAX_WIDTH: usize = 32;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let trainer = &self.trainer;
        let screen = current_screen(trainer.mode());

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(6),
                Constraint::Length(if screen.shows_strip() {
                    STRIP_HEIGHT
                } else {
                    0
                }),
                Constraint::Length(3), // form
                Constraint::Length(1), // status
                Constraint::Length(1), // legend
            ])
            .split(area);

        let main = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(10), Constraint::Length(SIDE_PANEL_WIDTH)])
            .split(chunks[0]);

        PolarView::new(trainer).render(main[0], buf);
        render_hud(trainer, main[1], buf);

        if trainer.phase() == SessionPhase::CountingDown {
            render_countdown(trainer, main[0], buf);
        }

        if screen.shows_strip() {
            render_strip(trainer, chunks[1], buf);
        }

        render_form(
            screen.form(self),
            screen.form_title(),
            chunks[2],
            buf,
        );

        render_status(self, chunks[3], buf);

        Paragraph::new(Span::styled(
            screen.legend(),
            Style::default().add_modifier(Modifier::ITALIC),
        ))
        .render(chunks[4], buf);
    }
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}

fn render_hud(trainer: &Trainer, area: Rect, buf: &mut Buffer) {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let dim = Style::default().add_modifier(Modifier::DIM);
    let point = trainer.point();
    let (x, y) = point.to_cartesian();

    let mut lines = vec![
        Line::from(vec![
            Span::styled("ρ = ", dim),
            Span::styled(format!("{:.1}", point.radius), bold),
        ]),
        Line::from(vec![
            Span::styled("φ = ", dim),
            Span::styled(format!("{:.1}°", point.phase.to_degrees()), bold),
        ]),
        Line::from(vec![
            Span::styled("x = ", dim),
            Span::styled(format!("{x:.1}"), bold),
        ]),
        Line::from(vec![
            Span::styled("y = ", dim),
            Span::styled(format!("{y:.1}"), bold),
        ]),
        Line::default(),
        Line::from(format!("continue: {}", on_off(trainer.continue_moving()))),
    ];

    match trainer.mode() {
        Mode::Target => {
            let (tx, ty) = trainer.target();
            lines.push(Line::from(format!("target: ({tx:.0}, {ty:.0})")));
            lines.push(Line::from(format!(
                "distance: {:.1}",
                (x - tx).hypot(y - ty)
            )));
            if trainer.is_animating() {
                lines.push(Line::from(Span::styled("moving…", dim)));
            }
        }
        Mode::Exercise => {
            lines.push(Line::from(format!("state: {}", trainer.phase())));
            lines.push(Line::from(format!(
                "reference: {}",
                on_off(trainer.show_reference())
            )));
            lines.push(Line::from(format!(
                "ρ(φ) = {}",
                clip(&trainer.config().expression, FIELD_MAX_WIDTH)
            )));
            if let Some(score) = trainer.score() {
                let color = if score.is_good() {
                    Color::Green
                } else {
                    Color::Red
                };
                lines.push(Line::default());
                lines.push(Line::from(Span::styled(
                    format!("Accuracy: {:.1}%", score.display_percent()),
                    bold.fg(color),
                )));
                lines.push(Line::from(Span::styled(score.verdict(), bold.fg(color))));
            }
        }
    }

    Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" HUD "))
        .wrap(Wrap { trim: true })
        .render(area, buf);
}

fn countdown_area(area: Rect) -> Rect {
    let width = area.width.saturating_sub(4).min(44);
    let height = area.height.min(4);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

fn render_countdown(trainer: &Trainer, area: Rect, buf: &mut Buffer) {
    let remaining = trainer.countdown_remaining(Instant::now()).unwrap_or(0);
    let message = trainer.countdown_message().unwrap_or_default();
    let count = if remaining > 0 {
        remaining.to_string()
    } else {
        "Go!".to_string()
    };

    let popup = countdown_area(area);
    Clear.render(popup, buf);
    Paragraph::new(vec![
        Line::from(message),
        Line::from(Span::styled(
            count,
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(Block::default().borders(Borders::ALL))
    .render(popup, buf);
}

fn degrees(samples: &[Sample], scale: &StripScale) -> Vec<(f64, f64)> {
    samples
        .iter()
        .filter(|s| s.radius.is_finite())
        .map(|s| (s.phase.to_degrees(), scale.project(s.radius)))
        .collect()
}

fn render_strip(trainer: &Trainer, area: Rect, buf: &mut Buffer) {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let block = Block::default().borders(Borders::ALL).title(" ρ over φ ");

    let values = trainer
        .true_pts()
        .iter()
        .chain(trainer.user_pts())
        .map(|s| s.radius);
    let Some(scale) = StripScale::new(values) else {
        Paragraph::new(Span::styled(
            "(s)tart an exercise to trace ρ over φ",
            Style::default().add_modifier(Modifier::DIM),
        ))
        .alignment(Alignment::Center)
        .block(block)
        .render(area, buf);
        return;
    };

    let truth = degrees(trainer.true_pts(), &scale);
    let user = degrees(trainer.user_pts(), &scale);
    let cfg = trainer.config();
    let x_bounds = strip_x_bounds(cfg.phi_from.to_degrees(), cfg.phi_to.to_degrees());

    let datasets = vec![
        Dataset::default()
            .name("ρ(φ)")
            .marker(Marker::Braille)
            .style(Style::default().fg(Color::Rgb(255, 165, 0)))
            .graph_type(GraphType::Line)
            .data(&truth),
        Dataset::default()
            .name("you")
            .marker(Marker::Braille)
            .style(Style::default().fg(Color::Cyan))
            .graph_type(GraphType::Line)
            .data(&user),
    ];

    let y_labels = scale
        .tick_values(2)
        .into_iter()
        .map(|v| Span::styled(format_label(v.round()), bold))
        .collect::<Vec<_>>();

    Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .title("φ°")
                .bounds(x_bounds)
                .labels(vec![
                    Span::styled(format_label(x_bounds[0].round()), bold),
                    Span::styled(format_label(x_bounds[1].round()), bold),
                ]),
        )
        .y_axis(
            Axis::default()
                .title(if scale.log { "ρ (log)" } else { "ρ" })
                .bounds(scale.bounds())
                .labels(y_labels),
        )
        .render(area, buf);
}

/// Truncate to `max` terminal columns, marking the cut with an ellipsis
fn clip(s: &str, max: usize) -> String {
    let mut width = 0;
    let mut out = String::new();
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if width + w > max.saturating_sub(1) {
            out.push('…');
            return out;
        }
        width += w;
        out.push(c);
    }
    out
}

fn render_form(form: &InputForm, title: &str, area: Rect, buf: &mut Buffer) {
    let mut spans = Vec::new();
    for (idx, field) in form.fields().iter().enumerate() {
        let focused = form.editing && idx == form.focus();
        let value_style = if focused {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        };
        if idx > 0 {
            spans.push(Span::raw("   "));
        }
        spans.push(Span::styled(
            format!("{} ", field.label),
            Style::default().add_modifier(Modifier::DIM),
        ));
        spans.push(Span::styled(clip(&field.value, FIELD_MAX_WIDTH), value_style));
    }

    let title = if form.editing {
        format!("{title}(tab next, enter apply, esc done) ")
    } else {
        format!("{title}(e to edit) ")
    };
    Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::ALL).title(title))
        .render(area, buf);
}

fn render_status(app: &App, area: Rect, buf: &mut Buffer) {
    let line = if let Some(err) = app.trainer.last_error() {
        let text = match err.source() {
            Some(cause) => format!("{err}: {cause}"),
            None => err.to_string(),
        };
        Span::styled(
            text,
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )
    } else if let Some(status) = &app.status {
        Span::styled(
            status.as_str(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::ITALIC),
        )
    } else {
        Span::raw("")
    };
    Paragraph::new(line).render(area, buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rhophi::{config::Config, ExerciseInputs};
    use std::time::Duration;

    fn create_test_app() -> App {
        App::with_trainer(Trainer::with_seed(11), Config::default(), None)
    }

    fn rendered(app: &App, w: u16, h: u16) -> String {
        let area = Rect::new(0, 0, w, h);
        let mut buffer = Buffer::empty(area);
        app.render(area, &mut buffer);
        buffer.content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn test_target_screen_shows_hud_and_legend() {
        let app = create_test_app();
        let out = rendered(&app, 120, 40);
        assert!(out.contains("ρ = 100.0"));
        assert!(out.contains("φ = 0.0°"));
        assert!(out.contains("target:"));
        assert!(out.contains("Go to"));
        assert!(out.contains("(g)o to"));
    }

    #[test]
    fn test_exercise_screen_before_start() {
        let mut app = create_test_app();
        app.trainer.switch_mode(Mode::Exercise);
        let out = rendered(&app, 120, 40);
        assert!(out.contains("state: Idle"));
        assert!(out.contains("to trace ρ over φ"));
        assert!(out.contains("200*sin(3*phi)"));
    }

    #[test]
    fn test_countdown_overlay() {
        let mut app = create_test_app();
        app.trainer
            .start_from_inputs(&ExerciseInputs::default())
            .unwrap();
        let out = rendered(&app, 120, 40);
        assert!(out.contains("Get ready!"));
        assert!(out.contains('3') || out.contains('2'));
    }

    #[test]
    fn test_score_shown_when_done() {
        let mut app = create_test_app();
        let inputs = ExerciseInputs {
            expression: "100".into(),
            phi_from_deg: "0".into(),
            phi_to_deg: "1".into(),
            speed_deg: "0.5".into(),
            radius_step: "3".into(),
        };
        let t0 = Instant::now();
        app.trainer.start_from_inputs_at(&inputs, t0).unwrap();
        let later = t0 + Duration::from_secs(4);
        for _ in 0..10 {
            app.trainer.on_tick_at(later);
        }
        assert!(app.trainer.is_finished());

        let out = rendered(&app, 120, 40);
        assert!(out.contains("Accuracy: 100.0%"));
        assert!(out.contains("Great job!"));
    }

    #[test]
    fn test_error_line_includes_cause() {
        let mut app = create_test_app();
        let inputs = ExerciseInputs {
            expression: "foo(phi)".into(),
            ..ExerciseInputs::default()
        };
        assert!(app.trainer.start_from_inputs(&inputs).is_err());
        let out = rendered(&app, 160, 40);
        assert!(out.contains("Invalid ρ(φ) expression:"));
    }

    #[test]
    fn test_small_area_renders_without_panic() {
        let mut app = create_test_app();
        rendered(&app, 10, 5);
        app.trainer.switch_mode(Mode::Exercise);
        rendered(&app, 20, 8);
        rendered(&app, 1, 1);
    }

    #[test]
    fn test_clip() {
        assert_eq!(clip("short", 10), "short");
        assert_eq!(clip("abcdefghij", 5), "abcd…");
        assert_eq!(clip("", 5), "");
    }
}
