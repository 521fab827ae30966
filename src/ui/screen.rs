use ratatui::Frame;

use rhophi::{form::InputForm, Mode};

use crate::App;

/// A UI screen boundary: one per trainer mode
pub trait Screen {
    /// Key hints for the bottom line
    fn legend(&self) -> &'static str;
    fn form_title(&self) -> &'static str;
    fn form<'a>(&self, app: &'a App) -> &'a InputForm;
    /// Whether the ρ-over-φ strip plot gets a row
    fn shows_strip(&self) -> bool;

    fn render(&self, app: &App, f: &mut Frame) {
        f.render_widget(app, f.area());
    }
}

/// Free movement towards a random target
pub struct TargetScreen;

impl Screen for TargetScreen {
    fn legend(&self) -> &'static str {
        "←/→ rotate  ↑/↓ ρ  (g)o to  (t)arget  (space) continue  (e)dit  (m)ode  (q)uit"
    }

    fn form_title(&self) -> &'static str {
        " Go to "
    }

    fn form<'a>(&self, app: &'a App) -> &'a InputForm {
        &app.goto_form
    }

    fn shows_strip(&self) -> bool {
        false
    }
}

/// Sweep exercise against a formula
pub struct ExerciseScreen;

impl Screen for ExerciseScreen {
    fn legend(&self) -> &'static str {
        "(s)tart  (r)eset  ↑/↓ ρ  (o) reference  (space) continue  (e)dit  (m)ode  (q)uit"
    }

    fn form_title(&self) -> &'static str {
        " Exercise "
    }

    fn form<'a>(&self, app: &'a App) -> &'a InputForm {
        &app.exercise_form
    }

    fn shows_strip(&self) -> bool {
        true
    }
}

/// Helper to construct the screen for the current mode
pub fn current_screen(mode: Mode) -> Box<dyn Screen> {
    match mode {
        Mode::Target => Box::new(TargetScreen),
        Mode::Exercise => Box::new(ExerciseScreen),
    }
}
