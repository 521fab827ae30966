use crate::session::ExerciseInputs;

/// One labelled text input
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub label: &'static str,
    pub value: String,
}

impl Field {
    fn new(label: &'static str, value: impl Into<String>) -> Self {
        Self {
            label,
            value: value.into(),
        }
    }
}

/// A row of text inputs edited in place; Tab moves focus
#[derive(Debug, Clone, PartialEq)]
pub struct InputForm {
    fields: Vec<Field>,
    focus: usize,
    pub editing: bool,
}

const EXPRESSION: usize = 0;
const PHI_FROM: usize = 1;
const PHI_TO: usize = 2;
const SPEED: usize = 3;
const RADIUS_STEP: usize = 4;

const GOTO_RADIUS: usize = 0;
const GOTO_ANGLE: usize = 1;

impl InputForm {
    /// The exercise drawer: ρ(φ), φ range, sweep speed and ρ step
    pub fn exercise(inputs: &ExerciseInputs) -> Self {
        Self {
            fields: vec![
                Field::new("ρ(φ) =", inputs.expression.as_str()),
                Field::new("φ from (°)", inputs.phi_from_deg.as_str()),
                Field::new("φ to (°)", inputs.phi_to_deg.as_str()),
                Field::new("speed (°/tick)", inputs.speed_deg.as_str()),
                Field::new("ρ step", inputs.radius_step.as_str()),
            ],
            focus: 0,
            editing: false,
        }
    }

    /// The go-to panel of Target mode
    pub fn goto() -> Self {
        Self {
            fields: vec![Field::new("ρ", "100"), Field::new("φ (°)", "45")],
            focus: 0,
            editing: false,
        }
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn focus(&self) -> usize {
        self.focus
    }

    pub fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % self.fields.len();
    }

    pub fn focus_prev(&mut self) {
        self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
    }

    pub fn insert(&mut self, c: char) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            field.value.push(c);
        }
    }

    pub fn backspace(&mut self) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            field.value.pop();
        }
    }

    pub fn clear_focused(&mut self) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            field.value.clear();
        }
    }

    fn value(&self, idx: usize) -> String {
        self.fields
            .get(idx)
            .map(|f| f.value.clone())
            .unwrap_or_default()
    }

    pub fn exercise_inputs(&self) -> ExerciseInputs {
        ExerciseInputs {
            expression: self.value(EXPRESSION),
            phi_from_deg: self.value(PHI_FROM),
            phi_to_deg: self.value(PHI_TO),
            speed_deg: self.value(SPEED),
            radius_step: self.value(RADIUS_STEP),
        }
    }

    /// Destination radius and angle in degrees, if both parse
    pub fn goto_values(&self) -> Option<(f64, f64)> {
        let radius = self.value(GOTO_RADIUS).trim().parse::<f64>().ok()?;
        let angle = self.value(GOTO_ANGLE).trim().parse::<f64>().ok()?;
        Some((radius, angle))
    }
}
