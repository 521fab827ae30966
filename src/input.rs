use crossterm::event::KeyCode;

/// Phase change per tick while a rotate key is held
pub const KEY_PHASE_STEP: f64 = 0.005;

/// One directional impulse; each held impulse applies one step per tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Impulse {
    IncreaseRadius,
    DecreaseRadius,
    RotateCounterClockwise,
    RotateClockwise,
}

impl Impulse {
    pub fn from_key(code: KeyCode) -> Option<Impulse> {
        match code {
            KeyCode::Up => Some(Impulse::IncreaseRadius),
            KeyCode::Down => Some(Impulse::DecreaseRadius),
            KeyCode::Left => Some(Impulse::RotateCounterClockwise),
            KeyCode::Right => Some(Impulse::RotateClockwise),
            _ => None,
        }
    }

    pub fn is_rotation(self) -> bool {
        matches!(
            self,
            Impulse::RotateClockwise | Impulse::RotateCounterClockwise
        )
    }
}

/// Impulses that are active for the coming tick.
///
/// Terminals only report presses (and auto-repeat), so a key counts as held
/// from its press until the next tick consumes it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeldImpulses {
    increase: bool,
    decrease: bool,
    ccw: bool,
    cw: bool,
}

impl HeldImpulses {
    pub fn press(&mut self, impulse: Impulse) {
        *self.slot(impulse) = true;
    }

    pub fn is_held(&self, impulse: Impulse) -> bool {
        match impulse {
            Impulse::IncreaseRadius => self.increase,
            Impulse::DecreaseRadius => self.decrease,
            Impulse::RotateCounterClockwise => self.ccw,
            Impulse::RotateClockwise => self.cw,
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.increase || self.decrease || self.ccw || self.cw)
    }

    /// Return the held set and clear it for the next tick
    pub fn take(&mut self) -> HeldImpulses {
        std::mem::take(self)
    }

    pub fn iter(&self) -> impl Iterator<Item = Impulse> + '_ {
        [
            Impulse::IncreaseRadius,
            Impulse::DecreaseRadius,
            Impulse::RotateCounterClockwise,
            Impulse::RotateClockwise,
        ]
        .into_iter()
        .filter(|i| self.is_held(*i))
    }

    fn slot(&mut self, impulse: Impulse) -> &mut bool {
        match impulse {
            Impulse::IncreaseRadius => &mut self.increase,
            Impulse::DecreaseRadius => &mut self.decrease,
            Impulse::RotateCounterClockwise => &mut self.ccw,
            Impulse::RotateClockwise => &mut self.cw,
        }
    }
}

/// Apply held impulses to a polar position.
///
/// Radius may go negative, which mirrors the point through the origin.
/// `allow_rotation` is false while a sweep owns the phase.
pub fn apply_impulses(
    held: &HeldImpulses,
    radius: &mut f64,
    phase: &mut f64,
    radius_step: f64,
    allow_rotation: bool,
) {
    for impulse in held.iter() {
        match impulse {
            Impulse::IncreaseRadius => *radius += radius_step,
            Impulse::DecreaseRadius => *radius -= radius_step,
            Impulse::RotateCounterClockwise if allow_rotation => *phase += KEY_PHASE_STEP,
            Impulse::RotateClockwise if allow_rotation => *phase -= KEY_PHASE_STEP,
            _ => {}
        }
    }
}
