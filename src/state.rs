/// Angle unit used by trigonometric and hyperbolic functions
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Radian,
    Degree,
}

impl Default for Mode {
    fn default() -> Mode {
        Mode::Radian
    }
}

impl Mode {
    /// Numeric code returned by `tog` and `mode`: 0 - radian, 1 - degree
    pub fn code(self) -> f64 {
        match self {
            Mode::Radian => 0.0,
            Mode::Degree => 1.0,
        }
    }

    pub fn toggled(self) -> Mode {
        match self {
            Mode::Radian => Mode::Degree,
            Mode::Degree => Mode::Radian,
        }
    }

    // argument of a forward function, converted to radians
    pub(crate) fn angle_in(self, x: f64) -> f64 {
        match self {
            Mode::Radian => x,
            Mode::Degree => x.to_radians(),
        }
    }

    // result of an inverse function, converted from radians
    pub(crate) fn angle_out(self, x: f64) -> f64 {
        match self {
            Mode::Radian => x,
            Mode::Degree => x.to_degrees(),
        }
    }
}

/// holds the current state of the engine: angle mode and the result of the
/// last successful evaluation (available in expressions as `ans`)
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CalcState {
    mode: Mode,
    ans: Option<f64>,
}

impl CalcState {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_mode(mode: Mode) -> Self {
        CalcState { mode, ans: None }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    /// Flips the angle mode and returns the code of the new one
    pub fn toggle_mode(&mut self) -> f64 {
        self.mode = self.mode.toggled();
        self.mode.code()
    }

    /// Returns the result of the last successful evaluation
    pub fn result(&self) -> Option<f64> {
        self.ans
    }

    pub(crate) fn set_result(&mut self, v: f64) {
        self.ans = Some(v);
    }

    /// Restores radian mode and forgets the last result
    pub fn reset(&mut self) {
        *self = CalcState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle() {
        let mut state = CalcState::new();
        assert_eq!(state.mode(), Mode::Radian);
        assert_eq!(state.toggle_mode(), 1.0);
        assert_eq!(state.mode(), Mode::Degree);
        assert_eq!(state.toggle_mode(), 0.0);
        assert_eq!(state.mode(), Mode::Radian);
    }

    #[test]
    fn test_reset() {
        let mut state = CalcState::with_mode(Mode::Degree);
        state.set_result(42.0);
        assert_eq!(state.result(), Some(42.0));
        state.reset();
        assert_eq!(state.mode(), Mode::Radian);
        assert_eq!(state.result(), None);
    }

    #[test]
    fn test_angles() {
        assert_eq!(Mode::Radian.angle_in(2.0), 2.0);
        assert!((Mode::Degree.angle_in(180.0) - std::f64::consts::PI).abs() < 1e-12);
        assert!((Mode::Degree.angle_out(std::f64::consts::FRAC_PI_2) - 90.0).abs() < 1e-12);
    }
}
