use bevy::reflect::Reflect;

/// Where an effector currently sits between FK passthrough and full IK.
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub enum IkFkBlendState {
    Fk,
    Ik,
    BlendingIn { elapsed: f32 },
    BlendingOut { elapsed: f32 },
}

/// Timed IK/FK blending state machine for a single effector.
///
/// Enabling or disabling the effector starts a blend over the configured
/// duration; toggling mid-blend reverses direction without a weight jump.
/// A duration of zero snaps.
#[derive(Reflect, Debug, Clone)]
pub struct IkFkBlend {
    state: IkFkBlendState,
    duration: f32,
}

impl IkFkBlend {
    pub fn new(enabled: bool, duration: f32) -> Self {
        Self {
            state: if enabled {
                IkFkBlendState::Ik
            } else {
                IkFkBlendState::Fk
            },
            duration: duration.max(0.0),
        }
    }

    pub fn state(&self) -> IkFkBlendState {
        self.state
    }

    pub fn enabled(&self) -> bool {
        matches!(
            self.state,
            IkFkBlendState::Ik | IkFkBlendState::BlendingIn { .. }
        )
    }

    /// Multiplier for the IK result over the FK input, in `[0, 1]`.
    pub fn weight(&self) -> f32 {
        match self.state {
            IkFkBlendState::Fk => 0.0,
            IkFkBlendState::Ik => 1.0,
            IkFkBlendState::BlendingIn { elapsed } => (elapsed / self.duration).clamp(0.0, 1.0),
            IkFkBlendState::BlendingOut { elapsed } => {
                1.0 - (elapsed / self.duration).clamp(0.0, 1.0)
            }
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        if enabled == self.enabled() {
            return;
        }
        if self.duration <= 0.0 {
            self.state = if enabled {
                IkFkBlendState::Ik
            } else {
                IkFkBlendState::Fk
            };
            return;
        }
        self.state = match (self.state, enabled) {
            (IkFkBlendState::Fk, true) => IkFkBlendState::BlendingIn { elapsed: 0.0 },
            (IkFkBlendState::Ik, false) => IkFkBlendState::BlendingOut { elapsed: 0.0 },
            // Reverse mid-blend, mirroring elapsed time so weight is continuous.
            (IkFkBlendState::BlendingOut { elapsed }, true) => IkFkBlendState::BlendingIn {
                elapsed: (self.duration - elapsed).max(0.0),
            },
            (IkFkBlendState::BlendingIn { elapsed }, false) => IkFkBlendState::BlendingOut {
                elapsed: (self.duration - elapsed).max(0.0),
            },
            (state, _) => state,
        };
    }

    /// Advances any running blend; completed blends settle on the steady
    /// state.
    pub fn tick(&mut self, dt: f32) {
        self.state = match self.state {
            IkFkBlendState::BlendingIn { elapsed } => {
                let elapsed = elapsed + dt;
                if elapsed >= self.duration {
                    IkFkBlendState::Ik
                } else {
                    IkFkBlendState::BlendingIn { elapsed }
                }
            }
            IkFkBlendState::BlendingOut { elapsed } => {
                let elapsed = elapsed + dt;
                if elapsed >= self.duration {
                    IkFkBlendState::Fk
                } else {
                    IkFkBlendState::BlendingOut { elapsed }
                }
            }
            state => state,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_in_steady_state() {
        assert_eq!(IkFkBlend::new(false, 0.2).weight(), 0.0);
        assert_eq!(IkFkBlend::new(true, 0.2).weight(), 1.0);
    }

    #[test]
    fn blend_in_progresses_and_settles() {
        let mut blend = IkFkBlend::new(false, 0.5);
        blend.set_enabled(true);
        assert_eq!(blend.weight(), 0.0);
        blend.tick(0.25);
        assert!((blend.weight() - 0.5).abs() < 1e-6);
        blend.tick(0.3);
        assert_eq!(blend.state(), IkFkBlendState::Ik);
        assert_eq!(blend.weight(), 1.0);
    }

    #[test]
    fn zero_duration_snaps() {
        let mut blend = IkFkBlend::new(false, 0.0);
        blend.set_enabled(true);
        assert_eq!(blend.state(), IkFkBlendState::Ik);
    }

    #[test]
    fn reversing_mid_blend_keeps_weight_continuous() {
        let mut blend = IkFkBlend::new(false, 1.0);
        blend.set_enabled(true);
        blend.tick(0.3);
        let before = blend.weight();
        blend.set_enabled(false);
        assert!((blend.weight() - before).abs() < 1e-6);
        blend.tick(0.3);
        assert!(blend.weight() < before);
        blend.tick(1.0);
        assert_eq!(blend.state(), IkFkBlendState::Fk);
    }

    #[test]
    fn redundant_set_enabled_is_ignored() {
        let mut blend = IkFkBlend::new(true, 1.0);
        blend.set_enabled(true);
        assert_eq!(blend.state(), IkFkBlendState::Ik);
    }
}
