//! Wave-driven attribute scaling.

use serde::{Deserialize, Serialize};

use crate::{Curve, WaveCurve, WaveNumber};

/// Smallest multiplier ever handed to a spawned entity.
pub const MIN_MULTIPLIER: f32 = 0.01;

/// Attribute multipliers applied once to a freshly spawned entity.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScalingModifiers {
    /// Multiplier for maximum health.
    pub health: f32,
    /// Multiplier for movement speed.
    pub move_speed: f32,
    /// Multiplier for attack rate.
    pub fire_rate: f32,
    /// Multiplier for outgoing damage.
    pub damage: f32,
    /// Multiplier for the reward granted on defeat or pickup.
    pub reward_value: f32,
}

impl ScalingModifiers {
    /// Modifiers that leave every attribute unchanged.
    pub const IDENTITY: Self = Self {
        health: 1.0,
        move_speed: 1.0,
        fire_rate: 1.0,
        damage: 1.0,
        reward_value: 1.0,
    };

    /// Iterator over the five multipliers in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = f32> {
        [
            self.health,
            self.move_speed,
            self.fire_rate,
            self.damage,
            self.reward_value,
        ]
        .into_iter()
    }
}

impl Default for ScalingModifiers {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Five independent curves mapping a wave number to attribute multipliers.
///
/// Unset or empty curves yield a multiplier of `1.0`; every other sample is
/// floored at [`MIN_MULTIPLIER`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScalingCurveSet {
    /// Curve for the health multiplier.
    pub health: Option<WaveCurve>,
    /// Curve for the movement speed multiplier.
    pub move_speed: Option<WaveCurve>,
    /// Curve for the attack rate multiplier.
    pub fire_rate: Option<WaveCurve>,
    /// Curve for the damage multiplier.
    pub damage: Option<WaveCurve>,
    /// Curve for the reward multiplier.
    pub reward_value: Option<WaveCurve>,
}

impl ScalingCurveSet {
    /// Scaling set that leaves every attribute unchanged.
    #[must_use]
    pub const fn identity() -> Self {
        Self {
            health: None,
            move_speed: None,
            fire_rate: None,
            damage: None,
            reward_value: None,
        }
    }

    /// Replaces the health curve.
    #[must_use]
    pub fn with_health(mut self, curve: WaveCurve) -> Self {
        self.health = Some(curve);
        self
    }

    /// Replaces the movement speed curve.
    #[must_use]
    pub fn with_move_speed(mut self, curve: WaveCurve) -> Self {
        self.move_speed = Some(curve);
        self
    }

    /// Replaces the attack rate curve.
    #[must_use]
    pub fn with_fire_rate(mut self, curve: WaveCurve) -> Self {
        self.fire_rate = Some(curve);
        self
    }

    /// Replaces the damage curve.
    #[must_use]
    pub fn with_damage(mut self, curve: WaveCurve) -> Self {
        self.damage = Some(curve);
        self
    }

    /// Replaces the reward curve.
    #[must_use]
    pub fn with_reward_value(mut self, curve: WaveCurve) -> Self {
        self.reward_value = Some(curve);
        self
    }

    /// Samples all five curves at the provided wave.
    #[must_use]
    pub fn evaluate(&self, wave: WaveNumber) -> ScalingModifiers {
        let x = f64::from(wave.get());
        ScalingModifiers {
            health: multiplier(self.health.as_ref(), x),
            move_speed: multiplier(self.move_speed.as_ref(), x),
            fire_rate: multiplier(self.fire_rate.as_ref(), x),
            damage: multiplier(self.damage.as_ref(), x),
            reward_value: multiplier(self.reward_value.as_ref(), x),
        }
    }
}

fn multiplier(curve: Option<&WaveCurve>, x: f64) -> f32 {
    let Some(curve) = curve.filter(|curve| !curve.is_empty()) else {
        return 1.0;
    };

    let value = curve.evaluate(x);
    if !value.is_finite() {
        return MIN_MULTIPLIER;
    }

    (value as f32).max(MIN_MULTIPLIER)
}
