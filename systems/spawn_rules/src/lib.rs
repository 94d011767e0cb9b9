#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Rule catalog deciding which templates may spawn on a wave and how many.
//!
//! A [`RuleCatalog`] pairs a shared default [`SpawnRule`] with per-template
//! [`TemplateOverride`] records. Resolving a template merges its override over
//! the default into a [`ResolvedRule`], whose eligibility predicate and count
//! resolution drive the wave planner. Out-of-range authoring values are
//! clamped when rules are built; evaluation never fails.

use horde_core::{Curve, ScalingCurveSet, TemplateId, WaveCurve, WaveNumber};
use rand::Rng;

/// Tolerance subtracted before rounding counts up so exact integers survive
/// floating point noise from interpolation.
const COUNT_EPSILON: f64 = 1e-9;

/// Timing, probability, count, and scaling settings for a template.
#[derive(Clone, Debug, PartialEq)]
pub struct SpawnRule {
    start_wave: u32,
    end_wave: i32,
    interval: u32,
    only_on_boss_waves: bool,
    is_boss: bool,
    spawn_chance: f64,
    count_curve: Option<WaveCurve>,
    pack: Option<f32>,
    scaling: Option<ScalingCurveSet>,
}

impl Default for SpawnRule {
    fn default() -> Self {
        Self {
            start_wave: 1,
            end_wave: 0,
            interval: 1,
            only_on_boss_waves: false,
            is_boss: false,
            spawn_chance: 1.0,
            count_curve: None,
            pack: None,
            scaling: None,
        }
    }
}

impl SpawnRule {
    /// Sets the first wave the rule applies to. Values below one clamp to one.
    #[must_use]
    pub fn with_start_wave(mut self, start_wave: u32) -> Self {
        self.start_wave = clamp_start_wave(start_wave);
        self
    }

    /// Sets the last wave the rule applies to. Zero or negative means unbounded.
    #[must_use]
    pub fn with_end_wave(mut self, end_wave: i32) -> Self {
        self.end_wave = end_wave;
        self
    }

    /// Sets the repeat interval in waves. Values below one clamp to one.
    #[must_use]
    pub fn with_interval(mut self, interval: u32) -> Self {
        self.interval = clamp_interval(interval);
        self
    }

    /// Restricts the rule to boss waves.
    #[must_use]
    pub fn only_on_boss_waves(mut self, only_on_boss_waves: bool) -> Self {
        self.only_on_boss_waves = only_on_boss_waves;
        self
    }

    /// Marks the template as a boss.
    #[must_use]
    pub fn boss(mut self, is_boss: bool) -> Self {
        self.is_boss = is_boss;
        self
    }

    /// Sets the per-wave spawn probability, clamped into `[0, 1]`.
    #[must_use]
    pub fn with_spawn_chance(mut self, spawn_chance: f64) -> Self {
        self.spawn_chance = clamp_probability(spawn_chance);
        self
    }

    /// Sets the curve mapping the wave to an instance count.
    #[must_use]
    pub fn with_count_curve(mut self, curve: WaveCurve) -> Self {
        self.count_curve = Some(curve);
        self
    }

    /// Spawns instances as a pack scattered inside `radius` of one placement.
    #[must_use]
    pub fn with_pack(mut self, radius: f32) -> Self {
        self.pack = Some(clamp_radius(radius));
        self
    }

    /// Sets the scaling curves applied to instances spawned by this rule.
    #[must_use]
    pub fn with_scaling(mut self, scaling: ScalingCurveSet) -> Self {
        self.scaling = Some(scaling);
        self
    }

    /// First wave the rule applies to.
    #[must_use]
    pub const fn start_wave(&self) -> u32 {
        self.start_wave
    }

    /// Last wave the rule applies to; zero or negative means unbounded.
    #[must_use]
    pub const fn end_wave(&self) -> i32 {
        self.end_wave
    }

    /// Repeat interval in waves.
    #[must_use]
    pub const fn interval(&self) -> u32 {
        self.interval
    }

    /// Reports whether the rule only applies to boss waves.
    #[must_use]
    pub const fn is_only_on_boss_waves(&self) -> bool {
        self.only_on_boss_waves
    }

    /// Reports whether the template is a boss.
    #[must_use]
    pub const fn is_boss(&self) -> bool {
        self.is_boss
    }

    /// Probability that the rule fires on a wave it is scheduled for.
    #[must_use]
    pub const fn spawn_chance(&self) -> f64 {
        self.spawn_chance
    }

    /// Count curve declared by the rule, if any.
    #[must_use]
    pub fn count_curve(&self) -> Option<&WaveCurve> {
        self.count_curve.as_ref()
    }

    /// Pack radius when the rule spawns packs.
    #[must_use]
    pub const fn pack_radius(&self) -> Option<f32> {
        self.pack
    }

    /// Scaling curves declared by the rule, if any.
    #[must_use]
    pub fn scaling(&self) -> Option<&ScalingCurveSet> {
        self.scaling.as_ref()
    }

    /// Reports whether the rule declares boss timing.
    #[must_use]
    pub const fn declares_boss(&self) -> bool {
        self.is_boss || self.only_on_boss_waves
    }

    /// Evaluates the deterministic part of the eligibility predicate.
    ///
    /// Checks run in order and stop at the first failure: start wave, end
    /// wave, boss-wave gating, then the repeat interval.
    pub fn schedule(
        &self,
        wave: WaveNumber,
        boss_wave: bool,
        allow_non_boss_on_boss_waves: bool,
    ) -> Result<(), Rejection> {
        let wave = wave.get();
        if wave < self.start_wave {
            return Err(Rejection::BeforeStart);
        }

        if self.end_wave > 0 && i64::from(wave) > i64::from(self.end_wave) {
            return Err(Rejection::AfterEnd);
        }

        if self.only_on_boss_waves {
            if !boss_wave {
                return Err(Rejection::BossWavesOnly);
            }
        } else if boss_wave && !self.is_boss && !allow_non_boss_on_boss_waves {
            return Err(Rejection::SuppressedOnBossWave);
        }

        if (wave - self.start_wave) % self.interval != 0 {
            return Err(Rejection::OffInterval);
        }

        Ok(())
    }

    /// Evaluates the full eligibility predicate, drawing against the spawn chance.
    ///
    /// The random source is only consumed when the deterministic checks pass
    /// and the spawn chance is below one.
    pub fn roll<R>(
        &self,
        wave: WaveNumber,
        boss_wave: bool,
        allow_non_boss_on_boss_waves: bool,
        rng: &mut R,
    ) -> Result<(), Rejection>
    where
        R: Rng + ?Sized,
    {
        self.schedule(wave, boss_wave, allow_non_boss_on_boss_waves)?;

        if self.spawn_chance < 1.0 {
            let draw: f64 = rng.gen();
            if draw >= self.spawn_chance {
                return Err(Rejection::ChanceFailed);
            }
        }

        Ok(())
    }
}

/// Reason a rule is not eligible on a wave.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Rejection {
    /// The wave precedes the rule's start wave.
    BeforeStart,
    /// The wave follows the rule's bounded end wave.
    AfterEnd,
    /// The rule only fires on boss waves and this wave is not one.
    BossWavesOnly,
    /// Non-boss templates are suppressed during boss waves.
    SuppressedOnBossWave,
    /// The wave does not land on the rule's repeat interval.
    OffInterval,
    /// The spawn chance draw failed.
    ChanceFailed,
}

/// Per-template record overriding a subset of the catalog default.
#[derive(Clone, Debug, PartialEq)]
pub struct TemplateOverride {
    template: TemplateId,
    start_wave: Option<u32>,
    end_wave: Option<i32>,
    interval: Option<u32>,
    only_on_boss_waves: Option<bool>,
    is_boss: Option<bool>,
    spawn_chance: Option<f64>,
    count_curve: Option<WaveCurve>,
    pack: Option<f32>,
    scaling: Option<ScalingCurveSet>,
}

impl TemplateOverride {
    /// Creates an override that inherits every field from the catalog default.
    #[must_use]
    pub const fn new(template: TemplateId) -> Self {
        Self {
            template,
            start_wave: None,
            end_wave: None,
            interval: None,
            only_on_boss_waves: None,
            is_boss: None,
            spawn_chance: None,
            count_curve: None,
            pack: None,
            scaling: None,
        }
    }

    /// Template the override applies to.
    #[must_use]
    pub const fn template(&self) -> TemplateId {
        self.template
    }

    /// Overrides the start wave. Values below one clamp to one.
    #[must_use]
    pub fn with_start_wave(mut self, start_wave: u32) -> Self {
        self.start_wave = Some(clamp_start_wave(start_wave));
        self
    }

    /// Overrides the end wave. Zero or negative means unbounded.
    #[must_use]
    pub fn with_end_wave(mut self, end_wave: i32) -> Self {
        self.end_wave = Some(end_wave);
        self
    }

    /// Overrides the repeat interval. Values below one clamp to one.
    #[must_use]
    pub fn with_interval(mut self, interval: u32) -> Self {
        self.interval = Some(clamp_interval(interval));
        self
    }

    /// Overrides boss-wave exclusivity.
    #[must_use]
    pub fn only_on_boss_waves(mut self, only_on_boss_waves: bool) -> Self {
        self.only_on_boss_waves = Some(only_on_boss_waves);
        self
    }

    /// Overrides the boss flag.
    #[must_use]
    pub fn boss(mut self, is_boss: bool) -> Self {
        self.is_boss = Some(is_boss);
        self
    }

    /// Overrides the spawn chance, clamped into `[0, 1]`.
    #[must_use]
    pub fn with_spawn_chance(mut self, spawn_chance: f64) -> Self {
        self.spawn_chance = Some(clamp_probability(spawn_chance));
        self
    }

    /// Overrides the count curve.
    #[must_use]
    pub fn with_count_curve(mut self, curve: WaveCurve) -> Self {
        self.count_curve = Some(curve);
        self
    }

    /// Overrides pack spawning with the provided radius.
    #[must_use]
    pub fn with_pack(mut self, radius: f32) -> Self {
        self.pack = Some(clamp_radius(radius));
        self
    }

    /// Overrides the scaling curves.
    #[must_use]
    pub fn with_scaling(mut self, scaling: ScalingCurveSet) -> Self {
        self.scaling = Some(scaling);
        self
    }

    /// Merges the override over the default rule.
    #[must_use]
    pub fn resolve(&self, default: &SpawnRule) -> ResolvedRule {
        let declares_boss = self.is_boss.unwrap_or(false)
            || self.only_on_boss_waves.unwrap_or(false)
            || default.declares_boss();

        let rule = SpawnRule {
            start_wave: self.start_wave.unwrap_or(default.start_wave),
            end_wave: self.end_wave.unwrap_or(default.end_wave),
            interval: self.interval.unwrap_or(default.interval),
            only_on_boss_waves: self
                .only_on_boss_waves
                .unwrap_or(default.only_on_boss_waves),
            is_boss: declares_boss,
            spawn_chance: self.spawn_chance.unwrap_or(default.spawn_chance),
            count_curve: self
                .count_curve
                .clone()
                .or_else(|| default.count_curve.clone()),
            pack: self.pack.or(default.pack),
            scaling: self.scaling.clone().or_else(|| default.scaling.clone()),
        };

        ResolvedRule {
            template: self.template,
            rule,
        }
    }
}

/// Effective rule of a single template after merging its override.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedRule {
    template: TemplateId,
    rule: SpawnRule,
}

impl ResolvedRule {
    /// Template the rule governs.
    #[must_use]
    pub const fn template(&self) -> TemplateId {
        self.template
    }

    /// Merged rule.
    #[must_use]
    pub const fn rule(&self) -> &SpawnRule {
        &self.rule
    }

    /// Reports whether the template belongs to the boss pool.
    #[must_use]
    pub const fn is_boss(&self) -> bool {
        self.rule.is_boss
    }

    /// Reports whether the rule resolves its own count rather than sharing one.
    #[must_use]
    pub fn has_count_curve(&self) -> bool {
        self.rule.count_curve.is_some()
    }

    /// Resolves the number of instances to spawn on `wave`.
    ///
    /// Uses the rule's count curve when one is declared, else `fallback`.
    #[must_use]
    pub fn count(&self, wave: WaveNumber, fallback: u32) -> u32 {
        match &self.rule.count_curve {
            Some(curve) => evaluate_spawn_count(curve, wave),
            None => fallback,
        }
    }

    /// Scaling curves for the template, falling back to `global` when the
    /// override and the catalog default both leave scaling unset.
    #[must_use]
    pub fn scaling_or<'a>(&'a self, global: &'a ScalingCurveSet) -> &'a ScalingCurveSet {
        self.rule.scaling.as_ref().unwrap_or(global)
    }
}

/// Shared default rule plus per-template overrides.
#[derive(Clone, Debug, PartialEq)]
pub struct RuleCatalog {
    default: SpawnRule,
    overrides: Vec<TemplateOverride>,
    allow_non_boss_on_boss_waves: bool,
    boss_interval: u32,
}

impl Default for RuleCatalog {
    fn default() -> Self {
        Self::new(SpawnRule::default())
    }
}

impl RuleCatalog {
    /// Creates a catalog with the provided default rule and no overrides.
    #[must_use]
    pub fn new(default: SpawnRule) -> Self {
        Self {
            default,
            overrides: Vec::new(),
            allow_non_boss_on_boss_waves: false,
            boss_interval: 5,
        }
    }

    /// Adds an override, replacing any previous override for the same template.
    #[must_use]
    pub fn with_override(mut self, record: TemplateOverride) -> Self {
        if let Some(existing) = self
            .overrides
            .iter_mut()
            .find(|existing| existing.template == record.template)
        {
            *existing = record;
        } else {
            self.overrides.push(record);
        }
        self
    }

    /// Lets non-boss templates keep spawning during boss waves.
    #[must_use]
    pub fn allow_non_boss_on_boss_waves(mut self, allow: bool) -> Self {
        self.allow_non_boss_on_boss_waves = allow;
        self
    }

    /// Sets the boss wave interval. Values below one clamp to one.
    #[must_use]
    pub fn with_boss_interval(mut self, boss_interval: u32) -> Self {
        self.boss_interval = clamp_interval(boss_interval);
        self
    }

    /// Shared default rule.
    #[must_use]
    pub const fn default_rule(&self) -> &SpawnRule {
        &self.default
    }

    /// Declared overrides in insertion order.
    #[must_use]
    pub fn overrides(&self) -> &[TemplateOverride] {
        &self.overrides
    }

    /// Override declared for `template`, if any.
    #[must_use]
    pub fn override_for(&self, template: TemplateId) -> Option<&TemplateOverride> {
        self.overrides
            .iter()
            .find(|record| record.template == template)
    }

    /// Reports whether non-boss templates keep spawning during boss waves.
    #[must_use]
    pub const fn allows_non_boss_on_boss_waves(&self) -> bool {
        self.allow_non_boss_on_boss_waves
    }

    /// Boss wave interval.
    #[must_use]
    pub const fn boss_interval(&self) -> u32 {
        self.boss_interval
    }

    /// Resolves the effective rule of `template`.
    #[must_use]
    pub fn resolve(&self, template: TemplateId) -> ResolvedRule {
        match self.override_for(template) {
            Some(record) => record.resolve(&self.default),
            None => ResolvedRule {
                template,
                rule: SpawnRule {
                    is_boss: self.default.declares_boss(),
                    ..self.default.clone()
                },
            },
        }
    }

    /// Evaluates the full eligibility predicate for `template` on `wave`.
    pub fn roll<R>(
        &self,
        template: TemplateId,
        wave: WaveNumber,
        boss_wave: bool,
        rng: &mut R,
    ) -> Result<ResolvedRule, Rejection>
    where
        R: Rng + ?Sized,
    {
        let resolved = self.resolve(template);
        match resolved
            .rule
            .roll(wave, boss_wave, self.allow_non_boss_on_boss_waves, rng)
        {
            Ok(()) => Ok(resolved),
            Err(rejection) => {
                tracing::trace!(
                    template = template.get(),
                    wave = wave.get(),
                    ?rejection,
                    "template not eligible"
                );
                Err(rejection)
            }
        }
    }
}

/// Number of instances a count curve asks for on `wave`.
///
/// The wave is clamped to at least one before sampling and the sample is
/// rounded up. Empty curves and non-positive or non-finite samples yield zero.
///
/// Rounding subtracts a `1e-9` tolerance first, so a sample within that
/// distance above an integer rounds down to it where plain `ceil` would not.
#[must_use]
pub fn evaluate_spawn_count<C>(curve: &C, wave: WaveNumber) -> u32
where
    C: Curve + ?Sized,
{
    if curve.is_empty() {
        return 0;
    }

    let sample = curve.evaluate(wave.curve_input());
    if !sample.is_finite() || sample <= 0.0 {
        return 0;
    }

    let rounded = (sample - COUNT_EPSILON).ceil().max(0.0);
    rounded.min(f64::from(u32::MAX)) as u32
}

/// Reports whether `wave` is a boss wave.
///
/// Requires a non-empty boss pool, a positive wave, and a wave divisible by
/// the boss interval.
#[must_use]
pub fn is_boss_wave(wave: WaveNumber, boss_pool_available: bool, boss_interval: u32) -> bool {
    boss_pool_available && wave.is_positive() && wave.get() % clamp_interval(boss_interval) == 0
}

fn clamp_start_wave(start_wave: u32) -> u32 {
    start_wave.max(1)
}

fn clamp_interval(interval: u32) -> u32 {
    interval.max(1)
}

fn clamp_probability(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

fn clamp_radius(radius: f32) -> f32 {
    if radius.is_finite() {
        radius.max(0.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use horde_core::LinearCurve;

    #[test]
    fn builders_clamp_malformed_values() {
        let rule = SpawnRule::default()
            .with_start_wave(0)
            .with_interval(0)
            .with_spawn_chance(7.5)
            .with_pack(-3.0);
        assert_eq!(rule.start_wave(), 1);
        assert_eq!(rule.interval(), 1);
        assert_eq!(rule.spawn_chance(), 1.0);
        assert_eq!(rule.pack_radius(), Some(0.0));

        let rule = SpawnRule::default()
            .with_spawn_chance(f64::NAN)
            .with_pack(f32::INFINITY);
        assert_eq!(rule.spawn_chance(), 0.0);
        assert_eq!(rule.pack_radius(), Some(0.0));
        assert_eq!(
            SpawnRule::default().with_spawn_chance(-0.5).spawn_chance(),
            0.0
        );
    }

    #[test]
    fn count_rounds_up_and_clamps_wave() {
        let curve = WaveCurve::linear([(1.0, 6.0), (20.0, 60.0)]);
        assert_eq!(evaluate_spawn_count(&curve, WaveNumber::new(0)), 6);
        assert_eq!(evaluate_spawn_count(&curve, WaveNumber::new(1)), 6);
        assert_eq!(evaluate_spawn_count(&curve, WaveNumber::new(2)), 9);
        assert_eq!(evaluate_spawn_count(&curve, WaveNumber::new(20)), 60);

        let noisy = WaveCurve::constant(4.0 + 1e-12);
        assert_eq!(evaluate_spawn_count(&noisy, WaveNumber::new(1)), 4);
        let above = WaveCurve::constant(4.001);
        assert_eq!(evaluate_spawn_count(&above, WaveNumber::new(1)), 5);
    }

    #[test]
    fn count_is_zero_for_degenerate_curves() {
        let empty = WaveCurve::Linear(LinearCurve::default());
        assert_eq!(evaluate_spawn_count(&empty, WaveNumber::new(5)), 0);
        assert_eq!(
            evaluate_spawn_count(&WaveCurve::constant(-3.0), WaveNumber::new(5)),
            0
        );
        assert_eq!(
            evaluate_spawn_count(&WaveCurve::constant(f64::NAN), WaveNumber::new(5)),
            0
        );
        assert_eq!(
            evaluate_spawn_count(&WaveCurve::constant(f64::MAX), WaveNumber::new(5)),
            u32::MAX
        );
    }

    #[test]
    fn resolved_count_prefers_curve_over_fallback() {
        let with_curve = TemplateOverride::new(TemplateId::new(1))
            .with_count_curve(WaveCurve::constant(2.0))
            .resolve(&SpawnRule::default());
        assert!(with_curve.has_count_curve());
        assert_eq!(with_curve.count(WaveNumber::new(4), 11), 2);

        let without_curve = TemplateOverride::new(TemplateId::new(2)).resolve(&SpawnRule::default());
        assert!(!without_curve.has_count_curve());
        assert_eq!(without_curve.count(WaveNumber::new(4), 11), 11);
    }

    #[test]
    fn boss_wave_requires_positive_divisible_wave() {
        assert!(is_boss_wave(WaveNumber::new(10), true, 5));
        assert!(!is_boss_wave(WaveNumber::new(11), true, 5));
        assert!(!is_boss_wave(WaveNumber::new(0), true, 5));
        assert!(!is_boss_wave(WaveNumber::new(10), false, 5));
        assert!(is_boss_wave(WaveNumber::new(3), true, 0));
    }
}
