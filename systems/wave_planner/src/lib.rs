#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Wave planner that turns "wave N has begun" into concrete spawn instructions.
//!
//! Two planning modes share the same placement and scaling machinery:
//!
//! * [`PlannerMode::FlatPool`] draws regulars and bosses uniformly from two
//!   pools, sizing each group with a wave-wide count curve.
//! * [`PlannerMode::RuleCatalog`] filters every template through its resolved
//!   [`horde_system_spawn_rules::SpawnRule`] and spawns the eligible ones with
//!   their own counts. Regulars that do not declare a count split a shared
//!   wave-wide count; bosses that do not declare one split a boss count.

use glam::Vec2;
use horde_core::{
    CameraView, Command, EntityFactory, EntityHandle, EntityTemplate, Event, PackId,
    ScalingCurveSet, ScalingModifiers, SpawnInstruction, WaveCurve, WaveNumber,
};
use horde_system_spawn_rules::{evaluate_spawn_count, is_boss_wave, ResolvedRule, RuleCatalog};
use rand::Rng;

mod placement;

pub use placement::{
    scatter_in_disc, PlacementConfig, PlacementOutcome, PlacementRequest, PlacementResult,
    DEFAULT_RETRY_BUDGET,
};

/// Flat spawner: two template pools sized by shared count curves.
#[derive(Clone, Debug, PartialEq)]
pub struct FlatPoolConfig {
    regulars: Vec<EntityTemplate>,
    bosses: Vec<EntityTemplate>,
    regular_count: WaveCurve,
    boss_count: WaveCurve,
    boss_interval: u32,
    allow_regulars_on_boss_waves: bool,
}

impl FlatPoolConfig {
    /// Creates a flat configuration with default curves and boss cadence.
    #[must_use]
    pub fn new(regulars: Vec<EntityTemplate>, bosses: Vec<EntityTemplate>) -> Self {
        Self {
            regulars,
            bosses,
            regular_count: WaveCurve::linear([(1.0, 6.0), (20.0, 60.0)]),
            boss_count: WaveCurve::constant(1.0),
            boss_interval: 5,
            allow_regulars_on_boss_waves: true,
        }
    }

    /// Replaces the curve sizing the regular group.
    #[must_use]
    pub fn with_regular_count(mut self, curve: WaveCurve) -> Self {
        self.regular_count = curve;
        self
    }

    /// Replaces the curve sizing the boss group.
    #[must_use]
    pub fn with_boss_count(mut self, curve: WaveCurve) -> Self {
        self.boss_count = curve;
        self
    }

    /// Sets the boss wave interval. Values below one clamp to one.
    #[must_use]
    pub fn with_boss_interval(mut self, boss_interval: u32) -> Self {
        self.boss_interval = boss_interval.max(1);
        self
    }

    /// Controls whether regulars keep spawning during boss waves.
    #[must_use]
    pub fn allow_regulars_on_boss_waves(mut self, allow: bool) -> Self {
        self.allow_regulars_on_boss_waves = allow;
        self
    }

    /// Regular template pool.
    #[must_use]
    pub fn regulars(&self) -> &[EntityTemplate] {
        &self.regulars
    }

    /// Boss template pool.
    #[must_use]
    pub fn bosses(&self) -> &[EntityTemplate] {
        &self.bosses
    }

    /// Boss wave interval.
    #[must_use]
    pub const fn boss_interval(&self) -> u32 {
        self.boss_interval
    }
}

/// Rule-catalog spawner: every template is gated by its resolved rule.
#[derive(Clone, Debug, PartialEq)]
pub struct CatalogConfig {
    catalog: RuleCatalog,
    templates: Vec<EntityTemplate>,
    shared_count: Option<WaveCurve>,
    boss_count: Option<WaveCurve>,
}

impl CatalogConfig {
    /// Creates a catalog configuration over the provided candidate templates.
    #[must_use]
    pub fn new(catalog: RuleCatalog, templates: Vec<EntityTemplate>) -> Self {
        Self {
            catalog,
            templates,
            shared_count: None,
            boss_count: None,
        }
    }

    /// Sets the wave-wide count split across regular templates without a count curve.
    #[must_use]
    pub fn with_shared_count(mut self, curve: WaveCurve) -> Self {
        self.shared_count = Some(curve);
        self
    }

    /// Sets the count split across boss templates without a count curve.
    #[must_use]
    pub fn with_boss_count(mut self, curve: WaveCurve) -> Self {
        self.boss_count = Some(curve);
        self
    }

    /// Rule catalog consulted for every template.
    #[must_use]
    pub const fn catalog(&self) -> &RuleCatalog {
        &self.catalog
    }

    /// Candidate templates.
    #[must_use]
    pub fn templates(&self) -> &[EntityTemplate] {
        &self.templates
    }
}

/// Planning strategy.
#[derive(Clone, Debug, PartialEq)]
pub enum PlannerMode {
    /// Flat pools with shared count curves.
    FlatPool(FlatPoolConfig),
    /// Per-template rules from a catalog.
    RuleCatalog(CatalogConfig),
}

/// Full planner configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct PlannerConfig {
    /// Planning strategy.
    pub mode: PlannerMode,
    /// Placement tuning.
    pub placement: PlacementConfig,
    /// Scaling used when no rule declares its own curves.
    pub fallback_scaling: ScalingCurveSet,
}

impl PlannerConfig {
    /// Creates a configuration with default placement and identity scaling.
    #[must_use]
    pub fn new(mode: PlannerMode) -> Self {
        Self {
            mode,
            placement: PlacementConfig::default(),
            fallback_scaling: ScalingCurveSet::identity(),
        }
    }
}

/// Spawn instructions produced for a single wave.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SpawnPlan {
    wave: WaveNumber,
    boss_wave: bool,
    instructions: Vec<SpawnInstruction>,
    snapped: u32,
}

impl SpawnPlan {
    /// Wave the plan was produced for.
    #[must_use]
    pub const fn wave(&self) -> WaveNumber {
        self.wave
    }

    /// Reports whether the wave was a boss wave.
    #[must_use]
    pub const fn is_boss_wave(&self) -> bool {
        self.boss_wave
    }

    /// Planned instances in emission order.
    #[must_use]
    pub fn instructions(&self) -> &[SpawnInstruction] {
        &self.instructions
    }

    /// Number of placements that fell back to the camera-ray snap.
    #[must_use]
    pub const fn snapped(&self) -> u32 {
        self.snapped
    }

    /// Number of planned instances.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Reports whether the plan spawns nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Consumes the plan, yielding its instructions.
    #[must_use]
    pub fn into_instructions(self) -> Vec<SpawnInstruction> {
        self.instructions
    }
}

/// Pure system that plans spawns for each wave event.
#[derive(Debug)]
pub struct WavePlanner {
    config: PlannerConfig,
    next_pack: u32,
}

impl WavePlanner {
    /// Creates a planner with the provided configuration.
    #[must_use]
    pub fn new(config: PlannerConfig) -> Self {
        Self {
            config,
            next_pack: 0,
        }
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Consumes `WaveStarted` events and emits one spawn command per planned instance.
    ///
    /// Every other event is ignored.
    pub fn handle<R>(
        &mut self,
        events: &[Event],
        player: Vec2,
        camera: Option<&dyn CameraView>,
        rng: &mut R,
        out: &mut Vec<Command>,
    ) where
        R: Rng + ?Sized,
    {
        for event in events {
            if let Event::WaveStarted { wave } = event {
                let plan = self.plan(*wave, player, camera, rng);
                out.extend(
                    plan.into_instructions()
                        .into_iter()
                        .map(Command::SpawnEntity),
                );
            }
        }
    }

    /// Produces the spawn plan for `wave` around `player`.
    pub fn plan<R>(
        &mut self,
        wave: WaveNumber,
        player: Vec2,
        camera: Option<&dyn CameraView>,
        rng: &mut R,
    ) -> SpawnPlan
    where
        R: Rng + ?Sized,
    {
        let Self { config, next_pack } = self;
        let mut builder = PlanBuilder {
            wave,
            player,
            camera,
            placement: &config.placement,
            next_pack,
            instructions: Vec::new(),
            snapped: 0,
        };

        let boss_wave = match &config.mode {
            PlannerMode::FlatPool(flat) => {
                plan_flat(flat, &config.fallback_scaling, &mut builder, rng)
            }
            PlannerMode::RuleCatalog(catalog) => {
                plan_catalog(catalog, &config.fallback_scaling, &mut builder, rng)
            }
        };

        let plan = SpawnPlan {
            wave,
            boss_wave,
            instructions: builder.instructions,
            snapped: builder.snapped,
        };
        tracing::debug!(
            wave = wave.get(),
            boss_wave,
            spawns = plan.len(),
            snapped = plan.snapped,
            "wave planned"
        );
        plan
    }
}

fn plan_flat<R>(
    flat: &FlatPoolConfig,
    scaling: &ScalingCurveSet,
    builder: &mut PlanBuilder<'_>,
    rng: &mut R,
) -> bool
where
    R: Rng + ?Sized,
{
    let wave = builder.wave;
    let boss_wave = is_boss_wave(wave, !flat.bosses.is_empty(), flat.boss_interval);
    let modifiers = scaling.evaluate(wave);

    if !flat.regulars.is_empty() && (!boss_wave || flat.allow_regulars_on_boss_waves) {
        let count = evaluate_spawn_count(&flat.regular_count, wave);
        for _ in 0..count {
            let template = flat.regulars[rng.gen_range(0..flat.regulars.len())];
            builder.spawn_single(template, modifiers, rng);
        }
    }

    if boss_wave {
        let count = evaluate_spawn_count(&flat.boss_count, wave);
        for _ in 0..count {
            let template = flat.bosses[rng.gen_range(0..flat.bosses.len())];
            builder.spawn_single(template, modifiers, rng);
        }
    }

    boss_wave
}

fn plan_catalog<R>(
    config: &CatalogConfig,
    fallback_scaling: &ScalingCurveSet,
    builder: &mut PlanBuilder<'_>,
    rng: &mut R,
) -> bool
where
    R: Rng + ?Sized,
{
    let wave = builder.wave;
    let catalog = &config.catalog;
    let boss_pool_available = config
        .templates
        .iter()
        .any(|template| catalog.resolve(template.id()).is_boss());
    let boss_wave = is_boss_wave(wave, boss_pool_available, catalog.boss_interval());

    let mut regulars: Vec<(EntityTemplate, ResolvedRule)> = Vec::new();
    let mut bosses: Vec<(EntityTemplate, ResolvedRule)> = Vec::new();
    for template in &config.templates {
        let Ok(rule) = catalog.roll(template.id(), wave, boss_wave, rng) else {
            continue;
        };

        if rule.has_count_curve() {
            let count = rule.count(wave, 0);
            builder.spawn_group(*template, &rule, count, fallback_scaling, rng);
        } else if rule.is_boss() {
            bosses.push((*template, rule));
        } else {
            regulars.push((*template, rule));
        }
    }

    share_count(
        regulars,
        config.shared_count.as_ref(),
        fallback_scaling,
        builder,
        rng,
    );
    share_count(
        bosses,
        config.boss_count.as_ref(),
        fallback_scaling,
        builder,
        rng,
    );

    boss_wave
}

/// Splits `curve`'s count for the wave across `sharing` with uniform draws.
fn share_count<R>(
    sharing: Vec<(EntityTemplate, ResolvedRule)>,
    curve: Option<&WaveCurve>,
    fallback_scaling: &ScalingCurveSet,
    builder: &mut PlanBuilder<'_>,
    rng: &mut R,
) where
    R: Rng + ?Sized,
{
    if sharing.is_empty() {
        return;
    }

    let total = curve.map_or(0, |curve| evaluate_spawn_count(curve, builder.wave));
    let mut tallies = vec![0u32; sharing.len()];
    for _ in 0..total {
        tallies[rng.gen_range(0..sharing.len())] += 1;
    }

    for ((template, rule), count) in sharing.into_iter().zip(tallies) {
        builder.spawn_group(template, &rule, count, fallback_scaling, rng);
    }
}

struct PlanBuilder<'a> {
    wave: WaveNumber,
    player: Vec2,
    camera: Option<&'a dyn CameraView>,
    placement: &'a PlacementConfig,
    next_pack: &'a mut u32,
    instructions: Vec<SpawnInstruction>,
    snapped: u32,
}

impl PlanBuilder<'_> {
    fn place<R>(&mut self, rng: &mut R) -> Vec2
    where
        R: Rng + ?Sized,
    {
        let request = self.placement.request(self.player);
        let result = self.placement.resolve(&request, self.camera, rng);
        if result.outcome == PlacementOutcome::Snapped {
            self.snapped += 1;
        }
        result.point
    }

    fn spawn_single<R>(&mut self, template: EntityTemplate, modifiers: ScalingModifiers, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        let position = self.place(rng);
        self.push(template, position, modifiers, None);
    }

    fn spawn_group<R>(
        &mut self,
        template: EntityTemplate,
        rule: &ResolvedRule,
        count: u32,
        fallback_scaling: &ScalingCurveSet,
        rng: &mut R,
    ) where
        R: Rng + ?Sized,
    {
        if count == 0 {
            return;
        }

        let modifiers = rule.scaling_or(fallback_scaling).evaluate(self.wave);
        match rule.rule().pack_radius() {
            Some(radius) => {
                let center = self.place(rng);
                let pack = PackId::new(*self.next_pack);
                *self.next_pack = self.next_pack.wrapping_add(1);
                for _ in 0..count {
                    let position = scatter_in_disc(center, radius, rng);
                    self.push(template, position, modifiers, Some(pack));
                }
            }
            None => {
                for _ in 0..count {
                    self.spawn_single(template, modifiers, rng);
                }
            }
        }
    }

    fn push(
        &mut self,
        template: EntityTemplate,
        position: Vec2,
        modifiers: ScalingModifiers,
        pack: Option<PackId>,
    ) {
        self.instructions.push(SpawnInstruction {
            template,
            position,
            orientation: facing(position, self.player),
            modifiers,
            pack,
        });
    }
}

fn facing(from: Vec2, toward: Vec2) -> f32 {
    let delta = toward - from;
    if delta.length_squared() <= f32::EPSILON {
        return 0.0;
    }
    delta.y.atan2(delta.x)
}

/// Creates a single entity and hands it its scaling modifiers.
///
/// Returns `None` when the factory declines to create the entity.
pub fn spawn_entity<F>(instruction: &SpawnInstruction, factory: &mut F) -> Option<EntityHandle>
where
    F: EntityFactory + ?Sized,
{
    let entity = factory.create(
        instruction.template,
        instruction.position,
        instruction.orientation,
    )?;
    factory.initialize_scaling(entity, instruction.modifiers);
    Some(entity)
}

/// Executes every spawn command and reports each created entity.
pub fn execute_commands<F>(commands: &[Command], factory: &mut F, out: &mut Vec<Event>)
where
    F: EntityFactory + ?Sized,
{
    let mut declined = 0usize;
    for command in commands {
        let Command::SpawnEntity(instruction) = command;
        match spawn_entity(instruction, factory) {
            Some(entity) => out.push(Event::EntitySpawned {
                entity,
                template: instruction.template,
                position: instruction.position,
            }),
            None => declined += 1,
        }
    }

    if declined > 0 {
        tracing::debug!(declined, "factory declined spawn instructions");
    }
}

#[cfg(test)]
mod tests {
    use super::facing;
    use glam::Vec2;

    #[test]
    fn facing_points_toward_target() {
        let angle = facing(Vec2::new(0.0, 0.0), Vec2::new(0.0, 5.0));
        assert!((angle - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
        assert_eq!(facing(Vec2::ONE, Vec2::ONE), 0.0);
    }
}
