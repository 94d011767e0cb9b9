//! Session configuration loaded from TOML.
//!
//! Every field has a default so an empty file describes a playable session.
//! Unless `catalog.overrides` is given, the built-in rule overrides apply to
//! whichever built-in template names the file declares. Templates marked
//! `boss` only spawn on boss waves in either planner mode unless an override
//! says otherwise. Numeric anomalies are passed through to the system
//! builders, which clamp them; only structural mistakes are rejected.

use std::{collections::HashSet, fs, path::Path, time::Duration};

use anyhow::{Context, Result};
use clap::ValueEnum;
use glam::Vec2;
use horde_core::{EntityKind, EntityTemplate, ScalingCurveSet, TemplateId, WaveCurve};
use horde_system_spawn_rules::{RuleCatalog, SpawnRule, TemplateOverride};
use horde_system_wave_planner::{
    CatalogConfig, FlatPoolConfig, PlacementConfig, PlannerConfig, PlannerMode,
    DEFAULT_RETRY_BUDGET,
};
use serde::Deserialize;
use thiserror::Error;

/// Configuration format version understood by this binary.
pub(crate) const SUPPORTED_VERSION: u32 = 1;

/// Longest gap between waves; longer settings clamp to it.
const MAX_WAVE_SECONDS: f32 = 3600.0;

/// Structural problems that make a configuration unusable.
#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum ConfigError {
    #[error("unsupported config version {found}, expected {}", SUPPORTED_VERSION)]
    UnsupportedVersion { found: u32 },
    #[error("template `{name}` is declared more than once")]
    DuplicateTemplate { name: String },
    #[error("rule override references unknown template `{name}`")]
    UnknownTemplate { name: String },
    #[error("template `{name}` has more than one rule override")]
    DuplicateOverride { name: String },
}

/// Planner strategy selectable from the file or the command line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub(crate) enum ModeSetting {
    /// Flat regular and boss pools.
    #[default]
    FlatPool,
    /// Per-template rule catalog.
    RuleCatalog,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct SessionConfig {
    pub(crate) version: u32,
    pub(crate) mode: ModeSetting,
    pub(crate) seed: u64,
    pub(crate) waves: u32,
    pub(crate) wave_seconds: f32,
    pub(crate) frame_hz: u32,
    pub(crate) physics_hz: u32,
    pub(crate) player: PlayerConfig,
    pub(crate) camera: CameraConfig,
    pub(crate) arena: ArenaConfig,
    pub(crate) placement: PlacementSettings,
    pub(crate) scaling: ScalingCurveSet,
    pub(crate) templates: Vec<TemplateSettings>,
    pub(crate) flat: FlatSettings,
    pub(crate) catalog: CatalogSettings,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            version: SUPPORTED_VERSION,
            mode: ModeSetting::default(),
            seed: 0x5eed,
            waves: 10,
            wave_seconds: 20.0,
            frame_hz: 60,
            physics_hz: 50,
            player: PlayerConfig::default(),
            camera: CameraConfig::default(),
            arena: ArenaConfig::default(),
            placement: PlacementSettings::default(),
            scaling: ScalingCurveSet::identity()
                .with_health(WaveCurve::linear([(1.0, 1.0), (20.0, 4.0)]))
                .with_damage(WaveCurve::linear([(1.0, 1.0), (20.0, 2.5)])),
            templates: default_templates(),
            flat: FlatSettings::default(),
            catalog: CatalogSettings::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct PlayerConfig {
    pub(crate) orbit_radius: f32,
    pub(crate) angular_speed: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            orbit_radius: 8.0,
            angular_speed: 0.25,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct CameraConfig {
    pub(crate) half_extents: [f32; 2],
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            half_extents: [16.0, 9.0],
        }
    }
}

impl CameraConfig {
    pub(crate) fn half_extents(&self) -> Vec2 {
        Vec2::from(self.half_extents)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct ArenaConfig {
    pub(crate) capacity: u32,
    pub(crate) hostile_speed: f32,
    pub(crate) hostile_lifetime: f32,
    pub(crate) crate_lifetime: f32,
    pub(crate) contact_radius: f32,
    pub(crate) pickup_radius: f32,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            capacity: 512,
            hostile_speed: 2.5,
            hostile_lifetime: 15.0,
            crate_lifetime: 10.0,
            contact_radius: 0.75,
            pickup_radius: 1.5,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct PlacementSettings {
    pub(crate) spawn_radius: f32,
    pub(crate) buffer: f32,
    pub(crate) retry_budget: u32,
    pub(crate) avoid_viewport: bool,
}

impl Default for PlacementSettings {
    fn default() -> Self {
        Self {
            spawn_radius: 18.0,
            buffer: 2.0,
            retry_budget: DEFAULT_RETRY_BUDGET,
            avoid_viewport: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct TemplateSettings {
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) kind: EntityKind,
    #[serde(default)]
    pub(crate) boss: bool,
}

impl TemplateSettings {
    fn new(name: &str, kind: EntityKind, boss: bool) -> Self {
        Self {
            name: name.to_owned(),
            kind,
            boss,
        }
    }
}

fn default_templates() -> Vec<TemplateSettings> {
    vec![
        TemplateSettings::new("grunt", EntityKind::Hostile, false),
        TemplateSettings::new("runner", EntityKind::Hostile, false),
        TemplateSettings::new("warlord", EntityKind::Hostile, true),
        TemplateSettings::new("supply", EntityKind::SupplyCrate, false),
    ]
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct FlatSettings {
    pub(crate) regular_count: WaveCurve,
    pub(crate) boss_count: WaveCurve,
    pub(crate) boss_interval: u32,
    pub(crate) allow_regulars_on_boss_waves: bool,
}

impl Default for FlatSettings {
    fn default() -> Self {
        Self {
            regular_count: WaveCurve::linear([(1.0, 6.0), (20.0, 60.0)]),
            boss_count: WaveCurve::constant(1.0),
            boss_interval: 5,
            allow_regulars_on_boss_waves: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct CatalogSettings {
    pub(crate) boss_interval: u32,
    pub(crate) allow_non_boss_on_boss_waves: bool,
    pub(crate) shared_count: Option<WaveCurve>,
    pub(crate) boss_count: Option<WaveCurve>,
    pub(crate) default: RuleSettings,
    /// `None` selects the built-in overrides.
    pub(crate) overrides: Option<Vec<OverrideSettings>>,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            boss_interval: 5,
            allow_non_boss_on_boss_waves: false,
            shared_count: Some(WaveCurve::linear([(1.0, 6.0), (20.0, 60.0)])),
            boss_count: Some(WaveCurve::constant(1.0)),
            default: RuleSettings::default(),
            overrides: None,
        }
    }
}

/// Overrides shipped with the built-in templates.
fn builtin_overrides() -> Vec<OverrideSettings> {
    vec![
        OverrideSettings::new(
            "runner",
            RuleSettings {
                start_wave: Some(3),
                spawn_chance: Some(0.75),
                pack_radius: Some(3.0),
                ..RuleSettings::default()
            },
        ),
        OverrideSettings::new(
            "warlord",
            RuleSettings {
                only_on_boss_waves: Some(true),
                count: Some(WaveCurve::constant(1.0)),
                ..RuleSettings::default()
            },
        ),
        OverrideSettings::new(
            "supply",
            RuleSettings {
                start_wave: Some(2),
                interval: Some(2),
                count: Some(WaveCurve::constant(1.0)),
                scaling: Some(ScalingCurveSet::identity()),
                ..RuleSettings::default()
            },
        ),
    ]
}

/// Rule fields; unset fields inherit from the catalog default.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct RuleSettings {
    pub(crate) start_wave: Option<u32>,
    pub(crate) end_wave: Option<i32>,
    pub(crate) interval: Option<u32>,
    pub(crate) only_on_boss_waves: Option<bool>,
    pub(crate) boss: Option<bool>,
    pub(crate) spawn_chance: Option<f64>,
    pub(crate) count: Option<WaveCurve>,
    pub(crate) pack_radius: Option<f32>,
    pub(crate) scaling: Option<ScalingCurveSet>,
}

impl RuleSettings {
    fn to_rule(&self) -> SpawnRule {
        let mut rule = SpawnRule::default();
        if let Some(start_wave) = self.start_wave {
            rule = rule.with_start_wave(start_wave);
        }
        if let Some(end_wave) = self.end_wave {
            rule = rule.with_end_wave(end_wave);
        }
        if let Some(interval) = self.interval {
            rule = rule.with_interval(interval);
        }
        if let Some(only) = self.only_on_boss_waves {
            rule = rule.only_on_boss_waves(only);
        }
        if let Some(boss) = self.boss {
            rule = rule.boss(boss);
        }
        if let Some(chance) = self.spawn_chance {
            rule = rule.with_spawn_chance(chance);
        }
        if let Some(curve) = &self.count {
            rule = rule.with_count_curve(curve.clone());
        }
        if let Some(radius) = self.pack_radius {
            rule = rule.with_pack(radius);
        }
        if let Some(scaling) = &self.scaling {
            rule = rule.with_scaling(scaling.clone());
        }
        rule
    }

    /// Fills unset boss fields so the template only spawns on boss waves.
    fn as_boss(mut self) -> Self {
        self.boss = self.boss.or(Some(true));
        self.only_on_boss_waves = self.only_on_boss_waves.or(Some(true));
        self
    }

    fn to_override(&self, template: TemplateId) -> TemplateOverride {
        let mut record = TemplateOverride::new(template);
        if let Some(start_wave) = self.start_wave {
            record = record.with_start_wave(start_wave);
        }
        if let Some(end_wave) = self.end_wave {
            record = record.with_end_wave(end_wave);
        }
        if let Some(interval) = self.interval {
            record = record.with_interval(interval);
        }
        if let Some(only) = self.only_on_boss_waves {
            record = record.only_on_boss_waves(only);
        }
        if let Some(boss) = self.boss {
            record = record.boss(boss);
        }
        if let Some(chance) = self.spawn_chance {
            record = record.with_spawn_chance(chance);
        }
        if let Some(curve) = &self.count {
            record = record.with_count_curve(curve.clone());
        }
        if let Some(radius) = self.pack_radius {
            record = record.with_pack(radius);
        }
        if let Some(scaling) = &self.scaling {
            record = record.with_scaling(scaling.clone());
        }
        record
    }
}

/// Rule override for a single template, keyed by template name.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct OverrideSettings {
    pub(crate) template: String,
    pub(crate) start_wave: Option<u32>,
    pub(crate) end_wave: Option<i32>,
    pub(crate) interval: Option<u32>,
    pub(crate) only_on_boss_waves: Option<bool>,
    pub(crate) boss: Option<bool>,
    pub(crate) spawn_chance: Option<f64>,
    pub(crate) count: Option<WaveCurve>,
    pub(crate) pack_radius: Option<f32>,
    pub(crate) scaling: Option<ScalingCurveSet>,
}

impl OverrideSettings {
    fn new(template: &str, rule: RuleSettings) -> Self {
        let RuleSettings {
            start_wave,
            end_wave,
            interval,
            only_on_boss_waves,
            boss,
            spawn_chance,
            count,
            pack_radius,
            scaling,
        } = rule;
        Self {
            template: template.to_owned(),
            start_wave,
            end_wave,
            interval,
            only_on_boss_waves,
            boss,
            spawn_chance,
            count,
            pack_radius,
            scaling,
        }
    }

    fn rule(&self) -> RuleSettings {
        RuleSettings {
            start_wave: self.start_wave,
            end_wave: self.end_wave,
            interval: self.interval,
            only_on_boss_waves: self.only_on_boss_waves,
            boss: self.boss,
            spawn_chance: self.spawn_chance,
            count: self.count.clone(),
            pack_radius: self.pack_radius,
            scaling: self.scaling.clone(),
        }
    }
}

/// Template names resolved to the identifiers used by the systems.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct TemplateRegistry {
    templates: Vec<(String, EntityTemplate, bool)>,
}

impl TemplateRegistry {
    fn build(settings: &[TemplateSettings]) -> Result<Self, ConfigError> {
        let mut templates: Vec<(String, EntityTemplate, bool)> =
            Vec::with_capacity(settings.len());
        for (entry, id) in settings.iter().zip(1u32..) {
            if templates.iter().any(|(name, _, _)| *name == entry.name) {
                return Err(ConfigError::DuplicateTemplate {
                    name: entry.name.clone(),
                });
            }
            templates.push((
                entry.name.clone(),
                EntityTemplate::new(TemplateId::new(id), entry.kind),
                entry.boss,
            ));
        }
        Ok(Self { templates })
    }

    pub(crate) fn lookup(&self, name: &str) -> Option<EntityTemplate> {
        self.templates
            .iter()
            .find(|(candidate, _, _)| candidate == name)
            .map(|(_, template, _)| *template)
    }

    pub(crate) fn name_of(&self, id: TemplateId) -> Option<&str> {
        self.templates
            .iter()
            .find(|(_, template, _)| template.id() == id)
            .map(|(name, _, _)| name.as_str())
    }

    fn all(&self) -> Vec<EntityTemplate> {
        self.templates.iter().map(|(_, template, _)| *template).collect()
    }

    fn partitioned(&self) -> (Vec<EntityTemplate>, Vec<EntityTemplate>) {
        let (bosses, regulars): (Vec<_>, Vec<_>) =
            self.templates.iter().partition(|(_, _, boss)| *boss);
        let strip = |entries: Vec<&(String, EntityTemplate, bool)>| -> Vec<EntityTemplate> {
            entries.into_iter().map(|(_, template, _)| *template).collect()
        };
        (strip(regulars), strip(bosses))
    }
}

impl SessionConfig {
    /// Reads and parses a configuration file.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read session config at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("invalid session config at {}", path.display()))
    }

    /// Parses configuration text.
    pub(crate) fn parse(contents: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(contents).context("failed to parse session config toml contents")?;
        if config.version != SUPPORTED_VERSION {
            return Err(ConfigError::UnsupportedVersion {
                found: config.version,
            }
            .into());
        }
        Ok(config)
    }

    /// Duration of one variable-rate frame.
    pub(crate) fn frame_step(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.frame_hz.max(1)))
    }

    /// Duration of one fixed-rate physics step.
    pub(crate) fn physics_step(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.physics_hz.max(1)))
    }

    /// Time between consecutive waves, clamped to `[0, MAX_WAVE_SECONDS]`.
    pub(crate) fn wave_interval(&self) -> Duration {
        if self.wave_seconds > 0.0 {
            Duration::from_secs_f32(self.wave_seconds.min(MAX_WAVE_SECONDS))
        } else {
            Duration::ZERO
        }
    }

    /// Resolves template names and builds the planner configuration.
    pub(crate) fn planner(&self) -> Result<(PlannerConfig, TemplateRegistry), ConfigError> {
        let registry = TemplateRegistry::build(&self.templates)?;
        let mode = match self.mode {
            ModeSetting::FlatPool => {
                let (regulars, bosses) = registry.partitioned();
                PlannerMode::FlatPool(
                    FlatPoolConfig::new(regulars, bosses)
                        .with_regular_count(self.flat.regular_count.clone())
                        .with_boss_count(self.flat.boss_count.clone())
                        .with_boss_interval(self.flat.boss_interval)
                        .allow_regulars_on_boss_waves(self.flat.allow_regulars_on_boss_waves),
                )
            }
            ModeSetting::RuleCatalog => PlannerMode::RuleCatalog(self.catalog_config(&registry)?),
        };

        let placement = PlacementConfig::new(self.placement.spawn_radius, self.placement.buffer)
            .with_retry_budget(self.placement.retry_budget)
            .avoid_viewport(self.placement.avoid_viewport);

        let mut config = PlannerConfig::new(mode);
        config.placement = placement;
        config.fallback_scaling = self.scaling.clone();
        Ok((config, registry))
    }

    fn catalog_config(&self, registry: &TemplateRegistry) -> Result<CatalogConfig, ConfigError> {
        let settings = &self.catalog;
        let overrides = match &settings.overrides {
            Some(overrides) => overrides.clone(),
            None => builtin_overrides()
                .into_iter()
                .filter(|entry| registry.lookup(&entry.template).is_some())
                .collect(),
        };
        let (_, bosses) = registry.partitioned();

        let mut seen: HashSet<TemplateId> = HashSet::new();
        let mut catalog = RuleCatalog::new(settings.default.to_rule())
            .with_boss_interval(settings.boss_interval)
            .allow_non_boss_on_boss_waves(settings.allow_non_boss_on_boss_waves);

        for entry in &overrides {
            let template =
                registry
                    .lookup(&entry.template)
                    .ok_or_else(|| ConfigError::UnknownTemplate {
                        name: entry.template.clone(),
                    })?;
            if !seen.insert(template.id()) {
                return Err(ConfigError::DuplicateOverride {
                    name: entry.template.clone(),
                });
            }

            let mut rule = entry.rule();
            if bosses.contains(&template) {
                rule = rule.as_boss();
            }
            catalog = catalog.with_override(rule.to_override(template.id()));
        }

        for template in bosses.iter().filter(|boss| !seen.contains(&boss.id())) {
            catalog =
                catalog.with_override(RuleSettings::default().as_boss().to_override(template.id()));
        }

        let mut config = CatalogConfig::new(catalog, registry.all());
        if let Some(curve) = &settings.shared_count {
            config = config.with_shared_count(curve.clone());
        }
        if let Some(curve) = &settings.boss_count {
            config = config.with_boss_count(curve.clone());
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = SessionConfig::parse("").expect("empty config is valid");
        assert_eq!(config, SessionConfig::default());
        let (planner, registry) = config.planner().expect("defaults build");
        assert!(matches!(planner.mode, PlannerMode::FlatPool(_)));
        assert_eq!(registry.name_of(TemplateId::new(3)), Some("warlord"));
    }

    #[test]
    fn flat_mode_partitions_boss_templates() {
        let config = SessionConfig::default();
        let (planner, registry) = config.planner().expect("defaults build");
        let PlannerMode::FlatPool(flat) = planner.mode else {
            panic!("expected flat mode");
        };
        assert_eq!(flat.bosses(), &[registry.lookup("warlord").expect("declared")]);
        assert_eq!(flat.regulars().len(), 3);
    }

    #[test]
    fn parses_catalog_overrides() {
        let config = SessionConfig::parse(
            r#"
            mode = "rule_catalog"

            [[templates]]
            name = "grunt"

            [[templates]]
            name = "crate"
            kind = "supply_crate"

            [catalog]
            shared_count = { constant = 4.0 }

            [catalog.default]
            spawn_chance = 0.5

            [[catalog.overrides]]
            template = "crate"
            interval = 3
            count = { linear = [[1.0, 1.0], [10.0, 3.0]] }
            "#,
        )
        .expect("valid config");

        let (planner, registry) = config.planner().expect("catalog builds");
        let PlannerMode::RuleCatalog(catalog) = planner.mode else {
            panic!("expected catalog mode");
        };
        let crate_template = registry.lookup("crate").expect("declared");
        assert_eq!(crate_template.kind(), EntityKind::SupplyCrate);

        let resolved = catalog.catalog().resolve(crate_template.id());
        assert_eq!(resolved.rule().interval(), 3);
        assert_eq!(resolved.rule().spawn_chance(), 0.5);
        assert!(resolved.has_count_curve());
        assert_eq!(catalog.templates().len(), 2);
    }

    #[test]
    fn rejects_unsupported_version() {
        let error = SessionConfig::parse("version = 7").expect_err("version 7 is unknown");
        assert_eq!(
            error.downcast_ref::<ConfigError>(),
            Some(&ConfigError::UnsupportedVersion { found: 7 })
        );
    }

    #[test]
    fn rejects_duplicate_templates() {
        let mut config = SessionConfig::default();
        config.templates.push(TemplateSettings::new(
            "grunt",
            EntityKind::Hostile,
            false,
        ));
        assert_eq!(
            config.planner().expect_err("duplicate"),
            ConfigError::DuplicateTemplate {
                name: "grunt".to_owned()
            }
        );
    }

    #[test]
    fn rejects_unknown_and_duplicate_overrides() {
        let mut config = SessionConfig {
            mode: ModeSetting::RuleCatalog,
            ..SessionConfig::default()
        };
        config.catalog.overrides = Some(vec![OverrideSettings::new(
            "ghost",
            RuleSettings::default(),
        )]);
        assert_eq!(
            config.planner().expect_err("unknown template"),
            ConfigError::UnknownTemplate {
                name: "ghost".to_owned()
            }
        );

        config.catalog.overrides = Some(vec![
            OverrideSettings::new("warlord", RuleSettings::default()),
            OverrideSettings::new("warlord", RuleSettings::default()),
        ]);
        assert_eq!(
            config.planner().expect_err("duplicate override"),
            ConfigError::DuplicateOverride {
                name: "warlord".to_owned()
            }
        );
    }

    #[test]
    fn rejects_misspelled_override_fields() {
        let error = SessionConfig::parse(
            r#"
            [[catalog.overrides]]
            template = "grunt"
            intervall = 3
            "#,
        )
        .expect_err("unknown field");
        assert!(format!("{error:#}").contains("intervall"));
    }

    #[test]
    fn partial_catalog_table_keeps_builtin_overrides() {
        let config = SessionConfig::parse(
            r#"
            mode = "rule_catalog"

            [catalog]
            boss_interval = 3
            "#,
        )
        .expect("valid config");
        let (planner, registry) = config.planner().expect("catalog builds");
        let PlannerMode::RuleCatalog(catalog) = planner.mode else {
            panic!("expected catalog mode");
        };
        assert_eq!(catalog.catalog().boss_interval(), 3);

        let warlord = catalog
            .catalog()
            .resolve(registry.lookup("warlord").expect("declared").id());
        assert!(warlord.is_boss());
        assert!(warlord.rule().is_only_on_boss_waves());

        let runner = catalog
            .catalog()
            .resolve(registry.lookup("runner").expect("declared").id());
        assert_eq!(runner.rule().start_wave(), 3);
        assert_eq!(runner.rule().pack_radius(), Some(3.0));
    }

    #[test]
    fn boss_templates_stay_bosses_in_catalog_mode() {
        let config = SessionConfig::parse(
            r#"
            mode = "rule_catalog"

            [[templates]]
            name = "grunt"

            [[templates]]
            name = "titan"
            boss = true

            [[templates]]
            name = "colossus"
            boss = true

            [catalog]
            overrides = [{ template = "colossus", count = { constant = 2.0 } }]
            "#,
        )
        .expect("valid config");
        let (planner, registry) = config.planner().expect("catalog builds");
        let PlannerMode::RuleCatalog(catalog) = planner.mode else {
            panic!("expected catalog mode");
        };

        for name in ["titan", "colossus"] {
            let resolved = catalog
                .catalog()
                .resolve(registry.lookup(name).expect("declared").id());
            assert!(resolved.is_boss(), "{name} should be a boss");
            assert!(resolved.rule().is_only_on_boss_waves());
        }
        let grunt = catalog
            .catalog()
            .resolve(registry.lookup("grunt").expect("declared").id());
        assert!(!grunt.is_boss());
    }

    #[test]
    fn degenerate_timings_are_clamped() {
        let config = SessionConfig {
            frame_hz: 0,
            wave_seconds: -3.0,
            ..SessionConfig::default()
        };
        assert_eq!(config.frame_step(), Duration::from_secs(1));
        assert_eq!(config.wave_interval(), Duration::ZERO);

        let huge = SessionConfig {
            wave_seconds: 1e30,
            ..SessionConfig::default()
        };
        assert_eq!(huge.wave_interval(), Duration::from_secs(3600));
        let unbounded = SessionConfig {
            wave_seconds: f32::INFINITY,
            ..SessionConfig::default()
        };
        assert_eq!(unbounded.wave_interval(), Duration::from_secs(3600));
    }
}
