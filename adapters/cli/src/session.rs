//! Fixed-step survival session wiring the systems together.

use std::{collections::BTreeMap, time::Duration};

use glam::Vec2;
use horde_core::{CameraView, Command, Event, OrthographicCamera, TemplateId};
use horde_system_population::PopulationDispatcher;
use horde_system_wave_planner::{execute_commands, WavePlanner};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::{
    arena::{Arena, ArenaStats},
    clock::WaveClock,
    config::{ConfigError, PlayerConfig, SessionConfig, TemplateRegistry},
};

/// Totals gathered over a complete session.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct SessionSummary {
    pub(crate) waves: u32,
    pub(crate) frames: u64,
    pub(crate) spawned: u32,
    pub(crate) spawned_in_view: u32,
    pub(crate) departed: u32,
    pub(crate) removed: usize,
    pub(crate) alive: usize,
    pub(crate) per_template: BTreeMap<TemplateId, u32>,
    pub(crate) arena: ArenaStats,
}

pub(crate) struct Session {
    planner: WavePlanner,
    registry: TemplateRegistry,
    dispatcher: PopulationDispatcher,
    arena: Arena,
    camera: OrthographicCamera,
    clock: WaveClock,
    rng: ChaCha8Rng,
    player: PlayerConfig,
    frame_step: Duration,
    physics_step: Duration,
    wave_interval: Duration,
    physics_accumulator: Duration,
    elapsed: Duration,
    summary: SessionSummary,
}

impl Session {
    pub(crate) fn new(config: &SessionConfig) -> Result<Self, ConfigError> {
        let (planner, registry) = config.planner()?;
        let start = orbit_position(&config.player, 0.0);
        Ok(Self {
            planner: WavePlanner::new(planner),
            registry,
            dispatcher: PopulationDispatcher::new(),
            arena: Arena::new(config.arena),
            camera: OrthographicCamera::new(start, config.camera.half_extents()),
            clock: WaveClock::new(config.wave_interval(), config.waves),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            player: config.player,
            frame_step: config.frame_step(),
            physics_step: config.physics_step(),
            wave_interval: config.wave_interval(),
            physics_accumulator: Duration::ZERO,
            elapsed: Duration::ZERO,
            summary: SessionSummary::default(),
        })
    }

    /// Runs frames until the last wave has started and played out one interval.
    pub(crate) fn run(mut self) -> SessionSummary {
        let mut tail = Duration::ZERO;
        loop {
            self.frame();
            if self.clock.is_finished() {
                if tail >= self.wave_interval {
                    break;
                }
                tail += self.frame_step;
            }
        }
        self.finish()
    }

    fn frame(&mut self) {
        let dt = self.frame_step;
        self.elapsed += dt;
        self.summary.frames += 1;

        let player = orbit_position(&self.player, self.elapsed.as_secs_f32());
        self.arena.move_player(player);
        self.forget_departures();
        self.camera.follow(player);

        let mut waves = Vec::new();
        self.clock.handle(&[Event::TimeAdvanced { dt }], &mut waves);

        let mut commands: Vec<Command> = Vec::new();
        self.planner.handle(
            &waves,
            player,
            Some(&self.camera),
            &mut self.rng,
            &mut commands,
        );

        let mut spawned = Vec::new();
        execute_commands(&commands, &mut self.arena, &mut spawned);
        for event in &spawned {
            if let Event::EntitySpawned {
                entity,
                template,
                position,
            } = event
            {
                self.dispatcher.register(*entity);
                self.summary.spawned += 1;
                *self.summary.per_template.entry(template.id()).or_default() += 1;
                if self.camera.is_visible(*position) {
                    self.summary.spawned_in_view += 1;
                }
            }
        }

        let report = self.dispatcher.tick(&mut self.arena, dt);
        self.summary.removed += report.removed;

        self.physics_accumulator += dt;
        while self.physics_accumulator >= self.physics_step {
            self.physics_accumulator -= self.physics_step;
            let report = self.dispatcher.fixed_tick(&mut self.arena, self.physics_step);
            self.summary.removed += report.removed;
        }

        self.forget_departures();
    }

    /// Unregisters every entity the arena despawned since the last call.
    fn forget_departures(&mut self) {
        let mut departures = Vec::new();
        self.arena.drain_departures(&mut departures);
        for event in &departures {
            if let Event::EntityDespawned { entity } = event {
                self.dispatcher.unregister(*entity);
                self.summary.departed += 1;
            }
        }
        if !departures.is_empty() {
            tracing::trace!(count = departures.len(), "entities despawned");
        }
    }

    fn finish(mut self) -> SessionSummary {
        self.summary.waves = self.clock.last_wave().get();
        self.summary.alive = self.dispatcher.len();
        self.summary.arena = self.arena.stats();

        for (template, count) in &self.summary.per_template {
            let name = self.registry.name_of(*template).unwrap_or("unknown");
            tracing::debug!(template = name, count, "spawned per template");
        }
        tracing::debug!(
            live = self.arena.live_count(),
            registered = self.summary.alive,
            "arena population at teardown"
        );

        self.dispatcher.clear();
        self.summary
    }
}

fn orbit_position(player: &PlayerConfig, seconds: f32) -> Vec2 {
    Vec2::from_angle(player.angular_speed * seconds) * player.orbit_radius
}
