use crate::field_params::Preset;
use crate::particle::{Arena, Fate, Mist, Particle, ParticleKind, Scatter, Smoke};
use crate::sprite::Sprite;
use crate::surface::Canvas;
use log::{debug, trace, warn};
use rand::{rngs::StdRng, Rng, SeedableRng};

// A validated field configuration. Raw button values go through
// `Preset::resolve` first.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FieldConfig {
    pub kind: ParticleKind,
    pub count: usize,
    // Advisory only: the host decides when to tick.
    pub frame_rate: f64,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FieldState {
    Active,
    TornDown,
}

/// The particles of one field, tagged by kind. The length never changes after
/// construction; expired particles are overwritten in place.
#[derive(Debug, Clone, PartialEq)]
pub enum Swarm {
    // Nothing to simulate; update and draw do nothing at all.
    Inert,
    Mist(Vec<Mist>),
    Smoke(Vec<Smoke>),
    Scatter(Vec<Scatter>),
}

impl Swarm {
    fn populate<R: Rng>(config: &FieldConfig, arena: &Arena, rng: &mut R) -> Self {
        if config.count == 0 {
            return Swarm::Inert;
        }
        match config.kind {
            ParticleKind::Mist => Swarm::Mist(spawn_all(config.count, arena, rng)),
            ParticleKind::Smoke => Swarm::Smoke(spawn_all(config.count, arena, rng)),
            ParticleKind::Scatter => Swarm::Scatter(spawn_all(config.count, arena, rng)),
        }
    }

    pub fn kind(&self) -> Option<ParticleKind> {
        match self {
            Swarm::Inert => None,
            Swarm::Mist(_) => Some(ParticleKind::Mist),
            Swarm::Smoke(_) => Some(ParticleKind::Smoke),
            Swarm::Scatter(_) => Some(ParticleKind::Scatter),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Swarm::Inert => 0,
            Swarm::Mist(particles) => particles.len(),
            Swarm::Smoke(particles) => particles.len(),
            Swarm::Scatter(particles) => particles.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn spawn_all<P: Particle, R: Rng>(count: usize, arena: &Arena, rng: &mut R) -> Vec<P> {
    (0..count).map(|_| P::spawn(arena, rng)).collect()
}

// Steps every particle once and respawns the expired ones. Returns how many
// were respawned.
fn advance<P: Particle, R: Rng>(particles: &mut [P], arena: &Arena, rng: &mut R) -> usize {
    let mut respawned = 0;
    for particle in particles.iter_mut() {
        if particle.step(arena) == Fate::Expired {
            *particle = P::spawn(arena, rng);
            respawned += 1;
        }
    }
    respawned
}

fn render<P: Particle, C: Canvas + ?Sized>(particles: &[P], canvas: &mut C, sprite: Option<&Sprite>) {
    for particle in particles {
        particle.draw(canvas, sprite);
    }
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct FieldStats {
    pub ticks: u64,
    pub respawns: u64,
}

/// A fixed population of particles bound to a drawing surface.
///
/// The host calls [`ParticleField::tick`] once per display refresh. A field
/// is built for one kind and count; switching either means tearing this one
/// down and constructing another on the returned surface.
pub struct ParticleField<C: Canvas> {
    // None once torn down.
    canvas: Option<C>,
    sprite: Option<Sprite>,
    arena: Arena,
    frame_rate: f64,
    swarm: Swarm,
    rng: StdRng,
    state: FieldState,
    stats: FieldStats,
}

impl<C: Canvas> ParticleField<C> {
    pub fn new(canvas: C, config: FieldConfig) -> Self {
        ParticleField::with_rng(canvas, config, StdRng::from_entropy())
    }

    pub fn with_rng(canvas: C, config: FieldConfig, mut rng: StdRng) -> Self {
        let arena = Arena::new(canvas.width(), canvas.height());
        let swarm = Swarm::populate(&config, &arena, &mut rng);
        debug!(
            "Spawned {} {} particles on a {}x{} surface",
            swarm.len(),
            config.kind,
            arena.width,
            arena.height
        );
        ParticleField {
            canvas: Some(canvas),
            sprite: None,
            arena,
            frame_rate: config.frame_rate,
            swarm,
            rng,
            state: FieldState::Active,
            stats: FieldStats::default(),
        }
    }

    /// A field that never touches its surface.
    pub fn inert(canvas: C, frame_rate: f64) -> Self {
        let arena = Arena::new(canvas.width(), canvas.height());
        ParticleField {
            canvas: Some(canvas),
            sprite: None,
            arena,
            frame_rate,
            swarm: Swarm::Inert,
            rng: StdRng::from_entropy(),
            state: FieldState::Active,
            stats: FieldStats::default(),
        }
    }

    pub fn from_preset(canvas: C, preset: &Preset, frame_rate: f64) -> Self {
        ParticleField::from_preset_with_rng(canvas, preset, frame_rate, StdRng::from_entropy())
    }

    /// Builds a field from raw toggle values. A bad kind or quantity is not an
    /// error here; it produces an inert field.
    pub fn from_preset_with_rng(canvas: C, preset: &Preset, frame_rate: f64, rng: StdRng) -> Self {
        match preset.resolve(frame_rate) {
            Ok(config) => ParticleField::with_rng(canvas, config, rng),
            Err(e) => {
                warn!("Ignoring particle preset {:?}: {}", preset, e);
                ParticleField::inert(canvas, frame_rate)
            }
        }
    }

    pub fn with_sprite(mut self, sprite: Sprite) -> Self {
        self.sprite = Some(sprite);
        self
    }

    pub fn kind(&self) -> Option<ParticleKind> {
        self.swarm.kind()
    }

    pub fn len(&self) -> usize {
        self.swarm.len()
    }

    pub fn is_empty(&self) -> bool {
        self.swarm.is_empty()
    }

    pub fn is_inert(&self) -> bool {
        matches!(self.swarm, Swarm::Inert)
    }

    pub fn swarm(&self) -> &Swarm {
        &self.swarm
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn frame_rate(&self) -> f64 {
        self.frame_rate
    }

    pub fn state(&self) -> FieldState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == FieldState::Active
    }

    pub fn stats(&self) -> FieldStats {
        self.stats
    }

    pub fn canvas(&self) -> Option<&C> {
        self.canvas.as_ref()
    }

    /// Advances every particle by one step.
    pub fn update(&mut self) {
        if !self.is_active() {
            return;
        }
        let arena = &self.arena;
        let rng = &mut self.rng;
        let respawned = match &mut self.swarm {
            Swarm::Inert => 0,
            Swarm::Mist(particles) => advance(particles, arena, rng),
            Swarm::Smoke(particles) => advance(particles, arena, rng),
            Swarm::Scatter(particles) => advance(particles, arena, rng),
        };
        if respawned > 0 {
            trace!("Respawned {} particles", respawned);
        }
        self.stats.respawns += respawned as u64;
    }

    /// Clears the surface and paints every particle. Does nothing once the
    /// surface has been released or when the field is inert.
    pub fn draw(&mut self) {
        let ParticleField {
            canvas,
            sprite,
            arena,
            swarm,
            ..
        } = self;
        let canvas = match canvas {
            Some(canvas) => canvas,
            None => return,
        };
        let sprite = sprite.as_ref();
        match swarm {
            Swarm::Inert => {}
            Swarm::Mist(particles) => {
                canvas.clear_rect(0.0, 0.0, arena.width, arena.height);
                render(particles, canvas, sprite);
            }
            Swarm::Smoke(particles) => {
                canvas.clear_rect(0.0, 0.0, arena.width, arena.height);
                render(particles, canvas, sprite);
            }
            Swarm::Scatter(particles) => {
                canvas.clear_rect(0.0, 0.0, arena.width, arena.height);
                render(particles, canvas, sprite);
            }
        }
    }

    pub fn tick(&mut self) {
        if !self.is_active() {
            return;
        }
        self.update();
        self.draw();
        self.stats.ticks += 1;
    }

    /// Stops the field for good and hands the surface back. Later calls
    /// return `None`.
    pub fn teardown(&mut self) -> Option<C> {
        if self.state == FieldState::TornDown {
            return None;
        }
        self.state = FieldState::TornDown;
        debug!(
            "Tore down {:?} field after {} ticks ({} respawns)",
            self.kind(),
            self.stats.ticks,
            self.stats.respawns
        );
        self.canvas.take()
    }
}
