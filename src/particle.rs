//! Per-kind particle records and their spawn, step and draw rules.
//!
//! Every kind shares position `(x, y)` and velocity `(vx, vy)` in surface
//! pixels per tick. `Mist` and `Smoke` age and fade, and are respawned by the
//! field when their alpha runs out. `Scatter` never ages; it bounces off the
//! surface edges.

use crate::sprite::Sprite;
use crate::surface::{Canvas, ACCENT};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Multiplies `life` out of a particle's vertical speed at spawn.
pub const LIFE_PER_SPEED: f64 = 2000.0;

/// Spawn band depth above (mist) or below (smoke) the surface, as a fraction
/// of its height.
pub const SPAWN_BAND: f64 = 0.15;

pub const SCATTER_RADIUS: f64 = 2.0;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticleKind {
    Mist,
    Smoke,
    Scatter,
}

impl ParticleKind {
    pub const ALL: [ParticleKind; 3] = [ParticleKind::Mist, ParticleKind::Smoke, ParticleKind::Scatter];

    pub fn name(self) -> &'static str {
        match self {
            ParticleKind::Mist => "mist",
            ParticleKind::Smoke => "smoke",
            ParticleKind::Scatter => "scatter",
        }
    }
}

impl std::fmt::Display for ParticleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for ParticleKind {
    type Err = crate::error::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mist" => Ok(ParticleKind::Mist),
            "smoke" => Ok(ParticleKind::Smoke),
            "scatter" => Ok(ParticleKind::Scatter),
            other => Err(crate::error::Error::UnknownKind(other.to_string())),
        }
    }
}

/// What a field needs to know about its surroundings to step a particle.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Arena {
    pub width: f64,
    pub height: f64,
    // Multiplied into a velocity component on edge collision.
    pub bounce: f64,
}

impl Arena {
    pub fn new(width: f64, height: f64) -> Self {
        Arena {
            width,
            height,
            bounce: -1.0,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Fate {
    Alive,
    Expired,
}

pub trait Particle: Sized {
    const KIND: ParticleKind;

    /// A freshly initialized particle. Respawning replaces the whole record.
    fn spawn<R: Rng>(arena: &Arena, rng: &mut R) -> Self;

    fn step(&mut self, arena: &Arena) -> Fate;

    fn draw<C: Canvas + ?Sized>(&self, canvas: &mut C, sprite: Option<&Sprite>);
}

// Uniform over [low, high), the same way Math.random() scales.
fn uniform<R: Rng>(rng: &mut R, low: f64, high: f64) -> f64 {
    low + (high - low) * rng.gen::<f64>()
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Mist {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub life: f64,
    pub elapsed: f64,
    pub alpha: f64,
    pub radius: f64,
}

impl Particle for Mist {
    const KIND: ParticleKind = ParticleKind::Mist;

    fn spawn<R: Rng>(arena: &Arena, rng: &mut R) -> Self {
        let x = uniform(rng, 0.0, arena.width);
        let y = uniform(rng, -SPAWN_BAND * arena.height, 0.0);
        let vx = uniform(rng, -1.0, 1.0);
        let vy = uniform(rng, 0.0, 2.0);
        Mist {
            x,
            y,
            vx,
            vy,
            life: vy * LIFE_PER_SPEED,
            elapsed: 0.0,
            alpha: 1.0,
            radius: 1.0,
        }
    }

    fn step(&mut self, _arena: &Arena) -> Fate {
        self.x += self.vx;
        self.y += self.vy;
        self.alpha -= self.elapsed / self.life;
        self.elapsed += 10.0;
        self.radius -= 0.01;

        // alpha <= 0, with NaN (zero life) counted as spent.
        if !(self.alpha > 0.0) {
            Fate::Expired
        } else {
            Fate::Alive
        }
    }

    fn draw<C: Canvas + ?Sized>(&self, canvas: &mut C, _sprite: Option<&Sprite>) {
        canvas.fill_arc(self.x, self.y, self.radius, ACCENT.with_alpha(self.alpha));
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Smoke {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub life: f64,
    pub elapsed: f64,
    pub alpha: f64,
    pub width: f64,
    pub height: f64,
    pub rotation: f64,
}

impl Particle for Smoke {
    const KIND: ParticleKind = ParticleKind::Smoke;

    fn spawn<R: Rng>(arena: &Arena, rng: &mut R) -> Self {
        let x = uniform(rng, 0.0, arena.width);
        let y = uniform(rng, arena.height, arena.height * (1.0 + SPAWN_BAND));
        let vx = uniform(rng, -4.0, 0.0);
        let vy = uniform(rng, 0.0, 4.0);
        Smoke {
            x,
            y,
            vx,
            vy,
            life: vy * LIFE_PER_SPEED,
            elapsed: 0.0,
            alpha: 1.0,
            width: uniform(rng, 100.0, 200.0),
            height: uniform(rng, 46.0, 92.0),
            rotation: uniform(rng, 0.0, 10.0).to_radians(),
        }
    }

    fn step(&mut self, _arena: &Arena) -> Fate {
        self.x += self.vx;
        self.y -= self.vy;
        self.alpha -= self.elapsed / self.life;
        self.elapsed += 1.0;
        self.width += 3.0;
        self.height += 3.0;

        // Strictly below zero: a smoke puff lingers one more tick at alpha 0.
        if !(self.alpha >= 0.0) {
            Fate::Expired
        } else {
            Fate::Alive
        }
    }

    fn draw<C: Canvas + ?Sized>(&self, canvas: &mut C, sprite: Option<&Sprite>) {
        if let Some(sprite) = sprite {
            canvas.draw_rotated_image(
                sprite,
                self.x,
                self.y,
                self.width,
                self.height,
                self.alpha,
                self.rotation,
            );
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Scatter {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
}

// Clamps one coordinate into [0, limit], reflecting its velocity on contact.
fn reflect(position: &mut f64, velocity: &mut f64, limit: f64, bounce: f64) {
    if *position > limit {
        *position = limit;
        *velocity *= bounce;
    } else if *position < 0.0 {
        *position = 0.0;
        *velocity *= bounce;
    }
}

impl Particle for Scatter {
    const KIND: ParticleKind = ParticleKind::Scatter;

    fn spawn<R: Rng>(arena: &Arena, rng: &mut R) -> Self {
        Scatter {
            x: uniform(rng, 0.0, arena.width),
            y: uniform(rng, 0.0, arena.height),
            vx: uniform(rng, -0.5, 0.5),
            vy: uniform(rng, -0.5, 0.5),
        }
    }

    fn step(&mut self, arena: &Arena) -> Fate {
        self.x += self.vx;
        self.y += self.vy;
        reflect(&mut self.x, &mut self.vx, arena.width, arena.bounce);
        reflect(&mut self.y, &mut self.vy, arena.height, arena.bounce);
        Fate::Alive
    }

    fn draw<C: Canvas + ?Sized>(&self, canvas: &mut C, _sprite: Option<&Sprite>) {
        canvas.stroke_arc(self.x, self.y, SCATTER_RADIUS, ACCENT);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{DrawCommand, RecordingCanvas};
    use rand::{rngs::StdRng, SeedableRng};

    fn in_range(v: f64, low: f64, high: f64) -> bool {
        v >= low && v < high
    }

    #[test]
    fn parses_kinds() {
        for kind in ParticleKind::ALL.iter() {
            assert_eq!(kind.name().parse::<ParticleKind>().unwrap(), *kind);
        }
        assert!("fog".parse::<ParticleKind>().is_err());
        assert!("Mist".parse::<ParticleKind>().is_err());
    }

    #[test]
    fn mist_spawn_ranges() {
        let arena = Arena::new(800.0, 600.0);
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..1000 {
            let p = Mist::spawn(&arena, &mut rng);
            assert!(in_range(p.x, 0.0, 800.0));
            assert!(in_range(p.y, -90.0, 0.0));
            assert!(in_range(p.vx, -1.0, 1.0));
            assert!(in_range(p.vy, 0.0, 2.0));
            assert_eq!(p.life, p.vy * 2000.0);
            assert_eq!((p.elapsed, p.alpha, p.radius), (0.0, 1.0, 1.0));
        }
    }

    #[test]
    fn smoke_spawn_ranges() {
        let arena = Arena::new(800.0, 600.0);
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..1000 {
            let p = Smoke::spawn(&arena, &mut rng);
            assert!(in_range(p.x, 0.0, 800.0));
            assert!(in_range(p.y, 600.0, 690.0));
            assert!(in_range(p.vx, -4.0, 0.0));
            assert!(in_range(p.vy, 0.0, 4.0));
            assert_eq!(p.life, p.vy * 2000.0);
            assert!(in_range(p.width, 100.0, 200.0));
            assert!(in_range(p.height, 46.0, 92.0));
            assert!(in_range(p.rotation, 0.0, 10f64.to_radians()));
            assert_eq!((p.elapsed, p.alpha), (0.0, 1.0));
        }
    }

    #[test]
    fn scatter_spawn_ranges() {
        let arena = Arena::new(320.0, 180.0);
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..1000 {
            let p = Scatter::spawn(&arena, &mut rng);
            assert!(in_range(p.x, 0.0, 320.0));
            assert!(in_range(p.y, 0.0, 180.0));
            assert!(in_range(p.vx, -0.5, 0.5));
            assert!(in_range(p.vy, -0.5, 0.5));
        }
    }

    #[test]
    fn mist_step() {
        let arena = Arena::new(100.0, 100.0);
        let mut p = Mist {
            x: 10.0,
            y: 20.0,
            vx: 0.5,
            vy: 1.0,
            life: 2000.0,
            elapsed: 100.0,
            alpha: 0.5,
            radius: 1.0,
        };
        assert_eq!(p.step(&arena), Fate::Alive);
        assert_eq!((p.x, p.y), (10.5, 21.0));
        assert!((p.alpha - 0.45).abs() < 1e-12);
        assert_eq!(p.elapsed, 110.0);
        assert!((p.radius - 0.99).abs() < 1e-12);
    }

    #[test]
    fn mist_expires_at_exactly_zero() {
        let arena = Arena::new(100.0, 100.0);
        let mut p = Mist {
            x: 0.0,
            y: 0.0,
            vx: 0.0,
            vy: 1.0,
            life: 2000.0,
            elapsed: 1000.0,
            alpha: 0.5,
            radius: 1.0,
        };
        assert_eq!(p.step(&arena), Fate::Expired);
        assert_eq!(p.alpha, 0.0);
    }

    #[test]
    fn smoke_survives_exactly_zero() {
        let arena = Arena::new(100.0, 100.0);
        let mut p = Smoke {
            x: 50.0,
            y: 50.0,
            vx: -1.0,
            vy: 2.0,
            life: 4000.0,
            elapsed: 2000.0,
            alpha: 0.5,
            width: 100.0,
            height: 50.0,
            rotation: 0.0,
        };
        assert_eq!(p.step(&arena), Fate::Alive);
        assert_eq!(p.alpha, 0.0);
        assert_eq!((p.x, p.y), (49.0, 48.0));
        assert_eq!((p.width, p.height, p.elapsed), (103.0, 53.0, 2001.0));

        // Next tick pushes it below zero.
        assert_eq!(p.step(&arena), Fate::Expired);
        assert!(p.alpha < 0.0);
    }

    #[test]
    fn zero_life_counts_as_expired() {
        let arena = Arena::new(100.0, 100.0);
        let mut mist = Mist {
            x: 0.0,
            y: 0.0,
            vx: 0.0,
            vy: 0.0,
            life: 0.0,
            elapsed: 0.0,
            alpha: 1.0,
            radius: 1.0,
        };
        assert_eq!(mist.step(&arena), Fate::Expired);

        let mut smoke = Smoke {
            x: 0.0,
            y: 0.0,
            vx: 0.0,
            vy: 0.0,
            life: 0.0,
            elapsed: 0.0,
            alpha: 1.0,
            width: 100.0,
            height: 50.0,
            rotation: 0.0,
        };
        assert_eq!(smoke.step(&arena), Fate::Expired);
    }

    #[test]
    fn scatter_bounces_off_each_edge() {
        let arena = Arena::new(100.0, 50.0);

        let mut right = Scatter {
            x: 99.8,
            y: 10.0,
            vx: 0.4,
            vy: 0.0,
        };
        right.step(&arena);
        assert_eq!((right.x, right.vx), (100.0, -0.4));

        let mut left = Scatter {
            x: 0.1,
            y: 10.0,
            vx: -0.3,
            vy: 0.0,
        };
        left.step(&arena);
        assert_eq!((left.x, left.vx), (0.0, 0.3));

        let mut bottom = Scatter {
            x: 10.0,
            y: 49.9,
            vx: 0.0,
            vy: 0.25,
        };
        bottom.step(&arena);
        assert_eq!((bottom.y, bottom.vy), (50.0, -0.25));

        let mut top = Scatter {
            x: 10.0,
            y: 0.2,
            vx: 0.1,
            vy: -0.5,
        };
        top.step(&arena);
        assert_eq!((top.y, top.vy), (0.0, 0.5));
        assert_eq!(top.vx, 0.1);
    }

    #[test]
    fn scatter_on_the_edge_keeps_velocity() {
        let arena = Arena::new(100.0, 50.0);
        let mut p = Scatter {
            x: 99.5,
            y: 25.0,
            vx: 0.5,
            vy: 0.0,
        };
        p.step(&arena);
        assert_eq!((p.x, p.vx), (100.0, 0.5));
    }

    #[test]
    fn draw_rules() {
        let mut canvas = RecordingCanvas::new(100.0, 100.0);
        let mist = Mist {
            x: 1.0,
            y: 2.0,
            vx: 0.0,
            vy: 1.0,
            life: 2000.0,
            elapsed: 0.0,
            alpha: 0.75,
            radius: 0.9,
        };
        mist.draw(&mut canvas, None);
        Scatter {
            x: 3.0,
            y: 4.0,
            vx: 0.0,
            vy: 0.0,
        }
        .draw(&mut canvas, None);
        let smoke = Smoke {
            x: 5.0,
            y: 6.0,
            vx: 0.0,
            vy: 1.0,
            life: 2000.0,
            elapsed: 0.0,
            alpha: 0.5,
            width: 120.0,
            height: 60.0,
            rotation: 0.1,
        };
        // Without a sprite smoke has nothing to draw.
        smoke.draw(&mut canvas, None);
        let sprite = Sprite::puff(8).unwrap();
        smoke.draw(&mut canvas, Some(&sprite));

        assert_eq!(
            canvas.commands,
            vec![
                DrawCommand::FillArc {
                    x: 1.0,
                    y: 2.0,
                    radius: 0.9,
                    color: ACCENT.with_alpha(0.75),
                },
                DrawCommand::StrokeArc {
                    x: 3.0,
                    y: 4.0,
                    radius: SCATTER_RADIUS,
                    color: ACCENT,
                },
                DrawCommand::RotatedImage {
                    sprite_size: (8, 8),
                    x: 5.0,
                    y: 6.0,
                    width: 120.0,
                    height: 60.0,
                    alpha: 0.5,
                    rotation: 0.1,
                },
            ]
        );
    }
}
