use crate::field::ParticleField;
use crate::field_params::Preset;
use crate::particle::ParticleKind;
use crate::sprite::Sprite;
use crate::surface::Canvas;
use log::{info, warn};
use rand::{rngs::StdRng, SeedableRng};

#[derive(Debug, Clone, PartialEq)]
pub enum ControllerCommand {
    // Press the toggle button at this index.
    Select(usize),
    // Press the first toggle button showing this kind.
    SelectKind(String),
    // Press the button after the last one pressed, wrapping around.
    Cycle,
}

/// Owns the toggle buttons and the live particle field.
///
/// Pressing a button tears the current field down and builds a new one on
/// the same surface from that button's raw kind and quantity. Presses can
/// come from any thread through [`ParticlesController::handle`]; they are
/// applied at the start of the next tick.
pub struct ParticlesController<C: Canvas> {
    presets: Vec<Preset>,
    // The highlighted button, which is not always the one pressed.
    active_button: Option<usize>,
    pressed: usize,
    frame_rate: f64,
    sprite: Option<Sprite>,
    seed: Option<u64>,
    generation: u64,
    field: ParticleField<C>,
    command_tx: crossbeam_channel::Sender<ControllerCommand>,
    command_rx: crossbeam_channel::Receiver<ControllerCommand>,
}

impl<C: Canvas> ParticlesController<C> {
    pub fn new(
        canvas: C,
        presets: Vec<Preset>,
        frame_rate: f64,
        sprite: Option<Sprite>,
        seed: Option<u64>,
    ) -> Self {
        let (command_tx, command_rx) = crossbeam_channel::unbounded::<ControllerCommand>();
        let mut controller = ParticlesController {
            presets,
            active_button: None,
            pressed: 0,
            frame_rate,
            sprite,
            seed,
            generation: 0,
            field: ParticleField::inert(canvas, frame_rate),
            command_tx,
            command_rx,
        };
        // The first button starts out active.
        match controller.presets.first().cloned() {
            Some(preset) => {
                controller.active_button = Some(0);
                controller.rebuild(&preset);
            }
            None => warn!("No particle presets configured, the field stays empty"),
        }
        controller
    }

    pub fn handle(&self) -> crossbeam_channel::Sender<ControllerCommand> {
        self.command_tx.clone()
    }

    pub fn presets(&self) -> &[Preset] {
        &self.presets
    }

    pub fn active_button(&self) -> Option<usize> {
        self.active_button
    }

    pub fn field(&self) -> &ParticleField<C> {
        &self.field
    }

    pub fn canvas(&self) -> Option<&C> {
        self.field.canvas()
    }

    pub fn select(&mut self, index: usize) {
        let preset = match self.presets.get(index) {
            Some(preset) => preset.clone(),
            None => {
                warn!("No particle preset at index {}", index);
                return;
            }
        };
        self.pressed = index;
        self.update_button_state(&preset.kind);
        self.rebuild(&preset);
        info!(
            "Switched to preset {} ({} x {})",
            index, preset.kind, preset.quantity
        );
    }

    pub fn select_kind(&mut self, kind: &str) {
        match self.presets.iter().position(|p| p.kind == kind) {
            Some(index) => self.select(index),
            None => warn!("No particle preset for kind {:?}", kind),
        }
    }

    pub fn cycle(&mut self) {
        if !self.presets.is_empty() {
            self.select((self.pressed + 1) % self.presets.len());
        }
    }

    /// Applies pending commands, then advances and draws the field.
    pub fn tick(&mut self) {
        self.poll_commands();
        self.field.tick();
    }

    /// Tears the field down and returns the surface.
    pub fn destroy(mut self) -> Option<C> {
        self.field.teardown()
    }

    fn poll_commands(&mut self) {
        while let Ok(command) = self.command_rx.try_recv() {
            self.handle_command(command);
        }
    }

    fn handle_command(&mut self, command: ControllerCommand) {
        match command {
            ControllerCommand::Select(index) => self.select(index),
            ControllerCommand::SelectKind(kind) => self.select_kind(&kind),
            ControllerCommand::Cycle => self.cycle(),
        }
    }

    // Highlights the button for `kind`, or the mist button when the kind is
    // not one we know.
    fn update_button_state(&mut self, kind: &str) {
        let known = kind.parse::<ParticleKind>().is_ok();
        let highlighted = if known { kind } else { ParticleKind::Mist.name() };
        self.active_button = self.presets.iter().position(|p| p.kind == highlighted);
    }

    fn rebuild(&mut self, preset: &Preset) {
        let canvas = match self.field.teardown() {
            Some(canvas) => canvas,
            None => {
                warn!("Particle surface already released, ignoring {:?}", preset);
                return;
            }
        };
        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(self.generation)),
            None => StdRng::from_entropy(),
        };
        self.generation += 1;
        let mut field = ParticleField::from_preset_with_rng(canvas, preset, self.frame_rate, rng);
        if field.kind() == Some(ParticleKind::Smoke) {
            if let Some(sprite) = &self.sprite {
                field = field.with_sprite(sprite.clone());
            }
        }
        self.field = field;
    }
}
