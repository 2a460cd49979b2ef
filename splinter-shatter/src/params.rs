//! The scalar knobs steering the effect.
//!
//! Several knobs are exposed to users on a friendlier scale than the engine wants them on. Each
//! of those keeps its raw value next to a derived one, and the setter recomputes the derived value
//! on the spot, so the engine only ever reads the derived side:
//!
//! | knob           | derived                      |
//! |----------------|------------------------------|
//! | `fragVel`      | `10^fragVel - 1`             |
//! | `fragRot`      | `10^fragRot - 1`             |
//! | `fragDecay`    | `1 - fragDecay^2`            |
//! | `fragAlphaPow` | `fragAlphaPow^2`             |
//!
//! `fragMaxAge`, `fragVisitInt` and the colour channels are used as they are.

use crate::error::ParamError;

/// A knob as a control panel sees it.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Knob {
    pub name: &'static str,
    pub min: f64,
    pub max: f64,
}

pub const KNOBS: &[Knob] = &[
    Knob { name: "fragMaxAge", min: 0.1, max: 20. },
    Knob { name: "fragVel", min: 0., max: 1. },
    Knob { name: "fragRot", min: 0., max: 1. },
    Knob { name: "fragDecay", min: 0., max: 1. },
    Knob { name: "fragAlphaPow", min: 0., max: 2. },
    Knob { name: "fragVisitInt", min: 0., max: 1. },
    Knob { name: "fragColorR", min: 0.5, max: 1. },
    Knob { name: "fragColorG", min: 0.5, max: 1. },
    Knob { name: "fragColorB", min: 0.5, max: 1. },
];

impl Knob {
    pub fn lookup(name: &str) -> Result<&'static Knob, ParamError> {
        KNOBS
            .iter()
            .find(|k| k.name == name)
            .ok_or_else(|| ParamError::UnknownParam(name.to_owned()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShatterParams {
    max_age: f64,
    vel: f32,
    vel_scale: f32,
    rot: f32,
    rot_scale: f32,
    decay: f32,
    decay_scale: f32,
    alpha_pow: f32,
    alpha_pow_scale: f32,
    visit_interval: f64,
    color: [f32; 3],
}

impl Default for ShatterParams {
    fn default() -> Self {
        let mut p = ShatterParams {
            max_age: 2.,
            vel: 0.,
            vel_scale: 0.,
            rot: 0.,
            rot_scale: 0.,
            decay: 0.,
            decay_scale: 1.,
            alpha_pow: 0.,
            alpha_pow_scale: 0.,
            visit_interval: 0.01,
            color: [1., 1., 1.],
        };
        p.set_vel(0.2);
        p.set_rot(0.2);
        p.set_decay(0.1);
        p.set_alpha_pow(1.);
        p
    }
}

impl ShatterParams {
    /// Seconds a fragment lives for.
    pub fn max_age(&self) -> f64 {
        self.max_age
    }
    pub fn set_max_age(&mut self, v: f64) {
        self.max_age = v;
    }

    pub fn vel(&self) -> f32 {
        self.vel
    }
    /// Multiplier on a fragment's launch velocity.
    pub fn vel_scale(&self) -> f32 {
        self.vel_scale
    }
    pub fn set_vel(&mut self, v: f32) {
        self.vel = v;
        self.vel_scale = 10f32.powf(v) - 1.;
    }

    pub fn rot(&self) -> f32 {
        self.rot
    }
    /// Multiplier on a fragment's spin rate.
    pub fn rot_scale(&self) -> f32 {
        self.rot_scale
    }
    pub fn set_rot(&mut self, v: f32) {
        self.rot = v;
        self.rot_scale = 10f32.powf(v) - 1.;
    }

    pub fn decay(&self) -> f32 {
        self.decay
    }
    /// Factor applied to velocity and spin once per tick.
    pub fn decay_scale(&self) -> f32 {
        self.decay_scale
    }
    pub fn set_decay(&mut self, v: f32) {
        self.decay = v;
        self.decay_scale = 1. - v * v;
    }

    pub fn alpha_pow(&self) -> f32 {
        self.alpha_pow
    }
    /// Exponent of the opacity falloff curve.
    pub fn alpha_pow_scale(&self) -> f32 {
        self.alpha_pow_scale
    }
    pub fn set_alpha_pow(&mut self, v: f32) {
        self.alpha_pow = v;
        self.alpha_pow_scale = v * v;
    }

    /// Seconds between two frontier advances.
    pub fn visit_interval(&self) -> f64 {
        self.visit_interval
    }
    pub fn set_visit_interval(&mut self, v: f64) {
        self.visit_interval = v;
    }

    pub fn color(&self) -> [f32; 3] {
        self.color
    }
    pub fn set_color(&mut self, rgb: [f32; 3]) {
        self.color = rgb;
    }

    /// Sets a knob by its panel name, rejecting values the panel would not allow.
    pub fn set(&mut self, name: &str, value: f64) -> Result<(), ParamError> {
        let knob = Knob::lookup(name)?;
        if !value.is_finite() {
            return Err(ParamError::NotFinite { name: knob.name });
        }
        if value < knob.min || value > knob.max {
            return Err(ParamError::OutOfRange {
                name: knob.name,
                value,
                min: knob.min,
                max: knob.max,
            });
        }
        match knob.name {
            "fragMaxAge" => self.set_max_age(value),
            "fragVel" => self.set_vel(value as f32),
            "fragRot" => self.set_rot(value as f32),
            "fragDecay" => self.set_decay(value as f32),
            "fragAlphaPow" => self.set_alpha_pow(value as f32),
            "fragVisitInt" => self.set_visit_interval(value),
            "fragColorR" => self.color[0] = value as f32,
            "fragColorG" => self.color[1] = value as f32,
            _ => self.color[2] = value as f32,
        }
        Ok(())
    }

    /// Raw (panel-side) value of a knob.
    pub fn get(&self, name: &str) -> Result<f64, ParamError> {
        let knob = Knob::lookup(name)?;
        Ok(match knob.name {
            "fragMaxAge" => self.max_age,
            "fragVel" => self.vel as f64,
            "fragRot" => self.rot as f64,
            "fragDecay" => self.decay as f64,
            "fragAlphaPow" => self.alpha_pow as f64,
            "fragVisitInt" => self.visit_interval,
            "fragColorR" => self.color[0] as f64,
            "fragColorG" => self.color[1] as f64,
            _ => self.color[2] as f64,
        })
    }

    /// Applies a `name=value` assignment, as typed on a command line.
    pub fn apply(&mut self, assignment: &str) -> Result<(), ParamError> {
        let malformed = || ParamError::Malformed(assignment.to_owned());
        let (name, value) = assignment.split_once('=').ok_or_else(malformed)?;
        let value = value.trim().parse::<f64>().map_err(|_| malformed())?;
        self.set(name.trim(), value)
    }
}
