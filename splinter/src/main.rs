mod present;

use std::time::{Duration, Instant};

use clap::Parser;
use log::LevelFilter;
use rand::{rngs::StdRng, Rng, SeedableRng};
use shatter::{Shatter, ShatterParams, TraversalState};
use simple_logger::SimpleLogger;

use present::Presenter;

#[allow(unused_imports)]
use log::{debug, error, info, trace, warn};

/// Shatters a subdivided cube without a window, logging as it goes.
#[derive(Debug, Parser)]
#[command(name = "splinter", version)]
struct Config {
    /// Subdivision passes applied to the cube before shattering (each quadruples the faces).
    #[arg(long, default_value_t = 2)]
    subdivisions: usize,
    /// Simulated frames per second.
    #[arg(long, default_value_t = 60.)]
    fps: f64,
    /// Give up after this many simulated seconds.
    #[arg(long, default_value_t = 30.)]
    duration: f64,
    /// Sleep between frames so the run takes as long as it simulates.
    #[arg(long)]
    realtime: bool,
    /// Seed for fragment kinematics. Unseeded runs differ every time.
    #[arg(long)]
    seed: Option<u64>,
    /// Fragment vertices the presenter accepts per frame before the shattering is halted.
    #[arg(long)]
    max_vertices: Option<usize>,
    #[arg(long, default_value_t = LevelFilter::Info)]
    log_level: LevelFilter,

    /// Seconds before a fragment disappears (fragMaxAge).
    #[arg(long)]
    max_age: Option<f64>,
    /// Launch velocity knob, 0 to 1 (fragVel).
    #[arg(long)]
    vel: Option<f64>,
    /// Spin knob, 0 to 1 (fragRot).
    #[arg(long)]
    rot: Option<f64>,
    /// Damping knob, 0 to 1 (fragDecay).
    #[arg(long)]
    decay: Option<f64>,
    /// Fade curve knob, 0 to 2 (fragAlphaPow).
    #[arg(long)]
    alpha_pow: Option<f64>,
    /// Seconds between wavefront advances (fragVisitInt).
    #[arg(long)]
    visit_interval: Option<f64>,
    /// Any knob by name, e.g. `--param fragColorR=0.7`. May be repeated.
    #[arg(long = "param", value_name = "NAME=VALUE")]
    params: Vec<String>,
}
impl Config {
    fn shatter_params(&self) -> Result<ShatterParams, shatter::ParamError> {
        let mut p = ShatterParams::default();
        let flags = [
            ("fragMaxAge", self.max_age),
            ("fragVel", self.vel),
            ("fragRot", self.rot),
            ("fragDecay", self.decay),
            ("fragAlphaPow", self.alpha_pow),
            ("fragVisitInt", self.visit_interval),
        ];
        for (name, value) in flags {
            if let Some(v) = value {
                p.set(name, v)?;
            }
        }
        for assignment in self.params.iter() {
            p.apply(assignment)?;
        }
        Ok(p)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Action {
    Continue,
    Exit,
}

struct State<R: Rng> {
    engine: Shatter<R>,
    presenter: Presenter,
    elapsed: f64,
    next_report: f64,
    duration: f64,
}
impl<R: Rng> State<R> {
    fn new(cfg: &Config, mut engine: Shatter<R>) -> State<R> {
        let mut mesh = model::unit_cube();
        for _ in 0..cfg.subdivisions {
            mesh = mesh.subdivided();
            mesh.merge_vertices(4);
        }
        mesh.normalize();
        engine.initialize(mesh);
        engine.start();
        State {
            engine,
            presenter: Presenter {
                budget: cfg.max_vertices,
                ..Default::default()
            },
            elapsed: 0.,
            next_report: 0.,
            duration: cfg.duration,
        }
    }

    fn step(&mut self, delta: f64) -> Action {
        self.engine.tick(delta);
        self.elapsed += delta;
        match self.presenter.present(&mut self.engine) {
            Ok(report) => trace!(
                "Uploaded {} mesh bytes, {} fragment bytes.",
                report.mesh_bytes,
                report.fragment_bytes
            ),
            Err(e) => {
                // Freeze the shattering but keep the frame loop, fragments still fade out.
                error!("Frame failed ({}), halting.", e);
                self.engine.halt();
            }
        }

        if self.elapsed >= self.next_report {
            let stats = self.engine.stats();
            info!(
                "{:6.2}s {:?}: {} faces left, {} consumed in {} advances, {} fragments alive.",
                self.elapsed,
                self.engine.state(),
                stats.faces_remaining,
                stats.faces_consumed,
                stats.advances,
                stats.live_fragments
            );
            self.next_report += 1.;
        }

        if self.engine.state() == TraversalState::Stalled {
            self.engine.start();
        }
        if self.engine.is_settled() {
            info!("Nothing left to animate after {:.2}s.", self.elapsed);
            Action::Exit
        } else if self.elapsed >= self.duration {
            warn!("Giving up after {:.2}s.", self.elapsed);
            Action::Exit
        } else {
            Action::Continue
        }
    }

    fn run(&mut self, fps: f64, realtime: bool) {
        let frame = 1. / fps;
        let target_per_frame = Duration::from_secs_f64(frame);
        loop {
            let curr_frame = Instant::now();
            if self.step(frame) == Action::Exit {
                break;
            }
            let sim_duration = curr_frame.elapsed();
            trace!("Frame took {:?}.", sim_duration);
            if realtime && target_per_frame > sim_duration {
                std::thread::sleep(target_per_frame - sim_duration);
            }
        }
        info!(
            "Presented {} frames, {} bytes uploaded.",
            self.presenter.frames, self.presenter.uploaded
        );
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = Config::parse();
    SimpleLogger::new().with_level(cfg.log_level).init()?;
    if !(cfg.fps.is_finite() && cfg.fps > 0.) {
        return Err(format!("--fps must be positive, got {}", cfg.fps).into());
    }
    let params = cfg.shatter_params()?;
    debug!("Running with {:?}.", params);

    match cfg.seed {
        Some(seed) => State::new(&cfg, Shatter::with_rng(params, StdRng::seed_from_u64(seed)))
            .run(cfg.fps, cfg.realtime),
        None => State::new(&cfg, Shatter::new(params)).run(cfg.fps, cfg.realtime),
    }
    info!("And that's all for today, folks!");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(args: &[&str]) -> Config {
        Config::parse_from(std::iter::once("splinter").chain(args.iter().copied()))
    }

    #[test]
    fn flags_reach_params() {
        let p = cfg(&["--vel", "1", "--visit-interval", "0.5", "--param", "fragColorB=0.5"])
            .shatter_params()
            .unwrap();
        assert!((p.vel_scale() - 9.).abs() < 1e-5);
        assert_eq!(p.visit_interval(), 0.5);
        assert_eq!(p.color(), [1., 1., 0.5]);
    }

    #[test]
    fn out_of_range_flag_is_rejected() {
        assert!(cfg(&["--decay", "3"]).shatter_params().is_err());
        assert!(cfg(&["--param", "nope=1"]).shatter_params().is_err());
    }

    #[test]
    fn seeded_run_settles() {
        let c = cfg(&["--subdivisions", "1", "--visit-interval", "0", "--max-age", "0.5"]);
        let engine = Shatter::with_rng(c.shatter_params().unwrap(), StdRng::seed_from_u64(1));
        let mut state = State::new(&c, engine);
        state.run(c.fps, false);
        assert!(state.engine.is_settled());
        assert_eq!(state.engine.stats().faces_consumed, 48);
        assert!(state.presenter.uploaded > 0);
    }

    #[test]
    fn over_budget_frame_halts_shattering() {
        let c = cfg(&["--subdivisions", "2", "--visit-interval", "0", "--max-vertices", "3"]);
        let engine = Shatter::with_rng(c.shatter_params().unwrap(), StdRng::seed_from_u64(1));
        let mut state = State::new(&c, engine);
        state.step(1. / 60.);
        state.step(1. / 60.);
        assert_eq!(state.engine.state(), TraversalState::Idle);
        assert!(state.engine.stats().faces_remaining > 0);
    }
}
