use std::f32::consts::TAU;

use crate::{fragment::Fragment, params::ShatterParams};

#[allow(unused_imports)]
use log::{debug, error, info, trace, warn};
use model::AffineTransform;
use na::{Point3, Unit, Vector3};
use rand::Rng;

/// How far the launch direction may stray from the face normal.
const SCATTER: f32 = 0.3;

fn jitter<R: Rng>(rng: &mut R) -> Vector3<f32> {
    Vector3::from_fn(|_, _| rng.random::<f32>() - 0.5)
}

/// Breaks the triangle `tri` (in the source's local frame) off `source` as a new fragment.
///
/// The fragment is launched roughly along `normal` and given a random spin. Zero-area triangles
/// are fine and produce a fragment that has no visible extent.
pub fn spawn<R: Rng>(
    tri: [Point3<f32>; 3],
    normal: Vector3<f32>,
    source: &AffineTransform,
    params: &ShatterParams,
    rng: &mut R,
) -> Fragment {
    let [a, b, c] = tri;
    let center = Point3::from((a.coords + b.coords + c.coords) / 3.);

    let velocity = (normal + jitter(rng) * SCATTER) * params.vel_scale();
    let rot_axis = Unit::try_new(jitter(rng), f32::EPSILON).unwrap_or_else(Vector3::y_axis);
    let rot_speed = rng.random::<f32>() * TAU * params.rot_scale();

    let mut transform = source.clone();
    transform.pos += center.coords;
    transform.scaling.fill(1.);

    trace!("Spawned fragment at {:?} with velocity {:?}.", transform.pos, velocity);
    Fragment {
        transform,
        local: tri.map(|p| Point3::from(p - center)),
        velocity,
        rot_axis,
        rot_speed,
        age: 0.,
        color: params.color(),
        opacity: 1.,
    }
}
