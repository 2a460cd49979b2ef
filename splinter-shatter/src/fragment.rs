use crate::params::ShatterParams;

#[allow(unused_imports)]
use log::{debug, error, info, trace, warn};
use model::AffineTransform;
use na::{Matrix4, Point3, Unit, UnitQuaternion, Vector3};

/// A single triangle broken off the source mesh.
#[derive(Debug, Clone)]
pub struct Fragment {
    /// World placement. The translation sits on the triangle's centroid.
    pub transform: AffineTransform,
    /// Corners relative to the centroid.
    pub local: [Point3<f32>; 3],
    pub velocity: Vector3<f32>,
    pub rot_axis: Unit<Vector3<f32>>,
    /// Radians per second.
    pub rot_speed: f32,
    /// Seconds since the fragment broke off.
    pub age: f64,
    pub color: [f32; 3],
    pub opacity: f32,
}

/// Vertex layout for drawing fragments as loose, alpha-blended triangles.
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct FragmentVertex {
    pub pos: [f32; 3],
    pub color: [f32; 4],
}

impl Fragment {
    /// Ages, moves, spins, damps and fades the fragment by one tick.
    ///
    /// Returns `false` once the fragment has outlived `max_age`; it is left untouched in that
    /// case. Damping is applied once per call regardless of `delta`, so the effective decay rate
    /// follows the tick rate.
    pub fn step(&mut self, delta: f64, params: &ShatterParams) -> bool {
        self.age += delta;
        let max_age = params.max_age();
        if self.age > max_age {
            return false;
        }

        let dt = delta as f32;
        self.transform.pos += self.velocity * dt;
        self.transform.ori *= UnitQuaternion::from_axis_angle(&self.rot_axis, self.rot_speed * dt);

        let decay = params.decay_scale();
        self.velocity *= decay;
        self.rot_speed *= decay;

        let ratio = if max_age > 0. { (self.age / max_age) as f32 } else { 1. };
        self.opacity = (1. - ratio.powf(params.alpha_pow_scale())).clamp(0., 1.);
        true
    }

    pub fn position(&self) -> Vector3<f32> {
        self.transform.pos
    }
    pub fn rotation(&self) -> UnitQuaternion<f32> {
        self.transform.ori
    }
    pub fn speed(&self) -> f32 {
        self.velocity.norm()
    }
    pub fn model_matrix(&self) -> Matrix4<f32> {
        self.transform.mat()
    }

    pub fn world_vertices(&self) -> [Point3<f32>; 3] {
        let t = self.transform.pos;
        self.local.map(|p| self.transform.ori * p + t)
    }

    pub fn vertices(&self) -> [FragmentVertex; 3] {
        let [r, g, b] = self.color;
        self.world_vertices().map(|p| FragmentVertex {
            pos: p.coords.into(),
            color: [r, g, b, self.opacity],
        })
    }
}

/// Steps every fragment and drops the expired ones. Returns how many were dropped.
pub fn age_all(fragments: &mut Vec<Fragment>, delta: f64, params: &ShatterParams) -> usize {
    let before = fragments.len();
    fragments.retain_mut(|frag| frag.step(delta, params));
    let retired = before - fragments.len();
    if retired > 0 {
        trace!("Retired {} fragments, {} alive.", retired, fragments.len());
    }
    retired
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fragment() -> Fragment {
        Fragment {
            transform: AffineTransform::identity(),
            local: [
                Point3::new(-1., 0., 0.),
                Point3::new(1., 0., 0.),
                Point3::new(0., 1., 0.),
            ],
            velocity: Vector3::new(1., 0., 0.),
            rot_axis: Vector3::z_axis(),
            rot_speed: std::f32::consts::PI,
            age: 0.,
            color: [1., 0.5, 0.5],
            opacity: 1.,
        }
    }

    #[test]
    fn expires_after_max_age() {
        let mut params = ShatterParams::default();
        params.set_max_age(2.);
        let mut frags = vec![fragment()];
        assert_eq!(age_all(&mut frags, 1., &params), 0);
        assert_eq!(age_all(&mut frags, 1., &params), 0);
        // At exactly max_age the fragment is still there, but fully faded.
        assert_eq!(frags[0].opacity, 0.);
        assert_eq!(age_all(&mut frags, 1., &params), 1);
        assert!(frags.is_empty());
    }

    #[test]
    fn zero_max_age_retires_on_first_tick() {
        let mut params = ShatterParams::default();
        params.set_max_age(0.);
        let mut frags = vec![fragment()];
        age_all(&mut frags, 0.016, &params);
        assert!(frags.is_empty());
    }

    #[test]
    fn moves_then_damps_per_tick() {
        let mut params = ShatterParams::default();
        params.set_decay(0.5);
        let mut f = fragment();
        assert!(f.step(0.5, &params));
        // Moved with the undamped velocity...
        assert!((f.position() - Vector3::new(0.5, 0., 0.)).norm() < 1e-6);
        // ...then damped once, independent of the tick length.
        assert!((f.speed() - 0.75).abs() < 1e-6);
        assert!((f.rot_speed - std::f32::consts::PI * 0.75).abs() < 1e-6);

        let mut g = fragment();
        g.step(0.25, &params);
        g.step(0.25, &params);
        assert!((g.speed() - 0.75 * 0.75).abs() < 1e-6);
    }

    #[test]
    fn speed_never_increases() {
        let params = ShatterParams::default();
        let mut f = fragment();
        let mut last = f.speed();
        while f.step(1. / 60., &params) {
            assert!(f.speed() <= last);
            last = f.speed();
        }
    }

    #[test]
    fn spins_about_own_axis() {
        let params = ShatterParams::default();
        let mut f = fragment();
        f.velocity = Vector3::zeros();
        f.step(0.5, &params);
        // Half a second at pi rad/s is a quarter turn around z.
        let [a, _, c] = f.world_vertices();
        assert!((a - Point3::new(0., -1., 0.)).norm() < 1e-5);
        assert!((c - Point3::new(-1., 0., 0.)).norm() < 1e-5);
    }

    #[test]
    fn opacity_follows_falloff_curve() {
        let mut params = ShatterParams::default();
        params.set_max_age(4.);
        params.set_alpha_pow(2f32.sqrt());
        let mut f = fragment();
        f.step(2., &params);
        // 1 - (2 / 4)^2
        assert!((f.opacity - 0.75).abs() < 1e-5);
    }

    #[test]
    fn packed_vertices_carry_opacity() {
        let mut f = fragment();
        f.opacity = 0.25;
        let v = f.vertices();
        assert_eq!(v[2].color, [1., 0.5, 0.5, 0.25]);
        assert_eq!(v[1].pos, [1., 0., 0.]);
        assert_eq!(bytemuck::cast_slice::<FragmentVertex, u8>(&v).len(), 3 * 28);
    }
}
