use glam::DVec2;

use crate::grid::Grid;

/// Upper bound on |velocity| after vorticity confinement.
pub const VELOCITY_LIMIT: f64 = 1000.0;

/// Small term that keeps the vorticity gradient normalization finite.
const NORMALIZE_EPS: f64 = 1e-4;

/// Clamped left/right/bottom/top neighbor offsets of cell `(x, y)`.
#[inline]
fn neighbors(x: usize, y: usize) -> (isize, isize, isize, isize) {
    let (x, y) = (x as isize, y as isize);
    (x - 1, x + 1, y - 1, y + 1)
}

/// Curl of the velocity field: `(vy[x+1] - vy[x-1]) - (vx[y+1] - vx[y-1])`.
pub fn curl(velocity: &Grid, out: &mut Grid) {
    let (w, h) = (velocity.width(), velocity.height());
    for y in 0..h {
        for x in 0..w {
            let (l, r, b, t) = neighbors(x, y);
            let (xi, yi) = (x as isize, y as isize);
            let dvy = velocity.get_clamped(r, yi, 1) - velocity.get_clamped(l, yi, 1);
            let dvx = velocity.get_clamped(xi, t, 0) - velocity.get_clamped(xi, b, 0);
            out.cell_mut(x, y)[0] = dvy - dvx;
        }
    }
}

/// Vorticity confinement: push velocity along the rotated, normalized
/// gradient of |curl|, scaled by `strength * curl * dt`.
pub fn vorticity(velocity: &Grid, curl: &Grid, out: &mut Grid, strength: f64, dt: f64) {
    let (w, h) = (velocity.width(), velocity.height());
    for y in 0..h {
        for x in 0..w {
            let (l, r, b, t) = neighbors(x, y);
            let (xi, yi) = (x as isize, y as isize);
            let eta = DVec2::new(
                0.5 * (curl.get_clamped(r, yi, 0).abs() - curl.get_clamped(l, yi, 0).abs()),
                0.5 * (curl.get_clamped(xi, t, 0).abs() - curl.get_clamped(xi, b, 0).abs()),
            );
            let n = eta / (eta.length() + NORMALIZE_EPS);
            let c = curl.get(x, y, 0);
            // 2D cross product N x omega
            let force = DVec2::new(n.y, -n.x) * strength * c;

            let v = velocity.cell(x, y);
            let vel = (DVec2::new(v[0], v[1]) + force * dt)
                .clamp(DVec2::splat(-VELOCITY_LIMIT), DVec2::splat(VELOCITY_LIMIT));
            let cell = out.cell_mut(x, y);
            cell[0] = vel.x;
            cell[1] = vel.y;
        }
    }
}

/// `div = 0.5 * ((vx[x+1] - vx[x-1]) + (vy[y+1] - vy[y-1]))`.
pub fn divergence(velocity: &Grid, out: &mut Grid) {
    let (w, h) = (velocity.width(), velocity.height());
    for y in 0..h {
        for x in 0..w {
            let (l, r, b, t) = neighbors(x, y);
            let (xi, yi) = (x as isize, y as isize);
            let dvx = velocity.get_clamped(r, yi, 0) - velocity.get_clamped(l, yi, 0);
            let dvy = velocity.get_clamped(xi, t, 1) - velocity.get_clamped(xi, b, 1);
            out.cell_mut(x, y)[0] = 0.5 * (dvx + dvy);
        }
    }
}

/// `out = source * factor`, channel-wise.
pub fn scale(source: &Grid, out: &mut Grid, factor: f64) {
    for (o, s) in out.data_mut().iter_mut().zip(source.data()) {
        *o = s * factor;
    }
}

/// One Jacobi relaxation round:
/// `p'[x,y] = (p[x-1,y] + p[x+1,y] + p[x,y-1] + p[x,y+1] - div[x,y]) / 4`.
pub fn jacobi(pressure: &Grid, divergence: &Grid, out: &mut Grid) {
    let (w, h) = (pressure.width(), pressure.height());
    for y in 0..h {
        for x in 0..w {
            let (l, r, b, t) = neighbors(x, y);
            let (xi, yi) = (x as isize, y as isize);
            let sum = pressure.get_clamped(l, yi, 0)
                + pressure.get_clamped(r, yi, 0)
                + pressure.get_clamped(xi, b, 0)
                + pressure.get_clamped(xi, t, 0);
            out.cell_mut(x, y)[0] = (sum - divergence.get(x, y, 0)) * 0.25;
        }
    }
}

/// Project velocity onto its divergence-free part: `v -= grad(p)`.
pub fn subtract_gradient(pressure: &Grid, velocity: &Grid, out: &mut Grid) {
    let (w, h) = (velocity.width(), velocity.height());
    for y in 0..h {
        for x in 0..w {
            let (l, r, b, t) = neighbors(x, y);
            let (xi, yi) = (x as isize, y as isize);
            let gx = 0.5 * (pressure.get_clamped(r, yi, 0) - pressure.get_clamped(l, yi, 0));
            let gy = 0.5 * (pressure.get_clamped(xi, t, 0) - pressure.get_clamped(xi, b, 0));
            let v = velocity.cell(x, y);
            let (vx, vy) = (v[0] - gx, v[1] - gy);
            let cell = out.cell_mut(x, y);
            cell[0] = vx;
            cell[1] = vy;
        }
    }
}

/// Semi-Lagrangian advection of `source` into `out` along `velocity`.
///
/// Velocity is measured in velocity-grid cells per unit time, so the
/// backtrace offset is `velocity * dt * texel_size(velocity)` in texcoords.
/// `source`/`out` may have a different resolution than `velocity`.
pub fn advect(velocity: &Grid, source: &Grid, out: &mut Grid, dt: f64, dissipation: f64) {
    let texel = velocity.texel_size();
    let decay = 1.0 / (1.0 + dissipation * dt);
    let channels = source.channels();
    let (w, h) = (out.width(), out.height());
    for y in 0..h {
        for x in 0..w {
            let (u, v) = out.texcoord(x, y);
            let vel_x = velocity.sample(u, v, 0);
            let vel_y = velocity.sample(u, v, 1);
            let su = u - dt * vel_x * texel.x;
            let sv = v - dt * vel_y * texel.y;
            for c in 0..channels {
                let value = source.sample(su, sv, c) * decay;
                out.cell_mut(x, y)[c] = value;
            }
        }
    }
}

/// Gaussian splat: `out = source + value * exp(-|p|^2 / radius^2)` where
/// `p = texcoord - point` with its x-axis scaled by `aspect_ratio`.
pub fn splat(source: &Grid, out: &mut Grid, point: DVec2, value: &[f64], radius: f64, aspect_ratio: f64) {
    let r2 = radius * radius;
    let (w, h) = (out.width(), out.height());
    for y in 0..h {
        for x in 0..w {
            let (u, v) = out.texcoord(x, y);
            let p = DVec2::new((u - point.x) * aspect_ratio, v - point.y);
            let falloff = (-p.length_squared() / r2).exp();
            let src = source.cell(x, y);
            let dst = out.cell_mut(x, y);
            for (c, d) in dst.iter_mut().enumerate() {
                *d = src[c] + value.get(c).copied().unwrap_or(0.0) * falloff;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const W: usize = 24;
    const H: usize = 20;

    fn swirl() -> Grid {
        let mut v = Grid::new(W, H, 2);
        let (cx, cy) = (W as f64 / 2.0, H as f64 / 2.0);
        for y in 0..H {
            for x in 0..W {
                let dx = x as f64 - cx;
                let dy = y as f64 - cy;
                let g = (-(dx * dx + dy * dy) / 16.0).exp();
                let cell = v.cell_mut(x, y);
                cell[0] = -dy * g;
                cell[1] = dx * g;
            }
        }
        v
    }

    fn total_divergence(velocity: &Grid) -> f64 {
        let mut div = Grid::new(velocity.width(), velocity.height(), 1);
        divergence(velocity, &mut div);
        // Skip the clamped rim, where one-sided stencils dominate.
        let mut sum = 0.0;
        for y in 2..velocity.height() - 2 {
            for x in 2..velocity.width() - 2 {
                sum += div.get(x, y, 0).abs();
            }
        }
        sum
    }

    #[test]
    fn test_curl_of_uniform_flow_is_zero() {
        let v = Grid::filled(W, H, &[3.0, -2.0]);
        let mut c = Grid::new(W, H, 1);
        curl(&v, &mut c);
        assert!(c.data().iter().all(|x| x.abs() < 1e-12));
    }

    #[test]
    fn test_curl_of_rotation() {
        // v = (-y, x) has curl 2 per unit cell; central differences span two cells.
        let mut v = Grid::new(W, H, 2);
        for y in 0..H {
            for x in 0..W {
                let cell = v.cell_mut(x, y);
                cell[0] = -(y as f64);
                cell[1] = x as f64;
            }
        }
        let mut c = Grid::new(W, H, 1);
        curl(&v, &mut c);
        assert!((c.get(5, 5, 0) - 4.0).abs() < 1e-12, "got {}", c.get(5, 5, 0));
    }

    #[test]
    fn test_vorticity_zero_strength_copies_velocity() {
        let v = swirl();
        let mut c = Grid::new(W, H, 1);
        curl(&v, &mut c);
        let mut out = Grid::new(W, H, 2);
        vorticity(&v, &c, &mut out, 0.0, 0.1);
        for (a, b) in out.data().iter().zip(v.data()) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn test_vorticity_adds_energy_to_swirl() {
        let v = swirl();
        let mut c = Grid::new(W, H, 1);
        curl(&v, &mut c);
        let mut out = Grid::new(W, H, 2);
        vorticity(&v, &c, &mut out, 30.0, 0.016);
        let before: f64 = v.data().iter().map(|x| x * x).sum();
        let after: f64 = out.data().iter().map(|x| x * x).sum();
        assert!(after > before, "confinement should strengthen rotation: {before} -> {after}");
    }

    #[test]
    fn test_vorticity_clamps_velocity() {
        let v = Grid::filled(W, H, &[5000.0, -5000.0]);
        let c = Grid::new(W, H, 1);
        let mut out = Grid::new(W, H, 2);
        vorticity(&v, &c, &mut out, 10.0, 0.1);
        assert_eq!(out.get(3, 3, 0), VELOCITY_LIMIT);
        assert_eq!(out.get(3, 3, 1), -VELOCITY_LIMIT);
    }

    #[test]
    fn test_divergence_of_expansion() {
        let mut v = Grid::new(W, H, 2);
        for y in 0..H {
            for x in 0..W {
                let cell = v.cell_mut(x, y);
                cell[0] = x as f64;
                cell[1] = y as f64;
            }
        }
        let mut div = Grid::new(W, H, 1);
        divergence(&v, &mut div);
        // 0.5 * (2 + 2) in the interior
        assert!((div.get(6, 7, 0) - 2.0).abs() < 1e-12);
        // Clamped edge: one-sided difference halves the x term.
        assert!((div.get(0, 7, 0) - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_scale() {
        let src = Grid::filled(4, 4, &[2.0]);
        let mut out = Grid::new(4, 4, 1);
        scale(&src, &mut out, 0.8);
        assert!(out.data().iter().all(|v| (v - 1.6).abs() < 1e-12));
    }

    #[test]
    fn test_jacobi_zero_divergence_fixed_point() {
        let div = Grid::new(W, H, 1);
        let mut p = Grid::filled(W, H, &[0.3]);
        let mut scratch = Grid::new(W, H, 1);
        for _ in 0..50 {
            jacobi(&p, &div, &mut scratch);
            std::mem::swap(&mut p, &mut scratch);
        }
        assert!(p.data().iter().all(|v| (v - 0.3).abs() < 1e-12));
    }

    #[test]
    fn test_jacobi_spreads_source() {
        let mut div = Grid::new(W, H, 1);
        div.cell_mut(W / 2, H / 2)[0] = -4.0;
        let mut p = Grid::new(W, H, 1);
        let mut scratch = Grid::new(W, H, 1);
        for _ in 0..10 {
            jacobi(&p, &div, &mut scratch);
            std::mem::swap(&mut p, &mut scratch);
        }
        let center = p.get(W / 2, H / 2, 0);
        let neighbor = p.get(W / 2 + 1, H / 2, 0);
        assert!(center > neighbor && neighbor > 0.0, "center={center} neighbor={neighbor}");
    }

    #[test]
    fn test_projection_reduces_divergence() {
        let mut v = Grid::new(W, H, 2);
        let (cx, cy) = (W as f64 / 2.0, H as f64 / 2.0);
        for y in 0..H {
            for x in 0..W {
                let dx = x as f64 - cx;
                let dy = y as f64 - cy;
                let g = (-(dx * dx + dy * dy) / 12.0).exp();
                let cell = v.cell_mut(x, y);
                cell[0] = dx * g;
                cell[1] = dy * g;
            }
        }
        let before = total_divergence(&v);
        assert!(before > 0.0);

        let mut div = Grid::new(W, H, 1);
        divergence(&v, &mut div);
        let mut p = Grid::new(W, H, 1);
        let mut scratch = Grid::new(W, H, 1);
        for _ in 0..60 {
            jacobi(&p, &div, &mut scratch);
            std::mem::swap(&mut p, &mut scratch);
        }
        let mut projected = Grid::new(W, H, 2);
        subtract_gradient(&p, &v, &mut projected);

        let after = total_divergence(&projected);
        assert!(after < before, "divergence should drop: before={before}, after={after}");
    }

    #[test]
    fn test_advect_zero_velocity_preserves() {
        let vel = Grid::new(W, H, 2);
        let mut dye = Grid::new(W * 2, H * 2, 3);
        for y in 0..H * 2 {
            for x in 0..W * 2 {
                dye.cell_mut(x, y).copy_from_slice(&[x as f64, y as f64, 1.0]);
            }
        }
        let mut out = Grid::new(W * 2, H * 2, 3);
        advect(&vel, &dye, &mut out, 0.1, 0.0);
        for (a, b) in out.data().iter().zip(dye.data()) {
            assert!((a - b).abs() < 1e-10);
        }
    }

    #[test]
    fn test_advect_dissipation_factor() {
        let vel = Grid::new(W, H, 2);
        let src = Grid::filled(W, H, &[2.0]);
        let mut out = Grid::new(W, H, 1);
        advect(&vel, &src, &mut out, 0.5, 1.0);
        // 2 / (1 + 1 * 0.5)
        assert!(out.data().iter().all(|v| (v - 4.0 / 3.0).abs() < 1e-12));
    }

    #[test]
    fn test_advect_shifts_along_flow() {
        // One cell per unit time to the right, dt = 1: each cell takes its left neighbor.
        let vel = Grid::filled(W, H, &[1.0, 0.0]);
        let mut src = Grid::new(W, H, 1);
        src.cell_mut(5, 5)[0] = 1.0;
        let mut out = Grid::new(W, H, 1);
        advect(&vel, &src, &mut out, 1.0, 0.0);
        assert!((out.get(6, 5, 0) - 1.0).abs() < 1e-12);
        assert!(out.get(5, 5, 0).abs() < 1e-12);
    }

    #[test]
    fn test_advect_uniform_field_unchanged() {
        let vel = Grid::filled(W, H, &[0.7, -0.3]);
        let src = Grid::filled(W, H, &[5.0]);
        let mut out = Grid::new(W, H, 1);
        advect(&vel, &src, &mut out, 0.1, 0.0);
        assert!(out.data().iter().all(|v| (v - 5.0).abs() < 1e-12));
    }

    #[test]
    fn test_splat_full_at_center_and_decays() {
        let n = 65;
        let src = Grid::new(n, n, 2);
        let mut out = Grid::new(n, n, 2);
        let radius = 0.05;
        splat(&src, &mut out, DVec2::new(0.5, 0.5), &[1.0, 0.0], radius, 1.0);

        let center = out.cell(32, 32);
        assert!((center[0] - 1.0).abs() < 1e-12);
        assert_eq!(center[1], 0.0);

        for y in 0..n {
            for x in 0..n {
                let (u, v) = out.texcoord(x, y);
                let d = ((u - 0.5).powi(2) + (v - 0.5).powi(2)).sqrt();
                if d >= 3.0 * radius {
                    assert!(out.get(x, y, 0) < 1.3e-4, "({x},{y}) d={d}: {}", out.get(x, y, 0));
                }
            }
        }
    }

    #[test]
    fn test_splat_adds_to_existing() {
        let src = Grid::filled(9, 9, &[0.5, 0.5, 0.5]);
        let mut out = Grid::new(9, 9, 3);
        splat(&src, &mut out, DVec2::new(0.5, 0.5), &[1.0, 0.0, 0.25], 0.1, 1.0);
        let c = out.cell(4, 4);
        assert!((c[0] - 1.5).abs() < 1e-12);
        assert!((c[1] - 0.5).abs() < 1e-12);
        assert!((c[2] - 0.75).abs() < 1e-12);
    }
}
