use glam::DVec3;

use crate::color::hsv_to_rgb;
use crate::solver::Rgb;

/// Brightness curve for velocity magnitude; lifts slow regions.
const VELOCITY_GAMMA: f64 = 0.4;

fn to_u8(c: f64) -> u8 {
    (c.clamp(0.0, 1.0) * 255.0).round() as u8
}

pub(crate) fn rgb_to_rgba(c: DVec3) -> [u8; 4] {
    [to_u8(c.x), to_u8(c.y), to_u8(c.z), 255]
}

/// Dye over background: dye alpha is its brightest channel.
pub(crate) fn composite(dye: DVec3, background: Rgb) -> DVec3 {
    let alpha = dye.max_element().clamp(0.0, 1.0);
    let bg = DVec3::new(background.r, background.g, background.b);
    dye + bg * (1.0 - alpha)
}

/// Direction as hue, magnitude (relative to `max`) as brightness.
pub(crate) fn velocity_to_rgb(vx: f64, vy: f64, max: f64) -> DVec3 {
    if max <= 0.0 {
        return DVec3::ZERO;
    }
    let norm = ((vx * vx + vy * vy).sqrt() / max).min(1.0);
    let hue = (vy.atan2(vx) / std::f64::consts::TAU).rem_euclid(1.0);
    hsv_to_rgb(hue, 1.0, norm.powf(VELOCITY_GAMMA))
}

/// Convert RGBA bytes to 0RGB words for minifb.
pub fn rgba_to_argb(rgba: &[u8], out: &mut [u32]) {
    for (i, pixel) in rgba.chunks_exact(4).enumerate() {
        if i >= out.len() {
            break;
        }
        out[i] = (pixel[0] as u32) << 16 | (pixel[1] as u32) << 8 | pixel[2] as u32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_to_rgba_clamps() {
        assert_eq!(rgb_to_rgba(DVec3::new(2.0, -1.0, 0.5)), [255, 0, 128, 255]);
    }

    #[test]
    fn test_composite_empty_dye_shows_background() {
        let bg = Rgb { r: 0.2, g: 0.4, b: 0.6 };
        assert_eq!(composite(DVec3::ZERO, bg), DVec3::new(0.2, 0.4, 0.6));
    }

    #[test]
    fn test_composite_saturated_dye_hides_background() {
        let bg = Rgb { r: 0.2, g: 0.4, b: 0.6 };
        assert_eq!(composite(DVec3::new(1.0, 0.0, 0.0), bg), DVec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_velocity_hue_follows_direction() {
        let right = velocity_to_rgb(1.0, 0.0, 1.0);
        assert!((right - DVec3::new(1.0, 0.0, 0.0)).length() < 1e-9, "{right:?}");
        let still = velocity_to_rgb(0.0, 0.0, 1.0);
        assert_eq!(still, DVec3::ZERO);
        assert_eq!(velocity_to_rgb(1.0, 1.0, 0.0), DVec3::ZERO);
    }

    #[test]
    fn test_rgba_to_argb() {
        let rgba = [0x12, 0x34, 0x56, 0xff, 0xaa, 0xbb, 0xcc, 0xff];
        let mut out = [0u32; 2];
        rgba_to_argb(&rgba, &mut out);
        assert_eq!(out, [0x123456, 0xaabbcc]);
    }
}
