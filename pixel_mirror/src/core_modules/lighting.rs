// THEORY:
// The disk mode lights its scene with three lights: a flat ambient fill, one
// directional light, and one point light that follows the pointer. The rig is
// rebuilt once per frame from the pointer position and handed to the surface
// before any disk is drawn. Intensity math lives here too so every surface
// shades disks the same way.

use glam::Vec3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    /// Light colour as 0..1 intensity per channel.
    pub color: Vec3,
    /// Direction the light travels in; normalised on construction.
    pub direction: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub color: Vec3,
    pub position: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightRig {
    pub ambient: Vec3,
    pub directional: DirectionalLight,
    pub point: PointLight,
}

/// Height of the pointer light above the disk plane.
pub const POINT_LIGHT_DEPTH: f32 = 150.0;

const AMBIENT: Vec3 = Vec3::splat(0.25);
const DIRECTIONAL_COLOR: Vec3 = Vec3::splat(0.5);
const DIRECTIONAL_DIRECTION: Vec3 = Vec3::NEG_Z;
const POINT_COLOR: Vec3 = Vec3::splat(0.6);

impl LightRig {
    /// Builds the rig with the point light over the pointer.
    ///
    /// `pointer` is in canvas pixels (origin top-left); the rig works in centred
    /// coordinates like the disks do.
    pub fn tracking_pointer(pointer: (f32, f32), canvas: (u32, u32)) -> Self {
        let position = Vec3::new(
            pointer.0 - canvas.0 as f32 / 2.0,
            pointer.1 - canvas.1 as f32 / 2.0,
            POINT_LIGHT_DEPTH,
        );
        Self {
            ambient: AMBIENT,
            directional: DirectionalLight {
                color: DIRECTIONAL_COLOR,
                direction: DIRECTIONAL_DIRECTION.normalize_or_zero(),
            },
            point: PointLight {
                color: POINT_COLOR,
                position,
            },
        }
    }

    /// Per-channel light reaching a surface point with the given normal.
    /// Two-sided: a disk is lit the same from either face.
    pub fn intensity_at(&self, position: Vec3, normal: Vec3) -> Vec3 {
        let normal = normal.normalize_or_zero();
        let directional = normal.dot(-self.directional.direction).abs();
        let point = normal
            .dot((self.point.position - position).normalize_or_zero())
            .abs();

        (self.ambient + self.directional.color * directional + self.point.color * point)
            .clamp(Vec3::ZERO, Vec3::ONE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_light_follows_pointer_in_centred_space() {
        let rig = LightRig::tracking_pointer((320.0, 0.0), (640, 480));
        assert_eq!(rig.point.position, Vec3::new(0.0, -240.0, POINT_LIGHT_DEPTH));
    }

    #[test]
    fn facing_disk_is_brighter_than_edge_on() {
        let rig = LightRig::tracking_pointer((320.0, 240.0), (640, 480));
        let facing = rig.intensity_at(Vec3::ZERO, Vec3::Z);
        let edge_on = rig.intensity_at(Vec3::ZERO, Vec3::Y);
        assert!(facing.x > edge_on.x);
        // Edge-on with the pointer overhead: only ambient reaches it.
        assert!((edge_on - AMBIENT).abs().max_element() < 1e-5);
    }

    #[test]
    fn intensity_is_clamped() {
        let rig = LightRig::tracking_pointer((320.0, 240.0), (640, 480));
        let lit = rig.intensity_at(Vec3::ZERO, Vec3::NEG_Z);
        assert!(lit.to_array().iter().all(|c| (0.0..=1.0).contains(c)));
        assert_eq!(lit, Vec3::ONE);
    }

    #[test]
    fn degenerate_normal_gets_ambient_only() {
        let rig = LightRig::tracking_pointer((0.0, 0.0), (640, 480));
        assert_eq!(rig.intensity_at(Vec3::new(10.0, 10.0, 0.0), Vec3::ZERO), AMBIENT);
    }

    #[test]
    fn both_faces_are_lit_alike() {
        let rig = LightRig::tracking_pointer((100.0, 60.0), (640, 480));
        let position = Vec3::new(-40.0, 25.0, -10.0);
        let normal = Vec3::new(0.0, 0.6, 0.8);
        let front = rig.intensity_at(position, normal);
        let back = rig.intensity_at(position, -normal);
        assert!((front - back).abs().max_element() < 1e-6);
    }
}
