//! Ray picking against spheres, for clicks on bodies and portals.

use tether_logic::math::Vec3;

/// Distance along the ray to the first hit with the sphere, or `None`.
/// A ray starting inside the sphere hits at `0`.
pub fn ray_sphere(origin: Vec3, direction: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let dir = direction.normalize();
    if dir == Vec3::ZERO {
        return None;
    }
    let to_center = center - origin;
    let along = to_center.dot(&dir);
    let closest_sq = to_center.length_squared() - along * along;
    let r_sq = radius * radius;
    if closest_sq > r_sq {
        return None;
    }
    let half_chord = (r_sq - closest_sq).sqrt();
    let near = along - half_chord;
    let far = along + half_chord;
    if far < 0.0 {
        None
    } else {
        Some(near.max(0.0))
    }
}

/// Nearest of `targets` hit by the ray.
pub fn pick_nearest<T, I>(origin: Vec3, direction: Vec3, targets: I) -> Option<T>
where
    I: IntoIterator<Item = (T, Vec3, f32)>,
{
    targets
        .into_iter()
        .filter_map(|(key, center, radius)| {
            ray_sphere(origin, direction, center, radius).map(|t| (t, key))
        })
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, key)| key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hits_sphere_in_front() {
        let t = ray_sphere(Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0), Vec3::new(0.0, 0.0, 5.0), 1.0);
        assert!((t.unwrap() - 4.0).abs() < 1e-5);
    }

    #[test]
    fn misses_sphere_behind_or_aside() {
        let dir = Vec3::new(0.0, 0.0, 1.0);
        assert!(ray_sphere(Vec3::ZERO, dir, Vec3::new(0.0, 0.0, -5.0), 1.0).is_none());
        assert!(ray_sphere(Vec3::ZERO, dir, Vec3::new(3.0, 0.0, 5.0), 1.0).is_none());
    }

    #[test]
    fn picks_the_closest() {
        let dir = Vec3::new(1.0, 0.0, 0.0);
        let picked = pick_nearest(
            Vec3::ZERO,
            dir,
            [
                ("far", Vec3::new(9.0, 0.0, 0.0), 0.5),
                ("near", Vec3::new(3.0, 0.1, 0.0), 0.5),
            ],
        );
        assert_eq!(picked, Some("near"));
    }
}
