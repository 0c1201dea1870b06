//! Destructible height-field terrain
//!
//! The ground is one surface height per column (`points[x]` is the screen y of
//! the surface, solid below). Explosions carve circles out of the columns;
//! material cut loose above a crater is reported as sloughing columns so the
//! caller can animate the debris before committing it with `settle_columns`.

use glam::{IVec2, Vec2};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::geometry::{Segment, segment_intersection, vertical_probe_circle};
use super::state::{Impact, ImpactTarget};
use crate::consts::TERRAIN_CONTROL_POINTS;
use crate::error::{GameError, Result};
use crate::{to_pixel, to_vec2};

/// A column of undercut terrain waiting to land
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SloughColumn {
    pub x: usize,
    /// Surface before the explosion (top of the loose material)
    pub top: i32,
    /// Upper edge of the crater (bottom of the loose material)
    pub bottom: i32,
    /// Crater floor the material falls onto
    pub landing: i32,
}

impl SloughColumn {
    /// Amount of loose material in the column
    #[inline]
    pub fn length(&self) -> i32 {
        self.bottom - self.top
    }

    /// How far the material drops before it comes to rest
    #[inline]
    pub fn fall_distance(&self) -> i32 {
        self.landing - self.bottom
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Terrain {
    points: Vec<i32>,
    field_height: i32,
    min_y: i32,
    max_y: i32,
    /// Control polyline heights the surface was sampled from
    controls: Vec<i32>,
}

impl Terrain {
    /// Build a random surface across `width` columns with ground levels in
    /// `min_y..=max_y`
    pub fn generate<R: Rng + ?Sized>(
        width: usize,
        field_height: i32,
        min_y: i32,
        max_y: i32,
        rng: &mut R,
    ) -> Result<Self> {
        let (lo, hi) = (min_y.min(max_y), min_y.max(max_y));
        let controls: Vec<i32> = (0..TERRAIN_CONTROL_POINTS)
            .map(|_| rng.random_range(lo..=hi))
            .collect();
        let mut terrain = Self::from_controls(width, field_height, &controls)?;
        terrain.min_y = lo;
        terrain.max_y = hi;
        Ok(terrain)
    }

    /// Sample a surface from control heights spread evenly across the width
    pub fn from_controls(width: usize, field_height: i32, controls: &[i32]) -> Result<Self> {
        if width == 0 || controls.is_empty() {
            return Err(GameError::InvalidField {
                width: width as u32,
                height: field_height.max(0) as u32,
            });
        }
        let field_height = field_height.max(0);
        let controls: Vec<i32> = controls.iter().map(|&c| c.clamp(0, field_height)).collect();
        let points = sample_polyline(width, &controls);
        let min_y = controls.iter().copied().min().unwrap_or(0);
        let max_y = controls.iter().copied().max().unwrap_or(field_height);
        Ok(Self {
            points,
            field_height,
            min_y,
            max_y,
            controls,
        })
    }

    /// Level ground at `ground_y`
    pub fn flat(width: usize, field_height: i32, ground_y: i32) -> Self {
        Self::from_heights(vec![ground_y; width], field_height)
    }

    /// Wrap explicit column heights, clamped into the field
    pub fn from_heights(heights: Vec<i32>, field_height: i32) -> Self {
        let field_height = field_height.max(0);
        let points: Vec<i32> = heights
            .into_iter()
            .map(|h| h.clamp(0, field_height))
            .collect();
        let min_y = points.iter().copied().min().unwrap_or(field_height);
        let max_y = points.iter().copied().max().unwrap_or(field_height);
        Self {
            controls: Vec::new(),
            points,
            field_height,
            min_y,
            max_y,
        }
    }

    /// Fresh random surface with the same dimensions and ground range
    pub fn reinitialize<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<()> {
        *self = Self::generate(
            self.points.len(),
            self.field_height,
            self.min_y,
            self.max_y,
            rng,
        )?;
        Ok(())
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn field_height(&self) -> i32 {
        self.field_height
    }

    pub fn heights(&self) -> &[i32] {
        &self.points
    }

    /// Control points as (x, y); empty for surfaces not built from a polyline
    pub fn control_points(&self) -> Vec<Vec2> {
        let step = control_step(self.width(), self.controls.len());
        self.controls
            .iter()
            .enumerate()
            .map(|(i, &y)| Vec2::new(i as f32 * step, y as f32))
            .collect()
    }

    /// Surface y at column `x`; the field floor outside the field
    #[inline]
    pub fn height_at(&self, x: i32) -> i32 {
        if x < 0 {
            return self.field_height;
        }
        self.points
            .get(x as usize)
            .copied()
            .unwrap_or(self.field_height)
    }

    /// Integer mean surface y over columns `x_start..x_end`
    pub fn average_height(&self, x_start: i32, x_end: i32) -> i32 {
        if x_end <= x_start {
            return self.height_at(x_start);
        }
        let sum: i64 = (x_start..x_end).map(|x| self.height_at(x) as i64).sum();
        (sum / (x_end - x_start) as i64) as i32
    }

    /// First point where a shell travelling along `segment` enters the ground.
    ///
    /// Terrain edges are scanned in travel direction and only count when the
    /// shell moves into the solid side, so a shell climbing away from the
    /// surface never collides. If no edge is hit the floor line is checked.
    pub fn collide_segment(&self, segment: &Segment) -> Option<Impact> {
        if segment.is_degenerate() {
            return None;
        }
        let direction = segment.delta();

        if self.width() >= 2 {
            let last_edge = self.width() as i64 - 2;
            let lo = (segment.start.x.min(segment.end.x).floor() as i64 - 1).max(0);
            let hi = (segment.start.x.max(segment.end.x).ceil() as i64).min(last_edge);
            if lo <= hi {
                let hit = if direction.x < 0.0 {
                    (lo..=hi).rev().find_map(|i| self.edge_hit(i as usize, segment))
                } else {
                    (lo..=hi).find_map(|i| self.edge_hit(i as usize, segment))
                };
                if let Some(point) = hit {
                    return Some(Impact {
                        point: to_pixel(point),
                        target: ImpactTarget::Terrain,
                    });
                }
            }
        }

        // Fall back to the field floor
        let floor_y = self.field_height as f32;
        let floor = Segment::new(Vec2::new(0.0, floor_y), Vec2::new(self.width() as f32, floor_y));
        if direction.dot(floor.lower_normal()) <= 0.0 {
            return None;
        }
        segment_intersection(segment, &floor).map(|point| Impact {
            point: to_pixel(point),
            target: ImpactTarget::Floor,
        })
    }

    fn edge_hit(&self, i: usize, segment: &Segment) -> Option<Vec2> {
        let edge = Segment::from_pixels(
            IVec2::new(i as i32, self.points[i]),
            IVec2::new(i as i32 + 1, self.points[i + 1]),
        );
        if segment.delta().dot(edge.lower_normal()) <= 0.0 {
            return None;
        }
        segment_intersection(segment, &edge)
    }

    /// Carve an explosion circle out of the terrain.
    ///
    /// Returns the columns whose undercut material must still fall; commit
    /// them with `settle_columns` once any animation is done.
    pub fn apply_explosion(&mut self, point: IVec2, radius: f32) -> Vec<SloughColumn> {
        let mut sloughing = Vec::new();
        if radius <= 0.0 || self.points.is_empty() {
            return sloughing;
        }

        let center = to_vec2(point);
        let floor = self.field_height as f32;
        let x_lo = (center.x - radius).ceil().max(0.0) as usize;
        let x_hi = (center.x + radius).floor();
        if x_hi < 0.0 {
            return sloughing;
        }
        let x_hi = (x_hi as usize).min(self.width() - 1);

        for x in x_lo..=x_hi {
            let Some((top, bottom)) = vertical_probe_circle(x as f32, center, radius) else {
                continue;
            };
            // Grazing the rim removes nothing
            if bottom - top < 1.0 {
                continue;
            }
            let ground = self.points[x] as f32;

            let new_ground = if bottom > floor {
                // Crater reaches the floor: whatever stays above it drops to the floor
                if top >= floor {
                    ground
                } else {
                    floor - (top - ground).max(0.0)
                }
            } else if ground < top {
                // Crater is buried: the column above it comes loose
                let column = SloughColumn {
                    x,
                    top: self.points[x],
                    bottom: (top.round() as i32).clamp(0, self.field_height),
                    landing: (bottom.round() as i32).clamp(0, self.field_height),
                };
                if column.length() > 0 {
                    sloughing.push(column);
                }
                bottom
            } else if ground <= bottom {
                bottom
            } else {
                // Explosion entirely above the surface here
                continue;
            };

            self.points[x] = (new_ground.round() as i32).clamp(0, self.field_height);
        }

        sloughing
    }

    /// Land previously reported loose material: each column's surface rises by
    /// the length of its debris
    pub fn settle_columns(&mut self, columns: &[SloughColumn]) {
        for column in columns {
            if let Some(y) = self.points.get_mut(column.x) {
                *y = (*y - column.length()).clamp(0, self.field_height);
            }
        }
    }

    /// Flatten columns `x_start..x_end` to `height`
    pub fn correct_height_range(&mut self, x_start: i32, x_end: i32, height: i32) {
        let start = x_start.max(0) as usize;
        let end = x_end.max(0) as usize;
        let height = height.clamp(0, self.field_height);
        for x in start..end.min(self.width()) {
            self.points[x] = height;
        }
    }
}

fn control_step(width: usize, controls: usize) -> f32 {
    if controls < 2 {
        0.0
    } else {
        (width.saturating_sub(1)) as f32 / (controls - 1) as f32
    }
}

/// Linear interpolation between evenly spread controls, one value per column
fn sample_polyline(width: usize, controls: &[i32]) -> Vec<i32> {
    let step = control_step(width, controls.len());
    if step <= 0.0 {
        return vec![controls[0]; width];
    }
    let last_segment = controls.len() - 2;
    (0..width)
        .map(|x| {
            let k = ((x as f32 / step) as usize).min(last_segment);
            let t = (x as f32 - k as f32 * step) / step;
            let a = controls[k] as f32;
            let b = controls[k + 1] as f32;
            (a + (b - a) * t).round() as i32
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const H: i32 = 900;

    #[test]
    fn test_generate_stays_in_range() {
        let mut rng = Pcg32::seed_from_u64(42);
        let terrain = Terrain::generate(1600, H, 400, 800, &mut rng).unwrap();
        assert_eq!(terrain.width(), 1600);
        assert!(terrain.heights().iter().all(|&y| (400..=800).contains(&y)));
        assert_eq!(terrain.control_points().len(), TERRAIN_CONTROL_POINTS);
    }

    #[test]
    fn test_generate_is_deterministic() {
        let a = Terrain::generate(800, H, 300, 700, &mut Pcg32::seed_from_u64(7)).unwrap();
        let b = Terrain::generate(800, H, 300, 700, &mut Pcg32::seed_from_u64(7)).unwrap();
        assert_eq!(a.heights(), b.heights());
    }

    #[test]
    fn test_zero_width_rejected() {
        let mut rng = Pcg32::seed_from_u64(1);
        assert!(matches!(
            Terrain::generate(0, H, 400, 800, &mut rng),
            Err(GameError::InvalidField { .. })
        ));
    }

    #[test]
    fn test_control_polyline_round_trip() {
        // 1001 columns put the 11 controls exactly on columns 0, 100, ..., 1000
        let controls = [500, 600, 400, 450, 800, 700, 650, 300, 350, 500, 550];
        let terrain = Terrain::from_controls(1001, H, &controls).unwrap();
        assert_eq!(terrain.width(), 1001);
        for (i, &c) in controls.iter().enumerate() {
            assert_eq!(terrain.height_at(i as i32 * 100), c);
        }
        // Halfway between controls is the midpoint
        assert_eq!(terrain.height_at(50), 550);
        assert_eq!(terrain.height_at(150), 500);

        // Every column matches the polyline through the controls
        let points = terrain.control_points();
        for x in 0..1001 {
            let k = (x / 100).min(9) as usize;
            let (a, b) = (points[k], points[k + 1]);
            let expected = a.y + (b.y - a.y) * ((x as f32 - a.x) / (b.x - a.x));
            assert_eq!(terrain.height_at(x), expected.round() as i32, "column {x}");
        }
    }

    #[test]
    fn test_reinitialize_keeps_dimensions() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut terrain = Terrain::generate(640, H, 500, 700, &mut rng).unwrap();
        let before = terrain.heights().to_vec();
        terrain.reinitialize(&mut rng).unwrap();
        assert_eq!(terrain.width(), 640);
        assert!(terrain.heights().iter().all(|&y| (500..=700).contains(&y)));
        assert_ne!(terrain.heights(), &before[..]);

        // The new surface is the polyline through the new controls
        let points = terrain.control_points();
        for x in 0..640 {
            let k = points
                .windows(2)
                .position(|w| (x as f32) <= w[1].x)
                .unwrap_or(points.len() - 2);
            let (a, b) = (points[k], points[k + 1]);
            let expected = a.y + (b.y - a.y) * ((x as f32 - a.x) / (b.x - a.x));
            assert!(
                (terrain.height_at(x) as f32 - expected).abs() <= 1.0,
                "column {x}"
            );
        }
    }

    #[test]
    fn test_height_outside_field_is_floor() {
        let terrain = Terrain::flat(100, H, 500);
        assert_eq!(terrain.height_at(-1), H);
        assert_eq!(terrain.height_at(100), H);
        assert_eq!(terrain.height_at(0), 500);
        assert_eq!(terrain.height_at(99), 500);
    }

    #[test]
    fn test_average_height() {
        let terrain = Terrain::from_heights(vec![100, 200, 300, 400], H);
        assert_eq!(terrain.average_height(0, 4), 250);
        assert_eq!(terrain.average_height(2, 6), (300 + 400 + H + H) / 4);
    }

    #[test]
    fn test_descending_shell_hits_surface() {
        let terrain = Terrain::flat(200, H, 500);
        let segment = Segment::from_pixels(IVec2::new(100, 480), IVec2::new(110, 520));
        let impact = terrain.collide_segment(&segment).unwrap();
        assert_eq!(impact.target, ImpactTarget::Terrain);
        assert_eq!(impact.point, IVec2::new(105, 500));
    }

    #[test]
    fn test_leftward_shell_hits_first_slope_in_travel_order() {
        // Two bumps; travelling left must stop at the right-hand one
        let mut heights = vec![600; 100];
        heights[20] = 400;
        heights[80] = 400;
        let terrain = Terrain::from_heights(heights, H);
        let segment = Segment::from_pixels(IVec2::new(95, 450), IVec2::new(5, 450));
        let impact = terrain.collide_segment(&segment).unwrap();
        assert!(impact.point.x > 50, "hit at {:?}", impact.point);
    }

    #[test]
    fn test_rising_shell_below_surface_does_not_collide() {
        let terrain = Terrain::flat(1600, H, 827);
        let segment = Segment::from_pixels(IVec2::new(800, 850), IVec2::new(800, 820));
        assert!(terrain.collide_segment(&segment).is_none());
    }

    #[test]
    fn test_floor_fallback() {
        // Shell already under the surface keeps falling until the floor
        let terrain = Terrain::flat(200, H, 500);
        let segment = Segment::from_pixels(IVec2::new(100, 880), IVec2::new(100, 950));
        let impact = terrain.collide_segment(&segment).unwrap();
        assert_eq!(impact.target, ImpactTarget::Floor);
        assert_eq!(impact.point, IVec2::new(100, H));
    }

    #[test]
    fn test_degenerate_segment_is_ignored() {
        let terrain = Terrain::flat(200, H, 500);
        let segment = Segment::from_pixels(IVec2::new(100, 500), IVec2::new(100, 500));
        assert!(terrain.collide_segment(&segment).is_none());
    }

    #[test]
    fn test_explosion_in_the_air_changes_nothing() {
        let mut terrain = Terrain::flat(400, H, 700);
        let before = terrain.heights().to_vec();
        let sloughing = terrain.apply_explosion(IVec2::new(200, 300), 50.0);
        assert!(sloughing.is_empty());
        assert_eq!(terrain.heights(), &before[..]);
    }

    #[test]
    fn test_surface_explosion_digs_crater() {
        let mut terrain = Terrain::flat(400, H, 500);
        let sloughing = terrain.apply_explosion(IVec2::new(200, 500), 50.0);
        assert!(sloughing.is_empty());
        assert_eq!(terrain.height_at(200), 550);
        assert_eq!(terrain.height_at(230), 540);
        assert_eq!(terrain.height_at(149), 500);
        assert_eq!(terrain.height_at(251), 500);
    }

    #[test]
    fn test_buried_explosion_sloughs_then_settles() {
        let mut terrain = Terrain::flat(400, H, 500);
        let sloughing = terrain.apply_explosion(IVec2::new(200, 600), 50.0);
        let center = sloughing.iter().find(|c| c.x == 200).unwrap();
        assert_eq!(center.top, 500);
        assert_eq!(center.bottom, 550);
        assert_eq!(center.landing, 650);
        assert_eq!(center.length(), 50);
        assert_eq!(center.fall_distance(), 100);
        // Until settled the column sits at the crater floor
        assert_eq!(terrain.height_at(200), 650);

        terrain.settle_columns(&sloughing);
        assert_eq!(terrain.height_at(200), 600);
        // Material is conserved: the surface sank by the crater's chord
        for column in &sloughing {
            let chord = column.landing - column.bottom;
            assert_eq!(terrain.height_at(column.x as i32), 500 + chord);
        }
    }

    #[test]
    fn test_explosion_reaching_floor_caves_in() {
        let mut terrain = Terrain::flat(400, H, 500);
        let sloughing = terrain.apply_explosion(IVec2::new(200, 880), 100.0);
        // 400 px of ground, 120 px blown out below y=780, the rest drops
        assert_eq!(terrain.height_at(200), 620);
        assert_eq!(terrain.height_at(103), 544);
        // The rim columns only touch the circle and stay put
        assert_eq!(terrain.height_at(100), 500);
        assert_eq!(terrain.height_at(300), 500);

        // Near the rim the crater stops short of the floor and is buried
        let xs: Vec<usize> = sloughing.iter().map(|c| c.x).collect();
        assert_eq!(xs, vec![101, 102, 298, 299]);
        let edge = &sloughing[0];
        assert_eq!((edge.top, edge.bottom, edge.landing), (500, 866, 894));

        terrain.settle_columns(&sloughing);
        assert_eq!(terrain.height_at(101), 528);
        assert_eq!(terrain.height_at(102), 540);
        assert_eq!(terrain.height_at(298), 540);
        assert_eq!(terrain.height_at(299), 528);
        assert_eq!(terrain.height_at(200), 620);
    }

    #[test]
    fn test_non_positive_radius_is_noop() {
        let mut terrain = Terrain::flat(400, H, 500);
        assert!(terrain.apply_explosion(IVec2::new(200, 500), 0.0).is_empty());
        assert!(terrain.apply_explosion(IVec2::new(200, 500), -5.0).is_empty());
        assert!(terrain.heights().iter().all(|&y| y == 500));
    }

    #[test]
    fn test_explosion_off_field_edge() {
        let mut terrain = Terrain::flat(100, H, 500);
        terrain.apply_explosion(IVec2::new(-20, 500), 30.0);
        assert_eq!(terrain.height_at(0), 500 + 22);
        terrain.apply_explosion(IVec2::new(-200, 500), 30.0);
        terrain.apply_explosion(IVec2::new(300, 500), 30.0);
        assert_eq!(terrain.height_at(99), 500);
    }

    #[test]
    fn test_correct_height_range_clamps() {
        let mut terrain = Terrain::flat(100, H, 500);
        terrain.correct_height_range(-10, 10, 450);
        assert_eq!(terrain.height_at(0), 450);
        assert_eq!(terrain.height_at(9), 450);
        assert_eq!(terrain.height_at(10), 500);
        terrain.correct_height_range(90, 200, 2000);
        assert_eq!(terrain.height_at(99), H);
    }

    proptest! {
        #[test]
        fn prop_heights_stay_in_field(
            seed in any::<u64>(),
            blasts in prop::collection::vec((-50i32..450, -100i32..1000, 1.0f32..150.0, any::<bool>()), 1..20),
        ) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut terrain = Terrain::generate(400, H, 200, 850, &mut rng).unwrap();
            for (x, y, radius, settle_now) in blasts {
                let sloughing = terrain.apply_explosion(IVec2::new(x, y), radius);
                if settle_now {
                    terrain.settle_columns(&sloughing);
                }
                prop_assert!(terrain.heights().iter().all(|&h| (0..=H).contains(&h)));
            }
        }
    }
}
