//! Render surface interface
//!
//! The game decides what is on screen and when; a `Renderer` decides how the
//! pixels get there.

pub mod shapes;

use glam::IVec2;

use crate::sim::{Color, SloughColumn, TurnController};
use shapes::HealthLevel;

pub trait Renderer {
    fn begin_frame(&mut self);
    fn draw_terrain(&mut self, heights: &[i32]);
    fn draw_tank(&mut self, position: IVec2, turret_angle: f32, color: Color, highlighted: bool);
    /// `fill` is the filled width in pixels, `0..=HEALTH_BAR_LENGTH`
    fn draw_health_bar(&mut self, slot: IVec2, fill: i32, color: Color);
    fn draw_shell(&mut self, position: IVec2, color: Color);
    fn draw_explosion_frame(&mut self, point: IVec2, radius: f32, frame: u32);
    /// Loose terrain of one column, currently spanning `top..top + length`
    fn draw_debris(&mut self, x: usize, top: i32, length: i32);
    fn present(&mut self);
}

/// Draw the terrain, every tank and its health bar, and the shell in flight
pub fn draw_scene<R: Renderer + ?Sized>(ctrl: &TurnController, renderer: &mut R) {
    renderer.draw_terrain(ctrl.terrain().heights());
    for player in ctrl.players() {
        for tank in &player.tanks {
            renderer.draw_tank(
                tank.position,
                tank.turret_angle,
                tank.color,
                ctrl.is_active(player.index, tank.id),
            );
            renderer.draw_health_bar(
                tank.health_bar_slot,
                shapes::health_bar_fill(tank.health),
                HealthLevel::from_health(tank.health).color(),
            );
        }
    }
    if let (Some(position), Some(tank)) = (ctrl.shell_position(), ctrl.active_tank()) {
        renderer.draw_shell(position, tank.color);
    }
}

/// Draw every loose column at its position on animation frame `frame`
pub fn draw_sloughing<R: Renderer + ?Sized>(
    columns: &[SloughColumn],
    frame: u32,
    frames: u32,
    renderer: &mut R,
) {
    for column in columns {
        renderer.draw_debris(
            column.x,
            shapes::debris_top(column, frame, frames),
            column.length(),
        );
    }
}

/// Renderer that draws nothing; counts presented frames
#[derive(Debug, Default)]
pub struct NullRenderer {
    pub frames: u64,
}

impl Renderer for NullRenderer {
    fn begin_frame(&mut self) {}
    fn draw_terrain(&mut self, _heights: &[i32]) {}
    fn draw_tank(&mut self, _position: IVec2, _turret_angle: f32, _color: Color, _highlighted: bool) {}
    fn draw_health_bar(&mut self, _slot: IVec2, _fill: i32, _color: Color) {}
    fn draw_shell(&mut self, _position: IVec2, _color: Color) {}
    fn draw_explosion_frame(&mut self, _point: IVec2, _radius: f32, _frame: u32) {}
    fn draw_debris(&mut self, _x: usize, _top: i32, _length: i32) {}

    fn present(&mut self) {
        self.frames += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::HEALTH_BAR_LENGTH;
    use crate::settings::Settings;
    use crate::sim::TickInput;

    #[derive(Default)]
    struct BarRecorder {
        bars: Vec<(i32, Color)>,
    }

    impl Renderer for BarRecorder {
        fn begin_frame(&mut self) {}
        fn draw_terrain(&mut self, _heights: &[i32]) {}
        fn draw_tank(&mut self, _position: IVec2, _angle: f32, _color: Color, _highlighted: bool) {}
        fn draw_health_bar(&mut self, _slot: IVec2, fill: i32, color: Color) {
            self.bars.push((fill, color));
        }
        fn draw_shell(&mut self, _position: IVec2, _color: Color) {}
        fn draw_explosion_frame(&mut self, _point: IVec2, _radius: f32, _frame: u32) {}
        fn draw_debris(&mut self, _x: usize, _top: i32, _length: i32) {}
        fn present(&mut self) {}
    }

    #[test]
    fn test_scene_draws_health_bar_fill() {
        let mut ctrl = TurnController::new(Settings::default()).unwrap();
        ctrl.tick(&TickInput::default());
        let mut renderer = BarRecorder::default();
        draw_scene(&ctrl, &mut renderer);

        let tanks: usize = ctrl.players().iter().map(|p| p.tanks.len()).sum();
        assert_eq!(renderer.bars.len(), tanks);
        for (fill, color) in renderer.bars {
            assert_eq!(fill, HEALTH_BAR_LENGTH);
            assert_eq!(color, HealthLevel::Good.color());
        }
    }
}
