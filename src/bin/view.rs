//! Interactive debug viewer.
//!
//! ```bash
//! cargo run --release --bin view -- [level.txt]
//! ```
//!
//! Arrows walk, duck and look up, Space jumps, R respawns, Escape quits.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use glam::{IVec2, Vec2};
use minifb::{Key, KeyRepeat, Window, WindowOptions};

use platphys::{
    logging,
    sim::{Slot, TicRunner},
    world::{Brick, BrickKind, Layer, Level, level},
};

const W: usize = 960;
const H: usize = 540;
const SCALE: i32 = 2;

const BACKGROUND: u32 = 0x00_10_14_1C;
const ANGLE_PROBE: u32 = 0x00_FF_FF_FF;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// ASCII level file; the built-in demo level when omitted
    level: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logging::init(args.verbose);

    let level = match &args.level {
        Some(path) => {
            Level::load(path).with_context(|| format!("loading level {}", path.display()))?
        }
        None => level::parse(level::DEMO)?,
    };

    let mut sim = TicRunner::new();
    let player = sim.spawn_actor(level.spawn);

    let mut win = Window::new("platphys", W, H, WindowOptions::default())?;
    win.set_target_fps(60);
    let mut buffer = vec![BACKGROUND; W * H];

    while win.is_open() && !win.is_key_down(Key::Escape) {
        /* --------------- drive the actor --------------------------------- */
        if let Some(mut pa) = sim.actor_mut(player) {
            if win.is_key_down(Key::Left) {
                pa.walk_left();
            }
            if win.is_key_down(Key::Right) {
                pa.walk_right();
            }
            if win.is_key_down(Key::Up) {
                pa.look_up();
            }
            if win.is_key_down(Key::Down) {
                pa.duck();
            }
            if win.is_key_down(Key::Space) {
                pa.jump();
            }

            let fell_out = pa.position().y > (level.size.y + 4 * level::TILE) as f32;
            if fell_out || win.is_key_pressed(Key::R, KeyRepeat::No) {
                pa.kill();
                pa.resurrect(level.spawn);
            }
        }

        sim.pump(&level.map);

        /* --------------- draw -------------------------------------------- */
        buffer.fill(BACKGROUND);
        let Some(pa) = sim.actor(player) else {
            break;
        };
        let camera = pa.position().as_ivec2() - IVec2::new(W as i32, H as i32) / (2 * SCALE);
        let to_screen = |p: IVec2| (p - camera) * SCALE;

        for brick in level.map.bricks() {
            draw_brick(&mut buffer, brick, camera);
        }

        for line in pa.sensor_lines() {
            let colour = if line.enabled {
                slot_colour(line.slot)
            } else {
                dim(slot_colour(line.slot))
            };
            let (a, b) = (to_screen(line.head), to_screen(line.tail));
            draw_line(&mut buffer, W, H, a.x, a.y, b.x, b.y, colour);
        }

        for p in pa.angle_sensor_points() {
            let p = to_screen(p.round().as_ivec2());
            draw_line(&mut buffer, W, H, p.x - 3, p.y, p.x + 3, p.y, ANGLE_PROBE);
            draw_line(&mut buffer, W, H, p.x, p.y - 3, p.x, p.y + 3, ANGLE_PROBE);
        }

        let centre = to_screen(pa.position().floor().as_ivec2());
        draw_line(&mut buffer, W, H, centre.x - 1, centre.y, centre.x + 1, centre.y, ANGLE_PROBE);

        win.set_title(&title(pa.state(), pa.angle_degrees(), pa.gsp(), pa.position()));
        drop(pa);

        win.update_with_buffer(&buffer, W, H)?;
    }
    Ok(())
}

fn title(state: platphys::sim::State, degrees: i32, gsp: f32, position: Vec2) -> String {
    format!(
        "platphys: {state:?}  angle {degrees}°  gsp {gsp:.1}  ({:.0}, {:.0})",
        position.x, position.y
    )
}

fn slot_colour(slot: Slot) -> u32 {
    match slot {
        Slot::A => 0x00_00_E0_40,
        Slot::B => 0x00_E0_E0_00,
        Slot::C => 0x00_00_A0_FF,
        Slot::D => 0x00_E0_60_FF,
        Slot::M => 0x00_FF_40_40,
        Slot::N => 0x00_FF_A0_20,
        Slot::U => 0x00_FF_FF_FF,
    }
}

fn dim(colour: u32) -> u32 {
    (colour >> 2) & 0x00_3F_3F_3F
}

fn brick_colour(brick: &Brick) -> u32 {
    match (brick.kind, brick.layer) {
        (BrickKind::Cloud, _) => 0x00_50_70_A0,
        (BrickKind::Solid, Layer::Green) => 0x00_30_90_40,
        (BrickKind::Solid, Layer::Yellow) => 0x00_B0_A0_30,
        (BrickKind::Solid, Layer::Default) => 0x00_70_70_78,
    }
}

/// Fill every solid mask pixel of `brick` as a `SCALE`×`SCALE` block.
fn draw_brick(buf: &mut [u32], brick: &Brick, camera: IVec2) {
    let colour = brick_colour(brick);
    let mask = brick.mask();
    for my in 0..mask.height() {
        let sy = (brick.pos.y + my - camera.y) * SCALE;
        if sy + SCALE <= 0 || sy >= H as i32 {
            continue;
        }
        for mx in 0..mask.width() {
            let sx = (brick.pos.x + mx - camera.x) * SCALE;
            if sx + SCALE <= 0 || sx >= W as i32 || !mask.at(mx, my) {
                continue;
            }
            for y in sy.max(0)..(sy + SCALE).min(H as i32) {
                let row = y as usize * W;
                buf[row + sx.max(0) as usize..row + (sx + SCALE).min(W as i32) as usize].fill(colour);
            }
        }
    }
}

/// Bresenham, clipped per pixel.
#[allow(clippy::too_many_arguments)]
fn draw_line(
    buf: &mut [u32],
    w: usize,
    h: usize,
    mut x0: i32,
    mut y0: i32,
    x1: i32,
    y1: i32,
    colour: u32,
) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if (0..w as i32).contains(&x0) && (0..h as i32).contains(&y0) {
            buf[y0 as usize * w + x0 as usize] = colour;
        }
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
