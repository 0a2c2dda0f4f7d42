use std::error::Error;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use glam::DVec2;
use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use splatfluid::config::{self, Config};
use splatfluid::input::MOUSE_ID;
use splatfluid::renderer::{self, VizMode};
use splatfluid::solver::random_splat_count;
use splatfluid::Simulation;

const HEADLESS_DEFAULT_FRAMES: usize = 600;

fn is_headless() -> bool {
    std::env::args().any(|a| a == "--headless")
}

/// Parse `--frames <N>` from CLI args.
fn parse_frames() -> Option<usize> {
    let args: Vec<String> = std::env::args().collect();
    args.windows(2).find(|w| w[0] == "--frames").and_then(|w| w[1].parse().ok())
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let cfg = config::load();
    cfg.sim_config().validate()?;

    if is_headless() {
        run_headless(cfg)
    } else {
        run_gui(cfg)
    }
}

/// Window pixel position to texcoords, origin bottom-left.
fn mouse_texcoord(pos: (f32, f32), size: (usize, usize)) -> DVec2 {
    let (w, h) = (size.0.max(1) as f64, size.1.max(1) as f64);
    DVec2::new(pos.0 as f64 / w, 1.0 - pos.1 as f64 / h)
}

fn run_gui(cfg: Config) -> Result<(), Box<dyn Error>> {
    let sim_config = cfg.sim_config();
    let Config { display, seed, .. } = cfg;
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let (mut w, mut h) = (display.width, display.height);
    let mut window = Window::new(
        "splatfluid",
        w,
        h,
        WindowOptions {
            resize: true,
            ..WindowOptions::default()
        },
    )?;
    window.set_target_fps(display.target_fps);

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || r.store(false, Ordering::SeqCst))?;

    let mut sim = Simulation::new(sim_config, Some((w, h)))?;
    let n = random_splat_count(&mut rng);
    sim.multiple_splats(n, &mut rng)?;

    let mut viz_mode = VizMode::Dye;
    let mut framebuf = vec![0u32; w * h];
    let mut rgba_buf: Vec<u8> = Vec::new();
    let mut mouse_down = false;
    let mut frame_count = 0u32;
    let mut last_fps_time = Instant::now();
    let mut last_frame = Instant::now();

    while window.is_open() && running.load(Ordering::SeqCst) {
        // --- Keyboard handling ---
        if window.is_key_pressed(Key::Escape, KeyRepeat::No) {
            break;
        }
        if window.is_key_pressed(Key::Space, KeyRepeat::No) {
            let mut next = sim.config().clone();
            next.paused = !next.paused;
            log::info!("{}", if next.paused { "paused" } else { "resumed" });
            sim.set_config(next);
        }
        if window.is_key_pressed(Key::R, KeyRepeat::No) {
            let n = random_splat_count(&mut rng);
            sim.multiple_splats(n, &mut rng)?;
        }
        if window.is_key_pressed(Key::V, KeyRepeat::No) {
            viz_mode = viz_mode.next();
            log::info!("showing {}", viz_mode.label());
        }

        // --- Window resize ---
        let (new_w, new_h) = window.get_size();
        if new_w != w || new_h != h {
            w = new_w;
            h = new_h;
            framebuf = vec![0u32; w * h];
            let target = if w > 0 && h > 0 { Some((w, h)) } else { None };
            sim.set_target_size(target);
        }

        // --- Mouse ---
        let pressed = window.get_mouse_down(MouseButton::Left);
        if let Some(pos) = window.get_mouse_pos(MouseMode::Clamp) {
            let texcoord = mouse_texcoord(pos, (w, h));
            match (mouse_down, pressed) {
                (false, true) => sim.pointer_down(MOUSE_ID, texcoord, &mut rng),
                (true, true) => sim.pointer_move(MOUSE_ID, texcoord),
                (true, false) => sim.pointer_up(MOUSE_ID),
                (false, false) => {}
            }
        } else if mouse_down && !pressed {
            sim.pointer_up(MOUSE_ID);
        }
        mouse_down = pressed;

        // --- Step ---
        let now = Instant::now();
        let dt = now.duration_since(last_frame).as_secs_f64().min(display.max_dt);
        last_frame = now;
        sim.tick(dt, &mut rng)?;

        // --- Draw ---
        let field = match viz_mode {
            VizMode::Dye => sim.dye()?,
            VizMode::Velocity => sim.velocity()?,
        };
        renderer::render_into(&mut rgba_buf, field, w, h, viz_mode, sim.config().background_color);
        renderer::rgba_to_argb(&rgba_buf, &mut framebuf);
        window.update_with_buffer(&framebuf, w, h)?;

        frame_count += 1;
        let now = Instant::now();
        if now.duration_since(last_fps_time) >= Duration::from_secs(1) {
            let display_fps = frame_count;
            frame_count = 0;
            last_fps_time = now;
            window.set_title(&format!("splatfluid - {display_fps} fps - {}", viz_mode.label()));
        }
    }

    sim.dispose();
    Ok(())
}

/// Step without a window and log dye energy, for profiling and smoke runs.
fn run_headless(cfg: Config) -> Result<(), Box<dyn Error>> {
    let sim_config = cfg.sim_config();
    let Config { display, seed, .. } = cfg;
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let frames = parse_frames().unwrap_or(HEADLESS_DEFAULT_FRAMES);
    let dt = display.max_dt;

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || r.store(false, Ordering::SeqCst))?;

    let mut sim = Simulation::new(sim_config, Some((display.width, display.height)))?;
    let n = random_splat_count(&mut rng);
    sim.multiple_splats(n, &mut rng)?;
    log::info!("headless run: {frames} frames, {n} seed splats");

    let start = Instant::now();
    for frame in 0..frames {
        if !running.load(Ordering::SeqCst) {
            log::info!("interrupted at frame {frame}");
            break;
        }
        sim.tick(dt, &mut rng)?;
        if frame % 60 == 0 {
            log::info!("frame {frame}: dye energy {:.4}", sim.dye()?.total_abs());
        }
    }
    log::info!(
        "done in {:.2}s, final dye energy {:.4}",
        start.elapsed().as_secs_f64(),
        sim.dye()?.total_abs()
    );
    sim.dispose();
    Ok(())
}
