use std::sync::Arc;
use std::time::{Duration, Instant};

use pixels::{Pixels, SurfaceTexture};
use tracing::{info, warn};
use winit::dpi::LogicalSize;
use winit::event::{ElementState, Event, KeyEvent, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowBuilder};

use crate::session::{ViewerError, ViewerSession};

const MAX_FRAME_DELTA: Duration = Duration::from_millis(250);
const MAX_TICKS_PER_FRAME: u32 = 5;
const STATS_LOG_INTERVAL: Duration = Duration::from_secs(1);
const SCROLL_NUDGE_PX: f64 = 0.5;

pub fn run_window(mut session: ViewerSession, target_tps: u32) -> Result<(), ViewerError> {
    let (screen_width, screen_height) = session.screen_size();
    let event_loop = EventLoop::new().map_err(ViewerError::CreateEventLoop)?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title("tilemap-viewer")
            .with_inner_size(LogicalSize::new(
                screen_width as f64,
                screen_height as f64,
            ))
            .build(&event_loop)
            .map_err(ViewerError::CreateWindow)?,
    );
    let size = window.inner_size();
    let mut pixels = build_pixels(
        Arc::clone(&window),
        size.width,
        size.height,
        screen_width,
        screen_height,
    )
    .map_err(ViewerError::CreatePixels)?;

    event_loop.set_control_flow(ControlFlow::Poll);

    let fixed_dt = Duration::from_secs_f64(1.0 / target_tps.max(1) as f64);
    let mut accumulator = Duration::ZERO;
    let mut last_frame_instant = Instant::now();
    let mut last_stats_instant = Instant::now();
    let mut ticks_since_log = 0u32;
    let mut repainted_since_log = 0u64;
    info!(target_tps, screen_width, screen_height, "viewer_window_started");

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => {
                    info!(reason = "window_close", "shutdown_requested");
                    window_target.exit();
                }
                WindowEvent::Resized(new_size) => {
                    if new_size.width == 0 || new_size.height == 0 {
                        return;
                    }
                    match build_pixels(
                        Arc::clone(&window),
                        new_size.width,
                        new_size.height,
                        screen_width,
                        screen_height,
                    ) {
                        Ok(rebuilt) => pixels = rebuilt,
                        Err(error) => {
                            warn!(error = %error, "pixels_resize_failed");
                            window_target.exit();
                        }
                    }
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    if is_pressed(&event, KeyCode::Escape) {
                        info!(reason = "escape_key", "shutdown_requested");
                        window_target.exit();
                        return;
                    }
                    let nudge = scroll_nudge(&event);
                    if nudge != (0.0, 0.0) {
                        session.nudge_scroll(nudge.0, nudge.1);
                    }
                }
                WindowEvent::RedrawRequested => {
                    let now = Instant::now();
                    let raw_frame_dt = now.saturating_duration_since(last_frame_instant);
                    last_frame_instant = now;
                    accumulator = accumulator.saturating_add(raw_frame_dt.min(MAX_FRAME_DELTA));

                    let step_plan = plan_ticks(accumulator, fixed_dt, MAX_TICKS_PER_FRAME);
                    for _ in 0..step_plan.ticks_to_run {
                        session.step();
                    }
                    accumulator = step_plan.remaining_accumulator;
                    ticks_since_log += step_plan.ticks_to_run;
                    if step_plan.dropped_backlog > Duration::ZERO {
                        warn!(
                            dropped_backlog_ms = step_plan.dropped_backlog.as_millis() as u64,
                            "tick_clamp_triggered"
                        );
                    }

                    let stats = session.render_frame();
                    repainted_since_log += u64::from(stats.cells_repainted());
                    pixels
                        .frame_mut()
                        .copy_from_slice(session.frame().as_rgba());
                    if let Err(error) = pixels.render() {
                        warn!(error = %error, "pixels_render_failed");
                        window_target.exit();
                    }

                    if now.saturating_duration_since(last_stats_instant) >= STATS_LOG_INTERVAL {
                        let (origin_x, origin_y) = session.tilemap().origin();
                        info!(
                            ticks = ticks_since_log,
                            cells_repainted = repainted_since_log,
                            origin_x,
                            origin_y,
                            "viewer_stats"
                        );
                        last_stats_instant = now;
                        ticks_since_log = 0;
                        repainted_since_log = 0;
                    }
                }
                _ => {}
            },
            Event::AboutToWait => {
                window.request_redraw();
            }
            Event::LoopExiting => {
                info!("shutdown");
            }
            _ => {}
        })
        .map_err(ViewerError::EventLoopRun)
}

fn build_pixels(
    window: Arc<Window>,
    window_width: u32,
    window_height: u32,
    buffer_width: u32,
    buffer_height: u32,
) -> Result<Pixels<'static>, pixels::Error> {
    let surface = SurfaceTexture::new(window_width, window_height, window);
    Pixels::new(buffer_width, buffer_height, surface)
}

fn is_pressed(event: &KeyEvent, code: KeyCode) -> bool {
    event.state == ElementState::Pressed && event.physical_key == PhysicalKey::Code(code)
}

fn scroll_nudge(event: &KeyEvent) -> (f64, f64) {
    if event.state != ElementState::Pressed {
        return (0.0, 0.0);
    }
    match event.physical_key {
        PhysicalKey::Code(KeyCode::ArrowLeft) => (-SCROLL_NUDGE_PX, 0.0),
        PhysicalKey::Code(KeyCode::ArrowRight) => (SCROLL_NUDGE_PX, 0.0),
        PhysicalKey::Code(KeyCode::ArrowUp) => (0.0, -SCROLL_NUDGE_PX),
        PhysicalKey::Code(KeyCode::ArrowDown) => (0.0, SCROLL_NUDGE_PX),
        _ => (0.0, 0.0),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TickPlan {
    ticks_to_run: u32,
    remaining_accumulator: Duration,
    dropped_backlog: Duration,
}

fn plan_ticks(accumulator: Duration, fixed_dt: Duration, max_ticks_per_frame: u32) -> TickPlan {
    if fixed_dt.is_zero() {
        return TickPlan {
            ticks_to_run: 0,
            remaining_accumulator: Duration::ZERO,
            dropped_backlog: accumulator,
        };
    }
    let due = accumulator.as_nanos() / fixed_dt.as_nanos();
    let ticks_to_run = u32::try_from(due)
        .unwrap_or(u32::MAX)
        .min(max_ticks_per_frame);
    let consumed = fixed_dt.saturating_mul(ticks_to_run);
    let left = accumulator.saturating_sub(consumed);

    if left >= fixed_dt {
        TickPlan {
            ticks_to_run,
            remaining_accumulator: Duration::ZERO,
            dropped_backlog: left,
        }
    } else {
        TickPlan {
            ticks_to_run,
            remaining_accumulator: left,
            dropped_backlog: Duration::ZERO,
        }
    }
}
