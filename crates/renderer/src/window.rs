use std::time::Instant;

use tracing::{error, info, warn};
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, Event, MouseButton, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoopBuilder, EventLoopProxy};
use winit::keyboard::{Key, NamedKey};
use winit::window::WindowBuilder;

use crate::canvas::{Canvas, CanvasAction, CanvasEvent};
use crate::error::CanvasError;
use crate::gpu::GpuState;
use crate::pointer::PointerTracker;
use crate::runtime::TickScheduler;

/// How a run ended.
#[derive(Clone, Debug, PartialEq)]
pub struct RunSummary {
    pub ticks: u64,
    pub elapsed: f64,
    pub frames: u64,
}

/// Out-of-band signals delivered to the event loop through its proxy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LoopSignal {
    Interrupt,
}

impl LoopSignal {
    fn canvas_event(self) -> CanvasEvent {
        match self {
            Self::Interrupt => CanvasEvent::Close,
        }
    }
}

/// Routes SIGINT into the loop so Ctrl-C stops the canvas like a window close.
fn install_interrupt_handler(proxy: EventLoopProxy<LoopSignal>) {
    let installed = ctrlc::set_handler(move || {
        let _ = proxy.send_event(LoopSignal::Interrupt);
    });
    if let Err(err) = installed {
        warn!(error = %err, "failed to install interrupt handler");
    }
}

/// Opens the window and drives `canvas` until it stops.
///
/// The window stays hidden until the GPU program has compiled, so a shader
/// that fails to build never flashes an empty window.
pub fn run(canvas: &mut Canvas) -> Result<RunSummary, CanvasError> {
    let event_loop = EventLoopBuilder::<LoopSignal>::with_user_event()
        .build()
        .map_err(|err| CanvasError::Gpu(format!("failed to create event loop: {err}")))?;
    install_interrupt_handler(event_loop.create_proxy());

    let (width, height) = canvas.config().size;
    let window = WindowBuilder::new()
        .with_title(canvas.config().title.as_str())
        .with_inner_size(PhysicalSize::new(width, height))
        .with_visible(false)
        .build(&event_loop)
        .map_err(|err| CanvasError::Gpu(format!("failed to create window: {err}")))?;

    let mut gpu = GpuState::new(&window, window.inner_size(), canvas)?;
    canvas.start()?;
    window.set_visible(true);
    info!(width, height, rate = canvas.config().rate, "renderer running");

    // The surface may come up at a different size than requested.
    let actual = gpu.size();
    if (actual.width, actual.height) != (width, height) {
        canvas.update(CanvasEvent::Resize {
            width: actual.width,
            height: actual.height,
        });
    }

    let mut scheduler = TickScheduler::new(canvas.config().tick_interval(), Instant::now());
    let mut pointer = PointerTracker::new();
    let mut frames: u64 = 0;
    let mut failure: Option<CanvasError> = None;

    let run_result = event_loop.run(|event, elwt| {
        let canvas_event = match event {
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested | WindowEvent::Destroyed => Some(CanvasEvent::Close),
                WindowEvent::KeyboardInput { event, .. }
                    if event.state == ElementState::Pressed
                        && matches!(event.logical_key, Key::Named(NamedKey::Escape)) =>
                {
                    Some(CanvasEvent::Close)
                }
                WindowEvent::Resized(size) => Some(CanvasEvent::Resize {
                    width: size.width,
                    height: size.height,
                }),
                WindowEvent::CursorMoved { position, .. } => {
                    pointer.cursor_moved(position.x as f32, position.y as f32)
                }
                WindowEvent::MouseInput {
                    state,
                    button: MouseButton::Left,
                    ..
                } => match state {
                    ElementState::Pressed => pointer.button_pressed(),
                    ElementState::Released => pointer.button_released(),
                },
                WindowEvent::RedrawRequested => Some(CanvasEvent::Draw),
                _ => None,
            },
            Event::UserEvent(signal) => {
                info!(?signal, "stop requested");
                Some(signal.canvas_event())
            }
            Event::AboutToWait => {
                let due = scheduler.poll(Instant::now());
                elwt.set_control_flow(ControlFlow::WaitUntil(scheduler.next_deadline()));
                due.then_some(CanvasEvent::Tick)
            }
            _ => None,
        };

        let Some(canvas_event) = canvas_event else {
            return;
        };
        match canvas.update(canvas_event) {
            CanvasAction::None => {}
            CanvasAction::RequestRedraw => window.request_redraw(),
            CanvasAction::Reconfigure { width, height } => {
                gpu.resize(PhysicalSize::new(width, height));
            }
            CanvasAction::Render => match gpu.render(&canvas.uniforms()) {
                Ok(()) => frames += 1,
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    gpu.resize(gpu.size());
                }
                Err(wgpu::SurfaceError::Timeout) => {
                    warn!("surface timeout; retrying next frame");
                }
                Err(err) => {
                    error!(error = %err, "surface error; stopping");
                    failure = Some(CanvasError::Gpu(format!("surface error: {err}")));
                    canvas.update(CanvasEvent::Close);
                    elwt.exit();
                }
            },
            CanvasAction::Exit => elwt.exit(),
        }
    });

    if let Some(err) = failure {
        return Err(err);
    }
    run_result.map_err(|err| CanvasError::Gpu(format!("window event loop error: {err}")))?;

    let state = canvas.state();
    let summary = RunSummary {
        ticks: state.ticks,
        elapsed: state.elapsed,
        frames,
    };
    info!(
        ticks = summary.ticks,
        elapsed = summary.elapsed,
        frames = summary.frames,
        "renderer stopped"
    );
    Ok(summary)
}
