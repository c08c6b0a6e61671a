//! Window-free canvas state machine.
//!
//! Everything that decides what the shader sees lives here; the window
//! adapter only translates winit input into [`CanvasEvent`]s and executes the
//! returned [`CanvasAction`]s.

use crate::compile::assemble_fragment_source;
use crate::error::CanvasError;
use crate::textures::ChannelImage;
use crate::types::{CanvasConfig, ChannelSource, ChannelTextureKind, PassSource, CHANNEL_COUNT};
use crate::uniforms::ShadertoyUniforms;

/// Absorbs float error in `ticks / rate` when comparing against the duration.
const DURATION_EPSILON: f64 = 1e-9;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CanvasPhase {
    Uninitialized,
    Initialized,
    Running,
    Stopped,
}

impl CanvasPhase {
    fn name(self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Initialized => "initialized",
            Self::Running => "running",
            Self::Stopped => "stopped",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CanvasEvent {
    Tick,
    Draw,
    /// Window pixel coordinates, top-left origin.
    MouseClick { x: f32, y: f32 },
    /// Window pixel coordinates, top-left origin; `press_*` is where the button went down.
    MouseDrag {
        x: f32,
        y: f32,
        press_x: f32,
        press_y: f32,
    },
    Resize { width: u32, height: u32 },
    Close,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CanvasAction {
    None,
    RequestRedraw,
    Render,
    Reconfigure { width: u32, height: u32 },
    Exit,
}

/// Mutable per-run state.
#[derive(Clone, Debug, PartialEq)]
pub struct CanvasState {
    pub phase: CanvasPhase,
    /// Simulated clock in seconds, always `ticks / rate`.
    pub elapsed: f64,
    pub ticks: u64,
    pub mouse: [f32; 4],
    pub viewport: (u32, u32),
    /// `(w, h, 0)` of the image bound to each channel.
    pub channel_resolution: [[f32; 3]; CHANNEL_COUNT],
}

/// Assembled fragment source plus the sampler layout it declares.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FragmentProgram {
    pub source: String,
    pub channels: [Option<ChannelTextureKind>; CHANNEL_COUNT],
}

/// A texture channel whose media still has to be fetched and bound.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextureRequest {
    pub channel: usize,
    pub src: String,
}

pub struct Canvas {
    config: CanvasConfig,
    state: CanvasState,
    program: Option<FragmentProgram>,
    requests: Vec<TextureRequest>,
    images: [Option<ChannelImage>; CHANNEL_COUNT],
}

impl Canvas {
    pub fn new(config: CanvasConfig) -> Self {
        let state = CanvasState {
            phase: CanvasPhase::Uninitialized,
            elapsed: 0.0,
            ticks: 0,
            mouse: [0.0; 4],
            viewport: config.size,
            channel_resolution: [[0.0; 3]; CHANNEL_COUNT],
        };
        Self {
            config,
            state,
            program: None,
            requests: Vec::new(),
            images: Default::default(),
        }
    }

    /// Builds the fragment program for `pass` and resets the uniforms.
    ///
    /// Cubemap and unknown channel types fail here, before any window exists.
    pub fn initialize(&mut self, pass: &PassSource) -> Result<(), CanvasError> {
        self.expect_phase(CanvasPhase::Uninitialized)?;

        let mut channels = [None; CHANNEL_COUNT];
        let mut requests = Vec::new();
        for (channel, source) in pass.channels.iter() {
            match source {
                ChannelSource::Texture { src } => {
                    channels[channel] = source.texture_kind();
                    requests.push(TextureRequest {
                        channel,
                        src: src.clone(),
                    });
                }
                ChannelSource::Music { src } => {
                    tracing::warn!(channel, src = %src, "music channels are not supported; skipping");
                }
                ChannelSource::Cubemap { .. } => {
                    return Err(CanvasError::UnsupportedFeature(format!(
                        "cubemap input on channel {channel} is not implemented"
                    )));
                }
                ChannelSource::Unsupported { kind } => {
                    return Err(CanvasError::UnsupportedFeature(format!(
                        "unknown sampler type '{kind}' on channel {channel}"
                    )));
                }
            }
        }

        let source = assemble_fragment_source(&pass.code, &channels);
        tracing::debug!(bytes = source.len(), textures = requests.len(), "assembled fragment shader");

        self.program = Some(FragmentProgram { source, channels });
        self.requests = requests;
        self.images = Default::default();
        self.state.elapsed = 0.0;
        self.state.ticks = 0;
        self.state.mouse = [0.0; 4];
        self.state.viewport = self.config.size;
        self.state.channel_resolution = [[0.0; 3]; CHANNEL_COUNT];
        self.state.phase = CanvasPhase::Initialized;
        Ok(())
    }

    /// Texture channels declared by the initialized pass, in channel order.
    pub fn texture_requests(&self) -> &[TextureRequest] {
        &self.requests
    }

    /// Binds decoded pixels to a requested texture channel.
    pub fn bind_texture(&mut self, channel: usize, image: ChannelImage) -> Result<(), CanvasError> {
        self.expect_phase(CanvasPhase::Initialized)?;
        if !self.requests.iter().any(|request| request.channel == channel) {
            return Err(CanvasError::InvalidState {
                expected: "a declared texture channel",
                actual: "an undeclared channel",
            });
        }
        tracing::info!(channel, width = image.width, height = image.height, "bound channel texture");
        self.state.channel_resolution[channel] = [image.width as f32, image.height as f32, 0.0];
        self.images[channel] = Some(image);
        Ok(())
    }

    /// Moves to `Running` once every texture channel has an image.
    pub fn start(&mut self) -> Result<(), CanvasError> {
        self.expect_phase(CanvasPhase::Initialized)?;
        if let Some(missing) = self
            .requests
            .iter()
            .find(|request| self.images[request.channel].is_none())
        {
            return Err(CanvasError::Texture {
                channel: missing.channel,
                message: "no image was bound".to_string(),
            });
        }
        self.state.phase = CanvasPhase::Running;
        Ok(())
    }

    pub fn update(&mut self, event: CanvasEvent) -> CanvasAction {
        if self.state.phase == CanvasPhase::Stopped {
            return CanvasAction::None;
        }
        match event {
            CanvasEvent::Tick => self.tick(),
            CanvasEvent::Draw => {
                if self.state.phase == CanvasPhase::Running {
                    CanvasAction::Render
                } else {
                    CanvasAction::None
                }
            }
            CanvasEvent::MouseClick { x, y } => {
                self.state.mouse = [x, y, x, y];
                CanvasAction::None
            }
            CanvasEvent::MouseDrag {
                x,
                y,
                press_x,
                press_y,
            } => {
                let height = self.state.viewport.1 as f32;
                self.state.mouse = [x, height - y, press_x, height - press_y];
                CanvasAction::None
            }
            CanvasEvent::Resize { width, height } => {
                if width == 0 || height == 0 {
                    return CanvasAction::None;
                }
                self.state.viewport = (width, height);
                CanvasAction::Reconfigure { width, height }
            }
            CanvasEvent::Close => {
                self.state.phase = CanvasPhase::Stopped;
                CanvasAction::Exit
            }
        }
    }

    fn tick(&mut self) -> CanvasAction {
        if self.state.phase != CanvasPhase::Running {
            return CanvasAction::None;
        }
        self.state.ticks += 1;
        self.state.elapsed = self.state.ticks as f64 / f64::from(self.config.rate.max(1));
        if let Some(limit) = self.config.duration {
            if self.state.elapsed + DURATION_EPSILON >= limit {
                tracing::info!(ticks = self.state.ticks, elapsed = self.state.elapsed, "duration reached");
                self.state.phase = CanvasPhase::Stopped;
                return CanvasAction::Exit;
            }
        }
        CanvasAction::RequestRedraw
    }

    /// Uniform block for the current state, with `iDate` sampled now.
    pub fn uniforms(&self) -> ShadertoyUniforms {
        let (width, height) = self.state.viewport;
        let mut uniforms = ShadertoyUniforms::new(width, height, self.config.sample_rate);
        uniforms.i_global_time = self.state.elapsed as f32;
        uniforms.i_time_delta = 1.0 / self.config.rate.max(1) as f32;
        uniforms.i_frame = self.state.ticks.min(i32::MAX as u64) as i32;
        uniforms.i_mouse = self.state.mouse;
        for (index, resolution) in self.state.channel_resolution.iter().enumerate() {
            uniforms.set_channel_resolution(index, resolution[0] as u32, resolution[1] as u32);
        }
        uniforms.refresh_date();
        uniforms
    }

    pub fn state(&self) -> &CanvasState {
        &self.state
    }

    pub fn phase(&self) -> CanvasPhase {
        self.state.phase
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    pub fn program(&self) -> Option<&FragmentProgram> {
        self.program.as_ref()
    }

    pub fn channel_image(&self, channel: usize) -> Option<&ChannelImage> {
        self.images.get(channel).and_then(Option::as_ref)
    }

    fn expect_phase(&self, expected: CanvasPhase) -> Result<(), CanvasError> {
        if self.state.phase == expected {
            Ok(())
        } else {
            Err(CanvasError::InvalidState {
                expected: expected.name(),
                actual: self.state.phase.name(),
            })
        }
    }
}
