//! Real-time canvas for Shadertoy fragment shaders.
//!
//! ```text
//!   PassSource ──▶ Canvas::initialize ──▶ FragmentProgram (header + samplers + code + main)
//!                        │
//!   ChannelImage ──▶ Canvas::bind_texture ──▶ iChannelResolution[n]
//!                        │
//!   window::run ──▶ GpuState (surface, pipeline, textures) ──▶ winit loop
//!                        ▲                       │
//!                        └── CanvasAction ◀── Canvas::update(CanvasEvent)
//! ```
//!
//! [`Canvas`] holds every piece of state the shader can observe and never
//! touches the window, so timing and input rules are unit tested without a
//! GPU. [`window::run`] owns the event loop and the wgpu resources.

mod canvas;
mod compile;
mod error;
mod gpu;
mod pointer;
mod runtime;
mod textures;
mod types;
mod uniforms;
pub mod window;

pub use canvas::{
    Canvas, CanvasAction, CanvasEvent, CanvasPhase, CanvasState, FragmentProgram, TextureRequest,
};
pub use compile::{assemble_fragment_source, sampler_declarations};
pub use error::CanvasError;
pub use pointer::PointerTracker;
pub use runtime::TickScheduler;
pub use textures::ChannelImage;
pub use types::{
    CanvasConfig, ChannelBindings, ChannelSource, ChannelTextureKind, PassSource, CHANNEL_COUNT,
};
pub use uniforms::ShadertoyUniforms;
pub use window::RunSummary;
