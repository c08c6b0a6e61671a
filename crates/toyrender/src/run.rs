use anyhow::{Context, Result};
use renderer::{Canvas, CanvasConfig, ChannelImage};
use shadertoy::{normalize_shader_reference, ShadertoyClient, ShadertoyConfig};
use tracing_subscriber::EnvFilter;

use crate::bindings::pass_source_from_render_pass;
use crate::cli::Cli;

const DEFAULT_LOG_FILTER: &str = "warn,toyrender=info,renderer=info,shadertoy=info,naga=error,wgpu=error,wgpu_core=error,wgpu_hal=error,winit=error";

pub fn initialise_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

pub fn run(cli: Cli) -> Result<()> {
    let shader_id = normalize_shader_reference(&cli.id)
        .with_context(|| format!("invalid shader reference '{}'", cli.id))?;

    let config =
        ShadertoyConfig::new(cli.api_key.as_str()).context("invalid Shadertoy API key configuration")?;
    let client = ShadertoyClient::new(config).context("failed to construct Shadertoy client")?;

    tracing::debug!(id = %shader_id, "fetching shader");
    let descriptor = client
        .fetch(&shader_id)
        .with_context(|| format!("failed to fetch shader '{shader_id}'"))?;
    tracing::info!(
        name = %descriptor.name,
        author = %descriptor.author,
        passes = descriptor.render_passes.len(),
        "fetched shader"
    );
    if !descriptor.description.is_empty() {
        tracing::info!(description = %descriptor.description, "shader description");
    }

    let image_pass = descriptor
        .image_pass()
        .context("shader has no image pass")?;
    if descriptor.render_passes.len() > 1 {
        tracing::debug!(
            ignored = descriptor.render_passes.len() - 1,
            "only the first render pass is rendered"
        );
    }
    let pass = pass_source_from_render_pass(image_pass)?;

    let mut canvas = Canvas::new(CanvasConfig {
        size: cli.size,
        rate: cli.rate,
        duration: cli.duration,
        ..CanvasConfig::default()
    });
    canvas
        .initialize(&pass)
        .context("failed to initialise canvas")?;

    let requests = canvas.texture_requests().to_vec();
    for request in requests {
        let bytes = client
            .fetch_media(&request.src)
            .with_context(|| format!("failed to download texture for channel {}", request.channel))?;
        let image = ChannelImage::decode(request.channel, &bytes)
            .with_context(|| format!("failed to decode {}", request.src))?;
        tracing::info!(
            channel = request.channel,
            src = %request.src,
            width = image.width,
            height = image.height,
            "loaded texture"
        );
        canvas.bind_texture(request.channel, image)?;
    }

    let summary = renderer::window::run(&mut canvas).context("renderer failed")?;
    tracing::debug!(
        ticks = summary.ticks,
        frames = summary.frames,
        elapsed = summary.elapsed,
        "run complete"
    );
    Ok(())
}
