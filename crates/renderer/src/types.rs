use std::time::Duration;

use crate::error::CanvasError;

/// ShaderToy exposes four optional input channels (`iChannel0-3`).
pub const CHANNEL_COUNT: usize = 4;

/// Describes what a ShaderToy channel was declared as.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChannelSource {
    Texture { src: String },
    Cubemap { src: String },
    /// Audio input; declared by the shader but never decoded.
    Music { src: String },
    /// Site channel types the canvas has no sampler for (keyboard, webcam, ...).
    Unsupported { kind: String },
}

/// Sampler dimensionality a channel needs in the wrapped fragment shader.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChannelTextureKind {
    Texture2d,
    Cubemap,
}

impl ChannelSource {
    /// `None` for channels that get no sampler declaration.
    pub fn texture_kind(&self) -> Option<ChannelTextureKind> {
        match self {
            Self::Texture { .. } => Some(ChannelTextureKind::Texture2d),
            Self::Cubemap { .. } => Some(ChannelTextureKind::Cubemap),
            Self::Music { .. } | Self::Unsupported { .. } => None,
        }
    }
}

/// Collection of ShaderToy channel declarations for one render pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChannelBindings {
    sources: [Option<ChannelSource>; CHANNEL_COUNT],
}

impl ChannelBindings {
    /// Creates an empty bindings table with all channels unassigned.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares the source of the given channel, rejecting indices past `iChannel3`.
    pub fn set(&mut self, channel: usize, source: ChannelSource) -> Result<(), CanvasError> {
        let slot = self
            .sources
            .get_mut(channel)
            .ok_or(CanvasError::ChannelOutOfRange(channel))?;
        *slot = Some(source);
        Ok(())
    }

    pub fn get(&self, channel: usize) -> Option<&ChannelSource> {
        self.sources.get(channel).and_then(Option::as_ref)
    }

    /// Declared channels in index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &ChannelSource)> {
        self.sources
            .iter()
            .enumerate()
            .filter_map(|(index, source)| source.as_ref().map(|source| (index, source)))
    }
}

/// One fragment pass as handed over by the fetcher: user code plus channels.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PassSource {
    pub code: String,
    pub channels: ChannelBindings,
}

/// Immutable configuration passed to the canvas at start-up.
#[derive(Clone, Debug, PartialEq)]
pub struct CanvasConfig {
    /// Window size in physical pixels.
    pub size: (u32, u32),
    /// Timer rate in ticks per second.
    pub rate: u32,
    /// Stop once the simulated clock reaches this many seconds.
    pub duration: Option<f64>,
    pub title: String,
    pub sample_rate: f32,
}

impl CanvasConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.rate.max(1)))
    }
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            size: (1280, 720),
            rate: 30,
            duration: None,
            title: "ShaderToy Renderer".to_string(),
            sample_rate: 44100.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bindings_reject_fifth_channel() {
        let mut bindings = ChannelBindings::new();
        assert!(bindings
            .set(3, ChannelSource::Texture { src: "a.png".into() })
            .is_ok());
        assert!(matches!(
            bindings.set(4, ChannelSource::Texture { src: "b.png".into() }),
            Err(CanvasError::ChannelOutOfRange(4))
        ));
    }

    #[test]
    fn iterates_declared_channels_in_order() {
        let mut bindings = ChannelBindings::new();
        bindings
            .set(2, ChannelSource::Music { src: "m.mp3".into() })
            .unwrap();
        bindings
            .set(0, ChannelSource::Texture { src: "t.png".into() })
            .unwrap();
        let channels: Vec<usize> = bindings.iter().map(|(index, _)| index).collect();
        assert_eq!(channels, vec![0, 2]);
        assert_eq!(bindings.get(2).and_then(ChannelSource::texture_kind), None);
    }

    #[test]
    fn tick_interval_follows_rate() {
        let config = CanvasConfig {
            rate: 60,
            ..CanvasConfig::default()
        };
        assert_eq!(config.tick_interval(), Duration::from_secs_f64(1.0 / 60.0));
    }
}
