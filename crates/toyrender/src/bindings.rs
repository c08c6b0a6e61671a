use anyhow::{Context, Result};
use renderer::{ChannelBindings, ChannelSource, PassSource};
use shadertoy::{ChannelKind, RenderPass};

/// Maps the fetched image pass onto the renderer's channel model.
pub fn pass_source_from_render_pass(pass: &RenderPass) -> Result<PassSource> {
    let mut channels = ChannelBindings::new();
    for input in &pass.inputs {
        let source = match &input.kind {
            ChannelKind::Texture => ChannelSource::Texture {
                src: input.src.clone(),
            },
            ChannelKind::Cubemap => ChannelSource::Cubemap {
                src: input.src.clone(),
            },
            ChannelKind::Music => ChannelSource::Music {
                src: input.src.clone(),
            },
            ChannelKind::Unsupported(kind) => ChannelSource::Unsupported { kind: kind.clone() },
        };
        channels
            .set(usize::from(input.channel), source)
            .with_context(|| format!("failed to register channel {}", input.channel))?;
    }

    Ok(PassSource {
        code: pass.code.clone(),
        channels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use shadertoy::ChannelInput;

    #[test]
    fn maps_each_channel_kind() {
        let pass = RenderPass {
            code: "void mainImage(out vec4 c, in vec2 p) {}".into(),
            inputs: vec![
                ChannelInput {
                    channel: 0,
                    kind: ChannelKind::Texture,
                    src: "/media/a/tex.png".into(),
                },
                ChannelInput {
                    channel: 2,
                    kind: ChannelKind::Music,
                    src: "/media/a/song.mp3".into(),
                },
                ChannelInput {
                    channel: 3,
                    kind: ChannelKind::Unsupported("keyboard".into()),
                    src: String::new(),
                },
            ],
        };

        let source = pass_source_from_render_pass(&pass).unwrap();
        assert_eq!(source.code, pass.code);
        assert_eq!(
            source.channels.get(0),
            Some(&ChannelSource::Texture {
                src: "/media/a/tex.png".into()
            })
        );
        assert_eq!(source.channels.get(1), None);
        assert_eq!(
            source.channels.get(2),
            Some(&ChannelSource::Music {
                src: "/media/a/song.mp3".into()
            })
        );
        assert_eq!(
            source.channels.get(3),
            Some(&ChannelSource::Unsupported {
                kind: "keyboard".into()
            })
        );
    }
}
