//! Normalized shader model handed to the renderer, plus the serde mirrors of
//! the JSON the site returns.
//!
//! The API and the fallback endpoint wrap the shader object differently, but
//! the object itself has the same shape in both, so a single `ShaderPayload`
//! is decoded and converted with [`ShaderPayload::into_descriptor`].

use serde::{Deserialize, Serialize};

use crate::error::FetchError;

/// Shadertoy exposes four input channels (`iChannel0-3`).
pub const MAX_CHANNELS: u8 = 4;

#[derive(Debug, Clone, PartialEq)]
pub struct ShaderDescriptor {
    pub name: String,
    pub description: String,
    pub author: String,
    pub render_passes: Vec<RenderPass>,
}

impl ShaderDescriptor {
    /// The pass that gets rendered. Later passes (sound, buffers) are ignored.
    pub fn image_pass(&self) -> Option<&RenderPass> {
        self.render_passes.first()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderPass {
    pub code: String,
    pub inputs: Vec<ChannelInput>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChannelInput {
    pub channel: u8,
    pub kind: ChannelKind,
    pub src: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelKind {
    Texture,
    Cubemap,
    Music,
    /// Any other site channel type (keyboard, webcam, buffer, ...).
    Unsupported(String),
}

impl ChannelKind {
    pub fn from_ctype(ctype: &str) -> Self {
        match ctype.to_ascii_lowercase().as_str() {
            "texture" => Self::Texture,
            "cubemap" => Self::Cubemap,
            "music" | "musicstream" => Self::Music,
            other => Self::Unsupported(other.to_string()),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub(crate) struct ShaderPayload {
    pub info: ShaderInfo,
    #[serde(rename = "renderpass")]
    pub render_passes: Vec<RenderPassPayload>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub(crate) struct ShaderInfo {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub(crate) struct RenderPassPayload {
    pub code: String,
    #[serde(default)]
    pub inputs: Vec<RenderInputPayload>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub(crate) struct RenderInputPayload {
    #[serde(default)]
    pub channel: u8,
    #[serde(default, alias = "filepath")]
    pub src: Option<String>,
    #[serde(alias = "type")]
    pub ctype: String,
}

impl ShaderPayload {
    pub(crate) fn into_descriptor(self) -> Result<ShaderDescriptor, FetchError> {
        if self.render_passes.is_empty() {
            return Err(FetchError::parse("shader payload contains no render passes"));
        }

        let render_passes = self
            .render_passes
            .into_iter()
            .enumerate()
            .map(|(index, pass)| pass.into_render_pass(index))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ShaderDescriptor {
            name: self.info.name,
            description: self.info.description.unwrap_or_default(),
            author: self.info.username.unwrap_or_default(),
            render_passes,
        })
    }
}

impl RenderPassPayload {
    fn into_render_pass(self, index: usize) -> Result<RenderPass, FetchError> {
        if self.inputs.len() > MAX_CHANNELS as usize {
            return Err(FetchError::parse(format!(
                "render pass {index} declares {} inputs; at most {MAX_CHANNELS} are supported",
                self.inputs.len()
            )));
        }

        let mut inputs: Vec<ChannelInput> = Vec::with_capacity(self.inputs.len());
        for input in self.inputs {
            if input.channel >= MAX_CHANNELS {
                return Err(FetchError::parse(format!(
                    "render pass {index} references channel {} which exceeds supported range",
                    input.channel
                )));
            }
            if inputs.iter().any(|existing| existing.channel == input.channel) {
                return Err(FetchError::parse(format!(
                    "render pass {index} binds channel {} more than once",
                    input.channel
                )));
            }
            inputs.push(ChannelInput {
                channel: input.channel,
                kind: ChannelKind::from_ctype(&input.ctype),
                src: input.src.unwrap_or_default(),
            });
        }

        Ok(RenderPass {
            code: self.code,
            inputs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(json: &str) -> ShaderPayload {
        serde_json::from_str(json).expect("valid payload")
    }

    #[test]
    fn converts_info_and_passes() {
        let descriptor = payload(
            r#"{
                "info": { "name": "Seascape", "description": "waves", "username": "TDM" },
                "renderpass": [
                    {
                        "code": "void mainImage(out vec4 c, in vec2 p) { c = vec4(1.0); }",
                        "inputs": [
                            { "channel": 1, "ctype": "texture", "src": "/presets/tex00.jpg" },
                            { "channel": 0, "ctype": "music", "src": "/presets/mzk00.mp3" }
                        ]
                    },
                    { "code": "vec2 mainSound(float t) { return vec2(0.0); }" }
                ]
            }"#,
        )
        .into_descriptor()
        .unwrap();

        assert_eq!(descriptor.name, "Seascape");
        assert_eq!(descriptor.description, "waves");
        assert_eq!(descriptor.author, "TDM");
        assert_eq!(descriptor.render_passes.len(), 2);

        let image = descriptor.image_pass().unwrap();
        assert_eq!(image.inputs[0].channel, 1);
        assert_eq!(image.inputs[0].kind, ChannelKind::Texture);
        assert_eq!(image.inputs[0].src, "/presets/tex00.jpg");
        assert_eq!(image.inputs[1].kind, ChannelKind::Music);
    }

    #[test]
    fn accepts_current_api_field_names() {
        let descriptor = payload(
            r#"{
                "info": { "name": "New" },
                "renderpass": [
                    {
                        "code": "",
                        "inputs": [{ "channel": 2, "type": "cubemap", "filepath": "/media/a/cube.png" }]
                    }
                ]
            }"#,
        )
        .into_descriptor()
        .unwrap();

        let input = &descriptor.render_passes[0].inputs[0];
        assert_eq!(input.kind, ChannelKind::Cubemap);
        assert_eq!(input.src, "/media/a/cube.png");
        assert_eq!(descriptor.description, "");
        assert_eq!(descriptor.author, "");
    }

    #[test]
    fn rejects_out_of_range_channel() {
        let err = payload(
            r#"{
                "info": { "name": "x" },
                "renderpass": [{ "code": "", "inputs": [{ "channel": 4, "ctype": "texture" }] }]
            }"#,
        )
        .into_descriptor()
        .unwrap_err();
        assert!(matches!(err, FetchError::Parse(message) if message.contains("channel 4")));
    }

    #[test]
    fn rejects_duplicate_channel() {
        let err = payload(
            r#"{
                "info": { "name": "x" },
                "renderpass": [{ "code": "", "inputs": [
                    { "channel": 0, "ctype": "texture" },
                    { "channel": 0, "ctype": "texture" }
                ] }]
            }"#,
        )
        .into_descriptor()
        .unwrap_err();
        assert!(matches!(err, FetchError::Parse(_)));
    }

    #[test]
    fn rejects_empty_pass_list() {
        let err = payload(r#"{ "info": { "name": "x" }, "renderpass": [] }"#)
            .into_descriptor()
            .unwrap_err();
        assert!(matches!(err, FetchError::Parse(_)));
    }

    #[test]
    fn unknown_ctype_is_carried_through() {
        assert_eq!(
            ChannelKind::from_ctype("Keyboard"),
            ChannelKind::Unsupported("keyboard".into())
        );
        assert_eq!(ChannelKind::from_ctype("musicstream"), ChannelKind::Music);
    }
}
