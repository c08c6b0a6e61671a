use std::borrow::Cow;
use std::fmt::Write as _;

use wgpu::naga::ShaderStage;

use crate::error::CanvasError;
use crate::types::{ChannelTextureKind, CHANNEL_COUNT};

/// Uniform names the header provides; user declarations of them are dropped.
const PROVIDED_UNIFORMS: [&str; 14] = [
    "iResolution",
    "iGlobalTime",
    "iTimeDelta",
    "iTime",
    "iFrame",
    "iMouse",
    "iDate",
    "iSampleRate",
    "iChannelTime",
    "iChannelResolution",
    "iChannel0",
    "iChannel1",
    "iChannel2",
    "iChannel3",
];

/// Compiles the fixed full-screen quad vertex shader.
pub(crate) fn compile_vertex_shader(device: &wgpu::Device) -> Result<wgpu::ShaderModule, CanvasError> {
    compile_checked(device, "toyrender quad vertex", VERTEX_SHADER_GLSL.into(), ShaderStage::Vertex)
}

/// Compiles an already assembled fragment source.
pub(crate) fn compile_fragment_shader(
    device: &wgpu::Device,
    source: &str,
) -> Result<wgpu::ShaderModule, CanvasError> {
    compile_checked(
        device,
        "toyrender fragment",
        Cow::Owned(source.to_owned()),
        ShaderStage::Fragment,
    )
}

fn compile_checked(
    device: &wgpu::Device,
    label: &str,
    source: Cow<'_, str>,
    stage: ShaderStage,
) -> Result<wgpu::ShaderModule, CanvasError> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Glsl {
            shader: source,
            stage,
            defines: &[],
        },
    });
    match pollster::block_on(device.pop_error_scope()) {
        Some(error) => Err(CanvasError::Compile(error.to_string())),
        None => Ok(module),
    }
}

/// Declares one texture/sampler pair per channel that needs a sampler.
///
/// Channel `n` uses bindings `2n` (texture) and `2n + 1` (sampler) in set 1 so
/// the layout built by the pipeline lines up regardless of which channels are
/// present.
pub fn sampler_declarations(kinds: &[Option<ChannelTextureKind>; CHANNEL_COUNT]) -> String {
    let mut out = String::new();
    for (index, kind) in kinds.iter().enumerate() {
        let Some(kind) = kind else { continue };
        let (texture_type, sampler_type) = match kind {
            ChannelTextureKind::Texture2d => ("texture2D", "sampler2D"),
            ChannelTextureKind::Cubemap => ("textureCube", "samplerCube"),
        };
        let texture_binding = index * 2;
        let sampler_binding = texture_binding + 1;
        let _ = writeln!(
            out,
            "layout(set = 1, binding = {texture_binding}) uniform {texture_type} toy_channel{index}_texture;"
        );
        let _ = writeln!(
            out,
            "layout(set = 1, binding = {sampler_binding}) uniform sampler toy_channel{index}_sampler;"
        );
        let _ = writeln!(
            out,
            "#define iChannel{index} {sampler_type}(toy_channel{index}_texture, toy_channel{index}_sampler)"
        );
    }
    out
}

/// Produces a self-contained GLSL 450 fragment shader from site code.
///
/// The result is [`HEADER`], the sampler declarations, the legacy sampling
/// macros, the sanitized user code and [`FOOTER`], which calls `mainImage`.
pub fn assemble_fragment_source(
    user_code: &str,
    kinds: &[Option<ChannelTextureKind>; CHANNEL_COUNT],
) -> String {
    let declarations = sampler_declarations(kinds);
    let sanitized = sanitize_user_code(user_code);
    format!("{HEADER}{declarations}{LEGACY_BUILTINS}\n#line 1\n{sanitized}{FOOTER}")
}

/// Drops `#version` directives and uniform declarations the header already provides.
fn sanitize_user_code(source: &str) -> String {
    let mut sanitized = String::with_capacity(source.len());
    for line in source.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("#version") {
            continue;
        }
        let redeclares_uniform = trimmed.starts_with("uniform ")
            && trimmed
                .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .any(|word| PROVIDED_UNIFORMS.contains(&word));
        if redeclares_uniform {
            continue;
        }
        sanitized.push_str(line);
        sanitized.push('\n');
    }
    sanitized
}

/// GLSL prologue; the block layout must match [`crate::ShadertoyUniforms`].
const HEADER: &str = r"#version 450
layout(location = 0) in vec2 v_uv;
layout(location = 0) out vec4 outColor;

layout(std140, set = 0, binding = 0) uniform ShaderParams {
    vec3 _iResolution;
    float _iGlobalTime;
    vec4 _iMouse;
    vec4 _iDate;
    float _iSampleRate;
    float _iTimeDelta;
    int _iFrame;
    float _padding0;
    float _iChannelTime[4];
    vec3 _iChannelResolution[4];
} ubo;

#define iResolution ubo._iResolution
#define iGlobalTime ubo._iGlobalTime
#define iTime ubo._iGlobalTime
#define iMouse ubo._iMouse
#define iDate ubo._iDate
#define iSampleRate ubo._iSampleRate
#define iTimeDelta ubo._iTimeDelta
#define iFrame ubo._iFrame
#define iChannelTime ubo._iChannelTime
#define iChannelResolution ubo._iChannelResolution

vec4 toy_gl_FragCoord;
#define gl_FragCoord toy_gl_FragCoord

";

/// GLSL ES 1.0 sampling builtins older site shaders still call. Must follow
/// the sampler declarations, which use `texture2D` as a type name.
const LEGACY_BUILTINS: &str = r"#define texture2D texture
#define textureCube texture
";

const FOOTER: &str = r"
void main() {
    #undef gl_FragCoord
    vec2 builtinFC = vec2(gl_FragCoord.x, gl_FragCoord.y);
    #define gl_FragCoord toy_gl_FragCoord

    vec2 fragCoord = vec2(builtinFC.x, iResolution.y - builtinFC.y);
    toy_gl_FragCoord = vec4(fragCoord, 0.0, 1.0);

    vec4 color = vec4(0.0);
    mainImage(color, fragCoord);
    outColor = vec4(color.rgb, 1.0);
}
";

/// Pass-through vertex shader for the two-triangle quad.
const VERTEX_SHADER_GLSL: &str = r"#version 450
layout(location = 0) in vec2 position;
layout(location = 0) out vec2 v_uv;

void main() {
    v_uv = position * 0.5 + vec2(0.5, 0.5);
    gl_Position = vec4(position, 0.0, 1.0);
}
";

#[cfg(test)]
mod tests {
    use super::*;

    const MAIN_IMAGE: &str =
        "void mainImage(out vec4 fragColor, in vec2 fragCoord) { fragColor = vec4(1.0); }";

    #[test]
    fn declares_sampler_per_texture_channel() {
        let kinds = [
            None,
            Some(ChannelTextureKind::Texture2d),
            None,
            Some(ChannelTextureKind::Cubemap),
        ];
        let declarations = sampler_declarations(&kinds);

        assert!(declarations.contains(
            "layout(set = 1, binding = 2) uniform texture2D toy_channel1_texture;"
        ));
        assert!(declarations
            .contains("layout(set = 1, binding = 3) uniform sampler toy_channel1_sampler;"));
        assert!(declarations.contains(
            "#define iChannel1 sampler2D(toy_channel1_texture, toy_channel1_sampler)"
        ));
        assert!(declarations.contains("uniform textureCube toy_channel3_texture;"));
        assert!(declarations.contains("#define iChannel3 samplerCube("));
        assert!(!declarations.contains("iChannel0"));
        assert!(!declarations.contains("iChannel2"));
    }

    #[test]
    fn assembled_source_orders_header_declarations_body_and_main() {
        let kinds = [Some(ChannelTextureKind::Texture2d), None, None, None];
        let source = assemble_fragment_source(MAIN_IMAGE, &kinds);

        let header = source.find("uniform ShaderParams").unwrap();
        let sampler = source.find("#define iChannel0").unwrap();
        let body = source.find("void mainImage").unwrap();
        let entry = source.find("void main()").unwrap();
        assert!(source.starts_with("#version 450"));
        assert!(header < sampler && sampler < body && body < entry);
        assert!(source.contains("mainImage(color, fragCoord);"));
        assert!(source.find("#define texture2D texture").unwrap() > sampler);
        assert!(source.contains("uniform texture2D toy_channel0_texture;"));
    }

    #[test]
    fn strips_version_and_redundant_uniforms() {
        let user = "#version 300 es\nuniform float iGlobalTime;\nuniform vec3 iResolution;\nuniform float speed;\n";
        let source = assemble_fragment_source(&format!("{user}{MAIN_IMAGE}"), &[None; CHANNEL_COUNT]);

        assert!(!source.contains("#version 300 es"));
        assert!(!source.contains("uniform float iGlobalTime;"));
        assert!(!source.contains("uniform vec3 iResolution;"));
        assert!(source.contains("uniform float speed;"));
    }

    #[test]
    fn keeps_uniforms_that_only_share_a_prefix() {
        let user = "uniform float iTimeScale;\nuniform vec4 iMouseTint;\nuniform float iTime;\n";
        let source = assemble_fragment_source(&format!("{user}{MAIN_IMAGE}"), &[None; CHANNEL_COUNT]);

        assert!(source.contains("uniform float iTimeScale;"));
        assert!(source.contains("uniform vec4 iMouseTint;"));
        assert!(!source.contains("uniform float iTime;"));
    }

    fn validate(stage: ShaderStage, source: &str) -> Result<(), String> {
        use wgpu::naga::front::glsl::{Frontend, Options};
        use wgpu::naga::valid::{Capabilities, ValidationFlags, Validator};

        let module = Frontend::default()
            .parse(&Options::from(stage), source)
            .map_err(|err| format!("{err:?}"))?;
        Validator::new(ValidationFlags::all(), Capabilities::all())
            .validate(&module)
            .map_err(|err| format!("{err:?}"))?;
        Ok(())
    }

    #[test]
    fn vertex_shader_validates() {
        validate(ShaderStage::Vertex, VERTEX_SHADER_GLSL).unwrap();
    }

    #[test]
    fn wrapped_shader_with_every_input_validates() {
        let user = r"#version 300 es
uniform vec3 iResolution;
void mainImage(out vec4 fragColor, in vec2 fragCoord) {
    vec2 uv = fragCoord / iResolution.xy;
    float t = iTime + iGlobalTime + iTimeDelta + float(iFrame) + iSampleRate + iChannelTime[0];
    vec4 a = texture2D(iChannel0, uv);
    vec4 b = texture(iChannel2, uv + iMouse.xy / iChannelResolution[2].xy);
    fragColor = a + b + vec4(iDate.w * 0.0 + t * 0.0) + gl_FragCoord * 0.0;
}
";
        // Channel 1 carries music, which declares no sampler.
        let kinds = [
            Some(ChannelTextureKind::Texture2d),
            None,
            Some(ChannelTextureKind::Texture2d),
            None,
        ];
        let source = assemble_fragment_source(user, &kinds);

        if let Err(err) = validate(ShaderStage::Fragment, &source) {
            panic!("wrapped shader rejected: {err}\n{source}");
        }
    }

    #[test]
    fn wrapped_shader_without_channels_validates() {
        let source = assemble_fragment_source(MAIN_IMAGE, &[None; CHANNEL_COUNT]);
        validate(ShaderStage::Fragment, &source).unwrap();
    }

    #[test]
    fn malformed_body_is_rejected() {
        let user = "void mainImage(out vec4 fragColor, in vec2 fragCoord) { fragColor = vec4(undefinedValue); }";
        let source = assemble_fragment_source(user, &[None; CHANNEL_COUNT]);

        assert!(validate(ShaderStage::Fragment, &source).is_err());
    }

    #[test]
    fn music_only_pass_has_no_sampler_bindings() {
        let source = assemble_fragment_source(MAIN_IMAGE, &[None; CHANNEL_COUNT]);
        assert!(!source.contains("set = 1"));
    }
}
