//! WGSL for putting the software-rendered canvas on screen.
//!
//! A single triangle covers the viewport and samples the canvas texture
//! 1:1. The canvas holds sRGB bytes and is uploaded as `Rgba8UnormSrgb`, so
//! sampling yields linear color and the sRGB surface re-encodes it.

/// Fullscreen blit: `vs_main` emits the covering triangle, `fs_main` samples
/// group 0 (texture at binding 0, sampler at binding 1).
pub const PRESENT_SHADER: &str = r#"
struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@group(0) @binding(0)
var canvas: texture_2d<f32>;
@group(0) @binding(1)
var canvas_sampler: sampler;

@vertex
fn vs_main(@builtin(vertex_index) vertex_index: u32) -> VertexOutput {
    var positions = array<vec2<f32>, 3>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>(3.0, -1.0),
        vec2<f32>(-1.0, 3.0),
    );
    var uvs = array<vec2<f32>, 3>(
        vec2<f32>(0.0, 1.0),
        vec2<f32>(2.0, 1.0),
        vec2<f32>(0.0, -1.0),
    );

    var out: VertexOutput;
    out.clip_position = vec4<f32>(positions[vertex_index], 0.0, 1.0);
    out.uv = uvs[vertex_index];
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return vec4<f32>(textureSample(canvas, canvas_sampler, in.uv).rgb, 1.0);
}
"#;
