//! WGSL sources for the renderer.
//!
//! Both pipelines share one module and one uniform block. Solid meshes get
//! ambient + Lambert from the emblem's point light; every fragment is then
//! blended toward the fog color by its distance from the camera.

/// Entry points: `vs_main`/`fs_main` for instanced meshes,
/// `vs_line`/`fs_line` for world-space line lists.
pub const SCENE_SHADER: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
    camera_pos: vec4<f32>,
    // xyz = position, w = intensity
    light: vec4<f32>,
    // rgb = color, w = ambient
    light_color: vec4<f32>,
    fog_color: vec4<f32>,
    // x = near, y = far
    fog_range: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

struct MeshInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct InstanceInput {
    @location(2) model_0: vec4<f32>,
    @location(3) model_1: vec4<f32>,
    @location(4) model_2: vec4<f32>,
    @location(5) model_3: vec4<f32>,
    @location(6) color: vec4<f32>,
};

struct MeshOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) color: vec4<f32>,
};

fn apply_fog(color: vec3<f32>, world_pos: vec3<f32>) -> vec3<f32> {
    let dist = distance(world_pos, uniforms.camera_pos.xyz);
    let span = max(uniforms.fog_range.y - uniforms.fog_range.x, 0.0001);
    let f = clamp((dist - uniforms.fog_range.x) / span, 0.0, 1.0);
    return mix(color, uniforms.fog_color.rgb, f);
}

@vertex
fn vs_main(vertex: MeshInput, instance: InstanceInput) -> MeshOutput {
    let model = mat4x4<f32>(
        instance.model_0,
        instance.model_1,
        instance.model_2,
        instance.model_3,
    );
    let world = model * vec4<f32>(vertex.position, 1.0);

    var out: MeshOutput;
    out.clip_position = uniforms.view_proj * world;
    out.world_pos = world.xyz;
    // Instances are uniformly scaled, so the model matrix carries normals
    out.normal = normalize((model * vec4<f32>(vertex.normal, 0.0)).xyz);
    out.color = instance.color;
    return out;
}

@fragment
fn fs_main(in: MeshOutput) -> @location(0) vec4<f32> {
    let to_light = uniforms.light.xyz - in.world_pos;
    let dist = max(length(to_light), 0.0001);
    let lambert = max(dot(normalize(in.normal), to_light / dist), 0.0);
    let attenuation = uniforms.light.w / (1.0 + 0.01 * dist * dist);

    let ambient = uniforms.light_color.w;
    let lit = in.color.rgb * (ambient + lambert * attenuation * uniforms.light_color.rgb);
    return vec4<f32>(apply_fog(lit, in.world_pos), in.color.a);
}

struct LineInput {
    @location(0) position: vec3<f32>,
    @location(1) color: vec4<f32>,
};

struct LineOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) color: vec4<f32>,
};

@vertex
fn vs_line(vertex: LineInput) -> LineOutput {
    var out: LineOutput;
    out.clip_position = uniforms.view_proj * vec4<f32>(vertex.position, 1.0);
    out.world_pos = vertex.position;
    out.color = vertex.color;
    return out;
}

@fragment
fn fs_line(in: LineOutput) -> @location(0) vec4<f32> {
    return vec4<f32>(apply_fog(in.color.rgb, in.world_pos), in.color.a);
}
"#;
