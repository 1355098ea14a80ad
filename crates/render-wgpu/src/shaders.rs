/// WGSL program for the reactive surface: pointer falloff in the vertex stage,
/// gold metal/roughness shading in the fragment stage.
pub const SURFACE_SHADER: &str = r#"
struct Camera {
    view_proj: mat4x4<f32>,
};

struct SurfaceUniforms {
    model: mat4x4<f32>,
    light_position: vec3<f32>,
    time: f32,
    pointer: vec2<f32>,
    metalness: f32,
    roughness: f32,
    threshold: f32,
    push: f32,
    tint_faces: u32,
    _pad: u32,
};

@group(0) @binding(0)
var<uniform> camera: Camera;

@group(1) @binding(0)
var<uniform> surface: SurfaceUniforms;

const AMBIENT: f32 = 0.1;
const BASE_COLOR: vec3<f32> = vec3<f32>(1.0, 0.843, 0.0);
const BASE_REFLECTANCE: f32 = 0.04;

struct SurfaceInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) color: vec3<f32>,
    @location(3) displacement: vec3<f32>,
};

struct SurfaceOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) normal: vec3<f32>,
    @location(1) color: vec3<f32>,
    @location(2) light_position: vec3<f32>,
};

@vertex
fn vs_surface(in: SurfaceInput) -> SurfaceOutput {
    // smoothstep(threshold, 0, d) with ascending edges.
    let distance_to_pointer = distance(in.position.xy, surface.pointer);
    let proximity = 1.0 - smoothstep(0.0, surface.threshold, distance_to_pointer);
    let displaced = in.position + in.normal * (surface.push * proximity);

    var out: SurfaceOutput;
    out.clip_position = camera.view_proj * surface.model * vec4<f32>(displaced, 1.0);
    out.normal = in.normal;
    out.color = in.color;
    out.light_position = surface.light_position;
    return out;
}

@fragment
fn fs_surface(in: SurfaceOutput) -> @location(0) vec4<f32> {
    var base = BASE_COLOR;
    if surface.tint_faces != 0u {
        base = base * in.color;
    }

    let light = normalize(in.light_position);
    let directional = max(dot(in.normal, light), 0.0);

    let reflectance = mix(vec3<f32>(BASE_REFLECTANCE), base, surface.metalness);
    let diffuse = (1.0 - surface.metalness) * base;
    let specular = reflectance * pow(directional, (1.0 - surface.roughness) * 128.0);

    let color = AMBIENT * base + (diffuse + specular) * directional;
    return vec4<f32>(color, 1.0);
}
"#;

/// WGSL program for the head sub-meshes, lit by their glTF material factors.
pub const HEAD_SHADER: &str = r#"
struct Camera {
    view_proj: mat4x4<f32>,
};

struct HeadUniforms {
    model: mat4x4<f32>,
    base_color: vec4<f32>,
    // x: metallic, y: roughness
    material: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> camera: Camera;

@group(1) @binding(0)
var<uniform> part: HeadUniforms;

struct HeadInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct HeadOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_normal: vec3<f32>,
};

@vertex
fn vs_head(in: HeadInput) -> HeadOutput {
    let world_pos = part.model * vec4<f32>(in.position, 1.0);

    var out: HeadOutput;
    out.clip_position = camera.view_proj * world_pos;
    out.world_normal = normalize((part.model * vec4<f32>(in.normal, 0.0)).xyz);
    return out;
}

@fragment
fn fs_head(in: HeadOutput) -> @location(0) vec4<f32> {
    let light_dir = normalize(vec3<f32>(1.0, 1.0, 2.0));
    let metallic = part.material.x;
    let roughness = part.material.y;

    let diffuse = max(dot(normalize(in.world_normal), light_dir), 0.0);
    let shine = pow(diffuse, mix(8.0, 64.0, 1.0 - roughness)) * mix(0.04, 1.0, metallic);
    let lighting = 0.3 + diffuse * 0.7 * (1.0 - 0.5 * metallic);
    return vec4<f32>(part.base_color.rgb * lighting + vec3<f32>(shine), part.base_color.a);
}
"#;
