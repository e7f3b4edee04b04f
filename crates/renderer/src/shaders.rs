//! First-party GLSL sources for the backdrop layers.
//!
//! Every fragment shares the `LayerParams` block, which must stay in sync
//! with `LayerUniforms` in `uniforms.rs`. The block is all-vec4 so std140
//! introduces no hidden padding between the CPU mirror and the GPU view.

use crate::types::LayerKind;

/// Uniform block plus the noise helpers most layers lean on.
const PRELUDE: &str = r"#version 450
layout(location = 0) in vec2 v_uv;
layout(location = 0) out vec4 outColor;

layout(std140, set = 0, binding = 0) uniform LayerParams {
    vec4 _resolution; // width, height, aspect, unused
    vec4 _color_a;    // rgb = stop 0, a = layer opacity
    vec4 _color_b;    // rgb = stop 1
    vec4 _color_c;    // rgb = stop 2
    vec4 _pointer;    // xy = smoothed pointer (0..1, bottom-left), z = hover, w = pressed
    vec4 _motion;     // x = time, y = delta, z = frequency, w = warp strength
    vec4 _shape;      // x = scale, y = pointer influence, z = parallax, w = grain
    vec4 _overlay;    // x = expansion, y = flash, z = tint, w = fade
    vec4 _sparkle[24];
} params;

#define u_resolution params._resolution
#define u_color_a params._color_a
#define u_color_b params._color_b
#define u_color_c params._color_c
#define u_pointer params._pointer
#define u_motion params._motion
#define u_shape params._shape
#define u_overlay params._overlay
#define u_sparkle params._sparkle

float hash21(vec2 st) {
    return fract(sin(dot(st, vec2(12.9898, 78.233))) * 43758.5453123);
}

vec3 permute3(vec3 x) {
    return mod(((x * 34.0) + 1.0) * x, 289.0);
}

float snoise(vec2 v) {
    const vec4 C = vec4(0.211324865405187, 0.366025403784439,
                        -0.577350269189626, 0.024390243902439);
    vec2 i = floor(v + dot(v, C.yy));
    vec2 x0 = v - i + dot(i, C.xx);
    vec2 i1 = (x0.x > x0.y) ? vec2(1.0, 0.0) : vec2(0.0, 1.0);
    vec4 x12 = x0.xyxy + C.xxzz;
    x12.xy -= i1;
    i = mod(i, 289.0);
    vec3 p = permute3(permute3(i.y + vec3(0.0, i1.y, 1.0)) + i.x + vec3(0.0, i1.x, 1.0));
    vec3 m = max(0.5 - vec3(dot(x0, x0), dot(x12.xy, x12.xy), dot(x12.zw, x12.zw)), 0.0);
    m = m * m;
    m = m * m;
    vec3 x = 2.0 * fract(p * C.www) - 1.0;
    vec3 h = abs(x) - 0.5;
    vec3 ox = floor(x + 0.5);
    vec3 a0 = x - ox;
    m *= 1.79284291400159 - 0.85373472095314 * (a0 * a0 + h * h);
    vec3 g;
    g.x = a0.x * x0.x + h.x * x0.y;
    g.yz = a0.yz * x12.xz + h.yz * x12.yw;
    return 130.0 * dot(m, g);
}
";

/// Flowing warped gradient filling the whole window.
const FIELD_BODY: &str = r"void main() {
    vec2 uv = v_uv;
    float t = u_motion.x * 0.2;
    vec2 p = (uv - u_pointer.xy * u_shape.z) * u_motion.z * u_shape.x;

    p.x += sin(p.y + t) * u_motion.w * 0.5;
    p.y += cos(p.x + t) * u_motion.w * 0.5;

    vec2 towards = uv - u_pointer.xy;
    float well = length(towards) * u_shape.y;
    p += towards * (1.0 - smoothstep(0.0, 0.8, well)) * 0.2;

    float pattern = sin(p.x * 2.0 + p.y * 3.0 + t);
    pattern += cos(p.y * 2.5 - p.x * 1.5 + t * 1.2);

    vec3 color = mix(u_color_a.rgb, u_color_b.rgb, clamp(pattern, 0.0, 1.0));
    color = mix(color, u_color_c.rgb, clamp(pattern - 1.0, 0.0, 1.0));
    color += hash21(uv + fract(u_motion.x)) * u_shape.w;

    outColor = vec4(color, u_color_a.a);
}
";

/// Vertical light pillar with noise-driven turbulence.
const AURORA_BODY: &str = r"void main() {
    vec2 uv = v_uv;
    float t = u_motion.x;

    float flow = snoise(vec2(uv.x * 2.0, uv.y * 0.5 - t));
    float lift = snoise(vec2(uv.x * 3.0, uv.y * 2.0 + t * 0.5)) * u_motion.w;

    float pillar = 1.0 - abs(uv.x - 0.5) * 2.0;
    pillar = pow(max(pillar, 0.0), 2.0);
    pillar += snoise(vec2(uv.x * 10.0, uv.y * 10.0 + t)) * 0.1 * pillar;
    pillar = smoothstep(0.1, 0.9, pillar);

    vec3 color = mix(u_color_a.rgb, u_color_b.rgb, clamp(uv.y + lift, 0.0, 1.0));
    color = mix(color, u_color_c.rgb, pillar * (0.5 + 0.5 * flow));

    outColor = vec4(color, pillar * u_color_a.a);
}
";

/// Soft glow points from the scatter table, each pulsing on its own phase.
const SPARKLES_BODY: &str = r"void main() {
    vec2 uv = v_uv;
    float aspect = u_resolution.z;
    float t = u_motion.x;
    vec3 accum = vec3(0.0);

    for (int i = 0; i < 24; i++) {
        vec4 s = u_sparkle[i];
        vec2 towards = (uv - s.xy) * vec2(aspect, 1.0);
        float pulse = 0.5 + 0.5 * sin(t + s.w);
        float radius = s.z * u_shape.x * (0.8 + 0.4 * pulse);
        float glow = exp(-dot(towards, towards) / max(radius * radius, 1e-5));
        vec3 tint = (mod(float(i), 2.0) < 1.0) ? u_color_a.rgb : u_color_b.rgb;
        accum += tint * glow * pulse;
        accum += u_color_c.rgb * glow * glow * pulse * 0.6;
    }

    float alpha = clamp(max(accum.r, max(accum.g, accum.b)), 0.0, 1.0) * u_color_a.a;
    outColor = vec4(accum, alpha);
}
";

/// Analytic sphere with a pointer-driven light and a hover-boosted rim.
const ORB_BODY: &str = r"void main() {
    vec2 uv = v_uv * 2.0 - 1.0;
    uv.x *= u_resolution.z;

    float radius = 0.6 * u_shape.x;
    float dist = length(uv);
    float body = smoothstep(radius, radius - 0.02, dist);
    if (body < 0.001) {
        discard;
    }

    vec2 q = uv / radius;
    float z = sqrt(max(0.0, 1.0 - dot(q, q)));
    vec3 normal = normalize(vec3(q, z));

    vec2 toward_pointer = u_pointer.xy - vec2(0.5);
    vec3 light_dir = normalize(vec3(toward_pointer * 2.0, 1.0));
    float diffuse = max(dot(normal, light_dir), 0.0);

    float fresnel = pow(1.0 - dot(normal, vec3(0.0, 0.0, 1.0)), 4.0);

    float n1 = snoise(vec2(normal.x * 1.5 + u_motion.x * 0.3, normal.y * 1.5 + u_motion.x * 0.2));
    float n2 = snoise(vec2(normal.y * 1.5 - u_motion.x * 0.2, normal.z * 1.5 + u_motion.x * 0.1));
    float shimmer = (n1 + n2) * 0.25 + 0.5;

    float hover = u_pointer.z;
    vec3 base = mix(u_color_a.rgb, u_color_b.rgb, shimmer);
    base = mix(base, u_color_c.rgb, fresnel * (0.5 + 0.5 * hover));

    vec3 color = base * (diffuse * 0.3 + 0.05) + base * fresnel * (2.5 + 3.0 * hover);
    float alpha = body * (0.9 + 0.1 * hover) * u_color_a.a;

    outColor = vec4(color, alpha);
}
";

/// Expanding cover disc plus the white flash, both driven by the overlay
/// uniform the coordinator samples each frame.
const OVERLAY_BODY: &str = r"void main() {
    vec2 uv = v_uv * 2.0 - 1.0;
    uv.x *= u_resolution.z;

    vec3 cover = mix(vec3(0.02), vec3(1.0), u_overlay.z);
    float reach = u_overlay.x * (u_resolution.z + 1.5);
    float disc = 1.0 - smoothstep(reach - 0.6, reach + 0.2, length(uv));
    float fade = u_overlay.w;

    float flash = u_overlay.y * fade;
    vec3 color = mix(cover, vec3(1.0), flash);
    float alpha = max(disc * fade, flash);

    outColor = vec4(color, alpha);
}
";

pub(crate) fn layer_fragment(kind: LayerKind) -> String {
    let body = match kind {
        LayerKind::Field => FIELD_BODY,
        LayerKind::Aurora => AURORA_BODY,
        LayerKind::Sparkles => SPARKLES_BODY,
        LayerKind::Orb => ORB_BODY,
    };
    format!("{PRELUDE}\n{body}")
}

pub(crate) fn overlay_fragment() -> String {
    format!("{PRELUDE}\n{OVERLAY_BODY}")
}
