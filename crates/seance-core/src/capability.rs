//! Renderer capability policy. The front-end probes the adapter; this is the
//! pure decision about what counts as a software/emulated renderer.

const SOFTWARE_RENDERERS: &[&str] = &["swiftshader", "llvmpipe", "softpipe", "software"];

/// True when the reported renderer name identifies a software rasterizer.
/// Matching is case-insensitive substring search.
pub fn renderer_is_software(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    SOFTWARE_RENDERERS.iter().any(|s| lower.contains(s))
}
