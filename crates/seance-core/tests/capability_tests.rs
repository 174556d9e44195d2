// Software-renderer policy used by the front-end's adapter probe.

use seance_core::capability::renderer_is_software;

#[test]
fn known_software_rasterizers_are_rejected() {
    assert!(renderer_is_software("llvmpipe (LLVM 15.0.7, 256 bits)"));
    assert!(renderer_is_software("SwiftShader Device (Subzero)"));
    assert!(renderer_is_software("Microsoft Basic Render Driver (software)"));
    assert!(renderer_is_software("softpipe"));
}

#[test]
fn hardware_renderers_pass() {
    assert!(!renderer_is_software("NVIDIA GeForce RTX 3060"));
    assert!(!renderer_is_software("AMD Radeon RX 6800 XT"));
    assert!(!renderer_is_software("Intel(R) UHD Graphics 630"));
    assert!(!renderer_is_software("Apple M2"));
    assert!(!renderer_is_software(""));
}
