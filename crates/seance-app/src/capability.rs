//! Hardware-acceleration probe. Requests an adapter on a throwaway instance
//! and rejects CPU device types and known software rasterizers; the caller
//! renders the static fallback branch when this returns false.

use seance_core::capability::renderer_is_software;

pub fn detect() -> bool {
    let instance = wgpu::Instance::default();
    let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
        power_preference: wgpu::PowerPreference::HighPerformance,
        compatible_surface: None,
        force_fallback_adapter: false,
    }));
    match adapter {
        Some(adapter) => {
            let info = adapter.get_info();
            if info.device_type == wgpu::DeviceType::Cpu || renderer_is_software(&info.name) {
                log::warn!("software renderer detected ({}); falling back", info.name);
                false
            } else {
                log::info!("adapter: {} ({:?})", info.name, info.backend);
                true
            }
        }
        None => {
            log::warn!("no GPU adapter available");
            false
        }
    }
}
