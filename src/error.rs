//! Error types for the swarm engine.
//!
//! Configuration problems are reported once, when the engine is built. The
//! per-frame path never fails on its own; the only runtime errors come from
//! the GPU surface and the host window.

use thiserror::Error;

/// Errors raised while validating a [`SwarmConfig`](crate::config::SwarmConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Particle count must be at least one.
    #[error("particle count must be positive, got {0}")]
    NonPositiveCount(usize),

    /// Group split ratio outside `[0, 1]`.
    #[error("group split ratio must lie in [0, 1], got {0}")]
    SplitRatio(f32),

    /// A group's radius range is empty or negative.
    #[error("{group} radius range is invalid: [{min}, {max})")]
    RadiusRange {
        group: &'static str,
        min: f32,
        max: f32,
    },

    /// A group's size range is empty or negative.
    #[error("{group} size range is invalid: [{min}, {max})")]
    SizeRange {
        group: &'static str,
        min: f32,
        max: f32,
    },

    /// A palette does not have an entry for every color key the policy can produce.
    #[error("{group} palette needs {expected} shades, found {actual}")]
    Palette {
        group: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A modulo stride of zero would divide by zero in the motion policy.
    #[error("{group} {field} must be non-zero")]
    ZeroStride {
        group: &'static str,
        field: &'static str,
    },

    /// The data-stream period must be positive.
    #[error("{group} stream period must be positive, got {value}")]
    StreamPeriod { group: &'static str, value: f32 },

    /// Stream travel is a sign, not a speed.
    #[error("{group} stream direction must be 1 or -1, got {value}")]
    StreamDirection { group: &'static str, value: f32 },

    /// A placement parameter is NaN or infinite.
    #[error("{group} {field} must be finite")]
    NonFinite {
        group: &'static str,
        field: &'static str,
    },

    /// Grid period must be positive for the scroll wrap to be defined.
    #[error("grid period must be positive, got {0}")]
    GridPeriod(f32),

    /// Failed to parse a TOML configuration.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// Failed to read a configuration file.
    #[error("failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur during GPU initialization.
#[derive(Debug, Error)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    #[error("failed to create GPU surface: {0}")]
    SurfaceCreation(#[from] wgpu::CreateSurfaceError),

    /// No compatible GPU adapter found.
    #[error("no compatible GPU adapter found; a GPU with WebGPU/Vulkan/Metal/DX12 support is required")]
    NoAdapter,

    /// Failed to create GPU device.
    #[error("failed to create GPU device: {0}")]
    DeviceCreation(#[from] wgpu::RequestDeviceError),
}

/// Errors that can occur while mounting or running the engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The configuration was rejected.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// GPU initialization failed.
    #[error("GPU error: {0}")]
    Gpu(#[from] GpuError),

    /// Failed to create event loop.
    #[error("failed to create event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    /// Failed to create window.
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    /// The surface could not produce a frame and cannot recover.
    #[error("surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),
}
