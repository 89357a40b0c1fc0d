//! GPU offload selection for local model runtimes.
//!
//! A single optional flag decides between CPU-only inference (`0` layers) and
//! offloading every layer (`-1`).

/// Environment variable consulted by [`layer_count_from_env`].
pub const USE_GPU_ENV: &str = "CYBERGUARD_USE_GPU";

/// Offload every layer to the GPU.
pub const ALL_LAYERS: i32 = -1;

/// Keep inference on the CPU.
pub const CPU_ONLY: i32 = 0;

/// Map an optional on/off flag to a GPU layer count.
///
/// `"1"`, `"true"` and `"yes"` (any case) select [`ALL_LAYERS`]; anything else,
/// including an absent or empty flag, selects [`CPU_ONLY`].
pub fn choose_layer_count(flag: Option<&str>) -> i32 {
    match flag {
        Some(f) if ["1", "true", "yes"].iter().any(|t| f.eq_ignore_ascii_case(t)) => ALL_LAYERS,
        _ => CPU_ONLY,
    }
}

/// Read [`USE_GPU_ENV`] and map it through [`choose_layer_count`].
pub fn layer_count_from_env() -> i32 {
    choose_layer_count(std::env::var(USE_GPU_ENV).ok().as_deref())
}

/// Serializes tests that mutate process environment variables.
#[cfg(test)]
pub(crate) static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
