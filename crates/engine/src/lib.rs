//! SFCore AI Engine - text generation backends for the chat front ends
//!
//! This crate talks to a llama.cpp `llama-server` over HTTP and keeps a
//! caller-owned cache of engines keyed by model name.

mod cache;
mod llama_server;
pub use cache::{EngineCache, EngineFactory};
pub use llama_server::{EngineError, EngineOptions, LlamaServerEngine};

// Metrics module for observability
pub mod metrics {
    use serde::Serialize;
    use sysinfo::System;

    /// Process and host memory, in MB
    #[derive(Debug, Clone, Copy, Default, Serialize)]
    pub struct RuntimeMetrics {
        pub process_rss_mb: f64,
        pub total_mem_mb: f64,
    }

    impl RuntimeMetrics {
        /// Blocking: reads procfs/sysctl. Call from `spawn_blocking` on a runtime.
        pub fn capture() -> Self {
            let mut sys = System::new();
            sys.refresh_memory();
            let pid = sysinfo::get_current_pid().ok();
            if let Some(pid) = pid {
                sys.refresh_process(pid);
            }
            let rss_bytes = pid.and_then(|pid| sys.process(pid)).map(|p| p.memory()).unwrap_or(0);
            Self {
                process_rss_mb: to_mb(rss_bytes),
                total_mem_mb: to_mb(sys.total_memory()),
            }
        }
    }

    fn to_mb(bytes: u64) -> f64 {
        (bytes as f64) / (1024.0 * 1024.0)
    }

}
