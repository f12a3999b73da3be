pub mod observability;
pub mod filesystem;

// Re-export commonly used observability items for convenience
pub use observability::{
    ProviderError,
    ProviderResult,
    ResultExt,
    log_success,
    log_warning,
    log_error,
    log_step,
};

// Re-export commonly used helper functions
pub use filesystem::{
    remove_files_best_effort,
    resolve_manifest_path,
};
