use std::path::PathBuf;

/// Shared application state available to all route handlers via Axum's
/// `State` extractor.
pub struct AppState {
    /// The async Swachh SDK instance. Handles dispatching blocking SDK
    /// operations to a thread pool internally.
    pub sdk: swachh_sdk::AsyncSwachhSdk,

    /// Where dashboard exports are written before being sent back.
    pub export_dir: PathBuf,
}
