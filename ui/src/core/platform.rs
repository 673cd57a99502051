//! Platform selection: which data source and chart backend the current target uses.

#[cfg(target_arch = "wasm32")]
pub type PlatformSource = crate::data::source::HttpSource;
#[cfg(not(target_arch = "wasm32"))]
pub type PlatformSource = crate::data::source::DirectorySource;

#[cfg(target_arch = "wasm32")]
pub type PlatformBackend = crate::charts::plotly::PlotlyBackend;
#[cfg(not(target_arch = "wasm32"))]
pub type PlatformBackend = crate::charts::memory::MemoryBackend;

/// Build the data source for `data_dir` on the current platform.
pub fn platform_source(data_dir: &str) -> PlatformSource {
    PlatformSource::new(data_dir)
}

/// Run a future on the UI event loop.
pub fn spawn_future<F>(future: F)
where
    F: std::future::Future<Output = ()> + 'static,
{
    #[cfg(target_arch = "wasm32")]
    {
        wasm_bindgen_futures::spawn_local(future);
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        dioxus::prelude::spawn(future);
    }
}

/// Resolves once the chart backend can draw. Natively the in-memory backend
/// is always ready; in the browser this waits for the Plotly script.
pub async fn chart_library_ready() -> Result<(), crate::core::error::ChartError> {
    #[cfg(target_arch = "wasm32")]
    {
        crate::charts::plotly::load_library()
            .await
            .map_err(crate::core::error::ChartError::BackendUnavailable)
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        Ok(())
    }
}
