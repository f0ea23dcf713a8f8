use crate::core::Pipeline;
use crate::utils::error::Result;
use std::time::Instant;

pub struct ArchiveRunner<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> ArchiveRunner<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<String> {
        let started = Instant::now();
        tracing::info!("Starting archive run...");

        let signals = self.pipeline.extract().await?;
        tracing::info!("Extracted {} signals", signals.len());

        let batch = self.pipeline.transform(signals).await?;
        tracing::info!("Stamped {} history entries", batch.entries.len());

        let output_path = self.pipeline.load(batch).await?;
        tracing::info!(
            "History saved to: {} ({:?})",
            output_path,
            started.elapsed()
        );

        Ok(output_path)
    }
}
