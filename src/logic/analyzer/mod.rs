//! Traffic Analyzer - pipeline orchestrator
//!
//! Encoder → Classifier Adapter → Alert Generator, đúng thứ tự, không
//! song song bên trong một batch. Lỗi ở bất kỳ bước nào hủy cả batch.

use std::sync::Arc;

use uuid::Uuid;

use crate::error::DetectorResult;
use crate::logic::alerts::{AlertGenerator, AlertRecord};
use crate::logic::features::FeatureEncoder;
use crate::logic::model::ClassifierAdapter;
use crate::logic::traffic::TrafficBatch;


/// Entry point for batch analysis; cheap to share behind an `Arc`
#[derive(Debug)]
pub struct TrafficAnalyzer {
    encoder: FeatureEncoder,
    classifier: Arc<ClassifierAdapter>,
    generator: AlertGenerator,
}

impl TrafficAnalyzer {
    pub fn new(classifier: Arc<ClassifierAdapter>) -> Self {
        Self {
            encoder: FeatureEncoder::new(),
            classifier,
            generator: AlertGenerator::new(),
        }
    }

    pub fn classifier(&self) -> &Arc<ClassifierAdapter> {
        &self.classifier
    }

    /// Analyze one batch, returning alerts in packet order.
    ///
    /// Runs on the calling task; large batches belong on `analyze_many`.
    pub async fn analyze_traffic(&self, batch: &TrafficBatch) -> DetectorResult<Vec<AlertRecord>> {
        self.analyze(batch)
    }

    /// Synchronous pipeline body
    pub fn analyze(&self, batch: &TrafficBatch) -> DetectorResult<Vec<AlertRecord>> {
        let batch_id = Uuid::new_v4();
        log::debug!("[{}] analyzing {} packets", batch_id, batch.len());

        let result = self.run_pipeline(batch_id, batch);

        match &result {
            Ok(alerts) => log::info!(
                "[{}] batch done: {} packets, {} alerts", batch_id, batch.len(), alerts.len()
            ),
            Err(e) => log::error!("[{}] batch aborted ({}): {}", batch_id, e.kind(), e),
        }

        result
    }

    fn run_pipeline(&self, batch_id: Uuid, batch: &TrafficBatch) -> DetectorResult<Vec<AlertRecord>> {
        let features = self.encoder.encode(batch)?;
        log::debug!("[{}] encoded feature matrix {:?}", batch_id, features.dim());

        let predictions = self.classifier.predict_proba(&features)?;
        log::debug!("[{}] predictions {:?}", batch_id, predictions.dim());

        self.generator.generate(&predictions, batch)
    }

    /// Analyze several batches on the blocking pool, sharing the model.
    ///
    /// Encoding and inference are CPU-bound, so they never run on the async
    /// workers. Results come back in input order; one failed batch does not
    /// affect the others.
    pub async fn analyze_many(self: &Arc<Self>, batches: Vec<TrafficBatch>) -> Vec<DetectorResult<Vec<AlertRecord>>> {
        let handles: Vec<_> = batches
            .into_iter()
            .map(|batch| {
                let analyzer = Arc::clone(self);
                tokio::task::spawn_blocking(move || analyzer.analyze(&batch))
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for handle in handles {
            results.push(handle.await.unwrap_or_else(|e| Err(e.into())));
        }
        results
    }
}
