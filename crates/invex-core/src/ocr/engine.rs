//! OCR engine backed by `pure-onnx-ocr` (pure Rust, no external ONNX Runtime).

use std::sync::Arc;
use std::time::Instant;

use image::{DynamicImage, GenericImageView};
use tracing::{debug, info, warn};

use crate::error::OcrError;
use crate::models::config::{ExtractorConfig, ModelConfig, OcrConfig};

use super::worker::OcrWorker;
use super::{DocumentOcr, OcrLine, PageImageOcr, TextRecognizer, mean_confidence, sort_by_reading_order};

/// PaddleOCR detection + recognition through `pure-onnx-ocr`.
///
/// The engine itself lives on a dedicated thread; this handle is shared.
pub struct PureOcrEngine {
    worker: OcrWorker,
    config: OcrConfig,
}

impl PureOcrEngine {
    /// Load the models named in `models`.
    pub fn from_models(models: &ModelConfig, config: OcrConfig) -> Result<Self, OcrError> {
        let [det_path, rec_path, dict_path] = models.files();

        for path in [&det_path, &rec_path, &dict_path] {
            if !path.exists() {
                return Err(OcrError::ModelsNotFound {
                    dir: models.model_dir.clone(),
                    file: path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default(),
                });
            }
        }

        if config.use_gpu {
            warn!("GPU acceleration requested, but pure-onnx-ocr runs on the CPU");
        }

        let keep_unk = config.keep_unk;
        let worker = OcrWorker::spawn("invex-ocr", move || {
            let engine = pure_onnx_ocr::engine::OcrEngineBuilder::new()
                .det_model_path(&det_path)
                .rec_model_path(&rec_path)
                .dictionary_path(&dict_path)
                .build()
                .map_err(|e| OcrError::ModelLoad(format!("pure-onnx-ocr: {}", e)))?;

            Ok(move |image: &DynamicImage| -> Result<Vec<OcrLine>, OcrError> {
                let results = engine
                    .run_from_image(image)
                    .map_err(|e| OcrError::Recognition(format!("pure-onnx-ocr: {}", e)))?;

                debug!("pure-onnx-ocr returned {} text regions", results.len());

                Ok(results
                    .iter()
                    .map(|r| {
                        let text = if keep_unk {
                            r.text.clone()
                        } else {
                            r.text.replace("[UNK]", " ")
                        };
                        OcrLine {
                            text: text.trim().to_string(),
                            confidence: r.confidence,
                            bbox: polygon_to_bbox(&r.bounding_box),
                            angle: 0,
                        }
                    })
                    .filter(|line| !line.text.is_empty())
                    .collect())
            })
        })?;

        info!("Loaded pure-onnx-ocr engine from {}", models.model_dir.display());

        Ok(Self { worker, config })
    }

    fn run(&self, image: DynamicImage, angle: i32) -> Result<Vec<OcrLine>, OcrError> {
        let mut lines = self.worker.recognize(image)?;
        for line in &mut lines {
            line.angle = angle;
        }
        sort_by_reading_order(&mut lines);
        Ok(lines)
    }
}

impl TextRecognizer for PureOcrEngine {
    fn recognize(&self, image: &DynamicImage) -> Result<Vec<OcrLine>, OcrError> {
        let start = Instant::now();
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(OcrError::InvalidImage(format!("{}x{}", width, height)));
        }

        debug!("Processing image: {}x{}", width, height);

        let mut lines = self.run(image.clone(), 0)?;

        // Upside-down scans come back as low-confidence noise
        if self.config.angle_classification
            && mean_confidence(&lines) < self.config.orientation_retry_confidence
        {
            let rotated = self.run(image.rotate180(), 180)?;
            if mean_confidence(&rotated) > mean_confidence(&lines) {
                debug!("Page reads better rotated 180 degrees");
                lines = rotated;
            }
        }

        debug!(
            "OCR complete: {} lines in {}ms",
            lines.len(),
            start.elapsed().as_millis()
        );

        Ok(lines)
    }

    fn name(&self) -> &str {
        "pure-onnx-ocr"
    }
}

/// Build the document OCR stage described by `config`.
pub fn load_document_ocr(config: &ExtractorConfig) -> Result<Arc<dyn DocumentOcr>, OcrError> {
    let engine = PureOcrEngine::from_models(&config.models, config.ocr.clone())?;
    Ok(Arc::new(
        PageImageOcr::new(engine)
            .with_max_pages(config.pdf.max_pages)
            .with_min_confidence(config.ocr.min_line_confidence),
    ))
}

/// Convert a `Polygon<f64>` to our `[f32; 8]` bbox format.
///
/// Extracts the first 4 exterior points (quadrilateral) as
/// `[x1, y1, x2, y2, x3, y3, x4, y4]`.
fn polygon_to_bbox(polygon: &pure_onnx_ocr::Polygon<f64>) -> [f32; 8] {
    let mut bbox = [0.0f32; 8];
    for (i, coord) in polygon.exterior().coords().take(4).enumerate() {
        bbox[i * 2] = coord.x as f32;
        bbox[i * 2 + 1] = coord.y as f32;
    }
    bbox
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_engine_is_shareable() {
        assert_send_sync::<PureOcrEngine>();
        assert_send_sync::<PageImageOcr<PureOcrEngine>>();
    }

    #[test]
    fn test_missing_models_reported() {
        let dir = tempfile::tempdir().unwrap();
        let models = ModelConfig {
            model_dir: dir.path().to_path_buf(),
            ..ModelConfig::default()
        };

        let err = PureOcrEngine::from_models(&models, OcrConfig::default()).err().unwrap();
        match err {
            OcrError::ModelsNotFound { dir: missing_dir, file } => {
                assert_eq!(missing_dir, dir.path());
                assert_eq!(file, "det.onnx");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_document_ocr_without_models() {
        let mut config = ExtractorConfig::default();
        config.models.model_dir = PathBuf::from("/nonexistent/invex-models");
        assert!(matches!(
            load_document_ocr(&config),
            Err(OcrError::ModelsNotFound { .. })
        ));
    }
}
