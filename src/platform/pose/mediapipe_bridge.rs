// MediaPipe integration bridge
// Abstraction over the landmark detection model. The detector is an external
// oracle: it returns 33 normalized body landmarks, or nothing when no body is found.

use crate::models::pose::{DecodedImage, LandmarkSet, PoseConfig, PoseResult};

/// Landmark detector trait
/// Implement this for each detection backend
pub trait LandmarkDetector: Send + Sync {
    /// Load the detection model. Called once at service startup.
    fn new(config: &PoseConfig) -> PoseResult<Self>
    where
        Self: Sized;

    /// Detect body landmarks; `Ok(None)` means no body was found
    fn detect(&self, image: &DecodedImage) -> PoseResult<Option<LandmarkSet>>;

    /// Check if the model is loaded
    fn is_initialized(&self) -> bool;

    /// Get model info
    fn get_model_info(&self) -> String;
}

// ==============================================================================
// PyO3 Implementation (Python MediaPipe)
// ==============================================================================

#[cfg(feature = "ml-pyo3")]
pub mod pyo3_backend {
    use super::*;
    use crate::models::pose::{Landmark, PoseError};
    use pyo3::prelude::*;
    use pyo3::types::{PyBytes, PyDict, PyModule};

    pub struct PyO3MediaPipe {
        // mediapipe.solutions.pose.Pose instance, kept for the life of the service
        pose: Py<PyAny>,
        numpy: Py<PyModule>,
        config: PoseConfig,
    }

    impl LandmarkDetector for PyO3MediaPipe {
        fn new(config: &PoseConfig) -> PoseResult<Self> {
            Python::with_gil(|py| {
                let load = |e: PyErr| PoseError::ModelLoadFailed(e.to_string());

                let numpy = py.import_bound("numpy").map_err(|e| {
                    PoseError::ModelLoadFailed(format!("Failed to import numpy: {}", e))
                })?;

                let mp_pose = py.import_bound("mediapipe.solutions.pose").map_err(|e| {
                    PoseError::ModelLoadFailed(format!(
                        "Failed to import mediapipe: {}. Make sure Python dependencies are installed (pip install mediapipe numpy)",
                        e
                    ))
                })?;

                let kwargs = PyDict::new_bound(py);
                kwargs.set_item("static_image_mode", true).map_err(load)?;
                kwargs
                    .set_item("model_complexity", config.model_complexity as u8)
                    .map_err(load)?;
                kwargs
                    .set_item("min_detection_confidence", config.min_detection_confidence)
                    .map_err(load)?;

                let pose = mp_pose
                    .getattr("Pose")
                    .and_then(|ctor| ctor.call((), Some(&kwargs)))
                    .map_err(load)?;

                log::info!(
                    "PyO3MediaPipe initialized (model_complexity={:?}, min_detection_confidence={})",
                    config.model_complexity,
                    config.min_detection_confidence
                );

                Ok(Self {
                    pose: pose.unbind(),
                    numpy: numpy.unbind(),
                    config: config.clone(),
                })
            })
        }

        fn detect(&self, image: &DecodedImage) -> PoseResult<Option<LandmarkSet>> {
            let expected = image.width as usize * image.height as usize * 3;
            if image.rgb.len() != expected {
                return Err(PoseError::InvalidInput(format!(
                    "RGB buffer has {} bytes, expected {} for {}x{}",
                    image.rgb.len(),
                    expected,
                    image.width,
                    image.height
                )));
            }

            Python::with_gil(|py| {
                let fail = |e: PyErr| PoseError::DetectionFailed(e.to_string());

                // HxWx3 uint8 array, the layout MediaPipe expects for RGB input
                let bytes = PyBytes::new_bound(py, &image.rgb);
                let array = self
                    .numpy
                    .bind(py)
                    .call_method1("frombuffer", (bytes, "uint8"))
                    .and_then(|flat| {
                        flat.call_method1(
                            "reshape",
                            ((image.height as usize, image.width as usize, 3usize),),
                        )
                    })
                    .map_err(fail)?;

                let results = self
                    .pose
                    .bind(py)
                    .call_method1("process", (array,))
                    .map_err(fail)?;

                let pose_landmarks = results.getattr("pose_landmarks").map_err(fail)?;
                if pose_landmarks.is_none() {
                    return Ok(None);
                }

                let mut landmarks = Vec::with_capacity(crate::models::pose::BodyLandmark::COUNT);
                for item in pose_landmarks
                    .getattr("landmark")
                    .and_then(|list| list.iter())
                    .map_err(fail)?
                {
                    let lm = item.map_err(fail)?;
                    let field = |name: &str| -> PoseResult<f64> {
                        lm.getattr(name).and_then(|v| v.extract::<f64>()).map_err(fail)
                    };
                    landmarks.push(Landmark::new(
                        field("x")?,
                        field("y")?,
                        field("z")?,
                        field("visibility")?,
                    ));
                }

                Ok(Some(LandmarkSet::new(landmarks)))
            })
        }

        fn is_initialized(&self) -> bool {
            true
        }

        fn get_model_info(&self) -> String {
            format!(
                "PyO3 MediaPipe Pose (Python backend) - complexity: {:?}, min detection confidence: {}",
                self.config.model_complexity, self.config.min_detection_confidence
            )
        }
    }

    impl Drop for PyO3MediaPipe {
        fn drop(&mut self) {
            Python::with_gil(|py| {
                if let Err(e) = self.pose.bind(py).call_method0("close") {
                    log::warn!("Failed to close MediaPipe pose model: {}", e);
                }
            });
        }
    }
}

// ==============================================================================
// Dummy Implementation (for compilation without features)
// ==============================================================================

#[cfg(not(feature = "ml-pyo3"))]
pub struct DummyMediaPipe {
    config: PoseConfig,
}

#[cfg(not(feature = "ml-pyo3"))]
impl LandmarkDetector for DummyMediaPipe {
    fn new(config: &PoseConfig) -> PoseResult<Self> {
        log::warn!("Using dummy MediaPipe implementation (no inference)");
        log::warn!("Enable the 'ml-pyo3' feature for landmark detection, or pass precomputed landmarks");
        Ok(Self {
            config: config.clone(),
        })
    }

    fn detect(&self, _image: &DecodedImage) -> PoseResult<Option<LandmarkSet>> {
        Ok(None)
    }

    fn is_initialized(&self) -> bool {
        false
    }

    fn get_model_info(&self) -> String {
        format!(
            "Dummy MediaPipe (no ML inference - enable 'ml-pyo3' feature), min visibility {}",
            self.config.min_visibility
        )
    }
}

// ==============================================================================
// Default Backend Selection
// ==============================================================================

#[cfg(feature = "ml-pyo3")]
pub type DefaultMediaPipe = pyo3_backend::PyO3MediaPipe;

#[cfg(not(feature = "ml-pyo3"))]
pub type DefaultMediaPipe = DummyMediaPipe;
