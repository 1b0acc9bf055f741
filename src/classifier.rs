//! Boundary to the handwriting recognizer.
//!
//! The quiz engine never talks to a classifier. Front ends rasterize the
//! drawing, hand it to a [`Classifier`] and only forward a resolved label.

use crate::config::Theme;
use image::imageops::{self, FilterType};
use image::RgbaImage;
use log::debug;
use std::collections::VecDeque;
use std::sync::Mutex;
use thiserror::Error;

pub const CANONICAL_SIZE: u32 = 360;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ClassificationError {
    #[error("failed to rasterize drawing: {0}")]
    Rasterization(String),
    #[error("failed to perform prediction: {0}")]
    Inference(String),
    #[error("failed to load model: {0}")]
    ModelLoad(String),
    #[error("no prediction results found")]
    NoResult,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub label: String,
    pub confidence: f32,
}

impl Prediction {
    pub fn new(label: impl Into<String>, confidence: f32) -> Self {
        Self {
            label: label.into(),
            confidence,
        }
    }
}

pub trait Classifier {
    fn classify(&self, raster: &Raster) -> Result<Prediction, ClassificationError>;
}

pub use image::Rgba;

pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
pub const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
pub const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

impl From<Theme> for Rgba<u8> {
    fn from(theme: Theme) -> Self {
        match theme {
            Theme::Light => WHITE,
            Theme::Dark => BLACK,
        }
    }
}

/// A rasterized drawing
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    image: RgbaImage,
}

impl Raster {
    pub fn new(width: u32, height: u32, fill: Rgba<u8>) -> Self {
        Self {
            image: RgbaImage::from_pixel(width, height, fill),
        }
    }

    pub fn from_image(image: RgbaImage) -> Self {
        Self { image }
    }

    /// Raw row-major RGBA bytes, four per pixel
    pub fn from_raw(
        width: u32,
        height: u32,
        bytes: Vec<u8>,
    ) -> Result<Self, ClassificationError> {
        let len = bytes.len();
        RgbaImage::from_raw(width, height, bytes)
            .map(Self::from_image)
            .ok_or_else(|| {
                ClassificationError::Rasterization(format!(
                    "{} bytes do not make a {}x{} rgba image",
                    len, width, height
                ))
            })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn as_image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba<u8>> {
        (x < self.width() && y < self.height()).then(|| *self.image.get_pixel(x, y))
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, px: Rgba<u8>) {
        if x < self.width() && y < self.height() {
            self.image.put_pixel(x, y, px);
        }
    }

    /// Scale so the longer side fits `target`, keeping aspect ratio
    pub fn fit_within(&self, target: u32) -> Result<Raster, ClassificationError> {
        let (width, height) = self.image.dimensions();
        if width == 0 || height == 0 || target == 0 {
            return Err(ClassificationError::Rasterization(
                "cannot scale an empty raster".to_string(),
            ));
        }

        let ratio = (target as f64 / width as f64).min(target as f64 / height as f64);
        let new_w = ((width as f64 * ratio).round() as u32).max(1);
        let new_h = ((height as f64 * ratio).round() as u32).max(1);

        let resized = imageops::resize(&self.image, new_w, new_h, FilterType::Triangle);
        Ok(Raster::from_image(resized))
    }

    /// Flatten transparency onto a solid background
    pub fn with_background(&self, bg: Rgba<u8>) -> Raster {
        let mut canvas = RgbaImage::from_pixel(self.width(), self.height(), bg);
        imageops::overlay(&mut canvas, &self.image, 0, 0);
        Raster::from_image(canvas)
    }
}

/// Scale the drawing to the model's square input and fill the background for the theme
pub fn preprocess(
    drawing: &Raster,
    size: u32,
    theme: Theme,
) -> Result<Raster, ClassificationError> {
    let scaled = drawing.fit_within(size)?;
    debug!(
        "preprocessed {}x{} drawing to {}x{}",
        drawing.width(),
        drawing.height(),
        scaled.width(),
        scaled.height()
    );
    Ok(scaled.with_background(theme.into()))
}

pub fn recognize<C: Classifier + ?Sized>(
    classifier: &C,
    drawing: &Raster,
    size: u32,
    theme: Theme,
) -> Result<Prediction, ClassificationError> {
    let raster = preprocess(drawing, size, theme)?;
    classifier.classify(&raster)
}

/// Replays queued outcomes in order; used by tests and the typed-answer front end
#[derive(Debug, Default)]
pub struct ScriptedClassifier {
    outcomes: Mutex<VecDeque<Result<Prediction, ClassificationError>>>,
}

impl ScriptedClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_label(&self, label: impl Into<String>) {
        self.push(Ok(Prediction::new(label, 1.0)));
    }

    pub fn push(&self, outcome: Result<Prediction, ClassificationError>) {
        if let Ok(mut q) = self.outcomes.lock() {
            q.push_back(outcome);
        }
    }
}

impl Classifier for ScriptedClassifier {
    fn classify(&self, _raster: &Raster) -> Result<Prediction, ClassificationError> {
        self.outcomes
            .lock()
            .map_err(|e| ClassificationError::Inference(e.to_string()))?
            .pop_front()
            .unwrap_or(Err(ClassificationError::NoResult))
    }
}
