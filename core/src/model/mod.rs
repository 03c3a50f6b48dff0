//! Feature extraction and linear scoring of derivations

pub mod classifier;
pub mod features;

pub use classifier::{Classifier, Prediction};
pub use features::{FeatureExtractor, FeatureKey, FeatureVector};
