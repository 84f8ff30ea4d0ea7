pub mod http_classifier;
pub mod lexicon_classifier;

pub use http_classifier::HttpClassifier;
pub use lexicon_classifier::LexiconClassifier;
