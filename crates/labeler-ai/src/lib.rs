pub mod labels;
pub mod lexicon;
pub mod normalizer;
pub mod payload;
pub mod pipeline;

pub use labels::{AlignmentError, MergeError, canonicalize, merge};
pub use lexicon::{Lexicon, LexiconError};
pub use normalizer::{Normalizer, attach_cleaned};
pub use pipeline::{Pipeline, PipelineError};
