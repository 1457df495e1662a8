//! Engine components, leaves first.
//!
//! - Features: normalized indicator series the classifier measures distance on
//! - Filters: boolean gates over the candle window
//! - Kernel: Nadaraya-Watson regression curves and their trend booleans
//! - Labels: historical ground truth
//! - Classifier: approximate nearest neighbors in Lorentzian space
//!
//! Every component is computed once per settings/candle window. The pipeline
//! tail-aligns their outputs before the state machine reads them.

pub mod classifier;
pub mod feature;
pub mod filter;
pub mod indicator;
pub mod kernel;
pub mod labels;

pub use classifier::{classify, classify_all, classify_range, lorentzian_distance, Neighbors};
pub use feature::{build_features, feature_lookback, feature_series, Feature};
pub use filter::{filter_lookback, CandleFilter, Filter};
pub use indicator::{FeatureArrays, Indicator};
pub use kernel::{gaussian, kernel_lookback, rational_quadratic, KernelSignals};
pub use labels::{check_completeness, generate_labels};
