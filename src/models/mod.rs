//! Classifier families and the servable artifact.
//!
//! Models are plain serializable structs so the artifact can embed them
//! directly and the fitting code can stay generic over the family.

pub mod forest;
pub mod logistic;
pub mod model;
pub mod scaler;
pub mod tree;

pub use forest::RandomForest;
pub use logistic::LogisticRegression;
pub use model::*;
pub use scaler::StandardScaler;
pub use tree::DecisionTree;
