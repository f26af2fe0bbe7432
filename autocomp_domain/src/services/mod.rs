pub mod bytecount;
pub mod decision_tree;

pub use bytecount::bytecount;
pub use decision_tree::DecisionTree;
