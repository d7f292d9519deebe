pub mod config;
pub mod dataset;
pub mod error;
pub mod objective;
pub mod router;
pub mod split;
pub mod splitter;
pub mod summary;
pub mod tree;
pub mod variability;

// Re-export commonly used types at crate root
pub use config::{Covariate, CovariateKind, Direction, SplitterConfig};
pub use dataset::{Dataset, Record, Subset};
pub use error::{IoiError, IoiResult};
pub use objective::{ioi, ioi_scalar};
pub use router::{Router, assign_to_leaf};
pub use split::{BestSplit, SplitRule, find_best_split};
pub use splitter::{IoiSplitter, LeafReport};
pub use summary::{LeafLabel, Summary, SummaryRow, flatten};
pub use tree::{NodeId, Tree, TreeNode};
pub use variability::{between_subject_variability, within_subject_variability};
