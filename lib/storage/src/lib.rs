pub mod config;
pub mod error;
pub mod export;
pub mod feature_store;

pub use config::{Configuration, Goal};
pub use error::{Result, StorageError};
pub use export::{
    format_value, publish_predictions, read_cluster_labels, vsm_file_name, write_matrix_csv,
    write_names, write_sizes,
};
pub use feature_store::{FeatureStore, FragmentFile};
