// Record sources: the monitoring backend and local dataset files

pub mod dataset_file;
pub mod map_api;

pub use dataset_file::DatasetFile;
pub use map_api::MapApiClient;
