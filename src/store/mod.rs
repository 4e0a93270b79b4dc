//! Store Layer
//!
//! Remote data-access abstractions and implementations.

mod config;
mod local;
mod rest;
mod traits;


pub use config::{configure, load_config, StoreConfig, CONFIG_FILE};
pub use local::{LocalCollection, LocalStore, LocalTitle, LocalUploader};
pub use rest::{connect, RestAuth, RestCollection, RestTitle, RestUploader};
pub use traits::{AuthProvider, Collection, Stores, TitleStore, UploadedObject, Uploader};
