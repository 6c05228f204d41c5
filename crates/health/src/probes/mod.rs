mod certificate;
mod config;
mod database;
mod filesystem;
mod http;
mod memory;
mod process;

pub use certificate::CertificateProbe;
pub use config::ConfigProbe;
pub use database::DatabaseProbe;
pub use filesystem::FilesystemProbe;
pub use http::HttpProbe;
pub use memory::MemoryProbe;
pub use process::ProcessProbe;
