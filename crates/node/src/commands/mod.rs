mod health;
mod install;
mod start;
mod uninstall;

pub use health::health;
pub use install::install;
pub use start::start;
pub use uninstall::uninstall;
