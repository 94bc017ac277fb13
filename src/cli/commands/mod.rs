mod init;
mod migrate;

pub use init::cmd_init;
pub use migrate::cmd_migrate;
