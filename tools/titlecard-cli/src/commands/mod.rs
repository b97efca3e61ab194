pub mod check;
pub mod init_config;
pub mod render;
pub mod serve;
