pub mod config_gen;
pub mod token;
pub mod workspace;

pub use config_gen::config_generate;
pub use token::create_token;
pub use workspace::create_workspace;
