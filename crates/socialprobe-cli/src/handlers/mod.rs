//! Command handlers, kept out of main.rs so they can be tested

pub mod config;
pub mod list;
pub mod run;
pub mod serve;
pub mod setup;

pub use config::{execute_config, load_suite_config, render_config};
pub use list::{execute_list, list_lines};
pub use run::execute_run;
pub use serve::{execute_serve, format_server_url, socket_addr};
pub use setup::execute_setup;
