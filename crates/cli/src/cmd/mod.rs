mod generate;
mod get;
mod list;

pub use generate::cmd_generate;
pub use get::cmd_get;
pub use list::cmd_list;
