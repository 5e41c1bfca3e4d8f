mod common;
mod generate_tests;
mod get_tests;
mod list_tests;
