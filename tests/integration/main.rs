
mod cli_commands;
mod history;
mod staging;
