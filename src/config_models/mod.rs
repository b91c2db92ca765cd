pub mod cli_args;
pub mod migration_configuration;
