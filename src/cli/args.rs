// src/cli/args.rs
use clap::Parser;

#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true)] // Handlers receive their arguments without the command name
pub struct MakeConsoleArgs {
    /// The command(s) to create, e.g. "sync:users" or "foo,bar:baz". Asked for if missing.
    pub command_name: Option<String>,

    /// Skip the confirmation prompt.
    #[arg(long, short)]
    pub yes: bool,
}

#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true)]
pub struct MakeServiceArgs {
    /// The service(s) to create, e.g. "Mailer" or "Billing/Invoice". Asked for if missing.
    pub service_name: Option<String>,

    /// Skip the confirmation prompt.
    #[arg(long, short)]
    pub yes: bool,
}

#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true)]
pub struct ServicesSortArgs {
    /// The generator token to anchor on. Defaults to the configured one.
    #[arg(long)]
    pub token: Option<String>,
}

#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true)]
pub struct ListArgs {
    /// Print the command list as JSON.
    #[arg(long)]
    pub json: bool,
}
