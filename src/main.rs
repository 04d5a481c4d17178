mod cmd;
mod core;

use clap::{Parser, Subcommand};
use cmd::{
    html_report::HtmlCommand, schema::SchemaCommand, summary::SummaryCommand,
    validate::ValidateCommand,
};

#[derive(Parser, Debug)]
#[command(name = "millrate")]
#[command(author, version, about = "Property tax mill rate calculator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write the interactive rate tool page
    Html(HtmlCommand),
    /// Per-sector burdens, totals and the revenue verdict
    Summary(SummaryCommand),
    /// Report scenario issues, exiting 1 when any are found
    Validate(ValidateCommand),
    /// Print the scenario input formats
    Schema(SchemaCommand),
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let cli = Cli::parse();
    log::debug!("{:?}", cli.command);

    match cli.command {
        Command::Html(html) => html.exec(),
        Command::Summary(summary) => summary.exec(),
        Command::Validate(validate) => validate.exec(),
        Command::Schema(schema) => schema.exec(),
    }
}
