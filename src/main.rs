use colored::Colorize;

use ezpantherlog::cli;

fn main() {
    let command_line_interface = cli::CommandLineInterface::load();
    if let Err(error) = command_line_interface.run() {
        eprintln!("\n{} {error:#}", "error:".red().bold());
        std::process::exit(1);
    }
}
