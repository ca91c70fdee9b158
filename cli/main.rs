use clap::Parser;
use ignition_curve_cli_lib::Cli;

#[allow(clippy::print_stdout)]
fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let res = cli.run()?;
    println!("{res}");
    Ok(())
}
