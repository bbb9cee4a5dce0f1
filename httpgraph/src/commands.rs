use crate::CLAP_STYLING;
use clap::{arg, command};

const SIZE_MODES: [&str; 3] = ["default", "visited", "visited-log"];

/// Flags shared by every subcommand that builds a graph
fn graph_args(cmd: clap::Command) -> clap::Command {
    cmd.arg(
        arg!(--"ip")
            .required(false)
            .help("Add a node per server IP address, linked from its host")
            .action(clap::ArgAction::SetTrue),
    )
    .arg(
        arg!(--"params")
            .required(false)
            .help("Add a node per query string, linked from its resource")
            .action(clap::ArgAction::SetTrue),
    )
    .arg(
        arg!(-s --"settings" <PATH>)
            .required(false)
            .help("JSON file of layout settings (scalingRatio, gravity, slowDown, ...)"),
    )
    .arg(
        arg!(--"size-mode" <MODE>)
            .required(false)
            .help("How node sizes are derived")
            .value_parser(SIZE_MODES)
            .default_value("default"),
    )
    .arg(
        arg!(--"no-worker")
            .required(false)
            .help("Run the layout on the main thread instead of a background task")
            .action(clap::ArgAction::SetTrue),
    )
}

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("httpgraph")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("httpgraph")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .arg(
            arg!(-v --"verbose" "Enable debug logging (RUST_LOG takes precedence)")
                .required(false)
                .global(true),
        )
        .subcommand_required(false)
        .subcommand(graph_args(
            command!("build")
                .about("Build a graph from a file of newline-delimited JSON records and lay it out")
                .arg(
                    arg!(-i --"input" <FILE>)
                        .required(true)
                        .help("Path to the records file"),
                )
                .arg(
                    arg!(-n --"iterations" <BATCHES>)
                        .required(false)
                        .help("Number of layout batches to run")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("100"),
                )
                .arg(
                    arg!(--"arrange" <LAYOUT>)
                        .required(false)
                        .help("Final arrangement: force-directed, or a static circle or hierarchy")
                        .value_parser(["force", "circular", "hierarchical"])
                        .default_value("force"),
                ),
        ))
        .subcommand(graph_args(
            command!("live")
                .about("Read records from stdin and keep the graph and layout running until EOF"),
        ))
}
