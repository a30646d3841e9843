use clap::Parser;

/// Builds the table of the climbs of a guidebook, with the consensus of the grade poll of every climb.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The JSON file describing the guidebook sources and the outputs.
    /// The paths in this file are relative to its directory.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path, optional) A single input file. Setting this option overrides the sources
    /// that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (default snapshot) The type of the input: snapshot or crag_script.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (file path) The JSON file with the grade polls, when the input is a crag script.
    #[clap(long, value_parser)]
    pub polls: Option<String>,

    /// (file path or 'stdout') Where to write the table of climbs in CSV format. Setting this
    /// option overrides the output file that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path or 'stdout', optional) Where to write the summary of the poll grades, in
    /// JSON format.
    #[clap(long, value_parser)]
    pub summary: Option<String>,

    /// (file path, optional) A reference CSV file. If provided, starchaser will check that the
    /// table of climbs matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (default 3) The grade types to keep. The default keeps the sport climbs only.
    #[clap(long, value_parser)]
    pub grade_type: Option<Vec<u32>>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
