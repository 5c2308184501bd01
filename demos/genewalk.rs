use std::process;
use std::time::SystemTime;

use genewalk::parser;
use genewalk::{GeneSelection, GeneWalk, GeneWalkConfig, GeneWalkError};

const USAGE: &str = "Usage: genewalk [--mouse] [--alpha <FDR>] <NODES> <EDGES> <NULL> <GENES> <OUTPUT> <EMBEDDING>...";

struct Arguments {
    mouse: bool,
    alpha_fdr: f64,
    files: Vec<String>,
}

fn parse_args() -> Arguments {
    let mut args = std::env::args().skip(1);
    let mut arguments = Arguments {
        mouse: false,
        alpha_fdr: 1.0,
        files: Vec::new(),
    };
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--mouse" => arguments.mouse = true,
            "--alpha" => {
                arguments.alpha_fdr = args
                    .next()
                    .and_then(|alpha| alpha.parse().ok())
                    .expect("--alpha requires a number");
            }
            _ => arguments.files.push(arg),
        }
    }
    if arguments.files.len() < 6 {
        println!("{USAGE}");
        process::exit(1)
    }
    arguments
}

fn run(args: &Arguments) -> Result<(), GeneWalkError> {
    let network = parser::load_network(&args.files[0], &args.files[1])?;
    let null = parser::load_null_distribution(&args.files[2])?;
    let genes = if args.mouse {
        GeneSelection::Mouse(parser::load_orthologs(&args.files[3])?)
    } else {
        GeneSelection::Human(parser::load_genes(&args.files[3])?)
    };
    let replicates = args.files[5..]
        .iter()
        .map(parser::load_embedding)
        .collect::<Result<Vec<_>, _>>()?;

    let config = GeneWalkConfig::default()
        .with_replicates(replicates.len())
        .with_alpha_fdr(args.alpha_fdr);
    let genewalk = GeneWalk::new(network, null, config)?;

    let table = genewalk.generate_output(&genes, &replicates)?;
    table.to_csv(&args.files[4])?;
    println!("{} GO annotations written to {}", table.len(), args.files[4]);
    Ok(())
}

fn main() {
    simple_logger::SimpleLogger::new().env().init().unwrap();
    let args = parse_args();

    let start = SystemTime::now();
    if let Err(err) = run(&args) {
        eprintln!("{err}");
        process::exit(1)
    }
    let end = SystemTime::now();
    let duration = end.duration_since(start).unwrap();
    println!("Finished in {} ms", duration.as_millis());
}
