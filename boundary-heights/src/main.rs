/// Boundary height augmentation command line entry point
use boundary_heights::las_source::LasCloudSource;
use boundary_heights::{pipeline, Boundary, RunConfig};
use std::env;
use std::fs::File;
use std::io::{BufWriter, Write};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    if args.len() != 4 && args.len() != 5 {
        eprintln!(
            "Usage: {} <boundaries.json> <cloud.las|laz> <out.xyz> [config.json]",
            args[0]
        );
        std::process::exit(1);
    }

    let boundaries: Vec<Boundary> = serde_json::from_reader(File::open(&args[1])?)?;
    let config: RunConfig = match args.get(4) {
        Some(path) => serde_json::from_reader(File::open(path)?)?,
        None => RunConfig::default(),
    };

    println!(
        "Resolving {} boundaries against {} (mode: {})",
        boundaries.len(),
        args[2],
        config.mode
    );

    let mut source = LasCloudSource::new(&args[2]);
    let output = pipeline::run(&mut source, &boundaries, &config)?;

    let mut writer = BufWriter::new(File::create(&args[3])?);
    for p in &output.points {
        writeln!(
            writer,
            "{:.3} {:.3} {:.3} {} {} {} {}",
            p.x, p.y, p.z, p.colour.0, p.colour.1, p.colour.2, p.boundary_id
        )?;
    }
    writer.flush()?;

    println!(
        "Wrote {} points to {} (subset size {})",
        output.points.len(),
        args[3],
        output.subset_size
    );
    println!("{}", serde_json::to_string_pretty(&output.summary)?);

    Ok(())
}
