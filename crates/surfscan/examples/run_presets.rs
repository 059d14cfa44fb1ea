use std::error::Error;
use std::path::Path;
use surfscan::{Detector, PointCloud, PresetPlan, PresetRunner, ScriptedDetector};

fn main() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 4 {
        eprintln!(
            "Usage: {} <cloud.xyz> <responses.json> <presets.json> [out.json]",
            args[0]
        );
        std::process::exit(2);
    }

    let cloud = PointCloud::from_file(Path::new(&args[1]))?;
    let script = ScriptedDetector::from_json_file(Path::new(&args[2]))?;
    let plan = PresetPlan::from_json_file(Path::new(&args[3]))?;

    let detector = Detector::new(script);
    let runner = PresetRunner::new(&detector);
    let report = runner.run_plan(&cloud, &plan)?;

    for batch in &report.batches {
        println!("{}:", batch.kind.title());
        for record in &batch.records {
            println!("  {}", record.label.text);
        }
    }
    println!("Total: {:.2} ms", report.total_ms);

    if let Some(out_path) = args.get(4) {
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(out_path, json)?;
        println!("Wrote {out_path}");
    }
    Ok(())
}
