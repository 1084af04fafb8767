use std::env;

use gdal_processor::{config, LayerRegistry, Processor};

fn run() -> gdal_processor::Result<()> {
    config::set_log_error_handler();

    let path = env::args()
        .nth(1)
        .unwrap_or_else(|| "fixtures/test_data.geojson".to_string());

    let mut registry = LayerRegistry::new();
    let mut processor = Processor::new(&mut registry);

    let layer = processor.load_layer(&path)?;
    let filtered = processor.filter_features(&layer, "population > 1000")?;
    println!("Filtered features: {}", filtered.len());

    let buffered = processor.create_buffer_layer(&filtered, 1000.0)?;
    println!(
        "Created '{}' with {} features",
        buffered.name(),
        buffered.feature_count()
    );

    config::remove_error_handler();
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
