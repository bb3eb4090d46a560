use vctfile::{Value, VctFile};
use wkt::to_wkt::write_geometry;

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("read_vct failed: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args()
        .nth(1)
        .ok_or("Usage: read_vct <path-to-vct>")?;
    let vct = VctFile::open_read_only(path)?;

    let class = vct.feature_class();
    println!(
        "feature class: {} ({}), {} features, table {}",
        class.type_name,
        class.geometry_kind,
        vct.feature_count(),
        class.attribute_table_name
    );
    match vct.crs() {
        Some(crs) => println!("crs: {crs}"),
        None => println!("crs: unknown"),
    }
    let extent = vct.extent();
    if !extent.is_empty() {
        println!(
            "extent: {},{} - {},{}",
            extent.min_x, extent.min_y, extent.max_x, extent.max_y
        );
    }

    for feature in vct.features() {
        let mut values = Vec::with_capacity(vct.fields().len() + 1);
        let mut wkt = String::new();
        match feature.geometry() {
            Some(geometry) => write_geometry(&mut wkt, &geometry.to_geo())?,
            None => wkt.push_str("EMPTY"),
        }
        values.push(format!("geometry={wkt}"));

        for (field, value) in vct.fields().iter().zip(feature.attributes()) {
            values.push(format!("{}={}", field.name, format_value(value)));
        }

        println!("  feature {}: {}", feature.id(), values.join(", "));
    }

    Ok(())
}

fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        other => other.to_string(),
    }
}
