use std::f64::consts::PI;
use std::str::FromStr;
use vctfile::{FeatureClass, FieldSpec, FieldType, GeometryKind, Value, VctFeature, VctFile};
use wkt::Wkt;

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("write_vct failed: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args()
        .nth(1)
        .ok_or("Usage: write_vct <output.vct>")?;

    let fields = vec![
        FieldSpec::new("name", FieldType::Varchar).with_length(40, -1),
        FieldSpec::new("region", FieldType::Varchar).with_length(20, -1),
        FieldSpec::new("center_x", FieldType::Double).with_length(12, 3),
        FieldSpec::new("center_y", FieldType::Double).with_length(12, 3),
        FieldSpec::new("points", FieldType::Int),
    ];
    let mut vct = VctFile::create(
        path,
        FeatureClass::new("9001", "Stars", GeometryKind::Polygon, "STARS"),
        fields,
    )?;

    let mut features = Vec::new();
    for (name, region, center, outer, inner) in [
        ("Beijing Star", "Beijing", (116.391, 39.907), 1.4, 0.6),
        ("Shanghai Star", "Shanghai", (121.473, 31.230), 2.2, 0.9),
    ] {
        let star = star_polygon_wkt(center.0, center.1, outer, inner, 5)?;
        features.push(VctFeature::new(
            star,
            [
                Value::from(name),
                Value::from(region),
                Value::from(center.0),
                Value::from(center.1),
                Value::from(5_i64),
            ],
        )?);
    }

    let outcome = vct.add_features(features)?;
    for message in &outcome.errors {
        eprintln!("rejected: {message}");
    }
    println!("wrote features {:?}", outcome.added_ids);

    Ok(())
}

fn star_polygon_wkt(
    center_x: f64,
    center_y: f64,
    outer_radius: f64,
    inner_radius: f64,
    points: usize,
) -> Result<Wkt<f64>, Box<dyn std::error::Error>> {
    let mut coords = Vec::with_capacity(points * 2 + 1);
    let total_vertices = points * 2;
    let start_angle = -PI / 2.0;

    for i in 0..total_vertices {
        let radius = if i % 2 == 0 {
            outer_radius
        } else {
            inner_radius
        };
        let angle = start_angle + (i as f64) * (2.0 * PI / total_vertices as f64);
        coords.push((
            center_x + radius * angle.cos(),
            center_y + radius * angle.sin(),
        ));
    }

    if let Some(first) = coords.first().copied() {
        coords.push(first);
    }

    let ring: Vec<String> = coords.iter().map(|(x, y)| format!("{x} {y}")).collect();
    let wkt = format!("POLYGON (({}))", ring.join(", "));
    Ok(Wkt::from_str(&wkt)?)
}
