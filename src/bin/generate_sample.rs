use std::sync::Arc;

use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

const ATTRACTION_TYPES: [&str; 5] = [
    "Beaches",
    "Historic Sites",
    "Museums",
    "Nature & Wildlife Areas",
    "Water Parks",
];

/// Visit modes with relative weights.
const VISIT_MODES: [(&str, f64); 5] = [
    ("Couples", 0.35),
    ("Family", 0.30),
    ("Friends", 0.20),
    ("Solo", 0.10),
    ("Business", 0.05),
];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform integer in `lo..=hi`.
    fn range(&mut self, lo: i64, hi: i64) -> i64 {
        lo + (self.next_u64() % (hi - lo + 1) as u64) as i64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    fn weighted<'a>(&mut self, choices: &[(&'a str, f64)]) -> &'a str {
        let total: f64 = choices.iter().map(|(_, w)| w).sum();
        let mut pick = self.next_f64() * total;
        for &(name, weight) in choices {
            if pick < weight {
                return name;
            }
            pick -= weight;
        }
        choices[choices.len() - 1].0
    }
}

/// One attraction: where it is, what it is, and how good it tends to be.
struct Attraction {
    id: i64,
    city_id: i64,
    attraction_type: &'static str,
    quality: f64,
}

struct Visit {
    year: i64,
    month: i64,
    city_id: i64,
    attraction_type: &'static str,
    attraction_id: i64,
    rating: f64,
    visit_mode: &'static str,
}

fn main() {
    env_logger::init();
    let mut rng = SimpleRng::new(42);

    let attractions: Vec<Attraction> = (0..40)
        .map(|i| Attraction {
            id: 100 + i,
            city_id: rng.range(1, 8),
            attraction_type: ATTRACTION_TYPES[(i as usize) % ATTRACTION_TYPES.len()],
            quality: rng.gauss(3.8, 0.6),
        })
        .collect();

    let mut visits = Vec::new();
    for _ in 0..3000 {
        let attraction = &attractions[rng.range(0, attractions.len() as i64 - 1) as usize];
        let rating = rng
            .gauss(attraction.quality, 0.8)
            .round()
            .clamp(1.0, 5.0);
        visits.push(Visit {
            year: rng.range(2019, 2023),
            month: rng.range(1, 12),
            city_id: attraction.city_id,
            attraction_type: attraction.attraction_type,
            attraction_id: attraction.id,
            rating,
            visit_mode: rng.weighted(&VISIT_MODES),
        });
    }

    // Write CSV
    let csv_path = "final_dataset.csv";
    let mut writer = csv::Writer::from_path(csv_path).expect("Failed to create CSV file");
    writer
        .write_record([
            "VisitYear",
            "VisitMonth",
            "CityId",
            "AttractionType",
            "AttractionId",
            "Rating",
            "VisitMode",
        ])
        .expect("Failed to write CSV header");
    for v in &visits {
        writer
            .write_record([
                v.year.to_string(),
                v.month.to_string(),
                v.city_id.to_string(),
                v.attraction_type.to_string(),
                v.attraction_id.to_string(),
                v.rating.to_string(),
                v.visit_mode.to_string(),
            ])
            .expect("Failed to write CSV row");
    }
    writer.flush().expect("Failed to flush CSV file");

    // Build Arrow arrays
    let schema = Arc::new(Schema::new(vec![
        Field::new("VisitYear", DataType::Int64, false),
        Field::new("VisitMonth", DataType::Int64, false),
        Field::new("CityId", DataType::Int64, false),
        Field::new("AttractionType", DataType::Utf8, false),
        Field::new("AttractionId", DataType::Int64, false),
        Field::new("Rating", DataType::Float64, false),
        Field::new("VisitMode", DataType::Utf8, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int64Array::from_iter_values(visits.iter().map(|v| v.year))),
            Arc::new(Int64Array::from_iter_values(visits.iter().map(|v| v.month))),
            Arc::new(Int64Array::from_iter_values(visits.iter().map(|v| v.city_id))),
            Arc::new(StringArray::from_iter_values(visits.iter().map(|v| v.attraction_type))),
            Arc::new(Int64Array::from_iter_values(visits.iter().map(|v| v.attraction_id))),
            Arc::new(Float64Array::from_iter_values(visits.iter().map(|v| v.rating))),
            Arc::new(StringArray::from_iter_values(visits.iter().map(|v| v.visit_mode))),
        ],
    )
    .expect("Failed to create RecordBatch");

    // Write Parquet
    let parquet_path = "final_dataset.parquet";
    let file = std::fs::File::create(parquet_path).expect("Failed to create output file");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("Failed to create writer");
    writer.write(&batch).expect("Failed to write batch");
    writer.close().expect("Failed to close writer");

    log::info!("Wrote {} visits to {csv_path} and {parquet_path}", visits.len());
    println!(
        "Wrote {} visits ({} attractions) to {csv_path} and {parquet_path}",
        visits.len(),
        attractions.len()
    );
}
