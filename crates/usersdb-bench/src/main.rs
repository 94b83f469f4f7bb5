//! Benchmark for the indexed user database using a real linear file.
//!
//! Falls back to a synthetic database when the file is missing.

use std::fs;
use std::hint::black_box;
use std::path::Path;
use std::time::Instant;

use usersdb::{decode_database, encode_database, parse_linear, validate_database, write_linear, IndexedDb};

const COUNTRIES: &[(&str, &[(&str, &[&str])])] = &[
    ("United States", &[
        ("Illinois", &["Springfield", "Chicago", "Peoria"]),
        ("Texas", &["Austin", "Dallas", "Houston", "El Paso"]),
        ("California", &["San Diego", "Fresno", "Sacramento"]),
    ]),
    ("Canada", &[
        ("Ontario", &["Toronto", "Ottawa", "Hamilton"]),
        ("Quebec", &["Montreal", "Quebec City"]),
    ]),
    ("Germany", &[
        ("Bayern", &["Muenchen", "Nuernberg"]),
        ("", &["Berlin", "Hamburg"]),
    ]),
    ("Australia", &[("New South Wales", &["Sydney", "Newcastle"])]),
];

const FIRST_NAMES: &[&str] = &["John", "Jane", "Wayne", "Maria", "Klaus", "Pat", "Li", "Ahmed", "Olga"];
const LAST_NAMES: &[&str] = &["Smith", "Doe", "Holmes", "Garcia", "Becker", "Nguyen", "Khan"];

/// Builds a sorted linear database of `count` users with realistic sharing.
fn synthetic_linear(count: u32) -> Vec<u8> {
    let mut out = Vec::new();
    for i in 0..count {
        let (country, states) = COUNTRIES[i as usize % COUNTRIES.len()];
        let (state, cities) = states[(i as usize / 7) % states.len()];
        let city = cities[(i as usize / 3) % cities.len()];
        let first = FIRST_NAMES[i as usize % FIRST_NAMES.len()];
        let last = LAST_NAMES[(i as usize / 5) % LAST_NAMES.len()];
        let nickname = if i % 4 == 0 { first } else { "" };
        let line = format!(
            "{},K{}{:04X},{} {},{},{},{},{}\n",
            1_000_000 + i * 3,
            i % 10,
            i,
            first,
            last,
            city,
            state,
            nickname,
            country
        );
        out.extend_from_slice(line.as_bytes());
    }
    out
}

fn main() {
    let data_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "../../data/users.csv".to_string());

    let linear = if Path::new(&data_path).exists() {
        println!("Loading users from: {}", data_path);
        fs::read(&data_path).expect("Failed to read linear database")
    } else {
        println!("{} not found, using 200000 synthetic users", data_path);
        synthetic_linear(200_000)
    };
    println!("Linear size: {} bytes", linear.len());

    let parse_start = Instant::now();
    let records = parse_linear(&linear).expect("Failed to parse linear database");
    let parse_time = parse_start.elapsed();
    println!("Parsed {} users in {:?}", records.len(), parse_time);

    // Encoding
    let encode_start = Instant::now();
    let encoded = encode_database(&records).expect("Failed to encode");
    let encode_time = encode_start.elapsed();

    println!("\nIndexed: {} bytes in {:?}", encoded.len(), encode_time);
    println!(
        "  Size vs linear: {:.1}%",
        encoded.len() as f64 * 100.0 / linear.len() as f64
    );
    println!(
        "  Throughput: {:.2} MB/s (linear input)",
        (linear.len() as f64 / 1_000_000.0) / encode_time.as_secs_f64()
    );

    let summary = validate_database(&encoded).expect("Encoded database failed validation");
    println!(
        "  Index: {} bytes, node pool: {} bytes",
        summary.index_bytes, summary.pool_bytes
    );

    // Encoding is deterministic
    let encoded2 = encode_database(&records).expect("Failed to encode");
    assert_eq!(encoded, encoded2, "Encoding should be deterministic");

    // Full decode
    const DECODE_ITERS: u32 = 10;

    for _ in 0..3 {
        let _ = decode_database(&encoded).expect("Failed to decode");
    }

    let decode_start = Instant::now();
    let mut decoded = None;
    for _ in 0..DECODE_ITERS {
        decoded = Some(decode_database(&encoded).expect("Failed to decode"));
    }
    let decode_time = decode_start.elapsed() / DECODE_ITERS;
    let decoded = decoded.expect("at least one decode iteration");

    println!(
        "\nDecode (all records): {:?} (avg of {} iterations)",
        decode_time, DECODE_ITERS
    );
    println!(
        "  Throughput: {:.2} MB/s",
        (encoded.len() as f64 / 1_000_000.0) / decode_time.as_secs_f64()
    );
    assert_eq!(decoded.len(), records.len());

    let mut relinear = Vec::with_capacity(linear.len());
    write_linear(&mut relinear, &decoded).expect("Failed to write linear");
    println!("  Round trip matches input: {}", relinear == linear);

    // Lookups
    let db = IndexedDb::open(&encoded).expect("Failed to open database");
    let lookup_start = Instant::now();
    let mut found = 0usize;
    for record in &records {
        if db.lookup(black_box(record.id)).expect("Lookup failed").is_some() {
            found += 1;
        }
    }
    let lookup_time = lookup_start.elapsed();

    println!(
        "\nLookup: {} of {} IDs in {:?} ({:.0} ns/lookup)",
        found,
        records.len(),
        lookup_time,
        lookup_time.as_nanos() as f64 / records.len().max(1) as f64
    );
}
