//! Simple dumper to inspect indexed user databases.

use std::fs;

use usersdb::{validate_database, FieldFlags, IndexedDb, UserRecord};

fn show(bytes: &[u8]) -> String {
    if bytes.is_empty() {
        "-".to_string()
    } else {
        String::from_utf8_lossy(bytes).into_owned()
    }
}

fn format_record(r: &UserRecord) -> String {
    format!(
        "{} {} name={} nick={} city={} state={} country={}",
        r.id,
        show(&r.callsign),
        show(&r.name),
        show(&r.nickname),
        show(&r.city),
        show(&r.state),
        show(&r.country)
    )
}

fn main() {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "../../data/users.bin".to_string());

    println!("Reading: {}", path);

    let data = fs::read(&path).expect("Failed to read file");
    println!("File size: {} bytes", data.len());

    let db = IndexedDb::open(&data).expect("Failed to open");

    println!("\n=== Header ===");
    println!("Records: {}", db.len());
    println!("Table size: {} bytes", db.total_size());
    println!("Node pool starts at: {}", db.pool_base());

    match validate_database(&data) {
        Ok(summary) => println!(
            "Valid: index {} bytes, pool {} bytes",
            summary.index_bytes, summary.pool_bytes
        ),
        Err(e) => println!("INVALID: {}", e),
    }

    let mut with_flag = [0usize; 5];
    let flags = [
        FieldFlags::NAME,
        FieldFlags::NICKNAME,
        FieldFlags::CITY,
        FieldFlags::STATE,
        FieldFlags::COUNTRY,
    ];
    let mut errors = 0;
    for record in db.records() {
        match record {
            Ok(record) => {
                let present = FieldFlags::for_record(&record);
                for (count, flag) in with_flag.iter_mut().zip(flags) {
                    if present.contains(flag) {
                        *count += 1;
                    }
                }
            }
            Err(_) => errors += 1,
        }
    }

    println!("\n=== Fields present ===");
    println!("  name: {}", with_flag[0]);
    println!("  nickname: {}", with_flag[1]);
    println!("  city: {}", with_flag[2]);
    println!("  state: {}", with_flag[3]);
    println!("  country: {}", with_flag[4]);
    if errors > 0 {
        println!("  undecodable records: {}", errors);
    }

    println!("\n=== First 20 Records ===");
    for (i, record) in db.records().take(20).enumerate() {
        match record {
            Ok(record) => println!("[{}] {}", i, format_record(&record)),
            Err(e) => println!("[{}] error: {}", i, e),
        }
    }
}
