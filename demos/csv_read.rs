//! CSV Reader Examples
//!
//! Demonstrates various CSV reading capabilities:
//! - Reading a CSV file record by record
//! - Reading with headers
//! - Quoted fields spanning physical lines
//! - Observing parser state after a run

use csvstream::CsvReader;
use std::error::Error;
use std::io::Write;

fn main() -> Result<(), Box<dyn Error>> {
    println!("=== CSV Reader Examples ===\n");

    let mut file = tempfile::NamedTempFile::new()?;
    file.write_all(
        b"name,age,motto\n\
          Alice,30,\"Measure twice, cut once\"\n\
          Bob,25,\"He said \"\"why not\"\"\"\n\
          Carol,41,\"first line\nsecond line\"\n",
    )?;
    file.flush()?;

    // Example 1: Read every record
    println!("1. Reading all records...");
    {
        let mut reader = CsvReader::open(file.path())?;
        for (i, record_result) in reader.records().enumerate() {
            let record = record_result?;
            println!("   Record {}: {:?}", i + 1, record);
        }
        println!("   Total records read: {}", reader.record_count());
    }

    // Example 2: Read with headers
    println!("\n2. Reading with headers...");
    {
        let mut reader = CsvReader::open(file.path())?.has_header(true);
        for record_result in reader.records() {
            let record = record_result?;
            println!("   {:?}", record);
        }
        if let Some(headers) = reader.headers() {
            println!("   Headers were: {:?}", headers);
        }
        println!(
            "   Fields per record: {}",
            reader.fields_per_record().unwrap_or(0)
        );
    }

    println!("\nDone.");
    Ok(())
}
