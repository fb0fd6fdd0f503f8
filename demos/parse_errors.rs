//! Quoting Rules and Error Reporting
//!
//! Demonstrates in-memory parsing:
//! - The double-quote escaping rules
//! - Position-aware parse errors
//! - Reusing one parser across streams with reset()

use csvstream::CsvParser;
use std::error::Error;

fn show(parser: &mut CsvParser, input: &str) {
    println!("   input: {:?}", input);
    for record_result in parser.parse(input.as_bytes()) {
        match record_result {
            Ok(record) => println!("   record: {:?}", record),
            Err(e) => println!("   error: {}", e),
        }
    }
    parser.reset().expect("reset");
}

fn main() -> Result<(), Box<dyn Error>> {
    let mut parser = CsvParser::new()?;

    println!("=== Quoting rules ===\n");
    show(&mut parser, "a,\"b,c\",d\n");
    show(&mut parser, "a,\"He said \"\"hi\"\"\",c\n");
    show(&mut parser, "a,\"line1\nline2\",c\n");
    show(&mut parser, "a,\"\",c\n");

    println!("\n=== Errors are fatal and position-aware ===\n");
    show(&mut parser, "ab\"cd\n");
    show(&mut parser, "a,\"bc\n");
    show(&mut parser, "a,\"b\"x\n");
    show(&mut parser, "a,b\nc,d,e\n");

    Ok(())
}
