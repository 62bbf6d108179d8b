use fcs_rs::{BufferedRangeReader, FcsIndex, FileRangeReader, Result};

fn main() -> Result<()> {
    let fcs_file = std::env::args().nth(1).unwrap_or_else(|| "sample.fcs".to_string());
    let index_file = format!("{fcs_file}.index.json");

    println!("=== Index Operations Example ===");

    // Step 1: Index the file (header, TEXT and ANALYSIS only; DATA is untouched)
    let index = FcsIndex::from_file(&fcs_file)?;
    index.save_to_file(&index_file)?;
    println!("Index for '{}' saved to '{}'", index.name, index_file);

    for warning in &index.warnings {
        println!("  layout warning: {warning:?}");
    }

    // Step 2: Load the index later and list channels
    let loaded = FcsIndex::load_from_file(&index_file)?;
    println!("\nAvailable channels:");
    for (n, channel) in loaded.channels.iter() {
        println!("  P{n}: {} {:?}", channel.pnn, channel.pns);
    }

    // Step 3: Read one channel through a buffered reader
    let mut reader = BufferedRangeReader::new(&fcs_file)?;
    if let Some((first, channel)) = loaded.channels.iter().next() {
        match loaded.read_channel_values(first, &mut reader)? {
            Some(values) => {
                println!("\nValues of {}:", channel.pnn);
                for (i, value) in values.iter().enumerate().take(10) {
                    println!("  Event {i}: {value}");
                }
                if values.len() > 10 {
                    println!("  ... and {} more events", values.len() - 10);
                }
            }
            None => println!("\n{} could not be decoded", channel.pnn),
        }
    }

    // Step 4: Decode everything with an unbuffered reader and report warnings
    let mut reader = FileRangeReader::new(&fcs_file)?;
    let (events, warnings) = loaded.read_events(&mut reader)?;
    println!(
        "\nDecoded {} values, {} warnings",
        events.map(|e| e.len()).unwrap_or(0),
        warnings.len()
    );

    std::fs::remove_file(&index_file)?;
    Ok(())
}
