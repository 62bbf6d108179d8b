use fcs_rs::{Fcs, Result};

fn main() -> Result<()> {
    // 1) Decode the file: header, keywords, events and channels in one pass
    let path = std::env::args().nth(1).unwrap_or_else(|| "sample.fcs".to_string());
    let fcs = Fcs::from_file(&path)?;

    println!("File          : {}", fcs.name());
    println!("FCS version   : {}", fcs.header().version);
    println!("Size          : {} bytes", fcs.file_size());
    println!("Cytometer     : {}", fcs.text().cytometer().unwrap_or("<none>"));
    println!("Date          : {}", fcs.text().date().unwrap_or("<none>"));
    println!(
        "Layout        : {:?}, {:?} byte order",
        fcs.layout().datatype,
        fcs.layout().byte_order
    );
    println!(
        "Events        : {} x {} channels",
        fcs.event_count(),
        fcs.channel_count()
    );

    for warning in fcs.warnings() {
        println!("Warning       : {warning:?}");
    }
    println!();

    // 2) Walk the channel directory
    println!("Channels:");
    for (n, channel) in fcs.channels().iter() {
        print!("  P{n} {}", channel.pnn);
        if let Some(short) = &channel.pns {
            print!(" ({short})");
        }
        println!();

        // 3) Gather the channel's column
        match fcs.channel_values(n) {
            Some(values) => {
                println!("    first 5 = {:?}", &values[..5.min(values.len())]);
                println!(
                    "    last 5  = {:?}",
                    &values[values.len().saturating_sub(5)..]
                );
            }
            None => println!("    <not decoded>"),
        }
    }

    // 4) Compensation matrix, if the instrument wrote one
    if let Some(spill) = fcs.text().spillover()? {
        println!();
        println!("Spillover ({} channels):", spill.channels.len());
        for (row, name) in spill.channels.iter().enumerate() {
            let coefficients: Vec<f64> = (0..spill.channels.len())
                .filter_map(|col| spill.value(row, col))
                .collect();
            println!("  {name:>10} {coefficients:?}");
        }
    }

    Ok(())
}
