mod common;

use common::{init_tracing, int16_builder};
use fcs_rs::{
    BufferedRangeReader, Error, EventData, Fcs, FcsIndex, FileRangeReader, Result, Warning,
};
use std::io::Cursor;

fn sample() -> Vec<u8> {
    int16_builder(&["FSC-A", "SSC-A"], 4, &[10, 20, 11, 21, 12, 22, 13, 23])
        .keyword("$P2S", "Side")
        .analysis_keyword("$GATE", "R1")
        .build()
}

#[test]
fn index_matches_full_decode() -> Result<()> {
    init_tracing();
    let bytes = sample();
    let fcs = Fcs::from_bytes(bytes.clone())?;

    let mut reader = FileRangeReader::from_handle(Cursor::new(bytes));
    let index = FcsIndex::from_reader(&mut reader, Some("sample.fcs"), 0)?;

    assert_eq!(index.name, "sample.fcs");
    assert_eq!(&index.header, fcs.header());
    assert_eq!(&index.layout, fcs.layout());
    assert_eq!(index.channels.len(), 2);
    assert_eq!(index.analysis.get("gate"), Some("R1"));
    let (events, warnings) = index.read_events(&mut reader)?;
    assert_eq!(events.as_ref(), fcs.events());
    assert!(warnings.is_empty());
    Ok(())
}

#[test]
fn read_single_channel() -> Result<()> {
    let mut reader = FileRangeReader::from_handle(Cursor::new(sample()));
    let index = FcsIndex::from_reader(&mut reader, None, 0)?;

    assert_eq!(index.name, fcs_rs::UNNAMED_SOURCE);
    assert_eq!(
        index.read_channel_values(1, &mut reader)?,
        Some(vec![10.0, 11.0, 12.0, 13.0])
    );
    assert_eq!(
        index.read_channel_values_by_name("Side", &mut reader)?,
        Some(vec![20.0, 21.0, 22.0, 23.0])
    );
    assert!(matches!(
        index.read_channel_values(3, &mut reader),
        Err(Error::InvalidKeyword { .. })
    ));
    assert!(matches!(
        index.read_channel_values_by_name("APC-A", &mut reader),
        Err(Error::MissingKeyword(_))
    ));
    Ok(())
}

#[test]
fn json_round_trip() -> Result<()> {
    let mut reader = FileRangeReader::from_handle(Cursor::new(sample()));
    let index = FcsIndex::from_reader(&mut reader, Some("sample.fcs"), 0)?;

    let json = index.to_json()?;
    assert!(json.contains("\"PnN\": \"FSC-A\""));
    let restored = FcsIndex::from_json(&json)?;

    assert_eq!(restored.header, index.header);
    assert_eq!(restored.layout, index.layout);
    assert_eq!(restored.text.get("p2s"), Some("Side"));
    assert_eq!(
        restored.read_events(&mut reader)?.0,
        Some(EventData::Integer(vec![10, 20, 11, 21, 12, 22, 13, 23]))
    );
    Ok(())
}

#[test]
fn file_index_save_and_load() -> Result<()> {
    let dir = std::env::temp_dir();
    let data_path = dir.join("fcs_rs_index_sample.fcs");
    let index_path = dir.join("fcs_rs_index_sample.fcs.index");
    std::fs::write(&data_path, sample())?;

    let index = FcsIndex::from_file(data_path.to_str().unwrap())?;
    assert_eq!(index.name, "fcs_rs_index_sample.fcs");
    index.save_to_file(index_path.to_str().unwrap())?;

    let loaded = FcsIndex::load_from_file(index_path.to_str().unwrap())?;
    let mut reader = BufferedRangeReader::new(data_path.to_str().unwrap())?;
    assert_eq!(
        loaded.read_channel_values_by_name("SSC-A", &mut reader)?,
        Some(vec![20.0, 21.0, 22.0, 23.0])
    );

    std::fs::remove_file(data_path)?;
    std::fs::remove_file(index_path)?;
    Ok(())
}

#[test]
fn truncated_source_is_rejected() -> Result<()> {
    let bytes = sample();
    let mut reader = FileRangeReader::from_handle(Cursor::new(bytes.clone()));
    let index = FcsIndex::from_reader(&mut reader, None, 0)?;

    let mut short = FileRangeReader::from_handle(Cursor::new(bytes[..bytes.len() - 4].to_vec()));
    assert!(matches!(
        index.read_events(&mut short),
        Err(Error::DataExceedsFileSize { .. })
    ));
    Ok(())
}

#[test]
fn index_keeps_layout_warnings() -> Result<()> {
    let bytes = int16_builder(&["FL1"], 2, &[1, 2])
        .keyword("$BYTEORD", "2,1,3")
        .build();
    let mut reader = FileRangeReader::from_handle(Cursor::new(bytes));
    let index = FcsIndex::from_reader(&mut reader, None, 0)?;
    assert_eq!(
        index.warnings,
        vec![Warning::UnrecognizedByteOrder("2,1,3".to_string())]
    );
    Ok(())
}

#[test]
fn deferred_read_reports_missing_events() -> Result<()> {
    let bytes = int16_builder(&["FL1", "FL2"], 5, &[1, 2, 3, 4]).build();
    let fcs = Fcs::from_bytes(bytes.clone())?;
    let mut reader = FileRangeReader::from_handle(Cursor::new(bytes));
    let index = FcsIndex::from_reader(&mut reader, None, 0)?;

    let (events, warnings) = index.read_events(&mut reader)?;
    assert_eq!(events, Some(EventData::Integer(vec![1, 2, 3, 4])));
    assert_eq!(warnings, fcs.warnings());
    assert_eq!(
        warnings,
        vec![Warning::MissingEvents {
            expected: 10,
            actual: 4
        }]
    );
    Ok(())
}

#[test]
fn unsupported_widths_are_not_an_empty_channel() -> Result<()> {
    let bytes = int16_builder(&["FL1", "FL2"], 2, &[1, 2, 3, 4])
        .keyword("$P1B", "10")
        .build();
    let mut reader = FileRangeReader::from_handle(Cursor::new(bytes));
    let index = FcsIndex::from_reader(&mut reader, None, 0)?;

    assert_eq!(index.read_channel_values(1, &mut reader)?, None);
    assert_eq!(index.read_channel_values_by_name("FL2", &mut reader)?, None);
    let (events, warnings) = index.read_events(&mut reader)?;
    assert!(events.is_none());
    assert_eq!(warnings, vec![Warning::UnsupportedBitWidths(vec![10, 16])]);
    Ok(())
}

#[test]
fn zero_events_read_as_empty_channel() -> Result<()> {
    let bytes = int16_builder(&["FL1"], 0, &[]).build();
    let mut reader = FileRangeReader::from_handle(Cursor::new(bytes));
    let index = FcsIndex::from_reader(&mut reader, None, 0)?;
    assert_eq!(index.read_channel_values(1, &mut reader)?, Some(Vec::new()));
    Ok(())
}
