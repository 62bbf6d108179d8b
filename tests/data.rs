mod common;

use common::{FcsBuilder, init_tracing, int16_builder};
use fcs_rs::{
    ByteOrder, DataType, Error, EventData, Fcs, Result, Warning,
    parsing::decoder::{decode_integer_masked, decode_uniform_integers},
};

fn int32_builder(events: usize, values: &[u32]) -> FcsBuilder {
    FcsBuilder::new()
        .keyword("$PAR", "2")
        .keyword("$TOT", &events.to_string())
        .keyword("$DATATYPE", "I")
        .keyword("$BYTEORD", "1,2,3,4")
        .keyword("$P1B", "32")
        .keyword("$P1R", "262144")
        .keyword("$P1N", "FSC-A")
        .keyword("$P2B", "32")
        .keyword("$P2R", "262144")
        .keyword("$P2N", "SSC-A")
        .data(values.iter().flat_map(|v| v.to_le_bytes()).collect())
}

#[test]
fn exclusive_data_end_is_corrected() -> Result<()> {
    init_tracing();
    let values: Vec<u16> = (1..=10).collect();
    let exact = Fcs::from_bytes(int16_builder(&["FL1", "FL2"], 5, &values).build())?;
    let shifted = Fcs::from_bytes(
        int16_builder(&["FL1", "FL2"], 5, &values)
            .data_end_delta(1)
            .build(),
    )?;

    assert_eq!(shifted.layout().stop, exact.layout().stop + 1);
    assert_eq!(shifted.events(), exact.events());
    assert!(shifted.warnings().is_empty());
    Ok(())
}

#[test]
fn other_size_remainders_are_rejected() {
    let bytes = int32_builder(2, &[1, 2, 3, 4]).data_end_delta(-2).build();
    assert!(matches!(
        Fcs::from_bytes(bytes),
        Err(Error::SegmentSizeMismatch { value_size: 4, .. })
    ));
}

#[test]
fn histogram_modes_are_rejected_before_data() {
    for mode in ["C", "U", "c"] {
        // The declared DATA end lies past the file; the mode check comes first
        let bytes = int16_builder(&["FL1"], 2, &[1, 2])
            .keyword("$MODE", mode)
            .data_end_delta(1000)
            .build();
        match Fcs::from_bytes(bytes) {
            Err(Error::UnsupportedMode(m)) => assert_eq!(m, mode),
            other => panic!("expected UnsupportedMode, got {other:?}"),
        }
    }
}

#[test]
fn missing_mode_means_list_mode() -> Result<()> {
    let bytes = FcsBuilder::new()
        .keyword("$PAR", "1")
        .keyword("$TOT", "2")
        .keyword("$DATATYPE", "I")
        .keyword("$BYTEORD", "1,2")
        .keyword("$P1B", "16")
        .keyword("$P1R", "1024")
        .keyword("$P1N", "FL1")
        .data(vec![1, 0, 2, 0])
        .build();
    let fcs = Fcs::from_bytes(bytes)?;
    assert_eq!(fcs.events(), Some(&EventData::Integer(vec![1, 2])));
    Ok(())
}

#[test]
fn data_past_end_of_file_is_rejected() {
    // The size guard runs before $DATATYPE is interpreted
    let bytes = int16_builder(&["FL1"], 2, &[1, 2])
        .keyword("$DATATYPE", "X")
        .data_end_delta(10)
        .build();
    let file_size = bytes.len() as u64;
    match Fcs::from_bytes(bytes) {
        Err(Error::DataExceedsFileSize {
            data_end,
            file_size: size,
        }) => {
            assert_eq!(size, file_size);
            assert_eq!(data_end, file_size - 1 + 10);
        }
        other => panic!("expected DataExceedsFileSize, got {other:?}"),
    }
}

#[test]
fn unknown_datatype_is_rejected() {
    let bytes = int16_builder(&["FL1"], 2, &[1, 2])
        .keyword("$DATATYPE", "X")
        .build();
    assert!(matches!(
        Fcs::from_bytes(bytes),
        Err(Error::UnsupportedDataType(t)) if t == "X"
    ));
}

#[test]
fn unrecognized_byteord_falls_back_to_native() -> Result<()> {
    let values: [u16; 4] = [0x0102, 0x0304, 0x0506, 0x0708];
    let bytes = FcsBuilder::new()
        .keyword("$PAR", "2")
        .keyword("$TOT", "2")
        .keyword("$DATATYPE", "I")
        .keyword("$BYTEORD", "3,4,1,2")
        .keyword("$P1B", "16")
        .keyword("$P1R", "65536")
        .keyword("$P2B", "16")
        .keyword("$P2R", "65536")
        .data(values.iter().flat_map(|v| v.to_ne_bytes()).collect())
        .build();
    let fcs = Fcs::from_bytes(bytes)?;

    assert_eq!(
        fcs.warnings(),
        &[Warning::UnrecognizedByteOrder("3,4,1,2".to_string())]
    );
    assert_eq!(fcs.layout().byte_order, ByteOrder::NATIVE);
    assert_eq!(
        fcs.events(),
        Some(&EventData::Integer(values.iter().map(|&v| u32::from(v)).collect()))
    );
    Ok(())
}

#[test]
fn non_standard_widths_yield_no_events() -> Result<()> {
    let bytes = int16_builder(&["FL1", "FL2"], 2, &[1, 2, 3, 4])
        .keyword("$P1B", "10")
        .build();
    let fcs = Fcs::from_bytes(bytes)?;
    assert!(fcs.events().is_none());
    assert_eq!(
        fcs.warnings(),
        &[Warning::UnsupportedBitWidths(vec![10, 16])]
    );
    assert!(fcs.channel_values(1).is_none());
    assert_eq!(fcs.channel_count(), 2);
    Ok(())
}

#[test]
fn big_endian_32_bit_integers() -> Result<()> {
    let values = [70000u32, 1, 262143, 5];
    let bytes = int32_builder(2, &[])
        .keyword("$BYTEORD", "4,3,2,1")
        .data(values.iter().flat_map(|v| v.to_be_bytes()).collect())
        .build();
    let fcs = Fcs::from_bytes(bytes)?;
    assert_eq!(fcs.layout().byte_order, ByteOrder::Big);
    assert_eq!(fcs.events(), Some(&EventData::Integer(values.to_vec())));
    Ok(())
}

#[test]
fn mixed_widths_are_masked_by_range() -> Result<()> {
    let bytes = FcsBuilder::new()
        .keyword("$PAR", "2")
        .keyword("$TOT", "2")
        .keyword("$DATATYPE", "I")
        .keyword("$MODE", "L")
        .keyword("$BYTEORD", "1,2")
        .keyword("$P1B", "16")
        .keyword("$P1R", "1024")
        .keyword("$P1N", "FL1")
        .keyword("$P2B", "8")
        .keyword("$P2R", "256")
        .keyword("$P2N", "FL2")
        .data(vec![0xff, 0xff, 0x07, 0x01, 0x04, 0x09])
        .build();
    let fcs = Fcs::from_bytes(bytes)?;
    assert_eq!(
        fcs.events(),
        Some(&EventData::Integer(vec![0x3ff, 0x07, 0x001, 0x09]))
    );
    assert_eq!(fcs.channel_values_by_name("FL2").unwrap(), vec![7.0, 9.0]);
    Ok(())
}

#[test]
fn masked_and_uniform_paths_agree() -> Result<()> {
    let values: Vec<u16> = vec![0, 1023, 512, 7, 1000, 64];
    let fcs = Fcs::from_bytes(int16_builder(&["FL1", "FL2"], 3, &values).build())?;

    let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
    let masked = decode_integer_masked(&bytes, &[16, 16], &[1024, 1024], ByteOrder::Little, 3)?;
    let uniform = decode_uniform_integers(&bytes, 2, ByteOrder::Little);

    assert_eq!(masked, uniform);
    assert_eq!(fcs.events(), Some(&EventData::Integer(masked)));
    Ok(())
}

#[test]
fn big_endian_floats() -> Result<()> {
    let values = [1.5f32, -2.25, 3.0, 1e6];
    let bytes = FcsBuilder::new()
        .keyword("$PAR", "2")
        .keyword("$TOT", "2")
        .keyword("$DATATYPE", "F")
        .keyword("$MODE", "L")
        .keyword("$BYTEORD", "4,3,2,1")
        .keyword("$P1B", "32")
        .keyword("$P1N", "FSC-A")
        .keyword("$P2B", "32")
        .keyword("$P2N", "SSC-A")
        .data(values.iter().flat_map(|v| v.to_be_bytes()).collect())
        .build();
    let fcs = Fcs::from_bytes(bytes)?;
    assert_eq!(fcs.layout().datatype, DataType::Float);
    assert_eq!(fcs.events(), Some(&EventData::Float(values.to_vec())));
    assert_eq!(fcs.channel_values(2).unwrap(), vec![-2.25, 1e6]);
    Ok(())
}

#[test]
fn little_endian_doubles_with_exclusive_end() -> Result<()> {
    let values = [0.125f64, -7.5, 1e-3];
    let bytes = FcsBuilder::new()
        .keyword("$PAR", "1")
        .keyword("$TOT", "3")
        .keyword("$DATATYPE", "D")
        .keyword("$MODE", "L")
        .keyword("$BYTEORD", "1,2,3,4")
        .keyword("$P1B", "64")
        .keyword("$P1N", "Time")
        .data(values.iter().flat_map(|v| v.to_le_bytes()).collect())
        .data_end_delta(1)
        .build();
    let fcs = Fcs::from_bytes(bytes)?;
    assert_eq!(fcs.events(), Some(&EventData::Double(values.to_vec())));
    Ok(())
}

#[test]
fn fixed_width_ascii() -> Result<()> {
    let bytes = FcsBuilder::new()
        .keyword("$PAR", "2")
        .keyword("$TOT", "2")
        .keyword("$DATATYPE", "A")
        .keyword("$MODE", "L")
        .keyword("$BYTEORD", "1,2,3,4")
        .keyword("$P1B", "4")
        .keyword("$P2B", "3")
        .data(b"  123.5   7  8".to_vec())
        .build();
    let fcs = Fcs::from_bytes(bytes)?;
    assert_eq!(
        fcs.events(),
        Some(&EventData::Ascii(vec![12.0, 3.5, 7.0, 8.0]))
    );
    Ok(())
}

#[test]
fn delimited_ascii() -> Result<()> {
    let bytes = FcsBuilder::new()
        .keyword("$PAR", "2")
        .keyword("$TOT", "2")
        .keyword("$DATATYPE", "A")
        .keyword("$MODE", "L")
        .keyword("$BYTEORD", "1,2,3,4")
        .keyword("$P1B", "*")
        .keyword("$P2B", "*")
        .data(b"10,20 30\n40 ".to_vec())
        .build();
    let fcs = Fcs::from_bytes(bytes)?;
    assert_eq!(
        fcs.events(),
        Some(&EventData::Ascii(vec![10.0, 20.0, 30.0, 40.0]))
    );
    Ok(())
}

#[test]
fn zero_events_read_nothing() -> Result<()> {
    let fcs = Fcs::from_bytes(int16_builder(&["FL1", "FL2"], 0, &[]).build())?;
    assert_eq!(fcs.events(), Some(&EventData::Integer(Vec::new())));
    assert!(fcs.warnings().is_empty());
    assert_eq!(fcs.channel_values(1), Some(Vec::new()));
    Ok(())
}

#[test]
fn zero_data_offsets_with_events_warn() -> Result<()> {
    let mut bytes = int16_builder(&["FL1", "FL2"], 5, &(0..10).collect::<Vec<u16>>()).build();
    bytes[26..42].copy_from_slice(b"       0       0");
    let fcs = Fcs::from_bytes(bytes)?;

    assert_eq!(fcs.events(), Some(&EventData::Integer(Vec::new())));
    assert_eq!(
        fcs.warnings(),
        &[Warning::MissingEvents {
            expected: 10,
            actual: 0
        }]
    );
    Ok(())
}

#[test]
fn exclusive_end_on_8_bit_data_exceeds_file() {
    let bytes = FcsBuilder::new()
        .keyword("$PAR", "2")
        .keyword("$TOT", "2")
        .keyword("$DATATYPE", "I")
        .keyword("$MODE", "L")
        .keyword("$BYTEORD", "1,2,3,4")
        .keyword("$P1B", "8")
        .keyword("$P1R", "256")
        .keyword("$P2B", "8")
        .keyword("$P2R", "256")
        .data(vec![1, 2, 3, 4])
        .data_end_delta(1)
        .build();
    let file_size = bytes.len() as u64;
    match Fcs::from_bytes(bytes) {
        Err(Error::DataExceedsFileSize {
            data_end,
            file_size: size,
        }) => {
            assert_eq!(size, file_size);
            assert_eq!(data_end, file_size);
        }
        other => panic!("expected DataExceedsFileSize, got {other:?}"),
    }
}

#[test]
fn unknown_mode_reads_as_list_mode() -> Result<()> {
    let bytes = int16_builder(&["FL1"], 2, &[3, 4])
        .keyword("$MODE", "List")
        .build();
    let fcs = Fcs::from_bytes(bytes)?;
    assert_eq!(fcs.events(), Some(&EventData::Integer(vec![3, 4])));
    assert_eq!(
        fcs.warnings(),
        &[Warning::UnrecognizedMode("List".to_string())]
    );
    Ok(())
}

#[test]
fn blank_fixed_width_ascii_field_is_rejected() {
    let bytes = FcsBuilder::new()
        .keyword("$PAR", "2")
        .keyword("$TOT", "2")
        .keyword("$DATATYPE", "A")
        .keyword("$MODE", "L")
        .keyword("$BYTEORD", "1,2,3,4")
        .keyword("$P1B", "4")
        .keyword("$P2B", "3")
        .data(b"  12      7  8".to_vec())
        .build();
    assert!(matches!(
        Fcs::from_bytes(bytes),
        Err(Error::InvalidAsciiValue(_))
    ));
}
