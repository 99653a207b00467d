// End-to-end conversion tests: DBC text in, BSM document out
use dbc_bsm::xml::Element;
use dbc_bsm::{BsmError, Converter, ConverterConfig, OversizePolicy};
use std::io::{self, Write};
use tempfile::NamedTempFile;

const VEHICLE_DBC: &str = r#"
VERSION ""

NS_ :

BS_:

BU_: ECU1 ECU2

BO_ 100 Speed: 2 ECU1
 SG_ kph : 0|12@1+ (1,0) [0|4095] "km/h" ECU2

BO_ 200 Odometer: 4 ECU1
 SG_ Distance : 0|20@1+ (1,0) [0|1048575] "km" ECU2

BO_ 300 Gear: 2 ECU1
 SG_ Selected : 8|8@1+ (1,0) [0|8] "" ECU2

BO_ 400 Mode: 4 ECU1
 SG_ Selector M : 0|4@1+ (1,0) [0|15] "" ECU2
 SG_ ValueA m0 : 4|4@1+ (1,0) [0|15] "" ECU2
 SG_ ValueB m1 : 4|4@1+ (1,0) [0|15] "" ECU2
 SG_ Tail : 8|8@1+ (1,0) [0|255] "" ECU2
"#;

const TWO_MUX_DBC: &str = r#"
VERSION ""

NS_ :

BS_:

BU_: ECU1

BO_ 500 Broken: 2 ECU1
 SG_ First M : 0|4@1+ (1,0) [0|15] "" ECU1
 SG_ Second M : 4|4@1+ (1,0) [0|15] "" ECU1
"#;

const WIDE_DBC: &str = r#"
VERSION ""

NS_ :

BS_:

BU_: ECU1

BO_ 600 Wide: 8 ECU1
 SG_ Low : 0|32@1+ (1,0) [0|0] "" ECU1
 SG_ High : 32|8@1+ (1,0) [0|255] "" ECU1
"#;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn converter(dbc: &str, config: ConverterConfig) -> Converter {
    let mut converter = Converter::with_config(config);
    converter.add_dbc_str(dbc, "vehicle.dbc").unwrap();
    converter
}

/// (padding size, [(name, size)]) of every CAN Send step
fn layouts(root: &Element) -> Vec<(String, Vec<(String, String)>)> {
    root.find_all("BC")
        .iter()
        .map(|bc| {
            let blocks = bc
                .find_all("BB")
                .iter()
                .map(|bb| {
                    (
                        bb.attribute("Name").unwrap().to_string(),
                        bb.attribute("Size").unwrap().to_string(),
                    )
                })
                .collect();
            (bc.attribute("PaddingSize").unwrap().to_string(), blocks)
        })
        .collect()
}

fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
    items
        .iter()
        .map(|(a, b)| (a.to_string(), b.to_string()))
        .collect()
}

#[test]
fn test_full_document() {
    init_logging();
    let dbc = r#"
VERSION ""

NS_ :

BS_:

BU_: ECU1

BO_ 100 Speed: 2 ECU1
 SG_ kph : 0|12@1+ (1,0) [0|4095] "km/h" ECU1
"#;
    let converter = converter(dbc, ConverterConfig::new());
    let mut out = Vec::new();
    converter.convert(&mut out).unwrap();

    let expected = format!(
        concat!(
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n",
            "<!-- Generated by dbc-bsm v{version} -->\n",
            "<beSTORM Version=\"1.2\">\n",
            "\t<GeneratorOptSettings>\n",
            "\t\t<BT FactoryDefined=\"1\" MaxBytesToGenerate=\"8\" FactoryType=\"Binary\" />\n",
            "\t</GeneratorOptSettings>\n",
            "\t<ModuleSettings>\n",
            "\t\t<M Name=\"CAN\">\n",
            "\t\t\t<P Name=\"CAN Protocol\">\n",
            "\t\t\t\t<SC Name=\"CAN Sequence\">\n",
            "\t\t\t\t\t<SP Name=\"CAN Open\" Library=\"CAN Interface.dll\" Procedure=\"OpenDevice\">\n",
            "\t\t\t\t\t\t<S Name=\"IPAddress\">\n",
            "\t\t\t\t\t\t\t<EV Name=\"IPAddress\" Description=\"CAN IP Address\" ASCIIValue=\"&lt;CAN Device&gt;\" Required=\"1\" />\n",
            "\t\t\t\t\t\t</S>\n",
            "\t\t\t\t\t\t<S Name=\"Port\">\n",
            "\t\t\t\t\t\t\t<EV Name=\"Port\" Description=\"CAN Port\" ASCIIValue=\"0\" Required=\"1\" Comment=\"Should be either 0, 1, 2, or 3\" />\n",
            "\t\t\t\t\t\t</S>\n",
            "\t\t\t\t\t</SP>\n",
            "\t\t\t\t\t<SP Name=\"CAN SetGlobals\" Library=\"CAN Interface.dll\" Procedure=\"SetGlobals\">\n",
            "\t\t\t\t\t\t<S Name=\"HANDLE\">\n",
            "\t\t\t\t\t\t\t<PC Name=\"CAN\" ConditionedName=\"CAN Open\" Parameter=\"HANDLE\" />\n",
            "\t\t\t\t\t\t</S>\n",
            "\t\t\t\t\t\t<S Name=\"Baudrate\">\n",
            "\t\t\t\t\t\t\t<EV Name=\"Baudrate\" Description=\"Baudrate\" ASCIIValue=\"250000\" Required=\"1\" Comment=\"Should be either '10000', '20000', '50000', '62500', '100000', '125000', '250000', '500000', '800000', or '1000000'\" />\n",
            "\t\t\t\t\t\t</S>\n",
            "\t\t\t\t\t</SP>\n",
            "\n",
            "\t\t\t\t\t<SE Name=\"Messages\">\n",
            "\n",
            "\t\t\t\t\t\t<SP Name=\"CAN Send (Speed - 100)\" Library=\"CAN Interface.dll\" Procedure=\"Write\">\n",
            "\t\t\t\t\t\t\t<S Name=\"HANDLE\">\n",
            "\t\t\t\t\t\t\t\t<PC Name=\"HANDLE\" ConditionedName=\"CAN Open\" Parameter=\"HANDLE\" />\n",
            "\t\t\t\t\t\t\t</S>\n",
            "\t\t\t\t\t\t\t<S Name=\"Identifier\">\n",
            "\t\t\t\t\t\t\t\t<C Name=\"Identifier\">100</C>\n",
            "\t\t\t\t\t\t\t</S>\n",
            "\t\t\t\t\t\t\t<S ParamName=\"Data\" Name=\"Message\">\n",
            "\t\t\t\t\t\t\t\t<BC Name=\"Message Bits\" PaddingSize=\"16\" PaddingBit=\"0\">\n",
            "\t\t\t\t\t\t\t\t\t<BB Name=\"kph\" Bits=\"0\" Size=\"12\" />\n",
            "\t\t\t\t\t\t\t\t</BC>\n",
            "\t\t\t\t\t\t\t</S>\n",
            "\t\t\t\t\t\t</SP>\n",
            "\n",
            "\t\t\t\t\t</SE>\n",
            "\n",
            "\t\t\t\t\t<SP Name=\"CAN Close\" Library=\"CAN Interface.dll\" Procedure=\"CloseDevice\">\n",
            "\t\t\t\t\t\t<S Name=\"HANDLE\">\n",
            "\t\t\t\t\t\t\t<PC Name=\"CAN\" ConditionedName=\"CAN Open\" Parameter=\"HANDLE\" />\n",
            "\t\t\t\t\t\t</S>\n",
            "\t\t\t\t\t</SP>\n",
            "\t\t\t\t</SC>\n",
            "\t\t\t</P>\n",
            "\t\t</M>\n",
            "\t</ModuleSettings>\n",
            "</beSTORM>\n",
        ),
        version = dbc_bsm::VERSION
    );

    assert_eq!(String::from_utf8(out).unwrap(), expected);
}

#[test]
fn test_vehicle_layouts() {
    init_logging();
    let converter = converter(VEHICLE_DBC, ConverterConfig::new());
    let (document, summary) = converter.build_document().unwrap();

    assert_eq!(
        layouts(&document.root),
        vec![
            ("16".to_string(), pairs(&[("kph", "12")])),
            (
                "24".to_string(),
                pairs(&[("Distance (LSB)", "16"), ("Distance (MSB)", "4")])
            ),
            ("16".to_string(), pairs(&[("UNKNOWN", "8"), ("Selected", "8")])),
            // Selector and ValueA/ValueB are left out; Tail follows a gap
            ("24".to_string(), pairs(&[("UNKNOWN", "8"), ("Tail", "8")])),
        ]
    );

    assert_eq!(summary.messages, 4);
    assert_eq!(summary.gap_blocks, 2);
    assert_eq!(summary.split_blocks, 1);
    assert_eq!(summary.skipped_multiplexed, 2);
    assert_eq!(summary.descriptors, 7);
}

#[test]
fn test_dbc_file_on_disk() {
    init_logging();
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(VEHICLE_DBC.as_bytes()).unwrap();
    temp_file.flush().unwrap();

    let mut converter = Converter::new();
    converter.add_dbc(temp_file.path()).unwrap();

    let stats = converter.database_stats();
    assert_eq!(stats.num_messages, 4);
    assert_eq!(stats.num_signals, 7);
    assert_eq!(stats.num_multiplexed_messages, 1);

    let (text, _) = converter.convert_to_string().unwrap();
    assert!(text.contains("CAN Send (Odometer - 200)"));
}

#[test]
fn test_conversion_is_idempotent() {
    let converter = converter(VEHICLE_DBC, ConverterConfig::new());

    let mut first = Vec::new();
    let mut second = Vec::new();
    converter.convert(&mut first).unwrap();
    converter.convert(&mut second).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_timestamp_comment_is_only_difference() {
    let plain = converter(VEHICLE_DBC, ConverterConfig::new())
        .convert_to_string()
        .unwrap()
        .0;
    let stamped = converter(VEHICLE_DBC, ConverterConfig::new().with_timestamps(true))
        .convert_to_string()
        .unwrap()
        .0;

    let stamped_lines: Vec<&str> = stamped.lines().collect();
    assert!(stamped_lines[2].starts_with("<!-- Generated on: "));

    let without_stamp: Vec<&str> = stamped_lines
        .iter()
        .copied()
        .filter(|line| !line.starts_with("<!-- Generated on: "))
        .collect();
    assert_eq!(without_stamp, plain.lines().collect::<Vec<_>>());
}

#[test]
fn test_duplicate_multiplexor_writes_nothing() {
    init_logging();
    let mut converter = converter(VEHICLE_DBC, ConverterConfig::new());
    converter.add_dbc_str(TWO_MUX_DBC, "broken.dbc").unwrap();

    let mut out = Vec::new();
    match converter.convert(&mut out) {
        Err(BsmError::MultipleMultiplexors { message, first, second }) => {
            assert_eq!(message, "Broken");
            assert_eq!(first, "First");
            assert_eq!(second, "Second");
        }
        other => panic!("expected MultipleMultiplexors, got {:?}", other),
    }
    assert!(out.is_empty());
}

#[test]
fn test_oversized_frame_policies() {
    let rejecting = converter(WIDE_DBC, ConverterConfig::new());
    let err = rejecting.convert_to_string().unwrap_err();
    assert!(matches!(err, BsmError::FrameTooLarge { raw_size: 40, .. }));
    assert!(err.is_structural());

    let clamping = converter(
        WIDE_DBC,
        ConverterConfig::new().with_oversize_policy(OversizePolicy::Clamp),
    );
    let (document, _) = clamping.build_document().unwrap();
    assert_eq!(
        layouts(&document.root),
        vec![(
            "32".to_string(),
            pairs(&[("Low (LSB)", "16"), ("Low (MSB)", "16"), ("High", "8")])
        )]
    );
}

#[test]
fn test_sink_failure_is_reported() {
    struct ClosedPipe;
    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"))
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    let converter = converter(VEHICLE_DBC, ConverterConfig::new());
    match converter.convert(&mut ClosedPipe) {
        Err(BsmError::IoError(e)) => assert_eq!(e.kind(), io::ErrorKind::BrokenPipe),
        other => panic!("expected IoError, got {:?}", other),
    }
}

#[test]
fn test_invalid_dbc() {
    let mut converter = Converter::new();
    let result = converter.add_dbc_str("this is not a dbc file", "garbage.dbc");
    assert!(matches!(result, Err(BsmError::DbcParseError(_))));
}
