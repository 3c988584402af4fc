use glam::IVec2;
use pinout2kicad_rs::{
    centering::center,
    classifier::ClassifiedPins,
    converter::build_symbol,
    error::Error,
    kicad_models::{Edge, GRID_UNIT, Justify, KiSymbol, Orientation, PIN_LENGTH, Symbol},
    layout::layout,
    pin_models::{DeviceMetadata, Pin},
    ports::group_ports,
};
use rstest::rstest;
use std::collections::HashSet;

fn pins(rows: &[(&str, &str, &str)]) -> Vec<Pin> {
    rows.iter()
        .map(|(number, name, role)| Pin::new(number, name, role).unwrap())
        .collect()
}

fn uncentered(pins: Vec<Pin>) -> Symbol {
    let classified = ClassifiedPins::from_pins(pins);
    let ports = group_ports(&classified.bus_members).unwrap();
    layout(&classified, &ports)
}

fn find<'a>(symbol: &'a Symbol, name: &str) -> &'a pinout2kicad_rs::kicad_models::PlacedPin {
    symbol
        .pins
        .iter()
        .find(|p| p.pin.name == name)
        .unwrap_or_else(|| panic!("pin {} not placed", name))
}

/// Names on one edge, read from the top of the symbol down.
fn top_down(symbol: &Symbol, edge: Edge) -> Vec<String> {
    let mut placed: Vec<_> = symbol.pins.iter().filter(|p| p.edge == edge && p.visible).collect();
    placed.sort_by(|a, b| b.pos.y.cmp(&a.pos.y));
    placed.iter().map(|p| p.pin.name.clone()).collect()
}

fn mixed_device() -> Vec<Pin> {
    pins(&[
        ("1", "VDD33", "Power"),
        ("2", "VDD5", "Power"),
        ("3", "GND", "Power"),
        ("4", "GND", "Power"),
        ("5", "VSSA", "Power"),
        ("6", "VREF+", "Input"),
        ("7", "RESET", "Reset"),
        ("8", "BOOT0", "Boot"),
        ("9", "XI", "Clock"),
        ("10", "XO", "Clock"),
        ("11", "UDP", "Upstream"),
        ("12", "UDM", "Upstream"),
        ("13", "DP1", "Downstream"),
        ("14", "DM1", "Downstream"),
        ("15", "OVCUR", "Overcurrent"),
        ("16", "LED", "Output"),
        ("17", "PA0", "InOut"),
        ("18", "PA1", "InOut"),
        ("19", "PA3", "InOut"),
        ("20", "PB0", "Input"),
        ("21", "PB10", "Output"),
        ("22", "NC", "NC"),
        ("23", "NC", "NC"),
        ("24", "LONG_SIGNAL_NAME", "Output"),
    ])
}

#[test]
fn test_four_pin_scenario() {
    let input = pins(&[
        ("1", "GND", "Power"),
        ("2", "VDD", "Power"),
        ("3", "RESET", "Reset"),
        ("4", "PA0", "Input"),
    ]);
    let symbol = uncentered(input.clone());

    assert_eq!(symbol.canvas.box_width, 700);
    assert_eq!(symbol.canvas.box_height, 300);
    assert_eq!(symbol.body.end, IVec2::new(700, 300));

    let reset = find(&symbol, "RESET");
    assert_eq!(reset.edge, Edge::Left);
    assert_eq!(reset.pos, IVec2::new(-PIN_LENGTH, 200));
    assert_eq!(reset.orientation, Orientation::Right);

    let pa0 = find(&symbol, "PA0");
    assert_eq!(pa0.edge, Edge::Right);
    assert_eq!(pa0.pos, IVec2::new(700 + PIN_LENGTH, 100));
    assert_eq!(pa0.orientation, Orientation::Left);

    let vdd = find(&symbol, "VDD");
    assert_eq!(vdd.edge, Edge::Top);
    assert_eq!(vdd.pos, IVec2::new(400, 300 + PIN_LENGTH));
    assert_eq!(vdd.orientation, Orientation::Down);

    let gnd = find(&symbol, "GND");
    assert_eq!(gnd.edge, Edge::Bottom);
    assert_eq!(gnd.pos, IVec2::new(400, -PIN_LENGTH));
    assert_eq!(gnd.orientation, Orientation::Up);

    assert_eq!(symbol.reference.pos, IVec2::new(0, 350));
    assert_eq!(symbol.value.pos, IVec2::new(500, 350));
    assert_eq!(symbol.footprint.pos, IVec2::ZERO);
    assert_eq!(symbol.footprint.justify, Justify::Right);
    assert!(symbol.footprint.hidden);

    // Every coordinate moves by the same offset
    let centered = center(symbol.clone());
    let offset = IVec2::new(-300, -100);
    assert_eq!(centered.body.start, offset);
    for (before, after) in symbol.pins.iter().zip(&centered.pins) {
        assert_eq!(after.pos - before.pos, offset, "pin {}", before.pin.name);
    }
    assert_eq!(find(&centered, "RESET").pos, IVec2::new(-500, 100));
    assert_eq!(find(&centered, "PA0").pos, IVec2::new(600, 0));
    assert_eq!(find(&centered, "VDD").pos, IVec2::new(100, 400));
    assert_eq!(find(&centered, "GND").pos, IVec2::new(100, -300));
    assert_eq!(centered.footprint.pos, offset);
    assert_eq!(centered.canvas, symbol.canvas);

    assert_eq!(build_symbol(input).unwrap(), centered);
}

/// Many port pins, so the right side sets the height.
fn right_heavy_device() -> Vec<Pin> {
    let mut rows: Vec<(String, String, &str)> = vec![("1".into(), "RESET".into(), "Reset")];
    for i in 0..10 {
        rows.push(((rows.len() + 1).to_string(), format!("PA{}", i), "InOut"));
    }
    for i in 0..6 {
        rows.push(((rows.len() + 1).to_string(), format!("PB{}", i), "Output"));
    }
    rows.iter()
        .map(|(number, name, role)| Pin::new(number, name, role).unwrap())
        .collect()
}

/// No-connect pins make the left side taller than its one group.
fn nc_heavy_device() -> Vec<Pin> {
    pins(&[
        ("1", "NC", "NC"),
        ("2", "NC", "NC"),
        ("3", "NC", "NC"),
        ("4", "NC", "NC"),
        ("5", "NC", "NC"),
        ("6", "RESET", "Reset"),
    ])
}

/// A supply row wider than either side.
fn top_heavy_device() -> Vec<Pin> {
    pins(&[
        ("1", "VDD1", "Power"),
        ("2", "VDD2", "Power"),
        ("3", "VDD3", "Power"),
        ("4", "VDD4", "Power"),
        ("5", "VDD5", "Power"),
        ("6", "VDD6", "Power"),
        ("7", "VDD7", "Power"),
        ("8", "VDD8", "Power"),
        ("9", "GND", "Power"),
        ("10", "EN", "Input"),
    ])
}

fn single_pin_device() -> Vec<Pin> {
    pins(&[("1", "LED", "Output")])
}

#[rstest]
#[case::mixed(mixed_device())]
#[case::right_heavy(right_heavy_device())]
#[case::nc_heavy(nc_heavy_device())]
#[case::top_heavy(top_heavy_device())]
#[case::single_pin(single_pin_device())]
fn test_no_pin_lost_or_duplicated(#[case] input: Vec<Pin>) {
    let symbol = build_symbol(input.clone()).unwrap();
    assert_eq!(symbol.pins.len(), input.len());

    let mut expected: Vec<_> = input.iter().map(|p| p.number.clone()).collect();
    let mut placed: Vec<_> = symbol.pins.iter().map(|p| p.pin.number.clone()).collect();
    expected.sort();
    placed.sort();
    assert_eq!(placed, expected);
}

#[rstest]
#[case::mixed(mixed_device())]
#[case::right_heavy(right_heavy_device())]
#[case::nc_heavy(nc_heavy_device())]
#[case::top_heavy(top_heavy_device())]
#[case::single_pin(single_pin_device())]
fn test_coordinates_on_grid(#[case] input: Vec<Pin>) {
    let symbol = build_symbol(input).unwrap();
    for placed in &symbol.pins {
        assert_eq!(placed.pos.x % GRID_UNIT, 0, "pin {} x", placed.pin.name);
        assert_eq!(placed.pos.y % GRID_UNIT, 0, "pin {} y", placed.pin.name);
    }
    assert_eq!(symbol.body.start.x % GRID_UNIT, 0);
    assert_eq!(symbol.body.start.y % GRID_UNIT, 0);
    for label in [&symbol.reference, &symbol.value, &symbol.footprint] {
        assert_eq!(label.pos.x % GRID_UNIT, 0);
        // Text anchors sit half a grid above the body
        assert_eq!(label.pos.y % (GRID_UNIT / 2), 0);
    }
    assert_eq!(symbol.footprint.pos.y % GRID_UNIT, 0);
}

#[rstest]
#[case::mixed(mixed_device())]
#[case::right_heavy(right_heavy_device())]
#[case::nc_heavy(nc_heavy_device())]
#[case::top_heavy(top_heavy_device())]
#[case::single_pin(single_pin_device())]
fn test_no_overlapping_pins(#[case] input: Vec<Pin>) {
    let symbol = build_symbol(input).unwrap();
    let mut seen = HashSet::new();
    for placed in &symbol.pins {
        assert!(
            seen.insert((placed.edge, placed.pos)),
            "pin {} overlaps on {:?} at {:?}",
            placed.pin.name,
            placed.edge,
            placed.pos
        );
    }
}

#[rstest]
#[case::mixed(mixed_device())]
#[case::right_heavy(right_heavy_device())]
#[case::nc_heavy(nc_heavy_device())]
#[case::top_heavy(top_heavy_device())]
#[case::single_pin(single_pin_device())]
fn test_pins_within_canvas(#[case] input: Vec<Pin>) {
    let symbol = build_symbol(input).unwrap();
    let min = symbol.body.start - IVec2::splat(PIN_LENGTH);
    let max = symbol.body.end + IVec2::splat(PIN_LENGTH);
    assert_eq!(
        symbol.body.end - symbol.body.start,
        IVec2::new(symbol.canvas.box_width, symbol.canvas.box_height)
    );
    for placed in &symbol.pins {
        assert!(
            placed.pos.x >= min.x && placed.pos.x <= max.x,
            "pin {} x out of range",
            placed.pin.name
        );
        assert!(
            placed.pos.y >= min.y && placed.pos.y <= max.y,
            "pin {} y out of range",
            placed.pin.name
        );
    }
}

#[rstest]
#[case::mixed(mixed_device())]
#[case::right_heavy(right_heavy_device())]
#[case::nc_heavy(nc_heavy_device())]
#[case::top_heavy(top_heavy_device())]
#[case::single_pin(single_pin_device())]
fn test_centering_is_idempotent(#[case] input: Vec<Pin>) {
    let once = build_symbol(input).unwrap();
    let twice = center(once.clone());
    assert_eq!(once, twice);
}

#[test]
fn test_heavy_side_sets_box_height() {
    // 10 + 6 port pins in two groups: 2 gaps + 16 slots + margin
    let right = uncentered(right_heavy_device());
    assert_eq!(right.canvas.box_height, 1900);

    // One reset group plus five NC slots
    let nc = uncentered(nc_heavy_device());
    assert_eq!(nc.canvas.box_height, 800);
    assert_eq!(find(&nc, "RESET").pos, IVec2::new(-PIN_LENGTH, 700));

    // Eight supply pins need a wider middle than the labels do
    let top = uncentered(top_heavy_device());
    assert_eq!(top.canvas.box_width, 100 + 900);
    assert_eq!(top.canvas.box_height, 300);
}

#[test]
fn test_port_gap_renders_members_only() {
    let symbol = uncentered(pins(&[
        ("1", "PA0", "Input"),
        ("2", "PA1", "Input"),
        ("3", "PA3", "Input"),
    ]));
    let right: Vec<_> = symbol.pins.iter().filter(|p| p.edge == Edge::Right).collect();
    assert_eq!(right.len(), 3);
    assert_eq!(symbol.canvas.box_height, 500);
    assert_eq!(top_down(&symbol, Edge::Right), vec!["PA0", "PA1", "PA3"]);
    assert_eq!(find(&symbol, "PA3").pos.y, 100);
    assert_eq!(find(&symbol, "PA0").pos.y, 300);
}

#[test]
fn test_duplicate_port_member_fails() {
    let input = pins(&[("1", "PA0", "Input"), ("2", "PA0", "Output")]);
    match group_ports(&input) {
        Err(Error::DuplicatePortMember {
            port,
            index,
            pin,
            existing,
        }) => {
            assert_eq!(port, 'A');
            assert_eq!(index, 0);
            assert_eq!(pin, "2");
            assert_eq!(existing, "1");
        }
        other => panic!("Expected DuplicatePortMember, got {:?}", other),
    }
    assert!(build_symbol(input).is_err());
}

#[test]
fn test_ports_sorted_by_letter_and_index() {
    let input = pins(&[
        ("1", "PB2", "Input"),
        ("2", "PA10", "Input"),
        ("3", "PA2", "Input"),
        ("4", "PB0", "Input"),
    ]);
    let ports = group_ports(&input).unwrap();
    assert_eq!(ports.keys().copied().collect::<Vec<_>>(), vec!['A', 'B']);
    let a: Vec<_> = ports[&'A'].pins().into_iter().map(|p| p.name).collect();
    assert_eq!(a, vec!["PA2", "PA10"]);

    let symbol = uncentered(input);
    assert_eq!(top_down(&symbol, Edge::Right), vec!["PA2", "PA10", "PB0", "PB2"]);
}

#[test]
fn test_right_edge_reads_in_group_order() {
    let symbol = uncentered(pins(&[
        ("1", "PA0", "Input"),
        ("2", "OVCUR", "Overcurrent"),
        ("3", "DP1", "Downstream"),
        ("4", "DM1", "Downstream"),
    ]));
    assert_eq!(
        top_down(&symbol, Edge::Right),
        vec!["DP1", "DM1", "OVCUR", "PA0"]
    );
    // One empty slot between groups
    assert_eq!(find(&symbol, "PA0").pos.y, 100);
    assert_eq!(find(&symbol, "OVCUR").pos.y, 300);
    assert_eq!(find(&symbol, "DM1").pos.y, 500);
}

#[test]
fn test_left_edge_group_order() {
    let symbol = uncentered(pins(&[
        ("1", "UDP", "Upstream"),
        ("2", "LED", "Output"),
        ("3", "XI", "Clock"),
        ("4", "VREF+", "Input"),
        ("5", "V3", "Power"),
        ("6", "BOOT0", "Boot"),
        ("7", "RESET", "Reset"),
    ]));
    assert_eq!(
        top_down(&symbol, Edge::Left),
        vec!["RESET", "BOOT0", "V3", "VREF+", "XI", "LED", "UDP"]
    );
    let height = symbol.canvas.box_height;
    assert_eq!(find(&symbol, "RESET").pos.y, height - GRID_UNIT);
    assert_eq!(find(&symbol, "BOOT0").pos.y, height - 3 * GRID_UNIT);
    assert!(symbol.pins.iter().all(|p| p.pos.x == -PIN_LENGTH));
}

#[test]
fn test_top_and_bottom_rows_sorted_and_centered() {
    let symbol = uncentered(pins(&[
        ("1", "VDDA", "Power"),
        ("2", "VBAT", "Power"),
        ("3", "VDD33", "Power"),
        ("4", "GND", "Power"),
    ]));
    let mut top: Vec<_> = symbol.pins.iter().filter(|p| p.edge == Edge::Top).collect();
    top.sort_by_key(|p| p.pos.x);
    let names: Vec<_> = top.iter().map(|p| p.pin.name.as_str()).collect();
    assert_eq!(names, vec!["VBAT", "VDD33", "VDDA"]);

    // Middle is 400 wide with no side columns
    assert_eq!(symbol.canvas.box_width, 400);
    assert_eq!(top[0].pos.x, 100);
    assert_eq!(top[2].pos.x, 300);
    assert_eq!(find(&symbol, "GND").pos, IVec2::new(200, -PIN_LENGTH));
    assert_eq!(symbol.value.pos.x, 400);
}

#[test]
fn test_no_connect_column() {
    let symbol = uncentered(pins(&[("1", "NC", "NC"), ("2", "NC", "NC")]));
    assert_eq!(symbol.canvas.box_height, 300);
    assert_eq!(symbol.canvas.box_width, 100);
    let ys: Vec<_> = symbol.pins.iter().map(|p| p.pos).collect();
    assert_eq!(ys, vec![IVec2::new(0, 100), IVec2::new(0, 200)]);
    for placed in &symbol.pins {
        assert!(!placed.visible);
        assert_eq!(placed.length, 0);
        assert_eq!(placed.edge, Edge::Left);
        assert_eq!(placed.orientation, Orientation::Right);
    }
}

#[test]
fn test_empty_edges_do_not_crash() {
    let symbol = build_symbol(Vec::new()).unwrap();
    assert!(symbol.pins.is_empty());
    assert_eq!(symbol.canvas.box_width, GRID_UNIT);
    assert_eq!(symbol.canvas.box_height, GRID_UNIT);

    let only_top = uncentered(pins(&[("1", "VDD", "Power")]));
    assert_eq!(only_top.canvas.box_width, 200);
    assert_eq!(only_top.canvas.box_height, 100);
}

#[test]
fn test_kicad_entry_units_and_flags() {
    let drawing = build_symbol(pins(&[
        ("1", "GND", "Power"),
        ("2", "VDD", "Power"),
        ("3", "RESET", "Reset"),
        ("4", "PA0", "Input"),
        ("5", "NC", "NC"),
    ]))
    .unwrap();
    let symbol = KiSymbol {
        name: "TEST_IC".to_string(),
        reference: "U".to_string(),
        metadata: DeviceMetadata {
            description: "Test IC".to_string(),
            footprint: "Package_SO:SOIC-8".to_string(),
            ..Default::default()
        },
        drawing,
    };
    let entry = symbol.to_kicad_lib_entry();
    assert!(entry.starts_with("(symbol \"TEST_IC\" (in_bom yes) (on_board yes)"));
    assert!(entry.contains("(pin power_in line"));
    assert!(entry.contains("(pin no_connect line"));
    assert!(entry.contains("(length 0) hide"));
    assert!(entry.contains("(length 5.08)"));
    assert!(entry.contains("\"Footprint\" \"Package_SO:SOIC-8\""));
    assert!(entry.contains("(justify right) hide"));
    assert!(entry.contains("(fill (type background))"));
}

#[test]
fn test_kicad_entry_escapes_quoted_text() {
    let mut reset = Pin::new("3", "RESET", "Reset").unwrap();
    reset.alternate_functions.push("NRST\\B".to_string());
    let drawing = build_symbol(vec![reset]).unwrap();
    let symbol = KiSymbol {
        name: "TEST_IC".to_string(),
        reference: "U".to_string(),
        metadata: DeviceMetadata {
            description: r#"USB "HS" hub"#.to_string(),
            datasheet: r"C:\docs\hub.pdf".to_string(),
            ..Default::default()
        },
        drawing,
    };
    let entry = symbol.to_kicad_lib_entry();
    assert!(
        entry.contains(r#"(property "ki_description" "USB \"HS\" hub" (id 5)"#),
        "{}",
        entry
    );
    assert!(entry.contains(r#"(property "Datasheet" "C:\\docs\\hub.pdf" (id 3)"#), "{}", entry);
    assert!(entry.contains(r#"(alternate "NRST\\B" input line)"#), "{}", entry);
    assert!(!entry.contains(r#""USB "HS" hub""#));
}

#[test]
fn test_symbol_json_dump() {
    let drawing = build_symbol(pins(&[("1", "VDD", "Power"), ("2", "PA0", "Input")])).unwrap();
    let symbol = KiSymbol {
        name: "DUMP".to_string(),
        reference: "U".to_string(),
        metadata: DeviceMetadata::default(),
        drawing,
    };
    let json: serde_json::Value = serde_json::from_str(&symbol.to_json().unwrap()).unwrap();
    assert_eq!(json["name"], "DUMP");
    assert_eq!(json["drawing"]["canvas"]["grid_unit"], GRID_UNIT);

    let pins = json["drawing"]["pins"].as_array().unwrap();
    assert_eq!(pins.len(), 2);
    let pa0 = pins.iter().find(|p| p["pin"]["name"] == "PA0").unwrap();
    assert_eq!(pa0["edge"], "Right");
    assert_eq!(pa0["pin"]["role"], "Input");
    let placed = find(&symbol.drawing, "PA0");
    assert_eq!(pa0["pos"], serde_json::json!([placed.pos.x, placed.pos.y]));
}

#[test]
fn test_kicad_entry_scenario_coordinates() {
    let drawing = build_symbol(pins(&[
        ("1", "GND", "Power"),
        ("2", "VDD", "Power"),
        ("3", "RESET", "Reset"),
        ("4", "PA0", "Input"),
    ]))
    .unwrap();
    let symbol = KiSymbol {
        name: "SCENARIO".to_string(),
        reference: "U".to_string(),
        metadata: DeviceMetadata::default(),
        drawing,
    };
    let entry = symbol.to_kicad_lib_entry();
    // RESET at (-500, 100) mil
    assert!(entry.contains("(pin input line (at -12.7 2.54 0) (length 5.08)"), "{}", entry);
    // VDD at (100, 400) mil pointing down
    assert!(entry.contains("(pin power_in line (at 2.54 10.16 270)"), "{}", entry);
}
