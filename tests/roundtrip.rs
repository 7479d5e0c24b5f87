use valvegen::{
    mesher,
    serializer::{self, format_sci},
    GeneratorConfig, Severity, SeverityTable, ValveError,
};

fn written(value: f64) -> f64 {
    format_sci(value).parse().unwrap()
}

#[test]
fn written_model_reads_back_identically() {
    let dir = tempfile::tempdir().unwrap();
    let table = SeverityTable::standard();

    for severity in Severity::ALL {
        let config = GeneratorConfig::with_resolution(24);
        let model = mesher::run(&config, table.get(severity)).unwrap();

        let prefix = dir
            .path()
            .join(serializer::output_prefix("valve2d", severity, 24));
        let files = serializer::write_model(&prefix, &model).unwrap();

        let vertices = serializer::read_vertices(&files.vertex).unwrap();
        let springs = serializer::read_springs(&files.spring).unwrap();
        let beams = serializer::read_beams(&files.beam).unwrap();

        assert_eq!(vertices.len(), model.vertices().len());
        for (read, original) in vertices.iter().zip(model.vertices()) {
            assert_eq!(read.index, original.index);
            assert_eq!(read.position.x, written(original.position.x));
            assert_eq!(read.position.y, written(original.position.y));
        }

        // stiffness, rigidity and damping are exactly representable in six digits
        assert_eq!(springs, model.springs());
        assert_eq!(beams, model.beams());
    }
}

#[test]
fn healthy_four_point_files_match_expected_text() {
    let dir = tempfile::tempdir().unwrap();
    let table = SeverityTable::standard();
    let mut config = GeneratorConfig::with_resolution(4);
    config.annulus_radius = 1.0;
    config.leaflet_length = 1.2;

    let model = mesher::run(&config, table.lookup("healthy").unwrap()).unwrap();
    let summary = model.summary();
    assert_eq!(summary.vertices, 12);
    assert_eq!(summary.longitudinal_springs, 9);
    assert_eq!(summary.cross_springs, 6);
    assert_eq!(summary.springs, 15);
    assert_eq!(summary.beams, 6);

    let files = serializer::write_model(dir.path().join("valve"), &model).unwrap();

    let vertex_text = std::fs::read_to_string(&files.vertex).unwrap();
    let mut lines = vertex_text.lines();
    assert_eq!(lines.next(), Some("12"));
    assert_eq!(lines.next(), Some("1.000000e+00\t0.000000e+00"));
    assert_eq!(vertex_text.lines().count(), 13);

    let spring_text = std::fs::read_to_string(&files.spring).unwrap();
    let spring_lines: Vec<&str> = spring_text.lines().collect();
    assert_eq!(spring_lines[0], "15");
    assert_eq!(spring_lines[1], "     0      1 5.000000e+02 0.000000e+00");
    assert_eq!(spring_lines[10], "     0      1 2.500000e+02 0.000000e+00");
    assert_eq!(spring_lines[15], "     9     10 2.500000e+02 0.000000e+00");

    let beam_text = std::fs::read_to_string(&files.beam).unwrap();
    let beam_lines: Vec<&str> = beam_text.lines().collect();
    assert_eq!(beam_lines.len(), 7);
    assert_eq!(beam_lines[0], "6");
    assert_eq!(beam_lines[6], "     9     10     11 1.000000e-02");
}

#[test]
fn unknown_severity_produces_nothing() {
    let table = SeverityTable::standard();
    assert!(matches!(
        table.lookup("unknown"),
        Err(ValveError::UnknownSeverity(_))
    ));
}

#[test]
fn missing_files_report_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.vertex");
    match serializer::read_vertices(&path) {
        Err(ValveError::Io { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("expected Io error, got {other:?}"),
    }
}
