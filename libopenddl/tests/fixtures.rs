//! Test harness for the OpenDDL parser against fixture files.
//!
//! Every `test/ddl/*.ddl` document is parsed and its outline is compared with
//! `test/tree/<name>.tree`. Documents under `test/diag/` are malformed on
//! purpose: their diagnostics are compared with `<name>.log` and the tree
//! that survives recovery with `<name>.tree`.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use libopenddl::{
    format_document, parse_str, Context, LogCallback, NameScope, OpenDdlParser, Payload, Severity,
    Value, ValueType,
};

/// Root test directory.
fn test_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .join("test")
}

/// All files matching `pattern` below test/, sorted.
fn fixture_files(pattern: &str) -> Vec<PathBuf> {
    let pattern = test_root().join(pattern);
    let mut files: Vec<PathBuf> = glob::glob(&pattern.to_string_lossy())
        .unwrap()
        .flatten()
        .collect();
    files.sort();
    files
}

/// Read the sibling fixture `<dir>/<stem>.<ext>`.
fn read_expected(path: &Path, dir: &str, ext: &str) -> Option<String> {
    let stem = path.file_stem()?.to_string_lossy();
    fs::read_to_string(test_root().join(dir).join(format!("{}.{}", stem, ext))).ok()
}

/// A sink that keeps `severity: message` lines.
fn recording() -> (LogCallback, Arc<Mutex<Vec<String>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let log: LogCallback = Arc::new(move |severity: Severity, msg: &str| {
        sink.lock().unwrap().push(format!("{}: {}", severity, msg));
    });
    (log, seen)
}

fn silent() -> LogCallback {
    Arc::new(|_: Severity, _: &str| {})
}

/// Parse a fixture file, returning the context and the diagnostics.
fn parse_file(path: &Path) -> Result<(Context, Vec<String>), String> {
    let bytes = fs::read(path).map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    let (log, seen) = recording();

    let mut parser = OpenDdlParser::new();
    parser.set_log_callback(Some(log));
    parser.set_owned_buffer(bytes);
    if !parser.parse() {
        return Err(format!("{}: nothing to parse", path.display()));
    }
    let context = parser
        .take_context()
        .ok_or_else(|| format!("{}: no tree after parse", path.display()))?;
    let diagnostics = seen.lock().unwrap().clone();
    Ok((context, diagnostics))
}

fn compare(filename: &str, what: &str, expected: &str, actual: &str) -> Result<(), String> {
    if expected.trim_end() == actual.trim_end() {
        return Ok(());
    }
    Err(format!(
        "{}: {} mismatch\n    expected:\n{}\n    actual:\n{}",
        filename,
        what,
        expected.trim_end(),
        actual.trim_end()
    ))
}

/// Run a single well-formed document.
fn run_ddl_test(path: &Path) -> Result<(), String> {
    let filename = path.file_name().unwrap().to_string_lossy().to_string();
    let (context, diagnostics) = parse_file(path)?;

    if !diagnostics.is_empty() {
        return Err(format!(
            "{}: unexpected diagnostics:\n    {}",
            filename,
            diagnostics.join("\n    ")
        ));
    }

    let actual = format_document(&context);
    match read_expected(path, "tree", "tree") {
        Some(expected) => compare(&filename, "tree", &expected, &actual)?,
        None => println!("  {} => (no expected tree)\n{}", filename, actual),
    }
    println!("  {} => OK", filename);
    Ok(())
}

/// Run a single malformed document.
fn run_diag_test(path: &Path) -> Result<(), String> {
    let filename = path.file_name().unwrap().to_string_lossy().to_string();
    let (context, diagnostics) = parse_file(path)?;

    if diagnostics.is_empty() {
        return Err(format!("{}: expected diagnostics, got none", filename));
    }
    let actual_log = diagnostics.join("\n");
    match read_expected(path, "diag", "log") {
        Some(expected) => compare(&filename, "log", &expected, &actual_log)?,
        None => println!("  {} => (no .log file to compare)\n{}", filename, actual_log),
    }
    if let Some(expected) = read_expected(path, "diag", "tree") {
        compare(&filename, "tree", &expected, &format_document(&context))?;
    }
    println!("  {} => {} diagnostics (as expected)", filename, diagnostics.len());
    Ok(())
}

fn run_all(kind: &str, files: &[PathBuf], run: fn(&Path) -> Result<(), String>) {
    assert!(!files.is_empty(), "No {} fixtures found!", kind);
    println!("\nRunning {} {} fixtures:", files.len(), kind);

    let mut passed = 0;
    let mut errors: Vec<String> = Vec::new();
    for file in files {
        match run(file) {
            Ok(()) => passed += 1,
            Err(e) => errors.push(e),
        }
    }

    println!("\nResults: {} passed, {} failed", passed, errors.len());
    if !errors.is_empty() {
        println!("\nErrors:");
        for error in &errors {
            println!("  - {}", error);
        }
    }
    assert!(errors.is_empty(), "{} {} fixtures failed", errors.len(), kind);
}

#[test]
fn test_all_ddl_fixtures() {
    run_all("ddl", &fixture_files("ddl/*.ddl"), run_ddl_test);
}

#[test]
fn test_all_diag_fixtures() {
    run_all("diag", &fixture_files("diag/*.ddl"), run_diag_test);
}

// Individual test cases

fn parse(text: &str) -> Context {
    parse_str(text, silent()).unwrap()
}

#[test]
fn test_property_attaches_to_structure() {
    let ctx = parse("T (k = 5) { }");
    let t = ctx.root().child(0).unwrap();
    assert_eq!(t.properties().len(), 1);
    assert_eq!(t.properties()[0].key.as_str(), "k");
    assert_eq!(t.properties()[0].data(), Some(&Value::Int32(5)));
    assert!(ctx.properties.is_empty());
}

#[test]
fn test_metric_properties_attach_to_context() {
    let ctx = parse("Metric (key = \"distance\") { float { 1.0 } }");
    let metric = ctx.root().child(0).unwrap();
    assert!(metric.properties().is_empty());
    assert_eq!(ctx.properties.len(), 1);
    assert_eq!(
        ctx.property("key").and_then(|p| p.data()).and_then(Value::as_str),
        Some("distance")
    );
}

#[test]
fn test_flat_list_keeps_count_and_order() {
    let ctx = parse("V { int32 { 5, 4, 3, 2, 1 } }");
    let payload = ctx.root().child(0).unwrap().payload().unwrap();
    let values: Vec<i64> = payload.values().unwrap().iter().filter_map(Value::as_i64).collect();
    assert_eq!(values, [5, 4, 3, 2, 1]);
}

#[test]
fn test_array_list_keeps_every_tuple() {
    let ctx = parse("V { float[3] { {1, 2, 3}, {4, 5} } }");
    match ctx.root().child(0).unwrap().payload().unwrap() {
        Payload::Array {
            value_type,
            width,
            entries,
        } => {
            assert_eq!(*value_type, ValueType::Float);
            assert_eq!(*width, 3);
            assert_eq!(entries.len(), 2);
            assert_eq!(entries[1], vec![Value::Float(4.0), Value::Float(5.0)]);
        }
        other => panic!("expected an array payload, got {:?}", other),
    }
}

#[test]
fn test_single_tuple_of_floats() {
    let ctx = parse("Position { float[3] { {1,2,3} } }");
    let payload = ctx.root().child(0).unwrap().payload().unwrap();
    assert_eq!(
        payload.entries().unwrap(),
        [vec![Value::Float(1.0), Value::Float(2.0), Value::Float(3.0)]]
    );
}

#[test]
fn test_hex_literals() {
    let ctx = parse("Mask { int32 { 0x1A, 0xFF } }");
    let payload = ctx.root().child(0).unwrap().payload().unwrap();
    assert_eq!(payload.values().unwrap(), [Value::Int32(26), Value::Int32(255)]);
}

#[test]
fn test_boolean_literals() {
    let ctx = parse("Flags { bool { true, false, yes } }");
    let payload = ctx.root().child(0).unwrap().payload().unwrap();
    assert_eq!(payload.values().unwrap(), [Value::Bool(true), Value::Bool(false)]);
}

#[test]
fn test_comment_matches_blank_line() {
    let commented = parse("// c\nNode {}");
    let blank = parse("\nNode {}");
    assert_eq!(format_document(&commented), format_document(&blank));
    assert_eq!(commented.tree, blank.tree);
}

#[test]
fn test_nested_parents() {
    let ctx = parse("A { B { } }");
    let root = ctx.root();
    let a = root.child(0).unwrap();
    let b = a.child(0).unwrap();
    assert_eq!(a.node_type(), "A");
    assert_eq!(b.node_type(), "B");
    assert_eq!(b.parent().unwrap().id(), a.id());
    assert_eq!(a.parent().unwrap().id(), root.id());
    assert_eq!(b.depth(), 2);
}

#[test]
fn test_global_name() {
    let ctx = parse("Cube $box { }");
    let cube = ctx.root().child(0).unwrap();
    assert_eq!(cube.node_type(), "Cube");
    assert_eq!(cube.name(), "box");
    assert_eq!(cube.scoped_name().unwrap().scope, NameScope::Global);
}

#[test]
fn test_siblings_after_deep_nesting() {
    let ctx = parse("A { B { C { D { } } } E { } } F { }");
    let root = ctx.root();
    let kids: Vec<_> = root.children().map(|n| n.node_type()).collect();
    assert_eq!(kids, ["A", "F"]);

    let a = root.child(0).unwrap();
    let kids: Vec<_> = a.children().map(|n| n.node_type()).collect();
    assert_eq!(kids, ["B", "E"]);
    assert_eq!(a.child(1).unwrap().parent().unwrap().id(), a.id());

    let d = a.child(0).and_then(|b| b.child(0)).and_then(|c| c.child(0)).unwrap();
    assert_eq!(d.node_type(), "D");
    assert_eq!(d.depth(), 4);
}

#[test]
fn test_sessions_on_separate_threads() {
    let inputs = ["A { B { } }", "C $c { int8 { 1, 2 } } D { }"];
    let outlines: Vec<String> = std::thread::scope(|scope| {
        let handles: Vec<_> = inputs
            .iter()
            .map(|text| {
                scope.spawn(move || {
                    let mut parser = OpenDdlParser::new();
                    parser.set_log_callback(Some(silent()));
                    parser.set_owned_buffer(text.as_bytes().to_vec());
                    assert!(parser.parse());
                    format_document(parser.context().unwrap())
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(outlines[0], "root\n  A\n    B\n");
    assert_eq!(outlines[1], "root\n  C $c\n    int8 {1, 2}\n  D\n");
}

#[test]
fn test_empty_input_fails() {
    assert!(parse_str("", silent()).is_none());
}
