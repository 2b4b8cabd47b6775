use sigdb::extract::SymbolExtractor;
use sigdb::extract::python::PythonExtractor;
use sigdb::model::{Member, Signature};
use std::path::PathBuf;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn function(params: &[&str]) -> Signature {
    Signature::Function(params.iter().map(|p| p.to_string()).collect())
}

#[test]
fn extracts_fixture_package() {
    let mut extractor = SymbolExtractor::new().unwrap();
    let (table, stats) = extractor
        .extract_dir_with_stats(&fixture_path("py_pkg"))
        .unwrap();

    assert_eq!(stats.files, 5);
    assert_eq!(stats.failed, 1);

    let mut names: Vec<_> = table.iter().map(|(name, _)| name.as_str()).collect();
    names.sort();
    assert_eq!(
        names,
        vec![
            "Client",
            "DEFAULT_TIMEOUT",
            "NAME",
            "RETRY_TIMEOUT",
            "__version__",
            "_private",
            "connect",
            "fetch",
        ]
    );
    assert_eq!(table.get("connect"), Some(&function(&["host", "port"])));
    assert_eq!(table.get("fetch"), Some(&function(&["url", "session"])));
    assert_eq!(table.get("__version__"), Some(&Signature::Variable));

    let Some(Signature::Class(members)) = table.get("Client") else {
        panic!("Client should be a class");
    };
    assert_eq!(members.len(), 3);
    assert_eq!(members.get("user_agent"), Some(&Member::Field));
    assert_eq!(
        members.get("__init__"),
        Some(&Member::Method(vec!["self".into(), "host".into(), "port".into()]))
    );
    assert_eq!(
        members.get("get"),
        Some(&Member::Method(vec!["self".into(), "path".into(), "params".into()]))
    );
}

#[test]
fn empty_directory_yields_empty_table() {
    let dir = tempfile::tempdir().unwrap();
    let mut extractor = SymbolExtractor::new().unwrap();
    assert!(extractor.extract_dir(dir.path()).unwrap().is_empty());
}

#[test]
fn first_file_in_walk_order_wins() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    std::fs::create_dir_all(root.join("pkg")).unwrap();
    std::fs::write(root.join("a.py"), "def foo(first, arg):\n    pass\n").unwrap();
    std::fs::write(root.join("b.py"), "def foo(second):\n    pass\n").unwrap();
    std::fs::write(root.join("pkg/a.py"), "def foo(nested):\n    pass\n").unwrap();

    let mut extractor = SymbolExtractor::new().unwrap();
    let table = extractor.extract_dir(root).unwrap();
    assert_eq!(table.get("foo"), Some(&function(&["first", "arg"])));

    std::fs::remove_file(root.join("a.py")).unwrap();
    let table = extractor.extract_dir(root).unwrap();
    assert_eq!(table.get("foo"), Some(&function(&["second"])));
}

#[test]
fn python2_module_does_not_shadow_later_files() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    std::fs::write(
        root.join("a_compat.py"),
        "def foo(legacy):\n    print 'py2 only'\n",
    )
    .unwrap();
    std::fs::write(root.join("b_impl.py"), "def foo(modern, arg):\n    pass\n").unwrap();

    let mut extractor = SymbolExtractor::new().unwrap();
    let (table, stats) = extractor.extract_dir_with_stats(root).unwrap();
    assert_eq!(table.get("foo"), Some(&function(&["modern", "arg"])));
    assert_eq!((stats.parsed, stats.failed), (1, 1));
}

#[test]
fn class_with_two_methods_and_a_field() {
    let source = r#"
class Greeter:
    greeting = "hello"

    def greet(self, name):
        return f"{self.greeting} {name}"

    def shout(self, name, times=2):
        return self.greet(name).upper() * times
"#;
    let mut extractor = PythonExtractor::new().unwrap();
    let table = extractor.extract(source).unwrap();

    let Some(Signature::Class(members)) = table.get("Greeter") else {
        panic!("Greeter should be a class");
    };
    assert_eq!(members.len(), 3);
    assert_eq!(members.get("greeting"), Some(&Member::Field));
    assert!(matches!(members.get("greet"), Some(Member::Method(p)) if p.len() == 2));
    assert!(matches!(members.get("shout"), Some(Member::Method(p)) if p.len() == 3));
}

#[test]
fn record_json_matches_table_shape() {
    let source = "VERSION = '1'\n\ndef noop():\n    pass\n\nclass Box:\n    size = 1\n";
    let mut extractor = PythonExtractor::new().unwrap();
    let table = extractor.extract(source).unwrap();
    let value = serde_json::to_value(&table).unwrap();
    assert_eq!(
        value,
        serde_json::json!({
            "Box": {"size": null},
            "VERSION": null,
            "noop": [],
        })
    );
}
