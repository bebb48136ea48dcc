use std::fs;

use pretty_assertions::assert_eq;
use tempfile::tempdir;
use vmil_translator::{
    io::{discover, DirectorySource, FileSink, OutputMode},
    LinkOptions, Linker, TranslateError,
};

fn read_lines(path: &std::path::Path) -> Vec<String> {
    fs::read_to_string(path)
        .expect("output should exist")
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn directory_input_discovers_sorted_modules() {
    let dir = tempdir().expect("failed to create temp dir");
    let program = dir.path().join("Prog");
    fs::create_dir(&program).unwrap();
    fs::write(program.join("Sys.vm"), "function Sys.init 0\n").unwrap();
    fs::write(program.join("Main.vm"), "function Main.main 0\n").unwrap();
    fs::write(program.join("notes.txt"), "not code\n").unwrap();

    let discovered = discover(&program).unwrap();
    assert_eq!(discovered.modules, vec!["Main", "Sys"]);
    assert_eq!(discovered.root, program);
    assert_eq!(discovered.default_output, program.join("Prog.asm"));
    assert!(discovered.is_directory);
}

#[test]
fn file_input_translates_next_to_itself() {
    let dir = tempdir().expect("failed to create temp dir");
    let file = dir.path().join("Simple.vm");
    fs::write(&file, "push constant 1\n").unwrap();

    let discovered = discover(&file).unwrap();
    assert_eq!(discovered.modules, vec!["Simple"]);
    assert_eq!(discovered.root, dir.path());
    assert_eq!(discovered.default_output, dir.path().join("Simple.asm"));
    assert!(!discovered.is_directory);
}

#[test]
fn dotted_names_keep_every_part() {
    let dir = tempdir().expect("failed to create temp dir");
    let program = dir.path().join("prog.v2");
    fs::create_dir(&program).unwrap();
    fs::write(program.join("Main.test.vm"), "push constant 5\n").unwrap();
    fs::write(program.join("Main.vm"), "push constant 9\n").unwrap();

    let discovered = discover(&program).unwrap();
    assert_eq!(discovered.modules, vec!["Main", "Main.test"]);
    assert_eq!(discovered.default_output, program.join("prog.v2.asm"));

    let source = DirectorySource::new(&discovered.root);
    assert_eq!(source.path_of("Main.test"), program.join("Main.test.vm"));
    let output = Linker::new(LinkOptions::default())
        .link(&source, &["Main.test"])
        .unwrap();
    assert_eq!(output[0], "// push constant 5");

    let single = discover(&program.join("Main.test.vm")).unwrap();
    assert_eq!(single.default_output, program.join("Main.test.asm"));
}

#[test]
fn missing_input_is_reported() {
    let dir = tempdir().expect("failed to create temp dir");
    assert!(matches!(
        discover(&dir.path().join("Nope.vm")),
        Err(TranslateError::InputNotFound { .. })
    ));
    assert!(matches!(
        discover(dir.path()),
        Err(TranslateError::InputNotFound { .. })
    ));
}

#[test]
fn truncate_replaces_and_append_accumulates() {
    let dir = tempdir().expect("failed to create temp dir");
    fs::write(dir.path().join("Main.vm"), "push constant 1 // one\n").unwrap();
    let source = DirectorySource::new(dir.path());
    let out = dir.path().join("Main.asm");

    for _ in 0..2 {
        let mut sink = FileSink::new(&out, OutputMode::Truncate);
        let written = Linker::new(LinkOptions::default())
            .run(&source, &["Main"], &mut sink)
            .unwrap();
        assert_eq!(written, 7);
    }
    let once = read_lines(&out);
    assert_eq!(once.len(), 7);
    assert_eq!(once[0], "// push constant 1");

    let mut sink = FileSink::new(&out, OutputMode::Append);
    Linker::new(LinkOptions::default())
        .run(&source, &["Main"], &mut sink)
        .unwrap();
    assert_eq!(read_lines(&out).len(), 14);
}

#[test]
fn failed_translation_writes_nothing() {
    let dir = tempdir().expect("failed to create temp dir");
    fs::write(dir.path().join("Main.vm"), "push constant 1\nmul\n").unwrap();
    let out = dir.path().join("Main.asm");
    let mut sink = FileSink::new(&out, OutputMode::Truncate);

    let err = Linker::new(LinkOptions::default())
        .run(&DirectorySource::new(dir.path()), &["Main"], &mut sink)
        .unwrap_err();
    assert!(matches!(err, TranslateError::Line { line_number: 2, .. }));
    assert!(!out.exists());
}

#[test]
fn unwritable_output_is_reported() {
    let dir = tempdir().expect("failed to create temp dir");
    fs::write(dir.path().join("Main.vm"), "push constant 1\n").unwrap();
    // A directory cannot be opened as an output file.
    let mut sink = FileSink::new(dir.path(), OutputMode::Truncate);

    let err = Linker::new(LinkOptions::default())
        .run(&DirectorySource::new(dir.path()), &["Main"], &mut sink)
        .unwrap_err();
    assert!(matches!(err, TranslateError::OutputWriteFailure { .. }));
}
