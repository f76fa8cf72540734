#![allow(clippy::unwrap_used)]

use gofill_core::Indexer;
use gofill_core::IndexerConfig;
use gofill_core::PackageCatalog;
use gofill_core::QueryEngine;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// Marks the cursor in test snippets.
pub const CURSOR: char = '‸';

const FMT_PRINT: &str = r#"// Package fmt implements formatted I/O with functions analogous
// to C's printf and scanf.
package fmt

import "io"

// Stringer is implemented by any value that has a String method.
type Stringer interface {
	String() string
}

type GoStringer interface {
	GoString() string
}

type Formatter interface {
	Format(f State, verb rune)
}

type State interface {
	Write(b []byte) (n int, err error)
}

type pp struct {
	buf []byte
}

func (p *pp) Write(b []byte) (ret int, err error) {
	return 0, nil
}

func newPrinter() *pp {
	return new(pp)
}

// Errorf formats according to a format specifier and returns the string
// as a value that satisfies error.
func Errorf(format string, a ...any) error { return nil }

func Fprint(w io.Writer, a ...any) (n int, err error)                 { return }
func Fprintf(w io.Writer, format string, a ...any) (n int, err error) { return }
func Fprintln(w io.Writer, a ...any) (n int, err error)               { return }

// Print formats using the default formats for its operands and writes to
// standard output.
func Print(a ...any) (n int, err error) { return }

func Printf(format string, a ...any) (n int, err error) { return }

// Println formats using the default formats for its operands and writes to
// standard output.
func Println(a ...any) (n int, err error) { return }

func println() {}

func Sprint(a ...any) string                 { return "" }
func Sprintf(format string, a ...any) string { return "" }
func Sprintln(a ...any) string               { return "" }
"#;

const FMT_SCAN: &str = r#"package fmt

import "io"

type ScanState interface {
	ReadRune() (r rune, size int, err error)
}

type Scanner interface {
	Scan(state ScanState, verb rune) error
}

func Scan(a ...any) (n int, err error)                            { return }
func Scanf(format string, a ...any) (n int, err error)            { return }
func Scanln(a ...any) (n int, err error)                          { return }
func Sscan(str string, a ...any) (n int, err error)               { return }
func Sscanf(str string, format string, a ...any) (n int, err error) { return }
func Sscanln(str string, a ...any) (n int, err error)             { return }
func Fscan(r io.Reader, a ...any) (n int, err error)              { return }
func Fscanf(r io.Reader, format string, a ...any) (n int, err error) { return }
func Fscanln(r io.Reader, a ...any) (n int, err error)            { return }

var errComplex = 1
"#;

const FMT_TEST: &str = r#"package fmt_test

func TestPrintHelper() {}
"#;

const FMT_GENERATOR: &str = r#"// Copyright 2024 The Go Authors.

//go:build ignore

// This program generates the verb tables.
package main

func main() {}

func Generated() {}
"#;

const FMT_PLAN9: &str = "package fmt\n\nfunc Plan9Only() {}\n";

const FLAG: &str = r#"// Package flag implements command-line flag parsing.
package flag

var CommandLine = NewFlagSet()

func Parse() {}

func NewFlagSet() *FlagSet { return nil }

type FlagSet struct{}
"#;

const FILE: &str = "package file\n\nfunc Open() {}\n";

const FILEPATH: &str = r#"package filepath

// Separator is the OS-specific path separator.
const (
	Separator     = '/'
	ListSeparator = ':'
)

func Join(elem ...string) string { return "" }
"#;

const FAKEPKG: &str = "package fakepkg\n";

const HTML_TEMPLATE: &str = "package template\n\ntype HTML string\n\nfunc Compile() {}\n";

const TEXT_TEMPLATE: &str = "package template\n\nfunc Clone() {}\n";

const AX: &str = "package x\n\nfunc Y() {}\n";

const BX: &str = "package x\n\nfunc Yes() {}\n";

const CONTAINER_LIST: &str = "package list\n\ntype List struct{}\n";

const BROKEN: &str = "package broken\n\nfunc Half( {\n";

fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

/// A small package tree shaped like `$GOROOT/src`.
pub fn fixture_tree() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();

    write(root, "fmt/print.go", FMT_PRINT);
    write(root, "fmt/scan.go", FMT_SCAN);
    write(root, "fmt/print_test.go", FMT_TEST);
    write(root, "fmt/mkverbs.go", FMT_GENERATOR);
    write(root, "fmt/print_plan9.go", FMT_PLAN9);
    write(root, "flag/flag.go", FLAG);
    write(root, "file/file.go", FILE);
    write(root, "path/filepath/path.go", FILEPATH);
    write(root, "fake/go-fakepkg/fake.go", FAKEPKG);
    write(root, "html/template/content.go", HTML_TEMPLATE);
    write(root, "text/template/exec.go", TEXT_TEMPLATE);
    write(root, "a/x/x.go", AX);
    write(root, "b/x/x.go", BX);
    write(root, "container/list/list.go", CONTAINER_LIST);
    write(root, "broken/broken.go", BROKEN);
    write(root, "fmt/testdata/data.go", "package data\n\nfunc Data() {}\n");
    write(root, ".hidden/h.go", "package hidden\n\nfunc Hidden() {}\n");

    dir
}

pub fn fixture_catalog() -> PackageCatalog {
    let dir = fixture_tree();
    Indexer::new(IndexerConfig::default()).build(dir.path())
}

pub fn fixture_engine() -> QueryEngine {
    QueryEngine::new(Arc::new(fixture_catalog()))
}

/// Remove the cursor marker and return the text with its byte offset.
pub fn split_cursor(src: &str) -> (String, usize) {
    let offset = src
        .find(CURSOR)
        .unwrap_or_else(|| panic!("no cursor marker in {src:?}"));
    (src.replacen(CURSOR, "", 1), offset)
}

/// Suggested names for a snippet with a cursor marker.
pub fn suggest(engine: &QueryEngine, src: &str) -> Vec<String> {
    let (text, offset) = split_cursor(src);
    engine
        .query(&text, offset)
        .suggestions
        .into_iter()
        .map(|s| s.name)
        .collect()
}
