//! Parse a markup file and print it back out, indented.
//!
//! ```text
//! cargo run -p tagtree-format --example reformat -- document.xml
//! cat document.xml | cargo run -p tagtree-format --example reformat
//! cargo run -p tagtree-format --example reformat -- --report document.xml
//! ```
//!
//! Prints one `message [line:column]` line per diagnostic, then the root's
//! attributes under an `ATTRIBUTES:` header, then the reformatted tree.
//! With `--report`, diagnostics are rendered as source-annotated reports
//! on stderr instead. Exits with status 1 if the input had problems.

use std::io::{self, Read, Write};
use std::process::ExitCode;

use tagtree_format::ElementWriter;

fn main() -> ExitCode {
    match run() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(2)
        }
    }
}

fn run() -> io::Result<bool> {
    let mut report = false;
    let mut path = None;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--report" => report = true,
            _ => path = Some(arg),
        }
    }

    let (filename, source) = match path {
        Some(path) => {
            let source = std::fs::read(&path)?;
            (path, source)
        }
        None => {
            let mut source = Vec::new();
            io::stdin().read_to_end(&mut source)?;
            ("<stdin>".to_string(), source)
        }
    };

    let parsed = tagtree_parse::parse(&source);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for diagnostic in &parsed.diagnostics {
        if report {
            eprint!("{}", diagnostic.render(&filename, &source));
        } else {
            writeln!(out, "{diagnostic}")?;
        }
    }

    writeln!(out, "ATTRIBUTES:")?;
    for (key, value) in parsed.root.attributes.sorted() {
        writeln!(
            out,
            "{}=\"{}\"",
            String::from_utf8_lossy(key),
            String::from_utf8_lossy(value)
        )?;
    }

    let mut writer = ElementWriter::new(&mut out);
    writer.write(&parsed.root)?;
    writeln!(out)?;
    out.flush()?;

    Ok(parsed.diagnostics.is_empty())
}
