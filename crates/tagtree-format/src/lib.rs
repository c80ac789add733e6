#![doc = include_str!("../README.md")]

mod options;
mod writer;

pub use options::FormatOptions;
pub use writer::ElementWriter;

use std::io;

use tagtree_tree::Element;

/// Write `element` to `sink` with default options.
pub fn write_element<W: io::Write>(element: &Element<'_>, sink: W) -> io::Result<()> {
    write_element_with(element, sink, FormatOptions::default())
}

/// Write `element` to `sink`.
pub fn write_element_with<W: io::Write>(
    element: &Element<'_>,
    sink: W,
    options: FormatOptions,
) -> io::Result<()> {
    ElementWriter::with_options(sink, options).write(element)
}

/// Serialize `element` to a string with default options.
///
/// Bytes that are not valid UTF-8 are replaced with U+FFFD.
pub fn to_string(element: &Element<'_>) -> String {
    to_string_with(element, FormatOptions::default())
}

/// Serialize `element` to a string.
pub fn to_string_with(element: &Element<'_>, options: FormatOptions) -> String {
    let mut writer = ElementWriter::with_options(Vec::new(), options);
    if let Err(err) = writer.write(element) {
        unreachable!("writing to a Vec cannot fail: {err}");
    }
    String::from_utf8_lossy(&writer.into_inner()).into_owned()
}
