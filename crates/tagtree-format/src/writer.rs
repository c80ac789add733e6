//! Indented element writer.

use std::io::{self, Write};

use tagtree_tree::{Element, ensure_sufficient_stack};
use tracing::trace;

use crate::options::FormatOptions;

/// Writes element trees to an [`io::Write`] sink as indented markup.
///
/// Each element is written as `<name key="value">`, its text, its children
/// one per line, then `</name>`. Elements with neither children nor text
/// are written as `<name />`. Nothing is written after the root's closing
/// tag, not even a newline.
pub struct ElementWriter<W> {
    sink: W,
    options: FormatOptions,
    depth: usize,
}

impl<W: Write> ElementWriter<W> {
    /// Create a new writer with default options.
    pub fn new(sink: W) -> Self {
        Self::with_options(sink, FormatOptions::default())
    }

    /// Create a new writer with the given options.
    pub fn with_options(sink: W, options: FormatOptions) -> Self {
        Self {
            sink,
            options,
            depth: 0,
        }
    }

    /// Consume the writer and return the sink.
    pub fn into_inner(self) -> W {
        self.sink
    }

    /// Write `element` and everything below it.
    ///
    /// The first error from the sink is returned as is; output written
    /// before it is not rolled back.
    pub fn write(&mut self, element: &Element<'_>) -> io::Result<()> {
        self.depth = 0;
        self.write_element(element)
    }

    fn write_element(&mut self, element: &Element<'_>) -> io::Result<()> {
        trace!(name = %element.name_str(), depth = self.depth, "Writing element");
        self.sink.write_all(b"<")?;
        self.sink.write_all(element.name())?;

        if !element.attributes.is_empty() {
            self.sink.write_all(b" ")?;
            for (i, (key, value)) in element.attributes.iter().enumerate() {
                if i > 0 {
                    self.sink.write_all(b" ")?;
                }
                self.sink.write_all(key)?;
                self.sink.write_all(b"=\"")?;
                self.sink.write_all(value)?;
                self.sink.write_all(b"\"")?;
            }
        }

        if element.is_empty() {
            return self.sink.write_all(b" />");
        }

        self.sink.write_all(b">")?;
        self.depth += 1;
        self.write_newline()?;
        self.sink.write_all(element.text())?;
        for (i, child) in element.children.iter().enumerate() {
            if i > 0 {
                self.write_newline()?;
            }
            ensure_sufficient_stack(|| self.write_element(child))?;
        }
        self.depth -= 1;
        self.write_newline()?;

        self.sink.write_all(b"</")?;
        self.sink.write_all(element.name())?;
        self.sink.write_all(b">")
    }

    fn write_newline(&mut self) -> io::Result<()> {
        self.sink.write_all(b"\n")?;
        for _ in 0..self.depth {
            self.sink.write_all(self.options.indent.as_bytes())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facet_testhelpers::test;

    fn element(name: &'static str) -> Element<'static> {
        Element::new(name.as_bytes())
    }

    fn render(element: &Element<'_>, options: FormatOptions) -> String {
        let mut writer = ElementWriter::with_options(Vec::new(), options);
        writer.write(element).unwrap();
        String::from_utf8(writer.into_inner()).unwrap()
    }

    #[test]
    fn test_empty_element_self_closes() {
        let out = render(&element("a"), FormatOptions::default());
        insta::assert_snapshot!(out, @"<a />");
    }

    #[test]
    fn test_attribute_on_empty_element() {
        let mut a = element("a");
        a.set_attribute(&b"x"[..], "1");
        let out = render(&a, FormatOptions::default());
        insta::assert_snapshot!(out, @r#"<a x="1" />"#);
    }

    #[test]
    fn test_text_only() {
        let mut p = element("p");
        p.append_text(b"hello");
        p.append_text(b"world");
        let out = render(&p, FormatOptions::default());
        assert_eq!(out, "<p>\n\thello world\n</p>");
    }

    #[test]
    fn test_nested_default_indent() {
        let mut b = element("b");
        b.push_child(element("c"));
        let mut a = element("a");
        a.push_child(b);
        a.push_child(element("d"));
        let out = render(&a, FormatOptions::default());
        assert_eq!(out, "<a>\n\t<b>\n\t\t<c />\n\t</b>\n\t<d />\n</a>");
    }

    #[test]
    fn test_custom_indent() {
        let mut b = element("b");
        b.append_text(b"inner");
        b.push_child(element("c"));
        let mut a = element("a");
        a.set_attribute(&b"id"[..], "root");
        a.append_text(b"lead");
        a.push_child(b);
        a.push_child(element("d"));
        let out = render(&a, FormatOptions::new().indent("  "));
        insta::assert_snapshot!(out, @r#"
<a id="root">
  lead<b>
    inner<c />
  </b>
  <d />
</a>
"#);
    }

    #[test]
    fn test_all_attributes_written() {
        let mut a = element("a");
        a.set_attribute(&b"x"[..], "1");
        a.set_attribute(&b"y"[..], "two words");
        a.set_attribute(&b"z"[..], "");
        let out = render(&a, FormatOptions::default());
        assert!(out.starts_with("<a "));
        assert!(out.ends_with(" />"));
        assert!(out.contains(r#"x="1""#));
        assert!(out.contains(r#"y="two words""#));
        assert!(out.contains(r#"z="""#));
        assert_eq!(out.matches(' ').count(), 5);
    }

    #[test]
    fn test_writer_is_reusable() {
        let mut writer = ElementWriter::new(Vec::new());
        writer.write(&element("a")).unwrap();
        writer.write(&element("b")).unwrap();
        assert_eq!(writer.into_inner(), b"<a /><b />");
    }

    #[test]
    fn test_sink_error_is_returned() {
        struct Full;

        impl Write for Full {
            fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::StorageFull, "sink full"))
            }

            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let err = ElementWriter::new(Full).write(&element("a")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::StorageFull);
    }

    #[test]
    fn test_deep_tree() {
        let mut root = element("n");
        for _ in 0..50_000 {
            let mut parent = element("n");
            parent.push_child(root);
            root = parent;
        }
        let mut writer = ElementWriter::with_options(Vec::new(), FormatOptions::new().indent(""));
        writer.write(&root).unwrap();
        let out = writer.into_inner();
        assert!(out.starts_with(b"<n>\n<n>"));
        assert!(out.ends_with(b"</n>\n</n>"));
    }
}
