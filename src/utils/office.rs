//! Plain text from Office Open XML packages (`.docx`, `.pptx`).
//!
//! Both formats are zip archives of XML parts. Only the text runs are read;
//! styling, images and embedded objects are ignored.

use std::io::{Cursor, Read, Seek};

use quick_xml::events::Event;
use quick_xml::Reader;
use zip::ZipArchive;

/// Local file header signature every zip archive starts with.
pub const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

#[derive(Debug, thiserror::Error)]
pub enum OfficeError {
    #[error("not a valid Office archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("unreadable document XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("unreadable archive entry: {0}")]
    Io(#[from] std::io::Error),

    #[error("archive has no {0} part")]
    MissingPart(&'static str),
}

/// Element names that carry text in one flavour of the markup.
struct Markup {
    text: &'static [u8],
    paragraph: &'static [u8],
    tab: &'static [u8],
    line_break: &'static [u8],
}

const WORDPROCESSING: Markup = Markup {
    text: b"w:t",
    paragraph: b"w:p",
    tab: b"w:tab",
    line_break: b"w:br",
};

const DRAWING: Markup = Markup {
    text: b"a:t",
    paragraph: b"a:p",
    tab: b"a:tab",
    line_break: b"a:br",
};

pub fn docx_text(data: &[u8]) -> Result<String, OfficeError> {
    let mut archive = ZipArchive::new(Cursor::new(data))?;
    let xml = read_part(&mut archive, "word/document.xml")?;
    xml_text(&xml, &WORDPROCESSING)
}

/// Slides are read in presentation order (`slide1.xml`, `slide2.xml`, ...),
/// separated by a blank line.
pub fn pptx_text(data: &[u8]) -> Result<String, OfficeError> {
    let mut archive = ZipArchive::new(Cursor::new(data))?;
    let mut slides: Vec<(u32, String)> = archive
        .file_names()
        .filter_map(|name| slide_number(name).map(|n| (n, name.to_string())))
        .collect();
    if slides.is_empty() {
        return Err(OfficeError::MissingPart("ppt/slides"));
    }
    slides.sort();

    let mut texts = Vec::with_capacity(slides.len());
    for (_, name) in slides {
        let xml = read_part(&mut archive, &name)?;
        let text = xml_text(&xml, &DRAWING)?;
        if !text.is_empty() {
            texts.push(text);
        }
    }
    Ok(texts.join("\n\n"))
}

fn slide_number(name: &str) -> Option<u32> {
    name.strip_prefix("ppt/slides/slide")?
        .strip_suffix(".xml")?
        .parse()
        .ok()
}

fn read_part<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<String, OfficeError> {
    let mut part = archive.by_name(name)?;
    let mut xml = String::new();
    part.read_to_string(&mut xml)?;
    Ok(xml)
}

fn xml_text(xml: &str, markup: &Markup) -> Result<String, OfficeError> {
    let mut reader = Reader::from_str(xml);
    let mut out = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) if e.name().as_ref() == markup.text => in_text = true,
            Event::End(e) if e.name().as_ref() == markup.text => in_text = false,
            Event::End(e) if e.name().as_ref() == markup.paragraph => out.push('\n'),
            Event::Empty(e) if in_text_run(&out) && e.name().as_ref() == markup.tab => out.push('\t'),
            Event::Empty(e) if e.name().as_ref() == markup.line_break => out.push('\n'),
            Event::Text(t) if in_text => out.push_str(&t.unescape()?),
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(out
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n"))
}

/// Tab stops declared in paragraph properties come before any text; only
/// tabs after text on the current line are content.
fn in_text_run(out: &str) -> bool {
    !out.ends_with('\n') && !out.is_empty()
}

/// Zips `(path, xml)` parts into an in-memory package.
#[cfg(test)]
pub(crate) fn package(parts: &[(&str, &str)]) -> Vec<u8> {
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, body) in parts {
        writer.start_file(*name, SimpleFileOptions::default()).unwrap();
        writer.write_all(body.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}
