use anyhow::{Context, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::Read;
use std::path::Path;

const BODY_PART: &str = "word/document.xml";

/// Extract the body text of a `.docx` file, one line per paragraph.
pub fn extract_text(path: &Path) -> Result<String> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let mut archive = zip::ZipArchive::new(file)
        .with_context(|| format!("{} is not a valid DOCX archive", path.display()))?;

    let mut xml = String::new();
    archive
        .by_name(BODY_PART)
        .with_context(|| format!("{} has no {BODY_PART}", path.display()))?
        .read_to_string(&mut xml)
        .context("Failed to read DOCX body")?;

    document_xml_to_text(&xml)
}

/// Walk WordprocessingML and keep the contents of `<w:t>` runs. Paragraph ends
/// become newlines; `<w:tab/>` and `<w:br/>` keep their whitespace.
pub(crate) fn document_xml_to_text(xml: &str) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    let mut out = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) if e.local_name().as_ref() == b"t" => in_text = true,
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" => out.push('\n'),
                _ => {}
            },
            Ok(Event::Empty(ref e)) => match e.local_name().as_ref() {
                b"tab" => out.push('\t'),
                b"br" | b"cr" => out.push('\n'),
                _ => {}
            },
            Ok(Event::Text(e)) if in_text => {
                out.push_str(&e.unescape().context("Invalid text in DOCX body")?);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Malformed DOCX XML at byte {}", reader.buffer_position())
                })
            }
            _ => {}
        }
    }

    Ok(out)
}
