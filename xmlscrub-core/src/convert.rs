//! convert.rs - Conversion entry points: tokenizer in, rewritten XML out.
//!
//! This module owns the read loop. It drives a `quick-xml` pull reader,
//! translates its events into [`StreamRewriter`] calls, and coalesces
//! adjacent text-like events (text, entity references, CDATA) into single
//! chunks so content rules fire once per text node.
//!
//! License: MIT OR APACHE 2.0

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use log::warn;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::errors::ScrubError;
use crate::rewriter::StreamRewriter;
use crate::rules::RuleIndex;

/// Converts one XML document end-to-end against a borrowed rule index.
///
/// The index may be shared read-only across converters; each `convert`
/// call owns all per-document state.
#[derive(Debug, Clone, Copy)]
pub struct Converter<'r> {
    rules: &'r RuleIndex,
}

impl<'r> Converter<'r> {
    pub fn new(rules: &'r RuleIndex) -> Self {
        Self { rules }
    }

    /// Streams `input` through the rewriter onto `output`.
    ///
    /// Single pass, single attempt: any tokenizer error, structural error,
    /// or write failure aborts immediately and leaves the output in a
    /// partially-written state. Callers requiring atomicity should write
    /// to a temporary location and rename on success.
    pub fn convert<R: BufRead, W: Write>(&self, input: R, output: W) -> Result<W, ScrubError> {
        let mut reader = Reader::from_reader(input);
        reader.config_mut().trim_text(false);
        // Surface <a/> as start + end, the same shape the original SAX
        // stream had.
        reader.config_mut().expand_empty_elements = true;

        let mut rewriter = StreamRewriter::new(output, self.rules);
        rewriter.start_document()?;

        let mut buf = Vec::new();
        // Adjacent text, entity-reference, and CDATA events accumulate
        // here and flush as one chunk at the next markup event.
        let mut text = String::new();

        loop {
            let event = reader.read_event_into(&mut buf).map_err(|source| {
                ScrubError::Parse {
                    position: reader.buffer_position(),
                    source,
                }
            })?;

            match event {
                Event::Start(e) => {
                    flush_text(&mut rewriter, &mut text)?;
                    let name = decode_bytes(&reader, e.name().as_ref());
                    let attributes = decode_attributes(&reader, &e);
                    rewriter.start_element(&name, &attributes)?;
                }
                Event::End(e) => {
                    flush_text(&mut rewriter, &mut text)?;
                    let name = decode_bytes(&reader, e.name().as_ref());
                    rewriter.end_element(&name)?;
                }
                Event::Text(e) => {
                    text.push_str(&decode_bytes(&reader, &e));
                }
                Event::GeneralRef(e) => {
                    let entity = decode_bytes(&reader, &e);
                    text.push_str(&resolve_entity(&entity));
                }
                Event::CData(e) => {
                    text.push_str(&String::from_utf8_lossy(&e));
                }
                Event::PI(e) => {
                    flush_text(&mut rewriter, &mut text)?;
                    let target = decode_bytes(&reader, e.target());
                    let data = decode_bytes(&reader, e.content());
                    rewriter.processing_instruction(&target, &data)?;
                }
                // The rewriter emits its own prolog; comments and DOCTYPE
                // are not carried into the output.
                Event::Decl(_) | Event::Comment(_) | Event::DocType(_) => {}
                Event::Empty(e) => {
                    // Unreachable with expand_empty_elements, but harmless
                    // to honor if the reader configuration ever changes.
                    flush_text(&mut rewriter, &mut text)?;
                    let name = decode_bytes(&reader, e.name().as_ref());
                    let attributes = decode_attributes(&reader, &e);
                    rewriter.start_element(&name, &attributes)?;
                    rewriter.end_element(&name)?;
                }
                Event::Eof => {
                    flush_text(&mut rewriter, &mut text)?;
                    break;
                }
            }
            buf.clear();
        }

        rewriter.finish()
    }

    /// File-to-file convenience around [`Converter::convert`], with
    /// buffered I/O on both sides.
    pub fn convert_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input: P,
        output: Q,
    ) -> Result<(), ScrubError> {
        let reader = BufReader::new(File::open(input)?);
        let writer = BufWriter::new(File::create(output)?);
        let mut writer = self.convert(reader, writer)?;
        writer.flush()?;
        Ok(())
    }
}

/// One-shot, in-memory conversion of an XML string.
pub fn scrub_string(input: &str, rules: &RuleIndex) -> Result<String, ScrubError> {
    let output = Converter::new(rules).convert(input.as_bytes(), Vec::new())?;
    // The rewriter only ever writes escaped ASCII or decoded input text.
    Ok(String::from_utf8_lossy(&output).into_owned())
}

fn flush_text<W: Write>(
    rewriter: &mut StreamRewriter<'_, W>,
    text: &mut String,
) -> Result<(), ScrubError> {
    if !text.is_empty() {
        rewriter.text(text)?;
        text.clear();
    }
    Ok(())
}

/// Decodes raw tokenizer bytes, falling back to lossy UTF-8 if the
/// document encoding is broken rather than aborting the run.
fn decode_bytes<R>(reader: &Reader<R>, bytes: &[u8]) -> String {
    reader.decoder().decode(bytes).map_or_else(
        |_| String::from_utf8_lossy(bytes).into_owned(),
        std::borrow::Cow::into_owned,
    )
}

/// Collects attributes in document order. A malformed attribute is a
/// recoverable markup warning: it is logged and dropped, and the run
/// continues.
fn decode_attributes<R>(reader: &Reader<R>, e: &BytesStart) -> Vec<(String, String)> {
    let mut attributes = Vec::new();
    for attr in e.attributes() {
        match attr {
            Ok(attr) => {
                let name = decode_bytes(reader, attr.key.as_ref());
                let value = attr.unescape_value().map_or_else(
                    |_| String::from_utf8_lossy(&attr.value).into_owned(),
                    std::borrow::Cow::into_owned,
                );
                attributes.push((name, value));
            }
            Err(err) => {
                warn!("Malformed attribute dropped: {err}");
            }
        }
    }
    attributes
}

/// Resolves a general entity reference (name only, no `&`/`;`) to its
/// character value. Predefined entities and numeric character references
/// are decoded; anything else passes through verbatim, since DTD-defined
/// entities are out of scope.
fn resolve_entity(entity: &str) -> String {
    match entity {
        "lt" => "<".to_string(),
        "gt" => ">".to_string(),
        "amp" => "&".to_string(),
        "apos" => "'".to_string(),
        "quot" => "\"".to_string(),
        s if s.starts_with('#') => {
            let code = if s.starts_with("#x") || s.starts_with("#X") {
                u32::from_str_radix(&s[2..], 16).ok()
            } else {
                s[1..].parse::<u32>().ok()
            };
            code.and_then(char::from_u32)
                .map_or_else(|| format!("&{entity};"), |c| c.to_string())
        }
        _ => format!("&{entity};"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScrubConfig;

    fn index_from(json: &str) -> RuleIndex {
        ScrubConfig::from_json_str(json).unwrap().build_index().unwrap()
    }

    #[test]
    fn no_rules_round_trips_structure_with_escaping() {
        let rules = RuleIndex::default();
        let out = scrub_string("<root><a k=\"v\">text</a></root>", &rules).unwrap();
        assert_eq!(
            out,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<root><a k=\"v\">text</a></root>"
        );
    }

    #[test]
    fn entity_references_coalesce_into_one_chunk() {
        // "hi &amp; bye" arrives as three tokenizer events; a wildcard
        // rule must still fire exactly once.
        let rules = index_from(
            r#"{"rule_set": [{"xpath": "/root/public", "rules": [{"type": "REPLACE", "match": "*", "replacement": "REDACTED"}]}]}"#,
        );
        let out = scrub_string("<root><public>hi &amp; bye</public></root>", &rules).unwrap();
        assert_eq!(
            out,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<root><public>REDACTED</public></root>"
        );
    }

    #[test]
    fn self_closing_elements_expand_to_start_and_end() {
        let rules = RuleIndex::default();
        let out = scrub_string("<root><empty/></root>", &rules).unwrap();
        assert_eq!(
            out,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<root><empty></empty></root>"
        );
    }

    #[test]
    fn skip_applies_to_self_closing_element() {
        let rules = index_from(r#"{"rule_set": [{"xpath": "/root/gone", "rules": [{"type": "SKIP"}]}]}"#);
        let out = scrub_string("<root><gone a=\"b\"/><kept/></root>", &rules).unwrap();
        assert_eq!(
            out,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<root><kept></kept></root>"
        );
    }

    #[test]
    fn cdata_is_escaped_like_ordinary_text() {
        let rules = RuleIndex::default();
        let out = scrub_string("<r><![CDATA[a < b & c]]></r>", &rules).unwrap();
        assert_eq!(
            out,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<r>a &lt; b &amp; c</r>"
        );
    }

    #[test]
    fn numeric_character_references_re_escape() {
        let rules = RuleIndex::default();
        let out = scrub_string("<r>caf&#233;</r>", &rules).unwrap();
        assert_eq!(
            out,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<r>caf&#233;</r>"
        );
    }

    #[test]
    fn unknown_entity_passes_through_verbatim() {
        let rules = RuleIndex::default();
        let out = scrub_string("<r>a&nbsp;b</r>", &rules).unwrap();
        assert_eq!(
            out,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<r>a&amp;nbsp;b</r>"
        );
    }

    #[test]
    fn input_prolog_is_replaced_by_the_fixed_one() {
        let rules = RuleIndex::default();
        let out = scrub_string(
            "<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?><r/>",
            &rules,
        )
        .unwrap();
        assert!(out.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n"));
    }

    #[test]
    fn processing_instructions_survive() {
        let rules = RuleIndex::default();
        let out = scrub_string("<r><?php echo 1; ?></r>", &rules).unwrap();
        assert!(out.contains("<?php echo 1;?>") || out.contains("<?php echo 1; ?>"));
    }

    #[test]
    fn comments_are_dropped() {
        let rules = RuleIndex::default();
        let out = scrub_string("<r>a<!-- hidden -->b</r>", &rules).unwrap();
        assert_eq!(out, "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<r>ab</r>");
    }

    #[test]
    fn truncated_document_is_a_parse_or_structure_error() {
        let rules = RuleIndex::default();
        let err = scrub_string("<root><open>", &rules).unwrap_err();
        assert!(matches!(
            err,
            ScrubError::Parse { .. } | ScrubError::UnbalancedDocument { .. }
        ));
    }
}
