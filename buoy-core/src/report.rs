// XML report generation for one monitoring run

use crate::check::ChangeEvent;
use chrono::Local;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Report is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Everything that goes into one report: a summary status line, the
/// generation timestamp and the non-Unchanged events of the run.
#[derive(Debug, Clone)]
pub struct MonitoringReport {
    pub status: String,
    pub generated_at: String,
    pub events: Vec<ChangeEvent>,
}

impl MonitoringReport {
    /// Build a report from the reportable events of a run, stamped now.
    pub fn from_events(events: Vec<ChangeEvent>) -> Self {
        let status = if events.is_empty() {
            "No changes detected since the last run.".to_string()
        } else {
            format!("{} Change(s) or Initial Check(s) Detected.", events.len())
        };

        Self {
            status,
            generated_at: Local::now().to_rfc3339(),
            events,
        }
    }
}

/// Serialize the report as an indented XML document.
pub fn generate_xml_report(report: &MonitoringReport) -> Result<String, ReportError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    writer.write_event(Event::Start(BytesStart::new("MonitoringReport")))?;

    write_text_element(&mut writer, "Status", &report.status)?;
    write_text_element(&mut writer, "TimestampGenerated", &report.generated_at)?;

    for event in &report.events {
        writer.write_event(Event::Start(BytesStart::new("ChangeItem")))?;
        write_text_element(&mut writer, "Name", &event.name)?;
        write_text_element(&mut writer, "URL", &event.url)?;
        write_text_element(&mut writer, "Timestamp", &event.timestamp)?;
        write_text_element(&mut writer, "Status", &event.status_text())?;
        write_text_element(&mut writer, "HashDetails", &event.detail)?;
        writer.write_event(Event::End(BytesEnd::new("ChangeItem")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("MonitoringReport")))?;

    let mut xml = String::from_utf8(writer.into_inner())?;
    xml.push('\n');
    Ok(xml)
}

fn write_text_element<W: std::io::Write>(
    writer: &mut Writer<W>,
    tag: &str,
    text: &str,
) -> Result<(), ReportError> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

/// Direct overwrite of the output path; no atomic rename.
pub fn save_report(content: &str, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}
