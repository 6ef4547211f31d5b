//! JSON Lines sink
//!
//! Writes one serialized [`SoundItem`] per line, in the order items arrive.

use crate::crawler::SoundItem;
use crate::output::traits::{ItemSink, OutputResult};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Sink writing items as JSON Lines to a writer
pub struct JsonLinesSink<W: Write + Send> {
    writer: W,
    written: u64,
}

impl JsonLinesSink<BufWriter<File>> {
    /// Creates (or truncates) the file at `path`
    pub fn create(path: &Path) -> OutputResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = File::create(path)?;
        tracing::debug!("Writing items to {}", path.display());
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    /// Number of items written so far
    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> ItemSink for JsonLinesSink<W> {
    fn emit(&mut self, item: &SoundItem) -> OutputResult<()> {
        serde_json::to_writer(&mut self.writer, item)?;
        self.writer.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::Image;
    use serde_json::Value;
    use tempfile::tempdir;

    fn sample_item(id: &str, piano_downloads: Option<&str>) -> SoundItem {
        SoundItem {
            id: id.to_string(),
            title: "Title".to_string(),
            kind: "Sample".to_string(),
            text: "Text".to_string(),
            image: Image {
                title: "img".to_string(),
                url: "https://cdn.example.com/img.png".to_string(),
            },
            link: format!("https://www.nordkeyboards.com/sounds/{}", id),
            download: piano_downloads.map(|_| "direct".to_string()),
            player_data: None,
            piano_downloads: piano_downloads.map(str::to_string),
        }
    }

    #[test]
    fn test_writes_one_line_per_item() {
        let mut sink = JsonLinesSink::new(Vec::new());
        sink.emit(&sample_item("a", None)).unwrap();
        sink.emit(&sample_item("b", Some("https://www.nordkeyboards.com/b.zip")))
            .unwrap();
        sink.finish().unwrap();
        assert_eq!(sink.written(), 2);

        let output = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<Value> = output
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["id"], "a");
        assert!(lines[0]["pianoDownloads"].is_null());
        assert_eq!(lines[1]["pianoDownloads"], "https://www.nordkeyboards.com/b.zip");
        assert_eq!(lines[1]["type"], "Sample");
    }

    #[test]
    fn test_create_file_sink() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("items.jsonl");

        let mut sink = JsonLinesSink::create(&path).unwrap();
        sink.emit(&sample_item("a", None)).unwrap();
        sink.finish().unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let item: SoundItem = serde_json::from_str(content.trim_end()).unwrap();
        assert_eq!(item, sample_item("a", None));
    }
}
