//! Read-only access to the layer records of a Photoshop (`.psd`) document.
//!
//! Only the header and the layer records are decoded: names, folder
//! structure and visibility. Pixel data is skipped. Large documents
//! (`.psb`, version 2) are rejected.
//!
//! Layer records are stored bottom to top, with folders closed by a hidden
//! "bounding section divider" record below their children. [`read_bytes`]
//! turns that into a top-to-bottom list where the top layer has id 0 and
//! every layer knows its parent folder.

use anyhow::{Context, Result, anyhow, bail};
use std::path::Path;

const SIGNATURE: &[u8; 4] = b"8BPS";

// Section divider types from the `lsct`/`lsdk` additional layer info.
const DIVIDER_OPEN_FOLDER: u32 = 1;
const DIVIDER_CLOSED_FOLDER: u32 = 2;
const DIVIDER_BOUNDING: u32 = 3;

/// Flags bit set on hidden layers.
const FLAG_HIDDEN: u8 = 0b10;

/// Document size and layer list of a PSD file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PsdDocument {
    pub width: u32,
    pub height: u32,
    /// Layers from top to bottom.
    pub layers: Vec<PsdLayer>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PsdLayer {
    /// Position from the top, starting at 0.
    pub id: usize,
    /// Id of the enclosing folder.
    pub parent_id: Option<usize>,
    /// Nesting depth; 0 for layers outside any folder.
    pub depth: usize,
    pub name: String,
    pub is_folder: bool,
    pub is_visible: bool,
}

impl PsdDocument {
    /// Layers whose name contains `marker`, the ones `merge-layers` would merge.
    pub fn marked<'a>(&'a self, marker: &'a str) -> impl Iterator<Item = &'a PsdLayer> + 'a {
        self.layers.iter().filter(move |l| l.name.contains(marker))
    }

    /// One line per layer, indented by folder depth, with flags in brackets.
    pub fn describe(&self, marker: &str) -> Vec<String> {
        self.layers
            .iter()
            .map(|layer| {
                let mut line = format!(
                    "{:>4}  {}{}",
                    layer.id,
                    "  ".repeat(layer.depth),
                    layer.name
                );
                if layer.is_folder {
                    line.push_str("  [folder]");
                }
                if !layer.is_visible {
                    line.push_str("  [hidden]");
                }
                if layer.name.contains(marker) {
                    line.push_str("  [merge]");
                }
                line
            })
            .collect()
    }
}

/// Read the layer list of the PSD file at `path`.
pub fn read_file(path: impl AsRef<Path>) -> Result<PsdDocument> {
    let path = path.as_ref();
    let data = std::fs::read(path)
        .with_context(|| format!("Failed to read PSD file: {}", path.display()))?;
    read_bytes(&data).with_context(|| format!("Failed to parse PSD file: {}", path.display()))
}

/// Read the layer list of an in-memory PSD document.
pub fn read_bytes(data: &[u8]) -> Result<PsdDocument> {
    let mut r = Reader::new(data);

    if r.take(4)? != SIGNATURE {
        bail!("Not a PSD file (missing '8BPS' signature)");
    }
    match r.u16()? {
        1 => {}
        2 => bail!("Large document (PSB) files are not supported"),
        v => bail!("Unsupported PSD version: {}", v),
    }
    r.skip(6)?; // reserved
    r.skip(2)?; // channel count
    let height = r.u32()?;
    let width = r.u32()?;
    r.skip(4)?; // depth, color mode

    let color_mode_len = r.u32()?;
    r.skip(color_mode_len as usize).context("Truncated color mode data")?;
    let resources_len = r.u32()?;
    r.skip(resources_len as usize).context("Truncated image resources")?;

    let records = read_layer_records(&mut r)?;
    Ok(PsdDocument {
        width,
        height,
        layers: build_tree(records),
    })
}

/// A layer record as stored in the file.
struct Record {
    name: String,
    hidden: bool,
    divider: Option<u32>,
}

fn read_layer_records(r: &mut Reader<'_>) -> Result<Vec<Record>> {
    // Flattened documents have no layer section at all.
    if r.remaining() == 0 {
        return Ok(Vec::new());
    }
    let section_len = r.u32()?;
    if section_len == 0 {
        return Ok(Vec::new());
    }
    let mut section = r.section(section_len as usize).context("Truncated layer section")?;

    let info_len = section.u32()?;
    if info_len == 0 {
        return Ok(Vec::new());
    }
    let mut info = section.section(info_len as usize).context("Truncated layer info")?;

    // Negative when the first alpha channel holds the merged transparency.
    let count = info.i16()?.unsigned_abs();
    (0..count)
        .map(|i| read_record(&mut info).with_context(|| format!("Bad layer record {}", i)))
        .collect()
}

fn read_record(r: &mut Reader<'_>) -> Result<Record> {
    r.skip(16)?; // top, left, bottom, right
    let channels = r.u16()?;
    r.skip(channels as usize * 6)?; // id + data length per channel

    if r.take(4)? != b"8BIM" {
        bail!("Missing blend mode signature");
    }
    r.skip(4)?; // blend mode key
    r.skip(2)?; // opacity, clipping
    let flags = r.u8()?;
    r.skip(1)?; // filler

    let extra_len = r.u32()?;
    let mut extra = r.section(extra_len as usize)?;

    let mask_len = extra.u32()?;
    extra.skip(mask_len as usize)?;
    let ranges_len = extra.u32()?;
    extra.skip(ranges_len as usize)?;

    // Pascal string padded to a multiple of 4 bytes, length byte included.
    let name_len = extra.u8()? as usize;
    let mut name = String::from_utf8_lossy(extra.take(name_len)?).into_owned();
    extra.skip((4 - (name_len + 1) % 4) % 4)?;

    let mut divider = None;
    while extra.remaining() >= 12 {
        let sig = extra.take(4)?;
        if sig != b"8BIM" && sig != b"8B64" {
            bail!("Bad additional layer info signature");
        }
        let key = extra.take(4)?;
        let len = extra.u32()?;
        let mut data = extra.section(len as usize)?;
        match key {
            b"luni" => name = read_unicode_string(&mut data)?,
            b"lsct" | b"lsdk" => divider = Some(data.u32()?),
            _ => {}
        }
    }

    Ok(Record {
        name,
        hidden: flags & FLAG_HIDDEN != 0,
        divider,
    })
}

fn read_unicode_string(r: &mut Reader<'_>) -> Result<String> {
    let len = r.u32()? as usize;
    let units = (0..len).map(|_| r.u16()).collect::<Result<Vec<_>>>()?;
    Ok(String::from_utf16_lossy(&units)
        .trim_end_matches('\0')
        .to_string())
}

/// Reorder bottom-to-top records into the top-to-bottom layer tree.
fn build_tree(records: Vec<Record>) -> Vec<PsdLayer> {
    let mut layers = Vec::with_capacity(records.len());
    let mut open_folders: Vec<usize> = Vec::new();

    for record in records.into_iter().rev() {
        if record.divider == Some(DIVIDER_BOUNDING) {
            open_folders.pop();
            continue;
        }

        let id = layers.len();
        let is_folder = matches!(
            record.divider,
            Some(DIVIDER_OPEN_FOLDER | DIVIDER_CLOSED_FOLDER)
        );
        layers.push(PsdLayer {
            id,
            parent_id: open_folders.last().copied(),
            depth: open_folders.len(),
            name: record.name,
            is_folder,
            is_visible: !record.hidden,
        });
        if is_folder {
            open_folders.push(id);
        }
    }

    layers
}

/// Big-endian cursor over a byte slice.
struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if n > self.remaining() {
            return Err(anyhow!(
                "Unexpected end of data at offset {} (wanted {} bytes, {} left)",
                self.pos,
                n,
                self.remaining()
            ));
        }
        let data = self.data;
        let bytes = &data[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    fn skip(&mut self, n: usize) -> Result<()> {
        self.take(n).map(|_| ())
    }

    /// Split off the next `n` bytes as their own reader.
    fn section(&mut self, n: usize) -> Result<Reader<'a>> {
        self.take(n).map(Reader::new)
    }

    fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> Result<u16> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    fn i16(&mut self) -> Result<i16> {
        let b = self.take(2)?;
        Ok(i16::from_be_bytes([b[0], b[1]]))
    }

    fn u32(&mut self) -> Result<u32> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }
}
