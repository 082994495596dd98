//! TRANS.TBL long name translation
//!
//! Some mastering tools wrote a `TRANS.TBL` file into each directory mapping
//! the 8.3 names on disc to the names the author meant:
//!
//! ```text
//! F FOOBAR.TXT;1          Some Long Name.txt
//! D SUBDIR.;1             Subdirectory
//! ```
//!
//! Translation renames matching entries and drops the table itself.

use alloc::string::String;
use alloc::vec::Vec;

use gpt_disk_io::BlockIo;
use log::{debug, warn};

use super::DirectoryListing;
use crate::options::DecodeSettings;
use crate::utils::sector::{sectors_for_bytes, SectorReader};
use crate::utils::string::{decode_text, normalize_filename, strip_version};

/// One line of a translation table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    /// Entry type character (`F`, `D`, `L`, ...)
    pub kind: char,
    /// Name as recorded on disc
    pub original: String,
    /// Name to show instead
    pub translated: String,
}

/// Parse the text of a translation table, skipping malformed lines
pub fn parse(text: &str) -> Vec<Translation> {
    text.lines().filter_map(parse_line).collect()
}

fn parse_line(line: &str) -> Option<Translation> {
    let line = line.trim_end_matches('\r');
    let mut chars = line.chars();
    let kind = chars.next()?;
    if chars.next()? != ' ' {
        return None;
    }

    let rest = chars.as_str().trim_start_matches(' ');
    let split = rest.find([' ', '\t'])?;
    let (original, translated) = rest.split_at(split);
    let translated = translated.trim_start_matches([' ', '\t']);

    if original.is_empty() || translated.is_empty() {
        return None;
    }

    Some(Translation {
        kind,
        original: String::from(original),
        translated: String::from(translated),
    })
}

fn is_table_name(name: &str) -> bool {
    let name = name.to_lowercase();
    name == "trans.tbl" || name == "trans.tbl;1"
}

/// Apply the directory's translation table, if it has one
///
/// An unreadable table leaves the listing untouched apart from removing
/// the table entry.
pub fn translate<B: BlockIo>(
    reader: &mut SectorReader<'_, B>,
    settings: &DecodeSettings,
    listing: &mut DirectoryListing,
) {
    let Some((key, extent, size)) = listing
        .iter()
        .find(|(name, entry)| !entry.is_directory() && is_table_name(name))
        .map(|(name, entry)| (name.clone(), entry.extents.first().copied(), entry.size))
    else {
        return;
    };

    listing.remove(&key);

    let Some(extent) = extent else {
        return;
    };

    let data = match reader.read(extent.lba as u64, sectors_for_bytes(size)) {
        Ok(mut data) => {
            data.truncate(size as usize);
            data
        }
        Err(e) => {
            warn!("unreadable {} at {}: {}", key, extent.lba, e);
            return;
        }
    };

    let text = decode_text(&data, settings.encoding, false);
    let mut renamed = 0;

    for translation in parse(&text) {
        // Tables list the raw on-disc name, e.g. `README.;1`
        let original = normalize_filename(&translation.original.to_lowercase(), false);
        let bare = strip_version(&original);

        let Some(name) = listing
            .keys()
            .find(|name| {
                let name = name.to_lowercase();
                name == original || strip_version(&name) == bare
            })
            .cloned()
        else {
            continue;
        };

        if let Some(mut entry) = listing.remove(&name) {
            entry.filename = translation.translated.clone();
            listing.insert(translation.translated, entry);
            renamed += 1;
        }
    }

    debug!("{} renamed {} entries", key, renamed);
}
