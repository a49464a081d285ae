use crate::record::EntryLocation;

/// Every entry of an archive in physical order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    pub(crate) entries: Vec<EntryLocation>,
}

impl Listing {
    pub fn entries(&self) -> &[EntryLocation] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EntryLocation> {
        self.entries.iter()
    }

    pub fn file_count(&self) -> usize {
        self.entries.len()
    }

    pub fn total_bytes(&self) -> u64 {
        self.entries.iter().map(|l| l.entry.size).sum()
    }

    pub fn get(&self, name: &str) -> Option<&EntryLocation> {
        self.entries.iter().find(|l| l.entry.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
}

impl<'a> IntoIterator for &'a Listing {
    type Item = &'a EntryLocation;
    type IntoIter = std::slice::Iter<'a, EntryLocation>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// A file or entry a bulk operation passed over, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    pub name: String,
    pub reason: String,
}

/// Outcome of a pack or unpack.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkStats {
    pub files: u64,
    pub bytes: u64,
    pub skipped: Vec<Skipped>,
}

impl BulkStats {
    pub(crate) fn skip<N: Into<String>, R: ToString>(&mut self, name: N, reason: R) {
        self.skipped.push(Skipped {
            name: name.into(),
            reason: reason.to_string(),
        });
    }
}
