//! Text representation of CRLs.

use std::fmt;
use crate::ext::Extensions;
use super::Crl;


//------------ DumpOptions ---------------------------------------------------

/// Options for the text dump of a CRL.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct DumpOptions {
    /// Include the revoked entries and all extensions.
    pub verbose: bool,

    /// The maximum number of revoked entries to include.
    ///
    /// Only used in verbose mode. `None` means all entries.
    pub max_entries: Option<usize>,
}

impl DumpOptions {
    pub fn brief() -> Self {
        Self::default()
    }

    pub fn verbose(max_entries: Option<usize>) -> Self {
        DumpOptions { verbose: true, max_entries }
    }
}


//------------ Crl -----------------------------------------------------------

impl Crl {
    /// Writes a text dump of the CRL to `target`.
    pub fn dump(
        &self, options: &DumpOptions, target: &mut impl fmt::Write
    ) -> fmt::Result {
        writeln!(target, "Version: {}", self.version)?;
        writeln!(target, "Issuer: {}", self.issuer)?;
        writeln!(target, "This Update: {}", self.this_update)?;
        match self.next_update {
            Some(time) => writeln!(target, "Next Update: {}", time)?,
            None => writeln!(target, "Next Update: None")?,
        }
        writeln!(
            target, "Signature Algorithm: {}", self.signature_algorithm()
        )?;
        writeln!(target, "CRL Type: {}", self.crl_type)?;
        writeln!(target, "CRL Number: {}", self.crl_number)?;
        writeln!(target, "Thumbprint: {}", self.thumbprint)?;
        writeln!(target, "Revoked Certificates: {}", self.entries.len())?;
        if !options.verbose {
            return Ok(())
        }

        let shown = options.max_entries.unwrap_or(usize::MAX);
        for entry in self.entries.iter().take(shown) {
            writeln!(target, "    Serial Number: {}", entry.serial)?;
            writeln!(
                target, "        Revocation Date: {}", entry.revocation_date
            )?;
            dump_extensions(&entry.extensions, 8, target)?;
        }
        if self.entries.len() > shown {
            writeln!(
                target, "    {} entries truncated", self.entries.len() - shown
            )?;
        }

        writeln!(target, "Extensions: {}", self.extensions.len())?;
        dump_extensions(&self.extensions, 4, target)
    }

    /// Returns the text dump of the CRL.
    pub fn to_dump_string(&self, options: &DumpOptions) -> String {
        let mut res = String::new();
        // Writing to a string never fails.
        let _ = self.dump(options, &mut res);
        res
    }
}

fn dump_extensions(
    extensions: &Extensions, indent: usize, target: &mut impl fmt::Write
) -> fmt::Result {
    for ext in extensions {
        for line in ext.to_string().lines() {
            writeln!(target, "{:indent$}{}", "", line, indent = indent)?;
        }
    }
    Ok(())
}


//============ Tests =========================================================
