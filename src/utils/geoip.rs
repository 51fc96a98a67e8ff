//! Country and city lookup backed by a MaxMind GeoIP2/GeoLite2 City database.

use std::collections::BTreeMap;
use std::net::IpAddr;
use std::path::Path;

use anyhow::{Context, Result};
use maxminddb::Reader;
use serde::Deserialize;
use tracing::debug;

use crate::utils::client_info::{Location, UNKNOWN};

/// Resolves a public address to a location.
///
/// `None` means the source has no record for the address.
pub trait GeoLookup: Send + Sync {
    fn lookup(&self, ip: IpAddr) -> Option<Location>;
}

/// The subset of a City record that clicks store.
#[derive(Debug, Deserialize)]
struct CityRecord {
    country: Option<CountryRecord>,
    city: Option<PlaceNames>,
}

#[derive(Debug, Deserialize)]
struct CountryRecord {
    iso_code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlaceNames {
    names: Option<BTreeMap<String, String>>,
}

impl CityRecord {
    /// Country as its ISO code, city by its English name.
    fn into_location(self) -> Option<Location> {
        let country = self.country.and_then(|c| c.iso_code);
        let city = self
            .city
            .and_then(|c| c.names)
            .and_then(|mut names| names.remove("en"));

        if country.is_none() && city.is_none() {
            return None;
        }

        Some(Location {
            country: country.unwrap_or_else(|| UNKNOWN.to_string()),
            city: city.unwrap_or_else(|| UNKNOWN.to_string()),
        })
    }
}

/// [`GeoLookup`] over a memory-loaded `.mmdb` file.
pub struct MaxMindLookup {
    reader: Reader<Vec<u8>>,
}

impl MaxMindLookup {
    /// Loads the database at `path`.
    ///
    /// # Errors
    ///
    /// The file is missing, unreadable, or not a MaxMind database.
    pub fn open(path: &Path) -> Result<Self> {
        let reader = Reader::open_readfile(path)
            .with_context(|| format!("Failed to open GeoIP database '{}'", path.display()))?;
        Ok(Self { reader })
    }
}

impl GeoLookup for MaxMindLookup {
    fn lookup(&self, ip: IpAddr) -> Option<Location> {
        match self.reader.lookup::<CityRecord>(ip) {
            Ok(record) => record.and_then(CityRecord::into_location),
            Err(e) => {
                debug!(%ip, error = %e, "GeoIP lookup failed");
                None
            }
        }
    }
}
