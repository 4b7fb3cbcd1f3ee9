//! Country aggregation of visitor IPs.
//!
//! Resolution goes through [`CountryResolver`] so the aggregation can be
//! exercised without a GeoLite2 database on disk.

use std::collections::HashMap;
use std::net::IpAddr;
use std::path::Path;

use maxminddb::{geoip2, Reader};
use serde::Serialize;

use crate::error::{Error, Result};

/// Number of countries kept in [`CountryStats::top_countries`].
pub const TOP_COUNTRIES: usize = 5;

/// Placeholder shown when no visitor resolves to a country.
pub const NO_COUNTRY: &str = "N/A";

/// Visitors attributed to one country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountryCount {
    /// English country name, or ISO code when no name is known.
    pub name: String,
    /// Unique visitors from this country.
    pub visitors: usize,
}

/// Aggregate visitor statistics by country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountryStats {
    /// All unique visitors, resolved or not.
    pub total_visitors: usize,
    /// Name of the leading country, or [`NO_COUNTRY`].
    pub top_country: String,
    /// Visitors from the leading country.
    pub top_country_visitors: usize,
    /// Leading countries, most visitors first.
    pub top_countries: Vec<CountryCount>,
}

impl Default for CountryStats {
    fn default() -> Self {
        Self {
            total_visitors: 0,
            top_country: NO_COUNTRY.to_string(),
            top_country_visitors: 0,
            top_countries: Vec::new(),
        }
    }
}

/// Maps an IP address to a country name.
pub trait CountryResolver: Send {
    /// The country for `ip`, or `None` when unknown.
    fn country_name(&self, ip: IpAddr) -> Option<String>;
}

/// [`CountryResolver`] backed by a MaxMind GeoLite2 Country database.
pub struct GeoLiteResolver {
    reader: Reader<Vec<u8>>,
}

impl std::fmt::Debug for GeoLiteResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeoLiteResolver")
            .field("database_type", &self.reader.metadata.database_type)
            .finish()
    }
}

impl GeoLiteResolver {
    /// Open a `.mmdb` file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::GeoLite`] if the file is not a readable MaxMind database.
    pub fn open(path: &Path) -> Result<Self> {
        let reader = Reader::open_readfile(path).map_err(|_| Error::GeoLite {
            reason: "is invalid or unreadable",
        })?;
        Ok(Self { reader })
    }
}

impl CountryResolver for GeoLiteResolver {
    fn country_name(&self, ip: IpAddr) -> Option<String> {
        let record: geoip2::Country = self.reader.lookup(ip).ok()?;
        let country = record.country?;

        let name = country
            .names
            .as_ref()
            .and_then(|names| names.get("en"))
            .map(|name| name.trim())
            .filter(|name| !name.is_empty());
        let iso = country
            .iso_code
            .map(str::trim)
            .filter(|code| !code.is_empty());

        name.or(iso).map(str::to_string)
    }
}

/// Check that `path` points at an accessible file before opening it.
///
/// # Errors
///
/// Returns a distinct [`Error::GeoLite`] reason for an empty, missing, or
/// inaccessible path.
pub fn check_database_path(path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() || path.to_string_lossy().trim().is_empty() {
        return Err(Error::GeoLite {
            reason: "path is empty",
        });
    }
    match std::fs::metadata(path) {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(Error::GeoLite {
            reason: "not found",
        }),
        Err(_) => Err(Error::GeoLite {
            reason: "is not accessible",
        }),
    }
}

/// Count visitors per country and keep the leaders.
///
/// Unparseable addresses and addresses without a country are skipped but
/// still part of `total_visitors`. Ties are broken by name.
pub fn aggregate_countries<'a, I>(
    ips: I,
    resolver: &dyn CountryResolver,
    total_visitors: usize,
) -> CountryStats
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: HashMap<String, usize> = HashMap::new();
    for raw in ips {
        let Ok(ip) = raw.trim().parse::<IpAddr>() else {
            continue;
        };
        if let Some(country) = resolver.country_name(ip) {
            *counts.entry(country).or_default() += 1;
        }
    }

    let mut top_countries: Vec<CountryCount> = counts
        .into_iter()
        .map(|(name, visitors)| CountryCount { name, visitors })
        .collect();
    top_countries.sort_by(|a, b| b.visitors.cmp(&a.visitors).then_with(|| a.name.cmp(&b.name)));
    top_countries.truncate(TOP_COUNTRIES);

    let (top_country, top_country_visitors) = top_countries
        .first()
        .map_or((NO_COUNTRY.to_string(), 0), |c| (c.name.clone(), c.visitors));

    CountryStats {
        total_visitors,
        top_country,
        top_country_visitors,
        top_countries,
    }
}
