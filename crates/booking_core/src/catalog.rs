//! crates/booking_core/src/catalog.rs
//!
//! The fixed service/package catalog and the phone-country list the booking
//! form draws from. The mapping from service to packages is an explicit
//! finite table, checked for consistency once at startup instead of being an
//! implicit key lookup.

/// Raw service table: service name to its ordered package list.
const SERVICE_TABLE: &[(&str, &[&str])] = &[
    (
        "Bridal Makeup Services",
        &["Classic Bridal", "HD Bridal", "Airbrush Bridal"],
    ),
    (
        "Party Makeup Services",
        &["Natural Glam", "Full Glam"],
    ),
    (
        "Engagement Makeup Services",
        &["Engagement Classic", "Engagement HD"],
    ),
    (
        "Bridal Henna Services",
        &["Bridal Full Hands & Feet", "Bridal Hands Only"],
    ),
    (
        "Party Henna Services",
        &["Simple Strip", "Arabic Design", "Full Hand"],
    ),
];

/// Raw phone-country table: display name, ISO code, calling code.
const COUNTRY_TABLE: &[(&str, &str, &str)] = &[
    ("India", "IN", "+91"),
    ("United Arab Emirates", "AE", "+971"),
    ("United Kingdom", "GB", "+44"),
    ("United States", "US", "+1"),
    ("Australia", "AU", "+61"),
    ("Singapore", "SG", "+65"),
];

/// One bookable service and its packages, in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEntry {
    pub name: &'static str,
    pub packages: &'static [&'static str],
}

/// One entry of the phone-country list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneCountry {
    pub name: &'static str,
    pub iso: &'static str,
    pub calling_code: &'static str,
}

/// Raised when the static tables are internally inconsistent.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("service '{0}' is listed twice")]
    DuplicateService(String),
    #[error("service '{0}' has an empty package list")]
    EmptyPackageList(String),
    #[error("service '{service}' lists package '{package}' twice")]
    DuplicatePackage { service: String, package: String },
    #[error("country '{0}' is listed twice")]
    DuplicateCountry(String),
    #[error("country '{country}' has a malformed calling code '{code}'")]
    BadCallingCode { country: String, code: String },
}

/// The validated catalog. Construct once via [`ServiceCatalog::load`].
#[derive(Debug, Clone)]
pub struct ServiceCatalog {
    services: Vec<ServiceEntry>,
    countries: Vec<PhoneCountry>,
}

impl ServiceCatalog {
    /// Builds the catalog from the static tables and verifies it is
    /// complete and free of duplicates. Callers are expected to treat a
    /// failure here as fatal at process startup.
    pub fn load() -> Result<Self, CatalogError> {
        let mut services = Vec::with_capacity(SERVICE_TABLE.len());
        for &(name, packages) in SERVICE_TABLE {
            if services.iter().any(|s: &ServiceEntry| s.name == name) {
                return Err(CatalogError::DuplicateService(name.to_string()));
            }
            if packages.is_empty() {
                return Err(CatalogError::EmptyPackageList(name.to_string()));
            }
            for (i, package) in packages.iter().enumerate() {
                if packages[..i].contains(package) {
                    return Err(CatalogError::DuplicatePackage {
                        service: name.to_string(),
                        package: package.to_string(),
                    });
                }
            }
            services.push(ServiceEntry { name, packages });
        }

        let mut countries = Vec::with_capacity(COUNTRY_TABLE.len());
        for &(name, iso, calling_code) in COUNTRY_TABLE {
            if countries
                .iter()
                .any(|c: &PhoneCountry| c.iso == iso || c.name == name)
            {
                return Err(CatalogError::DuplicateCountry(name.to_string()));
            }
            let digits = calling_code.strip_prefix('+').unwrap_or("");
            if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
                return Err(CatalogError::BadCallingCode {
                    country: name.to_string(),
                    code: calling_code.to_string(),
                });
            }
            countries.push(PhoneCountry {
                name,
                iso,
                calling_code,
            });
        }

        Ok(Self {
            services,
            countries,
        })
    }

    pub fn services(&self) -> &[ServiceEntry] {
        &self.services
    }

    pub fn countries(&self) -> &[PhoneCountry] {
        &self.countries
    }

    /// The ordered package list for a service, or `None` for an unknown one.
    pub fn packages_for(&self, service: &str) -> Option<&'static [&'static str]> {
        self.services
            .iter()
            .find(|s| s.name == service)
            .map(|s| s.packages)
    }

    /// Whether `package` belongs to `service`'s package list.
    pub fn is_valid_package(&self, service: &str, package: &str) -> bool {
        self.packages_for(service)
            .map(|packages| packages.contains(&package))
            .unwrap_or(false)
    }

    /// Calling code for a phone country, looked up by ISO code.
    pub fn calling_code(&self, iso: &str) -> Option<&'static str> {
        self.countries
            .iter()
            .find(|c| c.iso == iso)
            .map(|c| c.calling_code)
    }
}
