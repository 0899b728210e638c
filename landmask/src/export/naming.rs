//! Export job naming.
//!
//! This module is the single source of truth for export names. Names double
//! as the job description and the output file prefix on the platform, so
//! they must be unique across a run and identical across re-runs.

use crate::aoi::AreaId;
use crate::catalog::Year;

/// Default export name prefix.
pub const DEFAULT_NAME_PREFIX: &str = "NDFI_Masked";

/// Build the export name for one (area, year) pair.
///
/// # Format
///
/// `{prefix}_{year}_{area}`
///
/// # Examples
///
/// ```
/// use landmask::aoi::AreaId;
/// use landmask::export::export_name;
///
/// assert_eq!(export_name("NDFI_Masked", 2013, AreaId::from(1)), "NDFI_Masked_2013_1");
/// assert_eq!(export_name("NDFI_Masked", 2023, AreaId::new(2.5)), "NDFI_Masked_2023_2.5");
/// ```
pub fn export_name(prefix: &str, year: Year, area: AreaId) -> String {
    format!("{}_{}_{}", prefix, year, area)
}
