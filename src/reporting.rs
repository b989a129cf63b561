use std::path::{Path, PathBuf};

use csv::Writer;
use tracing::{error, info};

use crate::files::date_stamp;
use crate::verify::VerdictRow;

/// Writes the per-domain CSV report. The filename is keyed by calendar day,
/// so a same-day rerun overwrites the previous report instead of adding a
/// second one.
pub fn write_report(rows: &[VerdictRow], namespace: &Path) -> Option<PathBuf> {
    let csv_file = namespace.join(format!("final_results_{}.csv", date_stamp()));

    let mut wtr = match Writer::from_path(&csv_file) {
        Ok(wtr) => wtr,
        Err(err) => {
            error!("could not create {}: {err}", csv_file.display());
            return None;
        }
    };

    let result = wtr
        .write_record([
            "Subdomain",
            "CNAME Target",
            "Provider",
            "Nuclei Template",
            "Vulnerability Status",
        ])
        .and_then(|_| {
            for row in rows {
                wtr.write_record([
                    &row.subdomain,
                    &row.cname_target,
                    &row.provider,
                    &row.template,
                    &row.status,
                ])?;
            }
            wtr.flush()?;
            Ok(())
        });

    if let Err(err) = result {
        error!("could not write {}: {err}", csv_file.display());
        return None;
    }

    info!("CSV report saved in {}", csv_file.display());
    Some(csv_file)
}
