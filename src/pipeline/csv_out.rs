use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::output_file_name;
use crate::error::Result;
use crate::pipeline::processing::enrich::EnrichedReview;

/// Exported column order. `EnrichedReview`'s field order produces the same header.
pub const COLUMNS: [&str; 14] = [
    "Username",
    "Date",
    "Time",
    "Day",
    "Review",
    "Rating",
    "ReviewCategory",
    "ReviewLength",
    "ReviewLanguage",
    "ReviewResponse",
    "ResponseTime",
    "ThumbsUpCount",
    "UserState",
    "UserCountry",
];

/// Writes `rows` to `<out_dir>/<app_name>_reviews.csv`, replacing any previous
/// export. Rows go to a temporary sibling first, so a failed write never
/// leaves a truncated file under the final name.
pub fn write_reviews_csv(rows: &[EnrichedReview], out_dir: &Path, app_name: &str) -> Result<PathBuf> {
    fs::create_dir_all(out_dir)?;
    let file_path = out_dir.join(output_file_name(app_name));
    let tmp_path = file_path.with_extension("csv.tmp");

    let written = write_rows(rows, &tmp_path);
    if let Err(e) = written {
        let _ = fs::remove_file(&tmp_path);
        return Err(e);
    }
    fs::rename(&tmp_path, &file_path)?;
    Ok(file_path)
}

fn write_rows(rows: &[EnrichedReview], path: &Path) -> Result<()> {
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_path(path)?;
    writer.write_record(COLUMNS)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn row(response_time: Option<f64>) -> EnrichedReview {
        EnrichedReview {
            username: "UserDigi".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            time: NaiveTime::from_hms_opt(8, 5, 9).unwrap(),
            day: "Friday".to_string(),
            review: Some("Line putus, tolong, \"urgent\"".to_string()),
            rating: 1,
            review_category: "Network".to_string(),
            review_length: 4,
            review_language: "MS".to_string(),
            review_response: None,
            response_time,
            thumbs_up_count: 3,
            user_state: String::new(),
            user_country: "Malaysia".to_string(),
        }
    }

    #[test]
    fn test_writes_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_reviews_csv(&[row(None), row(Some(1.5))], dir.path(), "Digi").unwrap();

        assert_eq!(path, dir.path().join("Digi_reviews.csv"));
        assert!(!dir.path().join("Digi_reviews.csv.tmp").exists());

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], COLUMNS.join(","));
        assert_eq!(
            lines[1],
            "UserDigi,2024-03-01,08:05:09,Friday,\"Line putus, tolong, \"\"urgent\"\"\",1,Network,4,MS,,,3,,Malaysia"
        );
        assert!(lines[2].contains(",1.5,3,,Malaysia"));
    }

    #[test]
    fn test_header_matches_struct_serialization() {
        let mut writer = csv::Writer::from_writer(vec![]);
        writer.serialize(row(None)).unwrap();
        let data = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        assert_eq!(data.lines().next().unwrap(), COLUMNS.join(","));
    }

    #[test]
    fn test_overwrites_previous_export() {
        let dir = tempfile::tempdir().unwrap();
        write_reviews_csv(&[row(None), row(None)], dir.path(), "Celcom").unwrap();
        let path = write_reviews_csv(&[row(None)], dir.path(), "Celcom").unwrap();
        let content = fs::read_to_string(path).unwrap();
        assert_eq!(content.lines().count(), 2);
    }
}
